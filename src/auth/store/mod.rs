//! Storage seams for users and tokens.
//!
//! `PgStore` backs production; `MemoryStore` keeps the same semantics behind a
//! single async mutex for local development and tests. Both must honour the
//! atomic check-and-mark contract of [`TokenStore::rotate_refresh`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    scope::Scope,
    token::{TokenHash, TokenRecord},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip_serializing)]
    pub version: i32,
}

/// Fields supplied when creating a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
}

#[derive(Debug)]
pub enum InsertUserOutcome {
    Created(User),
    Conflict,
}

/// Result of an optimistic update keyed on `User::version`.
#[derive(Debug)]
pub enum UpdateUserOutcome {
    Updated(User),
    Conflict,
}

/// Result of the atomic refresh check-and-mark.
#[derive(Debug)]
pub enum RotationOutcome {
    /// The token was active; it is now deactivated and the replacements are stored.
    Rotated(User),
    /// The token had already been consumed.
    Reused { user_id: Uuid },
    /// No live refresh token with that digest.
    NotFound,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> Result<InsertUserOutcome>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Persist `user` if the stored version still equals `user.version`; the
    /// returned user carries the incremented version.
    async fn update_user(&self, user: &User) -> Result<UpdateUserOutcome>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns `false` if the digest already exists.
    async fn insert_token(&self, token: &TokenRecord) -> Result<bool>;

    /// Owner of an unexpired token with matching digest and scope.
    async fn user_for_token(&self, hash: &TokenHash, scope: Scope) -> Result<Option<User>>;

    /// Atomically check the refresh token `hash`, mark it deactivated and store
    /// `replacements`. Two concurrent calls for the same active token must yield
    /// exactly one `Rotated`.
    async fn rotate_refresh(
        &self,
        hash: &TokenHash,
        replacements: &[TokenRecord],
    ) -> Result<RotationOutcome>;

    /// Delete every token of `user_id` in `scopes`, returning the number removed.
    async fn delete_all_for_user(&self, user_id: Uuid, scopes: &[Scope]) -> Result<u64>;

    async fn delete_token(&self, hash: &TokenHash) -> Result<()>;
}
