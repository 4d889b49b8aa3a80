use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    InsertUserOutcome, NewUser, RotationOutcome, TokenStore, UpdateUserOutcome, User, UserStore,
};
use crate::auth::{
    scope::Scope,
    token::{TokenHash, TokenRecord},
};

struct StoredToken {
    record: TokenRecord,
    deactivated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    tokens: HashMap<TokenHash, StoredToken>,
}

impl State {
    fn live_token(&self, hash: &TokenHash, scope: Scope, now: DateTime<Utc>) -> Option<&StoredToken> {
        self.tokens
            .get(hash)
            .filter(|token| token.record.scope == scope && token.record.expiry > now)
    }
}

/// In-process store. Every operation holds one lock, which makes
/// `rotate_refresh` atomic by construction.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw token row lookup, regardless of expiry or deactivation.
    #[cfg(test)]
    pub(crate) async fn token(&self, hash: &TokenHash) -> Option<TokenRecord> {
        let state = self.state.lock().await;
        state.tokens.get(hash).map(|token| token.record.clone())
    }

    /// Whether the token row exists and carries the deactivation marker.
    #[cfg(test)]
    pub(crate) async fn is_deactivated(&self, hash: &TokenHash) -> bool {
        let state = self.state.lock().await;
        state
            .tokens
            .get(hash)
            .is_some_and(|token| token.deactivated_at.is_some())
    }

    /// Number of stored tokens of `user_id` in `scope`.
    #[cfg(test)]
    pub(crate) async fn count_tokens(&self, user_id: Uuid, scope: Scope) -> usize {
        let state = self.state.lock().await;
        state
            .tokens
            .values()
            .filter(|token| token.record.user_id == user_id && token.record.scope == scope)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<InsertUserOutcome> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Ok(InsertUserOutcome::Conflict);
        }
        let created = User {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            activated: user.activated,
            version: 1,
        };
        state.users.insert(created.id, created.clone());
        Ok(InsertUserOutcome::Created(created))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<UpdateUserOutcome> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Ok(UpdateUserOutcome::Conflict);
        }
        let Some(stored) = state.users.get_mut(&user.id) else {
            return Ok(UpdateUserOutcome::Conflict);
        };
        if stored.version != user.version {
            return Ok(UpdateUserOutcome::Conflict);
        }
        *stored = User {
            version: user.version + 1,
            ..user.clone()
        };
        Ok(UpdateUserOutcome::Updated(stored.clone()))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: &TokenRecord) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.tokens.contains_key(&token.hash) {
            return Ok(false);
        }
        state.tokens.insert(
            token.hash,
            StoredToken {
                record: token.clone(),
                deactivated_at: None,
            },
        );
        Ok(true)
    }

    async fn user_for_token(&self, hash: &TokenHash, scope: Scope) -> Result<Option<User>> {
        let state = self.state.lock().await;
        let user = state
            .live_token(hash, scope, Utc::now())
            .and_then(|token| state.users.get(&token.record.user_id))
            .cloned();
        Ok(user)
    }

    async fn rotate_refresh(
        &self,
        hash: &TokenHash,
        replacements: &[TokenRecord],
    ) -> Result<RotationOutcome> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let Some(token) = state.live_token(hash, Scope::Refresh, now) else {
            return Ok(RotationOutcome::NotFound);
        };
        let user_id = token.record.user_id;
        if token.deactivated_at.is_some() {
            return Ok(RotationOutcome::Reused { user_id });
        }
        let Some(user) = state.users.get(&user_id).cloned() else {
            return Ok(RotationOutcome::NotFound);
        };
        if replacements
            .iter()
            .any(|record| state.tokens.contains_key(&record.hash))
        {
            anyhow::bail!("replacement token hash already exists");
        }

        if let Some(token) = state.tokens.get_mut(hash) {
            token.deactivated_at = Some(now);
        }
        for record in replacements {
            state.tokens.insert(
                record.hash,
                StoredToken {
                    record: record.clone(),
                    deactivated_at: None,
                },
            );
        }

        Ok(RotationOutcome::Rotated(user))
    }

    async fn delete_all_for_user(&self, user_id: Uuid, scopes: &[Scope]) -> Result<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|_, token| {
            !(token.record.user_id == user_id && scopes.contains(&token.record.scope))
        });
        Ok((before - state.tokens.len()) as u64)
    }

    async fn delete_token(&self, hash: &TokenHash) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tokens.remove(hash);
        Ok(())
    }
}
