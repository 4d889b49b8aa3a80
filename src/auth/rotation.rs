//! One-time-use refresh tokens with replay detection.
//!
//! A refresh token is `Active` until exchanged, then `Deactivated`. The
//! deactivated row is kept until it expires so that a replay can be recognised:
//! a legitimate client never presents a token twice, so a second presentation
//! means the value leaked. The response is to revoke the user's whole refresh
//! family, which also cuts off whoever holds the newest rotation.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use super::{
    error::AuthError,
    scope::Scope,
    store::{RotationOutcome, TokenStore, User},
    token::{hash_token, IssuedToken, TokenIssuer},
    validator::TokenValidator,
};

/// What a detected replay deletes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevocationPolicy {
    /// Delete every refresh token of the user.
    #[default]
    RefreshOnly,
    /// Delete every refresh and access token of the user.
    RefreshAndAccess,
}

impl RevocationPolicy {
    #[must_use]
    pub fn scopes(self) -> &'static [Scope] {
        match self {
            Self::RefreshOnly => &[Scope::Refresh],
            Self::RefreshAndAccess => &[Scope::Refresh, Scope::Access],
        }
    }
}

/// Newly minted access/refresh pair.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub user: User,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Clone)]
pub struct RefreshRotationGuard {
    store: Arc<dyn TokenStore>,
    validator: TokenValidator,
    policy: RevocationPolicy,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl RefreshRotationGuard {
    pub fn new(
        store: Arc<dyn TokenStore>,
        validator: TokenValidator,
        policy: RevocationPolicy,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            store,
            validator,
            policy,
            access_ttl,
            refresh_ttl,
        }
    }

    #[must_use]
    pub fn policy(&self) -> RevocationPolicy {
        self.policy
    }

    /// Exchange a refresh plaintext for a new refresh/access pair.
    ///
    /// # Errors
    /// - `InvalidToken` when the token is unknown, expired or not a refresh token.
    /// - `ReusedRefreshToken` when the token was already exchanged; the user's
    ///   tokens in the policy's scopes are deleted before returning.
    /// - Internal errors on RNG or storage failure. These never revoke anything.
    pub async fn exchange(&self, plaintext: &str) -> Result<TokenPair, AuthError> {
        let owner = self.validator.validate(plaintext, Scope::Refresh).await?;

        let (refresh, refresh_record) =
            TokenIssuer::prepare(Scope::Refresh, owner.id, self.refresh_ttl)?;
        let (access, access_record) =
            TokenIssuer::prepare(Scope::Access, owner.id, self.access_ttl)?;

        let outcome = self
            .store
            .rotate_refresh(&hash_token(plaintext), &[refresh_record, access_record])
            .await?;

        match outcome {
            RotationOutcome::Rotated(user) => {
                info!(user_id = %user.id, "refresh token rotated");
                Ok(TokenPair {
                    user,
                    access,
                    refresh,
                })
            }
            RotationOutcome::Reused { user_id } => {
                let revoked = self
                    .store
                    .delete_all_for_user(user_id, self.policy.scopes())
                    .await?;
                warn!(
                    user_id = %user_id,
                    revoked,
                    policy = ?self.policy,
                    "refresh token reuse detected, token family revoked"
                );
                Err(AuthError::ReusedRefreshToken)
            }
            // Expired between validation and rotation.
            RotationOutcome::NotFound => Err(AuthError::InvalidToken),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        store::{InsertUserOutcome, MemoryStore, NewUser, UserStore},
        token::{TokenHash, TokenRecord},
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<MemoryStore>,
        issuer: TokenIssuer,
        validator: TokenValidator,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = match store
            .insert_user(&NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                activated: true,
            })
            .await
            .unwrap()
        {
            InsertUserOutcome::Created(user) => user,
            InsertUserOutcome::Conflict => panic!("unexpected conflict"),
        };
        Fixture {
            issuer: TokenIssuer::new(store.clone()),
            validator: TokenValidator::new(store.clone()),
            store,
            user,
        }
    }

    fn guard(fixture: &Fixture, policy: RevocationPolicy) -> RefreshRotationGuard {
        RefreshRotationGuard::new(
            fixture.store.clone(),
            fixture.validator.clone(),
            policy,
            Scope::Access.default_ttl(),
            Scope::Refresh.default_ttl(),
        )
    }

    async fn refresh_token(fixture: &Fixture) -> IssuedToken {
        fixture
            .issuer
            .new_token(Scope::Refresh, fixture.user.id, Scope::Refresh.default_ttl())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn exchange_rotates_and_issues_valid_pair() {
        let fixture = fixture().await;
        let guard = guard(&fixture, RevocationPolicy::default());
        let r1 = refresh_token(&fixture).await;

        let pair = guard.exchange(&r1.plaintext).await.unwrap();

        assert_eq!(pair.user.id, fixture.user.id);
        assert_ne!(pair.refresh.plaintext, r1.plaintext);
        assert_eq!(pair.refresh.scope, Scope::Refresh);
        assert_eq!(pair.access.scope, Scope::Access);
        assert!(fixture.store.is_deactivated(&hash_token(&r1.plaintext)).await);
        let owner = fixture
            .validator
            .validate(&pair.access.plaintext, Scope::Access)
            .await
            .unwrap();
        assert_eq!(owner.id, fixture.user.id);
    }

    #[tokio::test]
    async fn replay_revokes_the_whole_family() {
        let fixture = fixture().await;
        let guard = guard(&fixture, RevocationPolicy::RefreshOnly);
        let r1 = refresh_token(&fixture).await;
        let pair = guard.exchange(&r1.plaintext).await.unwrap();

        let err = guard.exchange(&r1.plaintext).await.unwrap_err();
        assert!(matches!(err, AuthError::ReusedRefreshToken));

        let err = fixture
            .validator
            .validate(&pair.refresh.plaintext, Scope::Refresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
        assert_eq!(
            fixture
                .store
                .count_tokens(fixture.user.id, Scope::Refresh)
                .await,
            0
        );
        // Refresh-only policy leaves access tokens alone.
        assert!(fixture
            .validator
            .validate(&pair.access.plaintext, Scope::Access)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn replay_with_access_policy_revokes_access_tokens() {
        let fixture = fixture().await;
        let guard = guard(&fixture, RevocationPolicy::RefreshAndAccess);
        let r1 = refresh_token(&fixture).await;
        let pair = guard.exchange(&r1.plaintext).await.unwrap();

        assert!(matches!(
            guard.exchange(&r1.plaintext).await,
            Err(AuthError::ReusedRefreshToken)
        ));
        assert!(matches!(
            fixture
                .validator
                .validate(&pair.access.plaintext, Scope::Access)
                .await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn non_refresh_token_is_invalid() {
        let fixture = fixture().await;
        let guard = guard(&fixture, RevocationPolicy::default());
        let access = fixture
            .issuer
            .new_token(Scope::Access, fixture.user.id, Duration::hours(1))
            .await
            .unwrap();
        assert!(matches!(
            guard.exchange(&access.plaintext).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            guard.exchange("ABCDEFGHIJKLMNOPQRSTUVWXYZ").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn concurrent_presentations_rotate_exactly_once() {
        // Check and mark must be one atomic unit: of N racing exchanges of the
        // same active token only one may succeed, the rest must see the replay.
        let fixture = fixture().await;
        let guard = Arc::new(guard(&fixture, RevocationPolicy::default()));
        let r1 = refresh_token(&fixture).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            let plaintext = r1.plaintext.clone();
            handles.push(tokio::spawn(async move { guard.exchange(&plaintext).await }));
        }

        let mut rotated = 0;
        let mut reused = 0;
        let mut invalid = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => rotated += 1,
                Err(AuthError::ReusedRefreshToken) => reused += 1,
                // Revocation by an earlier replay deletes the consumed row too.
                Err(AuthError::InvalidToken) => invalid += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(rotated, 1);
        assert!(reused >= 1);
        assert_eq!(rotated + reused + invalid, 8);
        assert_eq!(
            fixture
                .store
                .count_tokens(fixture.user.id, Scope::Refresh)
                .await,
            0
        );
    }

    struct FailingStore;

    #[async_trait]
    impl TokenStore for FailingStore {
        async fn insert_token(&self, _token: &TokenRecord) -> anyhow::Result<bool> {
            Err(anyhow!("connection reset"))
        }

        async fn user_for_token(
            &self,
            _hash: &TokenHash,
            _scope: Scope,
        ) -> anyhow::Result<Option<User>> {
            Ok(Some(User {
                id: Uuid::nil(),
                created_at: chrono::Utc::now(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: String::new(),
                activated: true,
                version: 1,
            }))
        }

        async fn rotate_refresh(
            &self,
            _hash: &TokenHash,
            _replacements: &[TokenRecord],
        ) -> anyhow::Result<RotationOutcome> {
            Err(anyhow!("connection reset"))
        }

        async fn delete_all_for_user(&self, _user_id: Uuid, _scopes: &[Scope]) -> anyhow::Result<u64> {
            panic!("storage failure must not trigger revocation");
        }

        async fn delete_token(&self, _hash: &TokenHash) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn storage_failure_is_internal_and_does_not_revoke() {
        let store: Arc<dyn TokenStore> = Arc::new(FailingStore);
        let guard = RefreshRotationGuard::new(
            store.clone(),
            TokenValidator::new(store),
            RevocationPolicy::default(),
            Duration::hours(1),
            Duration::hours(1),
        );
        let err = guard
            .exchange("ABCDEFGHIJKLMNOPQRSTUVWXYZ")
            .await
            .unwrap_err();
        assert!(err.is_internal());
    }
}
