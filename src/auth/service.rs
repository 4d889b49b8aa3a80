//! Account and token flows composed from the token core.
//!
//! `AuthService` owns every collaborator (stores, hasher, cookie codec, mailer)
//! and is shared across handlers behind an `Arc`. Nothing here is global: the
//! cookie key and storage handles are passed in at construction.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Duration;
use tracing::{error, info};

use super::{
    cookie::{CookieCodec, REFRESH_COOKIE_NAME},
    error::AuthError,
    password::CredentialVerifier,
    rotation::{RefreshRotationGuard, RevocationPolicy},
    scope::Scope,
    store::{InsertUserOutcome, NewUser, TokenStore, UpdateUserOutcome, User, UserStore},
    token::{hash_token, IssuedToken, TokenIssuer},
    types::{
        normalize_email, ActivateRequest, EmailRequest, LoginRequest, RegisterRequest,
        ResetPasswordRequest,
    },
    validator::TokenValidator,
};
use crate::mail::{Email, EmailMessage, EmailSender};

/// Token lifetimes and the reuse revocation policy.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    access_ttl_seconds: i64,
    activation_ttl_seconds: i64,
    password_reset_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    revocation_policy: RevocationPolicy,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_ttl_seconds: Scope::Access.default_ttl().num_seconds(),
            activation_ttl_seconds: Scope::Activation.default_ttl().num_seconds(),
            password_reset_ttl_seconds: Scope::PasswordReset.default_ttl().num_seconds(),
            refresh_ttl_seconds: Scope::Refresh.default_ttl().num_seconds(),
            revocation_policy: RevocationPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_activation_ttl_seconds(mut self, seconds: i64) -> Self {
        self.activation_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_password_reset_ttl_seconds(mut self, seconds: i64) -> Self {
        self.password_reset_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_revocation_policy(mut self, policy: RevocationPolicy) -> Self {
        self.revocation_policy = policy;
        self
    }

    #[must_use]
    pub fn ttl(&self, scope: Scope) -> Duration {
        let seconds = match scope {
            Scope::Access => self.access_ttl_seconds,
            Scope::Activation => self.activation_ttl_seconds,
            Scope::PasswordReset => self.password_reset_ttl_seconds,
            Scope::Refresh => self.refresh_ttl_seconds,
        };
        // Out-of-range values surface as an internal error when a token is minted.
        Duration::try_seconds(seconds).unwrap_or(Duration::MAX)
    }

    #[must_use]
    pub fn revocation_policy(&self) -> RevocationPolicy {
        self.revocation_policy
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a login or refresh: the access token goes in the body, the
/// refresh token only travels inside the sealed cookie.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub access: IssuedToken,
    pub refresh_cookie: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    issuer: TokenIssuer,
    validator: TokenValidator,
    guard: RefreshRotationGuard,
    verifier: CredentialVerifier,
    cookies: CookieCodec,
    mailer: Arc<dyn EmailSender>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        verifier: CredentialVerifier,
        cookies: CookieCodec,
        mailer: Arc<dyn EmailSender>,
        config: AuthConfig,
    ) -> Self {
        let validator = TokenValidator::new(tokens.clone());
        let guard = RefreshRotationGuard::new(
            tokens.clone(),
            validator.clone(),
            config.revocation_policy(),
            config.ttl(Scope::Access),
            config.ttl(Scope::Refresh),
        );
        Self {
            issuer: TokenIssuer::new(tokens.clone()),
            users,
            tokens,
            validator,
            guard,
            verifier,
            // The cookie lives exactly as long as the refresh token it carries.
            cookies: cookies.with_max_age_seconds(config.ttl(Scope::Refresh).num_seconds()),
            mailer,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieCodec {
        &self.cookies
    }

    /// Create an inactive account and mail its activation token.
    ///
    /// # Errors
    /// `Validation` for bad input, `DuplicateEmail` if the address is taken.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        request.validate()?;

        let password_hash = self.verifier.set_password(&request.password)?;
        let new_user = NewUser {
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            password_hash,
            activated: false,
        };
        let user = match self.users.insert_user(&new_user).await? {
            InsertUserOutcome::Created(user) => user,
            InsertUserOutcome::Conflict => return Err(AuthError::DuplicateEmail),
        };

        let token = self
            .issuer
            .new_token(Scope::Activation, user.id, self.config.ttl(Scope::Activation))
            .await?;
        self.send_email(&user.email, Email::Activation {
            token: token.plaintext,
        });

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Consume an activation token.
    ///
    /// # Errors
    /// `Validation` for a bad or expired token, `EditConflict` on a concurrent update.
    pub async fn activate(&self, request: &ActivateRequest) -> Result<User, AuthError> {
        request.validate()?;

        let mut user = self
            .validator
            .validate(&request.token, Scope::Activation)
            .await
            .map_err(|err| token_field_error(err, "invalid or expired activation token"))?;

        user.activated = true;
        let user = match self.users.update_user(&user).await? {
            UpdateUserOutcome::Updated(user) => user,
            UpdateUserOutcome::Conflict => return Err(AuthError::EditConflict),
        };

        self.tokens
            .delete_all_for_user(user.id, &[Scope::Activation])
            .await?;

        info!(user_id = %user.id, "user activated");
        Ok(user)
    }

    /// Check credentials and start a session.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password,
    /// `InactiveAccount` when the password matched but the account is not activated.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AuthError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let Some(user) = self.users.user_by_email(&email).await? else {
            // Pay the same argon2 cost as a known account.
            self.verifier.compare_dummy(&request.password)?;
            return Err(AuthError::InvalidCredentials);
        };
        if !self
            .verifier
            .compare_passwords(&user.password_hash, &request.password)?
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.activated {
            return Err(AuthError::InactiveAccount);
        }

        let access = self
            .issuer
            .new_token(Scope::Access, user.id, self.config.ttl(Scope::Access))
            .await?;
        let refresh = self
            .issuer
            .new_token(Scope::Refresh, user.id, self.config.ttl(Scope::Refresh))
            .await?;
        let refresh_cookie = self
            .cookies
            .encrypt(REFRESH_COOKIE_NAME, &refresh.plaintext)?;

        info!(user_id = %user.id, "login succeeded");
        Ok(AuthSession {
            user,
            access,
            refresh_cookie,
        })
    }

    /// Open the refresh cookie and rotate the token it carries.
    ///
    /// # Errors
    /// `InvalidValue` for a cookie that does not open, plus everything
    /// [`RefreshRotationGuard::exchange`] returns.
    pub async fn refresh(&self, cookie_value: &str) -> Result<AuthSession, AuthError> {
        let plaintext = self.cookies.decrypt(REFRESH_COOKIE_NAME, cookie_value)?;
        let pair = self.guard.exchange(&plaintext).await?;
        let refresh_cookie = self
            .cookies
            .encrypt(REFRESH_COOKIE_NAME, &pair.refresh.plaintext)?;
        Ok(AuthSession {
            user: pair.user,
            access: pair.access,
            refresh_cookie,
        })
    }

    /// Drop the refresh token behind the cookie and return the clearing `Set-Cookie` value.
    ///
    /// Never fails: a missing or unreadable cookie still gets cleared.
    pub async fn logout(&self, cookie_value: Option<&str>) -> String {
        let plaintext =
            cookie_value.and_then(|value| self.cookies.decrypt(REFRESH_COOKIE_NAME, value).ok());
        if let Some(plaintext) = plaintext {
            if let Err(err) = self.tokens.delete_token(&hash_token(&plaintext)).await {
                error!("Failed to delete refresh token: {err}");
            }
        }
        CookieCodec::clear(REFRESH_COOKIE_NAME)
    }

    /// Mail a new activation token if the address belongs to an inactive account.
    ///
    /// Succeeds for unknown and already active addresses too.
    ///
    /// # Errors
    /// `Validation` for a malformed email, internal on storage failure.
    pub async fn resend_activation(&self, request: &EmailRequest) -> Result<(), AuthError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        match self.users.user_by_email(&email).await? {
            Some(user) if !user.activated => {
                let token = self
                    .issuer
                    .new_token(Scope::Activation, user.id, self.config.ttl(Scope::Activation))
                    .await?;
                self.send_email(&user.email, Email::Activation {
                    token: token.plaintext,
                });
            }
            _ => info!("activation resend skipped"),
        }
        Ok(())
    }

    /// Mail a password-reset token if the address belongs to an active account.
    ///
    /// Succeeds for unknown addresses too.
    ///
    /// # Errors
    /// `Validation` for a malformed email, internal on storage failure.
    pub async fn request_password_reset(&self, request: &EmailRequest) -> Result<(), AuthError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        match self.users.user_by_email(&email).await? {
            Some(user) if user.activated => {
                let token = self
                    .issuer
                    .new_token(
                        Scope::PasswordReset,
                        user.id,
                        self.config.ttl(Scope::PasswordReset),
                    )
                    .await?;
                self.send_email(&user.email, Email::PasswordReset {
                    token: token.plaintext,
                });
            }
            _ => info!("password reset skipped"),
        }
        Ok(())
    }

    /// Consume a password-reset token and set a new password.
    ///
    /// Every outstanding reset token and every refresh token of the user is
    /// deleted, so sessions opened with the old password end at their next refresh.
    ///
    /// # Errors
    /// `Validation` for bad input or a bad token, `EditConflict` on a concurrent update.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<User, AuthError> {
        request.validate()?;

        let mut user = self
            .validator
            .validate(&request.token, Scope::PasswordReset)
            .await
            .map_err(|err| token_field_error(err, "invalid or expired password reset token"))?;

        user.password_hash = self.verifier.set_password(&request.password)?;
        let user = match self.users.update_user(&user).await? {
            UpdateUserOutcome::Updated(user) => user,
            UpdateUserOutcome::Conflict => return Err(AuthError::EditConflict),
        };

        let revoked = self
            .tokens
            .delete_all_for_user(user.id, &[Scope::PasswordReset, Scope::Refresh])
            .await?;

        info!(user_id = %user.id, revoked, "password reset");
        Ok(user)
    }

    /// Resolve a bearer access token to its user.
    ///
    /// # Errors
    /// `InvalidToken` for anything but a live access token.
    pub async fn authenticate(&self, plaintext: &str) -> Result<User, AuthError> {
        self.validator.validate(plaintext, Scope::Access).await
    }

    fn send_email(&self, to_email: &str, email: Email) {
        let message = EmailMessage {
            to_email: to_email.to_string(),
            email,
        };
        if let Err(err) = self.mailer.send(&message) {
            error!(
                template = message.email.template(),
                "Failed to send email: {err}"
            );
        }
    }
}

/// Tokens in a request body are input fields, so a bad one is a validation failure.
fn token_field_error(err: AuthError, message: &'static str) -> AuthError {
    match err {
        AuthError::InvalidToken => AuthError::Validation(BTreeMap::from([("token", message)])),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        cookie::CookieKey, password::test_verifier, store::MemoryStore, types::EmailRequest,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingSender {
        fn last_token(&self) -> Option<String> {
            self.sent.lock().unwrap().last().map(|m| match &m.email {
                Email::Activation { token } | Email::PasswordReset { token } => token.clone(),
            })
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl EmailSender for RecordingSender {
        fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingSender;

    impl EmailSender for FailingSender {
        fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("smtp unavailable"))
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingSender>,
        service: AuthService,
    }

    fn harness() -> Harness {
        harness_with(AuthConfig::new())
    }

    fn harness_with(config: AuthConfig) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingSender::default());
        let service = AuthService::new(
            store.clone(),
            store.clone(),
            test_verifier(),
            CookieCodec::new(&CookieKey::generate()),
            mailer.clone(),
            config,
        );
        Harness {
            store,
            mailer,
            service,
        }
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "pa55word".to_string(),
        }
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest {
            email: "alice@example.com".to_string(),
            password: password.to_string(),
        }
    }

    fn cookie_value(set_cookie: &str) -> &str {
        let (pair, _) = set_cookie.split_once(';').unwrap();
        pair.split_once('=').unwrap().1
    }

    async fn active_user(h: &Harness) -> User {
        h.service
            .register(&register_request("alice@example.com"))
            .await
            .unwrap();
        let token = h.mailer.last_token().unwrap();
        h.service
            .activate(&ActivateRequest { token })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_then_activate_consumes_token() {
        let h = harness();
        let user = h
            .service
            .register(&register_request(" Alice@Example.com "))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.activated);
        assert_ne!(user.password_hash, "pa55word");

        let token = h.mailer.last_token().unwrap();
        let owner = h
            .service
            .validator
            .validate(&token, Scope::Activation)
            .await
            .unwrap();
        assert_eq!(owner.id, user.id);

        let activated = h
            .service
            .activate(&ActivateRequest {
                token: token.clone(),
            })
            .await
            .unwrap();
        assert!(activated.activated);
        assert_eq!(activated.version, user.version + 1);

        assert!(matches!(
            h.service.validator.validate(&token, Scope::Activation).await,
            Err(AuthError::InvalidToken)
        ));
        match h.service.activate(&ActivateRequest { token }).await {
            Err(AuthError::Validation(errors)) => assert!(errors.contains_key("token")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let h = harness();
        h.service
            .register(&register_request("alice@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            h.service
                .register(&register_request("ALICE@example.com"))
                .await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_registration() {
        let store = Arc::new(MemoryStore::new());
        let service = AuthService::new(
            store.clone(),
            store,
            test_verifier(),
            CookieCodec::new(&CookieKey::generate()),
            Arc::new(FailingSender),
            AuthConfig::new(),
        );
        assert!(service
            .register(&register_request("alice@example.com"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_and_inactive_accounts() {
        let h = harness();
        h.service
            .register(&register_request("alice@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            h.service.login(&login_request("wrong-password")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            h.service
                .login(&LoginRequest {
                    email: "bob@example.com".to_string(),
                    password: "pa55word".to_string(),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            h.service.login(&login_request("pa55word")).await,
            Err(AuthError::InactiveAccount)
        ));
    }

    #[tokio::test]
    async fn login_issues_access_token_and_sealed_refresh_cookie() {
        let h = harness();
        let user = active_user(&h).await;

        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        assert_eq!(session.user.id, user.id);
        let me = h
            .service
            .authenticate(&session.access.plaintext)
            .await
            .unwrap();
        assert_eq!(me.id, user.id);

        let refresh = h
            .service
            .cookies()
            .decrypt(REFRESH_COOKIE_NAME, cookie_value(&session.refresh_cookie))
            .unwrap();
        assert_eq!(refresh.len(), 26);
        assert_eq!(h.store.count_tokens(user.id, Scope::Refresh).await, 1);
    }

    #[tokio::test]
    async fn refresh_rotates_and_detects_replay() {
        let h = harness();
        let user = active_user(&h).await;
        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        let first = cookie_value(&session.refresh_cookie).to_string();

        let rotated = h.service.refresh(&first).await.unwrap();
        assert_eq!(rotated.user.id, user.id);
        let second = cookie_value(&rotated.refresh_cookie).to_string();
        assert_ne!(first, second);

        assert!(matches!(
            h.service.refresh(&first).await,
            Err(AuthError::ReusedRefreshToken)
        ));
        assert!(matches!(
            h.service.refresh(&second).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn refresh_rejects_tampered_cookie() {
        let h = harness();
        active_user(&h).await;
        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        let mut value = cookie_value(&session.refresh_cookie).to_string();
        let flipped = if value.starts_with('A') { "B" } else { "A" };
        value.replace_range(0..1, flipped);

        assert!(matches!(
            h.service.refresh(&value).await,
            Err(AuthError::InvalidValue)
        ));
    }

    #[tokio::test]
    async fn logout_deletes_refresh_token() {
        let h = harness();
        let user = active_user(&h).await;
        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        let value = cookie_value(&session.refresh_cookie).to_string();

        let cleared = h.service.logout(Some(&value)).await;
        assert!(cleared.starts_with("tessera_refresh_token=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(h.store.count_tokens(user.id, Scope::Refresh).await, 0);
        assert!(matches!(
            h.service.refresh(&value).await,
            Err(AuthError::InvalidToken)
        ));

        // Missing and garbage cookies are still cleared.
        assert_eq!(h.service.logout(None).await, cleared);
        assert_eq!(h.service.logout(Some("garbage")).await, cleared);
    }

    #[tokio::test]
    async fn resend_activation_only_mails_inactive_accounts() {
        let h = harness();
        h.service
            .register(&register_request("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(h.mailer.count(), 1);

        let request = EmailRequest {
            email: "alice@example.com".to_string(),
        };
        h.service.resend_activation(&request).await.unwrap();
        assert_eq!(h.mailer.count(), 2);

        let token = h.mailer.last_token().unwrap();
        h.service
            .activate(&ActivateRequest { token })
            .await
            .unwrap();
        h.service.resend_activation(&request).await.unwrap();
        h.service
            .resend_activation(&EmailRequest {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(h.mailer.count(), 2);
    }

    #[tokio::test]
    async fn password_reset_replaces_password_and_ends_sessions() {
        let h = harness();
        let user = active_user(&h).await;
        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        let sent_before = h.mailer.count();

        h.service
            .request_password_reset(&EmailRequest {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(h.mailer.count(), sent_before);

        h.service
            .request_password_reset(&EmailRequest {
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();
        let token = h.mailer.last_token().unwrap();

        let request = ResetPasswordRequest {
            token,
            password: "n3w-pa55word".to_string(),
        };
        let updated = h.service.reset_password(&request).await.unwrap();
        assert_eq!(updated.id, user.id);

        assert!(matches!(
            h.service.login(&login_request("pa55word")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(h.service.login(&login_request("n3w-pa55word")).await.is_ok());
        assert!(matches!(
            h.service
                .refresh(cookie_value(&session.refresh_cookie))
                .await,
            Err(AuthError::InvalidToken)
        ));
        assert_eq!(h.store.count_tokens(user.id, Scope::PasswordReset).await, 0);
        assert!(matches!(
            h.service.reset_password(&request).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_rejects_non_access_tokens() {
        let h = harness();
        h.service
            .register(&register_request("alice@example.com"))
            .await
            .unwrap();
        let activation = h.mailer.last_token().unwrap();
        assert!(matches!(
            h.service.authenticate(&activation).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn refresh_cookie_max_age_follows_refresh_ttl() {
        let h = harness_with(AuthConfig::new().with_refresh_ttl_seconds(2_592_000));
        active_user(&h).await;

        let session = h.service.login(&login_request("pa55word")).await.unwrap();
        assert!(session.refresh_cookie.contains("; Max-Age=2592000;"));

        let rotated = h
            .service
            .refresh(cookie_value(&session.refresh_cookie))
            .await
            .unwrap();
        assert!(rotated.refresh_cookie.contains("; Max-Age=2592000;"));
    }

    #[tokio::test]
    async fn oversized_ttl_fails_login_as_internal_error() {
        let h = harness_with(AuthConfig::new().with_refresh_ttl_seconds(i64::MAX));
        let user = active_user(&h).await;

        let err = h
            .service
            .login(&login_request("pa55word"))
            .await
            .unwrap_err();
        assert!(err.is_internal());
        assert_eq!(h.store.count_tokens(user.id, Scope::Refresh).await, 0);
    }

    #[test]
    fn out_of_range_ttl_saturates() {
        let config = AuthConfig::new().with_access_ttl_seconds(i64::MAX);
        assert_eq!(config.ttl(Scope::Access), Duration::MAX);
    }

    #[test]
    fn config_overrides_ttls() {
        let config = AuthConfig::new()
            .with_access_ttl_seconds(60)
            .with_refresh_ttl_seconds(120)
            .with_revocation_policy(RevocationPolicy::RefreshAndAccess);
        assert_eq!(config.ttl(Scope::Access), Duration::seconds(60));
        assert_eq!(config.ttl(Scope::Refresh), Duration::seconds(120));
        assert_eq!(config.ttl(Scope::Activation), Duration::hours(72));
        assert_eq!(config.ttl(Scope::PasswordReset), Duration::minutes(45));
        assert_eq!(
            config.revocation_policy(),
            RevocationPolicy::RefreshAndAccess
        );
    }
}
