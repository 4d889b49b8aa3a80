use crate::{
    api::{self, Storage},
    auth::{
        AuthConfig, AuthService, CookieCodec, CookieKey, CredentialVerifier, PasswordCost,
        RevocationPolicy,
    },
    mail::LogEmailSender,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub cookie_key: SecretString,
    pub access_ttl_seconds: i64,
    pub activation_ttl_seconds: i64,
    pub password_reset_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub password_cost: PasswordCost,
    pub revocation_policy: RevocationPolicy,
}

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new()
            .with_access_ttl_seconds(self.access_ttl_seconds)
            .with_activation_ttl_seconds(self.activation_ttl_seconds)
            .with_password_reset_ttl_seconds(self.password_reset_ttl_seconds)
            .with_refresh_ttl_seconds(self.refresh_ttl_seconds)
            .with_revocation_policy(self.revocation_policy)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the cookie key is invalid, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let key = CookieKey::from_base64(args.cookie_key.expose_secret())
        .context("invalid TESSERA_COOKIE_KEY")?;
    let verifier =
        CredentialVerifier::new(args.password_cost).context("invalid password hashing cost")?;
    let config = args.auth_config();
    debug!("auth config: {:?}", config);

    let storage = Storage::connect(args.dsn.as_deref()).await?;

    let service = AuthService::new(
        storage.users,
        storage.tokens,
        verifier,
        CookieCodec::new(&key),
        Arc::new(LogEmailSender),
        config,
    );

    info!(
        revocation_policy = ?args.revocation_policy,
        "starting tessera"
    );

    api::new(args.port, Arc::new(service), storage.pool).await
}
