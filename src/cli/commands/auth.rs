use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::{PasswordCost, RevocationPolicy, Scope};

pub const ARG_COOKIE_KEY: &str = "cookie-key";
pub const ARG_ACCESS_TTL: &str = "access-token-ttl-seconds";
pub const ARG_ACTIVATION_TTL: &str = "activation-token-ttl-seconds";
pub const ARG_PASSWORD_RESET_TTL: &str = "password-reset-token-ttl-seconds";
pub const ARG_REFRESH_TTL: &str = "refresh-token-ttl-seconds";
pub const ARG_PASSWORD_ITERATIONS: &str = "password-iterations";
pub const ARG_PASSWORD_MEMORY_KIB: &str = "password-memory-kib";
pub const ARG_PASSWORD_PARALLELISM: &str = "password-parallelism";
pub const ARG_REUSE_REVOKES_ACCESS: &str = "reuse-revokes-access";

#[derive(Debug)]
pub struct Options {
    pub cookie_key: SecretString,
    pub access_ttl_seconds: i64,
    pub activation_ttl_seconds: i64,
    pub password_reset_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub password_cost: PasswordCost,
    pub revocation_policy: RevocationPolicy,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let cookie_key = matches
            .get_one::<String>(ARG_COOKIE_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --cookie-key")?;
        let seconds = |id: &str, scope: Scope| {
            matches
                .get_one::<i64>(id)
                .copied()
                .unwrap_or_else(|| scope.default_ttl().num_seconds())
        };
        let defaults = PasswordCost::default();
        let revocation_policy = if matches.get_flag(ARG_REUSE_REVOKES_ACCESS) {
            RevocationPolicy::RefreshAndAccess
        } else {
            RevocationPolicy::RefreshOnly
        };

        Ok(Self {
            cookie_key,
            access_ttl_seconds: seconds(ARG_ACCESS_TTL, Scope::Access),
            activation_ttl_seconds: seconds(ARG_ACTIVATION_TTL, Scope::Activation),
            password_reset_ttl_seconds: seconds(ARG_PASSWORD_RESET_TTL, Scope::PasswordReset),
            refresh_ttl_seconds: seconds(ARG_REFRESH_TTL, Scope::Refresh),
            password_cost: PasswordCost {
                memory_kib: matches
                    .get_one::<u32>(ARG_PASSWORD_MEMORY_KIB)
                    .copied()
                    .unwrap_or(defaults.memory_kib),
                iterations: matches
                    .get_one::<u32>(ARG_PASSWORD_ITERATIONS)
                    .copied()
                    .unwrap_or(defaults.iterations),
                parallelism: matches
                    .get_one::<u32>(ARG_PASSWORD_PARALLELISM)
                    .copied()
                    .unwrap_or(defaults.parallelism),
            },
            revocation_policy,
        })
    }
}

/// Upper bound for any token TTL, ten years.
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 86_400;

fn ttl_arg(id: &'static str, env: &'static str, help: &'static str, scope: Scope) -> Arg {
    let default: &'static str = match scope {
        Scope::Access => "3600",
        Scope::Activation => "259200",
        Scope::PasswordReset => "2700",
        Scope::Refresh => "604800",
    };
    Arg::new(id)
        .long(id)
        .help(help)
        .env(env)
        .default_value(default)
        .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL_SECONDS))
}

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_password_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COOKIE_KEY)
                .long(ARG_COOKIE_KEY)
                .help("Base64 encoded 32-byte key sealing the refresh cookie")
                .env("TESSERA_COOKIE_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(ttl_arg(
            ARG_ACCESS_TTL,
            "TESSERA_ACCESS_TOKEN_TTL_SECONDS",
            "Access token TTL in seconds",
            Scope::Access,
        ))
        .arg(ttl_arg(
            ARG_ACTIVATION_TTL,
            "TESSERA_ACTIVATION_TOKEN_TTL_SECONDS",
            "Activation token TTL in seconds",
            Scope::Activation,
        ))
        .arg(ttl_arg(
            ARG_PASSWORD_RESET_TTL,
            "TESSERA_PASSWORD_RESET_TOKEN_TTL_SECONDS",
            "Password reset token TTL in seconds",
            Scope::PasswordReset,
        ))
        .arg(ttl_arg(
            ARG_REFRESH_TTL,
            "TESSERA_REFRESH_TOKEN_TTL_SECONDS",
            "Refresh token TTL in seconds",
            Scope::Refresh,
        ))
        .arg(
            Arg::new(ARG_REUSE_REVOKES_ACCESS)
                .long(ARG_REUSE_REVOKES_ACCESS)
                .help("On refresh token reuse also revoke the user's access tokens")
                .env("TESSERA_REUSE_REVOKES_ACCESS")
                .action(ArgAction::SetTrue),
        )
}

fn with_password_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD_ITERATIONS)
                .long(ARG_PASSWORD_ITERATIONS)
                .help("Argon2id iterations")
                .env("TESSERA_PASSWORD_ITERATIONS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_MEMORY_KIB)
                .long(ARG_PASSWORD_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("TESSERA_PASSWORD_MEMORY_KIB")
                .value_parser(clap::value_parser!(u32).range(8..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_PARALLELISM)
                .long(ARG_PASSWORD_PARALLELISM)
                .help("Argon2id lanes")
                .env("TESSERA_PASSWORD_PARALLELISM")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}
