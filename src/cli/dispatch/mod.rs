//! Map parsed CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        cookie_key: auth_opts.cookie_key,
        access_ttl_seconds: auth_opts.access_ttl_seconds,
        activation_ttl_seconds: auth_opts.activation_ttl_seconds,
        password_reset_ttl_seconds: auth_opts.password_reset_ttl_seconds,
        refresh_ttl_seconds: auth_opts.refresh_ttl_seconds,
        password_cost: auth_opts.password_cost,
        revocation_policy: auth_opts.revocation_policy,
    }))
}
