use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::Duration;

/// Purpose label for a token. Validation always matches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Access,
    Activation,
    PasswordReset,
    Refresh,
}

impl Scope {
    pub const ALL: [Scope; 4] = [
        Scope::Access,
        Scope::Activation,
        Scope::PasswordReset,
        Scope::Refresh,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Access => "access",
            Scope::Activation => "activation",
            Scope::PasswordReset => "password-reset",
            Scope::Refresh => "refresh",
        }
    }

    /// Lifetime used when the configuration does not override it.
    #[must_use]
    pub fn default_ttl(self) -> Duration {
        match self {
            Scope::Access => Duration::hours(1),
            Scope::Activation => Duration::hours(72),
            Scope::PasswordReset => Duration::minutes(45),
            Scope::Refresh => Duration::hours(168),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == value)
            .ok_or_else(|| anyhow!("unknown token scope: {value}"))
    }
}
