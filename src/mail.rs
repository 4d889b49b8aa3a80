//! Outbound email abstractions.
//!
//! Token flows hand an `EmailMessage` to an `EmailSender`. The sender decides how
//! to deliver (SMTP, API, a queue) and returns `Ok`/`Err`. Delivery failures are
//! logged by the caller and never change the outcome of the request, so the
//! response cannot be used to probe which addresses have accounts.
//!
//! The default sender for local dev is `LogEmailSender`, which logs and returns `Ok(())`.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

/// Message kinds, each with the data its template needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum Email {
    /// Welcome mail carrying the activation token.
    Activation { token: String },
    PasswordReset { token: String },
}

impl Email {
    #[must_use]
    pub fn template(&self) -> &'static str {
        match self {
            Self::Activation { .. } => "activation",
            Self::PasswordReset { .. } => "password_reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub email: Email,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error describing why it failed.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the message kind instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        // Tokens are bearer secrets; only the template is logged.
        info!(
            to_email = %message.to_email,
            template = message.email.template(),
            "email send stub"
        );
        Ok(())
    }
}
