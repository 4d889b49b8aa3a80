//! HTTP mapping for `AuthError`.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidToken | Self::ReusedRefreshToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::ValueTooLong | Self::InvalidValue => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail | Self::EditConflict => StatusCode::CONFLICT,
            Self::InactiveAccount => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(errors) => json!({ "error": errors }),
            Self::Internal(err) => {
                // Detail stays in the logs.
                error!("Internal error: {err:#}");
                json!({ "error": "the server encountered a problem and could not process your request" })
            }
            other => json!({ "error": other.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::InvalidToken | Self::ReusedRefreshToken) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
