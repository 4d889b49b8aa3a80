//! User endpoints: registration, activation, password reset and self lookup.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::require_auth;
use crate::auth::{
    types::{ActivateRequest, MessageResponse, RegisterRequest, ResetPasswordRequest},
    AuthService,
};

pub async fn register(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.register(&request).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn activate(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<ActivateRequest>>,
) -> impl IntoResponse {
    let request: ActivateRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.activate(&request).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn reset_password(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.reset_password(&request).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("your password was successfully reset")),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn me(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    match require_auth(&headers, &auth).await {
        Ok(principal) => (StatusCode::OK, Json(principal.user)).into_response(),
        Err(err) => err.into_response(),
    }
}
