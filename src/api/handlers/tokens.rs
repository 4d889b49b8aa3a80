//! Token endpoints: login, refresh rotation, logout and the mailed-token requests.
//!
//! Flow Overview:
//! 1) Login returns the access token in the body and sets the sealed refresh cookie.
//! 2) Refresh opens the cookie, rotates the refresh token and sets the new cookie.
//! 3) A rejected refresh clears the cookie so the client falls back to login.

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::auth::{
    cookie::find_cookie,
    service::AuthSession,
    types::{AccessTokenResponse, EmailRequest, LoginRequest, MessageResponse, TokenResponse},
    AuthError, AuthService, CookieCodec, REFRESH_COOKIE_NAME,
};

fn cookie_headers(cookie: &str) -> Result<HeaderMap, AuthError> {
    let value = HeaderValue::from_str(cookie).context("invalid Set-Cookie value")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

fn session_response(session: &AuthSession, status: StatusCode) -> Response {
    match cookie_headers(&session.refresh_cookie) {
        Ok(headers) => (
            status,
            headers,
            Json(AccessTokenResponse {
                authentication_token: TokenResponse::from(&session.access),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.login(&request).await {
        Ok(session) => session_response(&session, StatusCode::CREATED),
        Err(err) => err.into_response(),
    }
}

pub async fn refresh(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    let Some(cookie) = find_cookie(&headers, REFRESH_COOKIE_NAME) else {
        return AuthError::InvalidToken.into_response();
    };

    match auth.refresh(&cookie).await {
        Ok(session) => session_response(&session, StatusCode::CREATED),
        Err(err) if err.is_internal() => err.into_response(),
        Err(err) => {
            let mut response = err.into_response();
            if let Ok(clear) = HeaderValue::from_str(&CookieCodec::clear(REFRESH_COOKIE_NAME)) {
                response.headers_mut().insert(SET_COOKIE, clear);
            }
            response
        }
    }
}

pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    let cookie = find_cookie(&headers, REFRESH_COOKIE_NAME);
    // Always clear the cookie, even if the token was missing.
    let clear = auth.logout(cookie.as_deref()).await;
    match cookie_headers(&clear) {
        Ok(headers) => (StatusCode::NO_CONTENT, headers).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn resend_activation(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<EmailRequest>>,
) -> impl IntoResponse {
    let request: EmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.resend_activation(&request).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(MessageResponse::new(
                "an email will be sent to you containing activation instructions",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn request_password_reset(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<EmailRequest>>,
) -> impl IntoResponse {
    let request: EmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth.request_password_reset(&request).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(MessageResponse::new(
                "an email will be sent to you containing password reset instructions",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
