use crate::{
    api::handlers::{
        health::{self, HealthProbe},
        tokens, users,
    },
    auth::{AuthService, MemoryStore, PgStore, TokenStore, UserStore},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post, put},
    Extension, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;

mod error;
pub mod handlers;

/// Build the API router. Layers and shared state are added by the caller.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/users", post(users::register))
        .route("/v1/users/activated", put(users::activate))
        .route("/v1/users/password", put(users::reset_password))
        .route("/v1/users/me", get(users::me))
        .route("/v1/tokens/authentication", post(tokens::login))
        .route("/v1/tokens/refresh", post(tokens::refresh))
        .route("/v1/tokens/logout", post(tokens::logout))
        .route("/v1/tokens/activation", post(tokens::resend_activation))
        .route("/v1/tokens/password-reset", post(tokens::request_password_reset))
}

/// Storage backing the service, picked from the presence of a DSN.
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub pool: Option<PgPool>,
}

impl Storage {
    /// Connect to Postgres when `dsn` is set, otherwise fall back to the in-memory store.
    ///
    /// # Errors
    /// Returns an error if the database connection fails.
    pub async fn connect(dsn: Option<&str>) -> Result<Self> {
        let Some(dsn) = dsn else {
            warn!("No DSN configured, using the in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            return Ok(Self {
                users: store.clone(),
                tokens: store,
                pool: None,
            });
        };

        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;
        let store = Arc::new(PgStore::new(pool.clone()));

        Ok(Self {
            users: store.clone(),
            tokens: store,
            pool: Some(pool),
        })
    }
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, auth: Arc<AuthService>, pool: Option<PgPool>) -> Result<()> {
    let app = router().layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(auth))
            .layer(Extension(HealthProbe(pool))),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
