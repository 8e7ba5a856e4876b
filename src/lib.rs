use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod db;
pub mod error;
pub mod hash;
pub mod locale;
pub mod messaging;
pub mod rounding;
pub mod routes;
pub mod services;

use config::Config;
use services::jira::JiraService;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub jira: JiraService,
}

/// Build the full application router. Separated from `main` so integration
/// tests can drive the service against an in-memory database.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    let cors = match state
        .config
        .server
        .extension_origin
        .parse::<HeaderValue>()
    {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                "Invalid EXTENSION_ORIGIN '{}'; popup requests will be blocked by CORS",
                state.config.server.extension_origin
            );
            cors
        }
    };

    Router::new()
        // Health check (also tells the popup whether settings exist yet)
        .route("/health", get(routes::health::health_check))
        // Meeting aggregation and booking
        .nest("/api/meetings", routes::meetings::router())
        // Issue picker search
        .nest("/api/issues", routes::issues::router())
        // Options page settings
        .nest("/api/settings", routes::settings::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
