use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::SettingsRepository;
use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Whether Jira settings have been saved yet. The popup uses this to
    /// send first-time users to the options page.
    pub configured: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> AppResult<Json<HealthResponse>> {
    let configured = SettingsRepository::get(&state.db).await?.is_some();

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        configured,
    }))
}
