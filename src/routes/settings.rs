use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::models::UpdateJiraSettings;
use crate::db::{LastUsedIssueRepository, SettingsRepository, TicketMemoryRepository};
use crate::error::{AppError, AppResult};
use crate::AppState;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").expect("valid regex");
    static ref TICKET_KEY_RE: Regex = Regex::new(r"^(?i)[a-z][a-z0-9]*-\d+$").expect("valid regex");
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/reset", post(reset_memory))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub email: String,
    pub jira_token: String,
    pub jira_base_url: String,
    pub jira_default_ticket: String,
    pub rounding_minutes: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub email: String,
    pub jira_token: String,
    pub jira_base_url: String,
    #[serde(default)]
    pub jira_default_ticket: String,
    pub rounding_minutes: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// The stored Jira settings; 404 until the user saves them once.
async fn get_settings(State(state): State<Arc<AppState>>) -> AppResult<Json<SettingsResponse>> {
    let settings = SettingsRepository::get(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Jira settings are not configured".to_string()))?;

    Ok(Json(SettingsResponse {
        email: settings.email,
        jira_token: settings.jira_token,
        jira_base_url: settings.jira_base_url,
        jira_default_ticket: settings.jira_default_ticket,
        rounding_minutes: settings.rounding_minutes,
        updated_at: settings.updated_at,
    }))
}

/// Validate, verify the credentials against Jira, then store. Nothing is
/// persisted when validation or the connection test fails.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> AppResult<Json<SettingsResponse>> {
    let update = validate_settings(request)?;

    let candidate = crate::db::models::JiraSettings {
        id: "candidate".to_string(),
        email: update.email.clone(),
        jira_token: update.jira_token.clone(),
        jira_base_url: update.jira_base_url.clone(),
        jira_default_ticket: update.jira_default_ticket.clone(),
        rounding_minutes: update.rounding_minutes,
        created_at: chrono::Utc::now().naive_utc(),
        updated_at: chrono::Utc::now().naive_utc(),
    };
    state.jira.test_connection(&candidate).await?;

    let stored = SettingsRepository::upsert(&state.db, update).await?;
    tracing::info!("Stored Jira settings for {}", stored.email);

    Ok(Json(SettingsResponse {
        email: stored.email,
        jira_token: stored.jira_token,
        jira_base_url: stored.jira_base_url,
        jira_default_ticket: stored.jira_default_ticket,
        rounding_minutes: stored.rounding_minutes,
        updated_at: stored.updated_at,
    }))
}

/// Clear the title -> ticket memory and the last-used issue list.
async fn reset_memory(State(state): State<Arc<AppState>>) -> AppResult<Json<serde_json::Value>> {
    TicketMemoryRepository::clear(&state.db).await?;
    LastUsedIssueRepository::clear(&state.db).await?;
    tracing::info!("Cleared ticket memory and last-used issues");

    Ok(Json(serde_json::json!({ "reset": true })))
}

// ============================================================================
// Validation
// ============================================================================

fn validate_settings(request: UpdateSettingsRequest) -> AppResult<UpdateJiraSettings> {
    if !EMAIL_RE.is_match(request.email.trim()) {
        return Err(AppError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }

    if request.jira_token.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a valid token".to_string(),
        ));
    }

    let base_url = request.jira_base_url.trim().trim_end_matches('/');
    match url::Url::parse(base_url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        _ => {
            return Err(AppError::Validation(
                "Please enter a valid url".to_string(),
            ))
        }
    }

    let default_ticket = request.jira_default_ticket.trim().to_string();
    if !default_ticket.is_empty() && !TICKET_KEY_RE.is_match(&default_ticket) {
        return Err(AppError::Validation(
            "Default ticket must look like PROJ-123".to_string(),
        ));
    }

    let rounding_minutes = request.rounding_minutes.unwrap_or(15);
    if !(0..=1440).contains(&rounding_minutes) {
        return Err(AppError::Validation(
            "Rounding must be between 0 and 1440 minutes".to_string(),
        ));
    }

    Ok(UpdateJiraSettings {
        email: request.email.trim().to_string(),
        jira_token: request.jira_token,
        jira_base_url: base_url.to_string(),
        jira_default_ticket: default_ticket,
        rounding_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UpdateSettingsRequest {
        UpdateSettingsRequest {
            email: "dev@example.com".to_string(),
            jira_token: "token".to_string(),
            jira_base_url: "https://example.atlassian.net/".to_string(),
            jira_default_ticket: "CWAL-1".to_string(),
            rounding_minutes: Some(15),
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        let update = validate_settings(request()).unwrap();
        assert_eq!(update.jira_base_url, "https://example.atlassian.net");
        assert_eq!(update.jira_default_ticket, "CWAL-1");
        assert_eq!(update.rounding_minutes, 15);
    }

    #[test]
    fn rejects_bad_fields() {
        let mut bad = request();
        bad.email = "not-an-email".to_string();
        assert!(validate_settings(bad).is_err());

        let mut bad = request();
        bad.jira_token = "   ".to_string();
        assert!(validate_settings(bad).is_err());

        let mut bad = request();
        bad.jira_base_url = "example.atlassian.net".to_string();
        assert!(validate_settings(bad).is_err());

        let mut bad = request();
        bad.jira_default_ticket = "not a ticket".to_string();
        assert!(validate_settings(bad).is_err());

        let mut bad = request();
        bad.rounding_minutes = Some(-5);
        assert!(validate_settings(bad).is_err());
    }

    #[test]
    fn default_ticket_and_rounding_are_optional() {
        let mut req = request();
        req.jira_default_ticket = String::new();
        req.rounding_minutes = None;
        let update = validate_settings(req).unwrap();
        assert_eq!(update.jira_default_ticket, "");
        assert_eq!(update.rounding_minutes, 15);
    }
}
