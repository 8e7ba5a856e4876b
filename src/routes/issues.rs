use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::LastUsedIssueRepository;
use crate::error::AppResult;
use crate::services::issues::IssueSearchService;
use crate::services::jira::JiraIssue;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search))
        .route("/last-used", get(last_used).delete(clear_last_used))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// The picker input: empty for "show recents", `#project terms`,
    /// a bare issue key, or free text.
    pub q: Option<String>,
}

/// Search the issue picker: remembered issues first, then remote matches.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<JiraIssue>>> {
    let q = query.q.unwrap_or_default();
    let issues = IssueSearchService::search(&state, &q).await?;
    Ok(Json(issues))
}

/// The raw last-used list, newest first.
async fn last_used(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<JiraIssue>>> {
    let issues = LastUsedIssueRepository::list(&state.db)
        .await?
        .into_iter()
        .map(|row| JiraIssue {
            id: row.issue_id,
            key: row.key,
            summary: row.summary,
        })
        .collect();
    Ok(Json(issues))
}

/// Forget the last-used list (explicit user reset).
async fn clear_last_used(State(state): State<Arc<AppState>>) -> AppResult<Json<serde_json::Value>> {
    LastUsedIssueRepository::clear(&state.db).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}
