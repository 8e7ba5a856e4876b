use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Jira connection settings (single row)
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JiraSettings {
    pub id: String,
    pub email: String,
    pub jira_token: String,
    pub jira_base_url: String,
    pub jira_default_ticket: String,
    pub rounding_minutes: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJiraSettings {
    pub email: String,
    pub jira_token: String,
    pub jira_base_url: String,
    pub jira_default_ticket: String,
    pub rounding_minutes: i64,
}
