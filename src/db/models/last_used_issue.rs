use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recently booked Jira issue, kept so the issue picker can offer it
/// before any remote search round-trip.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LastUsedIssue {
    pub key: String,
    pub issue_id: String,
    pub summary: String,
    pub used_at: NaiveDateTime,
}
