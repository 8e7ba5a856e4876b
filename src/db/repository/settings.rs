use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{JiraSettings, UpdateJiraSettings};
use crate::error::AppResult;

/// The settings table holds a single row under this id.
const SETTINGS_ROW_ID: &str = "default";

/// Repository for the Jira connection settings (`settings` table).
pub struct SettingsRepository;

impl SettingsRepository {
    /// Fetch the settings row, if the user has configured the service yet.
    pub async fn get(pool: &SqlitePool) -> AppResult<Option<JiraSettings>> {
        let row = sqlx::query_as::<_, JiraSettings>(
            r#"
            SELECT id, email, jira_token, jira_base_url, jira_default_ticket,
                   rounding_minutes, created_at, updated_at
            FROM settings
            WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Create or replace the settings row in a single statement and return
    /// the stored state.
    pub async fn upsert(pool: &SqlitePool, update: UpdateJiraSettings) -> AppResult<JiraSettings> {
        let now = Utc::now().naive_utc();

        let record = sqlx::query_as::<_, JiraSettings>(
            r#"
            INSERT INTO settings (
                id, email, jira_token, jira_base_url, jira_default_ticket,
                rounding_minutes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                jira_token = excluded.jira_token,
                jira_base_url = excluded.jira_base_url,
                jira_default_ticket = excluded.jira_default_ticket,
                rounding_minutes = excluded.rounding_minutes,
                updated_at = excluded.updated_at
            RETURNING id, email, jira_token, jira_base_url, jira_default_ticket,
                      rounding_minutes, created_at, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(update.email)
        .bind(update.jira_token)
        .bind(update.jira_base_url)
        .bind(update.jira_default_ticket)
        .bind(update.rounding_minutes)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
