use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::LastUsedIssue;
use crate::error::AppResult;

/// Repository for recently booked issues (`last_used_issues` table).
pub struct LastUsedIssueRepository;

impl LastUsedIssueRepository {
    /// Move an issue to the front of the last-used list (insert or refresh
    /// its recency timestamp).
    pub async fn touch(
        pool: &SqlitePool,
        key: &str,
        issue_id: &str,
        summary: &str,
    ) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO last_used_issues (key, issue_id, summary, used_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                issue_id = excluded.issue_id,
                summary = excluded.summary,
                used_at = excluded.used_at
            "#,
        )
        .bind(key)
        .bind(issue_id)
        .bind(summary)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Recently used issues, newest first.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<LastUsedIssue>> {
        let rows = sqlx::query_as::<_, LastUsedIssue>(
            r#"
            SELECT key, issue_id, summary, used_at
            FROM last_used_issues
            ORDER BY used_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Drop the whole list (explicit user reset).
    pub async fn clear(pool: &SqlitePool) -> AppResult<()> {
        sqlx::query("DELETE FROM last_used_issues")
            .execute(pool)
            .await?;
        Ok(())
    }
}
