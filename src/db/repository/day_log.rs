use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppResult;

/// Repository for the per-day booked/discarded meeting-id logs
/// (`booked_meetings_by_day` and `discarded_meetings_by_day` tables).
pub struct DayLogRepository;

impl DayLogRepository {
    /// Record a meeting as booked for the given day label. The upsert is a
    /// single statement, so two bookings racing on the same day cannot lose
    /// each other's entries.
    pub async fn add_booked(pool: &SqlitePool, day_label: &str, meeting_id: &str) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO booked_meetings_by_day (id, day_label, meeting_id, booked_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(day_label, meeting_id) DO UPDATE SET booked_at = excluded.booked_at
            "#,
        )
        .bind(id)
        .bind(day_label)
        .bind(meeting_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// All meeting ids booked on the given day, in booking order.
    pub async fn booked_ids(pool: &SqlitePool, day_label: &str) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT meeting_id FROM booked_meetings_by_day
            WHERE day_label = ?
            ORDER BY booked_at ASC
            "#,
        )
        .bind(day_label)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Record a meeting as discarded for the given day label.
    pub async fn add_discarded(
        pool: &SqlitePool,
        day_label: &str,
        meeting_id: &str,
    ) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO discarded_meetings_by_day (id, day_label, meeting_id, discarded_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(day_label, meeting_id) DO UPDATE SET discarded_at = excluded.discarded_at
            "#,
        )
        .bind(id)
        .bind(day_label)
        .bind(meeting_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// All meeting ids discarded on the given day.
    pub async fn discarded_ids(pool: &SqlitePool, day_label: &str) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT meeting_id FROM discarded_meetings_by_day
            WHERE day_label = ?
            "#,
        )
        .bind(day_label)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Purge day-log rows older than the cutoff. Returns the number of
    /// deleted rows across both tables.
    pub async fn purge_older_than(pool: &SqlitePool, cutoff: NaiveDateTime) -> AppResult<u64> {
        let booked = sqlx::query("DELETE FROM booked_meetings_by_day WHERE booked_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;

        let discarded = sqlx::query("DELETE FROM discarded_meetings_by_day WHERE discarded_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;

        Ok(booked.rows_affected() + discarded.rows_affected())
    }
}
