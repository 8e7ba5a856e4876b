use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::TicketMemoryEntry;
use crate::error::AppResult;

/// Repository for the title -> ticket association map (`ticket_memory`).
pub struct TicketMemoryRepository;

impl TicketMemoryRepository {
    /// Remember the ticket a title was booked against, replacing any
    /// previous association for the same title.
    pub async fn upsert(pool: &SqlitePool, title: &str, ticket: &str) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO ticket_memory (title, ticket, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(title) DO UPDATE SET
                ticket = excluded.ticket,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(title)
        .bind(ticket)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// The full memory map, keyed by exact title.
    pub async fn as_map(pool: &SqlitePool) -> AppResult<HashMap<String, String>> {
        let rows = sqlx::query_as::<_, TicketMemoryEntry>(
            "SELECT title, ticket, updated_at FROM ticket_memory",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.title, r.ticket)).collect())
    }

    /// Look up the remembered ticket for a single title.
    pub async fn get(pool: &SqlitePool, title: &str) -> AppResult<Option<String>> {
        let ticket = sqlx::query_scalar::<_, String>(
            "SELECT ticket FROM ticket_memory WHERE title = ?",
        )
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Drop every remembered association (explicit user reset).
    pub async fn clear(pool: &SqlitePool) -> AppResult<()> {
        sqlx::query("DELETE FROM ticket_memory").execute(pool).await?;
        Ok(())
    }
}
