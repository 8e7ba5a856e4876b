use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One remembered title -> ticket association. Merged on every successful
/// booking and consulted during aggregation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TicketMemoryEntry {
    pub title: String,
    pub ticket: String,
    pub updated_at: NaiveDateTime,
}
