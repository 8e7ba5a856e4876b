use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Per-day meeting logs (booked and discarded ids keyed by day label)
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookedMeeting {
    pub id: String,
    pub day_label: String,
    pub meeting_id: String,
    pub booked_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DiscardedMeeting {
    pub id: String,
    pub day_label: String,
    pub meeting_id: String,
    pub discarded_at: NaiveDateTime,
}
