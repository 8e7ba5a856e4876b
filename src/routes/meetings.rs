use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::{DayLogRepository, SettingsRepository, TicketMemoryRepository};
use crate::error::AppResult;
use crate::messaging::ScrapeCapture;
use crate::services::booking::{BookingOutcome, BookingService};
use crate::services::meetings::{aggregate_meetings, Meeting};
use crate::services::scrape::{parse_capture, MeetingSource, RelayedCapture};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/aggregate", post(aggregate))
        .route("/book", post(book))
        .route("/book-all", post(book_all))
        .route("/discard", post(discard))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub day_label: String,
    pub meeting: Meeting,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAllRequest {
    pub day_label: String,
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardRequest {
    pub day_label: String,
    pub meeting_id: String,
}

#[derive(Debug, Serialize)]
pub struct DiscardResponse {
    pub discarded: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Turn a relayed scrape capture into the day's meeting list: parse the raw
/// entries, merge in the day's booked ids and the title -> ticket memory,
/// and drop meetings the user discarded.
async fn aggregate(
    State(state): State<Arc<AppState>>,
    Json(capture): Json<ScrapeCapture>,
) -> AppResult<Json<Vec<Meeting>>> {
    let source = RelayedCapture(capture);
    let capture = source.capture().await?;

    let default_ticket = SettingsRepository::get(&state.db)
        .await?
        .map(|s| s.jira_default_ticket)
        .unwrap_or_default();
    let ticket_memory = TicketMemoryRepository::as_map(&state.db).await?;

    let scraped = parse_capture(&capture, &ticket_memory, &default_ticket)?;

    let booked_ids = DayLogRepository::booked_ids(&state.db, &capture.date_label).await?;
    let discarded_ids = DayLogRepository::discarded_ids(&state.db, &capture.date_label).await?;

    let meetings: Vec<Meeting> = aggregate_meetings(scraped, &booked_ids, &ticket_memory)
        .into_iter()
        .filter(|meeting| !discarded_ids.contains(&meeting.id))
        .collect();

    Ok(Json(meetings))
}

/// Book a single meeting's time on its ticket.
async fn book(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookRequest>,
) -> AppResult<Json<Meeting>> {
    let booked = BookingService::book_meeting(&state, &request.day_label, &request.meeting).await?;
    Ok(Json(booked))
}

/// Book every unfinished meeting of the day; per-meeting pass/fail, no
/// all-or-nothing guarantee.
async fn book_all(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookAllRequest>,
) -> AppResult<Json<Vec<BookingOutcome>>> {
    let outcomes = BookingService::book_all(&state, &request.day_label, &request.meetings).await;
    Ok(Json(outcomes))
}

/// Exclude a meeting from "book all" and future aggregation passes.
async fn discard(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscardRequest>,
) -> AppResult<Json<DiscardResponse>> {
    BookingService::discard(&state, &request.day_label, &request.meeting_id).await?;
    Ok(Json(DiscardResponse { discarded: true }))
}
