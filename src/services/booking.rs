use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::models::JiraSettings;
use crate::db::{DayLogRepository, LastUsedIssueRepository, SettingsRepository, TicketMemoryRepository};
use crate::error::{AppError, AppResult};
use crate::rounding::round_up_duration_to;
use crate::services::meetings::Meeting;
use crate::AppState;

/// Result of one booking attempt inside "book all". Attempts are
/// independent: one failure never rolls back or blocks the others.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub meeting_id: String,
    pub booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct BookingService;

impl BookingService {
    /// Book one meeting's elapsed time as a worklog on its ticket.
    ///
    /// Persisted state (booked-id log, ticket memory, last-used issues) is
    /// only touched after the worklog was confirmed, so a failed attempt
    /// leaves everything unchanged and retry is safe.
    pub async fn book_meeting(
        state: &Arc<AppState>,
        day_label: &str,
        meeting: &Meeting,
    ) -> AppResult<Meeting> {
        if meeting.booked {
            return Err(AppError::Conflict(format!(
                "Meeting '{}' is already booked",
                meeting.title
            )));
        }
        if meeting.discarded {
            return Err(AppError::BadRequest(format!(
                "Meeting '{}' was discarded",
                meeting.title
            )));
        }

        let settings = SettingsRepository::get(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Jira settings are not configured".to_string()))?;

        let started = parse_instant(&meeting.start_time, "startTime")?;
        let ended = parse_instant(&meeting.end_time, "endTime")?;

        let duration_ms = (ended - started).num_milliseconds();
        if duration_ms <= 0 {
            return Err(AppError::Validation(format!(
                "Meeting '{}' has a non-positive duration",
                meeting.title
            )));
        }

        let rounded_ms = round_up_duration_to(duration_ms, settings.rounding_minutes as u32);
        let time_spent_seconds = rounded_ms / 1000;

        state
            .jira
            .add_worklog(
                &meeting.ticket,
                started,
                time_spent_seconds,
                Some(&meeting.title),
                &settings,
            )
            .await?;

        info!(
            "Booked {}s on {} for meeting '{}'",
            time_spent_seconds, meeting.ticket, meeting.title
        );

        DayLogRepository::add_booked(&state.db, day_label, &meeting.id).await?;
        TicketMemoryRepository::upsert(&state.db, &meeting.title, &meeting.ticket).await?;
        Self::refresh_last_used(state, &meeting.ticket, &settings).await;

        let mut booked = meeting.clone();
        booked.booked = true;
        booked.pending = false;
        Ok(booked)
    }

    /// Book every unfinished, non-discarded meeting of the day, one request
    /// per meeting, collecting independent pass/fail outcomes.
    pub async fn book_all(
        state: &Arc<AppState>,
        day_label: &str,
        meetings: &[Meeting],
    ) -> Vec<BookingOutcome> {
        let mut outcomes = Vec::new();

        for meeting in meetings {
            if meeting.booked || meeting.discarded {
                continue;
            }

            let outcome = match Self::book_meeting(state, day_label, meeting).await {
                Ok(_) => BookingOutcome {
                    meeting_id: meeting.id.clone(),
                    booked: true,
                    error: None,
                },
                Err(e) => {
                    warn!("Failed to book meeting '{}': {}", meeting.title, e);
                    BookingOutcome {
                        meeting_id: meeting.id.clone(),
                        booked: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Exclude a meeting from "book all" and from future aggregation passes.
    pub async fn discard(state: &Arc<AppState>, day_label: &str, meeting_id: &str) -> AppResult<()> {
        DayLogRepository::add_discarded(&state.db, day_label, meeting_id).await
    }

    // Best effort: the booking already succeeded, so a failed refresh only
    // costs the picker a suggestion.
    async fn refresh_last_used(state: &Arc<AppState>, ticket: &str, settings: &JiraSettings) {
        match state.jira.find_issue(ticket, settings).await {
            Ok(Some(issue)) => {
                if let Err(e) =
                    LastUsedIssueRepository::touch(&state.db, &issue.key, &issue.id, &issue.summary)
                        .await
                {
                    warn!("Failed to store last-used issue {}: {:?}", issue.key, e);
                }
            }
            Ok(None) => {
                warn!("Booked ticket {} not found when refreshing last-used issues", ticket);
            }
            Err(e) => {
                warn!("Failed to refresh last-used issue {}: {:?}", ticket, e);
            }
        }
    }
}

fn parse_instant(value: &str, field: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("Invalid {}: '{}'", field, value)))
}
