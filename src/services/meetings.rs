use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Ticket key at the start of a word inside a meeting title, e.g.
    /// "PROJ-123 refine backlog". The trailing whitespace requirement keeps
    /// version-like suffixes ("v2-1") at the end of a title from matching.
    static ref TITLE_TICKET_RE: Regex = Regex::new(r"(?i)\b\w+-\d+\s").expect("valid regex");
}

/// One calendar entry together with its derived booking metadata. Field
/// names follow the extension's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Content hash of (title, startTime, endTime); stable across scrapes.
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    /// Localized 24-hour display forms of the same bounds.
    pub start: String,
    pub end: String,
    /// Milliseconds between start and end, as a decimal string.
    pub duration: String,
    pub title: String,
    pub ticket: String,
    pub booked: bool,
    pub pending: bool,
    pub discarded: bool,
}

/// Merge freshly scraped meetings with the day's booked-id list and the
/// title -> ticket memory map.
///
/// Pure and order-preserving: output order is scrape order, and applying the
/// merge twice with the same booked-id set yields the same result as once.
///
/// Booking state is keyed by the time-based meeting id, while the ticket
/// override is keyed by the raw title string. Two distinct meetings sharing
/// a title therefore receive the same override even if only one of them was
/// booked under that title; this mirrors the behavior users already rely on.
pub fn aggregate_meetings(
    meetings: Vec<Meeting>,
    booked_ids_today: &[String],
    ticket_memory: &HashMap<String, String>,
) -> Vec<Meeting> {
    meetings
        .into_iter()
        .map(|mut meeting| {
            meeting.booked = booked_ids_today.contains(&meeting.id);
            if meeting.booked {
                if let Some(remembered) = ticket_memory.get(&meeting.title) {
                    meeting.ticket = remembered.clone();
                }
            }
            meeting
        })
        .collect()
}

/// Derive a candidate ticket key from a meeting title. Returns `None` when
/// the title carries no key; callers fall back to the remembered
/// association for the title or the configured default ticket, so inference
/// as a whole never fails.
pub fn infer_ticket(title: &str) -> Option<String> {
    TITLE_TICKET_RE
        .find(title)
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meeting(id: &str, title: &str, ticket: &str) -> Meeting {
        Meeting {
            id: id.to_string(),
            start_time: "2023-10-04T07:00:00Z".to_string(),
            end_time: "2023-10-04T08:45:00Z".to_string(),
            start: "09:00".to_string(),
            end: "10:45".to_string(),
            duration: "6300000".to_string(),
            title: title.to_string(),
            ticket: ticket.to_string(),
            booked: false,
            pending: false,
            discarded: false,
        }
    }

    fn sample_data() -> (Vec<Meeting>, Vec<String>, HashMap<String, String>) {
        let meetings = vec![
            sample_meeting("1", "Meeting 1", "TICKET-1"),
            sample_meeting("2", "Daily", "TICKET-2"),
            sample_meeting("3", "ticket-123 setup local repo", "TICKET-123"),
        ];
        let booked = vec!["1".to_string(), "3".to_string()];
        let memory = HashMap::from([
            ("Meeting 1".to_string(), "TICKET-1".to_string()),
            (
                "ticket-123 setup local repo".to_string(),
                "TICKET-3".to_string(),
            ),
        ]);
        (meetings, booked, memory)
    }

    #[test]
    fn merges_booked_state_and_ticket_memory() {
        let (meetings, booked, memory) = sample_data();
        let aggregated = aggregate_meetings(meetings, &booked, &memory);

        assert_eq!(aggregated.len(), 3);
        assert_eq!(aggregated[0].id, "1");
        assert!(aggregated[0].booked);
        assert_eq!(aggregated[0].ticket, "TICKET-1");
        assert_eq!(aggregated[1].id, "2");
        assert!(!aggregated[1].booked);
        assert_eq!(aggregated[1].ticket, "TICKET-2");
        assert_eq!(aggregated[2].id, "3");
        assert!(aggregated[2].booked);
        assert_eq!(aggregated[2].ticket, "TICKET-3");
    }

    #[test]
    fn unbooked_meetings_keep_their_derived_ticket() {
        let (mut meetings, _, memory) = sample_data();
        // "Daily" is in nobody's booked set, but give it a memory entry.
        meetings[1].title = "Meeting 1".to_string();
        let aggregated = aggregate_meetings(meetings, &[], &memory);
        assert_eq!(aggregated[1].ticket, "TICKET-2");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let (meetings, booked, memory) = sample_data();
        let once = aggregate_meetings(meetings, &booked, &memory);
        let twice = aggregate_meetings(once.clone(), &booked, &memory);

        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.booked, b.booked);
            assert_eq!(a.ticket, b.ticket);
        }
    }

    #[test]
    fn preserves_scrape_order() {
        let (meetings, booked, memory) = sample_data();
        let ids: Vec<String> = aggregate_meetings(meetings, &booked, &memory)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn ticket_inference_from_title() {
        assert_eq!(
            infer_ticket("PROJ-42 sprint planning").as_deref(),
            Some("PROJ-42")
        );
        assert_eq!(
            infer_ticket("ticket-123 setup local repo").as_deref(),
            Some("ticket-123")
        );
        assert_eq!(infer_ticket("Daily"), None);
        // Trailing keys without whitespace after them do not match.
        assert_eq!(infer_ticket("cleanup for v2-1"), None);
    }

    #[test]
    fn meeting_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample_meeting("1", "Meeting 1", "TICKET-1")).unwrap();
        assert_eq!(json["startTime"], "2023-10-04T07:00:00Z");
        assert_eq!(json["endTime"], "2023-10-04T08:45:00Z");
        assert_eq!(json["duration"], "6300000");
        assert_eq!(json["booked"], false);
    }
}
