use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::AppResult;
use crate::hash::meeting_id;
use crate::locale;
use crate::messaging::{ScrapeCapture, ScrapedEntry};
use crate::services::meetings::{infer_ticket, Meeting};

lazy_static! {
    /// Start and end times inside a calendar element's accessibility label,
    /// e.g. "09:00 to 10:45, Meeting 1". Greedy middle match so the last
    /// time in the label wins as the end bound.
    static ref LABEL_TIMES_RE: Regex =
        Regex::new(r"(\d{2}:\d{2}).*(\d{2}:\d{2})").expect("valid regex");
}

const FALLBACK_TIME: &str = "00:00";
const FALLBACK_TITLE: &str = "No title";

/// Where scrape captures come from. The only production source is the
/// extension relay, but the seam keeps the aggregation core testable
/// without a browser behind it.
#[async_trait]
pub trait MeetingSource: Send + Sync {
    async fn capture(&self) -> AppResult<ScrapeCapture>;
}

/// A capture the extension popup already relayed to us.
pub struct RelayedCapture(pub ScrapeCapture);

#[async_trait]
impl MeetingSource for RelayedCapture {
    async fn capture(&self) -> AppResult<ScrapeCapture> {
        Ok(self.0.clone())
    }
}

/// Turn a raw scrape capture into meeting records: parse the day label under
/// the document locale, lift the `HH:mm` bounds of each entry into absolute
/// instants, and derive id, duration and candidate ticket.
///
/// An unsupported document language or malformed day label fails the whole
/// capture; an entry whose instants cannot be constructed is skipped with a
/// warning so one broken element does not hide the rest of the day.
pub fn parse_capture(
    capture: &ScrapeCapture,
    ticket_memory: &HashMap<String, String>,
    default_ticket: &str,
) -> AppResult<Vec<Meeting>> {
    let locale_key = locale::normalize_locale(&capture.document_lang)?;
    let date = locale::parse_date_label(&capture.date_label, &locale_key)?;

    let mut meetings = Vec::with_capacity(capture.entries.len());
    for entry in &capture.entries {
        match parse_entry(entry, date, ticket_memory, default_ticket) {
            Ok(meeting) => meetings.push(meeting),
            Err(e) => {
                warn!(
                    "Skipping calendar entry with unusable label '{}': {}",
                    entry.label, e
                );
            }
        }
    }

    Ok(meetings)
}

fn parse_entry(
    entry: &ScrapedEntry,
    date: NaiveDate,
    ticket_memory: &HashMap<String, String>,
    default_ticket: &str,
) -> AppResult<Meeting> {
    let (start, end) = match LABEL_TIMES_RE.captures(&entry.label) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (FALLBACK_TIME.to_string(), FALLBACK_TIME.to_string()),
    };

    let start_instant = to_instant(date, &start)?;
    let end_instant = to_instant(date, &end)?;

    let title = entry
        .title
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or(FALLBACK_TITLE)
        .to_string();

    let ticket = infer_ticket(&title)
        .or_else(|| ticket_memory.get(&title).cloned())
        .unwrap_or_else(|| default_ticket.to_string());

    let start_time = start_instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    let end_time = end_instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    let duration = (end_instant - start_instant).num_milliseconds().to_string();

    Ok(Meeting {
        id: meeting_id(&title, &start_time, &end_time),
        start_time,
        end_time,
        start,
        end,
        duration,
        title,
        ticket,
        booked: false,
        pending: false,
        discarded: false,
    })
}

fn to_instant(
    date: NaiveDate,
    time_label: &str,
) -> Result<chrono::DateTime<chrono::Utc>, crate::locale::LocaleError> {
    let time = locale::parse_time_label(time_label)?;
    let naive = date.and_time(time);
    chrono::Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .ok_or_else(|| {
            crate::locale::LocaleError::DateParse(
                format!("{} {}", date, time_label),
                "local wall-clock time".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(entries: Vec<ScrapedEntry>) -> ScrapeCapture {
        ScrapeCapture {
            date_label: "4, October, 2023".to_string(),
            document_lang: "en-US".to_string(),
            entries,
        }
    }

    fn entry(label: &str, title: &str) -> ScrapedEntry {
        ScrapedEntry {
            label: label.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn parses_time_bounds_and_duration() {
        let meetings = parse_capture(
            &capture(vec![entry("09:00 to 10:45, busy", "Meeting 1\nRoom 4")]),
            &HashMap::new(),
            "CWAL-1",
        )
        .unwrap();

        assert_eq!(meetings.len(), 1);
        let m = &meetings[0];
        assert_eq!(m.start, "09:00");
        assert_eq!(m.end, "10:45");
        assert_eq!(m.duration, (105 * 60 * 1000).to_string());
        assert_eq!(m.title, "Meeting 1");
        assert_eq!(m.ticket, "CWAL-1");
        assert!(!m.booked && !m.pending && !m.discarded);
    }

    #[test]
    fn id_is_stable_across_repeated_scrapes() {
        let scrape = capture(vec![entry("09:00 to 10:45, busy", "Meeting 1")]);
        let first = parse_capture(&scrape, &HashMap::new(), "CWAL-1").unwrap();
        let second = parse_capture(&scrape, &HashMap::new(), "CWAL-1").unwrap();
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn label_without_times_falls_back_to_midnight() {
        let meetings = parse_capture(
            &capture(vec![entry("all day: focus block", "Focus")]),
            &HashMap::new(),
            "CWAL-1",
        )
        .unwrap();

        assert_eq!(meetings[0].start, "00:00");
        assert_eq!(meetings[0].end, "00:00");
        assert_eq!(meetings[0].duration, "0");
    }

    #[test]
    fn blank_title_falls_back() {
        let meetings = parse_capture(
            &capture(vec![entry("09:00 to 09:30", "  \nsecond line")]),
            &HashMap::new(),
            "CWAL-1",
        )
        .unwrap();
        assert_eq!(meetings[0].title, "No title");
    }

    #[test]
    fn ticket_prefers_title_key_over_memory_and_default() {
        let memory = HashMap::from([("PROJ-7 triage".to_string(), "OTHER-1".to_string())]);
        let meetings = parse_capture(
            &capture(vec![
                entry("09:00 to 09:30", "PROJ-7 triage"),
                entry("10:00 to 10:30", "Planning"),
            ]),
            &memory,
            "CWAL-1",
        )
        .unwrap();

        assert_eq!(meetings[0].ticket, "PROJ-7");
        assert_eq!(meetings[1].ticket, "CWAL-1");
    }

    #[test]
    fn remembered_title_beats_default() {
        let memory = HashMap::from([("Planning".to_string(), "PLAN-9".to_string())]);
        let meetings = parse_capture(
            &capture(vec![entry("10:00 to 10:30", "Planning")]),
            &memory,
            "CWAL-1",
        )
        .unwrap();
        assert_eq!(meetings[0].ticket, "PLAN-9");
    }

    #[test]
    fn unsupported_document_language_fails_the_capture() {
        let mut scrape = capture(vec![entry("09:00 to 09:30", "Daily")]);
        scrape.document_lang = "de-DE".to_string();
        assert!(parse_capture(&scrape, &HashMap::new(), "CWAL-1").is_err());
    }

    #[tokio::test]
    async fn relayed_capture_hands_back_the_payload() {
        let source = RelayedCapture(capture(vec![entry("09:00 to 09:30", "Daily")]));
        let got = source.capture().await.unwrap();
        assert_eq!(got.entries.len(), 1);
    }
}
