//! Wire contract between the extension and this service.
//!
//! The popup and the content script exchange request/response pairs through
//! the extension runtime; the popup then relays the content script's reply
//! verbatim to the aggregate endpoint. Both sides of that relay share these
//! tagged types instead of matching on bare strings.

use serde::{Deserialize, Serialize};

/// One scraped calendar element: the accessibility label carrying the time
/// range and the title attribute carrying the meeting subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedEntry {
    pub label: String,
    pub title: String,
}

/// Everything the content script captures in one pass over the calendar
/// page: the selected day's label, the document language tag, and the raw
/// meeting elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeCapture {
    pub date_label: String,
    pub document_lang: String,
    pub entries: Vec<ScrapedEntry>,
}

/// Requests the popup sends into the extension runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum ExtensionRequest {
    GetCalEntries,
    GetSelectedDay,
}

/// Replies the content script sends back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum ExtensionResponse {
    CalEntries(ScrapeCapture),
    SelectedDay(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_as_tagged_kinds() {
        let json = serde_json::to_value(ExtensionRequest::GetCalEntries).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "getCalEntries" }));
        let json = serde_json::to_value(ExtensionRequest::GetSelectedDay).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "getSelectedDay" }));
    }

    #[test]
    fn cal_entries_reply_carries_the_capture() {
        let reply = ExtensionResponse::CalEntries(ScrapeCapture {
            date_label: "4, October, 2023".to_string(),
            document_lang: "en-US".to_string(),
            entries: vec![ScrapedEntry {
                label: "09:00 to 10:45 Meeting 1".to_string(),
                title: "Meeting 1".to_string(),
            }],
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["kind"], "calEntries");
        assert_eq!(json["payload"]["dateLabel"], "4, October, 2023");
        assert_eq!(json["payload"]["entries"][0]["title"], "Meeting 1");

        let back: ExtensionResponse = serde_json::from_value(json).unwrap();
        match back {
            ExtensionResponse::CalEntries(capture) => {
                assert_eq!(capture.entries.len(), 1);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
