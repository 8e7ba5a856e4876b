use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::db::models::JiraSettings;
use crate::error::{AppError, AppResult};

const REST_API_PATH: &str = "rest/api/3";

lazy_static! {
    /// A bare issue key ("PROJ-123") anywhere in a search query.
    static ref ISSUE_KEY_RE: Regex = Regex::new(r"(?i)\w+-\d+").expect("valid regex");
}

#[derive(Debug, Clone)]
pub struct JiraService {
    client: Client,
}

// ============================================================================
// Issue Types
// ============================================================================

/// Normalized tracker issue as the popup consumes it. A read-only
/// projection of the tracker's `id`/`key`/`fields.summary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    id: String,
    key: String,
    fields: SearchIssueFields,
}

#[derive(Debug, Deserialize)]
struct SearchIssueFields {
    #[serde(default)]
    summary: String,
}

// ============================================================================
// Worklog Types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateWorklogRequest {
    started: String,
    #[serde(rename = "timeSpentSeconds")]
    time_spent_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<serde_json::Value>,
}

impl JiraService {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self { client })
    }

    fn auth_header(settings: &JiraSettings) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", settings.email, settings.jira_token))
        )
    }

    fn api_url(settings: &JiraSettings, path: &str) -> String {
        format!(
            "{}/{}/{}",
            settings.jira_base_url.trim_end_matches('/'),
            REST_API_PATH,
            path
        )
    }

    fn request(
        &self,
        builder: reqwest::RequestBuilder,
        settings: &JiraSettings,
    ) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", Self::auth_header(settings))
            .header("Accept", "application/json")
            .header("X-Atlassian-Token", "no-check")
    }

    // ========================================================================
    // Search Methods
    // ========================================================================

    /// Run a JQL search and shape the result into normalized issues.
    ///
    /// There are no automatic retries here: a failed search surfaces to the
    /// popup and the user re-triggers it.
    pub async fn search(&self, jql: &str, settings: &JiraSettings) -> AppResult<Vec<JiraIssue>> {
        let url = format!(
            "{}?jql={}",
            Self::api_url(settings, "search"),
            urlencoding::encode(jql)
        );

        let response = self.request(self.client.get(url), settings).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::JiraApi(format!(
                "Search failed: {}",
                error_text
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::JiraApi(format!("Failed to parse search response: {}", e)))?;

        Ok(search
            .issues
            .into_iter()
            .map(|issue| JiraIssue {
                id: issue.id,
                key: issue.key,
                summary: issue.fields.summary,
            })
            .collect())
    }

    /// Exact lookup of a single issue by key.
    pub async fn find_issue(
        &self,
        key: &str,
        settings: &JiraSettings,
    ) -> AppResult<Option<JiraIssue>> {
        let issues = self
            .search(&format!("issue = {}", key), settings)
            .await?;
        Ok(issues.into_iter().next())
    }

    // ========================================================================
    // Worklog Methods
    // ========================================================================

    /// Create a worklog on an issue: `started` instant plus the elapsed time
    /// in seconds, with an optional plain-text comment.
    pub async fn add_worklog(
        &self,
        issue_key: &str,
        started: DateTime<Utc>,
        time_spent_seconds: i64,
        comment: Option<&str>,
        settings: &JiraSettings,
    ) -> AppResult<()> {
        let request = CreateWorklogRequest {
            // Jira expects a zone offset, not the 'Z' suffix.
            started: started.to_rfc3339_opts(SecondsFormat::Millis, false),
            time_spent_seconds,
            comment: comment.map(adf_comment),
        };

        let url = Self::api_url(settings, &format!("issue/{}/worklog", issue_key));
        let response = self
            .request(self.client.post(url), settings)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::JiraApi(format!(
                "Failed to create worklog on {}: {}",
                issue_key, error_text
            )));
        }

        Ok(())
    }

    // ========================================================================
    // Connection Methods
    // ========================================================================

    /// Verify that the stored credentials can reach the Jira instance. Uses
    /// the configured default ticket when one is set, the current-user
    /// endpoint otherwise.
    pub async fn test_connection(&self, settings: &JiraSettings) -> AppResult<()> {
        let path = if settings.jira_default_ticket.is_empty() {
            "myself".to_string()
        } else {
            format!("issue/{}", settings.jira_default_ticket)
        };

        let response = self
            .request(self.client.get(Self::api_url(settings, &path)), settings)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::JiraApi(format!(
                "Could not connect to Jira (status {})",
                response.status()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Query Parsing
// ============================================================================

/// Build the JQL for a user query. Three shapes, tried in order:
/// a leading `#project` token splits into a project filter plus an optional
/// summary search, a bare issue key becomes an exact lookup, and anything
/// else is a free-text summary search.
pub fn build_jql(query: &str) -> String {
    let query = query.trim();

    if let Some(rest) = query.strip_prefix('#') {
        let (project, summary) = match rest.split_once(char::is_whitespace) {
            Some((project, summary)) => (project, summary.trim()),
            None => (rest, ""),
        };
        if summary.is_empty() {
            return format!("project = {}", project);
        }
        return format!("project = {} AND summary ~ \"{}\"", project, summary);
    }

    if let Some(key) = ISSUE_KEY_RE.find(query) {
        return format!("issue = {}", key.as_str());
    }

    format!("summary ~ \"{}\"", query)
}

/// The minimal Atlassian document wrapping a plain-text comment.
fn adf_comment(text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }]
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_token_builds_project_filter() {
        assert_eq!(build_jql("#CWAL"), "project = CWAL");
        assert_eq!(
            build_jql("#CWAL onboarding docs"),
            "project = CWAL AND summary ~ \"onboarding docs\""
        );
    }

    #[test]
    fn issue_key_builds_exact_lookup() {
        assert_eq!(build_jql("PROJ-123"), "issue = PROJ-123");
        assert_eq!(build_jql("look at proj-9"), "issue = proj-9");
    }

    #[test]
    fn free_text_builds_summary_search() {
        assert_eq!(build_jql("standup notes"), "summary ~ \"standup notes\"");
    }

    #[test]
    fn project_shape_wins_over_key_shape() {
        assert_eq!(
            build_jql("#CWAL PROJ-123"),
            "project = CWAL AND summary ~ \"PROJ-123\""
        );
    }
}
