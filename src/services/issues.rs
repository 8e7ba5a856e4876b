use std::sync::Arc;

use crate::db::models::LastUsedIssue;
use crate::db::LastUsedIssueRepository;
use crate::error::{AppError, AppResult};
use crate::services::jira::{build_jql, JiraIssue};
use crate::AppState;

/// Issue picker search: merges locally remembered issues with a remote JQL
/// search.
pub struct IssueSearchService;

impl IssueSearchService {
    /// Search issues for the picker. An empty query returns the last-used
    /// list as-is; otherwise matching last-used issues are placed ahead of
    /// the remote results, deduplicated by key.
    pub async fn search(state: &Arc<AppState>, query: &str) -> AppResult<Vec<JiraIssue>> {
        let last_used: Vec<JiraIssue> = LastUsedIssueRepository::list(&state.db)
            .await?
            .into_iter()
            .map(issue_from_row)
            .collect();

        let query = query.trim();
        if query.is_empty() {
            return Ok(last_used);
        }

        let settings = crate::db::SettingsRepository::get(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Jira settings are not configured".to_string()))?;

        let local_matches = filter_by_query(last_used, query);
        let remote = state.jira.search(&build_jql(query), &settings).await?;

        Ok(merge_results(local_matches, remote))
    }
}

fn issue_from_row(row: LastUsedIssue) -> JiraIssue {
    JiraIssue {
        id: row.issue_id,
        key: row.key,
        summary: row.summary,
    }
}

/// Keep issues whose key plus summary contain every query token,
/// case-insensitively.
fn filter_by_query(issues: Vec<JiraIssue>, query: &str) -> Vec<JiraIssue> {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    issues
        .into_iter()
        .filter(|issue| {
            let haystack = format!("{} {}", issue.key, issue.summary).to_lowercase();
            tokens.iter().all(|token| haystack.contains(token))
        })
        .collect()
}

/// Local matches first, then remote results whose key is not already taken.
fn merge_results(local: Vec<JiraIssue>, remote: Vec<JiraIssue>) -> Vec<JiraIssue> {
    let mut merged = local;
    for issue in remote {
        if !merged.iter().any(|known| known.key == issue.key) {
            merged.push(issue);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(key: &str, summary: &str) -> JiraIssue {
        JiraIssue {
            id: key.to_string(),
            key: key.to_string(),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn filter_requires_every_token() {
        let issues = vec![
            issue("CWAL-1", "Weekly team sync"),
            issue("CWAL-2", "Planning session"),
        ];

        let hits = filter_by_query(issues.clone(), "weekly sync");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "CWAL-1");

        assert!(filter_by_query(issues.clone(), "weekly planning").is_empty());
        // Key text is part of the haystack.
        assert_eq!(filter_by_query(issues, "cwal-2").len(), 1);
    }

    #[test]
    fn merge_puts_local_first_and_dedupes_by_key() {
        let local = vec![issue("CWAL-1", "Weekly team sync")];
        let remote = vec![
            issue("CWAL-1", "Weekly team sync (remote copy)"),
            issue("CWAL-9", "Retro"),
        ];

        let merged = merge_results(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].key, "CWAL-1");
        assert_eq!(merged[0].summary, "Weekly team sync");
        assert_eq!(merged[1].key, "CWAL-9");
    }
}
