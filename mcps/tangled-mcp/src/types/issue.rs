//! Issue tool results

use serde::Serialize;

/// Result of creating an issue
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueResult {
    /// Normalized `owner/repo`
    pub repo: String,
    pub issue_id: u64,
    pub uri: String,
    pub cid: String,
    pub url: String,
}

/// Result of updating an issue
#[derive(Debug, Clone, Serialize)]
pub struct UpdateIssueResult {
    pub repo: String,
    pub issue_id: u64,
    pub uri: String,
    pub cid: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteIssueResult {
    pub issue_id: u64,
    pub uri: String,
}
