//! Pull request tool results

use serde::Serialize;

/// Result of creating a pull request
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullResult {
    /// Normalized `owner/repo`
    pub repo: String,
    pub pull_id: u64,
    pub uri: String,
    pub cid: String,
    pub url: String,
}

/// Result of updating a pull request
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePullResult {
    pub repo: String,
    pub pull_id: u64,
    pub uri: String,
    pub cid: String,
    pub url: String,
}
