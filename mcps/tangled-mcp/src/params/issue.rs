//! Issue-related parameter types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueCreateParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Issue title")]
    pub title: String,
    #[schemars(description = "Issue body in markdown")]
    pub body: Option<String>,
    #[schemars(
        description = "Label names (e.g., ['good-first-issue', 'bug']) to apply; must be labels the repo subscribes to"
    )]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueUpdateParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Issue number (e.g., 1, 2, 3...)")]
    pub issue_id: u64,
    #[schemars(description = "New issue title (omit to keep the current one)")]
    pub title: Option<String>,
    #[schemars(description = "New issue body (omit to keep the current one)")]
    pub body: Option<String>,
    #[schemars(
        description = "Label names to SET, replacing all existing labels; use [] to remove every label, omit to leave labels alone"
    )]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueDeleteParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Issue number to delete (e.g., 1, 2, 3...)")]
    pub issue_id: u64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueListParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Maximum number of issues to return, 1-100 (default: 20)")]
    pub limit: Option<u32>,
    #[schemars(description = "Pagination cursor from a previous call")]
    pub cursor: Option<String>,
}
