//! Pull request parameter types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PullCreateParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Pull request title")]
    pub title: String,
    #[schemars(description = "Target branch (e.g., 'main')")]
    pub base: String,
    #[schemars(description = "Source branch (e.g., 'feature-branch')")]
    pub head: String,
    #[schemars(description = "Git diff content")]
    pub patch: String,
    #[schemars(description = "Pull request description")]
    pub body: Option<String>,
    #[schemars(description = "Full 40-character commit hash of the source branch head")]
    pub source_sha: Option<String>,
    #[schemars(description = "Label names (e.g., ['enhancement']) to apply")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PullUpdateParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Pull request number (e.g., 1, 2, 3...)")]
    pub pull_id: u64,
    #[schemars(description = "New title (omit to keep the current one)")]
    pub title: Option<String>,
    #[schemars(description = "New description (omit to keep the current one)")]
    pub body: Option<String>,
    #[schemars(description = "New target branch (omit to keep the current one)")]
    pub base: Option<String>,
    #[schemars(
        description = "Label names to SET, replacing all existing labels; use [] to remove every label"
    )]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PullViewParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Pull request number (e.g., 1, 2, 3...)")]
    pub pull_id: u64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PullListParams {
    #[schemars(description = "Repository identifier in 'owner/repo' format")]
    pub repo: String,
    #[schemars(description = "Maximum number of pull requests to return, 1-100 (default: 50)")]
    pub limit: Option<u32>,
    #[schemars(description = "Pagination cursor from a previous call")]
    pub cursor: Option<String>,
}
