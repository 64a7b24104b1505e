//! Repository-level parameter types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BranchListParams {
    #[schemars(
        description = "Repository identifier in 'owner/repo' format (e.g., 'zzstoatzz.io/tangled-mcp')"
    )]
    pub repo: String,
    #[schemars(description = "Maximum number of branches to return, 1-100 (default: 50)")]
    pub limit: Option<u32>,
    #[schemars(description = "Pagination cursor from a previous call")]
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LabelListParams {
    #[schemars(
        description = "Repository identifier in 'owner/repo' format (e.g., 'zzstoatzz.io/tangled-mcp')"
    )]
    pub repo: String,
}
