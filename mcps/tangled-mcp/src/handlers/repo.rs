//! Repository handler implementations

use mcp_common::{json_success, CallToolResult, McpError};

use crate::params::{BranchListParams, LabelListParams};
use crate::tangled::Tangled;

use super::{page_limit, tangled_to_mcp_error};

/// List branches of a repository from its knot
pub async fn branch_list(
    tangled: &Tangled,
    params: BranchListParams,
) -> Result<CallToolResult, McpError> {
    let limit = page_limit(params.limit, 50)?;
    let page = tangled
        .list_branches(&params.repo, limit, params.cursor.as_deref())
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&page)
}

/// List the labels a repository subscribes to
pub async fn label_list(
    tangled: &Tangled,
    params: LabelListParams,
) -> Result<CallToolResult, McpError> {
    let labels = tangled
        .list_labels(&params.repo)
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&labels)
}
