//! Pull request handler implementations

use mcp_common::{json_success, CallToolResult, McpError};

use crate::params::{PullCreateParams, PullListParams, PullUpdateParams, PullViewParams};
use crate::tangled::{NewPull, PullUpdate, Tangled};
use crate::types::{CreatePullResult, UpdatePullResult, WebLinks};

use super::{display_repo, page_limit, tangled_to_mcp_error};

/// Create a pull request from a patch
pub async fn pull_create(
    tangled: &Tangled,
    links: &WebLinks,
    params: PullCreateParams,
) -> Result<CallToolResult, McpError> {
    let repo = display_repo(&params.repo)?;
    let created = tangled
        .create_pull(
            &params.repo,
            NewPull {
                title: params.title,
                body: params.body,
                base: params.base,
                head: params.head,
                patch: params.patch,
                source_sha: params.source_sha,
                labels: params.labels,
            },
        )
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&CreatePullResult {
        url: links.pull(&repo, created.pull_id),
        repo,
        pull_id: created.pull_id,
        uri: created.uri,
        cid: created.cid,
    })
}

/// Update a pull request's title, body, target branch and/or labels
pub async fn pull_update(
    tangled: &Tangled,
    links: &WebLinks,
    params: PullUpdateParams,
) -> Result<CallToolResult, McpError> {
    let repo = display_repo(&params.repo)?;
    let written = tangled
        .update_pull(
            &params.repo,
            params.pull_id,
            PullUpdate {
                title: params.title,
                body: params.body,
                base: params.base,
                labels: params.labels,
            },
        )
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&UpdatePullResult {
        url: links.pull(&repo, params.pull_id),
        repo,
        pull_id: params.pull_id,
        uri: written.uri,
        cid: written.cid,
    })
}

/// List pull requests with their current labels
pub async fn pull_list(
    tangled: &Tangled,
    params: PullListParams,
) -> Result<CallToolResult, McpError> {
    let limit = page_limit(params.limit, 50)?;
    let page = tangled
        .list_pulls(&params.repo, limit, params.cursor.as_deref())
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&page)
}

/// Full pull request including the patch
pub async fn pull_view(
    tangled: &Tangled,
    params: PullViewParams,
) -> Result<CallToolResult, McpError> {
    let detail = tangled
        .get_pull(&params.repo, params.pull_id)
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&detail)
}
