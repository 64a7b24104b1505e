//! Issue handler implementations

use mcp_common::{json_success, CallToolResult, McpError};

use crate::params::{IssueCreateParams, IssueDeleteParams, IssueListParams, IssueUpdateParams};
use crate::tangled::{IssueUpdate, NewIssue, Tangled};
use crate::types::{CreateIssueResult, DeleteIssueResult, UpdateIssueResult, WebLinks};

use super::{display_repo, page_limit, tangled_to_mcp_error};

/// Create an issue and return a link to it
pub async fn issue_create(
    tangled: &Tangled,
    links: &WebLinks,
    params: IssueCreateParams,
) -> Result<CallToolResult, McpError> {
    let repo = display_repo(&params.repo)?;
    let created = tangled
        .create_issue(
            &params.repo,
            NewIssue {
                title: params.title,
                body: params.body,
                labels: params.labels,
            },
        )
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&CreateIssueResult {
        url: links.issue(&repo, created.issue_id),
        repo,
        issue_id: created.issue_id,
        uri: created.uri,
        cid: created.cid,
    })
}

/// Update an issue's title, body and/or labels
pub async fn issue_update(
    tangled: &Tangled,
    links: &WebLinks,
    params: IssueUpdateParams,
) -> Result<CallToolResult, McpError> {
    let repo = display_repo(&params.repo)?;
    let written = tangled
        .update_issue(
            &params.repo,
            params.issue_id,
            IssueUpdate {
                title: params.title,
                body: params.body,
                labels: params.labels,
            },
        )
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&UpdateIssueResult {
        url: links.issue(&repo, params.issue_id),
        repo,
        issue_id: params.issue_id,
        uri: written.uri,
        cid: written.cid,
    })
}

/// Delete an issue
pub async fn issue_delete(
    tangled: &Tangled,
    params: IssueDeleteParams,
) -> Result<CallToolResult, McpError> {
    let uri = tangled
        .delete_issue(&params.repo, params.issue_id)
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&DeleteIssueResult {
        issue_id: params.issue_id,
        uri,
    })
}

/// List issues with their current labels
pub async fn issue_list(
    tangled: &Tangled,
    params: IssueListParams,
) -> Result<CallToolResult, McpError> {
    let limit = page_limit(params.limit, 20)?;
    let page = tangled
        .list_issues(&params.repo, limit, params.cursor.as_deref())
        .await
        .map_err(tangled_to_mcp_error)?;

    json_success(&page)
}
