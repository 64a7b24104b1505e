//! MCP Server implementation
//!
//! This module defines the MCP server that exposes Tangled repository,
//! issue and pull request operations as tools, plus a status resource.
//! Handler implementations are in the handlers/ module.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, ListResourcesResult, PaginatedRequestParam, RawResource,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};

use mcp_common::{not_found, IntoMcpError, McpResult};

use crate::atproto::{Credentials, XrpcClient};
use crate::config::Config;
use crate::handlers;
use crate::params::*;
use crate::tangled::{KnotClient, ServiceSettings, Tangled};
use crate::types::WebLinks;

/// Address of the connection status resource
pub const STATUS_URI: &str = "tangled://status";

/// The Tangled MCP Server
#[derive(Clone)]
pub struct TangledMcpServer {
    tangled: Arc<Tangled>,
    links: WebLinks,
    /// Configured account handle, reported when no session exists
    handle: String,
    tool_router: ToolRouter<Self>,
}

impl TangledMcpServer {
    /// Build the server for the configured account. No network calls are
    /// made until the first tool call.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let credentials = Credentials {
            identifier: config.account.handle.clone(),
            password: config.account.password.clone(),
        };
        let pds = XrpcClient::new(
            config.account.pds_url.clone(),
            credentials,
            config.timeout(),
            config.session_ttl(),
        )?;
        let knots = KnotClient::new(config.timeout())?;
        let settings = ServiceSettings {
            service_did: config.tangled.service_did.clone(),
            scan_limit: config.tangled.scan_limit,
        };

        Ok(Self::with_service(
            Tangled::new(Arc::new(pds), knots, settings),
            WebLinks::new(config.tangled.appview_url.clone()),
            config.account.handle.clone(),
        ))
    }

    /// Build the server around an existing [`Tangled`]
    pub fn with_service(tangled: Tangled, links: WebLinks, handle: impl Into<String>) -> Self {
        Self {
            tangled: Arc::new(tangled),
            links,
            handle: handle.into(),
            tool_router: Self::tool_router(),
        }
    }

    async fn status_json(&self) -> McpResult<String> {
        let status = self.tangled.status(&self.handle).await;
        serde_json::to_string_pretty(&status).map_err(IntoMcpError::into_mcp_error)
    }
}

// ============================================================================
// Repository Tools
// ============================================================================

#[tool_router]
impl TangledMcpServer {
    #[tool(description = "List branches of a Tangled repository ('owner/repo'), with pagination")]
    async fn list_repo_branches(
        &self,
        Parameters(params): Parameters<BranchListParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::branch_list(&self.tangled, params).await
    }

    #[tool(description = "List the label names a Tangled repository subscribes to")]
    async fn list_repo_labels(
        &self,
        Parameters(params): Parameters<LabelListParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::label_list(&self.tangled, params).await
    }

    // ========================================================================
    // Issue Tools
    // ========================================================================

    #[tool(
        description = "Create an issue on a Tangled repository. Returns the issue number and a link"
    )]
    async fn create_repo_issue(
        &self,
        Parameters(params): Parameters<IssueCreateParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::issue_create(&self.tangled, &self.links, params).await
    }

    #[tool(
        description = "Update an issue's title, body or labels. Omitted fields keep their value; labels replace the current set"
    )]
    async fn update_repo_issue(
        &self,
        Parameters(params): Parameters<IssueUpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::issue_update(&self.tangled, &self.links, params).await
    }

    #[tool(description = "Delete an issue from a Tangled repository by number")]
    async fn delete_repo_issue(
        &self,
        Parameters(params): Parameters<IssueDeleteParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::issue_delete(&self.tangled, params).await
    }

    #[tool(description = "List issues on a Tangled repository with their labels")]
    async fn list_repo_issues(
        &self,
        Parameters(params): Parameters<IssueListParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::issue_list(&self.tangled, params).await
    }

    // ========================================================================
    // Pull Request Tools
    // ========================================================================

    #[tool(
        description = "Create a pull request on a Tangled repository from a patch. source_sha must be a full 40-character commit hash"
    )]
    async fn create_repo_pull(
        &self,
        Parameters(params): Parameters<PullCreateParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::pull_create(&self.tangled, &self.links, params).await
    }

    #[tool(description = "List pull requests on a Tangled repository with their labels")]
    async fn list_repo_pulls(
        &self,
        Parameters(params): Parameters<PullListParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::pull_list(&self.tangled, params).await
    }

    #[tool(description = "Get a pull request by number, including its patch")]
    async fn get_repo_pull(
        &self,
        Parameters(params): Parameters<PullViewParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::pull_view(&self.tangled, params).await
    }

    #[tool(
        description = "Update a pull request's title, body, target branch or labels. Omitted fields keep their value"
    )]
    async fn update_repo_pull(
        &self,
        Parameters(params): Parameters<PullUpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::pull_update(&self.tangled, &self.links, params).await
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for TangledMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tangled MCP Server - manage issues, pull requests and labels on \
                 Tangled (tangled.org) repositories over AT Protocol. Repositories \
                 are addressed as 'owner/repo'. Read tangled://status to check the \
                 connection."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut status = RawResource::new(STATUS_URI, "tangled-status");
        status.description = Some(
            "Account handle and DID, whether the PDS session works and whether Tangled \
             service tokens can be obtained"
                .into(),
        );
        status.mime_type = Some("application/json".into());

        Ok(ListResourcesResult::with_all_items(vec![status.no_annotation()]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match request.uri.as_str() {
            STATUS_URI => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(
                    self.status_json().await?,
                    request.uri,
                )],
            }),
            other => Err(not_found(format!("unknown resource: {}", other))),
        }
    }
}
