//! Tangled MCP Server
//!
//! Exposes Tangled repository operations (issues, pull requests, labels,
//! branches) as MCP tools over stdio.
//!
//! # Configuration
//! Set `TANGLED_HANDLE` and `TANGLED_PASSWORD`, or configure
//! `~/.binks/tangled.toml`. See [`tangled_mcp::config`].
//!
//! Or configure in `.mcp.json`:
//! ```json
//! {
//!   "mcpServers": {
//!     "tangled": {
//!       "command": "./target/release/tangled-mcp",
//!       "env": { "TANGLED_HANDLE": "you.bsky.social", "TANGLED_PASSWORD": "app-password" }
//!     }
//!   }
//! }
//! ```

use rmcp::{transport::stdio, ServiceExt};

use tangled_mcp::{Config, TangledMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mcp_common::init_tracing("tangled_mcp")?;

    tracing::info!("Starting Tangled MCP Server");

    let config = Config::load()?;
    tracing::info!(
        handle = %config.account.handle,
        pds = %config.account.pds_url,
        "account configured"
    );

    let server = TangledMcpServer::new(&config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
