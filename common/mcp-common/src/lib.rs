//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: [`init_tracing`] for stderr logging
//! - **Results**: [`json_success`] for `CallToolResult`s
//! - **Errors**: [`IntoMcpError`] and constructors for the MCP error codes
//!   tools return
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{json_success, IntoMcpError};
//!
//! async fn my_tool(&self) -> Result<CallToolResult, McpError> {
//!     let data = self.backend.fetch().await.map_err(IntoMcpError::into_mcp_error)?;
//!     json_success(&data)
//! }
//! ```

pub mod error;
pub mod init;
pub mod result;

pub use error::{internal_error, invalid_params, not_found, IntoMcpError, McpResult};
pub use init::init_tracing;
pub use result::json_success;

// Re-export rmcp types that are commonly needed
pub use rmcp::{model::CallToolResult, ErrorData as McpError};
