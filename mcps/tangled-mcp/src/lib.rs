//! Tangled MCP Library
//!
//! MCP tools for Tangled, the code collaboration network built on AT
//! Protocol: issues, pull requests, labels and branches of repositories
//! addressed as `owner/repo`.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use tangled_mcp::{Config, TangledMcpServer};
//!
//! let config = Config::load()?;
//! let server = TangledMcpServer::new(&config)?;
//! // serve via stdio or an in-memory transport
//! ```
//!
//! # Layout
//! - [`atproto`]: PDS client, session cache, record keys
//! - [`tangled`]: identifier resolution, numbering, label reconciliation and
//!   the issue/pull orchestrators
//! - [`server`]: the MCP tool surface
//!
//! # Requirements
//! - A Bluesky/AT Protocol account with an app password
//!   (`TANGLED_HANDLE`, `TANGLED_PASSWORD`)

pub mod atproto;
pub mod config;
pub mod handlers;
pub mod params;
pub mod server;
pub mod tangled;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use server::TangledMcpServer;

// Re-export parameter types for direct API usage
pub use params::*;
