//! Parameter types for Tangled MCP tools
//!
//! Organized by domain: issue, pull, repo

mod issue;
mod pull;
mod repo;

pub use issue::*;
pub use pull::*;
pub use repo::*;
