//! Tool result types
//!
//! What the tools return on top of the orchestrator outputs: mostly links
//! back to the Tangled web frontend.

pub mod common;
pub mod issue;
pub mod pull;

pub use common::WebLinks;
pub use issue::{CreateIssueResult, DeleteIssueResult, UpdateIssueResult};
pub use pull::{CreatePullResult, UpdatePullResult};
