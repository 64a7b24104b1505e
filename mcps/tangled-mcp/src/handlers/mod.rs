//! Handler implementations for Tangled MCP tools
//!
//! Organized by domain: issue, pull, repo

mod issue;
mod pull;
mod repo;

pub use issue::*;
pub use pull::*;
pub use repo::*;

use mcp_common::{internal_error, invalid_params, not_found, IntoMcpError, McpError, McpResult};

use crate::tangled::{normalize_identifier, TangledError};

impl IntoMcpError for TangledError {
    fn into_mcp_error(self) -> McpError {
        if self.is_invalid_input() {
            invalid_params(self.to_string())
        } else if self.is_not_found() {
            not_found(self.to_string())
        } else {
            internal_error(self.to_string())
        }
    }
}

/// Convert a TangledError to an MCP error
pub fn tangled_to_mcp_error(e: TangledError) -> McpError {
    tracing::debug!(error = %e, "tool call failed");
    e.into_mcp_error()
}

/// Validate an optional page size, falling back to `default`
fn page_limit(limit: Option<u32>, default: u32) -> McpResult<u32> {
    match limit {
        None => Ok(default),
        Some(n) if (1..=100).contains(&n) => Ok(n),
        Some(n) => Err(invalid_params(format!(
            "limit must be between 1 and 100, got {}",
            n
        ))),
    }
}

/// `owner/repo` without a leading `@`, for links and results
fn display_repo(repo: &str) -> McpResult<String> {
    normalize_identifier(repo).map_err(tangled_to_mcp_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    use crate::tangled::RecordKind;

    #[test]
    fn test_error_codes_follow_error_class() {
        let err = TangledError::InvalidFormat {
            input: "nope".into(),
        }
        .into_mcp_error();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = TangledError::NotFound {
            kind: RecordKind::Issue,
            number: 9,
            repo: "did:plc:a/b".into(),
        }
        .into_mcp_error();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(err.message.contains("issue #9"));

        let err = TangledError::UpstreamTimeout("listRecords".into()).into_mcp_error();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(None, 20).unwrap(), 20);
        assert_eq!(page_limit(Some(100), 20).unwrap(), 100);
        assert!(page_limit(Some(0), 20).is_err());
        assert!(page_limit(Some(101), 20).is_err());
    }

    #[test]
    fn test_display_repo_strips_at() {
        assert_eq!(display_repo("@a.test/b").unwrap(), "a.test/b");
        assert!(display_repo("ab").is_err());
    }
}
