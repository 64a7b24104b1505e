//! Error conversion for MCP tools
//!
//! Domain errors implement [`IntoMcpError`] to pick the MCP error code that
//! matches their cause: bad arguments, a missing resource, or anything else.

use rmcp::ErrorData as McpError;

/// Type alias for MCP tool results
pub type McpResult<T> = Result<T, McpError>;

/// Conversion from a domain error into an MCP error
///
/// # Example
///
/// ```rust,ignore
/// impl IntoMcpError for MyError {
///     fn into_mcp_error(self) -> McpError {
///         match self {
///             MyError::BadInput(msg) => invalid_params(msg),
///             other => internal_error(other.to_string()),
///         }
///     }
/// }
/// ```
pub trait IntoMcpError {
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("JSON error: {}", self), None)
    }
}

/// Failure inside the server or upstream of it
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// The tool received arguments it cannot act on
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// The thing the arguments point at does not exist
pub fn not_found(message: impl Into<String>) -> McpError {
    McpError::resource_not_found(message.into(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_constructors_set_codes() {
        assert_eq!(internal_error("boom").code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(invalid_params("bad").code, ErrorCode::INVALID_PARAMS);

        let err = not_found("issue #4 not found");
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(err.message.contains("issue #4"));
    }
}
