//! Error taxonomy for Tangled operations
//!
//! Every variant is terminal for the request that raised it. Messages carry
//! enough context to act on: the identifier, the rejected labels with the
//! valid set, the expected and actual hash length.

use thiserror::Error;

use crate::atproto::XrpcError;

/// Length of a full git commit hash
pub const COMMIT_HASH_LEN: usize = 40;

/// Errors surfaced by the Tangled orchestrators
#[derive(Error, Debug)]
pub enum TangledError {
    /// Repository identifier is not `owner/repo`
    #[error("invalid repo format: '{input}'. expected 'owner/repo'")]
    InvalidFormat { input: String },

    /// The owner handle could not be resolved to a DID
    #[error("failed to resolve handle '{handle}': {source}")]
    HandleResolutionFailed {
        handle: String,
        #[source]
        source: XrpcError,
    },

    /// No repository record with this name exists for the owner
    #[error("repo '{name}' not found for owner '{owner}'")]
    RepoNotFound { owner: String, name: String },

    /// The repository record has no knot to host it
    #[error("repo '{name}' has no knot information")]
    MissingHostInfo { name: String },

    /// No issue or pull with this sequential number
    #[error("{kind} #{number} not found in repo {repo}")]
    NotFound {
        kind: RecordKind,
        number: u64,
        repo: String,
    },

    /// Requested labels are not subscribed by the repository
    #[error("invalid labels: {invalid:?}\navailable labels for this repo: {available:?}")]
    InvalidLabels {
        invalid: Vec<String>,
        available: Vec<String>,
    },

    /// `source_sha` is not a full commit hash
    #[error("invalid source_sha '{sha}': {problem}")]
    InvalidCommitHash {
        sha: String,
        problem: CommitHashProblem,
    },

    /// The record changed since it was read
    #[error("{uri} was modified concurrently; re-read and retry ({detail})")]
    ConflictOrStale { uri: String, detail: String },

    /// The configured account could not authenticate
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// An upstream call exceeded its timeout
    #[error("upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// An upstream service could not be reached
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Any other upstream failure
    #[error(transparent)]
    Upstream(XrpcError),
}

/// Why a commit hash was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitHashProblem {
    #[error("expected a {expected}-character hex commit hash, got {actual} characters")]
    WrongLength { expected: usize, actual: usize },

    #[error("contains non-hex characters (expected a 40-character hex commit hash)")]
    NonHex,
}

/// Kind of sequentially numbered record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Issue,
    Pull,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Issue => f.write_str("issue"),
            RecordKind::Pull => f.write_str("pull request"),
        }
    }
}

impl From<XrpcError> for TangledError {
    fn from(e: XrpcError) -> Self {
        match e {
            XrpcError::Timeout { .. } => TangledError::UpstreamTimeout(e.to_string()),
            XrpcError::Unavailable { .. } => TangledError::UpstreamUnavailable(e.to_string()),
            XrpcError::AuthFailed(_) | XrpcError::ExpiredToken(_) => {
                TangledError::AuthFailed(e.to_string())
            }
            other => TangledError::Upstream(other),
        }
    }
}

impl TangledError {
    /// Translate a failed guarded write into a conflict for `uri`
    pub(crate) fn from_swap(uri: &str, e: XrpcError) -> Self {
        match e {
            XrpcError::VersionMismatch(detail) => TangledError::ConflictOrStale {
                uri: uri.to_string(),
                detail,
            },
            other => other.into(),
        }
    }

    /// Whether the caller sent something unusable (as opposed to a failure
    /// upstream or a missing record)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            TangledError::InvalidFormat { .. }
                | TangledError::InvalidLabels { .. }
                | TangledError::InvalidCommitHash { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TangledError::RepoNotFound { .. } | TangledError::NotFound { .. }
        )
    }
}

/// Result type alias for Tangled operations
pub type TangledResult<T> = Result<T, TangledError>;
