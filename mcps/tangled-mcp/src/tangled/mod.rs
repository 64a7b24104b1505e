//! Tangled repository, issue, pull request and label logic
//!
//! [`Tangled`] composes identifier resolution, sequential numbering and label
//! reconciliation on top of a [`Pds`]. Each operation resolves the repository
//! fresh; no state is kept between calls except the PDS session.

pub mod branches;
pub mod error;
pub mod issues;
pub mod labels;
pub mod lexicon;
pub mod pulls;
pub mod resolver;
pub mod sequence;

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::atproto::Pds;

pub use branches::{BranchInfo, BranchPage, KnotClient};
pub use error::{CommitHashProblem, RecordKind, TangledError, TangledResult};
pub use issues::{CreatedIssue, IssuePage, IssueSummary, IssueUpdate, NewIssue};
pub use pulls::{CreatedPull, NewPull, PullDetail, PullPage, PullSummary, PullUpdate};
pub use resolver::{normalize_identifier, RepositoryRef};

/// Tunables for record scans
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// DID of the Tangled service, audience for knot service tokens
    pub service_did: String,
    /// Page size for repository lookups and number scans (max 100)
    pub scan_limit: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            service_did: "did:web:tangled.org".to_string(),
            scan_limit: 100,
        }
    }
}

/// Connection health reported by the status resource
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub handle: String,
    pub did: Option<String>,
    pub session_ok: bool,
    pub upstream_reachable: bool,
}

/// Entry point for every Tangled operation
pub struct Tangled {
    pds: Arc<dyn Pds>,
    knots: KnotClient,
    settings: ServiceSettings,
}

impl Tangled {
    pub fn new(pds: Arc<dyn Pds>, knots: KnotClient, settings: ServiceSettings) -> Self {
        Self {
            pds,
            knots,
            settings,
        }
    }

    /// Check the session and whether the Tangled service will issue tokens
    pub async fn status(&self, configured_handle: &str) -> Status {
        let viewer = match self.pds.viewer().await {
            Ok(viewer) => viewer,
            Err(e) => {
                warn!(error = %e, "status check: no session");
                return Status {
                    handle: configured_handle.to_string(),
                    did: None,
                    session_ok: false,
                    upstream_reachable: false,
                };
            }
        };

        let upstream_reachable = match self.pds.service_token(&self.settings.service_did).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "status check: service token unavailable");
                false
            }
        };

        Status {
            handle: viewer.handle,
            did: Some(viewer.did),
            session_ok: true,
            upstream_reachable,
        }
    }
}
