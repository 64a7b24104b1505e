//! Branch listing from the knot hosting a repository
//!
//! Knots serve git data over their own XRPC endpoint and accept a service
//! token minted by the viewer's PDS.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::TangledResult;
use super::Tangled;
use crate::atproto::client::{decode, execute, http_client};
use crate::atproto::XrpcResult;

const BRANCHES_METHOD: &str = "sh.tangled.repo.branches";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BranchPage {
    pub branches: Vec<BranchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BranchesOutput {
    #[serde(default)]
    branches: Vec<BranchEntry>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BranchEntry {
    #[serde(default)]
    reference: BranchReference,
}

#[derive(Debug, Default, Deserialize)]
struct BranchReference {
    #[serde(default)]
    name: String,
    #[serde(default)]
    hash: String,
}

impl From<BranchesOutput> for BranchPage {
    fn from(output: BranchesOutput) -> Self {
        Self {
            branches: output
                .branches
                .into_iter()
                .map(|b| BranchInfo {
                    name: b.reference.name,
                    sha: b.reference.hash,
                })
                .collect(),
            cursor: output.cursor,
        }
    }
}

/// HTTP client for knot XRPC endpoints
#[derive(Clone)]
pub struct KnotClient {
    http: Client,
}

impl KnotClient {
    pub fn new(timeout: Duration) -> XrpcResult<Self> {
        Ok(Self {
            http: http_client(timeout)?,
        })
    }

    /// `knot` is normally a bare hostname; a value with a scheme is used as is
    fn url(knot: &str, method: &str) -> String {
        let base = if knot.contains("://") {
            knot.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", knot.trim_end_matches('/'))
        };
        format!("{}/xrpc/{}", base, method)
    }

    #[instrument(skip(self, token))]
    pub async fn branches(
        &self,
        knot: &str,
        token: &str,
        repo_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> XrpcResult<BranchPage> {
        let limit = limit.to_string();
        let mut query = vec![("repo", repo_id), ("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let request = self
            .http
            .get(Self::url(knot, BRANCHES_METHOD))
            .bearer_auth(token)
            .query(&query);
        let response = execute(BRANCHES_METHOD, request).await?;
        let output: BranchesOutput = decode(BRANCHES_METHOD, response).await?;
        Ok(output.into())
    }
}

impl Tangled {
    /// Branches of `identifier` as reported by its knot
    pub async fn list_branches(
        &self,
        identifier: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> TangledResult<BranchPage> {
        let repo = self.resolve(identifier).await?;
        let token = self.pds.service_token(&self.settings.service_did).await?;
        let page = self
            .knots
            .branches(&repo.knot, &token, &repo.repo_id(), limit, cursor)
            .await?;
        debug!(knot = %repo.knot, count = page.branches.len(), "listed branches");
        Ok(page)
    }
}
