//! Repository identifier resolution
//!
//! Turns `owner/repo` (or `@owner/repo`, or `did:.../repo`) into the
//! repository record's address, its owner DID, hosting knot and subscribed
//! labels.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::{TangledError, TangledResult};
use super::lexicon::{RepoRecord, Stored, REPO_COLLECTION};
use super::Tangled;
use crate::atproto::XrpcError;

/// Owner half of a repository identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
    Did(&'a str),
    Handle(&'a str),
}

impl Owner<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Owner::Did(s) | Owner::Handle(s) => s,
        }
    }
}

/// A syntactically valid `owner/repo` identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoIdentifier<'a> {
    pub owner: Owner<'a>,
    pub name: &'a str,
}

/// Split an identifier into owner and repository name.
///
/// Exactly one `/` is allowed and neither side may be empty. A single
/// leading `@` on a handle is dropped.
pub fn parse_identifier(input: &str) -> TangledResult<RepoIdentifier<'_>> {
    let invalid = || TangledError::InvalidFormat {
        input: input.to_string(),
    };

    let (owner, name) = input.split_once('/').ok_or_else(invalid)?;
    if name.contains('/') || name.is_empty() {
        return Err(invalid());
    }

    let owner = if owner.starts_with("did:") {
        Owner::Did(owner)
    } else {
        let handle = owner.strip_prefix('@').unwrap_or(owner);
        if handle.is_empty() {
            return Err(invalid());
        }
        Owner::Handle(handle)
    };

    Ok(RepoIdentifier { owner, name })
}

/// `owner/repo` with any leading `@` removed
pub fn normalize_identifier(input: &str) -> TangledResult<String> {
    let parsed = parse_identifier(input)?;
    Ok(format!("{}/{}", parsed.owner.as_str(), parsed.name))
}

/// A resolved repository. Built per call and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    pub owner_did: String,
    pub name: String,
    /// Knot hostname serving the git data
    pub knot: String,
    /// Address of the `sh.tangled.repo` record
    pub uri: String,
    /// Subscribed label definition addresses
    pub labels: Vec<String>,
}

impl RepositoryRef {
    /// `did/repo` form used by knot XRPC calls
    pub fn repo_id(&self) -> String {
        format!("{}/{}", self.owner_did, self.name)
    }
}

impl Tangled {
    /// Resolve a human-friendly identifier to a repository record.
    ///
    /// The owner's repository collection is read as a single page; the first
    /// record the store returns with a matching name wins.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> TangledResult<RepositoryRef> {
        let parsed = parse_identifier(identifier)?;

        let owner_did = match parsed.owner {
            Owner::Did(did) => did.to_string(),
            Owner::Handle(handle) => {
                self.pds
                    .resolve_handle(handle)
                    .await
                    .map_err(|e| match e {
                        XrpcError::Timeout { .. } | XrpcError::Unavailable { .. } => e.into(),
                        source => TangledError::HandleResolutionFailed {
                            handle: handle.to_string(),
                            source,
                        },
                    })?
            }
        };

        let page = self
            .pds
            .list_records(&owner_did, REPO_COLLECTION, self.settings.scan_limit, None)
            .await?;

        let found = page
            .records
            .iter()
            .filter_map(Stored::<RepoRecord>::decode)
            .find(|r| r.value.name.as_deref() == Some(parsed.name));

        let Some(repo) = found else {
            if page.cursor.is_some() {
                warn!(
                    owner = %owner_did,
                    scanned = page.records.len(),
                    "repo not in first page of owner's repositories; later pages are not scanned"
                );
            }
            return Err(TangledError::RepoNotFound {
                owner: parsed.owner.as_str().to_string(),
                name: parsed.name.to_string(),
            });
        };

        let knot = repo
            .value
            .knot
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TangledError::MissingHostInfo {
                name: parsed.name.to_string(),
            })?;

        debug!(uri = %repo.uri, knot = %knot, "resolved repository");
        Ok(RepositoryRef {
            owner_did,
            name: parsed.name.to_string(),
            knot,
            uri: repo.uri,
            labels: repo.value.labels,
        })
    }
}
