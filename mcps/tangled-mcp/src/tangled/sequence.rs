//! Per-repository sequential numbers for issues and pulls
//!
//! Numbers are `max(existing) + 1` over the viewer's records for the
//! repository. The scan reads one page and reserves nothing, so two
//! concurrent creators can be handed the same number.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{RecordKind, TangledError, TangledResult};
use super::lexicon::{IssueRecord, PullRecord, Stored, ISSUE_COLLECTION, PULL_COLLECTION};
use super::resolver::RepositoryRef;
use super::Tangled;

/// A record kind that carries a repository reference and a sequence number
pub trait Numbered: DeserializeOwned {
    const COLLECTION: &'static str;
    const KIND: RecordKind;

    /// Address of the repository this record belongs to
    fn repo_uri(&self) -> &str;

    fn number(&self) -> Option<u64>;
}

impl Numbered for IssueRecord {
    const COLLECTION: &'static str = ISSUE_COLLECTION;
    const KIND: RecordKind = RecordKind::Issue;

    fn repo_uri(&self) -> &str {
        &self.repo
    }

    fn number(&self) -> Option<u64> {
        self.issue_id
    }
}

impl Numbered for PullRecord {
    const COLLECTION: &'static str = PULL_COLLECTION;
    const KIND: RecordKind = RecordKind::Pull;

    fn repo_uri(&self) -> &str {
        &self.target.repo
    }

    fn number(&self) -> Option<u64> {
        self.pull_id
    }
}

/// Next free number for `repo_uri` among `records`
pub fn next_number<'a, T: Numbered + 'a>(
    records: impl IntoIterator<Item = &'a T>,
    repo_uri: &str,
) -> u64 {
    records
        .into_iter()
        .filter(|r| r.repo_uri() == repo_uri)
        .filter_map(|r| r.number())
        .max()
        .unwrap_or(0)
        + 1
}

impl Tangled {
    /// The viewer's records of kind `T` that belong to `repo`, from a single
    /// page of the collection
    pub(crate) async fn scan_repo_records<T: Numbered>(
        &self,
        viewer_did: &str,
        repo: &RepositoryRef,
    ) -> TangledResult<Vec<Stored<T>>> {
        let page = self
            .pds
            .list_records(viewer_did, T::COLLECTION, self.settings.scan_limit, None)
            .await?;

        if page.cursor.is_some() {
            warn!(
                collection = T::COLLECTION,
                scanned = page.records.len(),
                "record scan stopped at one page; numbering and lookups ignore older records"
            );
        }

        Ok(page
            .records
            .iter()
            .filter_map(Stored::<T>::decode)
            .filter(|r| r.value.repo_uri() == repo.uri)
            .collect())
    }

    pub(crate) async fn allocate_number<T: Numbered>(
        &self,
        viewer_did: &str,
        repo: &RepositoryRef,
    ) -> TangledResult<u64> {
        let existing = self.scan_repo_records::<T>(viewer_did, repo).await?;
        let next = next_number(existing.iter().map(|r| &r.value), &repo.uri);
        debug!(kind = %T::KIND, repo = %repo.uri, next, "allocated sequence number");
        Ok(next)
    }

    pub(crate) async fn find_by_number<T: Numbered>(
        &self,
        viewer_did: &str,
        repo: &RepositoryRef,
        number: u64,
    ) -> TangledResult<Stored<T>> {
        self.scan_repo_records::<T>(viewer_did, repo)
            .await?
            .into_iter()
            .find(|r| r.value.number() == Some(number))
            .ok_or_else(|| TangledError::NotFound {
                kind: T::KIND,
                number,
                repo: repo.repo_id(),
            })
    }
}
