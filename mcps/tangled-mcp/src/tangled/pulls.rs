//! Pull request create/update/list/get
//!
//! Same shape as issues, plus a target branch, the patch text and an
//! optional source branch pinned to a commit.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, instrument};

use super::error::{CommitHashProblem, TangledError, TangledResult, COMMIT_HASH_LEN};
use super::labels::{fold_subjects, names_of, resolve_labels};
use super::lexicon::{
    encode, now_timestamp, PullRecord, PullSource, PullTarget, Stored, PULL_COLLECTION,
};
use super::Tangled;
use crate::atproto::{next_tid, PutRecord, RecordRef};

#[derive(Debug, Clone, Default)]
pub struct NewPull {
    pub title: String,
    pub body: Option<String>,
    /// Target branch
    pub base: String,
    /// Source branch; only recorded together with `source_sha`
    pub head: String,
    pub patch: String,
    pub source_sha: Option<String>,
    pub labels: Option<Vec<String>>,
}

/// Fields to change on an existing pull. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PullUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub base: Option<String>,
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPull {
    pub uri: String,
    pub cid: String,
    pub pull_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullSummary {
    pub uri: String,
    pub cid: String,
    pub pull_id: Option<u64>,
    pub title: String,
    pub body: Option<String>,
    pub base: String,
    pub head: String,
    pub sha: Option<String>,
    pub created_at: Option<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullDetail {
    #[serde(flatten)]
    pub summary: PullSummary,
    pub patch: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PullPage {
    pub pulls: Vec<PullSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A full-length hexadecimal commit hash
pub fn validate_commit_hash(sha: &str) -> TangledResult<()> {
    let actual = sha.chars().count();
    let problem = if actual != COMMIT_HASH_LEN {
        CommitHashProblem::WrongLength {
            expected: COMMIT_HASH_LEN,
            actual,
        }
    } else if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        CommitHashProblem::NonHex
    } else {
        return Ok(());
    };
    Err(TangledError::InvalidCommitHash {
        sha: sha.to_string(),
        problem,
    })
}

fn summarize(pull: Stored<PullRecord>, labels: Option<BTreeSet<String>>) -> (PullSummary, String) {
    let (head, sha) = match pull.value.source {
        Some(PullSource { branch, sha }) => (branch, Some(sha).filter(|s| !s.is_empty())),
        None => (String::new(), None),
    };
    let summary = PullSummary {
        uri: pull.uri,
        cid: pull.cid,
        pull_id: pull.value.pull_id,
        title: pull.value.title,
        body: pull.value.body,
        base: pull.value.target.branch,
        head,
        sha,
        created_at: pull.value.created_at,
        labels: labels.map(|set| names_of(&set)).unwrap_or_default(),
    };
    (summary, pull.value.patch)
}

impl Tangled {
    /// Open a pull request with the next free number.
    ///
    /// The commit hash and labels are checked before anything is written.
    #[instrument(skip(self, pull), fields(title = %pull.title, base = %pull.base))]
    pub async fn create_pull(&self, identifier: &str, pull: NewPull) -> TangledResult<CreatedPull> {
        if let Some(sha) = &pull.source_sha {
            validate_commit_hash(sha)?;
        }
        let repo = self.resolve(identifier).await?;
        if let Some(labels) = &pull.labels {
            resolve_labels(labels, &repo.labels)?;
        }

        let viewer = self.pds.viewer().await?;
        let pull_id = self.allocate_number::<PullRecord>(&viewer.did, &repo).await?;

        let record = PullRecord {
            target: PullTarget {
                repo: repo.uri.clone(),
                branch: pull.base,
            },
            pull_id: Some(pull_id),
            title: pull.title,
            body: pull.body,
            patch: pull.patch,
            source: pull.source_sha.map(|sha| PullSource {
                branch: pull.head,
                sha,
            }),
            created_at: Some(now_timestamp()),
        };
        let written = self
            .pds
            .put_record(PutRecord {
                repo: viewer.did.clone(),
                collection: PULL_COLLECTION.to_string(),
                rkey: next_tid(),
                record: encode(PULL_COLLECTION, &record)?,
                swap_record: None,
            })
            .await?;
        info!(uri = %written.uri, pull_id, "pull request created");

        if let Some(labels) = pull.labels.filter(|l| !l.is_empty()) {
            self.reconcile_labels(
                &viewer.did,
                &written.uri,
                &labels,
                &repo.labels,
                &BTreeSet::new(),
            )
            .await?;
        }

        Ok(CreatedPull {
            uri: written.uri,
            cid: written.cid,
            pull_id,
        })
    }

    /// Merge `update` over pull `number` and write it back guarded by the
    /// version that was read
    #[instrument(skip(self, update))]
    pub async fn update_pull(
        &self,
        identifier: &str,
        number: u64,
        update: PullUpdate,
    ) -> TangledResult<RecordRef> {
        let repo = self.resolve(identifier).await?;
        if let Some(labels) = &update.labels {
            resolve_labels(labels, &repo.labels)?;
        }

        let viewer = self.pds.viewer().await?;
        let Stored {
            uri,
            cid,
            rkey,
            value: prior,
        } = self
            .find_by_number::<PullRecord>(&viewer.did, &repo, number)
            .await?;

        let record = PullRecord {
            target: PullTarget {
                repo: prior.target.repo,
                branch: update.base.unwrap_or(prior.target.branch),
            },
            pull_id: Some(number),
            title: update.title.unwrap_or(prior.title),
            body: update.body.or(prior.body),
            patch: prior.patch,
            source: prior.source,
            created_at: prior.created_at.or_else(|| Some(now_timestamp())),
        };
        let written = self
            .pds
            .put_record(PutRecord {
                repo: viewer.did.clone(),
                collection: PULL_COLLECTION.to_string(),
                rkey,
                record: encode(PULL_COLLECTION, &record)?,
                swap_record: Some(cid),
            })
            .await
            .map_err(|e| TangledError::from_swap(&uri, e))?;
        info!(uri = %written.uri, number, "pull request updated");

        if let Some(labels) = update.labels {
            let current = self.current_labels(&viewer.did, &uri).await?;
            self.reconcile_labels(&viewer.did, &uri, &labels, &repo.labels, &current)
                .await?;
        }

        Ok(written)
    }

    /// One page of the viewer's pull requests on `identifier`, with labels
    #[instrument(skip(self))]
    pub async fn list_pulls(
        &self,
        identifier: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> TangledResult<PullPage> {
        let repo = self.resolve(identifier).await?;
        let viewer = self.pds.viewer().await?;

        let page = self
            .pds
            .list_records(&viewer.did, PULL_COLLECTION, limit, cursor)
            .await?;
        let pulls: Vec<Stored<PullRecord>> = page
            .records
            .iter()
            .filter_map(Stored::<PullRecord>::decode)
            .filter(|r| r.value.target.repo == repo.uri)
            .collect();

        let history = if pulls.is_empty() {
            Vec::new()
        } else {
            self.label_history(&viewer.did).await?
        };
        let mut labels = fold_subjects(&history, pulls.iter().map(|p| p.uri.as_str()));

        let pulls = pulls
            .into_iter()
            .map(|pull| {
                let current = labels.remove(&pull.uri);
                summarize(pull, current).0
            })
            .collect();

        Ok(PullPage {
            pulls,
            cursor: page.cursor,
        })
    }

    /// Pull request `number` including its patch and current labels
    #[instrument(skip(self))]
    pub async fn get_pull(&self, identifier: &str, number: u64) -> TangledResult<PullDetail> {
        let repo = self.resolve(identifier).await?;
        let viewer = self.pds.viewer().await?;
        let pull = self
            .find_by_number::<PullRecord>(&viewer.did, &repo, number)
            .await?;
        let labels = self.current_labels(&viewer.did, &pull.uri).await?;

        let (summary, patch) = summarize(pull, Some(labels));
        Ok(PullDetail { summary, patch })
    }
}
