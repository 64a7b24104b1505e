//! Issue create/update/delete/list
//!
//! Issues live in the authenticated account's `sh.tangled.repo.issue`
//! collection and point at the repository record they belong to.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, instrument};

use super::error::{TangledError, TangledResult};
use super::labels::{fold_subjects, names_of, resolve_labels};
use super::lexicon::{encode, now_timestamp, IssueRecord, Stored, ISSUE_COLLECTION};
use super::Tangled;
use crate::atproto::{next_tid, PutRecord, RecordRef};

#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub body: Option<String>,
    /// Label names or addresses to apply after creation
    pub labels: Option<Vec<String>>,
}

/// Fields to change on an existing issue. `None` keeps the stored value;
/// `labels: Some(vec![])` removes every label.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIssue {
    pub uri: String,
    pub cid: String,
    pub issue_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub uri: String,
    pub cid: String,
    pub issue_id: Option<u64>,
    pub title: String,
    pub body: Option<String>,
    pub created_at: Option<String>,
    /// Short label names, sorted
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IssuePage {
    pub issues: Vec<IssueSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Tangled {
    /// Open an issue with the next free number.
    ///
    /// Requested labels are validated before anything is written.
    #[instrument(skip(self, issue), fields(title = %issue.title))]
    pub async fn create_issue(
        &self,
        identifier: &str,
        issue: NewIssue,
    ) -> TangledResult<CreatedIssue> {
        let repo = self.resolve(identifier).await?;
        if let Some(labels) = &issue.labels {
            resolve_labels(labels, &repo.labels)?;
        }

        let viewer = self.pds.viewer().await?;
        let issue_id = self.allocate_number::<IssueRecord>(&viewer.did, &repo).await?;

        let record = IssueRecord {
            repo: repo.uri.clone(),
            issue_id: Some(issue_id),
            owner: Some(viewer.did.clone()),
            title: issue.title,
            body: issue.body,
            created_at: Some(now_timestamp()),
        };
        let written = self
            .pds
            .put_record(PutRecord {
                repo: viewer.did.clone(),
                collection: ISSUE_COLLECTION.to_string(),
                rkey: next_tid(),
                record: encode(ISSUE_COLLECTION, &record)?,
                swap_record: None,
            })
            .await?;
        info!(uri = %written.uri, issue_id, "issue created");

        if let Some(labels) = issue.labels.filter(|l| !l.is_empty()) {
            self.reconcile_labels(
                &viewer.did,
                &written.uri,
                &labels,
                &repo.labels,
                &BTreeSet::new(),
            )
            .await?;
        }

        Ok(CreatedIssue {
            uri: written.uri,
            cid: written.cid,
            issue_id,
        })
    }

    /// Merge `update` over issue `number` and write it back guarded by the
    /// version that was read
    #[instrument(skip(self, update))]
    pub async fn update_issue(
        &self,
        identifier: &str,
        number: u64,
        update: IssueUpdate,
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
            .find_by_number::<IssueRecord>(&viewer.did, &repo, number)
            .await?;

        let record = IssueRecord {
            repo: prior.repo,
            issue_id: Some(number),
            owner: prior.owner.or_else(|| Some(viewer.did.clone())),
            title: update.title.unwrap_or(prior.title),
            body: update.body.or(prior.body),
            created_at: prior.created_at.or_else(|| Some(now_timestamp())),
        };
        let written = self
            .pds
            .put_record(PutRecord {
                repo: viewer.did.clone(),
                collection: ISSUE_COLLECTION.to_string(),
                rkey,
                record: encode(ISSUE_COLLECTION, &record)?,
                swap_record: Some(cid),
            })
            .await
            .map_err(|e| TangledError::from_swap(&uri, e))?;
        info!(uri = %written.uri, number, "issue updated");

        if let Some(labels) = update.labels {
            let current = self.current_labels(&viewer.did, &uri).await?;
            self.reconcile_labels(&viewer.did, &uri, &labels, &repo.labels, &current)
                .await?;
        }

        Ok(written)
    }

    /// Delete issue `number`, returning the removed record's address.
    /// Its label history is left in place.
    #[instrument(skip(self))]
    pub async fn delete_issue(&self, identifier: &str, number: u64) -> TangledResult<String> {
        let repo = self.resolve(identifier).await?;
        let viewer = self.pds.viewer().await?;
        let existing = self
            .find_by_number::<IssueRecord>(&viewer.did, &repo, number)
            .await?;

        self.pds
            .delete_record(&viewer.did, ISSUE_COLLECTION, &existing.rkey)
            .await?;
        info!(uri = %existing.uri, number, "issue deleted");
        Ok(existing.uri)
    }

    /// One page of the viewer's issues on `identifier`, with current labels.
    ///
    /// `limit` and `cursor` apply to the underlying collection listing, so a
    /// page can hold fewer than `limit` issues for this repository.
    #[instrument(skip(self))]
    pub async fn list_issues(
        &self,
        identifier: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> TangledResult<IssuePage> {
        let repo = self.resolve(identifier).await?;
        let viewer = self.pds.viewer().await?;

        let page = self
            .pds
            .list_records(&viewer.did, ISSUE_COLLECTION, limit, cursor)
            .await?;
        let issues: Vec<Stored<IssueRecord>> = page
            .records
            .iter()
            .filter_map(Stored::<IssueRecord>::decode)
            .filter(|r| r.value.repo == repo.uri)
            .collect();

        let history = if issues.is_empty() {
            Vec::new()
        } else {
            self.label_history(&viewer.did).await?
        };
        let mut labels = fold_subjects(&history, issues.iter().map(|i| i.uri.as_str()));

        let issues = issues
            .into_iter()
            .map(|issue| IssueSummary {
                labels: labels
                    .remove(&issue.uri)
                    .map(|set| names_of(&set))
                    .unwrap_or_default(),
                uri: issue.uri,
                cid: issue.cid,
                issue_id: issue.value.issue_id,
                title: issue.value.title,
                body: issue.value.body,
                created_at: issue.value.created_at,
            })
            .collect();

        Ok(IssuePage {
            issues,
            cursor: page.cursor,
        })
    }
}
