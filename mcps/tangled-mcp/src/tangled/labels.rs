//! Label state derived from the append-only label-operation log
//!
//! A subject's labels are never stored directly. Each `sh.tangled.label.op`
//! record adds and deletes label addresses; replaying them in creation order
//! gives the current set. Setting labels appends one operation holding the
//! difference, or nothing when there is none.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, instrument};

use super::error::{TangledError, TangledResult};
use super::lexicon::{
    encode, now_timestamp, LabelOpRecord, LabelOperand, Stored, LABEL_OP_COLLECTION,
};
use super::Tangled;
use crate::atproto::{next_tid, PutRecord, RecordRef};

/// Short name of a label definition: the last segment of its address
pub fn label_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Sorted short names of a repository's subscribed labels
pub fn available_names(repo_labels: &[String]) -> Vec<String> {
    let mut names: Vec<String> = repo_labels
        .iter()
        .map(|uri| label_name(uri).to_string())
        .collect();
    names.sort();
    names
}

/// Resolve requested labels (names or addresses) to subscribed addresses.
///
/// Addresses must be subscribed verbatim; names match case-insensitively.
/// Any miss rejects the whole request.
pub fn resolve_labels(
    requested: &[String],
    repo_labels: &[String],
) -> TangledResult<BTreeSet<String>> {
    let mut resolved = BTreeSet::new();
    let mut invalid = Vec::new();

    for label in requested {
        let hit = if label.starts_with("at://") {
            repo_labels.iter().find(|uri| *uri == label)
        } else {
            let wanted = label.to_lowercase();
            repo_labels
                .iter()
                .find(|uri| label_name(uri).to_lowercase() == wanted)
        };
        match hit {
            Some(uri) => {
                resolved.insert(uri.clone());
            }
            None => invalid.push(label.clone()),
        }
    }

    if !invalid.is_empty() {
        return Err(TangledError::InvalidLabels {
            invalid,
            available: available_names(repo_labels),
        });
    }
    Ok(resolved)
}

/// Additions and removals that take `current` to `desired`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDiff {
    pub add: BTreeSet<String>,
    pub delete: BTreeSet<String>,
}

impl LabelDiff {
    pub fn between(desired: &BTreeSet<String>, current: &BTreeSet<String>) -> Self {
        Self {
            add: desired.difference(current).cloned().collect(),
            delete: current.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty()
    }
}

fn apply(state: &mut BTreeSet<String>, op: &LabelOpRecord) {
    for operand in &op.add {
        state.insert(operand.key.clone());
    }
    for operand in &op.delete {
        state.remove(&operand.key);
    }
}

/// Replay `ops` (in order) for one subject
pub fn fold_labels<'a>(
    ops: impl IntoIterator<Item = &'a LabelOpRecord>,
    subject: &str,
) -> BTreeSet<String> {
    let mut state = BTreeSet::new();
    for op in ops.into_iter().filter(|op| op.subject == subject) {
        apply(&mut state, op);
    }
    state
}

/// Replay `ops` (in order) for many subjects at once. Every requested
/// subject gets an entry, empty if no operation mentions it.
pub fn fold_subjects<'a, 's>(
    ops: impl IntoIterator<Item = &'a LabelOpRecord>,
    subjects: impl IntoIterator<Item = &'s str>,
) -> HashMap<String, BTreeSet<String>> {
    let mut states: HashMap<String, BTreeSet<String>> = subjects
        .into_iter()
        .map(|s| (s.to_string(), BTreeSet::new()))
        .collect();
    for op in ops {
        if let Some(state) = states.get_mut(&op.subject) {
            apply(state, op);
        }
    }
    states
}

/// Label addresses as sorted short names
pub fn names_of(labels: &BTreeSet<String>) -> Vec<String> {
    let mut names: Vec<String> = labels.iter().map(|uri| label_name(uri).to_string()).collect();
    names.sort();
    names
}

impl Tangled {
    /// Short names of the labels `identifier` subscribes to
    pub async fn list_labels(&self, identifier: &str) -> TangledResult<Vec<String>> {
        let repo = self.resolve(identifier).await?;
        Ok(available_names(&repo.labels))
    }

    /// Every label operation in the viewer's collection, oldest first.
    ///
    /// Record keys are TIDs, so sorting by key gives creation order no matter
    /// which direction the store lists in.
    pub(crate) async fn label_history(&self, viewer_did: &str) -> TangledResult<Vec<LabelOpRecord>> {
        let mut ops: Vec<Stored<LabelOpRecord>> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .pds
                .list_records(
                    viewer_did,
                    LABEL_OP_COLLECTION,
                    self.settings.scan_limit,
                    cursor.as_deref(),
                )
                .await?;
            let fetched = page.records.len();
            ops.extend(page.records.iter().filter_map(Stored::<LabelOpRecord>::decode));

            match page.cursor {
                Some(next) if fetched > 0 && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next)
                }
                _ => break,
            }
        }

        ops.sort_by(|a, b| a.rkey.cmp(&b.rkey));
        debug!(count = ops.len(), "loaded label history");
        Ok(ops.into_iter().map(|op| op.value).collect())
    }

    /// Current label addresses on `subject`
    pub(crate) async fn current_labels(
        &self,
        viewer_did: &str,
        subject: &str,
    ) -> TangledResult<BTreeSet<String>> {
        let history = self.label_history(viewer_did).await?;
        Ok(fold_labels(&history, subject))
    }

    /// Make `subject`'s labels equal `requested`.
    ///
    /// Validates against `repo_labels` first; writes one label operation
    /// with the diff against `current`, or nothing when the diff is empty.
    #[instrument(skip(self, repo_labels, current))]
    pub(crate) async fn reconcile_labels(
        &self,
        viewer_did: &str,
        subject: &str,
        requested: &[String],
        repo_labels: &[String],
        current: &BTreeSet<String>,
    ) -> TangledResult<Option<RecordRef>> {
        let desired = resolve_labels(requested, repo_labels)?;
        let diff = LabelDiff::between(&desired, current);
        if diff.is_empty() {
            debug!("labels already match, nothing to write");
            return Ok(None);
        }

        let op = LabelOpRecord {
            subject: subject.to_string(),
            add: diff.add.iter().map(LabelOperand::key).collect(),
            delete: diff.delete.iter().map(LabelOperand::key).collect(),
            performed_at: Some(now_timestamp()),
        };

        let written = self
            .pds
            .put_record(PutRecord {
                repo: viewer_did.to_string(),
                collection: LABEL_OP_COLLECTION.to_string(),
                rkey: next_tid(),
                record: encode(LABEL_OP_COLLECTION, &op)?,
                swap_record: None,
            })
            .await?;

        info!(
            subject,
            added = diff.add.len(),
            removed = diff.delete.len(),
            "label operation written"
        );
        Ok(Some(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUG: &str = "at://did:plc:o/sh.tangled.label.definition/bug";
    const ENH: &str = "at://did:plc:o/sh.tangled.label.definition/enhancement";
    const GFI: &str = "at://did:plc:o/sh.tangled.label.definition/good-first-issue";

    fn repo_labels() -> Vec<String> {
        vec![BUG.into(), ENH.into(), GFI.into()]
    }

    fn op(subject: &str, add: &[&str], delete: &[&str]) -> LabelOpRecord {
        LabelOpRecord {
            subject: subject.into(),
            add: add.iter().map(|k| LabelOperand::key(*k)).collect(),
            delete: delete.iter().map(|k| LabelOperand::key(*k)).collect(),
            performed_at: None,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_by_name_is_case_insensitive() {
        let resolved = resolve_labels(&["BUG".into(), "Good-First-Issue".into()], &repo_labels())
            .unwrap();
        assert_eq!(resolved, set(&[BUG, GFI]));
    }

    #[test]
    fn test_resolve_by_address_requires_subscription() {
        assert_eq!(
            resolve_labels(&[ENH.into()], &repo_labels()).unwrap(),
            set(&[ENH])
        );

        let foreign = "at://did:plc:x/sh.tangled.label.definition/bug".to_string();
        let err = resolve_labels(&[foreign.clone()], &repo_labels()).unwrap_err();
        match err {
            TangledError::InvalidLabels { invalid, .. } => assert_eq!(invalid, vec![foreign]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_name_lists_invalid_and_available() {
        let labels = vec![BUG.to_string(), ENH.to_string()];
        let err = resolve_labels(&["bug".into(), "nonexistent".into()], &labels).unwrap_err();
        match err {
            TangledError::InvalidLabels { invalid, available } => {
                assert_eq!(invalid, vec!["nonexistent".to_string()]);
                assert_eq!(available, vec!["bug".to_string(), "enhancement".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_diff() {
        let diff = LabelDiff::between(&set(&[BUG, ENH]), &set(&[ENH, GFI]));
        assert_eq!(diff.add, set(&[BUG]));
        assert_eq!(diff.delete, set(&[GFI]));
        assert!(LabelDiff::between(&set(&[BUG]), &set(&[BUG])).is_empty());
    }

    #[test]
    fn test_fold_applies_add_then_delete_in_order() {
        let subject = "at://did:plc:me/sh.tangled.repo.issue/1";
        let other = "at://did:plc:me/sh.tangled.repo.issue/2";
        let ops = vec![
            op(subject, &[BUG, ENH], &[]),
            op(other, &[GFI], &[]),
            op(subject, &[GFI], &[BUG]),
            // same op adds and deletes: delete wins
            op(subject, &[BUG], &[BUG]),
        ];
        assert_eq!(fold_labels(&ops, subject), set(&[ENH, GFI]));
        assert_eq!(fold_labels(&ops, other), set(&[GFI]));
    }

    #[test]
    fn test_fold_to_empty_after_removing_everything() {
        let subject = "at://did:plc:me/sh.tangled.repo.issue/1";
        let ops = vec![op(subject, &[BUG, ENH], &[]), op(subject, &[], &[BUG, ENH])];
        assert!(fold_labels(&ops, subject).is_empty());
    }

    #[test]
    fn test_fold_subjects_includes_unlabelled() {
        let a = "at://did:plc:me/sh.tangled.repo.pull/a";
        let b = "at://did:plc:me/sh.tangled.repo.pull/b";
        let ops = vec![op(a, &[BUG], &[]), op("at://elsewhere/x/y", &[ENH], &[])];
        let states = fold_subjects(&ops, [a, b]);
        assert_eq!(states.len(), 2);
        assert_eq!(states[a], set(&[BUG]));
        assert!(states[b].is_empty());
    }

    #[test]
    fn test_names() {
        assert_eq!(label_name(BUG), "bug");
        assert_eq!(names_of(&set(&[GFI, BUG])), vec!["bug", "good-first-issue"]);
        assert_eq!(
            available_names(&repo_labels()),
            vec!["bug", "enhancement", "good-first-issue"]
        );
    }
}
