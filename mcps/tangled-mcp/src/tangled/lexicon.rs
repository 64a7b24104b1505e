//! Tangled lexicon records
//!
//! Typed shapes for the `sh.tangled.*` collections. Optional fields default
//! so records written by other clients still decode.

use serde::{Deserialize, Serialize};

use super::error::TangledResult;
use crate::atproto::{Record, XrpcError};

pub const REPO_COLLECTION: &str = "sh.tangled.repo";
pub const ISSUE_COLLECTION: &str = "sh.tangled.repo.issue";
pub const PULL_COLLECTION: &str = "sh.tangled.repo.pull";
pub const LABEL_OP_COLLECTION: &str = "sh.tangled.label.op";

/// `sh.tangled.repo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub knot: Option<String>,
    /// Subscribed label definition addresses
    #[serde(default)]
    pub labels: Vec<String>,
}

/// `sh.tangled.repo.issue`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// Address of the repository record
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `sh.tangled.repo.pull`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRecord {
    pub target: PullTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub patch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PullSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullTarget {
    pub repo: String,
    #[serde(default)]
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullSource {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub sha: String,
}

/// `sh.tangled.label.op`: one append-only change to a subject's labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOpRecord {
    pub subject: String,
    #[serde(default)]
    pub add: Vec<LabelOperand>,
    #[serde(default)]
    pub delete: Vec<LabelOperand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelOperand {
    /// Label definition address
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl LabelOperand {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
        }
    }
}

/// A decoded record together with its address and version
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub uri: String,
    pub cid: String,
    pub rkey: String,
    pub value: T,
}

impl<T: serde::de::DeserializeOwned> Stored<T> {
    pub fn decode(record: &Record) -> Option<Self> {
        Some(Self {
            uri: record.uri.clone(),
            cid: record.cid.clone(),
            rkey: record.rkey().to_string(),
            value: record.decode()?,
        })
    }
}

/// Serialize `record` with its `$type`
pub fn to_record<T: Serialize>(nsid: &str, record: &T) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(record)?;
    if let serde_json::Value::Object(ref mut map) = value {
        map.insert("$type".into(), serde_json::Value::String(nsid.into()));
    }
    Ok(value)
}

/// [`to_record`] for a write about to be sent upstream
pub(crate) fn encode<T: Serialize>(nsid: &str, record: &T) -> TangledResult<serde_json::Value> {
    to_record(nsid, record).map_err(|e| {
        XrpcError::Decode {
            method: format!("encode {nsid}"),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Current time as an RFC 3339 UTC timestamp with a `Z` suffix
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
