//! Wire types for `com.atproto.*` calls
//!
//! Records come back from the PDS as loosely-typed JSON. They stay as
//! [`Record`] only until [`Record::decode`] turns them into a lexicon type.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Authenticated identity behind the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub did: String,
    pub handle: String,
}

/// Parsed `at://authority/collection/rkey` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri {
    pub authority: String,
    pub collection: String,
    pub rkey: String,
}

impl AtUri {
    pub fn new(
        authority: impl Into<String>,
        collection: impl Into<String>,
        rkey: impl Into<String>,
    ) -> Self {
        Self {
            authority: authority.into(),
            collection: collection.into(),
            rkey: rkey.into(),
        }
    }

    /// Parse a record address. Returns `None` for anything that is not
    /// exactly authority, collection and record key.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("at://")?;
        let mut parts = rest.split('/');
        let authority = parts.next().filter(|s| !s.is_empty())?;
        let collection = parts.next().filter(|s| !s.is_empty())?;
        let rkey = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(authority, collection, rkey))
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at://{}/{}/{}", self.authority, self.collection, self.rkey)
    }
}

/// A record as returned by `com.atproto.repo.listRecords`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub uri: String,
    pub cid: String,
    pub value: serde_json::Value,
}

impl Record {
    /// Record key: the last path segment of the record address
    pub fn rkey(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or_default()
    }

    /// Decode the record value into a typed lexicon record.
    ///
    /// Values that do not fit the schema are skipped rather than failing the
    /// whole listing.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        match serde_json::from_value(self.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(uri = %self.uri, error = %e, "skipping record that does not match schema");
                None
            }
        }
    }
}

/// One page of a record listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Input for `com.atproto.repo.putRecord`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRecord {
    pub repo: String,
    pub collection: String,
    pub rkey: String,
    pub record: serde_json::Value,
    /// Version the caller last read; the write fails if it changed since
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_record: Option<String>,
}

/// Address and version of a written record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub uri: String,
    pub cid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_uri_round_trips_through_display() {
        let uri = AtUri::parse("at://did:plc:abc/sh.tangled.repo.issue/3kxyz").unwrap();
        assert_eq!(uri.authority, "did:plc:abc");
        assert_eq!(uri.collection, "sh.tangled.repo.issue");
        assert_eq!(uri.rkey, "3kxyz");
        assert_eq!(uri.to_string(), "at://did:plc:abc/sh.tangled.repo.issue/3kxyz");
    }

    #[test]
    fn test_at_uri_rejects_partial_addresses() {
        assert!(AtUri::parse("at://did:plc:abc").is_none());
        assert!(AtUri::parse("at://did:plc:abc/sh.tangled.repo").is_none());
        assert!(AtUri::parse("https://did:plc:abc/a/b").is_none());
        assert!(AtUri::parse("at://did:plc:abc/a/b/c").is_none());
    }

    #[test]
    fn test_record_rkey_and_decode() {
        #[derive(Deserialize)]
        struct Named {
            name: String,
        }

        let record = Record {
            uri: "at://did:plc:abc/sh.tangled.repo/3kabc".into(),
            cid: "bafy1".into(),
            value: json!({"name": "widgets"}),
        };
        assert_eq!(record.rkey(), "3kabc");
        assert_eq!(record.decode::<Named>().unwrap().name, "widgets");

        let broken = Record {
            value: json!({"name": 7}),
            ..record
        };
        assert!(broken.decode::<Named>().is_none());
    }

    #[test]
    fn test_put_record_omits_missing_swap() {
        let put = PutRecord {
            repo: "did:plc:abc".into(),
            collection: "sh.tangled.repo.issue".into(),
            rkey: "3k".into(),
            record: json!({}),
            swap_record: None,
        };
        let value = serde_json::to_value(&put).unwrap();
        assert!(value.get("swapRecord").is_none());

        let put = PutRecord {
            swap_record: Some("bafy1".into()),
            ..put
        };
        let value = serde_json::to_value(&put).unwrap();
        assert_eq!(value["swapRecord"], "bafy1");
    }
}
