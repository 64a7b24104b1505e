//! In-memory PDS for exercising the orchestrators without a network

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::atproto::{
    next_tid, AtUri, Pds, PutRecord, Record, RecordPage, RecordRef, Viewer, XrpcError,
    XrpcResult,
};
use crate::tangled::lexicon::REPO_COLLECTION;

#[derive(Debug, Clone)]
struct Entry {
    cid: String,
    value: Value,
}

/// Store state captured when a guarded write was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSwap {
    /// Version of the record at the moment of refusal
    pub cid: Option<String>,
    /// Total writes at the moment of refusal
    pub writes: usize,
}

#[derive(Default)]
struct Store {
    /// (repo, collection) -> rkey -> entry
    collections: HashMap<(String, String), BTreeMap<String, Entry>>,
    next_cid: u64,
    writes: usize,
}

impl Store {
    fn write(&mut self, repo: &str, collection: &str, rkey: &str, value: Value) -> RecordRef {
        self.next_cid += 1;
        self.writes += 1;
        let cid = format!("bafy{}", self.next_cid);
        self.collections
            .entry((repo.to_string(), collection.to_string()))
            .or_default()
            .insert(rkey.to_string(), Entry { cid: cid.clone(), value });
        RecordRef {
            uri: AtUri::new(repo, collection, rkey).to_string(),
            cid,
        }
    }
}

/// A PDS holding records in memory.
///
/// Listings are newest first (descending record key), like a real PDS.
/// Guarded writes compare the stored version and fail with
/// [`XrpcError::VersionMismatch`] when it moved.
pub struct MemoryPds {
    viewer: Viewer,
    handles: HashMap<String, String>,
    store: Mutex<Store>,
    /// Record rewritten by a "concurrent writer" just before the next guarded put
    interleave: Mutex<Option<String>>,
    rejected: Mutex<Option<RejectedSwap>>,
    logged_in: AtomicBool,
    service_ok: AtomicBool,
}

impl MemoryPds {
    pub fn new(did: &str, handle: &str) -> Self {
        let mut handles = HashMap::new();
        handles.insert(handle.to_string(), did.to_string());
        Self {
            viewer: Viewer {
                did: did.to_string(),
                handle: handle.to_string(),
            },
            handles,
            store: Mutex::new(Store::default()),
            interleave: Mutex::new(None),
            rejected: Mutex::new(None),
            logged_in: AtomicBool::new(true),
            service_ok: AtomicBool::new(true),
        }
    }

    pub fn with_handle(mut self, handle: &str, did: &str) -> Self {
        self.handles.insert(handle.to_string(), did.to_string());
        self
    }

    pub fn viewer_did(&self) -> &str {
        &self.viewer.did
    }

    /// Store a `sh.tangled.repo` record and return its address
    pub fn seed_repo(&self, owner: &str, name: &str, knot: &str, labels: &[&str]) -> String {
        let value = json!({
            "$type": REPO_COLLECTION,
            "name": name,
            "knot": knot,
            "labels": labels,
            "createdAt": "2026-01-01T00:00:00Z",
        });
        self.store
            .lock()
            .unwrap()
            .write(owner, REPO_COLLECTION, &next_tid(), value)
            .uri
    }

    /// Records in one collection, oldest first
    pub fn records(&self, repo: &str, collection: &str) -> Vec<Record> {
        let store = self.store.lock().unwrap();
        store
            .collections
            .get(&(repo.to_string(), collection.to_string()))
            .map(|entries| {
                entries
                    .iter()
                    .map(|(rkey, e)| Record {
                        uri: AtUri::new(repo, collection, rkey.as_str()).to_string(),
                        cid: e.cid.clone(),
                        value: e.value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, uri: &str) -> Option<Record> {
        let at = AtUri::parse(uri)?;
        self.records(&at.authority, &at.collection)
            .into_iter()
            .find(|r| r.uri == uri)
    }

    /// Total successful writes
    pub fn writes(&self) -> usize {
        self.store.lock().unwrap().writes
    }

    /// Before the next guarded put, rewrite `uri` as another client would
    pub fn interleave_write(&self, uri: &str) {
        *self.interleave.lock().unwrap() = Some(uri.to_string());
    }

    /// State of the store when the last guarded write was refused
    pub fn last_rejected_swap(&self) -> Option<RejectedSwap> {
        self.rejected.lock().unwrap().clone()
    }

    pub fn log_out(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }

    pub fn refuse_service_tokens(&self) {
        self.service_ok.store(false, Ordering::SeqCst);
    }

    fn concurrent_write(&self, store: &mut Store) {
        let Some(uri) = self.interleave.lock().unwrap().take() else {
            return;
        };
        let Some(at) = AtUri::parse(&uri) else {
            return;
        };
        let key = (at.authority.clone(), at.collection.clone());
        let Some(mut value) = store
            .collections
            .get(&key)
            .and_then(|c| c.get(&at.rkey))
            .map(|e| e.value.clone())
        else {
            return;
        };
        value["title"] = json!("edited elsewhere");
        store.write(&at.authority, &at.collection, &at.rkey, value);
    }
}

#[async_trait]
impl Pds for MemoryPds {
    async fn viewer(&self) -> XrpcResult<Viewer> {
        if self.logged_in.load(Ordering::SeqCst) {
            Ok(self.viewer.clone())
        } else {
            Err(XrpcError::AuthFailed("invalid identifier or password".into()))
        }
    }

    async fn resolve_handle(&self, handle: &str) -> XrpcResult<String> {
        self.handles
            .get(handle)
            .cloned()
            .ok_or_else(|| XrpcError::Api {
                method: "com.atproto.identity.resolveHandle".into(),
                status: 400,
                error: "InvalidRequest".into(),
                message: "Unable to resolve handle".into(),
            })
    }

    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> XrpcResult<RecordPage> {
        let limit = limit.clamp(1, 100) as usize;
        let mut records: Vec<Record> = self
            .records(repo, collection)
            .into_iter()
            .rev()
            .filter(|r| cursor.map_or(true, |c| r.rkey() < c))
            .collect();

        let cursor = if records.len() > limit {
            records.truncate(limit);
            records.last().map(|r| r.rkey().to_string())
        } else {
            None
        };
        Ok(RecordPage { records, cursor })
    }

    async fn put_record(&self, request: PutRecord) -> XrpcResult<RecordRef> {
        let mut store = self.store.lock().unwrap();

        if let Some(expected) = &request.swap_record {
            self.concurrent_write(&mut store);
            let current = store
                .collections
                .get(&(request.repo.clone(), request.collection.clone()))
                .and_then(|c| c.get(&request.rkey))
                .map(|e| e.cid.clone());
            if current.as_deref() != Some(expected.as_str()) {
                *self.rejected.lock().unwrap() = Some(RejectedSwap {
                    cid: current.clone(),
                    writes: store.writes,
                });
                return Err(XrpcError::VersionMismatch(format!(
                    "record was at {:?}",
                    current
                )));
            }
        }

        Ok(store.write(
            &request.repo,
            &request.collection,
            &request.rkey,
            request.record,
        ))
    }

    async fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> XrpcResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(entries) = store
            .collections
            .get_mut(&(repo.to_string(), collection.to_string()))
        {
            entries.remove(rkey);
        }
        Ok(())
    }

    async fn service_token(&self, audience: &str) -> XrpcResult<String> {
        if self.service_ok.load(Ordering::SeqCst) {
            Ok(format!("service-token-for-{}", audience))
        } else {
            Err(XrpcError::Unavailable {
                method: "com.atproto.server.getServiceAuth".into(),
                reason: "503 Service Unavailable".into(),
            })
        }
    }
}
