//! PDS client
//!
//! [`Pds`] is the seam between the Tangled logic and the network: identity
//! lookup, the authenticated viewer, record listing/writing and service
//! tokens. [`XrpcClient`] implements it against a real PDS over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, instrument, warn};

use super::error::{XrpcError, XrpcResult};
use super::session::{Authenticator, Credentials, Session, SessionCache};
use super::types::{PutRecord, RecordPage, RecordRef, Viewer};

/// Operations this crate needs from a PDS
#[async_trait]
pub trait Pds: Send + Sync {
    /// Identity of the authenticated account
    async fn viewer(&self) -> XrpcResult<Viewer>;

    /// Resolve a handle (without leading `@`) to a DID
    async fn resolve_handle(&self, handle: &str) -> XrpcResult<String>;

    /// List one page of records from `repo`'s `collection`
    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> XrpcResult<RecordPage>;

    /// Create or replace a record, optionally guarded by `swap_record`
    async fn put_record(&self, request: PutRecord) -> XrpcResult<RecordRef>;

    /// Delete a record by key
    async fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> XrpcResult<()>;

    /// Short-lived token for calling another service as the viewer
    async fn service_token(&self, audience: &str) -> XrpcResult<String>;
}

/// Error body returned by XRPC endpoints
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Unauthenticated HTTP half of the client; also performs logins
struct Transport {
    http: Client,
    base_url: String,
}

impl Transport {
    fn url(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.base_url.trim_end_matches('/'), method)
    }
}

#[async_trait]
impl Authenticator for Transport {
    #[instrument(skip(self, credentials), fields(identifier = %credentials.identifier))]
    async fn create_session(&self, credentials: &Credentials) -> XrpcResult<Session> {
        const METHOD: &str = "com.atproto.server.createSession";
        let request = self.http.post(self.url(METHOD)).json(&json!({
            "identifier": credentials.identifier,
            "password": credentials.password,
        }));
        match execute(METHOD, request).await {
            Ok(response) => decode(METHOD, response).await,
            Err(XrpcError::Api { message, .. }) => Err(XrpcError::AuthFailed(format!(
                "could not log in as '{}': {}",
                credentials.identifier, message
            ))),
            Err(e) => Err(e),
        }
    }
}

/// [`Pds`] over XRPC/HTTP with a cached session
pub struct XrpcClient {
    transport: Transport,
    sessions: SessionCache,
}

impl XrpcClient {
    /// Build a client for the PDS at `base_url`.
    ///
    /// Every request carries `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
        session_ttl: Duration,
    ) -> XrpcResult<Self> {
        let http = http_client(timeout)?;
        Ok(Self {
            transport: Transport {
                http,
                base_url: base_url.into(),
            },
            sessions: SessionCache::new(credentials, session_ttl),
        })
    }

    #[cfg(test)]
    pub(crate) fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    async fn session(&self) -> XrpcResult<Session> {
        self.sessions.acquire(&self.transport).await
    }

    /// Send an authenticated request. A rejected token drops the cached
    /// session so the next call logs in again.
    async fn send_authorized(&self, method: &str, request: RequestBuilder) -> XrpcResult<Response> {
        let session = self.session().await?;
        let result = execute(method, request.bearer_auth(&session.access_jwt)).await;
        if let Err(XrpcError::ExpiredToken(ref reason)) = result {
            warn!(method, reason = %reason, "access token rejected, dropping session");
            self.sessions.invalidate().await;
        }
        result
    }
}

/// Shared reqwest client with the crate's user agent and a hard timeout
pub(crate) fn http_client(timeout: Duration) -> XrpcResult<Client> {
    Client::builder()
        .user_agent(concat!("tangled-mcp/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| XrpcError::Unavailable {
            method: "http client".into(),
            reason: e.to_string(),
        })
}

/// Send a request and classify every non-success outcome
pub(crate) async fn execute(method: &str, request: RequestBuilder) -> XrpcResult<Response> {
    debug!(method, "xrpc request");
    let response = request.send().await.map_err(|e| transport_error(method, e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: XrpcErrorBody = response.json().await.unwrap_or_default();
    let err = classify(method, status, body);
    error!(method, status = status.as_u16(), error = %err, "xrpc call failed");
    Err(err)
}

/// Decode a success body
pub(crate) async fn decode<T: DeserializeOwned>(method: &str, response: Response) -> XrpcResult<T> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            XrpcError::Timeout {
                method: method.to_string(),
            }
        } else {
            XrpcError::Decode {
                method: method.to_string(),
                reason: e.to_string(),
            }
        }
    })
}

fn transport_error(method: &str, e: reqwest::Error) -> XrpcError {
    if e.is_timeout() {
        XrpcError::Timeout {
            method: method.to_string(),
        }
    } else {
        XrpcError::Unavailable {
            method: method.to_string(),
            reason: e.to_string(),
        }
    }
}

fn classify(method: &str, status: StatusCode, body: XrpcErrorBody) -> XrpcError {
    let message = body.message.unwrap_or_default();
    match (status, body.error.as_deref()) {
        (_, Some("InvalidSwap")) => XrpcError::VersionMismatch(message),
        (_, Some("ExpiredToken" | "InvalidToken")) => XrpcError::ExpiredToken(message),
        (StatusCode::UNAUTHORIZED, _) | (_, Some("AuthenticationRequired")) => {
            XrpcError::AuthFailed(message)
        }
        (StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE, _) => {
            XrpcError::Unavailable {
                method: method.to_string(),
                reason: format!("{}: {}", status, message),
            }
        }
        (StatusCode::GATEWAY_TIMEOUT, _) => XrpcError::Timeout {
            method: method.to_string(),
        },
        (_, error) => XrpcError::Api {
            method: method.to_string(),
            status: status.as_u16(),
            error: error.unwrap_or("Unknown").to_string(),
            message,
        },
    }
}

#[async_trait]
impl Pds for XrpcClient {
    async fn viewer(&self) -> XrpcResult<Viewer> {
        Ok(self.session().await?.viewer())
    }

    #[instrument(skip(self))]
    async fn resolve_handle(&self, handle: &str) -> XrpcResult<String> {
        const METHOD: &str = "com.atproto.identity.resolveHandle";

        #[derive(Deserialize)]
        struct Output {
            did: String,
        }

        let request = self
            .transport
            .http
            .get(self.transport.url(METHOD))
            .query(&[("handle", handle)]);
        let response = execute(METHOD, request).await?;
        Ok(decode::<Output>(METHOD, response).await?.did)
    }

    #[instrument(skip(self))]
    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> XrpcResult<RecordPage> {
        const METHOD: &str = "com.atproto.repo.listRecords";

        let limit = limit.clamp(1, 100).to_string();
        let mut query = vec![
            ("repo", repo),
            ("collection", collection),
            ("limit", limit.as_str()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let request = self
            .transport
            .http
            .get(self.transport.url(METHOD))
            .query(&query);
        let response = self.send_authorized(METHOD, request).await?;
        decode(METHOD, response).await
    }

    #[instrument(skip(self, request), fields(collection = %request.collection, rkey = %request.rkey))]
    async fn put_record(&self, request: PutRecord) -> XrpcResult<RecordRef> {
        const METHOD: &str = "com.atproto.repo.putRecord";

        let builder = self
            .transport
            .http
            .post(self.transport.url(METHOD))
            .json(&request);
        let response = self.send_authorized(METHOD, builder).await?;
        decode(METHOD, response).await
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> XrpcResult<()> {
        const METHOD: &str = "com.atproto.repo.deleteRecord";

        let request = self
            .transport
            .http
            .post(self.transport.url(METHOD))
            .json(&json!({
                "repo": repo,
                "collection": collection,
                "rkey": rkey,
            }));
        self.send_authorized(METHOD, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn service_token(&self, audience: &str) -> XrpcResult<String> {
        const METHOD: &str = "com.atproto.server.getServiceAuth";

        #[derive(Deserialize)]
        struct Output {
            token: String,
        }

        // no `lxm` scope: the PDS caps the token at 60 seconds
        let request = self
            .transport
            .http
            .get(self.transport.url(METHOD))
            .query(&[("aud", audience)]);
        let response = self.send_authorized(METHOD, request).await?;
        Ok(decode::<Output>(METHOD, response).await?.token)
    }
}
