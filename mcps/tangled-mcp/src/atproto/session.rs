//! Process-wide session cache
//!
//! Logging in to a PDS is slow and rate limited, so the session is created
//! once and reused until its access token is close to expiring. Callers go
//! through [`SessionCache::acquire`]; nothing else holds tokens.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::XrpcResult;
use super::types::Viewer;

/// Tokens closer than this to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Account identifier and app password
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated PDS session
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
}

impl Session {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            did: self.did.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Something that can turn credentials into a session
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn create_session(&self, credentials: &Credentials) -> XrpcResult<Session>;
}

struct CachedSession {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Caches one session behind explicit acquire/refresh/invalidate calls
pub struct SessionCache {
    credentials: Credentials,
    fallback_ttl: Duration,
    state: Mutex<Option<CachedSession>>,
}

impl SessionCache {
    pub fn new(credentials: Credentials, fallback_ttl: Duration) -> Self {
        Self {
            credentials,
            fallback_ttl,
            state: Mutex::new(None),
        }
    }

    /// Return the cached session, logging in again if it is missing or stale
    pub async fn acquire(&self, auth: &dyn Authenticator) -> XrpcResult<Session> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if cached.expires_at - chrono::Duration::seconds(EXPIRY_SKEW_SECS) > Utc::now() {
                return Ok(cached.session.clone());
            }
            debug!(did = %cached.session.did, "cached session expired");
        }

        let session = auth.create_session(&self.credentials).await?;
        let expires_at = token_expiry(&session.access_jwt).unwrap_or_else(|| {
            Utc::now()
                + chrono::Duration::from_std(self.fallback_ttl)
                    .unwrap_or_else(|_| chrono::Duration::minutes(30))
        });
        info!(did = %session.did, handle = %session.handle, %expires_at, "authenticated");

        *state = Some(CachedSession {
            session: session.clone(),
            expires_at,
        });
        Ok(session)
    }

    /// Drop the cached session and log in again
    pub async fn refresh(&self, auth: &dyn Authenticator) -> XrpcResult<Session> {
        self.invalidate().await;
        self.acquire(auth).await
    }

    /// Forget the cached session; the next `acquire` logs in again
    pub async fn invalidate(&self) {
        if self.state.lock().await.take().is_some() {
            debug!("session invalidated");
        }
    }

    /// The cached session, if one is live. Never logs in.
    #[cfg(test)]
    pub(crate) async fn current(&self) -> Option<Session> {
        self.state
            .lock()
            .await
            .as_ref()
            .filter(|c| c.expires_at > Utc::now())
            .map(|c| c.session.clone())
    }
}

/// Read the `exp` claim from a JWT without verifying it
fn token_expiry(jwt: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let payload = jwt.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}
