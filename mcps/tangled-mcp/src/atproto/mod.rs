//! AT Protocol boundary
//!
//! Everything that talks to a PDS lives here: the [`Pds`] trait, its HTTP
//! implementation, the session cache, record keys and wire types.

pub mod client;
pub mod error;
pub mod session;
pub mod tid;
pub mod types;

pub use client::{Pds, XrpcClient};
pub use error::{XrpcError, XrpcResult};
pub use session::{Credentials, Session, SessionCache};
pub use tid::next_tid;
pub use types::{AtUri, PutRecord, Record, RecordPage, RecordRef, Viewer};
