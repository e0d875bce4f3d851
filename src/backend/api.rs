//! Backend trait definitions.
//!
//! Every remote call the seeder makes goes through one of these three
//! traits. All writes have overwrite semantics: re-running the seeder
//! rewrites the same objects and documents.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Backend error types
#[derive(Debug)]
pub enum BackendError {
    /// Resource not found
    NotFound(String),
    /// IO error
    Io(std::io::Error),
    /// HTTP transport or status error
    Http(String),
    /// Other error
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotFound(what) => write!(f, "Not found: {}", what),
            BackendError::Io(e) => write!(f, "IO error: {}", e),
            BackendError::Http(msg) => write!(f, "HTTP error: {}", msg),
            BackendError::Other(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            BackendError::NotFound(e.to_string())
        } else {
            BackendError::Io(e)
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Http(e.to_string())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Key-addressed binary storage for image fixtures.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write bytes to a remote path, overwriting any existing object
    async fn put_bytes(&self, path: &str, data: Bytes) -> BackendResult<()>;

    /// Write a local file's content to a remote path
    async fn put_from_file(&self, path: &str, local_path: &Path) -> BackendResult<()>;
}

/// One full-document set operation, addressed by collection and document ID.
///
/// The payload is a schemaless JSON map; fixtures carry whatever fields they
/// carry and the store writes them as-is (no merge).
#[derive(Clone, Debug)]
pub struct DocumentWrite {
    pub collection: String,
    pub doc_id: String,
    pub fields: Map<String, Value>,
}

/// Batched document storage.
///
/// A commit is atomic as a unit; callers are responsible for keeping batches
/// under the backend's per-commit write limit.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Commit one batch of document writes atomically
    async fn commit(&self, writes: Vec<DocumentWrite>) -> BackendResult<()>;
}

/// Outcome of an identity lookup.
///
/// Not-found is an expected answer (it triggers account creation), so it is
/// part of the result rather than an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserLookup {
    Found { uid: String },
    NotFound,
}

/// Authentication identity provisioning.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Look up an existing identity by email
    async fn find_user_by_email(&self, email: &str) -> BackendResult<UserLookup>;

    /// Create an identity, optionally with a fixed UID
    async fn create_user(
        &self,
        uid: Option<&str>,
        email: &str,
        password: &str,
    ) -> BackendResult<()>;
}
