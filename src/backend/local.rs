//! Local implementations of the backend traits.
//!
//! Used by tests and for offline dry runs: objects land as files under a base
//! directory, documents as one JSON file per `{collection}/{doc_id}`, and
//! auth identities in an in-memory map.

#![allow(dead_code)] // Constructed by tests; the release binary only builds the Firebase backend

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::api::{
    AuthProvider, BackendError, BackendResult, DocumentStore, DocumentWrite, ObjectStore,
    UserLookup,
};

/// Object store writing under a base directory.
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    async fn ensure_parent(path: &Path) -> BackendResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_bytes(&self, path: &str, data: Bytes) -> BackendResult<()> {
        let dest = self.object_path(path);
        Self::ensure_parent(&dest).await?;
        fs::write(&dest, &data).await?;
        Ok(())
    }

    async fn put_from_file(&self, path: &str, local_path: &Path) -> BackendResult<()> {
        let dest = self.object_path(path);
        Self::ensure_parent(&dest).await?;
        fs::copy(local_path, &dest).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackendError::NotFound(local_path.display().to_string())
            } else {
                BackendError::Io(e)
            }
        })?;
        Ok(())
    }
}

/// Document store writing one JSON file per document.
pub struct LocalDocumentStore {
    base_path: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn commit(&self, writes: Vec<DocumentWrite>) -> BackendResult<()> {
        for write in writes {
            let dir = self.base_path.join(&write.collection);
            fs::create_dir_all(&dir).await?;
            let doc_path = dir.join(format!("{}.json", write.doc_id));
            let body = serde_json::to_vec_pretty(&Value::Object(write.fields))
                .map_err(|e| BackendError::Other(e.to_string()))?;
            fs::write(&doc_path, body).await?;
        }
        Ok(())
    }
}

/// In-memory auth provider keyed by email.
#[derive(Default)]
pub struct LocalAuthProvider {
    users: RwLock<HashMap<String, String>>,
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn find_user_by_email(&self, email: &str) -> BackendResult<UserLookup> {
        match self.users.read().get(email) {
            Some(uid) => Ok(UserLookup::Found { uid: uid.clone() }),
            None => Ok(UserLookup::NotFound),
        }
    }

    async fn create_user(
        &self,
        uid: Option<&str>,
        email: &str,
        _password: &str,
    ) -> BackendResult<()> {
        let mut users = self.users.write();
        let uid = uid
            .map(str::to_string)
            .unwrap_or_else(|| format!("local-{}", users.len() + 1));
        users.insert(email.to_string(), uid);
        Ok(())
    }
}
