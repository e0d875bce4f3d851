//! Firebase REST backend.
//!
//! Implements all three backend traits against the Firebase admin surface:
//! Cloud Storage for objects, Firestore `documents:commit` for batched
//! document writes, and the Identity Toolkit for auth accounts. All requests
//! carry the service account's OAuth2 bearer token.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::path::Path;

use super::api::{
    AuthProvider, BackendError, BackendResult, DocumentStore, DocumentWrite, ObjectStore,
    UserLookup,
};
use super::value::encode_fields;

const STORAGE_API: &str = "https://firebasestorage.googleapis.com/v0";
const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
const IDENTITY_API: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase backend handle.
///
/// Cheap to clone the pieces out of; one instance serves both seeding
/// procedures for the lifetime of the run.
pub struct FirebaseBackend {
    http: reqwest::Client,
    access_token: String,
    project_id: String,
    bucket: String,
}

impl FirebaseBackend {
    pub fn new(
        http: reqwest::Client,
        access_token: String,
        project_id: String,
        bucket: String,
    ) -> Self {
        Self {
            http,
            access_token,
            project_id,
            bucket,
        }
    }

    /// Fully qualified Firestore document name for a collection/ID pair
    fn document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.project_id, collection, doc_id
        )
    }

    /// Turn a non-success response into a `BackendError::Http`
    async fn check_status(response: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Http(format!("{}: {}", status, body)))
    }
}

#[async_trait]
impl ObjectStore for FirebaseBackend {
    async fn put_bytes(&self, path: &str, data: Bytes) -> BackendResult<()> {
        let url = format!("{}/b/{}/o", STORAGE_API, self.bucket);
        let response = self
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", path)])
            .bearer_auth(&self.access_token)
            .body(data)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn put_from_file(&self, path: &str, local_path: &Path) -> BackendResult<()> {
        let data = tokio::fs::read(local_path).await?;
        self.put_bytes(path, Bytes::from(data)).await
    }
}

#[async_trait]
impl DocumentStore for FirebaseBackend {
    async fn commit(&self, writes: Vec<DocumentWrite>) -> BackendResult<()> {
        let url = format!(
            "{}/projects/{}/databases/(default)/documents:commit",
            FIRESTORE_API, self.project_id
        );

        // Each write is an `update` with no mask: a full-document overwrite.
        let writes: Vec<Value> = writes
            .iter()
            .map(|w| {
                json!({
                    "update": {
                        "name": self.document_name(&w.collection, &w.doc_id),
                        "fields": encode_fields(&w.fields),
                    }
                })
            })
            .collect();

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for FirebaseBackend {
    async fn find_user_by_email(&self, email: &str) -> BackendResult<UserLookup> {
        let url = format!(
            "{}/projects/{}/accounts:lookup",
            IDENTITY_API, self.project_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "email": [email] }))
            .send()
            .await?;
        let body: Value = Self::check_status(response).await?.json().await?;

        // The lookup endpoint answers 200 with no `users` key when nothing
        // matches.
        match body.get("users").and_then(Value::as_array) {
            Some(users) if !users.is_empty() => {
                let uid = users[0]
                    .get("localId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        BackendError::Other(format!("account for {} has no localId", email))
                    })?;
                Ok(UserLookup::Found {
                    uid: uid.to_string(),
                })
            }
            _ => Ok(UserLookup::NotFound),
        }
    }

    async fn create_user(
        &self,
        uid: Option<&str>,
        email: &str,
        password: &str,
    ) -> BackendResult<()> {
        let url = format!("{}/projects/{}/accounts", IDENTITY_API, self.project_id);

        let mut body = json!({ "email": email, "password": password });
        if let Some(uid) = uid {
            body["localId"] = json!(uid);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
