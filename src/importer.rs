//! JSON fixture importer.
//!
//! Loads the fixture files from the database directory, provisions auth
//! identities for user records, and writes every record into its collection
//! through fixed-size batched commits. Relationship records get an
//! order-independent document ID derived from their two participants.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::{Map, Value};
use std::path::Path;

use crate::backend::{AuthProvider, DocumentStore, DocumentWrite, UserLookup};
use crate::config;
use crate::error::{Result, SeederError};

/// Firestore-style auto IDs: 20 alphanumeric characters.
const AUTO_ID_LEN: usize = 20;

type Record = Map<String, Value>;

/// Load one fixture file as a list of records.
///
/// A missing file is logged and yields an empty list; a malformed file is an
/// error (the fixture exists but can't be imported).
pub fn load_fixture(base_dir: &Path, filename: &str) -> Result<Vec<Record>> {
    let path = base_dir.join(filename);
    if !path.exists() {
        tracing::info!("File not found: {}", filename);
        return Ok(Vec::new());
    }
    let raw = std::fs::read(&path)?;
    serde_json::from_slice(&raw).map_err(|e| SeederError::InvalidFixture(filename.to_string(), e))
}

fn auto_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Render a JSON value as a document ID fragment.
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Document ID for a record: its key field stringified, or a generated
/// auto ID when the field is absent (or null).
pub fn record_doc_id(record: &Record, key_field: &str) -> String {
    match record.get(key_field) {
        Some(Value::Null) | None => auto_id(),
        Some(value) => id_string(value),
    }
}

/// Order-independent relationship document ID: the two participants sorted
/// lexicographically and joined with an underscore, so `(u2, u1)` and
/// `(u1, u2)` address the same document across re-imports.
pub fn relationship_doc_id(p1: &str, p2: &str) -> String {
    if p1 <= p2 {
        format!("{}_{}", p1, p2)
    } else {
        format!("{}_{}", p2, p1)
    }
}

/// Accumulates document writes and commits every [`config::BATCH_LIMIT`]
/// of them, plus a final partial batch on `finish` (skipped when empty).
pub struct BatchWriter<'a> {
    store: &'a dyn DocumentStore,
    pending: Vec<DocumentWrite>,
    committed: usize,
}

impl<'a> BatchWriter<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            pending: Vec::new(),
            committed: 0,
        }
    }

    pub async fn push(&mut self, write: DocumentWrite) -> Result<()> {
        self.pending.push(write);
        if self.pending.len() >= config::BATCH_LIMIT {
            self.flush().await?;
            tracing::info!("  Committed {} items...", self.committed);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        let writes = std::mem::take(&mut self.pending);
        self.committed += writes.len();
        self.store.commit(writes).await?;
        Ok(())
    }

    /// Commit any remaining partial batch and return the total written.
    pub async fn finish(mut self) -> Result<usize> {
        if !self.pending.is_empty() {
            self.flush().await?;
        }
        Ok(self.committed)
    }
}

/// Batch-write records into a collection, keyed by `key_field`.
pub async fn import_collection(
    store: &dyn DocumentStore,
    collection: &str,
    records: Vec<Record>,
    key_field: &str,
) -> Result<()> {
    tracing::info!("Importing {} items into '{}'...", records.len(), collection);

    let mut batch = BatchWriter::new(store);
    for record in records {
        let doc_id = record_doc_id(&record, key_field);
        batch
            .push(DocumentWrite {
                collection: collection.to_string(),
                doc_id,
                fields: record,
            })
            .await?;
    }
    let total = batch.finish().await?;
    tracing::info!("  Committed final batch. Total: {}", total);
    Ok(())
}

/// Create an auth identity for every user record with an email and no
/// existing account.
///
/// Lookup and creation failures are logged per record and never abort the
/// run; an existing account is left untouched.
pub async fn provision_auth_users(records: &[Record], auth: &dyn AuthProvider) {
    for record in records {
        let Some(email) = record.get("email").and_then(Value::as_str) else {
            continue;
        };
        let uid = match record.get("userId") {
            Some(Value::Null) | None => None,
            Some(value) => Some(id_string(value)),
        };

        match auth.find_user_by_email(email).await {
            Ok(UserLookup::Found { .. }) => {}
            Ok(UserLookup::NotFound) => {
                match auth
                    .create_user(uid.as_deref(), email, config::PLACEHOLDER_PASSWORD)
                    .await
                {
                    Ok(()) => tracing::info!("Created Auth user: {}", email),
                    Err(e) => tracing::warn!("Error creating user {}: {}", email, e),
                }
            }
            Err(e) => tracing::warn!("Error looking up user {}: {}", email, e),
        }
    }
}

/// Batch-write relationship records under their derived document IDs.
///
/// Records without exactly two participants produce no write; they are
/// tallied and reported once at the end.
pub async fn import_relationships(store: &dyn DocumentStore, records: Vec<Record>) -> Result<()> {
    tracing::info!("Importing {} relationships...", records.len());

    let mut batch = BatchWriter::new(store);
    let mut skipped = 0;
    for record in records {
        let doc_id = match record.get("participants").and_then(Value::as_array) {
            Some(participants) if participants.len() == 2 => relationship_doc_id(
                &id_string(&participants[0]),
                &id_string(&participants[1]),
            ),
            _ => {
                skipped += 1;
                continue;
            }
        };
        batch
            .push(DocumentWrite {
                collection: "relationships".to_string(),
                doc_id,
                fields: record,
            })
            .await?;
    }
    batch.finish().await?;

    if skipped > 0 {
        tracing::info!("Skipped {} relationship records without two participants.", skipped);
    }
    tracing::info!("Relationships imported.");
    Ok(())
}

/// Import every fixture file from `base_dir`.
///
/// Users are provisioned in Auth before their collection import; the other
/// fixtures go straight to their collections. A missing directory or file
/// is logged and skipped; a commit failure propagates.
pub async fn import_fixtures(
    base_dir: &Path,
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
) -> Result<()> {
    if !base_dir.exists() {
        tracing::info!("Database data directory not found: {}", base_dir.display());
        return Ok(());
    }

    let users = load_fixture(base_dir, "users.json")?;
    provision_auth_users(&users, auth).await;
    import_collection(store, "users", users, "userId").await?;

    let posts = load_fixture(base_dir, "posts.json")?;
    import_collection(store, "posts", posts, "id").await?;

    let invites = load_fixture(base_dir, "inviteCodes.json")?;
    import_collection(store, "inviteCodes", invites, "code").await?;

    let notifications = load_fixture(base_dir, "notifications.json")?;
    import_collection(store, "notifications", notifications, "id").await?;

    let relationships = load_fixture(base_dir, "relationships.json")?;
    import_relationships(store, relationships).await?;

    tracing::info!("Firestore import complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendResult, LocalAuthProvider, LocalDocumentStore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use tempfile::TempDir;

    /// Records the writes of every commit it receives.
    #[derive(Default)]
    struct RecordingStore {
        commits: Mutex<Vec<Vec<DocumentWrite>>>,
    }

    impl RecordingStore {
        fn commit_sizes(&self) -> Vec<usize> {
            self.commits.lock().iter().map(Vec::len).collect()
        }

        fn doc_ids(&self) -> Vec<String> {
            self.commits
                .lock()
                .iter()
                .flatten()
                .map(|w| w.doc_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn commit(&self, writes: Vec<DocumentWrite>) -> BackendResult<()> {
            self.commits.lock().push(writes);
            Ok(())
        }
    }

    /// Auth provider whose lookups fail for one specific email.
    struct FlakyAuth {
        inner: LocalAuthProvider,
        failing_email: String,
    }

    #[async_trait]
    impl AuthProvider for FlakyAuth {
        async fn find_user_by_email(&self, email: &str) -> BackendResult<UserLookup> {
            if email == self.failing_email {
                return Err(BackendError::Other("lookup exploded".to_string()));
            }
            self.inner.find_user_by_email(email).await
        }

        async fn create_user(
            &self,
            uid: Option<&str>,
            email: &str,
            password: &str,
        ) -> BackendResult<()> {
            self.inner.create_user(uid, email, password).await
        }
    }

    fn record(value: Value) -> Record {
        let Value::Object(map) = value else {
            panic!("test records must be objects")
        };
        map
    }

    fn numbered_records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| record(json!({ "id": format!("doc-{}", i) })))
            .collect()
    }

    #[test]
    fn test_relationship_doc_id_is_order_independent() {
        assert_eq!(relationship_doc_id("u1", "u2"), "u1_u2");
        assert_eq!(relationship_doc_id("u2", "u1"), "u1_u2");
    }

    #[test]
    fn test_record_doc_id_stringifies_numbers() {
        let r = record(json!({ "id": 42 }));
        assert_eq!(record_doc_id(&r, "id"), "42");
    }

    #[test]
    fn test_record_doc_id_generates_when_missing() {
        let r = record(json!({ "other": "x" }));
        let id = record_doc_id(&r, "id");
        assert_eq!(id.len(), AUTO_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));

        // Null behaves like an absent key.
        let r = record(json!({ "id": null }));
        assert_eq!(record_doc_id(&r, "id").len(), AUTO_ID_LEN);
    }

    #[tokio::test]
    async fn test_exactly_one_batch_at_the_limit() {
        let store = RecordingStore::default();
        import_collection(&store, "posts", numbered_records(400), "id")
            .await
            .unwrap();
        assert_eq!(store.commit_sizes(), vec![400]);
    }

    #[tokio::test]
    async fn test_one_over_the_limit_issues_two_commits() {
        let store = RecordingStore::default();
        import_collection(&store, "posts", numbered_records(401), "id")
            .await
            .unwrap();
        assert_eq!(store.commit_sizes(), vec![400, 1]);
    }

    #[tokio::test]
    async fn test_empty_fixture_commits_nothing() {
        let store = RecordingStore::default();
        import_collection(&store, "posts", Vec::new(), "id")
            .await
            .unwrap();
        assert!(store.commit_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_reimport_recomputes_identical_keys() {
        let records = vec![
            record(json!({ "participants": ["u2", "u1"] })),
            record(json!({ "participants": ["u3", "u4"] })),
        ];
        let first = RecordingStore::default();
        import_relationships(&first, records.clone()).await.unwrap();
        let second = RecordingStore::default();
        import_relationships(&second, records).await.unwrap();

        assert_eq!(first.doc_ids(), vec!["u1_u2", "u3_u4"]);
        assert_eq!(first.doc_ids(), second.doc_ids());
    }

    #[tokio::test]
    async fn test_relationships_without_two_participants_are_skipped() {
        let store = RecordingStore::default();
        let records = vec![
            record(json!({ "participants": ["u1"] })),
            record(json!({ "participants": ["u1", "u2", "u3"] })),
            record(json!({ "note": "no participants at all" })),
        ];
        import_relationships(&store, records).await.unwrap();
        assert!(store.doc_ids().is_empty());
    }

    #[tokio::test]
    async fn test_provisioning_creates_only_missing_accounts() {
        let auth = LocalAuthProvider::new();
        auth.create_user(Some("u1"), "existing@test.dev", "123456")
            .await
            .unwrap();

        let records = vec![
            record(json!({ "userId": "u1", "email": "existing@test.dev" })),
            record(json!({ "userId": "u2", "email": "new@test.dev" })),
            record(json!({ "userId": "u3" })), // no email, skipped
        ];
        provision_auth_users(&records, &auth).await;

        assert_eq!(auth.user_count(), 2);
        assert_eq!(
            auth.find_user_by_email("new@test.dev").await.unwrap(),
            UserLookup::Found {
                uid: "u2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_provisioning_survives_lookup_errors() {
        let auth = FlakyAuth {
            inner: LocalAuthProvider::new(),
            failing_email: "broken@test.dev".to_string(),
        };
        let records = vec![
            record(json!({ "userId": "u1", "email": "broken@test.dev" })),
            record(json!({ "userId": "u2", "email": "fine@test.dev" })),
        ];
        provision_auth_users(&records, &auth).await;

        // The failing record is skipped; the next one still gets an account.
        assert_eq!(auth.inner.user_count(), 1);
    }

    #[test]
    fn test_load_fixture_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let records = load_fixture(temp_dir.path(), "users.json").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_fixture_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("users.json"), b"{not json").unwrap();
        let result = load_fixture(temp_dir.path(), "users.json");
        assert!(matches!(result, Err(SeederError::InvalidFixture(_, _))));
    }

    #[tokio::test]
    async fn test_import_fixtures_end_to_end() {
        let fixtures_dir = TempDir::new().unwrap();
        std::fs::write(
            fixtures_dir.path().join("users.json"),
            json!([
                { "userId": "u1", "email": "u1@test.dev", "name": "One" },
                { "userId": "u2", "email": "u2@test.dev", "name": "Two" },
            ])
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            fixtures_dir.path().join("relationships.json"),
            json!([{ "participants": ["u2", "u1"], "status": "friends" }]).to_string(),
        )
        .unwrap();
        // posts.json, inviteCodes.json, notifications.json deliberately absent

        let remote_dir = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(remote_dir.path().to_path_buf());
        let auth = LocalAuthProvider::new();

        import_fixtures(fixtures_dir.path(), &store, &auth)
            .await
            .unwrap();

        assert!(remote_dir.path().join("users/u1.json").exists());
        assert!(remote_dir.path().join("users/u2.json").exists());
        assert!(remote_dir.path().join("relationships/u1_u2.json").exists());
        assert!(!remote_dir.path().join("posts").exists());
        assert_eq!(auth.user_count(), 2);
    }

    #[tokio::test]
    async fn test_import_fixtures_missing_dir_is_noop() {
        let remote_dir = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(remote_dir.path().to_path_buf());
        let auth = LocalAuthProvider::new();

        import_fixtures(Path::new("no/such/dir"), &store, &auth)
            .await
            .unwrap();
        assert_eq!(auth.user_count(), 0);
    }
}
