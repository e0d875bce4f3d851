//! Process-wide backend client handle.
//!
//! Both seeding procedures want the backend initialized before they start,
//! and either may run first. The handle lives behind a guarded init-once
//! cell: the first caller builds it (loads the key file, mints a token),
//! later callers get the existing handle back.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::backend::{AuthProvider, DocumentStore, FirebaseBackend, ObjectStore};
use crate::config;
use crate::credentials::{self, ServiceAccount};
use crate::error::Result;

static CLIENT: OnceCell<Arc<SeedClient>> = OnceCell::const_new();

/// Initialized backend handle shared by both procedures.
pub struct SeedClient {
    backend: Arc<FirebaseBackend>,
}

impl SeedClient {
    pub fn object_store(&self) -> &dyn ObjectStore {
        self.backend.as_ref()
    }

    pub fn document_store(&self) -> &dyn DocumentStore {
        self.backend.as_ref()
    }

    pub fn auth_provider(&self) -> &dyn AuthProvider {
        self.backend.as_ref()
    }
}

/// Get the process-wide client, building it on first call.
///
/// Repeated calls are expected (each procedure initializes independently)
/// and return the already-built handle.
pub async fn initialize() -> Result<Arc<SeedClient>> {
    CLIENT
        .get_or_try_init(|| async {
            let account = ServiceAccount::load(Path::new(config::SERVICE_ACCOUNT_FILE))?;
            let http = reqwest::Client::new();
            let token = credentials::mint_access_token(&http, &account).await?;
            tracing::info!(project = %account.project_id, "Backend client initialized");

            let backend = Arc::new(FirebaseBackend::new(
                http,
                token,
                account.project_id,
                config::STORAGE_BUCKET.to_string(),
            ));
            Ok(Arc::new(SeedClient { backend }))
        })
        .await
        .cloned()
}
