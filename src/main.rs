mod backend;
mod client;
mod config;
mod credentials;
mod error;
mod importer;
mod uploader;

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fireseed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Seeding failed: {}", e);
        std::process::exit(1);
    }
}

/// Run both procedures, images first, unconditionally in that order.
async fn run() -> Result<()> {
    upload_seed_images().await?;
    import_seed_fixtures().await?;
    Ok(())
}

/// Image upload procedure.
///
/// A missing key file aborts only this procedure: the error is logged and
/// the run moves on, matching the skip behavior for missing data.
async fn upload_seed_images() -> Result<()> {
    let key_path = Path::new(config::SERVICE_ACCOUNT_FILE);
    if !key_path.exists() {
        tracing::error!("Service account key not found at {}", key_path.display());
        tracing::error!(
            "Place your '{}' in the working directory.",
            config::SERVICE_ACCOUNT_FILE
        );
        return Ok(());
    }

    let client = client::initialize().await?;
    uploader::upload_images(Path::new(config::PICS_DIR), client.object_store()).await
}

/// Fixture import procedure.
async fn import_seed_fixtures() -> Result<()> {
    let key_path = Path::new(config::SERVICE_ACCOUNT_FILE);
    if !key_path.exists() {
        tracing::error!("Service account key not found at {}", key_path.display());
        return Ok(());
    }

    let client = client::initialize().await?;
    importer::import_fixtures(
        Path::new(config::FIXTURES_DIR),
        client.document_store(),
        client.auth_provider(),
    )
    .await
}
