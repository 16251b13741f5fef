use std::path::Path;

use anyhow::Result;
use tracing::info;

use translations::config::Config;
use translations::db::Database;
use translations::manifest::Manifest;
use translations::sync::{sync_translations, ObsoletePolicy, SyncOptions};

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translations=info".parse()?),
        )
        .init();

    info!("Starting translation synchronization");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Open the store and read the declared field set
    let db = Database::new(&config.database_path)?;
    let manifest = Manifest::load(Path::new(&config.manifest_path))?;
    info!(
        "Loaded manifest with {} declared translatable fields",
        manifest.field_specs().len()
    );

    // Reconcile
    let options = SyncOptions {
        policy: config.obsolete_policy,
    };
    let report = sync_translations(&db, &manifest, &options)?;

    if report.is_clean() {
        info!("Store is in sync with the manifest, nothing to do");
        return Ok(());
    }

    match report.policy {
        ObsoletePolicy::Delete => info!(
            "✓ Deleted {} records across {} obsolete fields",
            report.deleted_records,
            report.obsolete.len()
        ),
        ObsoletePolicy::Report => info!(
            "Found {} obsolete fields, left untouched (report policy)",
            report.obsolete.len()
        ),
    }

    Ok(())
}
