use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use translations::config::Config;
use translations::db::Database;
use translations::i18n::LanguageRegistry;
use translations::manifest::Manifest;
use translations::sync::{sync_translations, ObsoletePolicy, SyncOptions};

/// Print store statistics and a reconciliation preview without touching the
/// store. The preview always runs under the report policy, whatever
/// OBSOLETE_POLICY says.
fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inspect_store=info".parse()?),
        )
        .init();

    info!("Inspecting translation store");

    let config = Config::from_env()?;
    let db = Database::new(&config.database_path)?;
    let manifest = Manifest::load(Path::new(&config.manifest_path))?;

    let options = SyncOptions {
        policy: ObsoletePolicy::Report,
    };
    let report = sync_translations(&db, &manifest, &options)?;

    let summary = json!({
        "database_path": config.database_path,
        "record_count": db.record_count()?,
        "enabled_languages": LanguageRegistry::get().codes(),
        "languages": db.language_counts()?,
        "content_types": db.content_type_counts()?,
        "declared_fields": manifest.field_specs().len(),
        "reconciliation": report,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
