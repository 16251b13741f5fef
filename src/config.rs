use anyhow::{Context, Result};

use crate::sync::ObsoletePolicy;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,

    // Declared translatable fields
    pub manifest_path: String,

    // Reconciliation
    pub obsolete_policy: ObsoletePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Storage - SQLite database holding the translation records
            database_path: std::env::var("TRANSLATIONS_DB_PATH")
                .unwrap_or_else(|_| "data/translations.db".to_string()),

            // Manifest - JSON document declaring the translatable fields
            manifest_path: std::env::var("TRANSLATIONS_MANIFEST_PATH")
                .unwrap_or_else(|_| "data/translatable_fields.json".to_string()),

            // Reconciliation - what to do with obsolete records
            obsolete_policy: match std::env::var("OBSOLETE_POLICY") {
                Ok(value) => {
                    ObsoletePolicy::parse(&value).context("Invalid OBSOLETE_POLICY value")?
                }
                Err(_) => ObsoletePolicy::Delete,
            },
        })
    }
}
