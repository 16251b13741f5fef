//! Reconciliation of the translation store against the declared field set.
//!
//! A record is obsolete when its (content type, field) pair no longer appears
//! in the manifest, typically because the field was renamed or removed.
//! Reconciliation partitions the persisted pair universe against the manifest
//! and, depending on policy, prunes the obsolete side. Re-running with an
//! unchanged store and manifest deletes nothing.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::manifest::Manifest;

/// What to do with obsolete translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObsoletePolicy {
    /// Remove obsolete records from the store
    Delete,

    /// Detect and report obsolete records, delete nothing
    Report,
}

impl ObsoletePolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(ObsoletePolicy::Delete),
            "report" => Ok(ObsoletePolicy::Report),
            other => bail!("Unknown obsolete policy `{}` (expected `delete` or `report`)", other),
        }
    }
}

/// Options for one reconciliation run.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub policy: ObsoletePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            policy: ObsoletePolicy::Delete,
        }
    }
}

/// A persisted (content type, field) pair with no manifest counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct ObsoletePair {
    pub content_type: String,
    pub field: String,

    /// Records carrying this pair, across all objects and languages
    pub records: usize,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub policy: ObsoletePolicy,

    /// Distinct pairs found in the store
    pub examined_pairs: usize,

    /// Pairs backed by the manifest
    pub valid_pairs: usize,

    /// Pairs the manifest no longer declares
    pub obsolete: Vec<ObsoletePair>,

    /// Records actually removed (always 0 under `Report`)
    pub deleted_records: usize,
}

impl SyncReport {
    /// Whether the store already matched the manifest.
    pub fn is_clean(&self) -> bool {
        self.obsolete.is_empty()
    }
}

/// Reconcile the store against the manifest.
///
/// Partitions the store's distinct (content type, field) pairs into those the
/// manifest declares and those it does not. Under `ObsoletePolicy::Delete`
/// every record of every obsolete pair is removed in a single transaction;
/// under `Report` the store is left untouched. Errors reading either side
/// propagate to the caller and abort the run.
pub fn sync_translations(
    db: &Database,
    manifest: &Manifest,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let declared = manifest.field_specs();
    let persisted = db.distinct_field_pairs()?;
    let examined_pairs = persisted.len();

    let mut valid_pairs = 0usize;
    let mut obsolete = Vec::new();

    for (content_type, field) in persisted {
        if declared.contains(&(content_type.clone(), field.clone())) {
            valid_pairs += 1;
        } else {
            let records = db.count_for_pair(&content_type, &field)?;
            warn!(
                "Obsolete translations: {}.{} ({} records, not in manifest)",
                content_type, field, records
            );
            obsolete.push(ObsoletePair {
                content_type,
                field,
                records,
            });
        }
    }

    let deleted_records = match options.policy {
        ObsoletePolicy::Delete if !obsolete.is_empty() => {
            let pairs: Vec<(String, String)> = obsolete
                .iter()
                .map(|pair| (pair.content_type.clone(), pair.field.clone()))
                .collect();
            db.delete_field_pairs(&pairs)?
        }
        _ => 0,
    };

    info!(
        "Reconciliation finished: {} pairs examined, {} valid, {} obsolete, {} records deleted",
        examined_pairs,
        valid_pairs,
        obsolete.len(),
        deleted_records
    );

    Ok(SyncReport {
        policy: options.policy,
        examined_pairs,
        valid_pairs,
        obsolete,
        deleted_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ModelSpec;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_sync.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    fn manifest_with(models: Vec<(&str, Vec<&str>)>) -> Manifest {
        Manifest {
            models: models
                .into_iter()
                .map(|(content_type, fields)| ModelSpec {
                    content_type: content_type.to_string(),
                    fields: fields.into_iter().map(String::from).collect(),
                })
                .collect(),
        }
    }

    fn delete_options() -> SyncOptions {
        SyncOptions {
            policy: ObsoletePolicy::Delete,
        }
    }

    // ==================== Partition Tests ====================

    #[test]
    fn test_prunes_field_removed_from_manifest() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "obj1", "title", "en", "Hello")
            .expect("upsert");
        db.upsert_translation("article", "obj1", "body", "en", "Old")
            .expect("upsert");

        let manifest = manifest_with(vec![("article", vec!["title"])]);
        let report =
            sync_translations(&db, &manifest, &delete_options()).expect("Should reconcile");

        assert_eq!(report.examined_pairs, 2);
        assert_eq!(report.valid_pairs, 1);
        assert_eq!(report.obsolete.len(), 1);
        assert_eq!(report.obsolete[0].field, "body");
        assert_eq!(report.deleted_records, 1);

        // Only the title record survives
        assert!(db
            .get_translation("article", "obj1", "title", "en")
            .expect("query")
            .is_some());
        assert!(db
            .get_translation("article", "obj1", "body", "en")
            .expect("query")
            .is_none());
    }

    #[test]
    fn test_empty_manifest_deletes_everything() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "title", "de", "Hallo")
            .expect("upsert");
        db.upsert_translation("place", "1", "name", "es", "Berlín")
            .expect("upsert");

        let report = sync_translations(&db, &Manifest::default(), &delete_options())
            .expect("Should reconcile");

        assert_eq!(report.valid_pairs, 0);
        assert_eq!(report.deleted_records, 2);
        assert_eq!(db.record_count().expect("count"), 0);
    }

    #[test]
    fn test_matching_manifest_is_noop() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "title", "de", "Hallo")
            .expect("upsert");
        db.upsert_translation("article", "2", "body", "es", "Texto")
            .expect("upsert");

        let manifest = manifest_with(vec![("article", vec!["title", "body"])]);
        let report =
            sync_translations(&db, &manifest, &delete_options()).expect("Should reconcile");

        assert!(report.is_clean());
        assert_eq!(report.deleted_records, 0);
        assert_eq!(db.record_count().expect("count"), 2);
    }

    #[test]
    fn test_empty_store_is_clean() {
        let (db, _temp_dir) = create_test_db();
        let manifest = manifest_with(vec![("article", vec!["title"])]);

        let report =
            sync_translations(&db, &manifest, &delete_options()).expect("Should reconcile");

        assert_eq!(report.examined_pairs, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_same_field_name_on_other_content_type_is_obsolete() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "title", "de", "Hallo")
            .expect("upsert");
        db.upsert_translation("place", "1", "title", "de", "Titel")
            .expect("upsert");

        // Only article.title is declared; place.title must not ride along
        let manifest = manifest_with(vec![("article", vec!["title"])]);
        let report =
            sync_translations(&db, &manifest, &delete_options()).expect("Should reconcile");

        assert_eq!(report.obsolete.len(), 1);
        assert_eq!(report.obsolete[0].content_type, "place");
        assert!(db
            .get_translation("article", "1", "title", "de")
            .expect("query")
            .is_some());
    }

    #[test]
    fn test_obsolete_pair_prunes_all_languages_and_objects() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "summary", "de", "Alt")
            .expect("upsert");
        db.upsert_translation("article", "1", "summary", "es", "Viejo")
            .expect("upsert");
        db.upsert_translation("article", "2", "summary", "de", "Anders")
            .expect("upsert");
        db.upsert_translation("article", "1", "title", "de", "Hallo")
            .expect("upsert");

        let manifest = manifest_with(vec![("article", vec!["title"])]);
        let report =
            sync_translations(&db, &manifest, &delete_options()).expect("Should reconcile");

        assert_eq!(report.obsolete[0].records, 3);
        assert_eq!(report.deleted_records, 3);
        assert_eq!(db.record_count().expect("count"), 1);
    }

    // ==================== Idempotence Tests ====================

    #[test]
    fn test_reconciliation_is_idempotent() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "title", "de", "Hallo")
            .expect("upsert");
        db.upsert_translation("article", "1", "old", "de", "Alt")
            .expect("upsert");

        let manifest = manifest_with(vec![("article", vec!["title"])]);

        let first =
            sync_translations(&db, &manifest, &delete_options()).expect("First run");
        assert_eq!(first.deleted_records, 1);

        let second =
            sync_translations(&db, &manifest, &delete_options()).expect("Second run");
        assert!(second.is_clean());
        assert_eq!(second.deleted_records, 0);
        assert_eq!(db.record_count().expect("count"), 1);
    }

    // ==================== Policy Tests ====================

    #[test]
    fn test_report_policy_deletes_nothing() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "old", "de", "Alt")
            .expect("upsert");

        let options = SyncOptions {
            policy: ObsoletePolicy::Report,
        };
        let report = sync_translations(&db, &Manifest::default(), &options)
            .expect("Should reconcile");

        assert_eq!(report.obsolete.len(), 1);
        assert_eq!(report.deleted_records, 0);
        assert_eq!(db.record_count().expect("count"), 1);
    }

    #[test]
    fn test_report_serializes() {
        let (db, _temp_dir) = create_test_db();
        db.upsert_translation("article", "1", "old", "de", "Alt")
            .expect("upsert");

        let report = sync_translations(&db, &Manifest::default(), &delete_options())
            .expect("Should reconcile");

        let json = serde_json::to_value(&report).expect("Should serialize");
        assert_eq!(json["policy"], "delete");
        assert_eq!(json["obsolete"][0]["content_type"], "article");
    }

    // ==================== Property Tests ====================

    proptest! {
        /// After a delete-mode run, every surviving pair is declared.
        #[test]
        fn prop_survivors_are_always_declared(
            declared_idx in prop::collection::hash_set((0usize..3, 0usize..4), 0..8),
            stored_idx in prop::collection::vec((0usize..3, 0usize..4, 0usize..3, 0usize..2), 0..12),
        ) {
            const TYPES: [&str; 3] = ["article", "place", "product"];
            const FIELDS: [&str; 4] = ["title", "body", "name", "summary"];
            const LANGS: [&str; 2] = ["de", "es"];

            let (db, _temp_dir) = create_test_db();
            for (t, f, obj, lang) in &stored_idx {
                db.upsert_translation(
                    TYPES[*t],
                    &format!("obj{}", obj),
                    FIELDS[*f],
                    LANGS[*lang],
                    "text",
                ).expect("upsert");
            }

            let manifest = Manifest {
                models: TYPES
                    .iter()
                    .map(|content_type| ModelSpec {
                        content_type: content_type.to_string(),
                        fields: declared_idx
                            .iter()
                            .filter(|(t, _)| TYPES[*t] == *content_type)
                            .map(|(_, f)| FIELDS[*f].to_string())
                            .collect(),
                    })
                    .filter(|model| !model.fields.is_empty())
                    .collect(),
            };

            sync_translations(&db, &manifest, &delete_options()).expect("reconcile");

            let declared: HashSet<(String, String)> = manifest.field_specs();
            for pair in db.distinct_field_pairs().expect("pairs") {
                prop_assert!(declared.contains(&pair));
            }

            // And a second run is a no-op
            let second = sync_translations(&db, &manifest, &delete_options()).expect("again");
            prop_assert_eq!(second.deleted_records, 0);
        }
    }
}
