//! Applying and storing object translations.
//!
//! Application types plug in through the `Translatable` trait: they declare
//! their content type and translatable fields, and expose get/set access to
//! field text by name. `translate_all` overlays stored translations onto a
//! batch of objects; `store_translations` snapshots a batch's field values
//! into the store.

use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

use crate::db::Database;
use crate::i18n::{Language, TranslationValidator};

/// An application type whose fields can carry translations.
pub trait Translatable {
    /// Stable content type identifier for the store (e.g., "article").
    fn content_type() -> &'static str;

    /// Field names that may be translated.
    fn translatable_fields() -> &'static [&'static str];

    /// Stable identifier of this object within its content type.
    fn object_id(&self) -> String;

    /// Current text of a field, `None` when the field is unset.
    fn field_text(&self, field: &str) -> Option<String>;

    /// Overwrite a field with translated text.
    fn set_field_text(&mut self, field: &str, text: &str);
}

/// Overlay stored translations onto a batch of objects.
///
/// Fetches the content type's records for the language in one query pass,
/// groups them by object id, and applies each record whose field the type
/// still declares. Records for undeclared fields or with empty text are
/// skipped, never an error.
pub fn translate_all<T: Translatable>(
    db: &Database,
    objects: &mut [T],
    language: Language,
) -> Result<()> {
    if objects.is_empty() {
        return Ok(());
    }

    let records = db.translations_for_type(T::content_type(), language.code())?;

    let mut by_object: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for record in records {
        by_object
            .entry(record.object_id)
            .or_default()
            .push((record.field, record.text));
    }

    let fields = T::translatable_fields();
    for object in objects.iter_mut() {
        let Some(entries) = by_object.get(&object.object_id()) else {
            continue;
        };
        for (field, text) in entries {
            if !text.is_empty() && fields.contains(&field.as_str()) {
                object.set_field_text(field, text);
            }
        }
    }

    Ok(())
}

/// Snapshot a batch of objects' translatable field values into the store.
///
/// Each object's non-empty field values become its translation records for
/// the language, replacing whatever the store held for that object and
/// language (atomic per object). Non-canonical writes are checked against the
/// stored canonical text when one exists; findings are logged and never block
/// the write. Returns the number of records stored.
pub fn store_translations<T: Translatable>(
    db: &Database,
    objects: &[T],
    language: Language,
) -> Result<usize> {
    let content_type = T::content_type();
    let mut stored = 0usize;

    for object in objects {
        let object_id = object.object_id();
        let mut entries = Vec::new();

        for field in T::translatable_fields() {
            let Some(text) = object.field_text(field) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }

            if !language.is_canonical() {
                validate_against_canonical(db, content_type, &object_id, field, &text)?;
            }
            entries.push((field.to_string(), text));
        }

        stored += db.replace_object_translations(content_type, &object_id, language.code(), &entries)?;
    }

    Ok(stored)
}

/// Run the quality validator against the stored canonical text, if any.
fn validate_against_canonical(
    db: &Database,
    content_type: &str,
    object_id: &str,
    field: &str,
    translated: &str,
) -> Result<()> {
    let canonical = Language::canonical();
    let Some(source) = db.get_translation(content_type, object_id, field, canonical.code())? else {
        return Ok(());
    };

    let report = TranslationValidator::validate(&source.text, translated);
    for error in &report.errors {
        warn!(
            "Translation quality error on {}.{} (object {}): {}",
            content_type, field, object_id, error
        );
    }
    for warning in &report.warnings {
        warn!(
            "Translation quality warning on {}.{} (object {}): {}",
            content_type, field, object_id, warning
        );
    }

    Ok(())
}
