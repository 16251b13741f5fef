//! The manifest of declared translatable fields.
//!
//! The manifest is the source of truth the store is reconciled against: a JSON
//! document listing, per content type, which fields may carry translations.
//! It is read fresh on every reconciliation run and never persisted by this
//! crate.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for a loaded manifest.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Duplicate content type `{0}` in manifest")]
    DuplicateContentType(String),

    #[error("Duplicate field `{field}` on content type `{content_type}`")]
    DuplicateField { content_type: String, field: String },

    #[error("Empty content type name in manifest")]
    EmptyContentType,

    #[error("Empty field name on content type `{0}`")]
    EmptyField(String),
}

/// Translatable fields declared for a single content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub content_type: String,
    pub fields: Vec<String>,
}

/// The full set of declared translatable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub models: Vec<ModelSpec>,
}

impl Manifest {
    /// Load and validate a manifest from a JSON file.
    ///
    /// An empty manifest (`{"models": []}`) is valid and declares that no
    /// field is translatable.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read manifest at {}", path.display()))?;
        let manifest: Manifest =
            serde_json::from_str(&raw).context("Failed to parse manifest JSON")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check structural validity: no empty names, no duplicates.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen_types = HashSet::new();

        for model in &self.models {
            if model.content_type.is_empty() {
                return Err(ManifestError::EmptyContentType);
            }
            if !seen_types.insert(model.content_type.as_str()) {
                return Err(ManifestError::DuplicateContentType(
                    model.content_type.clone(),
                ));
            }

            let mut seen_fields = HashSet::new();
            for field in &model.fields {
                if field.is_empty() {
                    return Err(ManifestError::EmptyField(model.content_type.clone()));
                }
                if !seen_fields.insert(field.as_str()) {
                    return Err(ManifestError::DuplicateField {
                        content_type: model.content_type.clone(),
                        field: field.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The declared (content type, field) pairs as a set.
    pub fn field_specs(&self) -> HashSet<(String, String)> {
        self.models
            .iter()
            .flat_map(|model| {
                model
                    .fields
                    .iter()
                    .map(|field| (model.content_type.clone(), field.clone()))
            })
            .collect()
    }

    /// Whether a (content type, field) pair is declared translatable.
    pub fn declares(&self, content_type: &str, field: &str) -> bool {
        self.models
            .iter()
            .any(|model| model.content_type == content_type && model.fields.iter().any(|f| f == field))
    }
}
