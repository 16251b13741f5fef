//! Validated language representation.
//!
//! A `Language` can only be obtained through the registry, so holding one is
//! proof the code names a supported, enabled language. Write paths take
//! `Language`; raw strings stay at the edges.

use anyhow::{bail, Result};

use crate::i18n::{LanguageConfig, LanguageRegistry};

/// A language validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// Validate a language code against the registry.
    ///
    /// Fails for codes the registry does not know, and for known but
    /// disabled languages.
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("The language `{}` is not enabled", code),
            None => bail!("The language code `{}` is not supported", code),
        }
    }

    /// The canonical (source) language.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Registry metadata for this language.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("A constructed Language is always in the registry")
    }

    /// Whether this is the source language rather than a translation target.
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}
