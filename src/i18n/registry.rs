//! Language registry: the configured set of supported languages.
//!
//! The registry plays the role an application settings file would: any
//! language code not listed here (or listed but disabled) is rejected on the
//! write path. Initialized once behind `OnceLock` and immutable afterwards.

use std::sync::OnceLock;

/// Metadata for one supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "de")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language
    pub native_name: &'static str,

    /// Whether this is the canonical/source language (exactly one is)
    pub is_canonical: bool,

    /// Whether translations may be written in this language
    pub enabled: bool,
}

/// Registry of all supported languages.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Look up a language by code, enabled or not.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages translations may currently be written in.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Codes of all enabled languages.
    pub fn codes(&self) -> Vec<&'static str> {
        self.languages
            .iter()
            .filter(|lang| lang.enabled)
            .map(|lang| lang.code)
            .collect()
    }

    /// The canonical (source) language.
    ///
    /// # Panics
    /// Panics if the compiled-in table does not contain exactly one canonical
    /// language; that is a programming error, not a runtime condition.
    pub fn canonical(&self) -> &LanguageConfig {
        let mut canonical = self.languages.iter().filter(|lang| lang.is_canonical);
        let first = canonical.next().expect("No canonical language in registry");
        assert!(
            canonical.next().is_none(),
            "Multiple canonical languages in registry"
        );
        first
    }

    /// Whether a code names a supported, enabled language.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code).map(|lang| lang.enabled).unwrap_or(false)
    }
}

/// The supported language table.
///
/// English is the canonical language objects are authored in; the others are
/// translation targets. Portuguese is wired up but not yet enabled for
/// writes.
fn supported_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            is_canonical: false,
            enabled: false,
        },
    ]
}
