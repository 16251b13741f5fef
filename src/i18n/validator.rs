//! Quality checks on stored translation text.
//!
//! A translation that drops a `{placeholder}` breaks rendering downstream, so
//! that is an error; a changed URL or an untranslated-looking text is only a
//! warning. The write path logs reports and never rejects a translation over
//! them.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Outcome of validating one translation against its source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that will break consumers of the translated text
    pub errors: Vec<String>,

    /// Suspicious but possibly intentional differences
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator comparing a translation to the source text it translates.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate that a translation preserves the mechanical parts of the
    /// source text: `{placeholder}` names and URLs.
    pub fn validate(source: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        if translated.trim().is_empty() && !source.trim().is_empty() {
            report
                .errors
                .push("Translation is empty for a non-empty source".to_string());
            return report;
        }

        let source_placeholders = Self::extract_placeholders(source);
        let translated_placeholders = Self::extract_placeholders(translated);
        if source_placeholders != translated_placeholders {
            report.errors.push(format!(
                "Placeholder mismatch: source has {:?}, translation has {:?}",
                source_placeholders, translated_placeholders
            ));
        }

        let source_urls = Self::extract_urls(source);
        let translated_urls = Self::extract_urls(translated);
        if source_urls != translated_urls {
            report.warnings.push(format!(
                "URL mismatch: source has {} URLs, translation has {}",
                source_urls.len(),
                translated_urls.len()
            ));
        }

        if !source.trim().is_empty() && source.trim() == translated.trim() {
            report
                .warnings
                .push("Translation is identical to the source text".to_string());
        }

        report
    }

    /// Extract `{name}` style placeholders as a set.
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{[A-Za-z0-9_]+\}").expect("valid regex"));
        regex.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }

    /// Extract URLs as a set.
    fn extract_urls(text: &str) -> BTreeSet<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://\S+").expect("valid regex"));
        regex.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }
}
