//! Internationalization (i18n) support for the translation store.
//!
//! - `registry`: single source of truth for the supported languages
//! - `language`: validated Language type constructed through the registry
//! - `validator`: quality checks on stored translation text
//!
//! The reconciler deliberately does not use this module: language validity is
//! not an invariant of reconciliation. Validation happens on the write path.

mod language;
mod registry;
mod validator;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
