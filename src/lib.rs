//! Persisted per-object field translations with schema reconciliation.
//!
//! The crate is split into a storage layer (`db`), the declared-field manifest
//! (`manifest`), the reconciler (`sync`), and the apply/store surface for
//! application objects (`translation`). Language metadata and translation
//! quality checks live under `i18n`.

pub mod config;
pub mod db;
pub mod i18n;
pub mod manifest;
pub mod sync;
pub mod translation;
