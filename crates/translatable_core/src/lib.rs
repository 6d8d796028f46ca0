//! Per-locale field translation over SQLite.
//! This crate is the single source of truth for translation-row invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::locale::{InvalidLocale, Locale, LocaleContext};
pub use model::record::TranslatedRecord;
pub use model::schema::{FieldDescriptor, FieldKind, SchemaError, TranslationSchema};
pub use model::translation::{FieldValue, RecordId, TranslationRow, TranslationRowId};
pub use repo::translation_repo::{
    RepoError, RepoResult, SqliteTranslationRepository, TranslationRepository, UniquenessProbe,
};
pub use service::translation_service::{ServiceError, TranslationService};
pub use validate::uniqueness::{UniquenessCheck, ValidationErrors};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
