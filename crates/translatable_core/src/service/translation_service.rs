//! Translation use-case service: staging, resolution, flush-on-save.
//!
//! # Responsibility
//! - Validate staged writes against the schema descriptor.
//! - Flush pending edits into the active locale's translation row after the
//!   host saves the base record.
//! - Run scoped uniqueness validation for translated and base attributes.
//!
//! # Invariants
//! - The flush locale is the context's active locale at flush time, not at
//!   stage time.
//! - The pending buffer is cleared only after a successful flush; a failed
//!   flush propagates and leaves the buffer unflushed.
//! - Reads never create translation rows.

use crate::model::locale::{Locale, LocaleContext};
use crate::model::record::TranslatedRecord;
use crate::model::schema::{FieldKind, TranslationSchema};
use crate::model::translation::{FieldValue, RecordId};
use crate::repo::translation_repo::{
    RepoError, RepoResult, TranslationRepository, UniquenessProbe,
};
use crate::validate::uniqueness::{UniquenessCheck, ValidationErrors};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for translation use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Field is not declared in the schema descriptor.
    UnknownField(String),
    /// Staged value does not match the field's declared kind.
    IncompatibleValue { field: String, expected: FieldKind },
    /// The base record has no id yet; flush runs post-save only.
    UnsavedRecord,
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "unknown translatable field `{field}`"),
            Self::IncompatibleValue { field, expected } => {
                write!(f, "value for `{field}` does not match declared kind {expected:?}")
            }
            Self::UnsavedRecord => {
                write!(f, "record has no id; save the base record before flushing")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnknownField(_) | Self::IncompatibleValue { .. } | Self::UnsavedRecord => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case facade over a bound translation repository.
pub struct TranslationService<R: TranslationRepository> {
    repo: R,
}

impl<R: TranslationRepository> TranslationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn schema(&self) -> &TranslationSchema {
        self.repo.schema()
    }

    /// Proxy for a base record that is not persisted yet.
    pub fn new_record(&self) -> TranslatedRecord {
        TranslatedRecord::new()
    }

    /// Proxy for a persisted base record, with its rows loaded.
    pub fn attach(&self, record_id: RecordId) -> RepoResult<TranslatedRecord> {
        let rows = self.repo.load_rows(record_id)?;
        Ok(TranslatedRecord::with_rows(record_id, rows))
    }

    /// Stages one translatable write into the record's pending buffer.
    ///
    /// Never touches storage; the edit is grouped with others of the same
    /// save cycle and flushed under the locale active at flush time.
    pub fn stage(
        &self,
        record: &mut TranslatedRecord,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), ServiceError> {
        let value = value.into();
        let descriptor = self
            .repo
            .schema()
            .field(field)
            .ok_or_else(|| ServiceError::UnknownField(field.to_string()))?;
        let compatible = matches!(
            (descriptor.kind, &value),
            (_, FieldValue::Null)
                | (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Integer, FieldValue::Integer(_))
                | (FieldKind::Reference, FieldValue::Integer(_))
        );
        if !compatible {
            return Err(ServiceError::IncompatibleValue {
                field: field.to_string(),
                expected: descriptor.kind,
            });
        }
        record.stage(field, value);
        Ok(())
    }

    /// Reads one translatable field through the resolution chain:
    /// pending edit, active-locale row, default-locale row, first row.
    pub fn read<'rec>(
        &self,
        record: &'rec TranslatedRecord,
        field: &str,
        ctx: &LocaleContext,
    ) -> Result<Option<&'rec FieldValue>, ServiceError> {
        if self.repo.schema().field(field).is_none() {
            return Err(ServiceError::UnknownField(field.to_string()));
        }
        Ok(record.resolve(field, ctx))
    }

    /// Post-save hook: persists pending edits into the row for the locale
    /// active right now.
    ///
    /// No-op when the buffer is empty. On success the row set is reloaded
    /// and the buffer cleared; on failure the error propagates and the
    /// buffer must be considered unflushed.
    pub fn flush(
        &self,
        record: &mut TranslatedRecord,
        ctx: &LocaleContext,
    ) -> Result<(), ServiceError> {
        if !record.has_pending_changes() {
            return Ok(());
        }
        let record_id = record.id().ok_or(ServiceError::UnsavedRecord)?;

        self.repo
            .upsert_for_locale(record_id, &ctx.active, record.pending())?;
        let rows = self.repo.load_rows(record_id)?;
        record.replace_rows(rows);
        record.clear_pending();
        debug!(
            "event=translation_flush module=service status=ok record_id={record_id} locale={}",
            ctx.active
        );
        Ok(())
    }

    /// Locales with a persisted row for this record, oldest first.
    pub fn translated_locales(&self, record: &TranslatedRecord) -> Vec<Locale> {
        record.translated_locales()
    }

    /// Ids of base records lacking a translation row for `locale`.
    pub fn missing_translations(&self, locale: &Locale) -> RepoResult<Vec<RecordId>> {
        self.repo.missing_translations(locale)
    }

    /// Deletes every translation row owned by the record; returns the count.
    pub fn delete_translations(&self, record_id: RecordId) -> RepoResult<usize> {
        self.repo.delete_all_for(record_id)
    }

    /// Validates that the checked value is not already used by another
    /// record, accumulating a "taken" failure instead of raising.
    ///
    /// A translated attribute probes the translation table restricted to the
    /// active locale, so equal values may coexist across locales; any other
    /// attribute probes the base table. Persisted records exclude
    /// themselves; new records do not.
    pub fn validate_unique(
        &self,
        record: &TranslatedRecord,
        check: &UniquenessCheck,
        ctx: &LocaleContext,
        errors: &mut ValidationErrors,
    ) -> RepoResult<()> {
        let schema = self.repo.schema();
        let case_insensitive = !check.case_sensitive;

        let probe = match schema.field(&check.attribute) {
            Some(descriptor) => UniquenessProbe {
                table: schema.translation_table(),
                column: descriptor.storage_column(),
                value: check.value.clone(),
                case_insensitive,
                scope: check.scope.clone(),
                exclude: record.id().map(|id| (schema.foreign_key(), id)),
                locale: Some(ctx.active.clone()),
            },
            None => UniquenessProbe {
                table: schema.base_table.clone(),
                column: check.attribute.clone(),
                value: check.value.clone(),
                case_insensitive,
                scope: check.scope.clone(),
                exclude: record.id().map(|id| ("id".to_string(), id)),
                locale: None,
            },
        };

        if self.repo.value_taken(&probe)? {
            errors.add(&check.attribute, "has already been taken");
        }
        Ok(())
    }
}
