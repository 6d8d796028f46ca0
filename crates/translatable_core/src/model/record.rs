//! Translated record proxy: pending-edit buffer and locale resolution.
//!
//! # Responsibility
//! - Stage translatable writes in memory without touching storage.
//! - Resolve translatable reads through the locale fallback chain.
//!
//! # Invariants
//! - Pending edits win over any persisted row, regardless of locale.
//! - Fallback is per-row, not per-attribute: once a row is chosen, an
//!   explicitly NULL column does not continue the chain.
//! - `rows` is ordered most recent first.

use crate::model::locale::{Locale, LocaleContext};
use crate::model::translation::{FieldValue, RecordId, TranslationRow};
use std::collections::BTreeMap;

static NULL_VALUE: FieldValue = FieldValue::Null;

/// Per-instance proxy over one base record's translatable fields.
///
/// The pending buffer is instance-private and never persisted directly; the
/// service flushes it into a translation row after the host saves the base
/// record.
#[derive(Debug, Clone, Default)]
pub struct TranslatedRecord {
    id: Option<RecordId>,
    rows: Vec<TranslationRow>,
    pending: BTreeMap<String, FieldValue>,
}

impl TranslatedRecord {
    /// Proxy for a base record that is not persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(id: RecordId, rows: Vec<TranslationRow>) -> Self {
        Self {
            id: Some(id),
            rows,
            pending: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Associates the proxy with the id the host assigned at save time.
    pub fn bind_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Loaded translation rows, most recent first.
    pub fn rows(&self) -> &[TranslationRow] {
        &self.rows
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn pending(&self) -> &BTreeMap<String, FieldValue> {
        &self.pending
    }

    pub(crate) fn stage(&mut self, field: impl Into<String>, value: FieldValue) {
        self.pending.insert(field.into(), value);
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn replace_rows(&mut self, rows: Vec<TranslationRow>) {
        self.rows = rows;
    }

    /// Resolves one field: pending edit, then active-locale row, then
    /// default-locale row, then the first loaded row, then `None`.
    pub fn resolve(&self, field: &str, ctx: &LocaleContext) -> Option<&FieldValue> {
        if let Some(staged) = self.pending.get(field) {
            return Some(staged);
        }

        let row = self
            .rows
            .iter()
            .find(|row| row.locale == ctx.active)
            .or_else(|| self.rows.iter().find(|row| row.locale == ctx.default))
            .or_else(|| self.rows.first())?;
        Some(row.value(field).unwrap_or(&NULL_VALUE))
    }

    /// Locales with a persisted row, in creation order (oldest first).
    pub fn translated_locales(&self) -> Vec<Locale> {
        self.rows.iter().rev().map(|row| row.locale.clone()).collect()
    }
}
