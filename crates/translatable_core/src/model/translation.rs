//! Translation row model.
//!
//! # Responsibility
//! - Define the persisted shape of one locale's field values.
//! - Convert field values to SQLite binding values.
//!
//! # Invariants
//! - `values` maps every declared field to a value; a NULL column is stored
//!   as `FieldValue::Null`, never omitted.
//! - Timestamps are epoch milliseconds.

use crate::model::locale::Locale;
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Primary key of a base record in the host's base table.
pub type RecordId = i64;

/// Primary key of one translation row.
pub type TranslationRowId = i64;

/// One translatable field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Null | Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Null | Self::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Text(text) => Value::Text(text.clone()),
            FieldValue::Integer(number) => Value::Integer(*number),
        }
    }
}

/// One locale's rendering of the translatable fields for one base record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub id: TranslationRowId,
    pub record_id: RecordId,
    pub locale: Locale,
    pub values: BTreeMap<String, FieldValue>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TranslationRow {
    /// Value of one field on this row, `None` when the field is undeclared.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }
}
