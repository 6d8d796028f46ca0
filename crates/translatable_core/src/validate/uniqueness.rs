//! Scoped uniqueness validation inputs and error accumulation.
//!
//! # Responsibility
//! - Describe one uniqueness constraint for a translated or base attribute.
//! - Accumulate per-attribute validation failures so hosts check a
//!   predicate instead of catching errors.

use crate::model::translation::FieldValue;
use std::collections::BTreeMap;

/// Per-attribute validation error accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: &str, message: impl Into<String>) {
        self.errors
            .entry(attribute.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages accumulated for one attribute.
    pub fn on(&self, attribute: &str) -> &[String] {
        self.errors
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The validity predicate hosts check after running validations.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One uniqueness constraint to validate.
///
/// Text comparison is case-sensitive unless disabled. Scope conditions are
/// an unordered set of ANDed equality constraints on the probed table.
#[derive(Debug, Clone)]
pub struct UniquenessCheck {
    pub attribute: String,
    pub value: FieldValue,
    pub case_sensitive: bool,
    pub scope: BTreeMap<String, FieldValue>,
}

impl UniquenessCheck {
    pub fn new(attribute: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            case_sensitive: true,
            scope: BTreeMap::new(),
        }
    }

    /// Compares text through a lowercased path instead of exact equality.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Adds one scope equality constraint.
    pub fn scoped_by(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.scope.insert(column.into(), value.into());
        self
    }
}
