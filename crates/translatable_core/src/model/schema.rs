//! Translation schema descriptor.
//!
//! # Responsibility
//! - Declare the translatable fields and table naming explicitly, replacing
//!   the original runtime column discovery.
//! - Reject identifiers that would collide with bookkeeping columns.
//!
//! # Invariants
//! - A validated descriptor contains only safe lowercase SQL identifiers.
//! - Storage columns are unique across fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid identifier regex"));
// Same exclusion set the translation table reserves for bookkeeping columns:
// the primary key, the locale discriminator, foreign keys and timestamps.
static RESERVED_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^id$|^locale$|_id$|_at$").expect("valid reserved-name regex"));

/// Descriptor validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidIdentifier {
        what: &'static str,
        value: String,
    },
    /// Field name collides with a bookkeeping column pattern.
    ReservedFieldName(String),
    DuplicateColumn(String),
    NoFields,
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { what, value } => {
                write!(f, "invalid {what} identifier `{value}`")
            }
            Self::ReservedFieldName(name) => write!(
                f,
                "field name `{name}` matches a reserved column pattern (id, locale, *_id, *_at)"
            ),
            Self::DuplicateColumn(column) => {
                write!(f, "duplicate translation column `{column}`")
            }
            Self::NoFields => write!(f, "schema declares no translatable fields"),
        }
    }
}

impl Error for SchemaError {}

/// Declared kind of one translatable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text; participates in case-insensitive uniqueness comparison.
    Text,
    /// Plain integer value.
    Integer,
    /// Foreign id to another table, stored in a `<name>_id` column.
    Reference,
}

/// One translatable field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Column backing this field in the translation table.
    pub fn storage_column(&self) -> String {
        match self.kind {
            FieldKind::Reference => format!("{}_id", self.name),
            FieldKind::Text | FieldKind::Integer => self.name.clone(),
        }
    }
}

/// Explicit schema descriptor for one translatable model.
///
/// Table naming follows the host convention the original relied on: the
/// translation table is `<model>_translations` and its owner foreign key is
/// `<model>_id`. Deserialized descriptors must still pass `validate` before
/// binding; `SqliteTranslationRepository::try_new` enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSchema {
    /// Singular model name, e.g. `post`.
    pub model: String,
    /// Base table owning the records, e.g. `posts`.
    pub base_table: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TranslationSchema {
    /// Builds and validates a descriptor.
    pub fn new(
        model: impl Into<String>,
        base_table: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let schema = Self {
            model: model.into(),
            base_table: base_table.into(),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Checks identifier safety, reserved names and column uniqueness.
    pub fn validate(&self) -> Result<(), SchemaError> {
        check_ident("model", &self.model)?;
        check_ident("base table", &self.base_table)?;
        if self.fields.is_empty() {
            return Err(SchemaError::NoFields);
        }

        let mut columns = BTreeSet::new();
        for field in &self.fields {
            check_ident("field", &field.name)?;
            if RESERVED_FIELD_RE.is_match(&field.name) {
                return Err(SchemaError::ReservedFieldName(field.name.clone()));
            }
            let column = field.storage_column();
            if !columns.insert(column.clone()) {
                return Err(SchemaError::DuplicateColumn(column));
            }
        }
        Ok(())
    }

    /// Translation table name derived from the model name.
    pub fn translation_table(&self) -> String {
        format!("{}_translations", self.model)
    }

    /// Owner foreign-key column in the translation table.
    pub fn foreign_key(&self) -> String {
        format!("{}_id", self.model)
    }

    /// Looks up one field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

fn check_ident(what: &'static str, value: &str) -> Result<(), SchemaError> {
    if IDENT_RE.is_match(value) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            what,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldDescriptor, FieldKind, SchemaError, TranslationSchema};

    fn text_field(name: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Text,
        }
    }

    #[test]
    fn derives_table_and_foreign_key_names() {
        let schema =
            TranslationSchema::new("post", "posts", vec![text_field("title")]).expect("schema");
        assert_eq!(schema.translation_table(), "post_translations");
        assert_eq!(schema.foreign_key(), "post_id");
    }

    #[test]
    fn reference_fields_store_in_id_suffixed_columns() {
        let field = FieldDescriptor {
            name: "author".to_string(),
            kind: FieldKind::Reference,
        };
        assert_eq!(field.storage_column(), "author_id");
    }

    #[test]
    fn rejects_reserved_field_names() {
        for name in ["id", "locale", "author_id", "created_at"] {
            let result = TranslationSchema::new("post", "posts", vec![text_field(name)]);
            assert!(
                matches!(result, Err(SchemaError::ReservedFieldName(_))),
                "field `{name}` should be reserved"
            );
        }
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        let result = TranslationSchema::new("post\"; --", "posts", vec![text_field("title")]);
        assert!(matches!(
            result,
            Err(SchemaError::InvalidIdentifier { what: "model", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_columns_and_empty_field_sets() {
        let duplicated = TranslationSchema::new(
            "post",
            "posts",
            vec![text_field("title"), text_field("title")],
        );
        assert!(matches!(duplicated, Err(SchemaError::DuplicateColumn(_))));
        assert!(matches!(
            TranslationSchema::new("post", "posts", vec![]),
            Err(SchemaError::NoFields)
        ));
    }

    #[test]
    fn deserializes_from_config_json() {
        let schema: TranslationSchema = serde_json::from_str(
            r#"{
                "model": "post",
                "base_table": "posts",
                "fields": [
                    {"name": "title", "kind": "text"},
                    {"name": "author", "kind": "reference"}
                ]
            }"#,
        )
        .expect("schema json");
        schema.validate().expect("deserialized schema is valid");
        assert_eq!(schema.fields.len(), 2);
    }
}
