//! Translation repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Bind a schema descriptor to the host's tables (readiness checks).
//! - Persist and query per-locale translation rows.
//! - Execute uniqueness probes for the validation layer.
//!
//! # Invariants
//! - `try_new` must succeed before any query runs; the repository never
//!   creates schema on the host's behalf.
//! - `upsert_for_locale` writes at most one row per (record, locale).
//! - Rows load most recent first; locale listings load oldest first.

use crate::db::DbError;
use crate::model::locale::Locale;
use crate::model::schema::{FieldKind, SchemaError, TranslationSchema};
use crate::model::translation::{FieldValue, RecordId, TranslationRow, TranslationRowId};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for translation persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Schema(SchemaError),
    Db(DbError),
    MissingRequiredTable(String),
    MissingRequiredColumn { table: String, column: String },
    UnknownField(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{column}` missing from table `{table}`")
            }
            Self::UnknownField(field) => write!(f, "unknown translatable field `{field}`"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted translation data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::UnknownField(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query descriptor for a single uniqueness probe.
///
/// `scope` is an unordered set of ANDed equality constraints against the
/// probed table; `BTreeMap` keeps the generated SQL deterministic without
/// giving the order any meaning.
#[derive(Debug, Clone)]
pub struct UniquenessProbe {
    pub table: String,
    pub column: String,
    pub value: FieldValue,
    /// Compare text through `LOWER()` on both sides.
    pub case_insensitive: bool,
    pub scope: BTreeMap<String, FieldValue>,
    /// Excludes one row, as `(column, id)`; `None` for new records.
    pub exclude: Option<(String, RecordId)>,
    /// Restricts the probe to one locale's rows.
    pub locale: Option<Locale>,
}

/// Repository interface for translation row operations.
pub trait TranslationRepository {
    /// The bound schema descriptor.
    fn schema(&self) -> &TranslationSchema;
    /// All rows for one record, most recent first.
    fn load_rows(&self, record_id: RecordId) -> RepoResult<Vec<TranslationRow>>;
    /// Find-or-initialize by locale, merging `edits` over the existing row.
    fn upsert_for_locale(
        &self,
        record_id: RecordId,
        locale: &Locale,
        edits: &BTreeMap<String, FieldValue>,
    ) -> RepoResult<TranslationRow>;
    /// Bulk-deletes every row owned by the record; returns the count.
    fn delete_all_for(&self, record_id: RecordId) -> RepoResult<usize>;
    /// Ids of base records with no row for `locale`.
    fn missing_translations(&self, locale: &Locale) -> RepoResult<Vec<RecordId>>;
    /// Persisted locales for one record, oldest first.
    fn locales_for(&self, record_id: RecordId) -> RepoResult<Vec<Locale>>;
    /// Whether any row satisfies the probe.
    fn value_taken(&self, probe: &UniquenessProbe) -> RepoResult<bool>;
}

/// SQLite-backed translation repository bound to one schema descriptor.
pub struct SqliteTranslationRepository<'conn> {
    conn: &'conn Connection,
    schema: TranslationSchema,
}

impl<'conn> SqliteTranslationRepository<'conn> {
    /// Binds the descriptor to the host database.
    ///
    /// Verifies that the base table (with `id`) and the translation table
    /// (owner foreign key, `locale`, one storage column per declared field,
    /// timestamps) exist. Fails with `MissingRequiredTable` /
    /// `MissingRequiredColumn` otherwise; never creates schema.
    pub fn try_new(conn: &'conn Connection, schema: TranslationSchema) -> RepoResult<Self> {
        schema.validate()?;
        ensure_schema_bound(conn, &schema)?;
        debug!(
            "event=schema_bind module=repo status=ok model={} table={}",
            schema.model,
            schema.translation_table()
        );
        Ok(Self { conn, schema })
    }

    fn select_sql(&self) -> String {
        let mut columns = vec![
            quote_ident("id"),
            quote_ident(&self.schema.foreign_key()),
            quote_ident("locale"),
            quote_ident("created_at"),
            quote_ident("updated_at"),
        ];
        columns.extend(
            self.schema
                .fields
                .iter()
                .map(|field| quote_ident(&field.storage_column())),
        );
        format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            quote_ident(&self.schema.translation_table())
        )
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<TranslationRow> {
        let table = self.schema.translation_table();
        let locale_text: String = row.get("locale")?;
        let locale = Locale::new(&locale_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid locale `{locale_text}` in {table}.locale"))
        })?;

        let mut values = BTreeMap::new();
        for field in &self.schema.fields {
            let column = field.storage_column();
            let value = match field.kind {
                FieldKind::Text => row
                    .get::<_, Option<String>>(column.as_str())?
                    .map_or(FieldValue::Null, FieldValue::Text),
                FieldKind::Integer | FieldKind::Reference => row
                    .get::<_, Option<i64>>(column.as_str())?
                    .map_or(FieldValue::Null, FieldValue::Integer),
            };
            values.insert(field.name.clone(), value);
        }

        Ok(TranslationRow {
            id: row.get("id")?,
            record_id: row.get(self.schema.foreign_key().as_str())?,
            locale,
            values,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn read_row(&self, id: TranslationRowId) -> RepoResult<TranslationRow> {
        let sql = format!("{} WHERE {} = ?1;", self.select_sql(), quote_ident("id"));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return self.parse_row(row);
        }
        Err(RepoError::InvalidData(format!(
            "translation row {id} missing after write"
        )))
    }

    fn storage_column_for(&self, field: &str) -> RepoResult<String> {
        self.schema
            .field(field)
            .map(|descriptor| descriptor.storage_column())
            .ok_or_else(|| RepoError::UnknownField(field.to_string()))
    }
}

impl TranslationRepository for SqliteTranslationRepository<'_> {
    fn schema(&self) -> &TranslationSchema {
        &self.schema
    }

    fn load_rows(&self, record_id: RecordId) -> RepoResult<Vec<TranslationRow>> {
        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY {} DESC, {} DESC;",
            self.select_sql(),
            quote_ident(&self.schema.foreign_key()),
            quote_ident("created_at"),
            quote_ident("id")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![record_id])?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            loaded.push(self.parse_row(row)?);
        }
        Ok(loaded)
    }

    fn upsert_for_locale(
        &self,
        record_id: RecordId,
        locale: &Locale,
        edits: &BTreeMap<String, FieldValue>,
    ) -> RepoResult<TranslationRow> {
        let table = quote_ident(&self.schema.translation_table());
        let foreign_key = quote_ident(&self.schema.foreign_key());

        let existing: Option<TranslationRowId> = self
            .conn
            .query_row(
                &format!("SELECT \"id\" FROM {table} WHERE {foreign_key} = ?1 AND \"locale\" = ?2;"),
                params![record_id, locale.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let row_id = match existing {
            Some(id) => {
                if !edits.is_empty() {
                    let mut assignments = Vec::new();
                    let mut binds: Vec<Value> = Vec::new();
                    for (field, value) in edits {
                        let column = self.storage_column_for(field)?;
                        assignments.push(format!("{} = ?", quote_ident(&column)));
                        binds.push(value.into());
                    }
                    let sql = format!(
                        "UPDATE {table}
                         SET {}, \"updated_at\" = (strftime('%s', 'now') * 1000)
                         WHERE \"id\" = ?;",
                        assignments.join(", ")
                    );
                    binds.push(Value::Integer(id));
                    self.conn.execute(&sql, params_from_iter(binds))?;
                }
                id
            }
            None => {
                let mut columns = vec![foreign_key.clone(), quote_ident("locale")];
                let mut binds: Vec<Value> = vec![
                    Value::Integer(record_id),
                    Value::Text(locale.as_str().to_string()),
                ];
                for (field, value) in edits {
                    let column = self.storage_column_for(field)?;
                    columns.push(quote_ident(&column));
                    binds.push(value.into());
                }
                let placeholders = vec!["?"; binds.len()].join(", ");
                let sql = format!(
                    "INSERT INTO {table} ({}, \"created_at\", \"updated_at\")
                     VALUES ({placeholders},
                             (strftime('%s', 'now') * 1000),
                             (strftime('%s', 'now') * 1000));",
                    columns.join(", ")
                );
                self.conn.execute(&sql, params_from_iter(binds))?;
                self.conn.last_insert_rowid()
            }
        };

        debug!(
            "event=translation_upsert module=repo status=ok record_id={record_id} locale={} fields={}",
            locale,
            edits.len()
        );
        self.read_row(row_id)
    }

    fn delete_all_for(&self, record_id: RecordId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1;",
                quote_ident(&self.schema.translation_table()),
                quote_ident(&self.schema.foreign_key())
            ),
            params![record_id],
        )?;
        Ok(changed)
    }

    fn missing_translations(&self, locale: &Locale) -> RepoResult<Vec<RecordId>> {
        let sql = format!(
            "SELECT \"id\" FROM {}
             WHERE \"id\" NOT IN (
                SELECT {} FROM {} WHERE \"locale\" = ?1
             )
             ORDER BY \"id\" ASC;",
            quote_ident(&self.schema.base_table),
            quote_ident(&self.schema.foreign_key()),
            quote_ident(&self.schema.translation_table())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![locale.as_str()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn locales_for(&self, record_id: RecordId) -> RepoResult<Vec<Locale>> {
        let sql = format!(
            "SELECT \"locale\" FROM {} WHERE {} = ?1 ORDER BY \"created_at\" ASC, \"id\" ASC;",
            quote_ident(&self.schema.translation_table()),
            quote_ident(&self.schema.foreign_key())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![record_id])?;
        let mut locales = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            let locale = Locale::new(&text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid locale `{text}` in {}.locale",
                    self.schema.translation_table()
                ))
            })?;
            locales.push(locale);
        }
        Ok(locales)
    }

    fn value_taken(&self, probe: &UniquenessProbe) -> RepoResult<bool> {
        let mut conditions = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        push_equality(
            &mut conditions,
            &mut binds,
            &probe.column,
            &probe.value,
            probe.case_insensitive,
        );
        for (column, value) in &probe.scope {
            push_equality(&mut conditions, &mut binds, column, value, false);
        }
        if let Some((column, id)) = &probe.exclude {
            conditions.push(format!("{} <> ?", quote_ident(column)));
            binds.push(Value::Integer(*id));
        }
        if let Some(locale) = &probe.locale {
            conditions.push(format!("{} = ?", quote_ident("locale")));
            binds.push(Value::Text(locale.as_str().to_string()));
        }

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {});",
            quote_ident(&probe.table),
            conditions.join(" AND ")
        );
        let taken: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(taken == 1)
    }
}

/// Adds `column <op> ?` to the condition list with the value's comparison
/// semantics: `IS` for NULL, lowercased equality for case-insensitive text,
/// plain equality otherwise.
fn push_equality(
    conditions: &mut Vec<String>,
    binds: &mut Vec<Value>,
    column: &str,
    value: &FieldValue,
    case_insensitive: bool,
) {
    let ident = quote_ident(column);
    match value {
        FieldValue::Null => {
            conditions.push(format!("{ident} IS ?"));
            binds.push(Value::Null);
        }
        FieldValue::Text(text) if case_insensitive => {
            conditions.push(format!("LOWER({ident}) = ?"));
            binds.push(Value::Text(text.to_lowercase()));
        }
        FieldValue::Text(text) => {
            conditions.push(format!("{ident} = ?"));
            binds.push(Value::Text(text.clone()));
        }
        FieldValue::Integer(number) => {
            conditions.push(format!("{ident} = ?"));
            binds.push(Value::Integer(*number));
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn ensure_schema_bound(conn: &Connection, schema: &TranslationSchema) -> RepoResult<()> {
    let translation_table = schema.translation_table();
    for table in [schema.base_table.as_str(), translation_table.as_str()] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table.to_string()));
        }
    }

    if !table_has_column(conn, &schema.base_table, "id")? {
        return Err(RepoError::MissingRequiredColumn {
            table: schema.base_table.clone(),
            column: "id".to_string(),
        });
    }

    let mut required = vec![
        schema.foreign_key(),
        "locale".to_string(),
        "created_at".to_string(),
        "updated_at".to_string(),
    ];
    required.extend(schema.fields.iter().map(|field| field.storage_column()));
    for column in required {
        if !table_has_column(conn, &translation_table, &column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: translation_table.clone(),
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", quote_ident(table)))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
