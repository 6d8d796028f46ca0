//! Domain model for per-locale translation state.
//!
//! # Responsibility
//! - Define locale, schema-descriptor and translation-row structures.
//! - Keep the pending-edit buffer and resolution chain free of SQL.
//!
//! # Invariants
//! - Resolution only consults already-loaded rows; it never touches storage.

pub mod locale;
pub mod record;
pub mod schema;
pub mod translation;
