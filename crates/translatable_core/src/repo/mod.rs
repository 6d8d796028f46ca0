//! Persistence layer for translation rows.
//!
//! # Responsibility
//! - Own every piece of SQL touching the translation and base tables.
//! - Bind schema descriptors to concrete host tables before use.
//!
//! # Invariants
//! - All generated SQL quotes identifiers; descriptors are validated first.
//! - Repositories refuse to operate on unbound or incomplete host schema.

pub mod translation_repo;
