//! Stateless validation building blocks.
//!
//! # Responsibility
//! - Describe uniqueness constraints and accumulate per-attribute failures.
//!
//! # Invariants
//! - Validation reports through `ValidationErrors`; it never raises for a
//!   failed check, only for infrastructure errors.

pub mod uniqueness;
