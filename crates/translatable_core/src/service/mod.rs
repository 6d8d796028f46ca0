//! Translation use-case services.
//!
//! # Responsibility
//! - Orchestrate staging, resolution, flushing and validation over the
//!   repository layer.
//! - Keep hosts decoupled from SQL details.

pub mod translation_service;
