//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `translatable_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!(
        "translatable_core version={}",
        translatable_core::core_version()
    );
}
