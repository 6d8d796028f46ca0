//! Locale model and explicit resolution context.
//!
//! # Responsibility
//! - Validate and normalize the locale tags that key translation rows.
//! - Carry the active/default locale pair through every read, write and
//!   flush call instead of a process-wide variable.
//!
//! # Invariants
//! - A constructed `Locale` always holds a lowercase, well-formed tag.
//! - `LocaleContext` never exists without a default locale.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static LOCALE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{2,8})*$").expect("valid locale regex"));

/// Rejected locale tag, carrying the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLocale(String);

impl Display for InvalidLocale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid locale tag `{}`; expected `language[-subtag]*`",
            self.0
        )
    }
}

impl Error for InvalidLocale {}

/// Lowercase-normalized locale tag, e.g. `en` or `sv-se`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Validates and normalizes a locale tag.
    ///
    /// # Errors
    /// - Returns `InvalidLocale` when the tag does not match the
    ///   `language[-subtag]*` shape (primary 2-3 letters, subtags 2-8
    ///   alphanumerics).
    pub fn new(tag: &str) -> Result<Self, InvalidLocale> {
        let trimmed = tag.trim();
        if !LOCALE_TAG_RE.is_match(trimmed) {
            return Err(InvalidLocale(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = InvalidLocale;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

/// Explicit locale parameter threaded through every read/write/flush call.
///
/// The default locale is supplied by host configuration when the context is
/// constructed; there is no process-wide active-locale state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleContext {
    /// Locale consulted first during resolution and captured at flush time.
    pub active: Locale,
    /// Fallback locale when the active locale has no translation row.
    pub default: Locale,
}

impl LocaleContext {
    pub fn new(active: Locale, default: Locale) -> Self {
        Self { active, default }
    }

    /// Same default, different active locale.
    pub fn with_active(&self, active: Locale) -> Self {
        Self {
            active,
            default: self.default.clone(),
        }
    }
}
