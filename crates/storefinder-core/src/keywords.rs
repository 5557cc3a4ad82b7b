//! Validation and normalization of user-supplied search keywords.
//!
//! Keywords must be 2 to 5 entries of Hangul, Latin letters, digits, spaces
//! and hyphens, each at most 100 characters. Internal whitespace runs are
//! collapsed and case-insensitive duplicates are folded together.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_KEYWORDS: usize = 2;
pub const MAX_KEYWORDS: usize = 5;
pub const MAX_KEYWORD_LENGTH: usize = 100;

/// Characters of an offending keyword echoed back in error messages.
const PREVIEW_CHARS: usize = 20;

static KEYWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9가-힣\s\-]+$").expect("valid keyword regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Reasons a keyword list is rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("at least {min} keywords are required")]
    TooFew { min: usize },

    #[error("at most {max} keywords are allowed")]
    TooMany { max: usize },

    #[error("keywords must be at most {max} characters (\"{preview}...\")")]
    TooLong { max: usize, preview: String },

    #[error(
        "keywords may only contain letters, digits, spaces and hyphens (\"{preview}...\")"
    )]
    InvalidCharacters { preview: String },

    #[error("at least {min} distinct keywords are required after removing duplicates")]
    TooFewAfterDedup { min: usize },
}

/// Trims a keyword and collapses internal whitespace runs to one space.
#[must_use]
pub fn normalize_keyword(keyword: &str) -> String {
    WHITESPACE_RUN.replace_all(keyword.trim(), " ").into_owned()
}

fn preview(keyword: &str) -> String {
    keyword.chars().take(PREVIEW_CHARS).collect()
}

fn check_keyword(keyword: &str) -> Result<(), KeywordError> {
    if keyword.chars().count() > MAX_KEYWORD_LENGTH {
        return Err(KeywordError::TooLong {
            max: MAX_KEYWORD_LENGTH,
            preview: preview(keyword),
        });
    }
    if !KEYWORD_PATTERN.is_match(keyword) {
        return Err(KeywordError::InvalidCharacters {
            preview: preview(keyword),
        });
    }
    Ok(())
}

/// Validates and normalizes a raw keyword list.
///
/// Empty entries are dropped after normalization. Case-insensitive duplicates
/// keep the position of their first occurrence and the spelling of their last.
///
/// # Errors
///
/// Returns the first [`KeywordError`] encountered, checking count, then each
/// keyword's length and characters, then the count after deduplication.
pub fn validate_keywords<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, KeywordError> {
    let normalized: Vec<String> = raw
        .iter()
        .map(|k| normalize_keyword(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();

    if normalized.len() < MIN_KEYWORDS {
        return Err(KeywordError::TooFew { min: MIN_KEYWORDS });
    }
    if normalized.len() > MAX_KEYWORDS {
        return Err(KeywordError::TooMany { max: MAX_KEYWORDS });
    }
    for keyword in &normalized {
        check_keyword(keyword)?;
    }

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<String> = Vec::with_capacity(normalized.len());
    for keyword in normalized {
        let folded = keyword.to_lowercase();
        if let Some(&idx) = slots.get(&folded) {
            unique[idx] = keyword;
        } else {
            slots.insert(folded, unique.len());
            unique.push(keyword);
        }
    }

    if unique.len() < MIN_KEYWORDS {
        return Err(KeywordError::TooFewAfterDedup { min: MIN_KEYWORDS });
    }
    Ok(unique)
}

/// Checks one keyword while it is still being typed.
///
/// An empty keyword is acceptable here; only length and characters are checked.
#[must_use]
pub fn validate_single_keyword(keyword: &str) -> Option<KeywordError> {
    let normalized = normalize_keyword(keyword);
    if normalized.is_empty() {
        return None;
    }
    check_keyword(&normalized).err()
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
