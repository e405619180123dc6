//! Citation key regeneration
//!
//! Keys take the form `<surname>-<year>-<word>`: the first author's
//! surname, the year, and the first significant title word, each lowercased,
//! folded to ASCII and stripped of anything that is not a letter or digit.
//! Colliding keys get `-2`, `-3`, ... in batch order.

use std::collections::HashSet;
use std::fmt;

use bibtidy_bibtex::BibTeXEntry;
use unicode_normalization::UnicodeNormalization;

use crate::config::KeyConfig;

/// A key component that could not be derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart {
    Author,
    Year,
    Title,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Author => write!(f, "author"),
            KeyPart::Year => write!(f, "year"),
            KeyPart::Title => write!(f, "title"),
        }
    }
}

/// An entry whose key was left unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKey {
    pub cite_key: String,
    pub missing: Vec<KeyPart>,
}

/// Outcome of regenerating keys for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RekeyOutcome {
    /// Entries that received a derived key
    pub regenerated: usize,
    pub skipped: Vec<SkippedKey>,
}

/// Derives canonical citation keys
#[derive(Debug, Clone)]
pub struct KeyRegenerator {
    stop_words: HashSet<String>,
}

impl KeyRegenerator {
    pub fn new(config: &KeyConfig) -> Self {
        Self {
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .collect(),
        }
    }

    /// Derive the base key for one entry, or report which parts are missing
    pub fn derive_key(&self, entry: &BibTeXEntry) -> Result<String, Vec<KeyPart>> {
        let surname = entry.author().and_then(first_author_surname);
        let year = entry.year().map(normalize_for_key).filter(|y| !y.is_empty());
        let word = entry
            .title()
            .and_then(|title| significant_word(title, &self.stop_words));

        match (surname, year, word) {
            (Some(surname), Some(year), Some(word)) => Ok(format!("{surname}-{year}-{word}")),
            (surname, year, word) => {
                let mut missing = Vec::new();
                if surname.is_none() {
                    missing.push(KeyPart::Author);
                }
                if year.is_none() {
                    missing.push(KeyPart::Year);
                }
                if word.is_none() {
                    missing.push(KeyPart::Title);
                }
                Err(missing)
            }
        }
    }

    /// Replace every derivable key in place, keeping keys unique in the batch.
    ///
    /// Keys of skipped entries are reserved first so a derived key never
    /// takes the name of an entry that kept its original key.
    pub fn regenerate(&self, entries: &mut [BibTeXEntry]) -> RekeyOutcome {
        let derived: Vec<Result<String, Vec<KeyPart>>> =
            entries.iter().map(|entry| self.derive_key(entry)).collect();

        let mut taken: HashSet<String> = entries
            .iter()
            .zip(&derived)
            .filter(|(_, key)| key.is_err())
            .map(|(entry, _)| entry.cite_key.clone())
            .collect();

        let mut outcome = RekeyOutcome::default();
        for (entry, key) in entries.iter_mut().zip(derived) {
            match key {
                Ok(base) => {
                    let key = make_unique(&base, &taken);
                    tracing::debug!("Rekeyed {} -> {}", entry.cite_key, key);
                    taken.insert(key.clone());
                    entry.cite_key = key;
                    outcome.regenerated += 1;
                }
                Err(missing) => outcome.skipped.push(SkippedKey {
                    cite_key: entry.cite_key.clone(),
                    missing,
                }),
            }
        }

        outcome
    }
}

/// First free key among `base`, `base-2`, `base-3`, ...
fn make_unique(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Split an author string into individual authors on `and`
pub(crate) fn split_authors(author: &str) -> Vec<&str> {
    let mut authors = Vec::new();
    let mut remaining = author.trim();

    while let Some(pos) = find_and_separator(remaining) {
        let part = remaining[..pos.0].trim();
        if !part.is_empty() {
            authors.push(part);
        }
        remaining = remaining[pos.1..].trim_start();
    }

    if !remaining.trim().is_empty() {
        authors.push(remaining.trim());
    }

    authors
}

/// Byte range of the next top-level whitespace-delimited `and` separator
fn find_and_separator(text: &str) -> Option<(usize, usize)> {
    let mut depth = 0i32;
    let mut prev_ws = false;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth == 0 && prev_ws {
            let rest = &text[i..];
            if let Some(candidate) = rest.get(..3) {
                if candidate.eq_ignore_ascii_case("and") && rest[3..].starts_with(char::is_whitespace)
                {
                    return Some((i, i + 3));
                }
            }
        }
        prev_ws = c.is_whitespace();
    }
    None
}

/// Extract the surname from a single author name
pub(crate) fn extract_last_name(author: &str) -> Option<String> {
    let trimmed = author.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Corporate author: "{Google Research}"
    if trimmed.starts_with('{') && trimmed.ends_with('}') && !trimmed[1..].contains('{') {
        return Some(trimmed[1..trimmed.len() - 1].to_string());
    }

    // "Last, First" format
    if let Some(comma_pos) = trimmed.find(',') {
        return Some(trimmed[..comma_pos].trim().to_string());
    }

    // "First Last" format - take last word
    trimmed.split_whitespace().last().map(|s| s.to_string())
}

/// Normalized surname of the first listed author
pub(crate) fn first_author_surname(author: &str) -> Option<String> {
    split_authors(author)
        .first()
        .and_then(|first| extract_last_name(first))
        .map(|name| normalize_for_key(&name))
        .filter(|name| !name.is_empty())
}

/// First title word not in the stop-word list; falls back to the first word
/// when every word is a stop word
pub(crate) fn significant_word(title: &str, stop_words: &HashSet<String>) -> Option<String> {
    let words: Vec<String> = title
        .split_whitespace()
        .map(normalize_for_key)
        .filter(|w| !w.is_empty())
        .collect();

    words
        .iter()
        .find(|w| !stop_words.contains(w.as_str()))
        .or_else(|| words.first())
        .cloned()
}

/// Lowercase ASCII letters and digits only, with diacritics folded
pub(crate) fn normalize_for_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
