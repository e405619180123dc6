//! Title-based duplicate removal

use std::collections::HashMap;

use bibtidy_bibtex::BibTeXEntry;

/// An entry dropped as a duplicate of an earlier one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedDuplicate {
    pub cite_key: String,
    /// Key of the first entry with the same normalized title
    pub duplicate_of: String,
}

/// Normalize a title for duplicate detection
///
/// - Removes LaTeX case-protection braces
/// - Converts to lowercase
/// - Collapses whitespace
/// - Strips leading and trailing punctuation
pub fn normalize_title(title: &str) -> String {
    let lowered = title.replace(['{', '}'], "").to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Drop entries whose normalized title was already seen, keeping the first.
///
/// Entries without a usable title are always kept. Survivors keep their
/// relative order and are not modified.
pub fn deduplicate(entries: Vec<BibTeXEntry>) -> (Vec<BibTeXEntry>, Vec<RemovedDuplicate>) {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(entries.len());
    let mut removed = Vec::new();

    for entry in entries {
        let normalized = entry.title().map(normalize_title).unwrap_or_default();
        if normalized.is_empty() {
            kept.push(entry);
            continue;
        }

        match seen.get(&normalized) {
            Some(first_key) => {
                tracing::debug!("Dropping {} as duplicate of {}", entry.cite_key, first_key);
                removed.push(RemovedDuplicate {
                    cite_key: entry.cite_key,
                    duplicate_of: first_key.clone(),
                });
            }
            None => {
                seen.insert(normalized, entry.cite_key.clone());
                kept.push(entry);
            }
        }
    }

    (kept, removed)
}
