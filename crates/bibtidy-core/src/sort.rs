//! Optional ordering by first author, year and title

use bibtidy_bibtex::BibTeXEntry;

use crate::cite_key::{first_author_surname, normalize_for_key};

/// Sort key component; present values order before missing ones
type Component = (bool, String);

fn component(value: Option<String>) -> Component {
    match value {
        Some(v) if !v.is_empty() => (false, v),
        _ => (true, String::new()),
    }
}

fn sort_key(entry: &BibTeXEntry) -> (Component, Component, Component) {
    let surname = entry.author().and_then(first_author_surname);
    let year = entry.year().map(normalize_for_key);
    let first_word = entry.title().and_then(|title| {
        title
            .split_whitespace()
            .map(normalize_for_key)
            .find(|w| !w.is_empty())
    });

    (component(surname), component(year), component(first_word))
}

/// Stable sort by (first-author surname, year, first title word)
pub fn sort_entries(entries: &mut [BibTeXEntry]) {
    entries.sort_by_cached_key(sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibtidy_bibtex::BibTeXEntryType;

    fn paper(key: &str, fields: &[(&str, &str)]) -> BibTeXEntry {
        let mut entry = BibTeXEntry::new(key.to_string(), BibTeXEntryType::Article);
        for (k, v) in fields {
            entry.set_field(*k, *v);
        }
        entry
    }

    #[test]
    fn test_sort_order() {
        let mut entries = vec![
            paper("none", &[("title", "Anonymous")]),
            paper("smith21", &[("author", "Smith, A"), ("year", "2021"), ("title", "Zeta")]),
            paper("adams", &[("author", "Bo Adams"), ("year", "2019"), ("title", "Beta")]),
            paper("smith20", &[("author", "Smith, B"), ("year", "2020"), ("title", "Alpha")]),
        ];
        sort_entries(&mut entries);

        let keys: Vec<_> = entries.iter().map(|e| e.cite_key.as_str()).collect();
        assert_eq!(keys, ["adams", "smith20", "smith21", "none"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut entries = vec![
            paper("first", &[("author", "Doe"), ("year", "2020"), ("title", "Same")]),
            paper("second", &[("author", "Doe"), ("year", "2020"), ("title", "Same")]),
        ];
        sort_entries(&mut entries);
        assert_eq!(entries[0].cite_key, "first");
    }
}
