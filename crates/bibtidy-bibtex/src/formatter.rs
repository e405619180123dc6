//! BibTeX formatting module
//!
//! Converts BibTeXEntry structures back to BibTeX string format. Output
//! parses back to the same entries.

use super::entry::BibTeXEntry;

const INDENT: &str = "    ";

/// Format a single BibTeX entry to string
pub fn format_entry(entry: &BibTeXEntry) -> String {
    let mut result = String::new();

    // Entry type and cite key
    result.push('@');
    result.push_str(entry.entry_type.as_str());
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push(',');
    result.push('\n');

    // Fields, in encounter order
    for field in &entry.fields {
        result.push_str(INDENT);
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push(',');
        result.push('\n');
    }

    result.push('}');
    result
}

/// Format multiple entries to a single BibTeX document.
///
/// Entries are separated by a blank line and the document ends with a
/// newline; an empty batch yields an empty string.
pub fn format_entries(entries: &[BibTeXEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut result = entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n");
    result.push('\n');
    result
}

/// Format a field value, choosing appropriate delimiters
fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    // Braces preserve LaTeX commands and case protection
    let mut result = String::with_capacity(value.len() + 2);
    result.push('{');
    result.push_str(value);
    result.push('}');
    result
}
