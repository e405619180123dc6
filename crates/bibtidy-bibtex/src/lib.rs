//! BibTeX parsing and formatting
//!
//! This crate provides the BibTeX reader and writer used by `bibtidy`:
//!
//! Features:
//! - Nom-based parser with a lenient and a strict entry point
//! - @string expansion, including the predefined month macros
//! - Ordered, case-insensitive field storage per entry
//! - Formatting that parses back to the same entries

mod entry;
mod formatter;
pub mod parser;

pub use entry::{BibTeXEntry, BibTeXEntryType, BibTeXField, Fields};
pub use formatter::{format_entries, format_entry};
pub use parser::{
    parse, parse_entry, parse_strict, BibTeXParseError, BibTeXParseResult, ParseError,
};
