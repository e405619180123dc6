//! BibTeX parser implementation using nom
//!
//! This parser handles standard BibTeX format including:
//! - @string definitions (plus the predefined month macros)
//! - @preamble declarations
//! - @comment sections
//! - All standard entry types, delimited by braces or parentheses
//! - Braced and quoted field values
//! - String concatenation with #
//! - Nested braces in field values

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, one_of},
    combinator::{map, opt},
    IResult,
};
use std::collections::HashMap;

use super::entry::{BibTeXEntry, BibTeXEntryType};

/// Parse error information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Result of parsing a BibTeX file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseResult {
    pub entries: Vec<BibTeXEntry>,
    pub preambles: Vec<String>,
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },
}

/// Month macros every BibTeX style predefines
const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Parse a BibTeX string, recovering from malformed entries.
///
/// Entries that fail to parse are reported in `errors` and skipped; parsing
/// resumes at the next `@`.
pub fn parse(input: &str) -> BibTeXParseResult {
    parse_bibtex(input)
}

/// Parse a BibTeX string, failing on the first malformed entry.
pub fn parse_strict(input: &str) -> Result<Vec<BibTeXEntry>, ParseError> {
    let result = parse_bibtex(input);
    match result.errors.into_iter().next() {
        Some(err) => Err(ParseError::Syntax {
            line: err.line,
            column: err.column,
            message: err.message,
        }),
        None => Ok(result.entries),
    }
}

/// Parse a single BibTeX entry
pub fn parse_entry(input: &str) -> Result<BibTeXEntry, ParseError> {
    parse_strict(input)?
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::Syntax {
            line: 1,
            column: 1,
            message: "no entry found".to_string(),
        })
}

/// Internal parsing function
fn parse_bibtex(input: &str) -> BibTeXParseResult {
    let mut result = BibTeXParseResult {
        entries: Vec::new(),
        preambles: Vec::new(),
        strings: HashMap::new(),
        errors: Vec::new(),
    };

    let mut remaining = input;
    let mut current_line = 1u32;

    while !remaining.is_empty() {
        // Skip whitespace and count newlines
        let (rest, skipped) = skip_whitespace_and_comments(remaining);
        current_line += count_lines(skipped);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        if remaining.starts_with('@') {
            match parse_at_entry(remaining, &result.strings) {
                Ok((rest, entry_result)) => {
                    match entry_result {
                        AtEntry::Entry(entry) => result.entries.push(entry),
                        AtEntry::String(key, value) => {
                            result.strings.insert(key, value);
                        }
                        AtEntry::Preamble(text) => result.preambles.push(text),
                        AtEntry::Comment => {}
                    }
                    current_line += count_lines(&remaining[..remaining.len() - rest.len()]);
                    remaining = rest;
                }
                Err(_) => {
                    result.errors.push(BibTeXParseError {
                        line: current_line,
                        column: 1,
                        message: diagnose_entry(remaining).to_string(),
                    });
                    // Skip to next @ or end
                    match remaining[1..].find('@') {
                        Some(pos) => {
                            current_line += count_lines(&remaining[..pos + 1]);
                            remaining = &remaining[pos + 1..];
                        }
                        None => break,
                    }
                }
            }
        } else {
            // Text outside entries is an implicit comment
            match remaining.find('@') {
                Some(pos) => {
                    current_line += count_lines(&remaining[..pos]);
                    remaining = &remaining[pos..];
                }
                None => break,
            }
        }
    }

    result
}

fn count_lines(text: &str) -> u32 {
    text.matches('\n').count() as u32
}

/// Explain why an entry starting at `input` failed to parse
fn diagnose_entry(input: &str) -> &'static str {
    let after_at = input.trim_start_matches('@').trim_start();
    let body = after_at.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    if body.len() == after_at.len() {
        return "missing entry type";
    }

    let body = body.trim_start();
    let inner = if let Some(inner) = body.strip_prefix('(') {
        inner
    } else if body.starts_with('{') {
        if parse_braced_content(body).is_err() {
            return "unbalanced braces";
        }
        &body[1..]
    } else {
        return "expected '{' or '(' after entry type";
    };

    if !inner.trim_start().starts_with(is_cite_key_char) {
        return "missing citation key";
    }
    "malformed field list"
}

/// Result of parsing an @ entry
enum AtEntry {
    Entry(BibTeXEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Skip whitespace and comments, return remaining input and skipped text
fn skip_whitespace_and_comments(input: &str) -> (&str, &str) {
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'%' {
            // Line comment
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else {
            break;
        }
    }

    (&input[pos..], &input[..pos])
}

/// Anything but whitespace and BibTeX punctuation, so `müller2020` is a key
fn is_cite_key_char(c: char) -> bool {
    !c.is_whitespace() && !",{}()=\"#%".contains(c)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Opening `{` or `(`, returning the delimiter that must close the body
fn open_delimiter(input: &str) -> IResult<&str, char> {
    let (rest, open) = one_of("{(")(input)?;
    Ok((rest, if open == '(' { ')' } else { '}' }))
}

/// Parse an @ entry (entry, string, preamble, or comment)
fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match entry_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtEntry::String(key, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, AtEntry::Preamble(text)))
        }
        "comment" => {
            let (rest, _) = parse_comment_body(rest)?;
            Ok((rest, AtEntry::Comment))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, entry_type, strings)?;
            Ok((rest, AtEntry::Entry(entry)))
        }
    }
}

/// Parse a @string definition
fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, close) = open_delimiter(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = take_while1(is_name_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, (key.to_lowercase(), value)))
}

/// Parse a @preamble
fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, _) = multispace0(input)?;
    let (rest, close) = open_delimiter(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, value))
}

/// Parse a @comment body (skip everything in braces or to end of line)
fn parse_comment_body(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = parse_braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

/// Parse an entry body
fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibTeXEntry> {
    let (rest, _) = multispace0(input)?;
    let (rest, close) = open_delimiter(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) = take_while1(is_cite_key_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    // `@misc{key}` has no field list and no comma
    let (rest, _) = opt(char(','))(rest)?;

    let (rest, fields) = parse_fields(rest, close, strings)?;

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    let mut entry = BibTeXEntry::new(cite_key.to_string(), BibTeXEntryType::from_str(entry_type));
    for (key, value) in fields {
        entry.set_field(key, value);
    }

    Ok((rest, entry))
}

/// Parse fields within an entry
fn parse_fields<'a>(
    input: &'a str,
    close: char,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if rest.starts_with(close) {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, (key, value))) => {
                fields.push((key, value));
                remaining = rest;

                // Skip optional comma
                let (rest, _) = multispace0(remaining)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            Err(_) => {
                // No more fields; the caller expects the closing delimiter
                return Ok((remaining, fields));
            }
        }
    }
}

/// Parse a single field (key = value)
fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = take_while1(is_name_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_lowercase(), value)))
}

/// Resolve a bare identifier against @string definitions and month macros
fn resolve_macro(name: &str, strings: &HashMap<String, String>) -> String {
    let lowered = name.to_lowercase();
    if let Some(value) = strings.get(&lowered) {
        return value.clone();
    }
    MONTH_MACROS
        .iter()
        .find(|(abbrev, _)| *abbrev == lowered)
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Parse a field value (braced, quoted, number, or string reference)
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(take_while1(is_name_char), |s: &str| resolve_macro(s, strings)),
        ))(rest)?;

        result.push_str(&part);
        remaining = rest;

        // Check for concatenation
        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

/// Parse a braced value {content}
fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

/// Parse braced content including nested braces
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => {
                // Skip escaped character
                pos += 1;
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse a quoted value "content"
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut result = String::new();
    let mut brace_depth = 0;
    let mut chars = input.char_indices().skip(1);

    while let Some((pos, c)) = chars.next() {
        match c {
            '"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], result));
            }
            '{' => {
                brace_depth += 1;
                result.push('{');
            }
            '}' => {
                brace_depth -= 1;
                result.push('}');
            }
            '\\' => {
                result.push('\\');
                if let Some((_, escaped)) = chars.next() {
                    result.push(escaped);
                }
            }
            c => result.push(c),
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
