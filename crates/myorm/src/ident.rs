//! Identifier quoting and literal escaping for the MySQL dialect.
//!
//! Identifiers are programmer-supplied (never user input), so a bad name is
//! a usage error. Quoting wraps every segment of a dotted identifier in
//! backticks, doubling embedded backticks.

use crate::error::{OrmError, OrmResult};

/// Quote an identifier, supporting dotted (`schema.table`) notation.
pub fn quote_identifier(identifier: &str) -> OrmResult<String> {
    if identifier.trim().is_empty() {
        return Err(OrmError::validation(
            "Identifier cannot be empty or whitespace",
        ));
    }

    if !identifier.contains('.') {
        return Ok(quote_segment(identifier));
    }

    let segments: Vec<String> = identifier
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(quote_segment)
        .collect();

    Ok(segments.join("."))
}

fn quote_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 2);
    out.push('`');
    for ch in segment.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
    out
}

/// Escape a string for embedding inside a single-quoted MySQL literal.
///
/// Backslashes are doubled before quotes so the two escapes compose.
pub fn escape_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            other => out.push(other),
        }
    }
    out
}

/// Render a quoted string literal, escaping as needed.
pub fn quote_string_literal(value: &str) -> String {
    format!("'{}'", escape_string_literal(value))
}
