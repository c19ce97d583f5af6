//! Request payloads and the validation/sanitization that turns them into domain values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod branches;
pub mod categories;
pub mod featured_categories;
pub mod offer_popup;
pub mod orders;
pub mod products;
pub mod uploads;

/// Identifier that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field} `{value}`")]
pub struct InvalidId {
    pub field: &'static str,
    pub value: String,
}

impl IdInput {
    /// Resolve to a positive `i32` identifier.
    pub fn resolve(&self, field: &'static str) -> Result<i32, InvalidId> {
        match self {
            IdInput::Number(value) => i32::try_from(*value)
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| InvalidId {
                    field,
                    value: value.to_string(),
                }),
            IdInput::Text(value) => parse_id(value, field),
        }
    }
}

/// Parse a positive integer identifier taken from a query string or form field.
pub fn parse_id(value: &str, field: &'static str) -> Result<i32, InvalidId> {
    let trimmed = value.trim();
    match trimmed.parse::<i32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(InvalidId {
            field,
            value: trimmed.to_string(),
        }),
    }
}

/// Collapse whitespace runs to single spaces and drop control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize each line, trim blank edges and keep at most one blank line in a row.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}

/// Sanitized inline text, `None` when nothing is left.
pub(crate) fn optional_inline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id(" 12 ", "id"), Ok(12));
        assert!(parse_id("0", "id").is_err());
        assert!(parse_id("abc", "id").is_err());
        assert!(parse_id("507f1f77bcf86cd799439011", "id").is_err());

        assert_eq!(IdInput::Number(7).resolve("id"), Ok(7));
        assert!(IdInput::Number(-3).resolve("id").is_err());
        assert!(IdInput::Number(i64::MAX).resolve("id").is_err());
        assert_eq!(IdInput::Text("9".into()).resolve("id"), Ok(9));
    }

    #[test]
    fn multiline_text_keeps_single_blank_lines() {
        assert_eq!(
            sanitize_multiline_text("\n  First   line \n\n\n Second\u{7}\n"),
            "First line\n\nSecond"
        );
        assert_eq!(sanitize_inline_text("  a \t  b "), "a b");
    }
}
