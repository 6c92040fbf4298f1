//! Generic tag parsing utilities

use klang_common::config::KlangConfig;

/// Parse a multi-value tag based on the user configuration.
///
/// If the value already consists of more than one entry, the source
/// pre-split it and nothing is done. A single entry is split on the user's
/// configured separator characters. Absent or blank tags produce an empty
/// list, never a single empty-string entry.
pub fn parse_multi_value(values: &[String], config: &KlangConfig) -> Vec<String> {
    if values.len() == 1 {
        split_by_separators(&values[0], config)
    } else {
        correct_whitespace(values)
    }
}

/// Split a string at every character the selector matches, honoring
/// backslash-escaped occurrences of those characters.
///
/// `"a\\;b;c"` with a `;` selector yields `["a;b", "c"]`.
pub fn split_escaped(value: &str, selector: impl Fn(char) -> bool) -> Vec<String> {
    let mut split = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if selector(c) {
            // Unescaped separator, terminate the current value.
            split.push(std::mem::take(&mut current));
            continue;
        }

        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if selector(next) {
                    // Escaped separator, keep the literal character.
                    current.push(next);
                    chars.next();
                    continue;
                }
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        split.push(current);
    }

    split
}

/// Trim a tag value, mapping blank contents to None.
pub fn correct_whitespace_one(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim every value in a list, dropping the ones that were blank.
pub fn correct_whitespace(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| correct_whitespace_one(v))
        .collect()
}

/// Split a single tag value by the user's separator preferences.
///
/// With no separators configured the value passes through as a one-element
/// list (or an empty list if blank).
fn split_by_separators(value: &str, config: &KlangConfig) -> Vec<String> {
    let parts = split_escaped(value, |c| config.is_separator(c));
    correct_whitespace(&parts)
}

/// Parse an ID3v2-style `position/total` field.
///
/// Returns the position, or None if the position could not be parsed or was
/// zeroed without a meaningful total (taggers write `0/0` as a placeholder).
pub fn parse_position_field(value: &str) -> Option<u32> {
    let mut parts = value.splitn(2, '/');
    let pos = parts.next()?.trim().parse::<u32>().ok();
    let total = parts.next().and_then(|t| t.trim().parse::<u32>().ok());
    transform_position_field(pos, total)
}

/// Transform a raw position + total pair into a position in a way that
/// tolerates placeholder values.
pub fn transform_position_field(pos: Option<u32>, total: Option<u32>) -> Option<u32> {
    match pos {
        Some(pos) if pos > 0 => Some(pos),
        Some(_) if total.is_some_and(|t| t > 0) => pos,
        _ => None,
    }
}
