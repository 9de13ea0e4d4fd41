//! Delimiter and text scanning helpers
//!
//! Pure functions shared by the compiler and the matcher: locating the
//! contents of a bracketed group, splitting alternatives on `|`, reading
//! parse-mark prefixes and comparing text case-insensitively.
//!
//! All indices are byte offsets. Delimiters are ASCII, so every offset these
//! functions return lies on a char boundary.

use memchr::{memchr3, memmem};

/// The parse-mark separator used in `(1¦text)` and `[1¦text]`
pub const PARSE_MARK_SEPARATOR: char = '\u{00a6}';

/// Return the closing delimiter for an opening group delimiter
#[inline]
pub fn closing_delimiter(open: u8) -> Option<u8> {
    match open {
        b'[' => Some(b']'),
        b'(' => Some(b')'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Get the text strictly between the delimiter at `start` and its matching closer
///
/// Nested occurrences of the same pair are honored, and a backslash always
/// escapes exactly the next character (escaped delimiters do not count).
/// The returned slice keeps its escapes.
///
/// # Returns
/// * `Some(inner)` if a matching closer exists
/// * `None` if `start` does not point at `open` or the group is unclosed
///
/// # Example
///
/// ```
/// use syntax_pattern::engine::scanner::enclosed_text;
///
/// assert_eq!(enclosed_text("[a [b] c] d", b'[', b']', 0), Some("a [b] c"));
/// assert_eq!(enclosed_text(r"(a \) b)", b'(', b')', 0), Some(r"a \) b"));
/// assert_eq!(enclosed_text("(unclosed", b'(', b')', 0), None);
/// ```
pub fn enclosed_text(text: &str, open: u8, close: u8, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&open) {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        let offset = memchr3(b'\\', open, close, &bytes[i..])?;
        i += offset;
        let c = bytes[i];
        if c == b'\\' {
            i += 2;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start + 1..i]);
            }
            i += 1;
        } else {
            depth += 1;
            i += 1;
        }
    }
    None
}

/// Split text on unescaped `|` that are not nested inside a group
///
/// Groups (`[..]`, `(..)`, `<..>`) are skipped as a whole, so a `|` inside
/// a nested choice or a regex does not split. Every part is returned with
/// its byte offset in `text`. Text without a top-level `|` yields exactly
/// one part.
///
/// # Example
///
/// ```
/// use syntax_pattern::engine::scanner::split_alternatives;
///
/// let parts: Vec<&str> = split_alternatives("a|(b|c)|<d|e>")
///     .into_iter()
///     .map(|(_, part)| part)
///     .collect();
/// assert_eq!(parts, vec!["a", "(b|c)", "<d|e>"]);
/// ```
pub fn split_alternatives(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut part_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                parts.push((part_start, &text[part_start..i]));
                i += 1;
                part_start = i;
            }
            open @ (b'[' | b'(' | b'<') => {
                let skipped = closing_delimiter(open)
                    .and_then(|close| enclosed_text(text, open, close, i));
                match skipped {
                    Some(inner) => i += inner.len() + 2,
                    // Unclosed; the compiler reports it
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }

    parts.push((part_start, &text[part_start..]));
    parts
}

/// Split a leading parse-mark prefix (`digits¦`) off a group body
///
/// # Returns
/// * `Some((digits, rest))` if `text` starts with one or more ASCII digits
///   followed by `¦`
/// * `None` otherwise
pub fn split_parse_mark(text: &str) -> Option<(&str, &str)> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = text[digits..].strip_prefix(PARSE_MARK_SEPARATOR)?;
    Some((&text[..digits], rest))
}

/// Advance past `' '` characters starting at `pos`
#[inline]
pub fn skip_spaces(input: &str, pos: usize) -> usize {
    pos + input[pos..].bytes().take_while(|&b| b == b' ').count()
}

#[inline]
fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Check whether `input[pos..]` starts with `needle`, ignoring case
///
/// # Returns
/// * `Some(end)` - the byte offset just after the matched characters
/// * `None` if the input is too short or differs
pub fn starts_with_ignore_case(input: &str, pos: usize, needle: &str) -> Option<usize> {
    let mut haystack = input[pos..].char_indices();
    let mut end = pos;
    for expected in needle.chars() {
        let (offset, found) = haystack.next()?;
        if !chars_eq_ignore_case(found, expected) {
            return None;
        }
        end = pos + offset + found.len_utf8();
    }
    Some(end)
}

/// Find the first case-insensitive occurrence of `needle` at or after `from`
///
/// Needles without alphabetic characters are searched bytewise with
/// `memchr::memmem`.
pub fn find_ignore_case(input: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from);
    }
    if !needle.chars().any(char::is_alphabetic) {
        return memmem::find(&input.as_bytes()[from..], needle.as_bytes()).map(|p| p + from);
    }
    input[from..]
        .char_indices()
        .map(|(offset, _)| from + offset)
        .find(|&pos| starts_with_ignore_case(input, pos, needle).is_some())
}

/// Return the offset of the char boundary following `pos`
#[inline]
pub fn next_char_boundary(input: &str, pos: usize) -> usize {
    input[pos..]
        .chars()
        .next()
        .map_or(input.len(), |c| pos + c.len_utf8())
}
