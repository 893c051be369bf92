//! Helpers for the tokenizer.
//!
//! Input lookahead, token emission and end-of-input bookkeeping live on
//! [`Tokenizer`]; tag-text parsing and text normalization are free
//! functions so they can be tested without a byte source.

use std::io::Read;

use gleaner_common::warning::warn_once;
use gleaner_dom::Attributes;

use super::lexer::Tokenizer;
use super::token::Token;
use crate::error::{IssueKind, ParseError, ParseIssue};

// =============================================================================
// Input Helpers
// =============================================================================

impl<R: Read> Tokenizer<R> {
    /// Consume the next code point.
    pub(super) fn consume(&mut self) -> Result<Option<char>, ParseError> {
        self.decoder.decode()
    }

    /// Look at a code point ahead of the cursor without consuming it.
    pub(super) fn peek_codepoint(&mut self, offset: usize) -> Result<Option<char>, ParseError> {
        self.decoder.peek(offset)
    }

    /// Whether the upcoming code points spell `target` exactly.
    pub(super) fn next_few_characters_are(&mut self, target: &str) -> Result<bool, ParseError> {
        for (offset, expected) in target.chars().enumerate() {
            if self.peek_codepoint(offset)? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Drop `count` code points that were already peeked.
    pub(super) fn skip(&mut self, count: usize) -> Result<(), ParseError> {
        for _ in 0..count {
            let _ = self.consume()?;
        }
        Ok(())
    }
}

// =============================================================================
// Emission Helpers
// =============================================================================

impl<R: Read> Tokenizer<R> {
    pub(super) fn emit_token(&mut self, token: Token) {
        self.pending.push_back(token);
    }

    /// Emit a text token for `raw` unless it trims to nothing.
    pub(super) fn emit_text(&mut self, raw: &str) {
        let text = hypertrim(raw);
        if text.is_empty() && !self.options.keep_empty_text {
            return;
        }
        self.emit_token(Token::Text { text });
    }

    /// Emit the character data gathered since the last markup construct.
    pub(super) fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text);
        self.emit_text(&raw);
    }

    /// End-of-input inside a construct: drop it and end the stream.
    pub(super) fn stop_unterminated(&mut self, construct: &str) {
        let message = format!("unterminated {construct} at end of input");
        warn_once("Tokenizer", &message);
        self.issues.push(ParseIssue::error(
            IssueKind::UnterminatedConstruct,
            message,
            self.decoder.position(),
        ));
        self.finished = true;
    }
}

// =============================================================================
// Tag Text
// =============================================================================

/// A start tag's raw text split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagParts {
    /// Tag name.
    pub name: String,
    /// Attributes in source order, first duplicate wins.
    pub attributes: Attributes,
    /// Whether the raw text ended with `/`.
    pub self_closing: bool,
}

/// Whether `c`, directly after `<`, starts a markup construct.
#[must_use]
pub fn is_tag_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '/' | '!' | '?' | '_' | ':')
}

/// Collapse whitespace runs to one space and trim both ends.
#[must_use]
pub fn hypertrim(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for word in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Parse the text between `<` and `>` of a start tag.
///
/// Names are lowercased in HTML mode. Values keep their source text: no
/// entity decoding, no unescaping. A valueless attribute gets `""`. In HTML
/// mode a backslash inside a quoted value escapes the next character.
#[must_use]
pub fn parse_tag_text(raw: &str, html_mode: bool) -> TagParts {
    let trimmed = raw.trim();
    let (body, self_closing) = trimmed
        .strip_suffix('/')
        .map_or((trimmed, false), |rest| (rest, true));
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(body.len());
    let name = normalize_name(&body[..name_end], html_mode);

    let rest = &body[name_end..];
    let bytes = rest.as_bytes();
    let mut attributes = Attributes::new();
    let mut at = 0;
    loop {
        while at < bytes.len() && (bytes[at].is_ascii_whitespace() || bytes[at] == b'/') {
            at += 1;
        }
        if at >= bytes.len() {
            break;
        }
        let name_start = at;
        while at < bytes.len() && !bytes[at].is_ascii_whitespace() && bytes[at] != b'=' {
            at += 1;
        }
        let attr_name = &rest[name_start..at];
        while at < bytes.len() && bytes[at].is_ascii_whitespace() {
            at += 1;
        }
        let value = if at < bytes.len() && bytes[at] == b'=' {
            at += 1;
            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }
            match bytes.get(at) {
                Some(&quote @ (b'"' | b'\'')) => {
                    at += 1;
                    let value_start = at;
                    while at < bytes.len() && bytes[at] != quote {
                        if html_mode && bytes[at] == b'\\' {
                            at += 1;
                        }
                        at += 1;
                    }
                    let value_end = at.min(bytes.len());
                    at = value_end + 1;
                    &rest[value_start..value_end]
                }
                _ => {
                    let value_start = at;
                    while at < bytes.len() && !bytes[at].is_ascii_whitespace() {
                        at += 1;
                    }
                    &rest[value_start..at]
                }
            }
        } else {
            ""
        };
        if !attr_name.is_empty() {
            let _ = attributes.insert_if_absent(
                normalize_name(attr_name, html_mode),
                value.to_string(),
            );
        }
    }

    TagParts {
        name,
        attributes,
        self_closing,
    }
}

/// Lowercase in HTML mode, verbatim otherwise.
#[must_use]
pub fn normalize_name(name: &str, html_mode: bool) -> String {
    if html_mode {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    }
}

/// If `captured` ends with `marker` (ignoring ASCII case and trailing
/// whitespace), the text before the marker.
#[must_use]
pub fn strip_end_marker<'a>(captured: &'a str, marker: &str) -> Option<&'a str> {
    let body = captured.trim_end();
    let split = body.len().checked_sub(marker.len())?;
    if !body.is_char_boundary(split) {
        return None;
    }
    let (before, tail) = body.split_at(split);
    tail.eq_ignore_ascii_case(marker).then_some(before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypertrim() {
        assert_eq!(hypertrim("  a \n\t b  "), "a b");
        assert_eq!(hypertrim(" \n "), "");
    }

    #[test]
    fn test_parse_tag_text_attributes() {
        let parts = parse_tag_text("A HREF=\"x y\" data-x=1 checked id='a'", true);
        assert_eq!(parts.name, "a");
        assert_eq!(parts.attributes.get("href"), Some("x y"));
        assert_eq!(parts.attributes.get("data-x"), Some("1"));
        assert_eq!(parts.attributes.get("checked"), Some(""));
        assert_eq!(parts.attributes.get("id"), Some("a"));
        assert!(!parts.self_closing);
    }

    #[test]
    fn test_parse_tag_text_duplicates_and_slash() {
        let parts = parse_tag_text("img src=a src=b /", true);
        assert_eq!(parts.attributes.get("src"), Some("a"));
        assert_eq!(parts.attributes.len(), 1);
        assert!(parts.self_closing);
    }

    #[test]
    fn test_backslash_escape_only_in_html() {
        let html = parse_tag_text(r#"a title="say \"hi\"""#, true);
        assert_eq!(html.attributes.get("title"), Some(r#"say \"hi\""#));
        let xml = parse_tag_text(r#"Item Name="a\" b="c""#, false);
        assert_eq!(xml.name, "Item");
        assert_eq!(xml.attributes.get("Name"), Some("a\\"));
        assert_eq!(xml.attributes.get("b"), Some("c"));
    }

    #[test]
    fn test_strip_end_marker() {
        assert_eq!(strip_end_marker("x = 1;</SCRIPT ", "</script"), Some("x = 1;"));
        assert_eq!(strip_end_marker("a < b", "</script"), None);
        assert_eq!(strip_end_marker("é", "</script"), None);
    }
}
