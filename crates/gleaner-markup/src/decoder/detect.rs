//! Charset auto-detection over a lookahead window.

use std::io::{self, Read};

use super::encoding::Encoding;
use super::source::ByteSource;
use super::tables::{WINDOWS_1252, remap};
use super::utf8::{Utf8Step, decode_sequence, is_unassigned};
use crate::options::DEFAULT_LOOKAHEAD_WINDOW;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const DECLARATION_KEYS: [&[u8]; 2] = [b"charset=", b"encoding="];

/// Detect the encoding of a stream from its first `window` bytes.
///
/// The window is peeked, not consumed.
///
/// # Errors
///
/// Returns the reader's error.
pub fn detect_encoding<R: Read>(source: &mut ByteSource<R>, window: usize) -> io::Result<Encoding> {
    let bytes = source.lookahead(window)?;
    let complete = bytes.len() < window;
    Ok(detect_in_window(bytes, complete))
}

/// Detect the encoding of an in-memory document.
#[must_use]
pub fn detect_bytes(bytes: &[u8]) -> Encoding {
    let window = DEFAULT_LOOKAHEAD_WINDOW.min(bytes.len());
    detect_in_window(&bytes[..window], window == bytes.len())
}

/// Pick an encoding for `window`.
///
/// `complete` says the window holds the whole stream; otherwise a truncated
/// UTF-8 sequence at its tail is not held against the UTF-8 probe.
///
/// Order: a UTF-8 byte-order mark; a declared charset whose probe passes;
/// US-ASCII for 7-bit text; UTF-8 if its probe passes; US-ASCII otherwise.
#[must_use]
pub fn detect_in_window(window: &[u8], complete: bool) -> Encoding {
    if window.starts_with(UTF8_BOM) {
        return Encoding::Utf8;
    }
    if let Some(declared) = declared_encoding(window) {
        if probe_declared(declared, window, complete) {
            return declared;
        }
    }
    if window.iter().all(|&b| is_seven_bit_text(b)) {
        return Encoding::Ascii;
    }
    if probe_utf8(window, complete) {
        return Encoding::Utf8;
    }
    Encoding::Ascii
}

/// The first recognized `charset=` or `encoding=` label in the window.
///
/// The key must not follow a letter or digit. Spaces and quotes after the
/// `=` are skipped; the label is the following run of letters, digits and
/// hyphens.
#[must_use]
pub fn declared_encoding(window: &[u8]) -> Option<Encoding> {
    (0..window.len())
        .filter_map(|at| label_at(window, at))
        .find_map(Encoding::from_label)
}

fn label_at(window: &[u8], at: usize) -> Option<&str> {
    if at > 0 && window[at - 1].is_ascii_alphanumeric() {
        return None;
    }
    let rest = &window[at..];
    let key = DECLARATION_KEYS
        .iter()
        .find(|key| rest.len() >= key.len() && rest[..key.len()].eq_ignore_ascii_case(key))?;
    let mut end = at + key.len();
    while end < window.len() && matches!(window[end], b' ' | b'"' | b'\'') {
        end += 1;
    }
    let start = end;
    while end < window.len() && (window[end].is_ascii_alphanumeric() || window[end] == b'-') {
        end += 1;
    }
    if start == end {
        return None;
    }
    std::str::from_utf8(&window[start..end]).ok()
}

/// Whether `window` is plausible in a declared encoding.
#[must_use]
pub fn probe_declared(encoding: Encoding, window: &[u8], complete: bool) -> bool {
    match encoding {
        Encoding::Utf8 => probe_utf8(window, complete),
        Encoding::Ascii => probe_ascii(window),
        Encoding::Iso2022 => window.is_ascii(),
        Encoding::Windows1252 => window.iter().all(|&b| remap(&WINDOWS_1252, b).is_some()),
        Encoding::MacRoman | Encoding::Latin1 | Encoding::Raw => true,
    }
}

/// Valid UTF-8, no unassigned or private-use code points, and at least
/// one letter or digit.
#[must_use]
pub fn probe_utf8(window: &[u8], complete: bool) -> bool {
    let mut at = 0;
    let mut saw_alphanumeric = false;
    while at < window.len() {
        match decode_sequence(&window[at..]) {
            Utf8Step::Char(c, len) => {
                if is_unassigned(c) {
                    return false;
                }
                saw_alphanumeric |= c.is_alphanumeric();
                at += len;
            }
            Utf8Step::Truncated if !complete => break,
            Utf8Step::Truncated | Utf8Step::Malformed => return false,
        }
    }
    saw_alphanumeric
}

/// Every byte is TAB, LF, CR, printable ASCII, or at least 160.
#[must_use]
pub fn probe_ascii(window: &[u8]) -> bool {
    window
        .iter()
        .all(|&b| is_seven_bit_text(b) || b >= 160)
}

/// Whether some `<...>` construct in the window holds only printable ASCII
/// and whitespace between its delimiters.
#[must_use]
pub fn has_leading_tag(window: &[u8]) -> bool {
    let mut from = 0;
    while let Some(offset) = window[from..].iter().position(|&b| b == b'<') {
        let open = from + offset;
        let body = window[open + 1..]
            .iter()
            .take_while(|&&b| b != b'>' && b != b'<' && is_seven_bit_text(b))
            .count();
        let close = open + 1 + body;
        if body > 0 && window.get(close) == Some(&b'>') {
            return true;
        }
        from = open + 1;
    }
    false
}

const fn is_seven_bit_text(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r' | 0x20..=0x7E)
}
