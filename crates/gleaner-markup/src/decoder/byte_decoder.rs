use std::collections::VecDeque;
use std::io::{self, Read};

use gleaner_common::warning::warn_once;
use strum_macros::Display;

use super::detect::detect_encoding;
use super::encoding::Encoding;
use super::source::ByteSource;
use super::tables::{MAC_ROMAN, WINDOWS_1252, remap};
use super::utf8::{MAX_SEQUENCE_LEN, Utf8Step, decode_sequence, is_unassigned};
use crate::error::{EncodingFault, FaultKind, IssueKind, ParseError, ParseIssue};

const ESC: u8 = 0x1B;

/// Substitutions past this count are tallied but not itemized.
const MAX_RECORDED_SUBSTITUTIONS: usize = 64;

/// Escape-sequence state for ISO-2022 input.
///
/// `ESC $ @`, `ESC $ A`, `ESC $ B` and `ESC $ ( x` switch to double-byte
/// mode; `ESC ( B` and `ESC ( J` switch back to ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Iso2022State {
    /// Bytes pass through.
    #[default]
    Ascii,
    /// Saw ESC.
    Esc,
    /// Saw `ESC $`.
    EscDollar,
    /// Saw `ESC $ (`.
    EscDollarParen,
    /// Saw `ESC (`.
    EscParen,
    /// Graphic bytes are shifted into the high half.
    NonAscii,
}

impl Iso2022State {
    /// Feed one byte: the next state and the character it yields, if any.
    #[must_use]
    pub const fn step(self, byte: u8) -> (Self, Option<char>) {
        if byte == ESC {
            return (Self::Esc, None);
        }
        match self {
            Self::Ascii => (Self::Ascii, Some(byte as char)),
            Self::Esc => match byte {
                b'$' => (Self::EscDollar, None),
                b'(' => (Self::EscParen, None),
                _ => (Self::Ascii, None),
            },
            Self::EscDollar => match byte {
                b'(' => (Self::EscDollarParen, None),
                b'@' | b'A' | b'B' => (Self::NonAscii, None),
                _ => (Self::Ascii, None),
            },
            Self::EscDollarParen => (Self::NonAscii, None),
            Self::EscParen => match byte {
                b'B' | b'J' => (Self::Ascii, None),
                _ => (Self::NonAscii, None),
            },
            Self::NonAscii => match byte {
                0x21..=0x7E => (Self::NonAscii, Some((byte | 0x80) as char)),
                _ => (Self::NonAscii, Some(byte as char)),
            },
        }
    }
}

/// Pull decoder from bytes to code points.
///
/// Yields Unicode scalar values with CR and CRLF folded to LF. C0 controls
/// other than TAB, LF and ESC are dropped.
#[derive(Debug)]
pub struct ByteDecoder<R> {
    source: ByteSource<R>,
    encoding: Encoding,
    strict: bool,
    iso_state: Iso2022State,
    after_cr: bool,
    peeked: VecDeque<char>,
    issues: Vec<ParseIssue>,
    substitutions: u64,
}

impl<R: Read> ByteDecoder<R> {
    /// Decode `reader` as `encoding`.
    ///
    /// # Errors
    ///
    /// Returns the reader's error while checking for a byte-order mark.
    pub fn new(reader: R, encoding: Encoding) -> io::Result<Self> {
        Self::from_source(ByteSource::new(reader), encoding)
    }

    /// Detect the encoding from the first `window` bytes, then decode.
    ///
    /// # Errors
    ///
    /// Returns the reader's error.
    pub fn detect(reader: R, window: usize) -> io::Result<Self> {
        let mut source = ByteSource::new(reader);
        let encoding = detect_encoding(&mut source, window)?;
        Self::from_source(source, encoding)
    }

    /// Decode an already-wrapped source. A UTF-8 byte-order mark is skipped.
    ///
    /// # Errors
    ///
    /// Returns the reader's error while checking for a byte-order mark.
    pub fn from_source(mut source: ByteSource<R>, encoding: Encoding) -> io::Result<Self> {
        if encoding == Encoding::Utf8 && source.lookahead(3)? == [0xEF, 0xBB, 0xBF] {
            source.advance(3);
        }
        Ok(Self {
            source,
            encoding,
            strict: false,
            iso_state: Iso2022State::default(),
            after_cr: false,
            peeked: VecDeque::new(),
            issues: Vec::new(),
            substitutions: 0,
        })
    }

    /// Fail on undecodable input instead of substituting `?`.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The encoding in use.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes consumed from the source, including those behind peeked
    /// characters.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.source.position()
    }

    /// Number of `?` substitutions made so far.
    #[must_use]
    pub const fn substitution_count(&self) -> u64 {
        self.substitutions
    }

    /// Drain the recorded substitution issues.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        std::mem::take(&mut self.issues)
    }

    /// The next code point, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// I/O errors from the source, and encoding faults in strict mode.
    pub fn decode(&mut self) -> Result<Option<char>, ParseError> {
        if let Some(c) = self.peeked.pop_front() {
            return Ok(Some(c));
        }
        self.decode_normalized()
    }

    /// Look `offset` code points ahead without consuming.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub fn peek(&mut self, offset: usize) -> Result<Option<char>, ParseError> {
        while self.peeked.len() <= offset {
            match self.decode_normalized()? {
                Some(c) => self.peeked.push_back(c),
                None => return Ok(None),
            }
        }
        Ok(self.peeked.get(offset).copied())
    }

    fn decode_normalized(&mut self) -> Result<Option<char>, ParseError> {
        loop {
            let Some(c) = self.decode_code_point()? else {
                return Ok(None);
            };
            if std::mem::take(&mut self.after_cr) && c == '\n' {
                continue;
            }
            match c {
                '\r' => {
                    self.after_cr = true;
                    return Ok(Some('\n'));
                }
                '\t' | '\n' | '\u{1B}' => return Ok(Some(c)),
                c if c < ' ' => {}
                c => return Ok(Some(c)),
            }
        }
    }

    fn decode_code_point(&mut self) -> Result<Option<char>, ParseError> {
        if self.encoding == Encoding::Utf8 {
            return self.decode_utf8();
        }
        loop {
            let start = self.source.position();
            let Some(byte) = self.source.next_byte()? else {
                return Ok(None);
            };
            let decoded = match self.encoding {
                Encoding::Ascii if (0x80..0xA0).contains(&byte) => {
                    return self.fault(start, FaultKind::NonAsciiByte(byte)).map(Some);
                }
                Encoding::Ascii | Encoding::Latin1 | Encoding::Raw | Encoding::Utf8 => {
                    Some(char::from(byte))
                }
                Encoding::MacRoman => remap(&MAC_ROMAN, byte),
                Encoding::Windows1252 => remap(&WINDOWS_1252, byte),
                Encoding::Iso2022 => {
                    let (next, emitted) = self.iso_state.step(byte);
                    self.iso_state = next;
                    emitted
                }
            };
            if decoded.is_some() {
                return Ok(decoded);
            }
        }
    }

    fn decode_utf8(&mut self) -> Result<Option<char>, ParseError> {
        let start = self.source.position();
        let step = {
            let window = self.source.lookahead(MAX_SEQUENCE_LEN)?;
            if window.is_empty() {
                return Ok(None);
            }
            decode_sequence(window)
        };
        match step {
            Utf8Step::Char(c, len) => {
                self.source.advance(len);
                if is_unassigned(c) {
                    return self.fault(start, FaultKind::UnassignedCodePoint(c)).map(Some);
                }
                Ok(Some(c))
            }
            Utf8Step::Malformed | Utf8Step::Truncated => {
                self.source.advance(1);
                self.fault(start, FaultKind::MalformedSequence).map(Some)
            }
        }
    }

    fn fault(&mut self, position: u64, kind: FaultKind) -> Result<char, ParseError> {
        let fault = EncodingFault {
            encoding: self.encoding,
            position,
            kind,
        };
        if self.strict {
            return Err(fault.into());
        }
        self.substitutions += 1;
        if self.issues.len() < MAX_RECORDED_SUBSTITUTIONS {
            self.issues.push(ParseIssue::error(
                IssueKind::EncodingSubstitution,
                fault.to_string(),
                position,
            ));
        }
        warn_once("Decoder", &format!("substituted '?' for undecodable {} input", self.encoding));
        Ok('?')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8], encoding: Encoding) -> String {
        let mut decoder = ByteDecoder::new(bytes, encoding).unwrap();
        let mut out = String::new();
        while let Some(c) = decoder.decode().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_line_endings_fold_to_lf() {
        assert_eq!(decode_all(b"a\r\nb\rc\n", Encoding::Ascii), "a\nb\nc\n");
        assert_eq!(decode_all(b"\r\r\n", Encoding::Ascii), "\n\n");
    }

    #[test]
    fn test_controls_dropped() {
        assert_eq!(decode_all(b"a\x00b\x07\tc\x1bd", Encoding::Ascii), "ab\tc\u{1B}d");
    }

    #[test]
    fn test_iso2022_switches() {
        let (state, out) = Iso2022State::Ascii.step(b'A');
        assert_eq!((state, out), (Iso2022State::Ascii, Some('A')));
        let text = decode_all(b"a\x1b$B\x30\x21\x1b(Bz", Encoding::Iso2022);
        assert_eq!(text, "a\u{B0}\u{A1}z");
    }

    #[test]
    fn test_utf8_bom_skipped() {
        assert_eq!(decode_all(b"\xEF\xBB\xBFhi", Encoding::Utf8), "hi");
    }

    #[test]
    fn test_peek_then_decode() {
        let mut decoder = ByteDecoder::new(&b"xyz"[..], Encoding::Ascii).unwrap();
        assert_eq!(decoder.peek(1).unwrap(), Some('y'));
        assert_eq!(decoder.decode().unwrap(), Some('x'));
        assert_eq!(decoder.peek(5).unwrap(), None);
        assert_eq!(decoder.decode().unwrap(), Some('y'));
    }
}
