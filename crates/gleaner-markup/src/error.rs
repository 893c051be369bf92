//! Fatal errors and recoverable parse issues.
//!
//! Only three things stop a parse: an I/O failure of the byte source, an
//! encoding fault while decoding in strict mode, and input rejected by the
//! leading-tag pre-scan. Everything structural is repaired and reported as
//! a [`ParseIssue`] instead.

use std::io;

use strum_macros::Display;
use thiserror::Error;

use crate::decoder::Encoding;

/// What was wrong with the bytes at a fault position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    /// Invalid lead byte, bad continuation byte, or a truncated sequence.
    #[error("malformed byte sequence")]
    MalformedSequence,
    /// A well-formed sequence naming an unassigned or private-use code point.
    #[error("unassigned or private-use code point U+{:04X}", u32::from(*.0))]
    UnassignedCodePoint(char),
    /// A C1-range byte (0x80 to 0x9F) in ASCII input. Bytes from 0xA0 up
    /// decode as their Latin-1 code points.
    #[error("byte 0x{0:02X} outside the ASCII and Latin-1 printable ranges")]
    NonAsciiByte(u8),
}

/// An undecodable byte sequence.
///
/// Fatal in strict mode; in lenient mode the decoder substitutes `?` and the
/// fault is downgraded to a [`ParseIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} in {encoding} input at byte {position}")]
pub struct EncodingFault {
    /// Encoding the stream was being decoded as.
    pub encoding: Encoding,
    /// Byte offset where the faulty sequence starts.
    pub position: u64,
    /// What went wrong.
    pub kind: FaultKind,
}

/// Errors that abort a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Strict decoding hit an invalid or unassigned code point.
    #[error("encoding fault: {0}")]
    Encoding(#[from] EncodingFault),
    /// The byte source failed.
    #[error("I/O error while reading markup: {0}")]
    Io(#[from] io::Error),
    /// The leading-tag pre-scan found no `<...>` construct.
    #[error("no markup tag found within the first {window} bytes")]
    NotMarkup {
        /// Size of the scanned lookahead window.
        window: usize,
    },
}

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum IssueKind {
    /// A lenient decoder replaced undecodable input with `?`.
    EncodingSubstitution,
    /// A comment, tag or raw block was cut off by end-of-stream.
    UnterminatedConstruct,
    /// An end tag matched no open element and was ignored.
    UnmatchedEndTag,
    /// An element without an optional end tag was closed implicitly.
    ImplicitlyClosed,
    /// The nesting validator force-closed ancestors of an illegal child.
    IllegalNesting,
    /// The time limit expired before end-of-stream.
    TimedOut,
}

/// A recoverable problem, recorded per parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Category, for filtering.
    pub kind: IssueKind,
    /// Human-readable description.
    pub message: String,
    /// Byte offset in the source at (or shortly after) the problem.
    pub position: u64,
    /// True for problems that lost content; false for pure structure repairs.
    pub is_error: bool,
}

impl ParseIssue {
    /// A structural repair that lost nothing.
    #[must_use]
    pub fn warning(kind: IssueKind, message: impl Into<String>, position: u64) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            is_error: false,
        }
    }

    /// A problem that dropped or replaced source content.
    #[must_use]
    pub fn error(kind: IssueKind, message: impl Into<String>, position: u64) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            is_error: true,
        }
    }
}
