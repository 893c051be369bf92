//! Parse entry points: bytes in, document out.

use std::io::Read;
use std::time::Instant;

use gleaner_common::warning::warn_once;
use gleaner_dom::Document;
use strum_macros::Display;

use crate::decoder::{ByteDecoder, ByteSource, Encoding, detect_encoding, has_leading_tag};
use crate::error::{IssueKind, ParseError, ParseIssue};
use crate::options::ParseOptions;
use crate::tokenizer::Tokenizer;
use crate::tree_builder::TreeBuilder;

/// How a parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParseStatus {
    /// The whole input was consumed.
    Complete,
    /// The time limit expired; the document holds what was built so far.
    TimedOut,
}

/// Everything a parse produced.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The tree and its path keys.
    pub document: Document,
    /// Encoding the input was decoded with.
    pub encoding: Encoding,
    /// Recovery issues in source order.
    pub issues: Vec<ParseIssue>,
    /// Bytes read from the source.
    pub bytes_consumed: u64,
    /// Whether the parse ran to end of input.
    pub status: ParseStatus,
}

impl ParseOutcome {
    /// Issues that lost or replaced content.
    pub fn errors(&self) -> impl Iterator<Item = &ParseIssue> {
        self.issues.iter().filter(|issue| issue.is_error)
    }
}

/// Reusable parser holding one set of options.
#[derive(Debug, Clone, Default)]
pub struct MarkupParser {
    options: ParseOptions,
}

impl MarkupParser {
    /// A parser with `options`.
    #[must_use]
    pub const fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse an in-memory document.
    ///
    /// # Errors
    ///
    /// See [`MarkupParser::parse_reader`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseOutcome, ParseError> {
        self.parse_reader(bytes)
    }

    /// Parse a byte stream.
    ///
    /// # Errors
    ///
    /// [`ParseError::NotMarkup`] when the leading-tag check is on and fails,
    /// [`ParseError::Encoding`] on undecodable input in strict mode, and
    /// [`ParseError::Io`] when the reader fails.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<ParseOutcome, ParseError> {
        let options = &self.options;
        let deadline = options
            .time_limit
            .and_then(|limit| Instant::now().checked_add(limit));

        let mut source = ByteSource::new(reader);
        if options.require_leading_tag_within_window
            && !has_leading_tag(source.lookahead(options.lookahead_window)?)
        {
            return Err(ParseError::NotMarkup {
                window: options.lookahead_window,
            });
        }
        let encoding = match options.forced_encoding {
            Some(encoding) => encoding,
            None => detect_encoding(&mut source, options.lookahead_window)?,
        };
        let decoder =
            ByteDecoder::from_source(source, encoding)?.with_strict(options.strict_encoding);
        let mut tokenizer = Tokenizer::new(decoder, options);
        let mut builder = TreeBuilder::new(options);

        let mut status = ParseStatus::Complete;
        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                status = ParseStatus::TimedOut;
                break;
            }
            let token = tokenizer.next_token()?;
            builder.set_position(tokenizer.position());
            let done = token.is_end_of_stream();
            builder.process_token(token);
            if done {
                break;
            }
        }

        let bytes_consumed = tokenizer.position();
        let mut issues = tokenizer.take_issues();
        let (document, builder_issues) = builder.finish();
        issues.extend(builder_issues);
        if status == ParseStatus::TimedOut {
            warn_once("Parser", "time limit reached; returning a partial tree");
            issues.push(ParseIssue::error(
                IssueKind::TimedOut,
                "time limit reached before end of input",
                bytes_consumed,
            ));
        }
        issues.sort_by_key(|issue| issue.position);

        Ok(ParseOutcome {
            document,
            encoding,
            issues,
            bytes_consumed,
            status,
        })
    }
}

/// Parse an in-memory document with `options`.
///
/// # Errors
///
/// See [`MarkupParser::parse_reader`].
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    MarkupParser::new(options.clone()).parse_bytes(bytes)
}

/// Parse a byte stream with `options`.
///
/// # Errors
///
/// See [`MarkupParser::parse_reader`].
pub fn parse_reader<R: Read>(
    reader: R,
    options: &ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    MarkupParser::new(options.clone()).parse_reader(reader)
}
