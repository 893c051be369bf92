use std::collections::VecDeque;
use std::io::Read;

use gleaner_dom::RawKind;

use super::helpers::{TagParts, is_tag_start, normalize_name, parse_tag_text, strip_end_marker};
use super::token::Token;
use crate::decoder::{ByteDecoder, Encoding};
use crate::error::{ParseError, ParseIssue};
use crate::options::ParseOptions;

/// Comments nested deeper than this are scanned as flat comment text.
const MAX_COMMENT_NESTING: usize = 32;

/// Streaming markup tokenizer over a [`ByteDecoder`].
///
/// Pull tokens with [`Tokenizer::next_token`] or iterate. Once the input is
/// exhausted every call yields [`Token::EndOfStream`]; the iterator ends
/// instead.
#[derive(Debug)]
pub struct Tokenizer<R> {
    pub(super) decoder: ByteDecoder<R>,
    pub(super) options: ParseOptions,
    /// Character data since the last markup construct.
    pub(super) text: String,
    pub(super) pending: VecDeque<Token>,
    pub(super) finished: bool,
    pub(super) issues: Vec<ParseIssue>,
    iteration_done: bool,
    token_stream: Vec<Token>,
}

impl<'a> Tokenizer<&'a [u8]> {
    /// Tokenize an in-memory document, detecting its encoding unless one
    /// is forced in `options`.
    ///
    /// # Errors
    ///
    /// Never fails for slices in practice; the signature matches readers.
    pub fn from_bytes(bytes: &'a [u8], options: &ParseOptions) -> Result<Self, ParseError> {
        let decoder = match options.forced_encoding {
            Some(encoding) => ByteDecoder::new(bytes, encoding)?,
            None => ByteDecoder::detect(bytes, options.lookahead_window)?,
        };
        Ok(Self::new(decoder.with_strict(options.strict_encoding), options))
    }
}

impl<R: Read> Tokenizer<R> {
    /// Tokenize the output of `decoder`.
    #[must_use]
    pub fn new(decoder: ByteDecoder<R>, options: &ParseOptions) -> Self {
        Self {
            decoder,
            options: options.clone(),
            text: String::new(),
            pending: VecDeque::new(),
            finished: false,
            issues: Vec::new(),
            iteration_done: false,
            token_stream: Vec::new(),
        }
    }

    /// The encoding the input is decoded with.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.decoder.encoding()
    }

    /// Bytes consumed from the source so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.decoder.position()
    }

    /// Drain recovery issues from the tokenizer and its decoder, in source
    /// order.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        let mut issues = self.decoder.take_issues();
        issues.append(&mut self.issues);
        issues.sort_by_key(|issue| issue.position);
        issues
    }

    /// The next token.
    ///
    /// # Errors
    ///
    /// I/O errors from the source and encoding faults in strict mode.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            if self.finished {
                return Ok(Token::EndOfStream);
            }
            self.step()?;
        }
    }

    /// Tokenize to the end, collecting tokens (end-of-stream included) for
    /// [`Tokenizer::into_tokens`].
    ///
    /// # Errors
    ///
    /// Same as [`Tokenizer::next_token`].
    pub fn run(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.next_token()?;
            let done = token.is_end_of_stream();
            self.token_stream.push(token);
            if done {
                return Ok(());
            }
        }
    }

    /// Tokens collected by [`Tokenizer::run`].
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    fn step(&mut self) -> Result<(), ParseError> {
        match self.consume()? {
            None => {
                self.flush_text();
                self.finished = true;
            }
            Some('<') => match self.peek_codepoint(0)? {
                Some(next) if is_tag_start(next) => {
                    self.flush_text();
                    self.consume_markup(next)?;
                }
                _ => self.text.push('<'),
            },
            Some(c) => self.text.push(c),
        }
        Ok(())
    }

    fn consume_markup(&mut self, first: char) -> Result<(), ParseError> {
        match first {
            '!' | '?' => self.consume_markup_declaration(),
            '/' => {
                self.skip(1)?;
                self.consume_end_tag()
            }
            _ => self.consume_start_tag(),
        }
    }

    /// `<!--...-->`, `<![CDATA[...]]>`, `<!...>` or `<?...>`.
    fn consume_markup_declaration(&mut self) -> Result<(), ParseError> {
        let Some(opener) = self.consume()? else {
            return Ok(());
        };
        if opener == '!' && self.next_few_characters_are("--")? {
            self.skip(2)?;
            match self.consume_comment(0)? {
                Some(text) if !self.options.ignore_comments => {
                    self.emit_token(Token::Comment { text });
                }
                Some(_) => {}
                None => self.stop_unterminated("comment"),
            }
            return Ok(());
        }
        if opener == '!' && self.next_few_characters_are("[CDATA[")? {
            self.skip(7)?;
            match self.consume_cdata()? {
                Some(text) => self.emit_text(&text),
                None => self.stop_unterminated("CDATA section"),
            }
            return Ok(());
        }
        match self.consume_declaration()? {
            Some(text) if self.options.retain_comments && !self.options.ignore_comments => {
                self.emit_token(Token::Comment {
                    text: format!("{opener}{text}"),
                });
            }
            Some(_) => {}
            None => self.stop_unterminated("declaration"),
        }
        Ok(())
    }

    /// Body of a comment whose `<!--` is consumed; `None` at end of input.
    ///
    /// A `<!--` inside the body opens a nested comment that is consumed
    /// whole before the scan for this comment's `-->` resumes. Any other
    /// `<!`, such as `<![endif]>`, is plain comment text.
    fn consume_comment(&mut self, depth: usize) -> Result<Option<String>, ParseError> {
        let mut body = String::new();
        loop {
            match self.consume()? {
                None => return Ok(None),
                Some('-') if self.next_few_characters_are("->")? => {
                    self.skip(2)?;
                    return Ok(Some(body));
                }
                Some('<')
                    if depth < MAX_COMMENT_NESTING && self.next_few_characters_are("!--")? =>
                {
                    self.skip(3)?;
                    match self.consume_comment(depth + 1)? {
                        Some(inner) => body.push_str(&format!("<!--{inner}-->")),
                        None => return Ok(None),
                    }
                }
                Some(c) => body.push(c),
            }
        }
    }

    /// Text up to the next `>` not preceded by a backslash.
    fn consume_declaration(&mut self) -> Result<Option<String>, ParseError> {
        let mut text = String::new();
        loop {
            match self.consume()? {
                None => return Ok(None),
                Some('>') if !text.ends_with('\\') => return Ok(Some(text)),
                Some(c) => text.push(c),
            }
        }
    }

    fn consume_cdata(&mut self) -> Result<Option<String>, ParseError> {
        let mut text = String::new();
        loop {
            match self.consume()? {
                None => return Ok(None),
                Some(']') if self.next_few_characters_are("]>")? => {
                    self.skip(2)?;
                    return Ok(Some(text));
                }
                Some(c) => text.push(c),
            }
        }
    }

    /// After `</`: the tag name is the first word of the trimmed tag text.
    fn consume_end_tag(&mut self) -> Result<(), ParseError> {
        let mut raw = String::new();
        loop {
            match self.consume()? {
                None => {
                    self.stop_unterminated("end tag");
                    return Ok(());
                }
                Some('>') => break,
                Some(c) => raw.push(c),
            }
        }
        if let Some(name) = raw.split_whitespace().next() {
            let name = normalize_name(name, self.options.html_mode);
            self.emit_token(Token::EndTag { name });
        }
        Ok(())
    }

    fn consume_start_tag(&mut self) -> Result<(), ParseError> {
        let mut raw = String::new();
        loop {
            match self.consume()? {
                None => {
                    self.stop_unterminated("start tag");
                    return Ok(());
                }
                Some('>') => break,
                Some('=') => {
                    raw.push('=');
                    if let Some(quote @ ('"' | '\'')) = self.peek_codepoint(0)? {
                        self.skip(1)?;
                        raw.push(quote);
                        if !self.consume_quoted(quote, &mut raw)? {
                            self.stop_unterminated("attribute value");
                            return Ok(());
                        }
                    }
                }
                Some(c) => raw.push(c),
            }
        }

        let TagParts {
            name,
            attributes,
            self_closing,
        } = parse_tag_text(&raw, self.options.html_mode);
        if name.is_empty() {
            return Ok(());
        }
        if self.options.html_mode && !self_closing {
            let raw_kind = match name.as_str() {
                "script" => Some(RawKind::Script),
                "style" => Some(RawKind::Style),
                _ => None,
            };
            if let Some(kind) = raw_kind {
                return self.consume_raw_block(kind);
            }
        }
        let self_closing = self_closing || self.options.rules.is_void(&name);
        self.emit_token(Token::StartTag {
            name,
            attributes,
            self_closing,
        });
        Ok(())
    }

    /// Append a quoted value up to and including its closing quote.
    /// Returns false at end of input.
    fn consume_quoted(&mut self, quote: char, raw: &mut String) -> Result<bool, ParseError> {
        loop {
            match self.consume()? {
                None => return Ok(false),
                Some('\\') if self.options.html_mode => {
                    raw.push('\\');
                    match self.consume()? {
                        Some(escaped) => raw.push(escaped),
                        None => return Ok(false),
                    }
                }
                Some(c) => {
                    raw.push(c);
                    if c == quote {
                        return Ok(true);
                    }
                }
            }
        }
    }

    /// Capture verbatim up to the matching end tag. Embedded `<` and `>`
    /// are content. At end of input the captured text is still emitted.
    fn consume_raw_block(&mut self, kind: RawKind) -> Result<(), ParseError> {
        let marker = format!("</{}", kind.tag_name());
        let mut captured = String::new();
        loop {
            match self.consume()? {
                None => {
                    self.emit_token(Token::RawBlock {
                        kind,
                        text: captured,
                    });
                    self.stop_unterminated(kind.tag_name());
                    return Ok(());
                }
                Some('>') => {
                    if let Some(body) = strip_end_marker(&captured, &marker) {
                        let text = body.to_string();
                        self.emit_token(Token::RawBlock { kind, text });
                        return Ok(());
                    }
                    captured.push('>');
                }
                Some(c) => captured.push(c),
            }
        }
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration_done {
            return None;
        }
        match self.next_token() {
            Ok(Token::EndOfStream) => {
                self.iteration_done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.iteration_done = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenize an in-memory document. The trailing end-of-stream is not
/// included.
///
/// # Errors
///
/// Encoding faults in strict mode.
pub fn tokenize(bytes: &[u8], options: &ParseOptions) -> Result<Vec<Token>, ParseError> {
    Tokenizer::from_bytes(bytes, options)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_comment_kept_whole() {
        let tokens = tokenize(b"<!-- a <!-- b --> c -->x", &ParseOptions::html()).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Comment {
                    text: " a <!-- b --> c ".to_string()
                },
                Token::Text {
                    text: "x".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_stop_after_unterminated_start_tag() {
        let mut tokenizer = Tokenizer::from_bytes(b"hi <a href", &ParseOptions::html()).unwrap();
        tokenizer.run().unwrap();
        let issues = tokenizer.take_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            tokenizer.into_tokens(),
            vec![
                Token::Text {
                    text: "hi".to_string()
                },
                Token::EndOfStream
            ]
        );
    }
}
