//! Parse configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::decoder::Encoding;
use crate::tag_stack::MarkupRules;

/// Bytes scanned for charset declarations and the leading-tag check.
pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 32 * 1024;

/// Options for one parse.
///
/// Cloning is cheap: the rule tables are shared through an `Arc` and never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// HTML mode: lowercase names, backslash-escaped quotes, void elements,
    /// implicit-close rules, script/style raw capture and nesting validation.
    pub html_mode: bool,
    /// Drop every comment token.
    pub ignore_comments: bool,
    /// Keep `<!...>` declarations and `<?...?>` instructions as comments.
    pub retain_comments: bool,
    /// Keep whitespace-only text runs as empty text nodes.
    pub keep_empty_text: bool,
    /// Reject input with no `<...>` construct in the lookahead window.
    pub require_leading_tag_within_window: bool,
    /// Abort on undecodable input instead of substituting `?`.
    pub strict_encoding: bool,
    /// Skip detection and decode with this encoding.
    pub forced_encoding: Option<Encoding>,
    /// Size of the detection window in bytes.
    pub lookahead_window: usize,
    /// Wall-clock bound for the whole parse. A limit too large to add to
    /// the current instant means no deadline.
    pub time_limit: Option<Duration>,
    /// Void elements, implicit-close rules and nesting tables.
    pub rules: Arc<MarkupRules>,
}

impl ParseOptions {
    /// Lenient HTML parsing with the built-in HTML rule tables.
    #[must_use]
    pub fn html() -> Self {
        Self {
            html_mode: true,
            ignore_comments: false,
            retain_comments: false,
            keep_empty_text: false,
            require_leading_tag_within_window: false,
            strict_encoding: false,
            forced_encoding: None,
            lookahead_window: DEFAULT_LOOKAHEAD_WINDOW,
            time_limit: None,
            rules: MarkupRules::html(),
        }
    }

    /// XML parsing: case-sensitive names and no HTML recovery tables.
    #[must_use]
    pub fn xml() -> Self {
        Self {
            html_mode: false,
            rules: MarkupRules::xml(),
            ..Self::html()
        }
    }

    /// Abort on the first undecodable byte sequence.
    #[must_use]
    pub fn with_strict_encoding(mut self) -> Self {
        self.strict_encoding = true;
        self
    }

    /// Drop all comments.
    #[must_use]
    pub fn with_ignored_comments(mut self) -> Self {
        self.ignore_comments = true;
        self
    }

    /// Keep declarations and processing instructions as comments.
    #[must_use]
    pub fn with_retained_comments(mut self) -> Self {
        self.retain_comments = true;
        self
    }

    /// Keep whitespace-only text as empty text nodes.
    #[must_use]
    pub fn with_empty_text(mut self) -> Self {
        self.keep_empty_text = true;
        self
    }

    /// Reject input that shows no tag in the lookahead window.
    #[must_use]
    pub fn with_leading_tag_check(mut self) -> Self {
        self.require_leading_tag_within_window = true;
        self
    }

    /// Decode with a fixed encoding instead of detecting one.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.forced_encoding = Some(encoding);
        self
    }

    /// Change the detection window size.
    #[must_use]
    pub fn with_lookahead_window(mut self, bytes: usize) -> Self {
        self.lookahead_window = bytes.max(1);
        self
    }

    /// Bound the parse by wall-clock time.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Use custom rule tables.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<MarkupRules>) -> Self {
        self.rules = rules;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::html()
    }
}
