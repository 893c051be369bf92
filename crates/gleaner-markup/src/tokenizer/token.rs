use std::fmt;

use gleaner_dom::{Attributes, RawKind};

/// One lexical unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr=value ...>`, or `<name ... />` when `self_closing`.
    StartTag {
        /// Tag name, lowercased in HTML mode.
        name: String,
        /// Attributes in source order; the first of a duplicate name wins.
        attributes: Attributes,
        /// Trailing `/`, or a void element in HTML mode.
        self_closing: bool,
    },
    /// `</name>`.
    EndTag {
        /// Tag name, lowercased in HTML mode.
        name: String,
    },
    /// `<!-- text -->`, or a retained declaration.
    Comment {
        /// Body between the delimiters.
        text: String,
    },
    /// Verbatim `<script>` or `<style>` content.
    RawBlock {
        /// Which element the content came from.
        kind: RawKind,
        /// Everything between the start tag and the closing marker.
        text: String,
    },
    /// Hyper-trimmed character data.
    Text {
        /// The text.
        text: String,
    },
    /// End of input. Repeats once reached.
    EndOfStream,
}

impl Token {
    /// Returns true for [`Token::EndOfStream`].
    #[must_use]
    pub const fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// Tag name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// Text carried by text, comment and raw block tokens.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } | Self::Comment { text } | Self::RawBlock { text, .. } => {
                Some(text)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "StartTag <{name}")?;
                for (attr_name, value) in attributes.iter() {
                    write!(f, " {attr_name}=\"{value}\"")?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "EndTag </{name}>"),
            Self::Comment { text } => write!(f, "Comment <!--{text}-->"),
            Self::RawBlock { kind, text } => {
                write!(f, "RawBlock <{}> ({} chars)", kind.tag_name(), text.chars().count())
            }
            Self::Text { text } => write!(f, "Text {text:?}"),
            Self::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}
