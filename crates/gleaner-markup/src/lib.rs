//! Streaming markup parsing for harvested HTML and XML.
//!
//! Bytes of unknown encoding go through four stages: [`decoder`] picks an
//! encoding and yields code points, [`tokenizer`] turns them into tokens,
//! [`tag_stack`] decides what closes when, and [`tree_builder`] assembles
//! an arena tree with a path key per node.
//!
//! The parse never panics on malformed input and always terminates. Only
//! I/O failures, strict-mode encoding faults and the optional leading-tag
//! check abort it; everything else is repaired and reported as a
//! [`ParseIssue`].
//!
//! ```
//! use gleaner_markup::{ParseOptions, parse_bytes};
//! use gleaner_markup::dom::TextContent;
//!
//! let outcome = parse_bytes(b"<ul><li>one<li>two</ul>", &ParseOptions::html()).unwrap();
//! assert_eq!(outcome.document.root_ref().text_content(), "one two");
//! ```

pub mod decoder;
pub mod error;
pub mod options;
pub mod parser;
pub mod tag_stack;
pub mod tokenizer;
pub mod tree_builder;

pub use gleaner_dom as dom;

pub use decoder::{ByteDecoder, ByteSource, Encoding, Iso2022State, detect_bytes, detect_encoding};
pub use error::{EncodingFault, FaultKind, IssueKind, ParseError, ParseIssue};
pub use options::{DEFAULT_LOOKAHEAD_WINDOW, ParseOptions};
pub use parser::{MarkupParser, ParseOutcome, ParseStatus, parse_bytes, parse_reader};
pub use tag_stack::{
    ImplicitClose, MarkupRules, NestingRules, PushOutcome, RulesBuilder, StackMode, TagStack,
    TagStackEntry,
};
pub use tokenizer::{Token, Tokenizer, tokenize};
pub use tree_builder::{TreeBuilder, print_tree, render_tree};
