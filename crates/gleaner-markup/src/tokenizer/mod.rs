//! Markup tokenizer.
//!
//! Turns decoded code points into a flat token stream. Tags are recognized
//! leniently: a `<` that cannot start a tag is ordinary text, attributes are
//! kept verbatim, and `<script>`/`<style>` bodies are captured as opaque raw
//! blocks in HTML mode.

/// Input handling, emission and tag-text helpers.
pub mod helpers;
/// The tokenizer loop.
pub mod lexer;
/// Token types produced by the tokenizer.
pub mod token;

pub use lexer::{Tokenizer, tokenize};
pub use token::Token;
