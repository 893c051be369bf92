//! Open-element stack with rule-driven recovery.
//!
//! The stack decides which elements close implicitly when a new tag opens,
//! which open element an end tag closes, and (in validating mode) which
//! ancestors must be force-closed because they cannot legally contain the
//! new element.

/// Recovery rule tables.
pub mod rules;
/// The stack itself.
pub mod stack;

pub use rules::{ImplicitClose, MarkupRules, NestingRules, RulesBuilder};
pub use stack::{PushOutcome, StackMode, TagStack, TagStackEntry};
