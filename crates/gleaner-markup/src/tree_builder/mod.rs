//! Token-to-tree construction.

/// The builder state machine.
pub mod builder;
/// Indented debug rendering of a tree.
pub mod print;

pub use builder::TreeBuilder;
pub use print::{print_tree, render_tree};
