//! Common utilities for the Gleaner markup pipeline.
//!
//! This crate provides shared infrastructure used by every pipeline stage:
//! - **Warning System** - deduplicated, colored terminal output for recoverable
//!   problems (encoding substitutions, repaired nesting, stray end tags)

pub mod warning;
