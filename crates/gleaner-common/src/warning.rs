//! Pipeline warnings with colored terminal output.
//!
//! Crawled markup is noisy: a single page can contain thousands of stray end
//! tags. Warnings are therefore deduplicated by `(component, message)` so each
//! distinct problem is printed once. Messages should be stable strings (no
//! byte offsets) for deduplication to work; per-occurrence detail belongs in
//! the parse issue list of the individual parse.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Set of warnings already printed, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// When set, warnings are still recorded for deduplication but never printed.
static QUIET: AtomicBool = AtomicBool::new(false);

/// Warn about a recoverable problem (prints once per unique message).
///
/// # Example
/// ```
/// use gleaner_common::warning::warn_once;
///
/// warn_once("Decoder", "substituted '?' for a malformed UTF-8 sequence");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time && !QUIET.load(Ordering::Relaxed) {
        let line = format!("[Gleaner {component}] ⚠ {message}");
        eprintln!("{}", line.yellow());
    }
}

/// Returns true if `warn_once` has already seen this exact warning.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call between unrelated documents).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Silence (or re-enable) warning output on stderr.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_recorded_until_cleared() {
        set_quiet(true);
        warn_once("Test", "recorded once");
        warn_once("Test", "recorded once");
        assert!(was_warned("Test", "recorded once"));
        assert!(!was_warned("Other", "recorded once"));

        clear_warnings();
        assert!(!was_warned("Test", "recorded once"));
    }
}
