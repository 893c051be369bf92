//! Ordered attribute storage for elements.
//!
//! Crawled markup routinely repeats attributes (`<a href=x href=y>`) and
//! downstream tools compare attribute order, so a hash map is the wrong
//! shape. [`Attributes`] keeps insertion order and lets the first
//! occurrence of a name win.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered map of attribute names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of distinct attributes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the element carries no attributes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an attribute value by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute value, comparing names ASCII-case-insensitively.
    #[must_use]
    pub fn get_ignore_ascii_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True if an attribute with this exact name is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append an attribute unless one with the same name already exists.
    ///
    /// Returns `true` if the attribute was added. Duplicates are dropped so the
    /// first occurrence in the source wins.
    pub fn insert_if_absent(&mut self, name: String, value: String) -> bool {
        if self.contains_key(&name) {
            return false;
        }
        self.entries.push((name, value));
        true
    }

    /// Set an attribute, replacing an existing value in place.
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, name: String, value: String) -> Option<String> {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Iterate over `(name, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            let _ = attrs.insert_if_absent(name, value);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
