use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

/// When `trigger` opens, pop open elements named in `closes`, searching
/// from the innermost element outward and stopping at any `boundaries`
/// element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitClose {
    /// Element whose start tag fires the rule.
    pub trigger: String,
    /// Open elements the rule may close.
    pub closes: Vec<String>,
    /// Open elements the search does not cross.
    pub boundaries: Vec<String>,
}

impl ImplicitClose {
    /// Build a rule from string slices.
    #[must_use]
    pub fn new(trigger: &str, closes: &[&str], boundaries: &[&str]) -> Self {
        Self {
            trigger: trigger.to_ascii_lowercase(),
            closes: lowercase_all(closes),
            boundaries: lowercase_all(boundaries),
        }
    }

    /// Whether `name` is one of the elements this rule closes.
    #[must_use]
    pub fn closes(&self, name: &str) -> bool {
        contains_ignore_case(&self.closes, name)
    }

    /// Whether `name` stops the search.
    #[must_use]
    pub fn is_boundary(&self, name: &str) -> bool {
        contains_ignore_case(&self.boundaries, name)
    }
}

/// Element classes used by the nesting validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestingRules {
    /// Phrasing elements that may not contain block elements.
    pub inline: BTreeSet<String>,
    /// Block elements; opening one pops inline elements off the top.
    pub block: BTreeSet<String>,
    /// Elements that may not nest inside themselves.
    pub exclusive: BTreeSet<String>,
    /// Open elements the exclusive search does not cross.
    pub exclusive_boundaries: BTreeSet<String>,
}

impl NestingRules {
    /// Whether `name` is inline.
    #[must_use]
    pub fn is_inline(&self, name: &str) -> bool {
        self.inline.contains(&name.to_ascii_lowercase())
    }

    /// Whether `name` is block-level.
    #[must_use]
    pub fn is_block(&self, name: &str) -> bool {
        self.block.contains(&name.to_ascii_lowercase())
    }

    /// Whether `name` may not contain itself.
    #[must_use]
    pub fn is_exclusive(&self, name: &str) -> bool {
        self.exclusive.contains(&name.to_ascii_lowercase())
    }

    /// Whether `name` stops the search for an open exclusive element.
    #[must_use]
    pub fn is_exclusive_boundary(&self, name: &str) -> bool {
        self.exclusive_boundaries.contains(&name.to_ascii_lowercase())
    }
}

/// Void elements, implicit-close rules and nesting classes for one markup
/// dialect. Immutable once built and shared between parses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupRules {
    void_elements: BTreeSet<String>,
    optional_end_tags: BTreeSet<String>,
    implicit_closes: Vec<ImplicitClose>,
    nesting: NestingRules,
}

static HTML_RULES: LazyLock<Arc<MarkupRules>> = LazyLock::new(|| Arc::new(html_rules()));
static XML_RULES: LazyLock<Arc<MarkupRules>> = LazyLock::new(|| Arc::new(MarkupRules::default()));

impl MarkupRules {
    /// Shared HTML tables.
    #[must_use]
    pub fn html() -> Arc<Self> {
        Arc::clone(&HTML_RULES)
    }

    /// Shared empty tables: XML gets no recovery beyond end-tag matching.
    #[must_use]
    pub fn xml() -> Arc<Self> {
        Arc::clone(&XML_RULES)
    }

    /// Start an empty rule set.
    #[must_use]
    pub fn builder() -> RulesBuilder {
        RulesBuilder::default()
    }

    /// Whether `name` never has content.
    #[must_use]
    pub fn is_void(&self, name: &str) -> bool {
        self.void_elements.contains(&name.to_ascii_lowercase())
    }

    /// Whether `name` may be closed implicitly without a recovery issue.
    #[must_use]
    pub fn has_optional_end_tag(&self, name: &str) -> bool {
        self.optional_end_tags.contains(&name.to_ascii_lowercase())
    }

    /// Rules fired by `trigger`, in priority order.
    pub fn implicit_closes_for<'a>(
        &'a self,
        trigger: &'a str,
    ) -> impl Iterator<Item = &'a ImplicitClose> + 'a {
        self.implicit_closes
            .iter()
            .filter(move |rule| rule.trigger.eq_ignore_ascii_case(trigger))
    }

    /// Nesting classes for validating stacks.
    #[must_use]
    pub const fn nesting(&self) -> &NestingRules {
        &self.nesting
    }
}

/// Assembles a [`MarkupRules`].
#[derive(Debug, Clone, Default)]
pub struct RulesBuilder {
    rules: MarkupRules,
}

impl RulesBuilder {
    /// Start from a copy of existing rules.
    #[must_use]
    pub fn extend(base: &MarkupRules) -> Self {
        Self {
            rules: base.clone(),
        }
    }

    /// Add a void element.
    #[must_use]
    pub fn void_element(mut self, name: &str) -> Self {
        let _ = self.rules.void_elements.insert(name.to_ascii_lowercase());
        self
    }

    /// Mark `name` as having an optional end tag: a new `name` closes an
    /// open one, and implicit closes of `name` are not reported.
    #[must_use]
    pub fn optional_end_tag(mut self, name: &str) -> Self {
        let _ = self
            .rules
            .optional_end_tags
            .insert(name.to_ascii_lowercase());
        self.rules
            .implicit_closes
            .push(ImplicitClose::new(name, &[name], &[]));
        self
    }

    /// Mark `name` as silently closable without adding a rule.
    #[must_use]
    pub fn silent_close(mut self, name: &str) -> Self {
        let _ = self
            .rules
            .optional_end_tags
            .insert(name.to_ascii_lowercase());
        self
    }

    /// Add an implicit-close rule after the existing ones.
    #[must_use]
    pub fn implicit_close(mut self, trigger: &str, closes: &[&str], boundaries: &[&str]) -> Self {
        self.rules
            .implicit_closes
            .push(ImplicitClose::new(trigger, closes, boundaries));
        self
    }

    /// Add inline elements.
    #[must_use]
    pub fn inline_elements(mut self, names: &[&str]) -> Self {
        self.rules.nesting.inline.extend(lowercase_all(names));
        self
    }

    /// Add block elements.
    #[must_use]
    pub fn block_elements(mut self, names: &[&str]) -> Self {
        self.rules.nesting.block.extend(lowercase_all(names));
        self
    }

    /// Add elements that may not nest in themselves, and the open elements
    /// their search stops at.
    #[must_use]
    pub fn exclusive_elements(mut self, names: &[&str], boundaries: &[&str]) -> Self {
        self.rules.nesting.exclusive.extend(lowercase_all(names));
        self.rules
            .nesting
            .exclusive_boundaries
            .extend(lowercase_all(boundaries));
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> MarkupRules {
        self.rules
    }
}

fn lowercase_all(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_ascii_lowercase()).collect()
}

fn contains_ignore_case(names: &[String], name: &str) -> bool {
    names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Open elements that stop a `<p>` from being closed from inside them.
const PARAGRAPH_SCOPE: &[&str] = &[
    "button", "table", "td", "th", "caption", "object", "applet", "marquee", "template",
];

const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "listing", "main", "menu", "nav", "ol", "pre", "section",
    "summary", "table", "ul", "xmp",
];

const TABLE_SECTIONS: &[&str] = &[
    "td", "th", "tr", "thead", "tbody", "tfoot", "caption", "colgroup",
];

const SILENTLY_CLOSED: &[&str] = &[
    "p", "li", "dt", "dd", "option", "optgroup", "tr", "td", "th", "thead", "tbody", "tfoot",
    "caption", "colgroup", "rb", "rt", "rp", "rtc", "head", "body", "html",
];

const INLINE_ELEMENTS: &[&str] = &[
    "abbr", "b", "bdi", "bdo", "big", "cite", "code", "dfn", "em", "font", "i", "kbd", "label",
    "mark", "nobr", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup", "time",
    "tt", "u", "var",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "div", "dl", "dt", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "ul",
];

fn html_rules() -> MarkupRules {
    let mut builder = RulesBuilder::default();
    for name in VOID_ELEMENTS {
        builder = builder.void_element(name);
    }
    for name in SILENTLY_CLOSED {
        builder = builder.silent_close(name);
    }
    builder = builder.implicit_close("p", &["p"], PARAGRAPH_SCOPE);
    for trigger in CLOSES_PARAGRAPH {
        builder = builder.implicit_close(trigger, &["p"], PARAGRAPH_SCOPE);
    }
    builder
        .implicit_close("li", &["li", "p"], &["ul", "ol", "menu", "dir", "table", "td", "th"])
        .implicit_close("dt", &["dt", "dd", "p"], &["dl", "table", "td", "th"])
        .implicit_close("dd", &["dt", "dd", "p"], &["dl", "table", "td", "th"])
        .implicit_close("td", &["td", "th"], &["tr", "table"])
        .implicit_close("th", &["td", "th"], &["tr", "table"])
        .implicit_close("tr", &["td", "th", "tr"], &["table", "thead", "tbody", "tfoot"])
        .implicit_close("thead", TABLE_SECTIONS, &["table"])
        .implicit_close("tbody", TABLE_SECTIONS, &["table"])
        .implicit_close("tfoot", TABLE_SECTIONS, &["table"])
        .implicit_close("caption", TABLE_SECTIONS, &["table"])
        .implicit_close("colgroup", TABLE_SECTIONS, &["table"])
        .implicit_close("option", &["option"], &["select", "datalist", "optgroup"])
        .implicit_close("optgroup", &["option", "optgroup"], &["select"])
        .implicit_close("rb", &["rb", "rt", "rp", "rtc"], &["ruby"])
        .implicit_close("rt", &["rb", "rt", "rp"], &["ruby"])
        .implicit_close("rp", &["rb", "rt", "rp"], &["ruby"])
        .implicit_close("rtc", &["rb", "rt", "rp", "rtc"], &["ruby"])
        .implicit_close("body", &["head"], &["html"])
        .inline_elements(INLINE_ELEMENTS)
        .block_elements(BLOCK_ELEMENTS)
        .exclusive_elements(&["a", "form", "button"], &["table", "td", "th", "caption"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_tables() {
        let rules = MarkupRules::html();
        assert!(rules.is_void("BR"));
        assert!(!rules.is_void("div"));
        assert!(rules.has_optional_end_tag("li"));
        assert_eq!(rules.implicit_closes_for("li").count(), 1);
        assert!(rules.implicit_closes_for("div").all(|rule| rule.closes("p")));
        assert!(rules.nesting().is_exclusive("a"));
    }

    #[test]
    fn test_xml_tables_are_empty() {
        let rules = MarkupRules::xml();
        assert!(!rules.is_void("br"));
        assert_eq!(rules.implicit_closes_for("p").count(), 0);
    }

    #[test]
    fn test_optional_end_tag_adds_rule() {
        let rules = MarkupRules::builder().optional_end_tag("Item").build();
        let rule = rules.implicit_closes_for("item").next().unwrap();
        assert!(rule.closes("ITEM"));
        assert!(rules.has_optional_end_tag("item"));
    }
}
