use std::sync::Arc;

use gleaner_dom::{NodeId, PathKey, PathSegment};
use strum_macros::Display;

use super::rules::{ImplicitClose, MarkupRules};

/// One open element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStackEntry {
    /// Element name as it appeared in the start tag.
    pub name: String,
    /// Position among the element children of the parent entry (or of the
    /// top level), counting every element ever pushed there.
    pub child_index: usize,
    /// Compare names ignoring ASCII case.
    pub case_fold_name: bool,
    /// Tree node created for this element, if a tree is being built.
    pub node: Option<NodeId>,
    next_child_index: usize,
}

impl TagStackEntry {
    /// Whether this entry is an element called `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.case_fold_name {
            self.name.eq_ignore_ascii_case(name)
        } else {
            self.name == name
        }
    }
}

/// Whether the stack enforces nesting classes on push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StackMode {
    /// Implicit-close rules only.
    Plain,
    /// Also force-close ancestors that may not contain the new element.
    Validating,
}

/// What a push did besides pushing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Child index assigned to the new entry.
    pub child_index: usize,
    /// Entries closed by implicit-close rules, innermost first.
    pub implicitly_closed: Vec<TagStackEntry>,
    /// Entries the nesting validator force-closed, innermost first.
    pub repaired: Vec<TagStackEntry>,
}

/// Stack of open elements.
#[derive(Debug, Clone)]
pub struct TagStack {
    entries: Vec<TagStackEntry>,
    rules: Arc<MarkupRules>,
    case_fold: bool,
    mode: StackMode,
    valid: bool,
    top_level_count: usize,
}

impl TagStack {
    /// An empty plain stack.
    #[must_use]
    pub const fn new(rules: Arc<MarkupRules>, case_fold: bool) -> Self {
        Self {
            entries: Vec::new(),
            rules,
            case_fold,
            mode: StackMode::Plain,
            valid: true,
            top_level_count: 0,
        }
    }

    /// An empty validating stack.
    #[must_use]
    pub fn validating(rules: Arc<MarkupRules>, case_fold: bool) -> Self {
        let mut stack = Self::new(rules, case_fold);
        stack.mode = StackMode::Validating;
        stack
    }

    /// Push a new element after applying implicit-close rules and, when
    /// validating, nesting repairs.
    pub fn push_tag(&mut self, name: &str, node: Option<NodeId>) -> PushOutcome {
        let implicitly_closed = self.apply_implicit_closes(name);
        let repaired = match self.mode {
            StackMode::Validating => self.repair_nesting(name),
            StackMode::Plain => Vec::new(),
        };
        let child_index = self.take_child_index();
        self.entries.push(TagStackEntry {
            name: name.to_string(),
            child_index,
            case_fold_name: self.case_fold,
            node,
            next_child_index: 0,
        });
        PushOutcome {
            child_index,
            implicitly_closed,
            repaired,
        }
    }

    /// Close the innermost open element called `name` and everything above
    /// it, innermost first. Empty when no open element matches.
    pub fn pop_tag(&mut self, name: &str) -> Vec<TagStackEntry> {
        match self.deepest_matching(name) {
            Some(depth) => self.truncate_to(depth),
            None => Vec::new(),
        }
    }

    /// Close the innermost element.
    pub fn pop_current(&mut self) -> Option<TagStackEntry> {
        self.entries.pop()
    }

    /// Close everything, innermost first.
    pub fn close_all(&mut self) -> Vec<TagStackEntry> {
        self.truncate_to(0)
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open elements, outermost first.
    #[must_use]
    pub fn entries(&self) -> &[TagStackEntry] {
        &self.entries
    }

    /// Entry at `depth`, 0 being the outermost.
    #[must_use]
    pub fn entry_at(&self, depth: usize) -> Option<&TagStackEntry> {
        self.entries.get(depth)
    }

    /// The innermost open element.
    #[must_use]
    pub fn current(&self) -> Option<&TagStackEntry> {
        self.entries.last()
    }

    /// Depth of the outermost open element called `name`.
    #[must_use]
    pub fn shallowest_matching(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.matches(name))
    }

    /// Depth of the innermost open element called `name`.
    #[must_use]
    pub fn deepest_matching(&self, name: &str) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.matches(name))
    }

    /// Length of the common prefix with `other`, comparing names and child
    /// indices.
    #[must_use]
    pub fn divergence(&self, other: &Self) -> usize {
        self.entries
            .iter()
            .zip(&other.entries)
            .take_while(|(ours, theirs)| {
                ours.child_index == theirs.child_index && ours.matches(&theirs.name)
            })
            .count()
    }

    /// Names and child indices from the outermost element inward.
    #[must_use]
    pub fn path_key(&self) -> PathKey {
        PathKey::from_segments(
            self.entries
                .iter()
                .map(|entry| PathSegment::new(entry.name.as_str(), entry.child_index))
                .collect(),
        )
    }

    /// False once the validator has repaired anything.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Plain or validating.
    #[must_use]
    pub const fn mode(&self) -> StackMode {
        self.mode
    }

    /// The rule tables in use.
    #[must_use]
    pub fn rules(&self) -> &MarkupRules {
        &self.rules
    }

    fn take_child_index(&mut self) -> usize {
        let counter = match self.entries.last_mut() {
            Some(parent) => &mut parent.next_child_index,
            None => &mut self.top_level_count,
        };
        let index = *counter;
        *counter += 1;
        index
    }

    /// Pop entries from the top down to and including `depth`.
    fn truncate_to(&mut self, depth: usize) -> Vec<TagStackEntry> {
        if depth >= self.entries.len() {
            return Vec::new();
        }
        let mut closed = self.entries.split_off(depth);
        closed.reverse();
        closed
    }

    fn apply_implicit_closes(&mut self, trigger: &str) -> Vec<TagStackEntry> {
        let rules = Arc::clone(&self.rules);
        let Some(rule) = rules
            .implicit_closes_for(trigger)
            .find(|rule| self.nearest_candidate(rule).is_some())
        else {
            return Vec::new();
        };
        let mut closed = Vec::new();
        while let Some(depth) = self.nearest_candidate(rule) {
            closed.extend(self.truncate_to(depth));
        }
        closed
    }

    /// Innermost entry `rule` closes, unless a boundary comes first.
    fn nearest_candidate(&self, rule: &ImplicitClose) -> Option<usize> {
        for (depth, entry) in self.entries.iter().enumerate().rev() {
            if rule.closes(&entry.name) {
                return Some(depth);
            }
            if rule.is_boundary(&entry.name) {
                return None;
            }
        }
        None
    }

    fn repair_nesting(&mut self, name: &str) -> Vec<TagStackEntry> {
        let rules = Arc::clone(&self.rules);
        let nesting = rules.nesting();
        let mut repaired = Vec::new();
        if nesting.is_exclusive(name) {
            let open = self
                .entries
                .iter()
                .enumerate()
                .rev()
                .take_while(|(_, entry)| !nesting.is_exclusive_boundary(&entry.name))
                .find(|(_, entry)| entry.matches(name))
                .map(|(depth, _)| depth);
            if let Some(depth) = open {
                repaired.extend(self.truncate_to(depth));
            }
        }
        if nesting.is_block(name) {
            while self
                .entries
                .last()
                .is_some_and(|top| nesting.is_inline(&top.name))
            {
                if let Some(entry) = self.entries.pop() {
                    repaired.push(entry);
                }
            }
        }
        if !repaired.is_empty() {
            self.valid = false;
        }
        repaired
    }
}
