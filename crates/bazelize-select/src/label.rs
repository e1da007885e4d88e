//! Labels and label lists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A reference to a file or another module.
///
/// `label` is the resolved textual form (a path, or a `:name` / `//pkg:name`
/// target reference). `original_module_name` keeps the referenced module name
/// as it appeared in the source property, before any relabeling; partition
/// mappers use it to look the module up in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub label: String,
    pub original_module_name: Option<String>,
    /// Resolution was ambiguous or deferred to the sink.
    pub ambiguous: bool,
}

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: None,
            ambiguous: false,
        }
    }

    /// A label that references the named module.
    pub fn for_module(label: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: Some(module_name.into()),
            ambiguous: false,
        }
    }

    /// The referenced module name: the original name when the label was
    /// rewritten, otherwise the label text itself.
    pub fn module_name(&self) -> &str {
        self.original_module_name.as_deref().unwrap_or(&self.label)
    }

    /// Case-sensitive suffix test against a declared extension (".c", ".S").
    pub fn has_extension(&self, ext: &str) -> bool {
        self.label.ends_with(ext)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// An ordered list of labels with a parallel exclusion set.
///
/// Excludes are applied lazily: callers accumulate both lists and call
/// [`LabelList::resolve_excludes`] once, after all mutation. Resolution
/// removes by label value equality and is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelList {
    pub includes: Vec<Label>,
    pub excludes: Vec<Label>,
}

impl LabelList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels(includes: Vec<Label>) -> Self {
        Self {
            includes,
            excludes: Vec::new(),
        }
    }

    pub fn with_excludes(includes: Vec<Label>, excludes: Vec<Label>) -> Self {
        Self { includes, excludes }
    }

    /// True when there is nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    pub fn push(&mut self, label: Label) {
        self.includes.push(label);
    }

    /// Concatenate both include and exclude lists.
    pub fn append(&mut self, other: LabelList) {
        self.includes.extend(other.includes);
        self.excludes.extend(other.excludes);
    }

    /// Includes of `self` minus includes of `other`, by label value.
    pub fn subtract(&self, other: &LabelList) -> LabelList {
        let removed: FxHashSet<&str> = other.includes.iter().map(|l| l.label.as_str()).collect();
        LabelList {
            includes: self
                .includes
                .iter()
                .filter(|l| !removed.contains(l.label.as_str()))
                .cloned()
                .collect(),
            excludes: self.excludes.clone(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.includes.iter().any(|l| l.label == label)
    }

    /// Deduplicate includes, keeping first occurrences in order.
    pub fn first_unique(&mut self) {
        let mut seen = FxHashSet::default();
        self.includes.retain(|l| seen.insert(l.label.clone()));
    }

    /// Apply the exclusion set to the include list and clear it.
    /// Calling this twice is a no-op the second time.
    pub fn resolve_excludes(&mut self) {
        if self.excludes.is_empty() {
            return;
        }
        let excluded: FxHashSet<&str> = self.excludes.iter().map(|l| l.label.as_str()).collect();
        self.includes.retain(|l| !excluded.contains(l.label.as_str()));
        self.excludes.clear();
    }
}

impl FromIterator<Label> for LabelList {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self::from_labels(iter.into_iter().collect())
    }
}

/// First occurrence of each string, preserving order.
pub fn first_unique_strings(values: &[String]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// `values` minus everything in `to_remove`, preserving order.
pub fn remove_list_from_list(values: &[String], to_remove: &[String]) -> Vec<String> {
    let removed: FxHashSet<&str> = to_remove.iter().map(String::as_str).collect();
    values
        .iter()
        .filter(|v| !removed.contains(v.as_str()))
        .cloned()
        .collect()
}
