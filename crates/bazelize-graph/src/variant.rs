//! Per-axis, per-config property snapshots.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use bazelize_select::ConfigAxis;

/// The (axis, config-key) pairs present across a module's property groups.
/// The top-level conversion walks this union once per module.
pub type AxisConfigSet = IndexMap<ConfigAxis, IndexSet<String>>;

/// One property group's snapshots across all variants of a module.
///
/// The unconditional snapshot is stored under (`NoConfig`, `""`). This is
/// the typed replacement for reflective arch-variant property walking: the
/// caller asks for a concrete group type and iterates plain structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantProps<T> {
    entries: IndexMap<ConfigAxis, IndexMap<String, T>>,
}

impl<T> Default for VariantProps<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> VariantProps<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for the unconditional variant.
    pub fn base(props: T) -> Self {
        let mut v = Self::new();
        v.set(ConfigAxis::NoConfig, "", props);
        v
    }

    pub fn set(&mut self, axis: ConfigAxis, config: &str, props: T) {
        self.entries
            .entry(axis)
            .or_default()
            .insert(config.to_string(), props);
    }

    /// Builder-style variant of [`Self::set`].
    pub fn with(mut self, axis: ConfigAxis, config: &str, props: T) -> Self {
        self.set(axis, config, props);
        self
    }

    pub fn get(&self, axis: &ConfigAxis, config: &str) -> Option<&T> {
        self.entries.get(axis).and_then(|m| m.get(config))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|m| m.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &T)> {
        self.entries
            .iter()
            .flat_map(|(axis, m)| m.iter().map(move |(config, v)| (axis, config.as_str(), v)))
    }

    /// Merge this group's (axis, config) keys into the union set.
    pub fn collect_axis_configs(&self, into: &mut AxisConfigSet) {
        for (axis, configs) in &self.entries {
            let set = into.entry(axis.clone()).or_default();
            for config in configs.keys() {
                set.insert(config.clone());
            }
        }
    }
}
