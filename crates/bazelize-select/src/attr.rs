//! The selectable attribute family.
//!
//! Each attribute holds an unconditional base value plus per-axis,
//! per-config overrides. Absence of a slot means "inherit the base value";
//! an explicitly set empty value means "override to empty". The two are
//! tracked independently, which is what makes partial overrides composable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::axis::ConfigAxis;
use crate::label::{Label, LabelList};

/// Per-axis, per-config storage shared by all attribute types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configurable<T> {
    entries: IndexMap<ConfigAxis, IndexMap<String, T>>,
}

impl<T> Default for Configurable<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Configurable<T> {
    pub fn set(&mut self, axis: ConfigAxis, config: &str, value: T) {
        self.entries
            .entry(axis)
            .or_default()
            .insert(config.to_string(), value);
    }

    pub fn get(&self, axis: &ConfigAxis, config: &str) -> Option<&T> {
        self.entries.get(axis).and_then(|m| m.get(config))
    }

    pub fn get_mut(&mut self, axis: &ConfigAxis, config: &str) -> Option<&mut T> {
        self.entries.get_mut(axis).and_then(|m| m.get_mut(config))
    }

    pub fn get_or_default(&mut self, axis: ConfigAxis, config: &str) -> &mut T
    where
        T: Default,
    {
        self.entries
            .entry(axis)
            .or_default()
            .entry(config.to_string())
            .or_default()
    }

    pub fn has_axis(&self, axis: &ConfigAxis) -> bool {
        self.entries.get(axis).is_some_and(|m| !m.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|m| m.is_empty())
    }

    /// Axes with at least one entry, in ascending order.
    pub fn sorted_axes(&self) -> Vec<ConfigAxis> {
        let mut axes: Vec<ConfigAxis> = self
            .entries
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(a, _)| a.clone())
            .collect();
        axes.sort();
        axes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &T)> {
        self.entries
            .iter()
            .flat_map(|(axis, m)| m.iter().map(move |(config, v)| (axis, config.as_str(), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ConfigAxis, &str, &mut T)> {
        self.entries.iter_mut().flat_map(|(axis, m)| {
            m.iter_mut()
                .map(move |(config, v)| (axis, config.as_str(), v))
        })
    }

    pub fn configs(&self, axis: &ConfigAxis) -> Vec<String> {
        self.entries
            .get(axis)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop entries that fail the predicate; prune empty axes.
    pub fn retain(&mut self, mut keep: impl FnMut(&ConfigAxis, &str, &T) -> bool) {
        for (axis, m) in self.entries.iter_mut() {
            m.retain(|config, v| keep(axis, config, v));
        }
        self.entries.retain(|_, m| !m.is_empty());
    }
}

/// A label-list valued selectable attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelListAttribute {
    /// The unconditional value.
    pub value: LabelList,
    pub configurable: Configurable<LabelList>,
    /// When set, an unset slot on an axis that has any explicit entry reads
    /// as empty rather than inheriting the base value. Used for attributes
    /// where "not specified" and "specified as empty" mean different things
    /// downstream (e.g. system library defaulting).
    pub force_specify_empty_list: bool,
}

impl LabelListAttribute {
    pub fn from_label_list(value: LabelList) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Overwrite exactly one slot. The `NoConfig` axis addresses the base
    /// value; the config key is ignored for it.
    pub fn set_select_value(&mut self, axis: ConfigAxis, config: &str, list: LabelList) {
        match axis {
            ConfigAxis::NoConfig => self.value = list,
            _ => self.configurable.set(axis, config, list),
        }
    }

    /// Read a slot. An unset slot inherits the base value, unless
    /// `force_specify_empty_list` is set and the axis has any explicit entry,
    /// in which case it reads as empty.
    pub fn select_value(&self, axis: &ConfigAxis, config: &str) -> LabelList {
        if axis.is_no_config() {
            return self.value.clone();
        }
        if let Some(list) = self.configurable.get(axis, config) {
            return list.clone();
        }
        if self.force_specify_empty_list && self.configurable.has_axis(axis) {
            return LabelList::new();
        }
        self.value.clone()
    }

    /// The explicitly configured slot value, empty if unset. No base
    /// inheritance; use this for slot-local read-modify-write updates.
    pub fn configured_value(&self, axis: &ConfigAxis, config: &str) -> LabelList {
        if axis.is_no_config() {
            return self.value.clone();
        }
        self.configurable
            .get(axis, config)
            .cloned()
            .unwrap_or_default()
    }

    /// Queue `to_remove` for exclusion from one slot's current value only.
    /// Other slots are untouched. Takes effect at [`Self::resolve_excludes`].
    pub fn exclude(&mut self, axis: ConfigAxis, config: &str, to_remove: &LabelList) {
        let slot = match axis {
            ConfigAxis::NoConfig => &mut self.value,
            _ => self.configurable.get_or_default(axis, config),
        };
        slot.excludes.extend(to_remove.includes.iter().cloned());
    }

    /// Apply all queued excludes. Must run after all mutation and before the
    /// attribute is read by a sink; running it twice is a no-op.
    pub fn resolve_excludes(&mut self) {
        self.value.resolve_excludes();
        for (_, _, list) in self.configurable.iter_mut() {
            list.resolve_excludes();
        }
    }

    /// Drop configured slots that are set-equal to the base value.
    /// A post-processing optimization; does not change semantics.
    pub fn deduplicate_axes_from_base(&mut self) {
        let base = self.value.clone();
        self.configurable.retain(|_, _, list| *list != base);
    }

    /// Slot-wise merge, treating absent slots as empty.
    pub fn append(&mut self, other: &LabelListAttribute) {
        self.value.append(other.value.clone());
        for (axis, config, list) in other.configurable.iter() {
            self.configurable
                .get_or_default(axis.clone(), config)
                .append(list.clone());
        }
        self.force_specify_empty_list |= other.force_specify_empty_list;
    }

    /// Add a single-label attribute into the matching slots.
    pub fn add(&mut self, label: &LabelAttribute) {
        if let Some(l) = &label.value {
            self.value.push(l.clone());
        }
        for (axis, config, l) in label.configurable.iter() {
            self.configurable
                .get_or_default(axis.clone(), config)
                .push(l.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.configurable.iter().all(|(_, _, l)| l.is_empty())
    }

    pub fn sorted_configuration_axes(&self) -> Vec<ConfigAxis> {
        self.configurable.sorted_axes()
    }

    pub fn configs(&self, axis: &ConfigAxis) -> Vec<String> {
        self.configurable.configs(axis)
    }

    /// Iterate configured slots (excluding the base value).
    pub fn iter_configured(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &LabelList)> {
        self.configurable.iter()
    }
}

/// A string-list valued selectable attribute (flags, include paths).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringListAttribute {
    pub value: Vec<String>,
    configurable: Configurable<Vec<String>>,
}

impl StringListAttribute {
    pub fn from_strings(value: Vec<String>) -> Self {
        Self {
            value,
            configurable: Configurable::default(),
        }
    }

    pub fn set_select_value(&mut self, axis: ConfigAxis, config: &str, values: Vec<String>) {
        match axis {
            ConfigAxis::NoConfig => self.value = values,
            _ => self.configurable.set(axis, config, values),
        }
    }

    pub fn select_value(&self, axis: &ConfigAxis, config: &str) -> Vec<String> {
        if axis.is_no_config() {
            return self.value.clone();
        }
        self.configurable
            .get(axis, config)
            .cloned()
            .unwrap_or_else(|| self.value.clone())
    }

    /// The explicitly configured slot value, empty if unset.
    pub fn configured_value(&self, axis: &ConfigAxis, config: &str) -> Vec<String> {
        if axis.is_no_config() {
            return self.value.clone();
        }
        self.configurable
            .get(axis, config)
            .cloned()
            .unwrap_or_default()
    }

    pub fn append(&mut self, other: &StringListAttribute) {
        self.value.extend(other.value.iter().cloned());
        for (axis, config, values) in other.configurable.iter() {
            self.configurable
                .get_or_default(axis.clone(), config)
                .extend(values.iter().cloned());
        }
    }

    pub fn deduplicate_axes_from_base(&mut self) {
        let base = self.value.clone();
        self.configurable.retain(|_, _, values| *values != base);
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.configurable.iter().all(|(_, _, v)| v.is_empty())
    }

    pub fn sorted_configuration_axes(&self) -> Vec<ConfigAxis> {
        self.configurable.sorted_axes()
    }

    pub fn iter_configured(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &Vec<String>)> {
        self.configurable.iter()
    }
}

/// A single-label selectable attribute (synthetic dependency references).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelAttribute {
    pub value: Option<Label>,
    configurable: Configurable<Label>,
}

impl LabelAttribute {
    pub fn from_label(label: Label) -> Self {
        Self {
            value: Some(label),
            configurable: Configurable::default(),
        }
    }

    pub fn set_select_value(&mut self, axis: ConfigAxis, config: &str, label: Label) {
        match axis {
            ConfigAxis::NoConfig => self.value = Some(label),
            _ => self.configurable.set(axis, config, label),
        }
    }

    pub fn select_value(&self, axis: &ConfigAxis, config: &str) -> Option<Label> {
        if axis.is_no_config() {
            return self.value.clone();
        }
        self.configurable
            .get(axis, config)
            .cloned()
            .or_else(|| self.value.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.configurable.is_empty()
    }

    pub fn iter_configured(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &Label)> {
        self.configurable.iter()
    }
}

/// A boolean selectable attribute. `None` means unset (inherit downstream
/// defaults), distinct from an explicit `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoolAttribute {
    pub value: Option<bool>,
    configurable: Configurable<bool>,
}

impl BoolAttribute {
    pub fn set_select_value(&mut self, axis: ConfigAxis, config: &str, value: Option<bool>) {
        match axis {
            ConfigAxis::NoConfig => self.value = value,
            _ => {
                if let Some(v) = value {
                    self.configurable.set(axis, config, v);
                }
            }
        }
    }

    pub fn select_value(&self, axis: &ConfigAxis, config: &str) -> Option<bool> {
        if axis.is_no_config() {
            return self.value;
        }
        self.configurable
            .get(axis, config)
            .copied()
            .or(self.value)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.configurable.is_empty()
    }

    pub fn iter_configured(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &bool)> {
        self.configurable.iter()
    }
}

/// A string selectable attribute (suffixes and the like).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringAttribute {
    pub value: Option<String>,
    configurable: Configurable<String>,
}

impl StringAttribute {
    pub fn set_select_value(&mut self, axis: ConfigAxis, config: &str, value: impl Into<String>) {
        match axis {
            ConfigAxis::NoConfig => self.value = Some(value.into()),
            _ => self.configurable.set(axis, config, value.into()),
        }
    }

    pub fn select_value(&self, axis: &ConfigAxis, config: &str) -> Option<String> {
        if axis.is_no_config() {
            return self.value.clone();
        }
        self.configurable
            .get(axis, config)
            .cloned()
            .or_else(|| self.value.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.configurable.is_empty()
    }

    pub fn iter_configured(&self) -> impl Iterator<Item = (&ConfigAxis, &str, &String)> {
        self.configurable.iter()
    }
}
