//! Target emission and diagnostics contracts.
//!
//! Serialization of emitted targets (BUILD-file text or otherwise) is the
//! sink's responsibility; the converter hands it rule classes and attribute
//! bundles.

use indexmap::IndexMap;
use serde::Serialize;

use bazelize_select::{
    BoolAttribute, LabelAttribute, LabelListAttribute, StringAttribute, StringListAttribute,
};

/// Rule class plus the location its macro is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetProps {
    pub rule_class: String,
    pub bzl_load_location: String,
}

impl TargetProps {
    pub fn new(rule_class: impl Into<String>, bzl_load_location: impl Into<String>) -> Self {
        Self {
            rule_class: rule_class.into(),
            bzl_load_location: bzl_load_location.into(),
        }
    }
}

/// One attribute value in an emitted target.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    LabelList(LabelListAttribute),
    StringList(StringListAttribute),
    Label(LabelAttribute),
    Bool(BoolAttribute),
    String(StringAttribute),
    PlainString(String),
    PlainBool(bool),
}

/// Attribute name to selectable value, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeBundle {
    attrs: IndexMap<String, AttrValue>,
}

impl AttributeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: AttrValue) {
        self.attrs.insert(name.to_string(), value);
    }

    /// Insert a label-list attribute, skipping empty ones.
    pub fn set_label_list(&mut self, name: &str, value: &LabelListAttribute) {
        if !value.is_empty() || value.force_specify_empty_list {
            self.set(name, AttrValue::LabelList(value.clone()));
        }
    }

    pub fn set_string_list(&mut self, name: &str, value: &StringListAttribute) {
        if !value.is_empty() {
            self.set(name, AttrValue::StringList(value.clone()));
        }
    }

    pub fn set_label(&mut self, name: &str, value: &LabelAttribute) {
        if !value.is_empty() {
            self.set(name, AttrValue::Label(value.clone()));
        }
    }

    pub fn set_bool(&mut self, name: &str, value: &BoolAttribute) {
        if !value.is_empty() {
            self.set(name, AttrValue::Bool(value.clone()));
        }
    }

    pub fn set_string(&mut self, name: &str, value: &StringAttribute) {
        if !value.is_empty() {
            self.set(name, AttrValue::String(value.clone()));
        }
    }

    pub fn set_opt_string(&mut self, name: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.set(name, AttrValue::PlainString(v.to_string()));
        }
    }

    pub fn set_opt_bool(&mut self, name: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.set(name, AttrValue::PlainBool(v));
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// One target declaration bound for the sink.
#[derive(Debug, Clone, Serialize)]
pub struct EmittedTarget {
    pub props: TargetProps,
    pub name: String,
    pub attrs: AttributeBundle,
}

/// Receives target declarations. One module conversion may call this zero,
/// one, or several times (synthetic submodules plus the primary target).
pub trait TargetSink {
    fn create_target(&mut self, target: EmittedTarget);
}

/// Buffers targets during one module's conversion so that a failing module
/// emits nothing at all. Flushed to the real sink only on success.
#[derive(Debug, Default)]
pub struct TargetQueue {
    targets: Vec<EmittedTarget>,
}

impl TargetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, props: TargetProps, name: impl Into<String>, attrs: AttributeBundle) {
        self.targets.push(EmittedTarget {
            props,
            name: name.into(),
            attrs,
        });
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn flush_into(self, sink: &mut dyn TargetSink) {
        for target in self.targets {
            sink.create_target(target);
        }
    }

    pub fn into_targets(self) -> Vec<EmittedTarget> {
        self.targets
    }
}

impl TargetSink for TargetQueue {
    fn create_target(&mut self, target: EmittedTarget) {
        self.targets.push(target);
    }
}

/// Per-module error reporting. Non-fatal to the batch; fatal to the named
/// module's conversion.
pub trait Diagnostics {
    fn report_error(&mut self, module: &str, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazelize_select::{ConfigAxis, Label, LabelList, LabelListAttribute};

    #[test]
    fn empty_label_lists_are_skipped_unless_forced() {
        let mut attrs = AttributeBundle::new();
        attrs.set_label_list("deps", &LabelListAttribute::default());
        assert!(!attrs.contains("deps"));

        let forced = LabelListAttribute {
            force_specify_empty_list: true,
            ..Default::default()
        };
        attrs.set_label_list("system_dynamic_deps", &forced);
        assert!(attrs.contains("system_dynamic_deps"));
    }

    #[test]
    fn queue_orders_and_flushes_targets() {
        let mut queue = TargetQueue::new();
        queue.push(
            TargetProps::new("filegroup", "//build/bazel/rules:filegroup.bzl"),
            "first",
            AttributeBundle::new(),
        );
        queue.push(
            TargetProps::new("cc_library", "//build/bazel/rules/cc:cc_library.bzl"),
            "second",
            AttributeBundle::new(),
        );

        let mut sink = TargetQueue::new();
        queue.flush_into(&mut sink);
        let names: Vec<String> = sink.into_targets().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn emitted_targets_serialize() {
        let mut attr = LabelListAttribute::default();
        attr.set_select_value(
            ConfigAxis::NoConfig,
            "",
            LabelList::from_labels(vec![Label::new("a.cpp")]),
        );
        let mut attrs = AttributeBundle::new();
        attrs.set_label_list("srcs", &attr);
        let target = EmittedTarget {
            props: TargetProps::new("cc_library", "//build/bazel/rules/cc:cc_library.bzl"),
            name: "libfoo".to_string(),
            attrs,
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["name"], "libfoo");
        assert_eq!(json["props"]["rule_class"], "cc_library");
    }
}
