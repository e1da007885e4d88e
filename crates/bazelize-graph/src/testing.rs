//! In-memory fixtures for converter tests.

use rustc_hash::FxHashMap;

use bazelize_select::Label;

use crate::graph::{ModuleGraph, PathResolver};
use crate::module::Module;
use crate::sink::{Diagnostics, EmittedTarget, TargetSink};

/// A module graph backed by a name-keyed map.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    modules: FxHashMap<String, Module>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: Module) -> &mut Self {
        self.modules.insert(module.name.clone(), module);
        self
    }

    pub fn with(mut self, module: Module) -> Self {
        self.add(module);
        self
    }
}

impl ModuleGraph for InMemoryGraph {
    fn module_from_name(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }
}

/// Resolves sources and dependencies to their textual form: `:module`
/// references keep their referenced name, everything else passes through.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringPathResolver;

impl PathResolver for StringPathResolver {
    fn label_for_module_src(&self, src: &str) -> Label {
        match src.strip_prefix(':') {
            Some(name) => Label::for_module(src, name),
            None => Label::new(src),
        }
    }

    fn label_for_module_dep(&self, name: &str) -> Label {
        Label::for_module(format!(":{name}"), name)
    }
}

/// Collects every emitted target for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub targets: Vec<EmittedTarget>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_named(&self, name: &str) -> Option<&EmittedTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn rule_classes(&self) -> Vec<&str> {
        self.targets
            .iter()
            .map(|t| t.props.rule_class.as_str())
            .collect()
    }
}

impl TargetSink for RecordingSink {
    fn create_target(&mut self, target: EmittedTarget) {
        self.targets.push(target);
    }
}

/// Collects reported (module, message) pairs.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    pub errors: Vec<(String, String)>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report_error(&mut self, module: &str, message: &str) {
        self.errors.push((module.to_string(), message.to_string()));
    }
}
