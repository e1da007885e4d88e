//! Collaborator contracts: graph queries and path resolution.

use bazelize_select::{Label, LabelList};

use crate::module::Module;

/// Read-only view of the full module graph, queried by name. Conversion of
/// one module uses this to classify referenced names (filegroup? has stub
/// variants?) without triggering the other module's own conversion.
pub trait ModuleGraph {
    fn module_from_name(&self, name: &str) -> Option<&Module>;

    fn module_type_name(&self, name: &str) -> Option<String> {
        self.module_from_name(name)
            .map(|m| format!("{:?}", m.module_type))
    }

    fn module_dir(&self, name: &str) -> Option<String> {
        self.module_from_name(name).map(|m| m.dir.clone())
    }

    fn is_filegroup(&self, name: &str) -> bool {
        self.module_from_name(name)
            .is_some_and(|m| m.module_type.is_filegroup())
    }
}

/// Resolves declared source/dependency strings into labels. Owns the
/// path-resolution policy (globs, `:module` references, generated outputs);
/// the converter only constructs lists on top of it.
pub trait PathResolver {
    /// Resolve a srcs-style entry: a path, a glob, or a `:module` reference.
    fn label_for_module_src(&self, src: &str) -> Label;

    /// Resolve a dependency module name.
    fn label_for_module_dep(&self, name: &str) -> Label;
}

/// Source labels with excludes left pending; resolution happens at
/// attribute finalization so later excludes can still land.
pub fn src_labels_excludes(
    resolver: &dyn PathResolver,
    srcs: &[String],
    exclude_srcs: &[String],
) -> LabelList {
    LabelList::with_excludes(
        srcs.iter()
            .map(|s| resolver.label_for_module_src(s))
            .collect(),
        exclude_srcs
            .iter()
            .map(|s| resolver.label_for_module_src(s))
            .collect(),
    )
}

pub fn dep_labels(resolver: &dyn PathResolver, names: &[String]) -> LabelList {
    LabelList::from_labels(
        names
            .iter()
            .map(|n| resolver.label_for_module_dep(n))
            .collect(),
    )
}

pub fn dep_labels_excludes(
    resolver: &dyn PathResolver,
    names: &[String],
    excludes: &[String],
) -> LabelList {
    LabelList::with_excludes(
        names
            .iter()
            .map(|n| resolver.label_for_module_dep(n))
            .collect(),
        excludes
            .iter()
            .map(|n| resolver.label_for_module_dep(n))
            .collect(),
    )
}

/// Dependency labels via a caller-supplied label constructor, for kinds
/// with their own label policy (static companions, whole-archive variants).
pub fn dep_labels_with(names: &[String], label_for: impl Fn(&str) -> Label) -> LabelList {
    LabelList::from_labels(names.iter().map(|n| label_for(n)).collect())
}
