//! Dependency label policy and export/implementation splitting.
//!
//! Libraries re-export the headers of a dependency only when that dependency
//! appears in the matching `export_*_headers` list; everything else is an
//! implementation detail. Binaries export nothing. On top of the split sits
//! the label policy for each dependency kind: a full library's static form
//! is addressed through its static companion target, and a prebuilt's
//! whole-archive form through its `_alwayslink` variant.

use rustc_hash::FxHashSet;

use bazelize_graph::{dep_labels_with, ModuleGraph, PathResolver};
use bazelize_select::{Label, LabelList};

use crate::ConversionContext;

/// Target-name suffix of the static companion a full library exposes.
pub const STATIC_COMPANION_SUFFIX: &str = "_cc_library_static";

/// Target-name suffix of a prebuilt's always-linked variant.
pub const ALWAYSLINK_SUFFIX: &str = "_alwayslink";

/// Target-name suffix of the stub variant published by a library with
/// ABI stubs.
pub const STUB_SUFFIX: &str = "_stub_libs_current";

/// One dependency list split by header-export policy.
#[derive(Debug, Clone, Default)]
pub struct DepsPartition {
    pub export: LabelList,
    pub implementation: LabelList,
}

/// Split `all_deps` into exported and implementation halves. When
/// `exports_deps` is false (binaries), everything is implementation.
pub fn partition_exported_and_implementation(
    exports_deps: bool,
    all_deps: &[String],
    exported_deps: &[String],
    to_labels: impl Fn(&[String]) -> LabelList,
) -> DepsPartition {
    partition_exported_and_implementation_excludes(
        exports_deps,
        all_deps,
        &[],
        exported_deps,
        |names, _| to_labels(names),
    )
}

/// As [`partition_exported_and_implementation`], threading an exclude list
/// through to the label constructor so both halves carry it.
pub fn partition_exported_and_implementation_excludes(
    exports_deps: bool,
    all_deps: &[String],
    excludes: &[String],
    exported_deps: &[String],
    to_labels: impl Fn(&[String], &[String]) -> LabelList,
) -> DepsPartition {
    if !exports_deps {
        return DepsPartition {
            export: LabelList::new(),
            implementation: to_labels(all_deps, excludes),
        };
    }
    let exported: FxHashSet<&str> = exported_deps.iter().map(String::as_str).collect();
    let (export, implementation): (Vec<String>, Vec<String>) = all_deps
        .iter()
        .cloned()
        .partition(|dep| exported.contains(dep.as_str()));
    DepsPartition {
        export: to_labels(&export, excludes),
        implementation: to_labels(&implementation, excludes),
    }
}

fn static_label(graph: &dyn ModuleGraph, resolver: &dyn PathResolver, name: &str) -> Label {
    let mut label = resolver.label_for_module_dep(name);
    if graph
        .module_from_name(name)
        .is_some_and(|m| m.module_type.is_full_library())
    {
        label.label.push_str(STATIC_COMPANION_SUFFIX);
    }
    label
}

/// Labels for static library dependencies.
pub fn static_dep_labels(ctx: &ConversionContext<'_>, names: &[String]) -> LabelList {
    dep_labels_with(names, |n| static_label(ctx.graph, ctx.resolver, n))
}

pub fn static_dep_labels_excludes(
    ctx: &ConversionContext<'_>,
    names: &[String],
    excludes: &[String],
) -> LabelList {
    let mut list = static_dep_labels(ctx, names);
    list.excludes = static_dep_labels(ctx, excludes).includes;
    list
}

/// Labels for whole-archive dependencies. Prebuilt archives are addressed
/// through their always-linked variant.
pub fn whole_archive_dep_labels(ctx: &ConversionContext<'_>, names: &[String]) -> LabelList {
    dep_labels_with(names, |n| {
        let mut label = static_label(ctx.graph, ctx.resolver, n);
        if ctx
            .graph
            .module_from_name(n)
            .is_some_and(|m| m.module_type.is_prebuilt())
        {
            label.label.push_str(ALWAYSLINK_SUFFIX);
        }
        label
    })
}

pub fn whole_archive_dep_labels_excludes(
    ctx: &ConversionContext<'_>,
    names: &[String],
    excludes: &[String],
) -> LabelList {
    let mut list = whole_archive_dep_labels(ctx, names);
    list.excludes = whole_archive_dep_labels(ctx, excludes).includes;
    list
}

/// Labels for shared, header, and system library dependencies: the plain
/// module label.
pub fn shared_dep_labels(ctx: &ConversionContext<'_>, names: &[String]) -> LabelList {
    dep_labels_with(names, |n| ctx.resolver.label_for_module_dep(n))
}

pub fn shared_dep_labels_excludes(
    ctx: &ConversionContext<'_>,
    names: &[String],
    excludes: &[String],
) -> LabelList {
    let mut list = shared_dep_labels(ctx, names);
    list.excludes = shared_dep_labels(ctx, excludes).includes;
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazelize_graph::testing::{InMemoryGraph, StringPathResolver};
    use bazelize_graph::{Module, ModuleType};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn labels(list: &LabelList) -> Vec<&str> {
        list.includes.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn splits_by_export_list() {
        let split = partition_exported_and_implementation(
            true,
            &strings(&["liba", "libb", "libc2"]),
            &strings(&["libb"]),
            |names| LabelList::from_labels(names.iter().map(Label::new).collect()),
        );
        assert_eq!(labels(&split.export), vec!["libb"]);
        assert_eq!(labels(&split.implementation), vec!["liba", "libc2"]);
    }

    #[test]
    fn binaries_export_nothing() {
        let split = partition_exported_and_implementation(
            false,
            &strings(&["liba", "libb"]),
            &strings(&["libb"]),
            |names| LabelList::from_labels(names.iter().map(Label::new).collect()),
        );
        assert!(split.export.is_empty());
        assert_eq!(labels(&split.implementation), vec!["liba", "libb"]);
    }

    #[test]
    fn full_libraries_get_the_static_companion_label() {
        let graph = InMemoryGraph::new()
            .with(Module::new("libfull", "pkg", ModuleType::CcLibrary))
            .with(Module::new("libstatic", "pkg", ModuleType::CcLibraryStatic));
        let ctx = ConversionContext {
            graph: &graph,
            resolver: &StringPathResolver,
        };
        let list = static_dep_labels(&ctx, &strings(&["libfull", "libstatic", "libunknown"]));
        assert_eq!(
            labels(&list),
            vec![":libfull_cc_library_static", ":libstatic", ":libunknown"]
        );
    }

    #[test]
    fn prebuilt_whole_archives_get_the_alwayslink_label() {
        let graph = InMemoryGraph::new().with(Module::new(
            "libpre",
            "pkg",
            ModuleType::CcPrebuiltLibrary,
        ));
        let ctx = ConversionContext {
            graph: &graph,
            resolver: &StringPathResolver,
        };
        let list = whole_archive_dep_labels(&ctx, &strings(&["libpre", "libother"]));
        assert_eq!(labels(&list), vec![":libpre_alwayslink", ":libother"]);
    }
}
