//! Filegroup conversion.
//!
//! A filegroup is itself translated into either a generic `filegroup` target
//! or, when every listed source is an IDL file, an `aidl_library` target.
//! The one wrinkle is the eponymous-file policy: the target ecosystem
//! forbids a rule and a same-named file coexisting in one package, so a
//! filegroup whose only entry shares the module's name emits nothing, and a
//! filegroup that mixes such an entry with others is an error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use bazelize_select::LabelListAttribute;

use crate::error::{ConvertError, Result};
use crate::graph::{ModuleGraph, PathResolver, src_labels_excludes};
use crate::module::Module;
use crate::sink::{AttributeBundle, TargetProps, TargetQueue};

pub const AIDL_EXT: &str = ".aidl";

/// Matches "proto" or "protos" as an independent word anywhere in a module
/// name, ignoring case ("proto.foo", "bar-protos", "baz_proto_srcs").
static LIKELY_PROTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)(^|[^a-z])proto(s)?([^a-z]|$)").unwrap_or_else(|e| panic!("{e}"))
});

static LIKELY_AIDL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)(^|[^a-z])aidl([^a-z]|$)").unwrap_or_else(|e| panic!("{e}")));

/// A filegroup whose name suggests it carries proto sources.
pub fn is_likely_proto_name(name: &str) -> bool {
    LIKELY_PROTO.is_match(name)
}

/// A filegroup whose name suggests it carries aidl sources.
pub fn is_likely_aidl_name(name: &str) -> bool {
    LIKELY_AIDL.is_match(name)
}

/// A filegroup converts to an aidl library when it lists at least one source
/// and every source has the IDL extension.
pub fn should_convert_to_aidl_library(module: &Module) -> bool {
    let Some(fg) = &module.filegroup else {
        return false;
    };
    !fg.srcs.is_empty() && fg.srcs.iter().all(|s| s.ends_with(AIDL_EXT))
}

/// Whether the named module is a filegroup that will become an aidl library.
pub fn is_converted_to_aidl_library(graph: &dyn ModuleGraph, name: &str) -> bool {
    graph
        .module_from_name(name)
        .is_some_and(|m| m.module_type.is_filegroup() && should_convert_to_aidl_library(m))
}

/// Label for an aidl-library filegroup as seen from `from_dir`: a local
/// `:name` reference within the same package, fully qualified otherwise.
pub fn aidl_library_label(module: &Module, from_dir: &str) -> String {
    if module.dir == from_dir {
        format!(":{}", module.name)
    } else {
        format!("//{}:{}", module.dir, module.name)
    }
}

/// Convert one filegroup module, queueing zero or one target.
pub fn convert_filegroup(
    resolver: &dyn PathResolver,
    module: &Module,
    queue: &mut TargetQueue,
) -> Result<()> {
    let Some(fg) = &module.filegroup else {
        return Ok(());
    };

    let mut srcs = src_labels_excludes(resolver, &fg.srcs, &fg.exclude_srcs);
    srcs.resolve_excludes();

    // Eponymous-file short circuit: dependents can reference the file target
    // directly, so a single-file filegroup named after its file is dropped.
    if srcs.includes.iter().any(|l| l.label == module.name) {
        if srcs.includes.len() > 1 {
            return Err(ConvertError::unsupported(
                &module.name,
                format!(
                    "filegroup '{}' cannot contain a file with the same name",
                    module.name
                ),
            ));
        }
        debug!(module = %module.name, "skipping eponymous single-file filegroup");
        return Ok(());
    }

    let srcs_attr = LabelListAttribute::from_label_list(srcs);
    let mut attrs = AttributeBundle::new();
    attrs.set_label_list("srcs", &srcs_attr);

    if should_convert_to_aidl_library(module) {
        attrs.set_opt_string("strip_import_prefix", fg.path.as_deref());
        queue.push(
            TargetProps::new("aidl_library", "//build/bazel/rules/aidl:library.bzl"),
            &module.name,
            attrs,
        );
    } else {
        queue.push(
            TargetProps::new("filegroup", "//build/bazel/rules:filegroup.bzl"),
            &module.name,
            attrs,
        );
    }
    Ok(())
}
