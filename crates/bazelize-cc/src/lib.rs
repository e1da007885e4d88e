//! # bazelize-cc
//!
//! The native-module conversion engine: turns one module's declared
//! properties into Bazel-style target declarations with selectable
//! attributes.
//!
//! ## Overview
//!
//! Conversion of one module runs in three phases. Extraction walks the
//! module's per-variant property groups and folds each (axis, config) slot
//! into selectable attributes. Finalization runs the cross-slot rules:
//! source partitioning by language, system-library default fixup, exclude
//! resolution, deduplication. Emission assembles attribute bundles, queues
//! synthetic submodule targets (yasm, genlex, proto, aidl) plus the primary
//! target, and flushes everything to the caller's [`TargetSink`] — or, when
//! any phase fails, reports the error and emits nothing for the module.
//!
//! ```rust
//! use bazelize_cc::{convert_module, ConversionContext};
//! use bazelize_graph::testing::{
//!     CollectingDiagnostics, InMemoryGraph, RecordingSink, StringPathResolver,
//! };
//! use bazelize_graph::{Module, ModuleType};
//!
//! let graph = InMemoryGraph::new();
//! let module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
//! let mut sink = RecordingSink::new();
//! let mut diagnostics = CollectingDiagnostics::new();
//! convert_module(
//!     &ConversionContext { graph: &graph, resolver: &StringPathResolver },
//!     &module,
//!     &mut sink,
//!     &mut diagnostics,
//! );
//! assert_eq!(sink.rule_classes(), vec!["cc_library"]);
//! ```

use tracing::{debug, instrument};

use bazelize_graph::filegroup::convert_filegroup;
use bazelize_graph::{
    AttributeBundle, Diagnostics, Module, ModuleGraph, ModuleType, PathResolver, Result,
    TargetProps, TargetQueue, TargetSink,
};

pub mod compiler;
pub mod deps;
pub mod flags;
pub mod library;
pub mod linker;
pub mod partition;
pub mod stdversion;
pub mod submodule;

use library::{
    parse_base_props, parse_binary_linker_props, parse_exported_includes, parse_prebuilt_props,
    parse_static_or_shared_props, BaseAttrs, StaticOrSharedAttrs,
};

pub use compiler::CompilerAttrs;
pub use linker::LinkerAttrs;

/// The collaborators one conversion reads from. Never mutated.
pub struct ConversionContext<'a> {
    pub graph: &'a dyn ModuleGraph,
    pub resolver: &'a dyn PathResolver,
}

/// Convert one module and flush its targets into `sink`. A conversion
/// error voids the module (nothing is emitted for it), goes to
/// `diagnostics`, and leaves the rest of the batch unaffected. Returns
/// whether the module converted cleanly.
#[instrument(skip_all, fields(module = %module.name))]
pub fn convert_module(
    ctx: &ConversionContext<'_>,
    module: &Module,
    sink: &mut dyn TargetSink,
    diagnostics: &mut dyn Diagnostics,
) -> bool {
    let mut queue = TargetQueue::new();
    let result = match &module.module_type {
        ModuleType::Filegroup => convert_filegroup(ctx.resolver, module, &mut queue),
        ModuleType::CcLibrary => convert_library(ctx, module, &mut queue),
        ModuleType::CcLibraryStatic => convert_static_or_shared(ctx, module, &mut queue, true),
        ModuleType::CcLibraryShared => convert_static_or_shared(ctx, module, &mut queue, false),
        ModuleType::CcBinary => convert_binary(ctx, module, &mut queue),
        ModuleType::CcPrebuiltLibrary => convert_prebuilt_library(ctx, module, &mut queue),
        ModuleType::Other(kind) => {
            debug!(kind = %kind, "module type not converted");
            Ok(())
        }
    };
    match result {
        Ok(()) => {
            debug!(targets = queue.len(), "module converted");
            queue.flush_into(sink);
            true
        }
        Err(err) => {
            diagnostics.report_error(&module.name, &err.to_string());
            false
        }
    }
}

/// Shared attribute assembly for libraries, binaries, and prebuilts.
fn bundle_base(module: &Module, base: &BaseAttrs) -> AttributeBundle {
    let mut attrs = AttributeBundle::new();
    let compiler = &base.compiler;
    let linker = &base.linker;

    attrs.set_label_list("srcs", &compiler.srcs);
    attrs.set_label_list("srcs_c", &compiler.c_srcs);
    attrs.set_label_list("srcs_as", &compiler.as_srcs);
    attrs.set_label_list("hdrs", &compiler.hdrs);

    attrs.set_string_list("copts", &compiler.copts);
    attrs.set_string_list("asflags", &compiler.as_flags);
    attrs.set_string_list("conlyflags", &compiler.conly_flags);
    attrs.set_string_list("cppflags", &compiler.cpp_flags);

    attrs.set_string_list("local_includes", &compiler.local_includes);
    attrs.set_string_list("absolute_includes", &compiler.absolute_includes);
    let exported = parse_exported_includes(module, &compiler.includes);
    attrs.set_string_list("export_includes", &exported.includes);
    attrs.set_string_list("export_absolute_includes", &exported.absolute_includes);
    attrs.set_string_list("export_system_includes", &exported.system_includes);

    attrs.set_label_list("deps", &linker.deps);
    attrs.set_label_list("implementation_deps", &linker.implementation_deps);
    attrs.set_label_list("dynamic_deps", &linker.dynamic_deps);
    let mut implementation_dynamic_deps = linker.implementation_dynamic_deps.clone();
    if let Some(runtime) = &base.proto_runtime_dep {
        implementation_dynamic_deps.add(runtime);
    }
    attrs.set_label_list("implementation_dynamic_deps", &implementation_dynamic_deps);
    attrs.set_label_list("whole_archive_deps", &linker.whole_archive_deps);
    attrs.set_label_list(
        "implementation_whole_archive_deps",
        &linker.implementation_whole_archive_deps,
    );
    attrs.set_label_list("system_dynamic_deps", &linker.system_dynamic_deps);
    attrs.set_label_list("runtime_deps", &linker.runtime_deps);

    attrs.set_string_list("linkopts", &linker.linkopts);
    attrs.set_label_list("additional_linker_inputs", &linker.additional_linker_inputs);
    attrs.set_string_list("features", &base.features);

    attrs.set_bool("rtti", &compiler.rtti);
    attrs.set_opt_string("stl", compiler.stl.as_deref());
    attrs.set_opt_string("c_std", compiler.c_std.as_deref());
    attrs.set_opt_string("cpp_std", compiler.cpp_std.as_deref());

    attrs.set_bool("link_crt", &linker.link_crt);
    attrs.set_bool("use_libcrt", &linker.use_libcrt);
    attrs.set_bool("use_version_lib", &linker.use_version_lib);

    attrs.set_bool("strip_keep_symbols", &linker.strip_keep_symbols);
    attrs.set_bool(
        "strip_keep_symbols_and_debug_frame",
        &linker.strip_keep_symbols_and_debug_frame,
    );
    attrs.set_string_list("strip_keep_symbols_list", &linker.strip_keep_symbols_list);
    attrs.set_bool("strip_all", &linker.strip_all);
    attrs.set_bool("strip_none", &linker.strip_none);

    attrs.set_opt_string("sdk_version", module.sdk_version.as_deref());
    attrs.set_opt_string("min_sdk_version", module.min_sdk_version.as_deref());
    attrs.set_string("suffix", &compiler.suffix);
    attrs.set_opt_string("stubs_symbol_file", compiler.stubs_symbol_file.as_deref());
    attrs.set_string_list("stubs_versions", &compiler.stubs_versions);

    attrs
}

/// Add one half's attributes under a `static_` / `shared_` prefix, for the
/// combined library macro.
fn bundle_half(attrs: &mut AttributeBundle, prefix: &str, half: &StaticOrSharedAttrs) {
    let key = |name: &str| format!("{prefix}_{name}");
    attrs.set_label_list(&key("srcs"), &half.srcs);
    attrs.set_label_list(&key("srcs_c"), &half.srcs_c);
    attrs.set_label_list(&key("srcs_as"), &half.srcs_as);
    attrs.set_string_list(&key("copts"), &half.copts);
    attrs.set_label_list(&key("deps"), &half.deps);
    attrs.set_label_list(&key("implementation_deps"), &half.implementation_deps);
    attrs.set_label_list(&key("dynamic_deps"), &half.dynamic_deps);
    attrs.set_label_list(
        &key("implementation_dynamic_deps"),
        &half.implementation_dynamic_deps,
    );
    attrs.set_label_list(&key("whole_archive_deps"), &half.whole_archive_deps);
    attrs.set_bool(&key("enabled"), &half.enabled);
    // The system-library tri-state only matters when the half sets it.
    if !half.system_dynamic_deps.is_empty() {
        attrs.set_label_list(&key("system_dynamic_deps"), &half.system_dynamic_deps);
    }
}

/// Fold one half's attributes into the base, for the single-form library
/// rules.
fn merge_half(base: &mut BaseAttrs, half: &StaticOrSharedAttrs) {
    base.compiler.srcs.append(&half.srcs);
    base.compiler.c_srcs.append(&half.srcs_c);
    base.compiler.as_srcs.append(&half.srcs_as);
    base.compiler.copts.append(&half.copts);
    base.linker.deps.append(&half.deps);
    base.linker.implementation_deps.append(&half.implementation_deps);
    base.linker.dynamic_deps.append(&half.dynamic_deps);
    base.linker
        .implementation_dynamic_deps
        .append(&half.implementation_dynamic_deps);
    base.linker.whole_archive_deps.append(&half.whole_archive_deps);
    if !half.system_dynamic_deps.is_empty() {
        base.linker.system_dynamic_deps.append(&half.system_dynamic_deps);
    }
}

fn convert_library(
    ctx: &ConversionContext<'_>,
    module: &Module,
    queue: &mut TargetQueue,
) -> Result<()> {
    let base = parse_base_props(ctx, module, queue)?;
    let static_half = parse_static_or_shared_props(ctx, module, true)?;
    let shared_half = parse_static_or_shared_props(ctx, module, false)?;

    let mut attrs = bundle_base(module, &base);
    bundle_half(&mut attrs, "static", &static_half);
    bundle_half(&mut attrs, "shared", &shared_half);
    queue.push(
        TargetProps::new("cc_library", "//build/bazel/rules/cc:cc_library.bzl"),
        &module.name,
        attrs,
    );
    Ok(())
}

fn convert_static_or_shared(
    ctx: &ConversionContext<'_>,
    module: &Module,
    queue: &mut TargetQueue,
    is_static: bool,
) -> Result<()> {
    let mut base = parse_base_props(ctx, module, queue)?;
    let half = parse_static_or_shared_props(ctx, module, is_static)?;
    merge_half(&mut base, &half);

    let mut attrs = bundle_base(module, &base);
    attrs.set_bool("enabled", &half.enabled);
    let (rule_class, load) = if is_static {
        (
            "cc_library_static",
            "//build/bazel/rules/cc:cc_library_static.bzl",
        )
    } else {
        (
            "cc_library_shared",
            "//build/bazel/rules/cc:cc_library_shared.bzl",
        )
    };
    queue.push(TargetProps::new(rule_class, load), &module.name, attrs);
    Ok(())
}

fn convert_binary(
    ctx: &ConversionContext<'_>,
    module: &Module,
    queue: &mut TargetQueue,
) -> Result<()> {
    let base = parse_base_props(ctx, module, queue)?;
    let binary = parse_binary_linker_props(module)?;

    let mut attrs = bundle_base(module, &base);
    attrs.set_opt_bool("linkshared", binary.link_shared);
    attrs.set_string("suffix", &binary.suffix);
    queue.push(
        TargetProps::new("cc_binary", "//build/bazel/rules/cc:cc_binary.bzl"),
        &module.name,
        attrs,
    );
    Ok(())
}

fn convert_prebuilt_library(
    ctx: &ConversionContext<'_>,
    module: &Module,
    queue: &mut TargetQueue,
) -> Result<()> {
    let base = parse_base_props(ctx, module, queue)?;
    let prebuilt = parse_prebuilt_props(ctx, module)?;

    let mut attrs = bundle_base(module, &base);
    attrs.set_label("static_library", &prebuilt.src);
    attrs.set_bool("enabled", &prebuilt.enabled);
    queue.push(
        TargetProps::new(
            "cc_prebuilt_library",
            "//build/bazel/rules/cc:cc_prebuilt_library.bzl",
        ),
        &module.name,
        attrs,
    );
    Ok(())
}
