//! Synthetic submodule targets.
//!
//! Some source kinds compile through their own intermediate target instead
//! of the module's main rule: NASM-style assembly through a `yasm` target,
//! lex sources through `genlex`, protocol buffers through a `proto_library`
//! plus a C++ binding library, and IDL sources through an `aidl_library`
//! plus a C++ binding library. Each synthesizer queues its targets and hands
//! back the reference the main target wires in.

use bazelize_graph::filegroup::{aidl_library_label, is_converted_to_aidl_library};
use bazelize_graph::{AttributeBundle, Module, TargetProps, TargetQueue};
use bazelize_select::{
    ConfigAxis, Label, LabelAttribute, LabelList, LabelListAttribute, StringListAttribute,
};

use crate::compiler::CompilerAttrs;
use crate::ConversionContext;

pub const PROTO_RUNTIME_DEP: &str = "//external/protobuf:libprotobuf-cpp-lite";

/// A reference to a synthesized target, slotted to mirror the sources that
/// produced it: unconditional when the base bucket is non-empty, otherwise
/// per configured slot.
fn partition_reference_label(srcs: &LabelListAttribute, label: &str) -> LabelAttribute {
    if !srcs.value.is_empty() {
        return LabelAttribute::from_label(Label::new(label));
    }
    let mut reference = LabelAttribute::default();
    for (axis, config, list) in srcs.iter_configured() {
        if !list.is_empty() {
            reference.set_select_value(axis.clone(), config, Label::new(label));
        }
    }
    reference
}

/// Queue a `yasm` target for the `.asm` sources, if any. The returned
/// reference belongs in the main target's srcs.
pub fn synthesize_yasm(
    module: &Module,
    compiler: &CompilerAttrs,
    queue: &mut TargetQueue,
) -> Option<LabelAttribute> {
    if compiler.asm_srcs.is_empty() {
        return None;
    }

    let mut include_dirs = compiler.local_includes.clone();
    for (axis, config, props) in module.variants.flag_exporter.iter() {
        if !props.export_include_dirs.is_empty() {
            let mut exported = StringListAttribute::default();
            exported.set_select_value(
                axis.clone(),
                config,
                props.export_include_dirs.clone(),
            );
            include_dirs.append(&exported);
        }
    }

    let name = format!("{}_yasm", module.name);
    let mut attrs = AttributeBundle::new();
    attrs.set_label_list("srcs", &compiler.asm_srcs);
    attrs.set_string_list("flags", &compiler.as_flags);
    attrs.set_string_list("include_dirs", &include_dirs);
    queue.push(
        TargetProps::new("yasm", "//build/bazel/rules/cc:yasm.bzl"),
        &name,
        attrs,
    );
    Some(partition_reference_label(
        &compiler.asm_srcs,
        &format!(":{name}"),
    ))
}

/// References to generated lexer sources, split by output language.
#[derive(Debug, Clone, Default)]
pub struct LexOutputs {
    /// C++ lexer output; belongs in srcs.
    pub src: LabelAttribute,
    /// C lexer output; belongs in c_srcs.
    pub c_src: LabelAttribute,
}

/// Queue `genlex` targets for `.l` / `.ll` sources, if any.
pub fn synthesize_lex(module: &Module, compiler: &CompilerAttrs, queue: &mut TargetQueue) -> LexOutputs {
    let mut outputs = LexOutputs::default();
    if !compiler.ll_srcs.is_empty() {
        let name = format!("{}_genlex_ll", module.name);
        let mut attrs = AttributeBundle::new();
        attrs.set_label_list("srcs", &compiler.ll_srcs);
        attrs.set_string_list("lexopts", &compiler.lexopts);
        queue.push(
            TargetProps::new("genlex", "//build/bazel/rules/cc:flex.bzl"),
            &name,
            attrs,
        );
        outputs.src = partition_reference_label(&compiler.ll_srcs, &format!(":{name}"));
    }
    if !compiler.l_srcs.is_empty() {
        let name = format!("{}_genlex_l", module.name);
        let mut attrs = AttributeBundle::new();
        attrs.set_label_list("srcs", &compiler.l_srcs);
        attrs.set_string_list("lexopts", &compiler.lexopts);
        queue.push(
            TargetProps::new("genlex", "//build/bazel/rules/cc:flex.bzl"),
            &name,
            attrs,
        );
        outputs.c_src = partition_reference_label(&compiler.l_srcs, &format!(":{name}"));
    }
    outputs
}

/// Dependencies the main target gains from proto synthesis.
#[derive(Debug, Clone, Default)]
pub struct ProtoDeps {
    /// The binding library, archived whole so generated symbols survive.
    pub whole_static_lib: Option<LabelAttribute>,
    pub implementation_whole_static_lib: Option<LabelAttribute>,
    /// The protobuf runtime.
    pub runtime_dep: Option<LabelAttribute>,
}

/// Queue a `proto_library` and its C++ binding library for the proto
/// sources, if any. Whether the binding archive is exported follows
/// `export_proto_headers`.
pub fn synthesize_proto(
    module: &Module,
    proto_srcs: &LabelListAttribute,
    queue: &mut TargetQueue,
) -> ProtoDeps {
    if proto_srcs.is_empty() {
        return ProtoDeps::default();
    }

    let proto_name = format!("{}_proto", module.name);
    let mut proto_attrs = AttributeBundle::new();
    proto_attrs.set_label_list("srcs", proto_srcs);
    queue.push(
        TargetProps::new("proto_library", "//build/bazel/rules/proto:proto_library.bzl"),
        &proto_name,
        proto_attrs,
    );

    let binding_name = format!("{}_cc_proto_lite", module.name);
    let mut binding_attrs = AttributeBundle::new();
    binding_attrs.set_label_list(
        "deps",
        &LabelListAttribute::from_label_list(LabelList::from_labels(vec![Label::new(format!(
            ":{proto_name}"
        ))])),
    );
    queue.push(
        TargetProps::new("cc_lite_proto_library", "//build/bazel/rules/cc:cc_proto.bzl"),
        &binding_name,
        binding_attrs,
    );

    let binding = LabelAttribute::from_label(Label::new(format!(":{binding_name}")));
    let exports_headers = module
        .variants
        .library
        .get(&ConfigAxis::NoConfig, "")
        .and_then(|p| p.export_proto_headers)
        .unwrap_or(false);
    ProtoDeps {
        whole_static_lib: exports_headers.then(|| binding.clone()),
        implementation_whole_static_lib: (!exports_headers).then_some(binding),
        runtime_dep: Some(LabelAttribute::from_label(Label::new(PROTO_RUNTIME_DEP))),
    }
}

/// Queue aidl targets for the IDL sources, if any, and return the binding
/// library reference. Sources referencing filegroups that convert to
/// `aidl_library` targets are consumed as such; loose `.aidl` files get a
/// dedicated `aidl_library` of their own.
pub fn synthesize_aidl(
    ctx: &ConversionContext<'_>,
    module: &Module,
    aidl_srcs: &LabelListAttribute,
    queue: &mut TargetQueue,
) -> Option<LabelAttribute> {
    if aidl_srcs.is_empty() {
        return None;
    }

    let mut aidl_libraries = LabelList::new();
    let mut direct_srcs = LabelList::new();
    for label in &aidl_srcs.value.includes {
        let name = label.module_name();
        if is_converted_to_aidl_library(ctx.graph, name)
            && let Some(filegroup) = ctx.graph.module_from_name(name)
        {
            aidl_libraries.push(Label::new(aidl_library_label(filegroup, &module.dir)));
        } else {
            direct_srcs.push(label.clone());
        }
    }

    if !direct_srcs.is_empty() {
        let name = format!("{}_aidl_library", module.name);
        let mut attrs = AttributeBundle::new();
        attrs.set_label_list(
            "srcs",
            &LabelListAttribute::from_label_list(direct_srcs),
        );
        queue.push(
            TargetProps::new("aidl_library", "//build/bazel/rules/aidl:library.bzl"),
            &name,
            attrs,
        );
        aidl_libraries.push(Label::new(format!(":{name}")));
    }
    if aidl_libraries.is_empty() {
        return None;
    }

    let binding_name = format!("{}_cc_aidl_library", module.name);
    let mut attrs = AttributeBundle::new();
    attrs.set_label_list(
        "deps",
        &LabelListAttribute::from_label_list(aidl_libraries),
    );
    queue.push(
        TargetProps::new("cc_aidl_library", "//build/bazel/rules/cc:cc_aidl_library.bzl"),
        &binding_name,
        attrs,
    );
    Some(LabelAttribute::from_label(Label::new(format!(
        ":{binding_name}"
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazelize_graph::props::{FilegroupProps, FlagExporterProps};
    use bazelize_graph::testing::{InMemoryGraph, StringPathResolver};
    use bazelize_graph::{LibraryProps, ModuleType, VariantProps};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn label_list_attr(labels: &[&str]) -> LabelListAttribute {
        LabelListAttribute::from_label_list(LabelList::from_labels(
            labels.iter().map(|l| Label::new(*l)).collect(),
        ))
    }

    #[test]
    fn yasm_target_collects_sources_flags_and_includes() {
        let mut module = library("libfoo");
        module.variants.flag_exporter.set(
            ConfigAxis::NoConfig,
            "",
            FlagExporterProps {
                export_include_dirs: strings(&["include"]),
                ..Default::default()
            },
        );
        let mut compiler = CompilerAttrs::default();
        compiler.asm_srcs = label_list_attr(&["fast.asm"]);
        compiler.as_flags = StringListAttribute::from_strings(strings(&["-DASM"]));
        compiler.local_includes = StringListAttribute::from_strings(strings(&["."]));

        let mut queue = TargetQueue::new();
        let reference = synthesize_yasm(&module, &compiler, &mut queue).unwrap();

        let targets = queue.into_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].props.rule_class, "yasm");
        assert_eq!(targets[0].name, "libfoo_yasm");
        assert!(targets[0].attrs.contains("include_dirs"));
        assert_eq!(reference.value.as_ref().map(|l| l.label.as_str()), Some(":libfoo_yasm"));
    }

    #[test]
    fn no_asm_sources_means_no_yasm_target() {
        let module = library("libfoo");
        let compiler = CompilerAttrs::default();
        let mut queue = TargetQueue::new();
        assert!(synthesize_yasm(&module, &compiler, &mut queue).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn arch_only_asm_sources_slot_the_reference() {
        let module = library("libfoo");
        let mut compiler = CompilerAttrs::default();
        let mut asm = LabelListAttribute::default();
        asm.set_select_value(
            ConfigAxis::Arch,
            "x86_64",
            LabelList::from_labels(vec![Label::new("fast.asm")]),
        );
        compiler.asm_srcs = asm;

        let mut queue = TargetQueue::new();
        let reference = synthesize_yasm(&module, &compiler, &mut queue).unwrap();
        assert!(reference.value.is_none());
        let slotted = reference.select_value(&ConfigAxis::Arch, "x86_64");
        assert_eq!(slotted.map(|l| l.label), Some(":libfoo_yasm".to_string()));
    }

    #[test]
    fn lex_sources_get_genlex_targets() {
        let module = library("libfoo");
        let mut compiler = CompilerAttrs::default();
        compiler.l_srcs = label_list_attr(&["scan.l"]);
        compiler.ll_srcs = label_list_attr(&["scan.ll"]);

        let mut queue = TargetQueue::new();
        let outputs = synthesize_lex(&module, &compiler, &mut queue);
        let targets = queue.into_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "libfoo_genlex_ll");
        assert_eq!(targets[1].name, "libfoo_genlex_l");
        assert!(outputs.src.value.is_some());
        assert!(outputs.c_src.value.is_some());
    }

    #[test]
    fn proto_sources_get_a_proto_and_binding_target() {
        let mut module = library("libfoo");
        module.variants.library = VariantProps::base(LibraryProps {
            export_proto_headers: Some(true),
            ..Default::default()
        });
        let mut queue = TargetQueue::new();
        let deps = synthesize_proto(&module, &label_list_attr(&["msg.proto"]), &mut queue);

        let targets = queue.into_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].props.rule_class, "proto_library");
        assert_eq!(targets[0].name, "libfoo_proto");
        assert_eq!(targets[1].props.rule_class, "cc_lite_proto_library");
        assert_eq!(targets[1].name, "libfoo_cc_proto_lite");
        assert!(deps.whole_static_lib.is_some());
        assert!(deps.implementation_whole_static_lib.is_none());
        assert!(deps.runtime_dep.is_some());
    }

    #[test]
    fn unexported_proto_headers_stay_implementation_side() {
        let module = library("libfoo");
        let mut queue = TargetQueue::new();
        let deps = synthesize_proto(&module, &label_list_attr(&["msg.proto"]), &mut queue);
        assert!(deps.whole_static_lib.is_none());
        assert!(deps.implementation_whole_static_lib.is_some());
    }

    #[test]
    fn aidl_filegroups_and_loose_files_are_combined() {
        let mut fg = bazelize_graph::Module::new("binder_aidl", "other", ModuleType::Filegroup);
        fg.filegroup = Some(FilegroupProps {
            srcs: strings(&["IFoo.aidl"]),
            ..Default::default()
        });
        let graph = InMemoryGraph::new().with(fg);
        let ctx = ConversionContext {
            graph: &graph,
            resolver: &StringPathResolver,
        };
        let module = library("libfoo");
        let srcs = LabelListAttribute::from_label_list(LabelList::from_labels(vec![
            Label::for_module(":binder_aidl", "binder_aidl"),
            Label::new("ILocal.aidl"),
        ]));

        let mut queue = TargetQueue::new();
        let binding = synthesize_aidl(&ctx, &module, &srcs, &mut queue).unwrap();

        let targets = queue.into_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].props.rule_class, "aidl_library");
        assert_eq!(targets[0].name, "libfoo_aidl_library");
        assert_eq!(targets[1].props.rule_class, "cc_aidl_library");
        assert_eq!(
            binding.value.as_ref().map(|l| l.label.as_str()),
            Some(":libfoo_cc_aidl_library")
        );
    }

    fn library(name: &str) -> Module {
        Module::new(name, "pkg", ModuleType::CcLibrary)
    }
}
