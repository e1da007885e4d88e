//! End-to-end conversion tests: module in, emitted targets out.

use bazelize_cc::{convert_module, ConversionContext};
use bazelize_graph::props::{
    CompilerProps, FilegroupProps, FlagExporterProps, LinkerProps, StaticOrSharedProps,
};
use bazelize_graph::testing::{
    CollectingDiagnostics, InMemoryGraph, RecordingSink, StringPathResolver,
};
use bazelize_graph::{AttrValue, Module, ModuleType, VariantProps};
use bazelize_select::{ConfigAxis, ANDROID_AND_IN_APEX, OS_ANDROID};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn convert(graph: &InMemoryGraph, module: &Module) -> (RecordingSink, CollectingDiagnostics) {
    let ctx = ConversionContext {
        graph,
        resolver: &StringPathResolver,
    };
    let mut sink = RecordingSink::new();
    let mut diagnostics = CollectingDiagnostics::new();
    convert_module(&ctx, module, &mut sink, &mut diagnostics);
    (sink, diagnostics)
}

fn label_list<'a>(value: &'a AttrValue) -> &'a bazelize_select::LabelListAttribute {
    match value {
        AttrValue::LabelList(attr) => attr,
        other => panic!("expected a label list, got {other:?}"),
    }
}

fn base_labels(value: &AttrValue) -> Vec<String> {
    label_list(value)
        .value
        .includes
        .iter()
        .map(|l| l.label.clone())
        .collect()
}

#[test]
fn library_sources_are_partitioned_by_language() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.compiler = VariantProps::base(CompilerProps {
        srcs: strings(&["a.cpp", "b.c", "x.proto"]),
        ..Default::default()
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());
    assert_eq!(
        sink.rule_classes(),
        vec!["proto_library", "cc_lite_proto_library", "cc_library"]
    );

    let lib = sink.target_named("libfoo").unwrap();
    assert_eq!(base_labels(lib.attrs.get("srcs").unwrap()), vec!["a.cpp"]);
    assert_eq!(base_labels(lib.attrs.get("srcs_c").unwrap()), vec!["b.c"]);
    assert_eq!(
        base_labels(lib.attrs.get("implementation_whole_archive_deps").unwrap()),
        vec![":libfoo_cc_proto_lite"]
    );

    let proto = sink.target_named("libfoo_proto").unwrap();
    assert_eq!(base_labels(proto.attrs.get("srcs").unwrap()), vec!["x.proto"]);
}

#[test]
fn stub_dependencies_become_an_apex_selector() {
    let mut stubbed = Module::new("libstubbed", "pkg", ModuleType::CcLibrary);
    stubbed.has_stubs_variants = true;
    let graph = InMemoryGraph::new().with(stubbed);

    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.linker = VariantProps::base(LinkerProps {
        shared_libs: strings(&["libstubbed"]),
        ..Default::default()
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());

    let lib = sink.target_named("libfoo").unwrap();
    let deps = label_list(lib.attrs.get("implementation_dynamic_deps").unwrap());
    assert!(deps.value.is_empty());
    let in_apex = deps.configured_value(&ConfigAxis::OsInApex, ANDROID_AND_IN_APEX);
    assert_eq!(in_apex.includes.len(), 1);
    assert_eq!(in_apex.includes[0].label, ":libstubbed_stub_libs_current");
}

#[test]
fn system_libraries_are_not_linked_twice() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.linker = VariantProps::new()
        .with(
            ConfigAxis::NoConfig,
            "",
            LinkerProps {
                shared_libs: strings(&["libc", "libutils"]),
                ..Default::default()
            },
        )
        .with(
            ConfigAxis::Os,
            OS_ANDROID,
            LinkerProps {
                shared_libs: strings(&["libc", "liblog"]),
                ..Default::default()
            },
        );

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());

    let lib = sink.target_named("libfoo").unwrap();
    let deps = label_list(lib.attrs.get("implementation_dynamic_deps").unwrap());
    assert_eq!(
        deps.value.includes.iter().map(|l| l.label.as_str()).collect::<Vec<_>>(),
        vec![":libutils"]
    );
    let android = deps.configured_value(&ConfigAxis::Os, OS_ANDROID);
    assert_eq!(
        android.includes.iter().map(|l| l.label.as_str()).collect::<Vec<_>>(),
        vec![":liblog"]
    );
    // The tri-state marker survives so the sink can tell defaults from an
    // explicit opt-out.
    assert!(label_list(lib.attrs.get("system_dynamic_deps").unwrap()).force_specify_empty_list);
}

#[test]
fn full_library_carries_both_halves() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.compiler = VariantProps::base(CompilerProps {
        srcs: strings(&["common.cpp"]),
        ..Default::default()
    });
    module.variants.shared_props = VariantProps::base(StaticOrSharedProps {
        srcs: strings(&["shared_only.cpp"]),
        ..Default::default()
    });
    module.variants.static_props = VariantProps::base(StaticOrSharedProps {
        cflags: strings(&["-DSTATIC"]),
        ..Default::default()
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());

    let lib = sink.target_named("libfoo").unwrap();
    assert_eq!(base_labels(lib.attrs.get("srcs").unwrap()), vec!["common.cpp"]);
    assert_eq!(
        base_labels(lib.attrs.get("shared_srcs").unwrap()),
        vec!["shared_only.cpp"]
    );
    assert!(lib.attrs.contains("static_copts"));
    assert!(!lib.attrs.contains("static_srcs"));
}

#[test]
fn static_library_merges_its_half() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo_static", "pkg", ModuleType::CcLibraryStatic);
    module.variants.compiler = VariantProps::base(CompilerProps {
        srcs: strings(&["common.cpp"]),
        ..Default::default()
    });
    module.variants.static_props = VariantProps::base(StaticOrSharedProps {
        srcs: strings(&["static_only.cpp"]),
        ..Default::default()
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());
    assert_eq!(sink.rule_classes(), vec!["cc_library_static"]);
    let lib = sink.target_named("libfoo_static").unwrap();
    assert_eq!(
        base_labels(lib.attrs.get("srcs").unwrap()),
        vec!["common.cpp", "static_only.cpp"]
    );
}

#[test]
fn binary_exports_nothing_and_controls_linkshared() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("tool", "pkg", ModuleType::CcBinary);
    module.variants.compiler = VariantProps::base(CompilerProps {
        srcs: strings(&["main.cpp"]),
        ..Default::default()
    });
    module.variants.linker = VariantProps::base(LinkerProps {
        static_libs: strings(&["libbase"]),
        export_static_lib_headers: strings(&["libbase"]),
        ..Default::default()
    });
    module.variants.binary = VariantProps::base(bazelize_graph::BinaryLinkerProps {
        static_executable: Some(true),
        ..Default::default()
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());
    assert_eq!(sink.rule_classes(), vec!["cc_binary"]);

    let bin = sink.target_named("tool").unwrap();
    // Export lists are meaningless for binaries.
    assert!(!bin.attrs.contains("deps"));
    assert_eq!(
        base_labels(bin.attrs.get("implementation_deps").unwrap()),
        vec![":libbase"]
    );
    assert!(matches!(
        bin.attrs.get("linkshared"),
        Some(AttrValue::PlainBool(false))
    ));
}

#[test]
fn failing_module_emits_no_targets_at_all() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.compiler = VariantProps::new()
        .with(
            ConfigAxis::NoConfig,
            "",
            CompilerProps {
                srcs: strings(&["msg.proto"]),
                ..Default::default()
            },
        )
        .with(
            ConfigAxis::Arch,
            "arm",
            CompilerProps {
                instruction_set: Some("mips16".to_string()),
                ..Default::default()
            },
        );

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(sink.targets.is_empty());
    assert_eq!(diagnostics.errors.len(), 1);
    assert_eq!(diagnostics.errors[0].0, "libfoo");
}

#[test]
fn unknown_module_types_are_skipped_silently() {
    let graph = InMemoryGraph::new();
    let module = Module::new("droiddoc", "pkg", ModuleType::Other("droiddoc".to_string()));
    let (sink, diagnostics) = convert(&graph, &module);
    assert!(sink.targets.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn filegroups_convert_through_the_same_entry_point() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("scripts", "pkg", ModuleType::Filegroup);
    module.filegroup = Some(FilegroupProps {
        srcs: strings(&["a.sh", "b.sh"]),
        ..Default::default()
    });
    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());
    assert_eq!(sink.rule_classes(), vec!["filegroup"]);
}

#[test]
fn exported_include_dirs_reach_the_target() {
    let graph = InMemoryGraph::new();
    let mut module = Module::new("libfoo", "pkg", ModuleType::CcLibrary);
    module.variants.flag_exporter = VariantProps::base(FlagExporterProps {
        export_include_dirs: strings(&["include"]),
        export_system_include_dirs: strings(&["system_include"]),
    });

    let (sink, diagnostics) = convert(&graph, &module);
    assert!(diagnostics.is_empty());
    let lib = sink.target_named("libfoo").unwrap();
    assert!(lib.attrs.contains("export_includes"));
    assert!(lib.attrs.contains("export_system_includes"));
}
