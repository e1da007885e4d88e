//! Per-module-kind property parsing and base-attribute assembly.
//!
//! [`parse_base_props`] drives one walk over the union of (axis, config)
//! slots the compiler, linker, and library property groups declare, feeding
//! the [`CompilerAttrs`] and [`LinkerAttrs`] extractors slot by slot, then
//! runs the cross-slot finalization and submodule synthesis. The kind
//! specific parsers (static/shared halves, prebuilts, binaries) are thin on
//! top of it.

use rustc_hash::FxHashSet;

use bazelize_graph::{
    dep_labels, src_labels_excludes, ConvertError, Module, Result, TargetQueue,
};
use bazelize_select::{
    first_unique_strings, BoolAttribute, ConfigAxis, LabelAttribute, LabelList,
    LabelListAttribute, StringAttribute, StringListAttribute,
};

use crate::compiler::{CompilerAttrs, IncludeAttrs};
use crate::deps::{
    partition_exported_and_implementation, shared_dep_labels, static_dep_labels,
    whole_archive_dep_labels,
};
use crate::flags::{filter_out_std_flag, parse_command_line_flags};
use crate::linker::LinkerAttrs;
use crate::partition::{
    group_srcs_by_extension, AS_PARTITION, C_PARTITION, CPP_PARTITION, PROTO_PARTITION,
};
use crate::submodule::{synthesize_aidl, synthesize_lex, synthesize_proto, synthesize_yasm};
use crate::ConversionContext;

/// Everything shared by libraries, binaries, and prebuilts.
#[derive(Debug, Clone, Default)]
pub struct BaseAttrs {
    pub compiler: CompilerAttrs,
    pub linker: LinkerAttrs,
    /// Merged feature toggles from both sides.
    pub features: StringListAttribute,
    /// The protobuf runtime, when proto sources were synthesized.
    pub proto_runtime_dep: Option<LabelAttribute>,
}

/// The package a label points into, with whether the reference is
/// package-absolute. A bare `:name` reference maps to the current package.
fn package_from_label(label: &str) -> Option<(&str, bool)> {
    let (pkg, _) = label.split_once(':')?;
    if pkg.is_empty() {
        Some((".", false))
    } else {
        Some((pkg.strip_prefix("//").unwrap_or(pkg), true))
    }
}

/// Include roots implied by generated-header references: the package of
/// each referenced target, split into module-relative and source-root
/// relative dirs.
fn includes_from_label_list(headers: &LabelList) -> (Vec<String>, Vec<String>) {
    let mut relative = Vec::new();
    let mut absolute = Vec::new();
    for header in &headers.includes {
        match package_from_label(&header.label) {
            Some((pkg, true)) => absolute.push(pkg.to_string()),
            Some((pkg, false)) => relative.push(pkg.to_string()),
            None => {}
        }
    }
    (relative, absolute)
}

fn merge_unique(into: &mut StringListAttribute, axis: &ConfigAxis, config: &str, add: Vec<String>) {
    if add.is_empty() {
        return;
    }
    let mut merged = into.configured_value(axis, config);
    merged.extend(add);
    into.set_select_value(axis.clone(), config, first_unique_strings(&merged));
}

/// Walk every declared (axis, config) slot of the module's base property
/// groups, extract attributes, and run finalization plus submodule
/// synthesis.
pub fn parse_base_props(
    ctx: &ConversionContext<'_>,
    module: &Module,
    queue: &mut TargetQueue,
) -> Result<BaseAttrs> {
    let mut compiler = CompilerAttrs::default();
    let mut linker = LinkerAttrs::default();
    let mut implementation_hdrs = LabelListAttribute::default();
    let is_binary = module.module_type.is_binary();

    for (axis, configs) in module.base_axis_configs() {
        for config in configs {
            let mut generated_hdrs: Vec<String> = Vec::new();
            if let Some(props) = module.variants.compiler.get(&axis, &config) {
                generated_hdrs = props.generated_headers.clone();
                compiler.extract(ctx, &module.name, &axis, &config, props)?;
            }
            let mut exported_hdrs: Vec<String> = Vec::new();
            if let Some(props) = module.variants.linker.get(&axis, &config) {
                exported_hdrs = props.export_generated_headers.clone();
                linker.extract(ctx, module, is_binary, &axis, &config, props)?;
            }

            let headers = partition_exported_and_implementation(
                !is_binary,
                &generated_hdrs,
                &exported_hdrs,
                |names| dep_labels(ctx.resolver, names),
            );
            compiler
                .hdrs
                .set_select_value(axis.clone(), &config, headers.export.clone());
            implementation_hdrs.set_select_value(
                axis.clone(),
                &config,
                headers.implementation.clone(),
            );

            // Generated headers land in their target's package; surface the
            // matching include roots so `#include` of them resolves.
            let (relative, absolute) = includes_from_label_list(&headers.export);
            merge_unique(&mut compiler.includes.includes, &axis, &config, relative);
            merge_unique(
                &mut compiler.includes.absolute_includes,
                &axis,
                &config,
                absolute,
            );
            let (relative, absolute) = includes_from_label_list(&headers.implementation);
            merge_unique(&mut compiler.local_includes, &axis, &config, relative);
            merge_unique(&mut compiler.absolute_includes, &axis, &config, absolute);

            if let Some(props) = module.variants.library.get(&axis, &config) {
                if axis.is_no_config() {
                    compiler.stubs_symbol_file = props.stubs.symbol_file.clone();
                    if !props.stubs.versions.is_empty() {
                        compiler.stubs_versions.set_select_value(
                            ConfigAxis::NoConfig,
                            "",
                            props.stubs.versions.clone(),
                        );
                    }
                }
                if let Some(suffix) = &props.suffix {
                    compiler
                        .suffix
                        .set_select_value(axis.clone(), &config, suffix.clone());
                }
            }
        }
    }

    compiler.convert_stl(module)?;
    linker.convert_strip_props(module);
    if module.native_coverage == Some(false) {
        linker
            .features
            .append(&StringListAttribute::from_strings(vec![
                "-coverage".to_string()
            ]));
    }
    compiler.convert_product_variables(module)?;
    linker.convert_product_variables(ctx, module)?;

    compiler.finalize(ctx, &implementation_hdrs)?;
    linker.finalize(ctx);

    if let Some(yasm) = synthesize_yasm(module, &compiler, queue) {
        compiler.srcs.add(&yasm);
    }
    let proto = synthesize_proto(module, &compiler.proto_srcs, queue);
    if let Some(dep) = &proto.whole_static_lib {
        linker.whole_archive_deps.add(dep);
    }
    if let Some(dep) = &proto.implementation_whole_static_lib {
        linker.implementation_whole_archive_deps.add(dep);
    }
    if let Some(binding) = synthesize_aidl(ctx, module, &compiler.aidl_srcs, queue) {
        let exports_headers = module
            .variants
            .library
            .get(&ConfigAxis::NoConfig, "")
            .and_then(|p| p.export_aidl_headers)
            .unwrap_or(false);
        if exports_headers {
            linker.whole_archive_deps.add(&binding);
        } else {
            linker.implementation_whole_archive_deps.add(&binding);
        }
    }
    let lex = synthesize_lex(module, &compiler, queue);
    compiler.srcs.add(&lex.src);
    compiler.c_srcs.add(&lex.c_src);

    let mut features = compiler.features.clone();
    features.append(&linker.features);
    features.deduplicate_axes_from_base();

    Ok(BaseAttrs {
        compiler,
        linker,
        features,
        proto_runtime_dep: proto.runtime_dep,
    })
}

/// Exported include paths from the flag-exporter properties, merged over
/// the generated-header contributions already collected.
pub fn parse_exported_includes(module: &Module, existing: &IncludeAttrs) -> IncludeAttrs {
    let mut exported = existing.clone();
    for (axis, config, props) in module.variants.flag_exporter.iter() {
        merge_unique(
            &mut exported.includes,
            axis,
            config,
            props.export_include_dirs.clone(),
        );
        merge_unique(
            &mut exported.system_includes,
            axis,
            config,
            props.export_system_include_dirs.clone(),
        );
    }
    exported.deduplicate_axes_from_base();
    exported
}

/// Attributes of one half (static or shared) of a full library.
#[derive(Debug, Clone, Default)]
pub struct StaticOrSharedAttrs {
    pub srcs: LabelListAttribute,
    pub srcs_c: LabelListAttribute,
    pub srcs_as: LabelListAttribute,
    pub copts: StringListAttribute,
    pub deps: LabelListAttribute,
    pub implementation_deps: LabelListAttribute,
    pub dynamic_deps: LabelListAttribute,
    pub implementation_dynamic_deps: LabelListAttribute,
    pub whole_archive_deps: LabelListAttribute,
    pub system_dynamic_deps: LabelListAttribute,
    pub enabled: BoolAttribute,
}

pub fn parse_static_or_shared_props(
    ctx: &ConversionContext<'_>,
    module: &Module,
    is_static: bool,
) -> Result<StaticOrSharedAttrs> {
    let mut attrs = StaticOrSharedAttrs::default();
    attrs.system_dynamic_deps.force_specify_empty_list = true;

    let variants = if is_static {
        &module.variants.static_props
    } else {
        &module.variants.shared_props
    };
    for (axis, config, props) in variants.iter() {
        attrs.srcs.set_select_value(
            axis.clone(),
            config,
            src_labels_excludes(ctx.resolver, &props.srcs, &[]),
        );
        attrs.copts.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.cflags, true, &[filter_out_std_flag]),
        );

        let static_split = partition_exported_and_implementation(
            true,
            &first_unique_strings(&props.static_libs),
            &props.export_static_lib_headers,
            |names| static_dep_labels(ctx, names),
        );
        attrs
            .deps
            .set_select_value(axis.clone(), config, static_split.export);
        attrs
            .implementation_deps
            .set_select_value(axis.clone(), config, static_split.implementation);

        let shared_split = partition_exported_and_implementation(
            true,
            &first_unique_strings(&props.shared_libs),
            &props.export_shared_lib_headers,
            |names| shared_dep_labels(ctx, names),
        );
        attrs
            .dynamic_deps
            .set_select_value(axis.clone(), config, shared_split.export);
        attrs
            .implementation_dynamic_deps
            .set_select_value(axis.clone(), config, shared_split.implementation);

        attrs.whole_archive_deps.set_select_value(
            axis.clone(),
            config,
            whole_archive_dep_labels(ctx, &first_unique_strings(&props.whole_static_libs)),
        );
        if let Some(system) = &props.system_shared_libs {
            attrs.system_dynamic_deps.set_select_value(
                axis.clone(),
                config,
                shared_dep_labels(ctx, &first_unique_strings(system)),
            );
        }
        attrs
            .enabled
            .set_select_value(axis.clone(), config, props.enabled);
    }

    attrs.srcs.resolve_excludes();
    let mut partitioned = group_srcs_by_extension(ctx.graph, &attrs.srcs)?;
    if !partitioned[PROTO_PARTITION].is_empty() {
        let half = if is_static { "static" } else { "shared" };
        return Err(ConvertError::unsupported(
            &module.name,
            format!("proto sources under {half}-only properties are not supported"),
        ));
    }
    attrs.srcs_c = partitioned.shift_remove(C_PARTITION).unwrap_or_default();
    attrs.srcs_as = partitioned.shift_remove(AS_PARTITION).unwrap_or_default();
    attrs.srcs = partitioned.shift_remove(CPP_PARTITION).unwrap_or_default();
    Ok(attrs)
}

/// Attributes specific to prebuilt libraries.
#[derive(Debug, Clone, Default)]
pub struct PrebuiltAttrs {
    /// The prebuilt artifact, at most one per slot.
    pub src: LabelAttribute,
    pub enabled: BoolAttribute,
}

pub fn parse_prebuilt_props(
    ctx: &ConversionContext<'_>,
    module: &Module,
) -> Result<PrebuiltAttrs> {
    let mut attrs = PrebuiltAttrs::default();
    let mut occupied: FxHashSet<(ConfigAxis, String)> = FxHashSet::default();

    let mut place = |attrs: &mut PrebuiltAttrs,
                     axis: &ConfigAxis,
                     config: &str,
                     srcs: &[String]|
     -> Result<()> {
        match srcs {
            [] => Ok(()),
            [src] => {
                if !occupied.insert((axis.clone(), config.to_string())) {
                    return Err(ConvertError::conflict(
                        &module.name,
                        format!("multiple prebuilt srcs for the {axis} '{config}' variant"),
                    ));
                }
                attrs.src.set_select_value(
                    axis.clone(),
                    config,
                    ctx.resolver.label_for_module_src(src),
                );
                Ok(())
            }
            _ => Err(ConvertError::unsupported(
                &module.name,
                format!("expected at most one prebuilt src for the {axis} '{config}' variant"),
            )),
        }
    };

    for (axis, config, props) in module.variants.prebuilt.iter() {
        place(&mut attrs, axis, config, &props.srcs)?;
    }
    for variants in [&module.variants.static_props, &module.variants.shared_props] {
        for (axis, config, props) in variants.iter() {
            place(&mut attrs, axis, config, &props.srcs)?;
            attrs
                .enabled
                .set_select_value(axis.clone(), config, props.enabled);
        }
    }
    Ok(attrs)
}

/// Attributes specific to binaries.
#[derive(Debug, Clone, Default)]
pub struct BinaryAttrs {
    /// Set to false for static executables; unset otherwise.
    pub link_shared: Option<bool>,
    pub suffix: StringAttribute,
}

pub fn parse_binary_linker_props(module: &Module) -> Result<BinaryAttrs> {
    let mut attrs = BinaryAttrs::default();
    for (axis, config, props) in module.variants.binary.iter() {
        if axis.is_no_config() {
            if props.static_executable.unwrap_or(false) {
                attrs.link_shared = Some(false);
            }
        } else if props.static_executable.is_some() {
            return Err(ConvertError::conflict(
                &module.name,
                "static_executable is not supported for arch variants",
            ));
        }
        if let Some(suffix) = &props.suffix {
            attrs
                .suffix
                .set_select_value(axis.clone(), config, suffix.clone());
        }
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazelize_graph::props::{
        BinaryLinkerProps, CompilerProps, LinkerProps, PrebuiltLinkerProps, StaticOrSharedProps,
    };
    use bazelize_graph::testing::{InMemoryGraph, StringPathResolver};
    use bazelize_graph::{ModuleType, VariantProps};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn labels(list: &LabelList) -> Vec<&str> {
        list.includes.iter().map(|l| l.label.as_str()).collect()
    }

    fn ctx_over(graph: &InMemoryGraph) -> ConversionContext<'_> {
        ConversionContext {
            graph,
            resolver: &StringPathResolver,
        }
    }

    #[test]
    fn package_parsing() {
        assert_eq!(package_from_label(":gen"), Some((".", false)));
        assert_eq!(package_from_label("//a/b:gen"), Some(("a/b", true)));
        assert_eq!(package_from_label("plain.h"), None);
    }

    #[test]
    fn generated_headers_split_and_feed_includes() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.variants.compiler = VariantProps::base(CompilerProps {
            generated_headers: strings(&["gen_exported", "gen_private"]),
            ..Default::default()
        });
        module.variants.linker = VariantProps::base(LinkerProps {
            export_generated_headers: strings(&["gen_exported"]),
            ..Default::default()
        });

        let mut queue = TargetQueue::new();
        let base = parse_base_props(&ctx, &module, &mut queue).unwrap();
        assert_eq!(labels(&base.compiler.hdrs.value), vec![":gen_exported"]);
        // Both header packages surface as include roots.
        assert!(base.compiler.includes.includes.value.contains(&".".to_string()));
        assert!(base.compiler.local_includes.value.contains(&".".to_string()));
    }

    #[test]
    fn binaries_keep_all_generated_headers_private() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("bin", "pkg", ModuleType::CcBinary);
        module.variants.compiler = VariantProps::base(CompilerProps {
            srcs: strings(&["main.cpp"]),
            generated_headers: strings(&["gen_exported"]),
            ..Default::default()
        });
        module.variants.linker = VariantProps::base(LinkerProps {
            export_generated_headers: strings(&["gen_exported"]),
            ..Default::default()
        });

        let mut queue = TargetQueue::new();
        let base = parse_base_props(&ctx, &module, &mut queue).unwrap();
        assert!(base.compiler.hdrs.is_empty());
        // The private header is folded into the non-empty source bucket.
        assert_eq!(
            labels(&base.compiler.srcs.value),
            vec!["main.cpp", ":gen_exported"]
        );
    }

    #[test]
    fn coverage_opt_out_becomes_a_feature() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.native_coverage = Some(false);
        let mut queue = TargetQueue::new();
        let base = parse_base_props(&ctx, &module, &mut queue).unwrap();
        assert_eq!(base.features.value, strings(&["-coverage"]));
    }

    #[test]
    fn stubs_are_read_from_the_unconditional_library_slot() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.variants.library = VariantProps::base(bazelize_graph::LibraryProps {
            stubs: bazelize_graph::StubsProps {
                symbol_file: Some("libfoo.map.txt".to_string()),
                versions: strings(&["29", "30"]),
            },
            ..Default::default()
        });
        let mut queue = TargetQueue::new();
        let base = parse_base_props(&ctx, &module, &mut queue).unwrap();
        assert_eq!(
            base.compiler.stubs_symbol_file.as_deref(),
            Some("libfoo.map.txt")
        );
        assert_eq!(base.compiler.stubs_versions.value, strings(&["29", "30"]));
    }

    #[test]
    fn proto_sources_synthesize_submodules_and_wire_deps() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.variants.compiler = VariantProps::base(CompilerProps {
            srcs: strings(&["a.cpp", "msg.proto"]),
            ..Default::default()
        });

        let mut queue = TargetQueue::new();
        let base = parse_base_props(&ctx, &module, &mut queue).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(
            labels(&base.linker.implementation_whole_archive_deps.value),
            vec![":libfoo_cc_proto_lite"]
        );
        assert!(base.proto_runtime_dep.is_some());
    }

    #[test]
    fn static_only_proto_sources_are_rejected() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.variants.static_props = VariantProps::base(StaticOrSharedProps {
            srcs: strings(&["msg.proto"]),
            ..Default::default()
        });
        let err = parse_static_or_shared_props(&ctx, &module, true).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedPattern { .. }));
    }

    #[test]
    fn static_half_sources_are_partitioned() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module = bazelize_graph::Module::new("libfoo", "pkg", ModuleType::CcLibrary);
        module.variants.static_props = VariantProps::base(StaticOrSharedProps {
            srcs: strings(&["only_static.cpp", "impl.c"]),
            whole_static_libs: strings(&["libwhole"]),
            ..Default::default()
        });
        let attrs = parse_static_or_shared_props(&ctx, &module, true).unwrap();
        assert_eq!(labels(&attrs.srcs.value), vec!["only_static.cpp"]);
        assert_eq!(labels(&attrs.srcs_c.value), vec!["impl.c"]);
        assert_eq!(labels(&attrs.whole_archive_deps.value), vec![":libwhole"]);
    }

    #[test]
    fn prebuilt_takes_at_most_one_src_per_slot() {
        let graph = InMemoryGraph::new();
        let ctx = ctx_over(&graph);
        let mut module =
            bazelize_graph::Module::new("libpre", "pkg", ModuleType::CcPrebuiltLibrary);
        module.variants.prebuilt = VariantProps::base(PrebuiltLinkerProps {
            srcs: strings(&["libpre.a"]),
        });
        let attrs = parse_prebuilt_props(&ctx, &module).unwrap();
        assert_eq!(
            attrs.src.value.as_ref().map(|l| l.label.as_str()),
            Some("libpre.a")
        );

        module.variants.prebuilt = VariantProps::base(PrebuiltLinkerProps {
            srcs: strings(&["libpre.a", "libpre2.a"]),
        });
        let err = parse_prebuilt_props(&ctx, &module).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedPattern { .. }));
    }

    #[test]
    fn static_executable_disables_linkshared() {
        let mut module = bazelize_graph::Module::new("bin", "pkg", ModuleType::CcBinary);
        module.variants.binary = VariantProps::base(BinaryLinkerProps {
            static_executable: Some(true),
            ..Default::default()
        });
        let attrs = parse_binary_linker_props(&module).unwrap();
        assert_eq!(attrs.link_shared, Some(false));
    }

    #[test]
    fn arch_variant_static_executable_is_rejected() {
        let mut module = bazelize_graph::Module::new("bin", "pkg", ModuleType::CcBinary);
        module.variants.binary = VariantProps::new().with(
            ConfigAxis::Arch,
            "arm64",
            BinaryLinkerProps {
                static_executable: Some(true),
                ..Default::default()
            },
        );
        let err = parse_binary_linker_props(&module).unwrap_err();
        assert!(matches!(err, ConvertError::ConfigurationConflict { .. }));
    }
}
