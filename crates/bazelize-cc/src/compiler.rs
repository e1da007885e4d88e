//! Compiler-side attribute extraction.

use bazelize_graph::{
    dep_labels_excludes, src_labels_excludes, CompilerProps, ConvertError, Module, Result,
};
use bazelize_select::{
    BoolAttribute, ConfigAxis, LabelList, LabelListAttribute, StringAttribute,
    StringListAttribute,
};

use crate::flags::{filter_out_std_flag, filter_out_unknown_cflags, parse_command_line_flags};
use crate::partition::{
    group_srcs_by_extension, AIDL_PARTITION, AS_PARTITION, ASM_PARTITION, C_PARTITION,
    CPP_PARTITION, L_PARTITION, LL_PARTITION, PROTO_PARTITION,
};
use crate::stdversion::resolve_cpp_std_value;
use crate::ConversionContext;

/// Exported include-path attributes, grouped because they are set as a unit
/// from the flag-exporter properties.
#[derive(Debug, Clone, Default)]
pub struct IncludeAttrs {
    pub includes: StringListAttribute,
    pub absolute_includes: StringListAttribute,
    pub system_includes: StringListAttribute,
}

impl IncludeAttrs {
    pub fn deduplicate_axes_from_base(&mut self) {
        self.includes.deduplicate_axes_from_base();
        self.absolute_includes.deduplicate_axes_from_base();
        self.system_includes.deduplicate_axes_from_base();
    }
}

/// Compiler-facing attributes of the target under construction.
///
/// Extraction happens slot by slot ([`CompilerAttrs::extract`]); the
/// cross-slot steps (source partitioning, include dedup) run once in
/// [`CompilerAttrs::finalize`].
#[derive(Debug, Clone, Default)]
pub struct CompilerAttrs {
    /// Until finalize: all sources. After: the C++ bucket only.
    pub srcs: LabelListAttribute,
    pub c_srcs: LabelListAttribute,
    pub as_srcs: LabelListAttribute,
    pub asm_srcs: LabelListAttribute,
    pub l_srcs: LabelListAttribute,
    pub ll_srcs: LabelListAttribute,
    pub proto_srcs: LabelListAttribute,
    pub aidl_srcs: LabelListAttribute,
    pub hdrs: LabelListAttribute,

    pub copts: StringListAttribute,
    pub as_flags: StringListAttribute,
    pub conly_flags: StringListAttribute,
    pub cpp_flags: StringListAttribute,
    pub lexopts: StringListAttribute,

    pub local_includes: StringListAttribute,
    pub absolute_includes: StringListAttribute,
    /// Exported includes, filled from the flag-exporter properties by the
    /// library layer.
    pub includes: IncludeAttrs,

    pub c_std: Option<String>,
    pub cpp_std: Option<String>,
    pub stl: Option<String>,
    pub rtti: BoolAttribute,
    pub features: StringListAttribute,
    pub suffix: StringAttribute,

    pub stubs_symbol_file: Option<String>,
    pub stubs_versions: StringListAttribute,
}

/// Sources declared for one slot, or `None` when the slot declares nothing
/// sources-related (so the attribute slot stays unset and inherits).
fn parse_srcs(ctx: &ConversionContext<'_>, props: &CompilerProps) -> Option<LabelList> {
    let mut any = false;
    let mut all = src_labels_excludes(ctx.resolver, &props.srcs, &props.exclude_srcs);
    any |= !props.srcs.is_empty() || !props.exclude_srcs.is_empty();
    let generated = dep_labels_excludes(
        ctx.resolver,
        &props.generated_sources,
        &props.exclude_generated_sources,
    );
    any |= !props.generated_sources.is_empty() || !props.exclude_generated_sources.is_empty();
    all.append(generated);
    any.then_some(all)
}

impl CompilerAttrs {
    /// Fold one variant's compiler properties into the attribute slots.
    pub fn extract(
        &mut self,
        ctx: &ConversionContext<'_>,
        module_name: &str,
        axis: &ConfigAxis,
        config: &str,
        props: &CompilerProps,
    ) -> Result<()> {
        if let Some(srcs) = parse_srcs(ctx, props) {
            self.srcs.set_select_value(axis.clone(), config, srcs);
        }

        let mut local_includes = props.local_include_dirs.clone();
        if axis.is_no_config() {
            let (c_std, cpp_std) = resolve_cpp_std_value(
                props.c_std.as_deref(),
                props.cpp_std.as_deref(),
                props.gnu_extensions,
            );
            self.c_std = c_std;
            self.cpp_std = cpp_std;
            // The module directory itself is an include root unless opted
            // out.
            if props.include_build_directory.unwrap_or(true) {
                local_includes.push(".".to_string());
            }
        }
        self.local_includes
            .set_select_value(axis.clone(), config, local_includes);
        self.absolute_includes
            .set_select_value(axis.clone(), config, props.include_dirs.clone());

        match props.instruction_set.as_deref() {
            None | Some("") | Some("thumb") => {}
            Some("arm") => self.features.set_select_value(
                axis.clone(),
                config,
                vec!["arm_isa_arm".to_string(), "-arm_isa_thumb".to_string()],
            ),
            Some(other) => {
                return Err(ConvertError::unsupported(
                    module_name,
                    format!("instruction_set '{other}' is not supported"),
                ));
            }
        }

        self.copts.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(
                &props.cflags,
                true,
                &[filter_out_std_flag, filter_out_unknown_cflags],
            ),
        );
        self.as_flags.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.asflags, true, &[]),
        );
        self.conly_flags.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.conlyflags, true, &[filter_out_unknown_cflags]),
        );
        self.cpp_flags.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.cppflags, true, &[filter_out_unknown_cflags]),
        );
        if let Some(lex) = &props.lex {
            self.lexopts
                .set_select_value(axis.clone(), config, lex.flags.clone());
        }
        self.rtti.set_select_value(axis.clone(), config, props.rtti);
        Ok(())
    }

    /// Fold the stl property groups into the single stl value. All variants
    /// of a module must agree.
    pub fn convert_stl(&mut self, module: &Module) -> Result<()> {
        for (_, _, props) in module.variants.stl.iter() {
            let Some(stl) = &props.stl else { continue };
            match &self.stl {
                None => self.stl = Some(stl.clone()),
                Some(existing) if existing == stl => {}
                Some(existing) => {
                    return Err(ConvertError::conflict(
                        &module.name,
                        format!("multiple stl values for one module: '{existing}' and '{stl}'"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Fold product-variable flag contributions in, one slot per variable on
    /// its own axis. `%s` placeholders become `$(VAR)` make-variable
    /// references.
    pub fn convert_product_variables(&mut self, module: &Module) -> Result<()> {
        for (prop, attr) in [
            ("cflags", &mut self.copts),
            ("asflags", &mut self.as_flags),
            ("cppflags", &mut self.cpp_flags),
        ] {
            let Some(vars) = module.product_variables.get(prop) else {
                continue;
            };
            for (var, value) in vars {
                let Some(flags) = value.as_string_list() else {
                    return Err(ConvertError::type_mismatch(&module.name, prop));
                };
                let substituted: Vec<String> = flags
                    .iter()
                    .map(|f| f.replace("%s", &format!("$({})", var.name)))
                    .collect();
                attr.set_select_value(var.axis(), &var.select_key(), substituted);
            }
        }
        Ok(())
    }

    /// Resolve source excludes, split sources into the language buckets, and
    /// fold implementation-only generated headers into every non-empty
    /// bucket so compilation of each language sees them.
    pub fn finalize(
        &mut self,
        ctx: &ConversionContext<'_>,
        implementation_hdrs: &LabelListAttribute,
    ) -> Result<()> {
        self.srcs.resolve_excludes();
        let mut partitioned = group_srcs_by_extension(ctx.graph, &self.srcs)?;

        // Captured before the header fold: proto and aidl sources feed
        // submodules that take headers through their own dependencies.
        self.proto_srcs = partitioned
            .get(PROTO_PARTITION)
            .cloned()
            .unwrap_or_default();
        self.aidl_srcs = partitioned.get(AIDL_PARTITION).cloned().unwrap_or_default();

        for (_, bucket) in partitioned.iter_mut() {
            if !bucket.is_empty() {
                bucket.append(implementation_hdrs);
            }
        }

        let mut take =
            |name: &str| -> LabelListAttribute { partitioned.shift_remove(name).unwrap_or_default() };
        self.c_srcs = take(C_PARTITION);
        self.as_srcs = take(AS_PARTITION);
        self.asm_srcs = take(ASM_PARTITION);
        self.l_srcs = take(L_PARTITION);
        self.ll_srcs = take(LL_PARTITION);
        self.srcs = take(CPP_PARTITION);

        self.local_includes.deduplicate_axes_from_base();
        self.absolute_includes.deduplicate_axes_from_base();
        Ok(())
    }
}
