//! Linker-side attribute extraction.
//!
//! The five dependency kinds (static, whole-archive, shared, header, system)
//! each get their own attribute pair split by export policy. Two cross-slot
//! rules run in [`LinkerAttrs::finalize`]: the system-library default fixup
//! (a library that never sets `system_shared_libs` but names libc as an
//! ordinary shared dep must not link it twice) and exclude resolution.

use std::collections::BTreeSet;

use bazelize_graph::{dep_labels_excludes, ConvertError, LinkerProps, Module, Result};
use bazelize_select::{
    first_unique_strings, remove_list_from_list, BoolAttribute, ConfigAxis, Label, LabelList,
    LabelListAttribute, StringListAttribute, ANDROID_AND_IN_APEX, ANDROID_AND_NON_APEX,
    CONDITIONS_DEFAULT, OS_ANDROID, OS_LINUX_BIONIC,
};

use crate::deps::{
    partition_exported_and_implementation, partition_exported_and_implementation_excludes,
    shared_dep_labels, shared_dep_labels_excludes, static_dep_labels_excludes,
    whole_archive_dep_labels_excludes, STUB_SUFFIX,
};
use crate::flags::{filter_out_unknown_cflags, parse_command_line_flags};
use crate::ConversionContext;

/// Libraries every module links against implicitly unless it opts out.
pub const SYSTEM_SHARED_LIBS: &[&str] = &["libc", "libm", "libdl"];

#[derive(Debug, Clone, Default)]
pub struct LinkerAttrs {
    pub deps: LabelListAttribute,
    pub implementation_deps: LabelListAttribute,
    pub dynamic_deps: LabelListAttribute,
    pub implementation_dynamic_deps: LabelListAttribute,
    pub whole_archive_deps: LabelListAttribute,
    pub implementation_whole_archive_deps: LabelListAttribute,
    pub system_dynamic_deps: LabelListAttribute,
    pub runtime_deps: LabelListAttribute,
    pub additional_linker_inputs: LabelListAttribute,

    pub linkopts: StringListAttribute,
    pub features: StringListAttribute,

    pub link_crt: BoolAttribute,
    pub use_libcrt: BoolAttribute,
    pub use_version_lib: BoolAttribute,

    pub strip_keep_symbols: BoolAttribute,
    pub strip_keep_symbols_and_debug_frame: BoolAttribute,
    pub strip_keep_symbols_list: StringListAttribute,
    pub strip_all: BoolAttribute,
    pub strip_none: BoolAttribute,

    /// System libraries also named as ordinary shared deps somewhere in the
    /// module; resolved against the default in [`Self::finalize`].
    used_system_dynamic_dep_as_dynamic_dep: BTreeSet<String>,
    /// The module set `system_shared_libs` on some variant, taking control
    /// of the system-library list away from the platform default.
    explicit_system_deps: bool,
}

impl LinkerAttrs {
    /// Fold one variant's linker properties into the attribute slots.
    pub fn extract(
        &mut self,
        ctx: &ConversionContext<'_>,
        module: &Module,
        is_binary: bool,
        axis: &ConfigAxis,
        config: &str,
        props: &LinkerProps,
    ) -> Result<()> {
        let mut axis_features: Vec<String> = Vec::new();
        let exports_deps = !is_binary;

        let whole_static_libs = first_unique_strings(&props.whole_static_libs);
        self.whole_archive_deps.set_select_value(
            axis.clone(),
            config,
            whole_archive_dep_labels_excludes(ctx, &whole_static_libs, &props.exclude_static_libs),
        );

        // Whole-archive wins when a library is named in both lists.
        let static_libs =
            first_unique_strings(&remove_list_from_list(&props.static_libs, &whole_static_libs));
        let static_split = partition_exported_and_implementation_excludes(
            exports_deps,
            &static_libs,
            &props.exclude_static_libs,
            &props.export_static_lib_headers,
            |names, excludes| static_dep_labels_excludes(ctx, names, excludes),
        );
        let header_libs = first_unique_strings(&props.header_libs);
        let mut header_split = partition_exported_and_implementation(
            exports_deps,
            &header_libs,
            &props.export_header_lib_headers,
            |names| shared_dep_labels(ctx, names),
        );
        header_split.export.append(static_split.export);
        self.deps
            .set_select_value(axis.clone(), config, header_split.export);
        header_split.implementation.append(static_split.implementation);
        self.implementation_deps
            .set_select_value(axis.clone(), config, header_split.implementation);

        if let Some(system) = &props.system_shared_libs {
            self.explicit_system_deps = true;
            self.system_dynamic_deps.set_select_value(
                axis.clone(),
                config,
                shared_dep_labels(ctx, &first_unique_strings(system)),
            );
        }

        let shared_libs = first_unique_strings(&props.shared_libs);
        for lib in &shared_libs {
            if SYSTEM_SHARED_LIBS.contains(&lib.as_str())
                && !props.exclude_shared_libs.contains(lib)
            {
                self.used_system_dynamic_dep_as_dynamic_dep
                    .insert(lib.clone());
            }
        }
        let shared_split = partition_exported_and_implementation_excludes(
            exports_deps,
            &shared_libs,
            &props.exclude_shared_libs,
            &props.export_shared_lib_headers,
            |names, excludes| shared_dep_labels_excludes(ctx, names, excludes),
        );
        self.dynamic_deps
            .set_select_value(axis.clone(), config, shared_split.export);
        self.implementation_dynamic_deps.set_select_value(
            axis.clone(),
            config,
            shared_split.implementation.clone(),
        );
        self.substitute_stub_deps(ctx, axis, config, &shared_split.implementation);

        if !props.pack_relocations.unwrap_or(true) {
            axis_features.push("disable_pack_relocations".to_string());
        }
        if props.allow_undefined_symbols.unwrap_or(false) {
            axis_features.push("-no_undefined_symbols".to_string());
        }

        let mut linker_flags = props.ldflags.clone();
        if is_binary && linker_flags.iter().any(|f| f == "-shared") {
            axis_features.push("-static_flag".to_string());
        }
        let mut linker_inputs = LabelList::new();
        if let Some(script) = &props.version_script {
            let label = ctx.resolver.label_for_module_src(script);
            linker_flags.push(format!("-Wl,--version-script,$(location {})", label.label));
            linker_inputs.push(label);
        }
        if let Some(list) = &props.dynamic_list {
            let label = ctx.resolver.label_for_module_src(list);
            linker_flags.push(format!("-Wl,--dynamic-list,$(location {})", label.label));
            linker_inputs.push(label);
        }
        if !linker_inputs.is_empty() {
            self.additional_linker_inputs
                .set_select_value(axis.clone(), config, linker_inputs);
        }
        self.linkopts.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&linker_flags, false, &[filter_out_unknown_cflags]),
        );

        if let Some(no_libcrt) = props.no_libcrt {
            self.use_libcrt
                .set_select_value(axis.clone(), config, Some(!no_libcrt));
        }
        if let Some(nocrt) = props.nocrt {
            if axis.is_no_config() {
                self.link_crt
                    .set_select_value(ConfigAxis::NoConfig, "", Some(!nocrt));
            } else if *axis == ConfigAxis::Arch {
                return Err(ConvertError::conflict(
                    &module.name,
                    "nocrt is not supported for arch variants",
                ));
            }
        }
        if axis.is_no_config()
            && let Some(use_version_lib) = props.use_version_lib
        {
            self.use_version_lib
                .set_select_value(ConfigAxis::NoConfig, "", Some(use_version_lib));
        }

        if !axis_features.is_empty() {
            self.features
                .set_select_value(axis.clone(), config, axis_features);
        }

        let runtime =
            dep_labels_excludes(ctx.resolver, &props.runtime_libs, &props.exclude_runtime_libs);
        if !runtime.is_empty() {
            self.runtime_deps.set_select_value(axis.clone(), config, runtime);
        }
        Ok(())
    }

    /// Replace implementation-side shared deps on stub-publishing libraries
    /// with an APEX-membership selector: inside an APEX the dependent binds
    /// against the stub variant, outside it against the real library.
    fn substitute_stub_deps(
        &mut self,
        ctx: &ConversionContext<'_>,
        axis: &ConfigAxis,
        config: &str,
        implementation: &LabelList,
    ) {
        let applies = axis.is_no_config() || (*axis == ConfigAxis::Os && config == OS_ANDROID);
        if !applies {
            return;
        }
        let with_stubs: Vec<Label> = implementation
            .includes
            .iter()
            .filter(|l| {
                ctx.graph
                    .module_from_name(l.module_name())
                    .is_some_and(|m| m.has_stubs_variants)
            })
            .cloned()
            .collect();
        if with_stubs.is_empty() {
            return;
        }

        let plain = LabelList::from_labels(with_stubs.clone());
        self.implementation_dynamic_deps.set_select_value(
            axis.clone(),
            config,
            implementation.subtract(&plain),
        );

        let stubs: Vec<Label> = with_stubs
            .iter()
            .map(|l| {
                let mut stub = l.clone();
                stub.label = format!("{}{}", l.label, STUB_SUFFIX);
                stub
            })
            .collect();

        let mut in_apex = self
            .implementation_dynamic_deps
            .configured_value(&ConfigAxis::OsInApex, ANDROID_AND_IN_APEX);
        in_apex.append(LabelList::from_labels(stubs));
        self.implementation_dynamic_deps.set_select_value(
            ConfigAxis::OsInApex,
            ANDROID_AND_IN_APEX,
            in_apex,
        );

        let mut non_apex = self
            .implementation_dynamic_deps
            .configured_value(&ConfigAxis::OsInApex, ANDROID_AND_NON_APEX);
        non_apex.append(plain.clone());
        self.implementation_dynamic_deps.set_select_value(
            ConfigAxis::OsInApex,
            ANDROID_AND_NON_APEX,
            non_apex,
        );

        // An unconditional dep must survive on non-Android configurations,
        // which fall through to the axis default.
        if axis.is_no_config() {
            let mut fallthrough = self
                .implementation_dynamic_deps
                .configured_value(&ConfigAxis::OsInApex, CONDITIONS_DEFAULT);
            fallthrough.append(plain);
            self.implementation_dynamic_deps.set_select_value(
                ConfigAxis::OsInApex,
                CONDITIONS_DEFAULT,
                fallthrough,
            );
        }
    }

    pub fn convert_strip_props(&mut self, module: &Module) {
        for (axis, config, props) in module.variants.strip.iter() {
            self.strip_keep_symbols
                .set_select_value(axis.clone(), config, props.keep_symbols);
            self.strip_keep_symbols_and_debug_frame.set_select_value(
                axis.clone(),
                config,
                props.keep_symbols_and_debug_frame,
            );
            if !props.keep_symbols_list.is_empty() {
                self.strip_keep_symbols_list.set_select_value(
                    axis.clone(),
                    config,
                    props.keep_symbols_list.clone(),
                );
            }
            self.strip_all
                .set_select_value(axis.clone(), config, props.all);
            self.strip_none
                .set_select_value(axis.clone(), config, props.none);
        }
    }

    /// Fold product-variable dependency contributions in.
    pub fn convert_product_variables(
        &mut self,
        ctx: &ConversionContext<'_>,
        module: &Module,
    ) -> Result<()> {
        enum Kind {
            Shared,
            Static,
            WholeStatic,
            Header,
        }
        let mut header_deps = LabelListAttribute::default();

        for kind in [Kind::Shared, Kind::Static, Kind::WholeStatic, Kind::Header] {
            let (prop, excludes_prop) = match kind {
                Kind::Shared => ("shared_libs", None),
                Kind::Static => ("static_libs", Some("exclude_static_libs")),
                Kind::WholeStatic => ("whole_static_libs", Some("exclude_static_libs")),
                Kind::Header => ("header_libs", None),
            };
            let includes_by_var = module.product_variables.get(prop);
            let excludes_by_var = excludes_prop.and_then(|p| module.product_variables.get(p));
            if includes_by_var.is_none() && excludes_by_var.is_none() {
                continue;
            }

            let mut variables: Vec<&bazelize_graph::ProductVariable> = Vec::new();
            for map in [includes_by_var, excludes_by_var].into_iter().flatten() {
                for var in map.keys() {
                    if !variables.contains(&var) {
                        variables.push(var);
                    }
                }
            }

            for var in variables {
                let includes = match includes_by_var.and_then(|m| m.get(var)) {
                    Some(value) => value
                        .as_string_list()
                        .ok_or_else(|| ConvertError::type_mismatch(&module.name, prop))?
                        .to_vec(),
                    None => Vec::new(),
                };
                let excludes = match excludes_by_var.and_then(|m| m.get(var)) {
                    Some(value) => value
                        .as_string_list()
                        .ok_or_else(|| {
                            ConvertError::type_mismatch(
                                &module.name,
                                excludes_prop.unwrap_or(prop),
                            )
                        })?
                        .to_vec(),
                    None => Vec::new(),
                };
                let includes = first_unique_strings(&includes);
                let list = match kind {
                    Kind::Shared | Kind::Header => {
                        shared_dep_labels_excludes(ctx, &includes, &excludes)
                    }
                    Kind::Static => static_dep_labels_excludes(ctx, &includes, &excludes),
                    Kind::WholeStatic => {
                        whole_archive_dep_labels_excludes(ctx, &includes, &excludes)
                    }
                };
                let attr = match kind {
                    Kind::Shared => &mut self.implementation_dynamic_deps,
                    Kind::Static => &mut self.implementation_deps,
                    Kind::WholeStatic => &mut self.whole_archive_deps,
                    Kind::Header => &mut header_deps,
                };
                attr.force_specify_empty_list |= var.always_emit;
                attr.set_select_value(var.axis(), &var.select_key(), list);
            }
        }
        self.implementation_deps.append(&header_deps);
        Ok(())
    }

    /// Cross-slot fixups, then exclude resolution. Runs once, after all
    /// extraction.
    pub fn finalize(&mut self, ctx: &ConversionContext<'_>) {
        if !self.explicit_system_deps && !self.used_system_dynamic_dep_as_dynamic_dep.is_empty() {
            // The platform links these implicitly; drop the redundant
            // explicit deps on every bionic configuration.
            let names: Vec<String> = self
                .used_system_dynamic_dep_as_dynamic_dep
                .iter()
                .cloned()
                .collect();
            let to_remove = shared_dep_labels(ctx, &names);
            self.dynamic_deps
                .exclude(ConfigAxis::NoConfig, "", &to_remove);
            self.implementation_dynamic_deps
                .exclude(ConfigAxis::NoConfig, "", &to_remove);
            for os in [OS_ANDROID, OS_LINUX_BIONIC] {
                self.dynamic_deps.exclude(ConfigAxis::Os, os, &to_remove);
                self.implementation_dynamic_deps
                    .exclude(ConfigAxis::Os, os, &to_remove);
            }
        }

        self.deps.resolve_excludes();
        self.implementation_deps.resolve_excludes();
        self.dynamic_deps.resolve_excludes();
        self.implementation_dynamic_deps.resolve_excludes();
        self.whole_archive_deps.resolve_excludes();
        self.implementation_whole_archive_deps.resolve_excludes();
        self.runtime_deps.resolve_excludes();

        // Downstream must distinguish "defaults" from "explicitly none".
        self.system_dynamic_deps.force_specify_empty_list = true;
    }
}
