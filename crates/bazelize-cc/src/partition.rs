//! Source partitioning for native modules.
//!
//! A module's `srcs` mixes C, C++, assembly, lex, IDL, and protocol-buffer
//! files, plus filegroup references whose contents are opaque here. Each
//! language bucket feeds a different attribute (or synthesized submodule),
//! so every slot of the srcs attribute is split by extension. Filegroup
//! references are routed by mapper: name-pattern heuristics claim likely
//! proto/aidl filegroups unchanged, and the suffix mappers redirect the rest
//! to per-language synthetic filegroup variants (`fg` becomes `fg_cpp_srcs`
//! in the C++ bucket).

use bazelize_graph::filegroup::{
    is_likely_aidl_name, is_likely_proto_name, should_convert_to_aidl_library,
};
use bazelize_graph::{ModuleGraph, Result};
use bazelize_select::{
    Label, LabelListAttribute, LabelMapper, LabelPartition, PartitionMap,
    partition_label_list_attribute,
};

pub const PROTO_PARTITION: &str = "proto";
pub const AIDL_PARTITION: &str = "aidl";
pub const CPP_PARTITION: &str = "cpp";
pub const C_PARTITION: &str = "c";
pub const AS_PARTITION: &str = "as";
pub const ASM_PARTITION: &str = "asm";
pub const L_PARTITION: &str = "l";
pub const LL_PARTITION: &str = "ll";

/// Suffixes appended to filegroup labels landing in a per-language bucket.
/// The filegroup's own conversion emits matching `_cpp_srcs` style targets.
pub const CPP_SRCS_SUFFIX: &str = "_cpp_srcs";
pub const C_SRCS_SUFFIX: &str = "_c_srcs";
pub const AS_SRCS_SUFFIX: &str = "_as_srcs";

/// Claims filegroup references whose name matches a language heuristic,
/// without rewriting the label.
fn likely_filegroup_mapper(
    graph: &dyn ModuleGraph,
    matches_name: fn(&str) -> bool,
) -> LabelMapper<'_> {
    Box::new(move |label: &Label| {
        let name = label.original_module_name.as_deref()?;
        if graph.is_filegroup(name) && matches_name(name) {
            Some(label.label.clone())
        } else {
            None
        }
    })
}

/// Claims any remaining filegroup reference and points it at the filegroup's
/// per-language synthetic variant. Filegroups that convert to aidl libraries
/// are left alone; the aidl submodule references them directly.
fn filegroup_suffix_mapper<'a>(
    graph: &'a dyn ModuleGraph,
    suffix: &'static str,
) -> LabelMapper<'a> {
    Box::new(move |label: &Label| {
        let name = label.original_module_name.as_deref()?;
        let module = graph.module_from_name(name)?;
        if !module.module_type.is_filegroup() || should_convert_to_aidl_library(module) {
            return None;
        }
        Some(format!("{}{}", label.label, suffix))
    })
}

/// The partition spec for module sources. Declaration order is the claim
/// order: the proto and aidl heuristics run before the suffix mappers, so a
/// filegroup named `foo_protos` stays whole instead of being split into
/// language variants.
fn source_partitions(graph: &dyn ModuleGraph) -> Vec<(&'static str, LabelPartition<'_>)> {
    vec![
        (
            PROTO_PARTITION,
            LabelPartition::with_extensions(&[".proto"])
                .mapper(likely_filegroup_mapper(graph, is_likely_proto_name)),
        ),
        (
            AIDL_PARTITION,
            LabelPartition::with_extensions(&[".aidl"])
                .mapper(likely_filegroup_mapper(graph, is_likely_aidl_name)),
        ),
        (
            CPP_PARTITION,
            LabelPartition::with_extensions(&[".cpp", ".cc", ".cxx", ".mm"])
                .mapper(filegroup_suffix_mapper(graph, CPP_SRCS_SUFFIX))
                .keep_remainder(),
        ),
        (
            C_PARTITION,
            LabelPartition::with_extensions(&[".c"])
                .mapper(filegroup_suffix_mapper(graph, C_SRCS_SUFFIX)),
        ),
        (
            AS_PARTITION,
            LabelPartition::with_extensions(&[".s", ".S"])
                .mapper(filegroup_suffix_mapper(graph, AS_SRCS_SUFFIX)),
        ),
        (ASM_PARTITION, LabelPartition::with_extensions(&[".asm"])),
        (L_PARTITION, LabelPartition::with_extensions(&[".l"])),
        (LL_PARTITION, LabelPartition::with_extensions(&[".ll"])),
    ]
}

/// Split every slot of a srcs attribute into the language buckets.
pub fn group_srcs_by_extension(
    graph: &dyn ModuleGraph,
    srcs: &LabelListAttribute,
) -> Result<PartitionMap> {
    let partitions = source_partitions(graph);
    Ok(partition_label_list_attribute(srcs, &partitions)?)
}
