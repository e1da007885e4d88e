//! # bazelize-graph
//!
//! Module data model and collaborator contracts for build-module conversion.
//!
//! This crate defines what a native build module looks like to the converter:
//! typed per-variant property groups (compiler, linker, library, strip, stl,
//! ...), the read-only [`ModuleGraph`] query interface, the [`PathResolver`]
//! that turns declared source/dependency strings into labels, the
//! [`TargetSink`] that receives emitted target declarations, and the
//! [`Diagnostics`] channel for per-module conversion errors.
//!
//! It also hosts the simplest converter of the pipeline: filegroups
//! ([`filegroup::convert_filegroup`]), including the eponymous-file
//! short-circuit and the aidl-library special case.
//!
//! Conversion of one module never mutates the graph and never waits on the
//! conversion of another module; dependency labels are constructed by name.

pub mod error;
pub mod filegroup;
pub mod graph;
pub mod module;
pub mod props;
pub mod sink;
pub mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{ConvertError, Result};
pub use graph::{
    ModuleGraph, PathResolver, dep_labels, dep_labels_excludes, dep_labels_with,
    src_labels_excludes,
};
pub use module::{Module, ModuleType};
pub use props::{
    BinaryLinkerProps, CompilerProps, FilegroupProps, FlagExporterProps, LexProps, LibraryProps,
    LinkerProps, PrebuiltLinkerProps, ProductConfigProps, ProductVariable, ProductVariableValue,
    StaticOrSharedProps, StlProps, StripProps, StubsProps,
};
pub use sink::{AttrValue, AttributeBundle, Diagnostics, EmittedTarget, TargetProps, TargetQueue, TargetSink};
pub use variant::{AxisConfigSet, VariantProps};
