//! Typed per-variant property groups.
//!
//! One concrete struct per property group, read through typed accessors on
//! [`crate::module::Module`] instead of reflective property-bag walking.
//! Field names mirror the source build-configuration schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Compiler-facing properties of one variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerProps {
    pub srcs: Vec<String>,
    pub exclude_srcs: Vec<String>,
    /// Module references producing sources (genrules and the like).
    pub generated_sources: Vec<String>,
    pub exclude_generated_sources: Vec<String>,
    pub generated_headers: Vec<String>,

    pub cflags: Vec<String>,
    pub asflags: Vec<String>,
    pub conlyflags: Vec<String>,
    pub cppflags: Vec<String>,

    pub local_include_dirs: Vec<String>,
    /// Source-root-relative include dirs.
    pub include_dirs: Vec<String>,
    pub include_build_directory: Option<bool>,

    pub c_std: Option<String>,
    pub cpp_std: Option<String>,
    pub gnu_extensions: Option<bool>,

    pub rtti: Option<bool>,
    /// "arm" or "thumb"; anything else is rejected.
    pub instruction_set: Option<String>,
    pub lex: Option<LexProps>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexProps {
    pub flags: Vec<String>,
}

/// Linker-facing properties of one variant. The five dependency kinds each
/// carry their own export and exclude lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkerProps {
    pub static_libs: Vec<String>,
    pub exclude_static_libs: Vec<String>,
    pub whole_static_libs: Vec<String>,
    pub shared_libs: Vec<String>,
    pub exclude_shared_libs: Vec<String>,
    pub header_libs: Vec<String>,
    pub runtime_libs: Vec<String>,
    pub exclude_runtime_libs: Vec<String>,

    pub export_static_lib_headers: Vec<String>,
    pub export_shared_lib_headers: Vec<String>,
    pub export_header_lib_headers: Vec<String>,
    pub export_generated_headers: Vec<String>,

    /// Tri-state: `None` means use platform defaults, `Some(vec![])` means
    /// explicitly none.
    pub system_shared_libs: Option<Vec<String>>,

    pub ldflags: Vec<String>,
    pub version_script: Option<String>,
    pub dynamic_list: Option<String>,

    pub pack_relocations: Option<bool>,
    pub allow_undefined_symbols: Option<bool>,
    /// Suppress default C runtime startup objects. Arch-invariant only.
    pub nocrt: Option<bool>,
    pub no_libcrt: Option<bool>,
    pub use_version_lib: Option<bool>,
}

/// Library-only properties (stubs, aidl/proto export policy, name suffix).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryProps {
    pub stubs: StubsProps,
    pub suffix: Option<String>,
    pub export_aidl_headers: Option<bool>,
    pub export_proto_headers: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StubsProps {
    pub symbol_file: Option<String>,
    pub versions: Vec<String>,
}

/// Properties applying to either the static or the shared half of a library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticOrSharedProps {
    pub srcs: Vec<String>,
    pub cflags: Vec<String>,
    pub enabled: Option<bool>,
    pub static_libs: Vec<String>,
    pub export_static_lib_headers: Vec<String>,
    pub shared_libs: Vec<String>,
    pub export_shared_lib_headers: Vec<String>,
    pub whole_static_libs: Vec<String>,
    pub system_shared_libs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrebuiltLinkerProps {
    pub srcs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StlProps {
    pub stl: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripProps {
    pub keep_symbols: Option<bool>,
    pub keep_symbols_and_debug_frame: Option<bool>,
    pub keep_symbols_list: Vec<String>,
    pub all: Option<bool>,
    pub none: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryLinkerProps {
    /// Arch-invariant only; arch-variant values are rejected.
    pub static_executable: Option<bool>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagExporterProps {
    pub export_include_dirs: Vec<String>,
    pub export_system_include_dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilegroupProps {
    pub srcs: Vec<String>,
    pub exclude_srcs: Vec<String>,
    /// Base path of the files; forwarded as the aidl-library import-prefix
    /// strip value.
    pub path: Option<String>,
}

/// One product configuration variable feeding a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductVariable {
    pub name: String,
    /// Emit the slot even when its value list is empty.
    pub always_emit: bool,
}

impl ProductVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            always_emit: false,
        }
    }

    /// The config key this variable selects on.
    pub fn select_key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn axis(&self) -> bazelize_select::ConfigAxis {
        bazelize_select::ConfigAxis::product_variables(self.name.clone())
    }
}

/// A raw product-variable value; shape is validated at the point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductVariableValue {
    StringList(Vec<String>),
    String(String),
    Bool(bool),
}

impl ProductVariableValue {
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(values) => Some(values),
            _ => None,
        }
    }
}

/// Property name (e.g. "cflags", "shared_libs") to the product variables
/// configured for it and their values.
pub type ProductConfigProps = IndexMap<String, IndexMap<ProductVariable, ProductVariableValue>>;
