//! The converter's view of one build module.

use serde::{Deserialize, Serialize};

use crate::props::{
    BinaryLinkerProps, CompilerProps, FilegroupProps, FlagExporterProps, LibraryProps,
    LinkerProps, PrebuiltLinkerProps, ProductConfigProps, StaticOrSharedProps, StlProps,
    StripProps,
};
use crate::variant::{AxisConfigSet, VariantProps};

/// Source module kinds the converter understands. Anything else passes
/// through unconverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleType {
    CcLibrary,
    CcLibraryStatic,
    CcLibraryShared,
    CcBinary,
    CcPrebuiltLibrary,
    Filegroup,
    Other(String),
}

impl ModuleType {
    pub fn is_filegroup(&self) -> bool {
        matches!(self, Self::Filegroup)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::CcBinary)
    }

    /// A library built in both static and shared form. Static dependency
    /// labels on such modules point at the static companion target.
    pub fn is_full_library(&self) -> bool {
        matches!(self, Self::CcLibrary)
    }

    pub fn is_prebuilt(&self) -> bool {
        matches!(self, Self::CcPrebuiltLibrary)
    }
}

/// A module's declared properties, split into typed per-variant groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleVariants {
    pub compiler: VariantProps<CompilerProps>,
    pub linker: VariantProps<LinkerProps>,
    pub library: VariantProps<LibraryProps>,
    pub static_props: VariantProps<StaticOrSharedProps>,
    pub shared_props: VariantProps<StaticOrSharedProps>,
    pub prebuilt: VariantProps<PrebuiltLinkerProps>,
    pub stl: VariantProps<StlProps>,
    pub strip: VariantProps<StripProps>,
    pub binary: VariantProps<BinaryLinkerProps>,
    pub flag_exporter: VariantProps<FlagExporterProps>,
}

/// One module as queried from the graph. Read-only during conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Package directory, relative to the source root.
    pub dir: String,
    pub module_type: ModuleType,
    pub variants: ModuleVariants,
    pub product_variables: ProductConfigProps,
    /// The module publishes versioned ABI-stub variants; shared dependents
    /// inside an APEX must bind against those instead of the real library.
    pub has_stubs_variants: bool,
    pub native_coverage: Option<bool>,
    pub sdk_version: Option<String>,
    pub min_sdk_version: Option<String>,
    /// Only present on filegroup modules.
    pub filegroup: Option<FilegroupProps>,
}

impl Module {
    pub fn new(name: impl Into<String>, dir: impl Into<String>, module_type: ModuleType) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            module_type,
            variants: ModuleVariants::default(),
            product_variables: ProductConfigProps::default(),
            has_stubs_variants: false,
            native_coverage: None,
            sdk_version: None,
            min_sdk_version: None,
            filegroup: None,
        }
    }

    /// The union of (axis, config) keys across the compiler, linker, and
    /// library property groups — the set the base-attribute walk iterates.
    pub fn base_axis_configs(&self) -> AxisConfigSet {
        let mut set = AxisConfigSet::default();
        self.variants.compiler.collect_axis_configs(&mut set);
        self.variants.linker.collect_axis_configs(&mut set);
        self.variants.library.collect_axis_configs(&mut set);
        set
    }
}
