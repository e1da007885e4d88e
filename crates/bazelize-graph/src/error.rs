//! Conversion error taxonomy.
//!
//! All variants are deterministic input-validation failures. They are fatal
//! to the offending module's conversion (no targets are emitted for it) but
//! never to the rest of the batch; there is no retry state.

use thiserror::Error;

use bazelize_select::SelectError;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Divergent settings across variants of one module (e.g. different
    /// `stl` per arch, or an arch-variant value for an arch-invariant
    /// feature).
    #[error("module '{module}': {message}")]
    ConfigurationConflict { module: String, message: String },

    /// A declared shape the target build system cannot express (e.g.
    /// static/shared-only proto sources, a filegroup file named after its
    /// own module alongside other files).
    #[error("module '{module}': {message}")]
    UnsupportedPattern { module: String, message: String },

    /// A product-variable value that is not of the expected shape.
    #[error("module '{module}': could not convert product variable {variable} property")]
    TypeMismatch { module: String, variable: String },

    #[error(transparent)]
    Select(#[from] SelectError),
}

impl ConvertError {
    pub fn conflict(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationConflict {
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedPattern {
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch(module: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::TypeMismatch {
            module: module.into(),
            variable: variable.into(),
        }
    }

    /// The module this error voids, when known.
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::ConfigurationConflict { module, .. }
            | Self::UnsupportedPattern { module, .. }
            | Self::TypeMismatch { module, .. } => Some(module),
            Self::Select(_) => None,
        }
    }
}
