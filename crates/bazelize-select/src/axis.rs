//! Configuration axes and well-known config keys.

use serde::{Deserialize, Serialize};

/// The sentinel config key meaning "matches none of the explicit keys" of an
/// axis. Emitted last in generated select expressions.
pub const CONDITIONS_DEFAULT: &str = "conditions_default";

/// OS axis key for Android.
pub const OS_ANDROID: &str = "android";

/// OS axis key for host Linux built against bionic.
pub const OS_LINUX_BIONIC: &str = "linux_bionic";

/// OS-and-APEX axis key: Android, linked inside an APEX container.
pub const ANDROID_AND_IN_APEX: &str = "android-in_apex";

/// OS-and-APEX axis key: Android, linked outside any APEX container.
pub const ANDROID_AND_NON_APEX: &str = "android-non_apex";

/// An independent configuration dimension along which a module's properties
/// may vary.
///
/// Axes are not mutually exclusive: an attribute may carry overrides on
/// several axes at once, and the downstream select generation composes them
/// as nested conditionals. `NoConfig` is the unconditional (base) axis and
/// uses the empty string as its only config key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigAxis {
    /// Unconditional; applies to every configuration.
    NoConfig,
    /// Target architecture (arm, arm64, x86, x86_64, ...).
    Arch,
    /// Target OS (android, linux_glibc, darwin, ...).
    Os,
    /// Combined OS and architecture variants.
    OsArch,
    /// OS crossed with APEX membership (in APEX / not in APEX).
    OsInApex,
    /// A product configuration variable, keyed by variable name.
    ProductVariables(String),
}

impl ConfigAxis {
    /// Axis for the named product variable. Config keys on this axis are the
    /// lowercased variable name.
    pub fn product_variables(name: impl Into<String>) -> Self {
        Self::ProductVariables(name.into())
    }

    /// True for the unconditional axis.
    pub fn is_no_config(&self) -> bool {
        matches!(self, Self::NoConfig)
    }
}

impl std::fmt::Display for ConfigAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConfig => write!(f, "no_config"),
            Self::Arch => write!(f, "arch"),
            Self::Os => write!(f, "os"),
            Self::OsArch => write!(f, "arch_os"),
            Self::OsInApex => write!(f, "os_in_apex"),
            Self::ProductVariables(name) => write!(f, "product_variables_{name}"),
        }
    }
}
