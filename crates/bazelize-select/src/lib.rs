//! # bazelize-select
//!
//! Configuration axes, labels, and selectable build attributes.
//!
//! This crate holds the pure data structures that the conversion pipeline is
//! built on: a value-per-configuration-axis container (the attribute family),
//! label lists with deferred excludes, and the extension-based label
//! partitioner. It knows nothing about modules or build rules.
//!
//! ## Overview
//!
//! A build module's properties vary along independent configuration axes
//! (architecture, OS, APEX membership, product variables). An attribute holds
//! one unconditional base value plus per-axis, per-config overrides, and is
//! finalized once (exclude resolution, deduplication) before being handed to
//! an emission sink.
//!
//! ```rust
//! use bazelize_select::{ConfigAxis, Label, LabelList, LabelListAttribute};
//!
//! let mut srcs = LabelListAttribute::default();
//! srcs.set_select_value(
//!     ConfigAxis::NoConfig,
//!     "",
//!     LabelList::from_labels(vec![Label::new("a.cpp")]),
//! );
//! srcs.set_select_value(
//!     ConfigAxis::Arch,
//!     "arm64",
//!     LabelList::from_labels(vec![Label::new("a_arm64.cpp")]),
//! );
//!
//! // Unset slots inherit the base value.
//! assert_eq!(srcs.select_value(&ConfigAxis::Os, "android"), srcs.value);
//! ```

pub mod attr;
pub mod axis;
pub mod error;
pub mod label;
pub mod partition;

#[cfg(test)]
mod tests;

pub use attr::{
    BoolAttribute, Configurable, LabelAttribute, LabelListAttribute, StringAttribute,
    StringListAttribute,
};
pub use axis::{
    ANDROID_AND_IN_APEX, ANDROID_AND_NON_APEX, CONDITIONS_DEFAULT, ConfigAxis, OS_ANDROID,
    OS_LINUX_BIONIC,
};
pub use error::{Result, SelectError};
pub use label::{Label, LabelList, first_unique_strings, remove_list_from_list};
pub use partition::{LabelMapper, LabelPartition, PartitionMap, partition_label_list_attribute};
