//! Property-based tests for attribute and partition invariants.
//!
//! Run with: cargo test --features proptest --package bazelize-select

#![cfg(feature = "proptest")]

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use crate::partition::{LabelPartition, partition_label_list_attribute};
use crate::{ConfigAxis, Label, LabelList, LabelListAttribute};

fn label_strategy() -> impl Strategy<Value = Label> {
    ("[a-z]{1,8}", prop::sample::select(vec![".c", ".cpp", ".S", ".asm", ".proto", ""]))
        .prop_map(|(stem, ext)| Label::new(format!("{stem}{ext}")))
}

fn label_list_strategy() -> impl Strategy<Value = LabelList> {
    (
        prop::collection::vec(label_strategy(), 0..12),
        prop::collection::vec(label_strategy(), 0..6),
    )
        .prop_map(|(includes, excludes)| LabelList::with_excludes(includes, excludes))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// resolve_excludes(resolve_excludes(L)) == resolve_excludes(L)
    #[test]
    fn prop_resolve_excludes_idempotent(list in label_list_strategy()) {
        let mut once = list.clone();
        once.resolve_excludes();
        let mut twice = once.clone();
        twice.resolve_excludes();
        prop_assert_eq!(once, twice);
    }

    /// After resolution no excluded label value remains in the includes.
    #[test]
    fn prop_resolved_includes_disjoint_from_excludes(list in label_list_strategy()) {
        let excluded: FxHashSet<String> =
            list.excludes.iter().map(|l| l.label.clone()).collect();
        let mut resolved = list;
        resolved.resolve_excludes();
        prop_assert!(resolved.includes.iter().all(|l| !excluded.contains(&l.label)));
    }

    /// Reading an unset slot returns the base value when
    /// force_specify_empty_list is off.
    #[test]
    fn prop_unset_slot_inherits_base(
        base in label_list_strategy(),
        config in "[a-z]{1,8}",
    ) {
        let attr = LabelListAttribute::from_label_list(base.clone());
        prop_assert_eq!(attr.select_value(&ConfigAxis::Arch, &config), base);
    }

    /// Partition outputs form a disjoint cover of the input labels.
    #[test]
    fn prop_partitions_cover_input(includes in prop::collection::vec(label_strategy(), 0..20)) {
        let attr = LabelListAttribute::from_label_list(LabelList::from_labels(includes.clone()));
        let spec = vec![
            ("c", LabelPartition::with_extensions(&[".c"])),
            ("as", LabelPartition::with_extensions(&[".s", ".S"])),
            ("asm", LabelPartition::with_extensions(&[".asm"])),
            ("cpp", LabelPartition::with_extensions(&[".cpp", ".cc"]).keep_remainder()),
        ];
        let parts = partition_label_list_attribute(&attr, &spec).unwrap();

        let total: usize = parts.values().map(|p| p.value.includes.len()).sum();
        prop_assert_eq!(total, includes.len());

        // No label text lands in two partitions more often than it occurred.
        let mut counts: std::collections::HashMap<String, usize> = Default::default();
        for part in parts.values() {
            for l in &part.value.includes {
                *counts.entry(l.label.clone()).or_default() += 1;
            }
        }
        for label in &includes {
            prop_assert!(counts.get(&label.label).copied().unwrap_or(0) >= 1);
        }
    }
}
