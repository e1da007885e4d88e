//! Extension-based partitioning of label lists.
//!
//! A partition spec classifies every label of a label-list attribute into
//! exactly one named bucket. Membership is decided by the label's textual
//! file suffix, except that a partition's mapper may claim a label outright
//! (with a possibly rewritten text) independent of extension — this is how
//! filegroup references get redirected to extension-specific synthetic
//! variants. Labels nothing claims fall into the single remainder partition.

use indexmap::IndexMap;

use crate::attr::LabelListAttribute;
use crate::error::{Result, SelectError};
use crate::label::{Label, LabelList};

/// Decides whether a partition claims a label regardless of extension.
/// Returns the label text to use in the partition (possibly rewritten), or
/// `None` to leave the label for extension matching.
pub type LabelMapper<'a> = Box<dyn Fn(&Label) -> Option<String> + 'a>;

/// One declared bucket of a partition spec.
pub struct LabelPartition<'a> {
    /// Case-sensitive file suffixes this partition claims (".c", ".S").
    pub extensions: &'static [&'static str],
    pub label_mapper: Option<LabelMapper<'a>>,
    /// Absorb every label no partition claimed. Exactly one partition of a
    /// spec must set this.
    pub keep_remainder: bool,
}

impl<'a> LabelPartition<'a> {
    pub fn with_extensions(extensions: &'static [&'static str]) -> Self {
        Self {
            extensions,
            label_mapper: None,
            keep_remainder: false,
        }
    }

    pub fn mapper(mut self, mapper: LabelMapper<'a>) -> Self {
        self.label_mapper = Some(mapper);
        self
    }

    pub fn keep_remainder(mut self) -> Self {
        self.keep_remainder = true;
        self
    }

    fn matches_extension(&self, label: &Label) -> bool {
        self.extensions.iter().any(|ext| label.has_extension(ext))
    }
}

/// Partition name to the labels it received, preserving declaration order.
pub type PartitionMap = IndexMap<String, LabelListAttribute>;

/// Partition every label of `attr` (base value and each configured slot)
/// into the declared buckets. Output partitions inherit the input's axis
/// structure: a slot set on the input yields a slot in each partition, so
/// the union of all partitions' labels equals the input and the partitions
/// are pairwise disjoint.
///
/// Mappers are consulted in declaration order before extension matching, so
/// a partition earlier in the spec wins a contested label.
pub fn partition_label_list_attribute(
    attr: &LabelListAttribute,
    partitions: &[(&str, LabelPartition<'_>)],
) -> Result<PartitionMap> {
    let remainder_count = partitions.iter().filter(|(_, p)| p.keep_remainder).count();
    if remainder_count != 1 {
        return Err(SelectError::RemainderPartitions(remainder_count));
    }
    let remainder_idx = partitions
        .iter()
        .position(|(_, p)| p.keep_remainder)
        .unwrap_or_default();

    let mut out: PartitionMap = partitions
        .iter()
        .map(|(name, _)| (name.to_string(), LabelListAttribute::default()))
        .collect();

    let mut place = |axis_config: Option<(&crate::axis::ConfigAxis, &str)>, list: &LabelList| {
        let mut buckets: Vec<LabelList> = vec![LabelList::new(); partitions.len()];
        for label in &list.includes {
            let (idx, placed) = place_label(label, partitions, remainder_idx);
            buckets[idx].push(placed);
        }
        for ((name, _), bucket) in partitions.iter().zip(buckets) {
            let dest = out
                .get_mut(*name)
                .unwrap_or_else(|| unreachable!("partition {name} was just inserted"));
            match axis_config {
                None => dest.value = bucket,
                // Empty slots are still materialized so partitions keep the
                // input's axis structure.
                Some((axis, config)) => dest.set_select_value(axis.clone(), config, bucket),
            }
        }
    };

    place(None, &attr.value);
    for (axis, config, list) in attr.iter_configured() {
        place(Some((axis, config)), list);
    }

    Ok(out)
}

fn place_label(
    label: &Label,
    partitions: &[(&str, LabelPartition<'_>)],
    remainder_idx: usize,
) -> (usize, Label) {
    for (idx, (_, partition)) in partitions.iter().enumerate() {
        if let Some(mapper) = &partition.label_mapper
            && let Some(mapped) = mapper(label)
        {
            let mut placed = label.clone();
            placed.label = mapped;
            return (idx, placed);
        }
        if partition.matches_extension(label) {
            return (idx, label.clone());
        }
    }
    (remainder_idx, label.clone())
}
