//! Usage accounting types
//!
//! The accumulator is owned by a single scan: created empty, folded into
//! by the walker, then handed back by value. Parallel walks give each
//! worker its own accumulator and merge them at the end.

use std::collections::HashMap;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

/// Numeric owner (user) id
pub type OwnerId = u32;

/// Numeric group id
pub type GroupId = u32;

/// `st_blocks` is always counted in 512-byte units
const BLOCK_SIZE: u64 = 512;

/// How an entry's size is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UsageMetric {
    /// Apparent size as reported by the filesystem (`st_size`)
    #[default]
    Apparent,
    /// Bytes actually allocated on disk (`st_blocks * 512`)
    Allocated,
}

impl UsageMetric {
    /// Size of an entry under this metric
    pub fn measure(self, meta: &Metadata) -> u64 {
        match self {
            UsageMetric::Apparent => meta.size(),
            UsageMetric::Allocated => meta.blocks().saturating_mul(BLOCK_SIZE),
        }
    }
}

/// Per-node metadata view, consumed immediately into an accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    pub is_dir: bool,
    pub owner: OwnerId,
    pub group: GroupId,
    pub size: u64,
}

impl EntryMetadata {
    pub fn from_metadata(meta: &Metadata, metric: UsageMetric) -> Self {
        Self {
            is_dir: meta.is_dir(),
            owner: meta.uid(),
            group: meta.gid(),
            size: metric.measure(meta),
        }
    }
}

/// Bytes and entry count attributed to one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub bytes: u64,
    pub entries: u64,
}

impl Usage {
    fn add(&mut self, bytes: u64, entries: u64) {
        self.bytes = self.bytes.saturating_add(bytes);
        self.entries = self.entries.saturating_add(entries);
    }

    fn absorb(&mut self, other: Usage) {
        self.add(other.bytes, other.entries);
    }
}

/// Aggregate state of one scan
///
/// Per-owner and per-group keys only exist once an entry with that id
/// has been folded in; there are never zero placeholder entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsageAccumulator {
    total: Usage,
    by_owner: HashMap<OwnerId, Usage>,
    by_group: HashMap<GroupId, Usage>,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry to the global, owner and group totals
    pub fn fold(&mut self, entry: &EntryMetadata) {
        self.total.add(entry.size, 1);
        self.by_owner.entry(entry.owner).or_default().add(entry.size, 1);
        self.by_group.entry(entry.group).or_default().add(entry.size, 1);
    }

    /// Merge another accumulator (e.g. a worker's partial) into this one
    pub fn merge(&mut self, other: UsageAccumulator) {
        self.total.absorb(other.total);
        for (owner, usage) in other.by_owner {
            self.by_owner.entry(owner).or_default().absorb(usage);
        }
        for (group, usage) in other.by_group {
            self.by_group.entry(group).or_default().absorb(usage);
        }
    }

    /// Global total
    pub fn total(&self) -> Usage {
        self.total
    }

    pub fn total_bytes(&self) -> u64 {
        self.total.bytes
    }

    pub fn by_owner(&self) -> &HashMap<OwnerId, Usage> {
        &self.by_owner
    }

    pub fn by_group(&self) -> &HashMap<GroupId, Usage> {
        &self.by_group
    }

    pub fn owner(&self, owner: OwnerId) -> Option<Usage> {
        self.by_owner.get(&owner).copied()
    }

    pub fn group(&self, group: GroupId) -> Option<Usage> {
        self.by_group.get(&group).copied()
    }

    /// Nothing has been folded in yet
    pub fn is_empty(&self) -> bool {
        self.total.entries == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(owner: OwnerId, group: GroupId, size: u64) -> EntryMetadata {
        EntryMetadata {
            is_dir: false,
            owner,
            group,
            size,
        }
    }

    #[test]
    fn test_fold_creates_keys_on_first_sight() {
        let mut acc = UsageAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.by_owner().is_empty());

        acc.fold(&entry(1000, 100, 4096));
        assert_eq!(acc.owner(1000), Some(Usage { bytes: 4096, entries: 1 }));
        assert_eq!(acc.group(100), Some(Usage { bytes: 4096, entries: 1 }));
        assert_eq!(acc.owner(0), None);

        acc.fold(&entry(1000, 200, 10));
        assert_eq!(acc.owner(1000), Some(Usage { bytes: 4106, entries: 2 }));
        assert_eq!(acc.group(200), Some(Usage { bytes: 10, entries: 1 }));
        assert_eq!(acc.total(), Usage { bytes: 4106, entries: 2 });
    }

    #[test]
    fn test_zero_sized_entries_still_create_keys() {
        let mut acc = UsageAccumulator::new();
        acc.fold(&entry(5, 6, 0));
        assert_eq!(acc.owner(5), Some(Usage { bytes: 0, entries: 1 }));
        assert!(!acc.is_empty());
    }

    #[test]
    fn test_totals_sum_to_global() {
        let mut acc = UsageAccumulator::new();
        for (i, size) in [7u64, 0, 512, 1 << 20, 33].into_iter().enumerate() {
            acc.fold(&entry(i as u32 % 2, i as u32 % 3, size));
        }
        let owners: u64 = acc.by_owner().values().map(|u| u.bytes).sum();
        let groups: u64 = acc.by_group().values().map(|u| u.bytes).sum();
        assert_eq!(owners, acc.total_bytes());
        assert_eq!(groups, acc.total_bytes());
    }

    #[test]
    fn test_merge_matches_single_fold() {
        let entries = [entry(1, 1, 100), entry(2, 1, 50), entry(1, 3, 25)];

        let mut whole = UsageAccumulator::new();
        entries.iter().for_each(|e| whole.fold(e));

        let mut left = UsageAccumulator::new();
        let mut right = UsageAccumulator::new();
        left.fold(&entries[0]);
        right.fold(&entries[1]);
        right.fold(&entries[2]);
        left.merge(right);

        assert_eq!(left, whole);
    }

    #[test]
    fn test_metric_from_real_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, vec![0u8; 3000]).unwrap();
        let meta = std::fs::metadata(&path).unwrap();

        let apparent = EntryMetadata::from_metadata(&meta, UsageMetric::Apparent);
        assert_eq!(apparent.size, 3000);
        assert!(!apparent.is_dir);
        assert_eq!(apparent.owner, meta.uid());

        let allocated = EntryMetadata::from_metadata(&meta, UsageMetric::Allocated);
        assert_eq!(allocated.size, meta.blocks() * 512);
    }
}
