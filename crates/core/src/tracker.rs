//! Cumulative path -> size state across a timeline

use crate::error::ValidationError;
use crate::model::{ChangeRecord, ChangeStatus, FileEntry};
use crate::path::normalize_path;
use crate::{PathSizes, RenameHints, Result};
use tracing::debug;

/// Tracks the size of every file touched so far
///
/// Sizes are the running sum of `additions - deletions` since a path first
/// appeared. No floor is applied: a size may drop to zero or below, and such
/// paths are treated as deleted by [`FileStateTracker::effective_files`].
#[derive(Debug, Clone, Default)]
pub struct FileStateTracker {
    files: PathSizes,
    /// Renames that carried a tracked size in the latest batch (new -> origin)
    renames: RenameHints,
}

/// A record whose paths have been validated and normalized
struct Normalized {
    status: ChangeStatus,
    delta: i64,
    path: String,
    previous_path: Option<String>,
}

impl FileStateTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one batch of change records in record order
    ///
    /// The whole batch is validated before any record is applied, so a
    /// malformed record leaves the tracker untouched.
    pub fn apply_batch(&mut self, records: &[ChangeRecord]) -> Result<()> {
        let batch = Self::validate(records)?;

        self.renames.clear();
        for change in batch {
            self.apply(change);
        }

        Ok(())
    }

    fn validate(records: &[ChangeRecord]) -> Result<Vec<Normalized>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let path = normalize_path(&record.path).map_err(|e| e.at(index))?;
                let status = record.status.ok_or_else(|| ValidationError::Malformed {
                    index,
                    reason: "missing or unknown status".to_string(),
                })?;
                let delta = record.delta().ok_or_else(|| ValidationError::Malformed {
                    index,
                    reason: format!(
                        "line counts out of range (+{} -{})",
                        record.additions, record.deletions
                    ),
                })?;
                let previous_path = match record.previous_path.as_deref() {
                    Some(prev) if !prev.trim().is_empty() => {
                        Some(normalize_path(prev).map_err(|e| e.at(index))?)
                    }
                    _ => None,
                };
                Ok(Normalized {
                    status,
                    delta,
                    path,
                    previous_path,
                })
            })
            .collect::<std::result::Result<Vec<_>, ValidationError>>()
    }

    fn apply(&mut self, change: Normalized) {
        let delta = change.delta;

        match change.status {
            ChangeStatus::Added => {
                self.files.insert(change.path, delta);
            }
            ChangeStatus::Modified => {
                let size = self.files.entry(change.path).or_insert(0);
                *size = size.saturating_add(delta);
            }
            ChangeStatus::Removed => {
                if self.files.remove(&change.path).is_none() {
                    debug!("Removal of untracked path {}", change.path);
                }
            }
            ChangeStatus::Renamed => {
                let carried = change
                    .previous_path
                    .and_then(|prev| self.files.remove(&prev).map(|size| (prev, size)));

                match carried {
                    Some((prev, prior)) => {
                        // a -> b -> c within one batch is reported as a -> c
                        let origin = self.renames.remove(&prev).unwrap_or(prev);
                        self.renames.insert(change.path.clone(), origin);
                        self.files.insert(change.path, prior.saturating_add(delta));
                    }
                    None => {
                        debug!(
                            "Rename of {} without tracked source, treating as added",
                            change.path
                        );
                        self.files.insert(change.path, delta);
                    }
                }
            }
        }
    }

    /// Raw tracked state, including paths whose size fell to zero or below
    pub fn current_state(&self) -> &PathSizes {
        &self.files
    }

    /// Renames applied by the latest batch, keyed by new path
    pub fn last_renames(&self) -> &RenameHints {
        &self.renames
    }

    /// Size of a tracked path
    pub fn get(&self, path: &str) -> Option<i64> {
        self.files.get(path).copied()
    }

    /// Files with size > 0, sorted by path
    pub fn effective_files(&self) -> Vec<FileEntry> {
        let mut files: Vec<FileEntry> = self
            .files
            .iter()
            .filter(|(_, size)| **size > 0)
            .map(|(path, &size)| FileEntry::file(path.clone(), size))
            .collect();
        files.sort_unstable_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Number of tracked paths (effective or not)
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Forget all state (start of a new timeline)
    pub fn clear(&mut self) {
        self.files.clear();
        self.renames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn added(path: &str, additions: u64, deletions: u64) -> ChangeRecord {
        ChangeRecord::new(path, ChangeStatus::Added, additions, deletions)
    }

    fn modified(path: &str, additions: u64, deletions: u64) -> ChangeRecord {
        ChangeRecord::new(path, ChangeStatus::Modified, additions, deletions)
    }

    #[test]
    fn test_added_uses_net_delta() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("a.rs", 30, 5)]).unwrap();
        assert_eq!(tracker.get("a.rs"), Some(25));
    }

    #[test]
    fn test_modified_sequence_accumulates_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let mut tracker = FileStateTracker::new();
            let initial = rng.gen_range(0..500u64);
            tracker.apply_batch(&[added("lib.rs", initial, 0)]).unwrap();

            let mut expected = initial as i64;
            let steps = rng.gen_range(1..20);
            for _ in 0..steps {
                let (a, d) = (rng.gen_range(0..1000u64), rng.gen_range(0..1000u64));
                tracker.apply_batch(&[modified("lib.rs", a, d)]).unwrap();
                expected += a as i64 - d as i64;
            }

            assert_eq!(tracker.get("lib.rs"), Some(expected));
        }
    }

    #[test]
    fn test_multiple_records_same_path_apply_in_order() {
        let mut tracker = FileStateTracker::new();
        tracker
            .apply_batch(&[
                added("x.rs", 10, 0),
                modified("x.rs", 0, 4),
                ChangeRecord::new("x.rs", ChangeStatus::Removed, 0, 0),
                added("x.rs", 2, 0),
            ])
            .unwrap();
        assert_eq!(tracker.get("x.rs"), Some(2));
    }

    #[test]
    fn test_removed_drops_path_regardless_of_size() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("big.bin", 10_000, 0)]).unwrap();
        tracker
            .apply_batch(&[ChangeRecord::new("big.bin", ChangeStatus::Removed, 0, 0)])
            .unwrap();
        assert_eq!(tracker.get("big.bin"), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_rename_carries_size() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("src/a.ts", 100, 0)]).unwrap();
        tracker
            .apply_batch(&[ChangeRecord::renamed("src/b.ts", "src/a.ts", 5, 2)])
            .unwrap();
        assert_eq!(tracker.get("src/a.ts"), None);
        assert_eq!(tracker.get("src/b.ts"), Some(103));
        assert_eq!(
            tracker.last_renames().get("src/b.ts").map(String::as_str),
            Some("src/a.ts")
        );
    }

    #[test]
    fn test_chained_renames_report_origin() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("a.rs", 10, 0)]).unwrap();
        tracker
            .apply_batch(&[
                ChangeRecord::renamed("b.rs", "a.rs", 0, 0),
                ChangeRecord::renamed("c.rs", "b.rs", 0, 0),
            ])
            .unwrap();
        assert_eq!(tracker.get("c.rs"), Some(10));
        assert_eq!(tracker.last_renames().len(), 1);
        assert_eq!(tracker.last_renames().get("c.rs").map(String::as_str), Some("a.rs"));

        tracker.apply_batch(&[modified("c.rs", 1, 0)]).unwrap();
        assert!(tracker.last_renames().is_empty());
    }

    #[test]
    fn test_rename_without_source_equals_added() {
        let mut renamed = FileStateTracker::new();
        let mut plain = FileStateTracker::new();

        let mut no_prev = ChangeRecord::new("new.rs", ChangeStatus::Renamed, 12, 3);
        renamed.apply_batch(&[no_prev.clone()]).unwrap();
        plain.apply_batch(&[added("new.rs", 12, 3)]).unwrap();
        assert_eq!(renamed.current_state(), plain.current_state());

        // Untracked source behaves the same way
        no_prev.previous_path = Some("ghost.rs".to_string());
        let mut untracked = FileStateTracker::new();
        untracked.apply_batch(&[no_prev]).unwrap();
        assert_eq!(untracked.current_state(), plain.current_state());
    }

    #[test]
    fn test_non_positive_sizes_are_not_effective() {
        let mut tracker = FileStateTracker::new();
        tracker
            .apply_batch(&[added("keep.rs", 10, 0), added("shrink.rs", 10, 0)])
            .unwrap();
        tracker.apply_batch(&[modified("shrink.rs", 0, 15)]).unwrap();

        assert_eq!(tracker.get("shrink.rs"), Some(-5));
        let effective = tracker.effective_files();
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].path, "keep.rs");
    }

    #[test]
    fn test_malformed_batch_leaves_state_untouched() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("a.rs", 10, 0)]).unwrap();

        let err = tracker
            .apply_batch(&[modified("a.rs", 5, 0), added("", 1, 0)])
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyPath { index: 1 });
        assert_eq!(tracker.get("a.rs"), Some(10));
    }

    #[test]
    fn test_missing_status_rejects_batch() {
        let mut tracker = FileStateTracker::new();
        let mut record = added("b.rs", 3, 0);
        record.status = None;

        let err = tracker
            .apply_batch(&[added("a.rs", 1, 0), record])
            .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { index: 1, .. }));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_out_of_range_counts_rejected() {
        let mut tracker = FileStateTracker::new();
        let err = tracker
            .apply_batch(&[added("a.rs", u64::MAX, 0)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { index: 0, .. }));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_running_size_saturates() {
        let mut tracker = FileStateTracker::new();
        tracker
            .apply_batch(&[added("a.rs", i64::MAX as u64, 0)])
            .unwrap();
        tracker.apply_batch(&[modified("a.rs", 1, 0)]).unwrap();
        assert_eq!(tracker.get("a.rs"), Some(i64::MAX));

        tracker
            .apply_batch(&[ChangeRecord::renamed("b.rs", "a.rs", 5, 0)])
            .unwrap();
        assert_eq!(tracker.get("b.rs"), Some(i64::MAX));
    }

    #[test]
    fn test_paths_are_normalized() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("./src/main.rs", 4, 0)]).unwrap();
        assert_eq!(tracker.get("src/main.rs"), Some(4));
    }

    #[test]
    fn test_clear() {
        let mut tracker = FileStateTracker::new();
        tracker.apply_batch(&[added("a.rs", 1, 0)]).unwrap();
        tracker.clear();
        assert_eq!(tracker.len(), 0);
    }
}
