//! Step-by-step reconstruction of snapshots from change batches

use crate::classify::{PreviousState, SnapshotAssembler};
use crate::error::{IntegrityWarning, ReconstructError};
use crate::model::{FileStatus, NodeKind, Snapshot, TimelineStep};
use crate::tracker::FileStateTracker;
use tracing::{debug, info};

/// Per-step classification counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub files: usize,
    pub directories: usize,
    pub added: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl StepStats {
    fn collect(snapshot: &Snapshot) -> Self {
        let mut stats = Self::default();
        for node in snapshot.nodes.iter().filter(|n| !n.is_root()) {
            match node.file_status {
                Some(FileStatus::Deleted) => {
                    stats.deleted += 1;
                    continue;
                }
                Some(FileStatus::Added) => stats.added += 1,
                Some(FileStatus::Moved) => stats.moved += 1,
                Some(FileStatus::Unchanged) => stats.unchanged += 1,
                None => {}
            }
            match node.kind {
                NodeKind::File => stats.files += 1,
                NodeKind::Directory => stats.directories += 1,
            }
        }
        stats
    }
}

/// One reconstructed step
#[derive(Debug, Clone)]
pub struct Reconstructed {
    pub snapshot: Snapshot,
    pub warnings: Vec<IntegrityWarning>,
    pub stats: StepStats,
}

/// Drives tracker and assembler across a timeline
///
/// A step that fails (validation or strict orphan check) leaves both the
/// tracked files and the previous-snapshot context exactly as they were.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    tracker: FileStateTracker,
    previous: Option<PreviousState>,
    assembler: SnapshotAssembler,
}

impl Reconstructor {
    pub fn new(assembler: SnapshotAssembler) -> Self {
        Self {
            assembler,
            ..Self::default()
        }
    }

    /// Apply one step's changes and produce its classified snapshot
    pub fn reconstruct(&mut self, step: &TimelineStep) -> Result<Reconstructed, ReconstructError> {
        let mut staged = self.tracker.clone();
        staged.apply_batch(&step.changes)?;

        let files = staged.effective_files();
        let classified =
            self.assembler
                .assemble(self.previous.as_ref(), &files, staged.last_renames())?;

        let snapshot = Snapshot {
            id: step.id.clone(),
            message: step.message.clone(),
            author: step.author.clone(),
            timestamp: step.timestamp.clone(),
            nodes: classified.nodes,
            edges: classified.edges,
        };

        self.previous = Some(PreviousState::from_nodes(&snapshot.nodes));
        self.tracker = staged;

        let stats = StepStats::collect(&snapshot);
        debug!(
            "Step {}: {} files, {} directories, {} ghost(s)",
            step.id, stats.files, stats.directories, stats.deleted
        );
        if !classified.warnings.is_empty() {
            info!(
                "Step {} reconstructed with {} integrity warning(s)",
                step.id,
                classified.warnings.len()
            );
        }

        Ok(Reconstructed {
            snapshot,
            warnings: classified.warnings,
            stats,
        })
    }

    /// Tracked state after the last successful step
    pub fn tracker(&self) -> &FileStateTracker {
        &self.tracker
    }

    /// Forget everything (a new timeline begins)
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeRecord, ChangeStatus, SizeChange};
    use crate::ValidationError;

    fn step(id: &str, changes: Vec<ChangeRecord>) -> TimelineStep {
        TimelineStep {
            id: id.to_string(),
            message: format!("commit {}", id),
            author: "dev".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            changes,
        }
    }

    #[test]
    fn test_end_to_end_rename() {
        let mut recon = Reconstructor::default();

        let first = recon
            .reconstruct(&step(
                "1",
                vec![ChangeRecord::new("src/a.ts", ChangeStatus::Added, 100, 0)],
            ))
            .unwrap();
        assert_eq!(first.stats.added, 2);

        recon
            .reconstruct(&step(
                "2",
                vec![ChangeRecord::new("src/a.ts", ChangeStatus::Modified, 20, 10)],
            ))
            .unwrap();

        let third = recon
            .reconstruct(&step(
                "3",
                vec![ChangeRecord::renamed("src/b.ts", "src/a.ts", 0, 0)],
            ))
            .unwrap();

        let state = recon.tracker().current_state();
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("src/b.ts"), Some(&110));

        let b = third.snapshot.node("src/b.ts").unwrap();
        assert_eq!(b.file_status, Some(FileStatus::Moved));
        assert_eq!(b.previous_path.as_deref(), Some("src/a.ts"));
        assert_eq!(b.size_change, Some(SizeChange::Unchanged));
        assert_eq!(third.snapshot.ghosts().count(), 0);
        assert_eq!(third.stats.moved, 1);
    }

    #[test]
    fn test_removed_file_yields_single_ghost() {
        let mut recon = Reconstructor::default();
        recon
            .reconstruct(&step(
                "1",
                vec![
                    ChangeRecord::new("keep.rs", ChangeStatus::Added, 5, 0),
                    ChangeRecord::new("gone.rs", ChangeStatus::Added, 30, 0),
                ],
            ))
            .unwrap();
        let second = recon
            .reconstruct(&step(
                "2",
                vec![ChangeRecord::new("gone.rs", ChangeStatus::Removed, 0, 30)],
            ))
            .unwrap();

        let ghosts: Vec<_> = second.snapshot.ghosts().collect();
        assert_eq!(ghosts.len(), 1);
        assert_eq!(ghosts[0].id, "gone.rs");
        assert_eq!(ghosts[0].previous_size, Some(30));

        // ghosts never carry over into the following step
        let third = recon.reconstruct(&step("3", vec![])).unwrap();
        assert_eq!(third.snapshot.ghosts().count(), 0);
    }

    #[test]
    fn test_invalid_step_leaves_state_untouched() {
        let mut recon = Reconstructor::default();
        recon
            .reconstruct(&step(
                "1",
                vec![ChangeRecord::new("a.rs", ChangeStatus::Added, 5, 0)],
            ))
            .unwrap();

        let err = recon
            .reconstruct(&step(
                "2",
                vec![
                    ChangeRecord::new("a.rs", ChangeStatus::Removed, 0, 0),
                    ChangeRecord::new("../escape", ChangeStatus::Added, 1, 0),
                ],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconstructError::Validation(ValidationError::ParentTraversal { index: 1, .. })
        ));
        assert_eq!(recon.tracker().get("a.rs"), Some(5));

        // the next good step is classified against step 1
        let next = recon.reconstruct(&step("3", vec![])).unwrap();
        assert_eq!(
            next.snapshot.node("a.rs").unwrap().file_status,
            Some(FileStatus::Unchanged)
        );
    }

    #[test]
    fn test_reset_starts_new_timeline() {
        let mut recon = Reconstructor::default();
        recon
            .reconstruct(&step(
                "1",
                vec![ChangeRecord::new("a.rs", ChangeStatus::Added, 5, 0)],
            ))
            .unwrap();
        recon.reset();
        assert!(recon.tracker().is_empty());

        let fresh = recon
            .reconstruct(&step(
                "1",
                vec![ChangeRecord::new("a.rs", ChangeStatus::Added, 5, 0)],
            ))
            .unwrap();
        let a = fresh.snapshot.node("a.rs").unwrap();
        assert_eq!(a.size_change, Some(SizeChange::Unchanged));
        assert_eq!(a.file_status, Some(FileStatus::Added));
    }
}
