//! Reconstruction and layout across a whole timeline

use crate::orchestrator::{ContinuityOrchestrator, PassOutcome};
use crate::pass::{FrameProgress, PassHandle};
use crate::schedule::ScheduleConfig;
use crate::TimelineError;
use reposcape_core::{
    IntegrityWarning, Reconstructor, Snapshot, SnapshotAssembler, StepStats, TimelineStep,
};
use reposcape_layout::SimulationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use ulid::Ulid;

/// What to do with a step whose change batch is rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    /// Log it, leave state untouched and continue with the next step
    #[default]
    Skip,
    /// Stop the replay with the error
    Abort,
}

/// Timeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub simulation: SimulationConfig,
    pub schedule: ScheduleConfig,
    pub on_invalid_step: StepPolicy,
    /// Fail a step instead of warning when a node is unreachable from the root
    pub strict_orphans: bool,
}

/// Summary of one laid-out step
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Position of the step in the input
    pub index: usize,
    pub id: String,
    pub stats: StepStats,
    pub warnings: Vec<IntegrityWarning>,
    pub outcome: PassOutcome,
}

/// A step rejected under [`StepPolicy::Skip`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub index: usize,
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineReport {
    pub steps: Vec<StepReport>,
    pub skipped: Vec<SkippedStep>,
    /// Replay stopped through [`PassHandle::halt`]
    pub halted: bool,
}

impl TimelineReport {
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| s.outcome.ticks as u64).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.steps.iter().map(|s| s.warnings.len()).sum()
    }

    pub fn cancelled_passes(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.cancelled).count()
    }
}

/// Laid-out snapshots of a replay, in step order
#[derive(Debug, Clone, Default)]
pub struct Replay {
    pub snapshots: Vec<Snapshot>,
    pub report: TimelineReport,
}

/// Progress reported while replaying
#[derive(Debug, Clone, Copy)]
pub enum ReplayEvent<'a> {
    Frame {
        step: usize,
        progress: &'a FrameProgress,
    },
    StepDone {
        step: usize,
        report: &'a StepReport,
    },
    Skipped {
        step: usize,
        skipped: &'a SkippedStep,
    },
}

/// Owns everything one timeline needs: tracked files, previous-snapshot
/// context and node positions
#[derive(Debug)]
pub struct Timeline {
    id: Ulid,
    config: TimelineConfig,
    reconstructor: Reconstructor,
    orchestrator: ContinuityOrchestrator,
    /// Steps handed to [`Timeline::step`] so far
    stepped: usize,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> crate::Result<Self> {
        let orchestrator =
            ContinuityOrchestrator::new(config.simulation.clone(), config.schedule.clone())?;
        let reconstructor = Reconstructor::new(SnapshotAssembler::new(config.strict_orphans));

        Ok(Self {
            id: Ulid::new(),
            config,
            reconstructor,
            orchestrator,
            stepped: 0,
        })
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Handle for cancelling passes or halting a replay from elsewhere
    pub fn handle(&self) -> PassHandle {
        self.orchestrator.handle()
    }

    /// Reconstruct and lay out a single step
    ///
    /// A rejected step leaves the timeline exactly as it was.
    pub fn step(&mut self, step: &TimelineStep) -> crate::Result<(Snapshot, StepReport)> {
        let index = self.stepped;
        self.stepped += 1;
        self.run_step(index, step, &mut |_: ReplayEvent<'_>| {})
    }

    /// Reconstruct and lay out every step in order
    pub fn replay(&mut self, steps: &[TimelineStep]) -> crate::Result<Replay> {
        self.replay_with(steps, |_| {})
    }

    /// Like [`Timeline::replay`], reporting progress to `observer`
    ///
    /// Stops before the next step once the handle is halted; snapshots
    /// produced so far (including a cancelled partial pass) are kept.
    pub fn replay_with<F>(&mut self, steps: &[TimelineStep], mut observer: F) -> crate::Result<Replay>
    where
        F: FnMut(ReplayEvent<'_>),
    {
        let handle = self.handle();
        let mut replay = Replay::default();

        for (index, step) in steps.iter().enumerate() {
            if handle.is_halted() {
                break;
            }

            match self.run_step(index, step, &mut observer) {
                Ok((snapshot, report)) => {
                    observer(ReplayEvent::StepDone {
                        step: index,
                        report: &report,
                    });
                    replay.snapshots.push(snapshot);
                    replay.report.steps.push(report);
                }
                Err(TimelineError::Step { step: id, source })
                    if self.config.on_invalid_step == StepPolicy::Skip =>
                {
                    warn!("Skipping step {}: {}", id, source);
                    let skipped = SkippedStep {
                        index,
                        id,
                        reason: source.to_string(),
                    };
                    observer(ReplayEvent::Skipped {
                        step: index,
                        skipped: &skipped,
                    });
                    replay.report.skipped.push(skipped);
                }
                Err(e) => return Err(e),
            }
        }

        replay.report.halted = handle.is_halted();
        info!(
            "Timeline {}: {} snapshot(s), {} skipped, {} tick(s){}",
            self.id,
            replay.snapshots.len(),
            replay.report.skipped.len(),
            replay.report.total_ticks(),
            if replay.report.halted { " (halted)" } else { "" }
        );

        Ok(replay)
    }

    /// Start over with a fresh id and no history
    pub fn reset(&mut self) {
        self.id = Ulid::new();
        self.reconstructor.reset();
        self.orchestrator.reset();
        self.orchestrator.handle().resume();
        self.stepped = 0;
    }

    fn run_step<F>(
        &mut self,
        index: usize,
        step: &TimelineStep,
        observer: &mut F,
    ) -> crate::Result<(Snapshot, StepReport)>
    where
        F: FnMut(ReplayEvent<'_>),
    {
        let span = info_span!("step", timeline = %self.id, step = %step.id);
        let _enter = span.enter();

        let reconstructed =
            self.reconstructor
                .reconstruct(step)
                .map_err(|source| TimelineError::Step {
                    step: step.id.clone(),
                    source,
                })?;

        let advanced = self
            .orchestrator
            .advance_with(reconstructed.snapshot, |progress| {
                observer(ReplayEvent::Frame {
                    step: index,
                    progress,
                })
            })?;

        let report = StepReport {
            index,
            id: step.id.clone(),
            stats: reconstructed.stats,
            warnings: reconstructed.warnings,
            outcome: advanced.outcome,
        };
        info!(
            "Step {}: +{} ~{} >{} -{}, {} tick(s)",
            step.id,
            report.stats.added,
            report.stats.unchanged,
            report.stats.moved,
            report.stats.deleted,
            report.outcome.ticks
        );

        Ok((advanced.snapshot, report))
    }
}
