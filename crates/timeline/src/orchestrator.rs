//! One continuity-preserving layout pass per snapshot

use crate::pass::{FrameProgress, PassHandle};
use crate::positions::PositionStore;
use crate::schedule::ScheduleConfig;
use reposcape_core::{Motion, Node, Snapshot};
use reposcape_layout::seed::seed_position;
use reposcape_layout::{ForceSimulation, SimulationConfig};
use tracing::{debug, info};

/// What a layout pass did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassOutcome {
    /// Frame budget chosen for the pass
    pub budget: u32,
    /// Frames actually run
    pub frames: u32,
    /// Simulation ticks run
    pub ticks: u32,
    /// Whether some active node had no prior position
    pub structural: bool,
    /// Stopped early through the pass handle
    pub cancelled: bool,
    /// Stopped early because kinetic energy fell below the threshold
    pub settled: bool,
    /// Kinetic energy when the pass ended
    pub energy: f64,
}

/// A laid-out snapshot
#[derive(Debug, Clone)]
pub struct Advanced {
    pub snapshot: Snapshot,
    pub outcome: PassOutcome,
}

/// Carries node positions from one snapshot to the next
///
/// Active nodes continue from their last position (a moved file continues
/// from the position of the path it came from) and new nodes are seeded.
/// Ghost nodes are frozen at their last known position and never simulated.
#[derive(Debug)]
pub struct ContinuityOrchestrator {
    store: PositionStore,
    config: SimulationConfig,
    schedule: ScheduleConfig,
    handle: PassHandle,
}

impl ContinuityOrchestrator {
    pub fn new(config: SimulationConfig, schedule: ScheduleConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            store: PositionStore::new(),
            config,
            schedule,
            handle: PassHandle::new(),
        })
    }

    /// Handle for cancelling passes from elsewhere
    pub fn handle(&self) -> PassHandle {
        self.handle.clone()
    }

    pub fn positions(&self) -> &PositionStore {
        &self.store
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    /// Forget every position (a new timeline begins)
    pub fn reset(&mut self) {
        self.store.clear();
    }

    /// Lay out `snapshot`, continuing from the previous pass
    pub fn advance(&mut self, snapshot: Snapshot) -> crate::Result<Snapshot> {
        Ok(self.advance_with(snapshot, |_| {})?.snapshot)
    }

    /// Lay out `snapshot`, reporting every frame to `observer`
    ///
    /// Active nodes keep their relative order and ghosts follow them. The
    /// positions reached are stored for the next pass even when the pass is
    /// cancelled part-way.
    pub fn advance_with<F>(&mut self, snapshot: Snapshot, mut observer: F) -> crate::Result<Advanced>
    where
        F: FnMut(&FrameProgress),
    {
        let _guard = self.handle.begin()?;

        let Snapshot {
            id,
            message,
            author,
            timestamp,
            nodes,
            edges,
        } = snapshot;

        let (mut active, mut frozen): (Vec<Node>, Vec<Node>) =
            nodes.into_iter().partition(|n| !n.is_ghost());

        let mut structural = false;
        for node in &mut active {
            node.motion = self.carried_motion(node);
            structural |= node.motion.is_none();
        }
        for node in &mut frozen {
            node.motion = Some(self.frozen_motion(node));
        }

        let budget = self.schedule.frame_budget(structural);
        let mut outcome = PassOutcome {
            budget,
            structural,
            ..PassOutcome::default()
        };

        let mut sim = ForceSimulation::new(active, &edges, self.config.clone())?;
        debug!(
            "Pass for {}: {} active, {} frozen, {} frames",
            id,
            sim.len(),
            frozen.len(),
            budget
        );

        for frame in 0..budget {
            if self.handle.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            if self.schedule.should_tick(frame) {
                sim.tick();
                outcome.ticks += 1;
            }
            outcome.frames = frame + 1;
            outcome.energy = sim.kinetic_energy();

            let progress = FrameProgress {
                frame,
                frames: budget,
                ticks: outcome.ticks,
                energy: outcome.energy,
            };
            self.handle.report(progress);
            observer(&progress);

            if let Some(threshold) = self.config.energy_threshold {
                if outcome.frames >= self.schedule.full_rate_frames && outcome.energy < threshold {
                    outcome.settled = true;
                    break;
                }
            }
        }

        if outcome.cancelled {
            info!(
                "Pass for {} cancelled after {}/{} frames",
                id, outcome.frames, budget
            );
        } else if outcome.settled {
            debug!("Pass for {} settled after {} frames", id, outcome.frames);
        }

        let mut nodes = sim.into_nodes();
        nodes.extend(frozen);
        self.store.replace_with(&nodes);

        Ok(Advanced {
            snapshot: Snapshot {
                id,
                message,
                author,
                timestamp,
                nodes,
                edges,
            },
            outcome,
        })
    }

    fn carried_motion(&self, node: &Node) -> Option<Motion> {
        if let Some(motion) = self.store.get(&node.id) {
            return Some(*motion);
        }
        node.previous_path
            .as_deref()
            .and_then(|from| self.store.get(from))
            .copied()
    }

    fn frozen_motion(&self, node: &Node) -> Motion {
        match self.store.get(&node.id) {
            Some(motion) => *motion,
            None => {
                let p = seed_position(&node.id, &self.config);
                Motion::at(p.x, p.y, p.z)
            }
        }
    }
}
