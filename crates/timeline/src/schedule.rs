//! Frame schedule for layout passes

use serde::{Deserialize, Serialize};

/// How many frames a pass runs and on which frames the simulation ticks
///
/// Frames below `full_rate_frames` tick every frame, the next
/// `half_rate_frames` tick every second frame, and the rest every third.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Frame budget when any node is new (default: 300)
    pub structural_frames: u32,
    /// Frame budget when every node has a prior position (default: 90)
    pub refinement_frames: u32,
    /// Frames ticking at full rate (default: 60)
    pub full_rate_frames: u32,
    /// Frames ticking at half rate after the full-rate phase (default: 90)
    pub half_rate_frames: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            structural_frames: 300,
            refinement_frames: 90,
            full_rate_frames: 60,
            half_rate_frames: 90,
        }
    }
}

impl ScheduleConfig {
    /// Frames to run for a pass
    pub fn frame_budget(&self, structural: bool) -> u32 {
        if structural {
            self.structural_frames
        } else {
            self.refinement_frames
        }
    }

    /// Whether the simulation ticks on `frame`
    pub fn should_tick(&self, frame: u32) -> bool {
        if frame < self.full_rate_frames {
            true
        } else if frame < self.full_rate_frames.saturating_add(self.half_rate_frames) {
            frame % 2 == 0
        } else {
            frame % 3 == 0
        }
    }

    /// Ticks a full pass of `frames` frames runs
    pub fn ticks_for(&self, frames: u32) -> u32 {
        (0..frames).filter(|&f| self.should_tick(f)).count() as u32
    }
}
