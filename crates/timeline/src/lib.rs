//! Timeline sequencing and layout continuity
//!
//! This crate provides:
//! - PositionStore (id -> position/velocity carried between snapshots)
//! - Frame schedule (tick rate and budget per pass)
//! - PassHandle (cooperative cancellation and in-flight guard)
//! - ContinuityOrchestrator (one layout pass per snapshot)
//! - Timeline (reconstruction + layout across every step)

pub mod error;
pub mod orchestrator;
pub mod pass;
pub mod positions;
pub mod schedule;
pub mod timeline;

// Re-exports
pub use error::TimelineError;
pub use orchestrator::{Advanced, ContinuityOrchestrator, PassOutcome};
pub use pass::{FrameProgress, PassHandle};
pub use positions::PositionStore;
pub use schedule::ScheduleConfig;
pub use timeline::{
    Replay, ReplayEvent, SkippedStep, StepPolicy, StepReport, Timeline, TimelineConfig,
    TimelineReport,
};

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
