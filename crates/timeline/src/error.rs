//! Timeline errors

use reposcape_core::ReconstructError;
use reposcape_layout::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// A step could not be reconstructed
    #[error("step {step}: {source}")]
    Step {
        step: String,
        #[source]
        source: ReconstructError,
    },

    /// A layout pass is already running on this timeline
    #[error("layout pass already in flight")]
    Busy,

    #[error("invalid simulation config: {0}")]
    Config(#[from] ConfigError),
}
