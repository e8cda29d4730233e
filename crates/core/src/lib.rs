//! Reposcape Core - state reconstruction for repository-evolution graphs
//!
//! This crate turns per-step change records into point-in-time trees:
//! - Path normalization and splitting
//! - FileStateTracker (cumulative path -> size state)
//! - TreeEdgeBuilder (flat file list -> nodes + parent edges)
//! - SnapshotAssembler (status/size classification, move detection, ghosts)
//! - Reconstructor (tracker + assembler driven one timeline step at a time)

pub mod classify;
pub mod error;
pub mod model;
pub mod path;
pub mod reconstruct;
pub mod tracker;
pub mod tree;

// Re-export main types for convenience
pub use classify::{detect_move, Classified, MoveDetection, PreviousState, SnapshotAssembler};
pub use error::{IntegrityWarning, OrphanError, ReconstructError, ValidationError};
pub use model::{
    ChangeRecord, ChangeStatus, Edge, EdgeKind, FileEntry, FileStatus, Motion, Node, NodeKind,
    SizeChange, Snapshot, TimelineStep, ROOT_ID,
};
pub use reconstruct::{Reconstructed, Reconstructor, StepStats};
pub use tracker::FileStateTracker;
pub use tree::{BuiltTree, TreeEdgeBuilder};

/// Path -> size mapping used for historical context between snapshots
pub type PathSizes = ahash::AHashMap<String, i64>;

/// New path -> path it was explicitly renamed from
pub type RenameHints = ahash::AHashMap<String, String>;

/// Common result type used throughout reposcape-core
pub type Result<T> = std::result::Result<T, ValidationError>;
