//! Validation errors and data-integrity warnings

use std::fmt;
use thiserror::Error;

/// A malformed change record; fatal to the batch it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record {index}: missing path")]
    EmptyPath { index: usize },

    #[error("record {index}: absolute path not allowed: {path}")]
    AbsolutePath { index: usize, path: String },

    #[error("record {index}: parent traversal not allowed: {path}")]
    ParentTraversal { index: usize, path: String },

    #[error("record {index}: empty path segment in {path}")]
    EmptySegment { index: usize, path: String },

    #[error("record {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl ValidationError {
    /// Attach the batch index to an error produced by path normalization
    pub(crate) fn at(self, index: usize) -> Self {
        match self {
            Self::EmptyPath { .. } => Self::EmptyPath { index },
            Self::AbsolutePath { path, .. } => Self::AbsolutePath { index, path },
            Self::ParentTraversal { path, .. } => Self::ParentTraversal { index, path },
            Self::EmptySegment { path, .. } => Self::EmptySegment { index, path },
            Self::Malformed { reason, .. } => Self::Malformed { index, reason },
        }
    }
}

/// Non-fatal data-quality signal produced during reconstruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// Node not reachable through parent edges
    OrphanNode { id: String },
    /// More than one deleted path could explain a new path
    AmbiguousMove { path: String, candidates: Vec<String> },
    /// Same parent/child edge requested twice
    DuplicateEdge { source: String, target: String },
    /// A file sits where a directory prefix was needed
    PathOccupiedByFile { path: String },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanNode { id } => write!(f, "orphan node: {}", id),
            Self::AmbiguousMove { path, candidates } => write!(
                f,
                "ambiguous move for {}: {} candidates ({})",
                path,
                candidates.len(),
                candidates.join(", ")
            ),
            Self::DuplicateEdge { source, target } => {
                write!(f, "duplicate edge suppressed: {} -> {}", source, target)
            }
            Self::PathOccupiedByFile { path } => {
                write!(f, "file {} is also used as a directory", path)
            }
        }
    }
}

/// Raised instead of an orphan warning when strict checking is enabled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} orphaned node(s), first: {}", .orphans.len(), .orphans.first().map(String::as_str).unwrap_or("-"))]
pub struct OrphanError {
    pub orphans: Vec<String>,
}

/// Failure to reconstruct one timeline step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Orphans(#[from] OrphanError),
}
