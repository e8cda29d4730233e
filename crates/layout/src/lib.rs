//! Reposcape Layout - continuity-preserving 3D force simulation
//!
//! This crate provides:
//! - Vec3 math for positions and velocities
//! - Size-aware node radii
//! - Deterministic seeding of first-appearance positions
//! - ForceSimulation (spring, repulsion and centering forces)

pub mod config;
pub mod radius;
pub mod seed;
pub mod simulation;
pub mod vec3;

// Re-exports
pub use config::{ConfigError, SimulationConfig};
pub use simulation::ForceSimulation;
pub use vec3::Vec3;

/// Result type for layout configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
