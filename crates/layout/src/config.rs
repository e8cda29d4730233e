//! Simulation configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid simulation configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be in {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{min_field} ({min}) must not exceed {max_field} ({max})")]
    InvertedRange {
        min_field: &'static str,
        min: f64,
        max_field: &'static str,
        max: f64,
    },
}

/// Force simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Spring constant along parent edges (default: 0.05)
    pub spring_strength: f64,
    /// Gap added to the two radii to form an edge's rest length (default: 6.0)
    pub ideal_spacing: f64,
    /// Velocity multiplier applied every tick (default: 0.85)
    pub damping: f64,
    /// Speed limit per tick; also the max displacement per tick (default: 2.0)
    pub max_velocity: f64,
    /// Pairwise repulsion constant (default: 8.0)
    pub repulsion_strength: f64,
    /// Linear pull toward the origin (default: 0.004)
    pub centering_strength: f64,
    /// Radius per decade of size (default: 1.5)
    pub radius_scale: f64,
    /// Smallest file radius (default: 0.5)
    pub min_radius: f64,
    /// Largest file radius (default: 6.0)
    pub max_radius: f64,
    /// Fixed radius of directories and the root (default: 1.0)
    pub directory_radius: f64,
    /// Inner radius of the shell new nodes are seeded on (default: 60.0)
    pub seed_shell_min: f64,
    /// Outer radius of the seed shell (default: 90.0)
    pub seed_shell_max: f64,
    /// Seed for first-appearance placement
    pub seed: u64,
    /// Optional early exit once kinetic energy drops below this value
    pub energy_threshold: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spring_strength: 0.05,
            ideal_spacing: 6.0,
            damping: 0.85,
            max_velocity: 2.0,
            repulsion_strength: 8.0,
            centering_strength: 0.004,
            radius_scale: 1.5,
            min_radius: 0.5,
            max_radius: 6.0,
            directory_radius: 1.0,
            seed_shell_min: 60.0,
            seed_shell_max: 90.0,
            seed: 0x5eed_0f_c0de,
            energy_threshold: None,
        }
    }
}

impl SimulationConfig {
    /// Check every value is usable
    pub fn validate(&self) -> crate::Result<()> {
        let positive = [
            ("ideal_spacing", self.ideal_spacing),
            ("max_velocity", self.max_velocity),
            ("radius_scale", self.radius_scale),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("directory_radius", self.directory_radius),
            ("seed_shell_min", self.seed_shell_min),
            ("seed_shell_max", self.seed_shell_max),
        ];
        let non_negative = [
            ("spring_strength", self.spring_strength),
            ("repulsion_strength", self.repulsion_strength),
            ("centering_strength", self.centering_strength),
        ];

        for (field, value) in positive.iter().chain(non_negative.iter()).copied() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: f64::MAX,
                });
            }
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "damping",
                value: self.damping,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.min_radius > self.max_radius {
            return Err(ConfigError::InvertedRange {
                min_field: "min_radius",
                min: self.min_radius,
                max_field: "max_radius",
                max: self.max_radius,
            });
        }
        if self.seed_shell_min > self.seed_shell_max {
            return Err(ConfigError::InvertedRange {
                min_field: "seed_shell_min",
                min: self.seed_shell_min,
                max_field: "seed_shell_max",
                max: self.seed_shell_max,
            });
        }
        if let Some(threshold) = self.energy_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "energy_threshold",
                    value: threshold,
                    min: 0.0,
                    max: f64::MAX,
                });
            }
        }

        Ok(())
    }
}
