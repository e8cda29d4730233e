//! Deterministic first-appearance placement

use crate::{SimulationConfig, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Stable 64-bit FNV-1a hash of a node id
fn id_hash(id: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    id.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// Point on the seed shell for a newly appearing node
///
/// The same id and config seed always give the same point, and different
/// ids land at different points, so new nodes never start stacked at the
/// origin.
pub fn seed_position(id: &str, config: &SimulationConfig) -> Vec3 {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ id_hash(id));

    let z: f64 = rng.gen_range(-1.0..=1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let radius: f64 = rng.gen_range(config.seed_shell_min..=config.seed_shell_max);

    let ring = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(ring * theta.cos(), ring * theta.sin(), z) * radius
}
