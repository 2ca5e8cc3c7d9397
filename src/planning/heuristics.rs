//! Heuristics on lattice poses
//!
//! Both are stateless; pick per query. Manhattan matches the lattice edge
//! cost exactly and is therefore admissible. Euclidean ignores rotation, so
//! it underestimates on translation but is blind to rotation cost; it is
//! still a useful guide when rotations are rare.

use crate::common::traits::Heuristic;
use crate::common::types::LatticePose;

/// Straight-line distance on the position indices
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Heuristic<LatticePose> for Euclidean {
    fn estimate(&self, from: &LatticePose, to: &LatticePose) -> f64 {
        let dx = (from.x - to.x) as f64;
        let dy = (from.y - to.y) as f64;
        let dz = (from.z - to.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// L1 distance over all six lattice coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Heuristic<LatticePose> for Manhattan {
    fn estimate(&self, from: &LatticePose, to: &LatticePose) -> f64 {
        ((from.x - to.x).abs()
            + (from.y - to.y).abs()
            + (from.z - to.z).abs()
            + (from.pitch - to.pitch).abs()
            + (from.yaw - to.yaw).abs()
            + (from.roll - to.roll).abs()) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_ignores_rotation() {
        let a = LatticePose::from_position(0, 0, 0);
        let b = LatticePose::new(3, 4, 0, 1, 2, 3);
        assert!((Euclidean.estimate(&a, &b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_manhattan_counts_all_six_axes() {
        let a = LatticePose::from_position(0, 0, 0);
        let b = LatticePose::new(1, -2, 3, 1, 0, 2);
        assert!((Manhattan.estimate(&a, &b) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_at_identical_states() {
        let a = LatticePose::new(5, 5, 5, 1, 1, 1);
        assert_eq!(Euclidean.estimate(&a, &a), 0.0);
        assert_eq!(Manhattan.estimate(&a, &a), 0.0);
    }
}
