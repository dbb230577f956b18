//! Seeded random streams
//!
//! Every randomized algorithm in procmesh draws from an explicit
//! [`RandomStream`] owned by the caller. Two streams created from the same
//! seed produce the same sequence, independent of call order or threads.

use crate::point::*;
use crate::KINDA_SMALL_NUMBER;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic random stream backed by a PCG32 generator.
///
/// `Pcg32` has a fixed, documented output stream, so sequences stay the same
/// across `rand` releases.
#[derive(Debug, Clone)]
pub struct RandomStream {
    seed: u32,
    rng: Pcg32,
}

impl RandomStream {
    /// Create a stream from a seed
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed as u64),
        }
    }

    /// Seed the stream was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Rewind the stream to its initial state
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed as u64);
    }

    /// Uniform value in `[0, 1)`
    pub fn fraction(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform value between `min` and `max`
    pub fn frand_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.fraction()
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    ///
    /// Returns `min` when the range is empty.
    pub fn rand_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform index into a collection of `len` elements
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..len))
    }

    /// Uniformly distributed unit direction in the plane.
    ///
    /// Samples the unit disc by rejection so the direction is not biased
    /// towards the square's corners.
    pub fn unit_vector_2d(&mut self) -> Vector2f {
        loop {
            let v = Vector2f::new(
                self.fraction() * 2.0 - 1.0,
                self.fraction() * 2.0 - 1.0,
            );
            let len_sq = v.norm_squared();
            if len_sq <= 1.0 && len_sq >= KINDA_SMALL_NUMBER {
                return v / len_sq.sqrt();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(42);
        for _ in 0..64 {
            assert_eq!(a.fraction().to_bits(), b.fraction().to_bits());
            assert_eq!(a.rand_range(-5, 17), b.rand_range(-5, 17));
        }
    }

    #[test]
    fn test_stream_follows_pcg32() {
        let mut rs = RandomStream::new(9);
        let mut pcg = Pcg32::seed_from_u64(9);
        for _ in 0..16 {
            assert_eq!(rs.fraction().to_bits(), pcg.gen::<f32>().to_bits());
        }
    }

    #[test]
    fn test_reset_rewinds() {
        let mut rs = RandomStream::new(7);
        let first: Vec<u32> = (0..8).map(|_| rs.fraction().to_bits()).collect();
        rs.reset();
        let second: Vec<u32> = (0..8).map(|_| rs.fraction().to_bits()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ranges() {
        let mut rs = RandomStream::new(1337);
        for _ in 0..1000 {
            let f = rs.fraction();
            assert!((0.0..1.0).contains(&f));

            let r = rs.frand_range(2.0, 3.0);
            assert!((2.0..=3.0).contains(&r));

            let i = rs.rand_range(1, 4);
            assert!((1..=4).contains(&i));

            let idx = rs.index(10).unwrap();
            assert!(idx < 10);
        }
        assert_eq!(rs.rand_range(3, 3), 3);
        assert_eq!(rs.rand_range(5, 1), 5);
        assert_eq!(rs.index(0), None);
    }

    #[test]
    fn test_unit_vector_2d() {
        let mut rs = RandomStream::new(3);
        for _ in 0..100 {
            assert_relative_eq!(rs.unit_vector_2d().norm(), 1.0, epsilon = 1e-5);
        }
    }
}
