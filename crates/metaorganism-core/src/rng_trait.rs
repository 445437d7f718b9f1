//! RNG trait abstraction for organism simulation
//!
//! Allows generation code to work with both:
//! - the organism's own seeded Xoshiro stream (reproducible runs)
//! - Rust's thread-local `rand::rng()` (ad-hoc creatures)

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Random number generator trait for organism simulation
pub trait OrganismRng {
    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Generate random f32 in [min, max)
    fn gen_range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.gen_f32()
    }

    /// Standard normal sample (Box-Muller)
    fn gen_gaussian(&mut self) -> f32 {
        let u1 = self.gen_f32().max(f32::EPSILON);
        let u2 = self.gen_f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }

    /// Array of independent normal samples scaled by `sigma`
    fn gen_gaussian_array<const N: usize>(&mut self, sigma: f32) -> [f32; N] {
        std::array::from_fn(|_| self.gen_gaussian() * sigma)
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> OrganismRng for T {
    fn gen_f32(&mut self) -> f32 {
        rand::Rng::random(self)
    }
}

/// Build the organism RNG from an optional seed
///
/// Without a seed a fresh one is drawn from the thread RNG.
pub fn seeded_rng(seed: Option<u64>) -> Xoshiro256StarStar {
    let seed = seed.unwrap_or_else(rand::random);
    Xoshiro256StarStar::seed_from_u64(seed)
}
