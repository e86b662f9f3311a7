//! Bounded snow particle field.
//!
//! Snow lives inside a spherical dome as structure-of-arrays state: one
//! `Vec` of positions, one of per-flake fall speeds, one of colors. The
//! field advances in place once per frame with no allocation, and every
//! flake that leaves the dome (or sinks below the visible band) is thrown
//! back in at a fresh spot.
//!
//! # Example
//!
//! ```ignore
//! use snowglobe::snow::SnowField;
//!
//! let mut field = SnowField::new(10_000, 20.0);
//!
//! // In your frame loop:
//! field.advance();
//!
//! // On celebration:
//! field.recolor_all();
//! ```

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Default number of placement candidates for a new field.
pub const DEFAULT_SNOW_CANDIDATES: usize = 10_000;

/// Half-range of the per-flake fall speed, in world units per frame.
/// Speeds are drawn from `(-0.025, 0.025)`; negative speeds drift upward.
const FALL_SPEED_RANGE: f32 = 0.05;

/// Uniform sample inside a sphere of the given radius.
///
/// Classic inverse-CDF angles with a linear radial draw, so samples bunch
/// toward the center the way the dome's snow is meant to. Note the vertical
/// axis is the `sin(theta)` one.
fn sample_sphere(rng: &mut SmallRng, radius: f32) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let r = rng.gen::<f32>() * radius;
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// A falling-snow particle field bounded by a spherical dome.
///
/// Parallel arrays hold per-flake state; the flake count is fixed at
/// creation. Candidates landing outside the vertical band
/// `(-radius/2, radius/2)` are rejected rather than retried, so the final
/// count may be below the requested candidate count.
#[derive(Debug)]
pub struct SnowField {
    /// Dome radius; no flake is ever farther than this from the origin.
    radius: f32,
    positions: Vec<Vec3>,
    /// World units subtracted from `y` each frame, parallel to `positions`.
    velocities: Vec<f32>,
    colors: Vec<Vec3>,
    rng: SmallRng,
}

impl SnowField {
    /// Create a field from `candidates` placement attempts inside a dome of
    /// the given radius, seeding the RNG from system entropy.
    pub fn new(candidates: usize, radius: f32) -> Self {
        Self::generate(candidates, radius, SmallRng::from_entropy())
    }

    /// Create a deterministic field from an explicit RNG seed.
    pub fn with_seed(candidates: usize, radius: f32, seed: u64) -> Self {
        Self::generate(candidates, radius, SmallRng::seed_from_u64(seed))
    }

    fn generate(candidates: usize, radius: f32, mut rng: SmallRng) -> Self {
        let half_radius = radius / 2.0;
        let mut positions = Vec::with_capacity(candidates);
        let mut velocities = Vec::with_capacity(candidates);

        for _ in 0..candidates {
            let candidate = sample_sphere(&mut rng, radius);
            if candidate.y > -half_radius && candidate.y < half_radius {
                positions.push(candidate);
                velocities.push((rng.gen::<f32>() - 0.5) * FALL_SPEED_RANGE);
            }
        }

        let colors = vec![Vec3::ONE; positions.len()];

        Self {
            radius,
            positions,
            velocities,
            colors,
            rng,
        }
    }

    /// Step every flake one frame.
    ///
    /// Each flake falls by its own speed; any flake that ends up outside the
    /// dome or below `-radius/2` is reseeded anywhere in the full sphere,
    /// keeping its speed. After this returns, every flake is within
    /// `radius` of the origin.
    pub fn advance(&mut self) {
        let radius = self.radius;
        let half_radius = radius / 2.0;

        for (position, &velocity) in self.positions.iter_mut().zip(&self.velocities) {
            position.y -= velocity;
            if position.length() >= radius || position.y < -half_radius {
                *position = sample_sphere(&mut self.rng, radius);
            }
        }
    }

    /// Give every flake an independent random RGB color, channels in
    /// `[0, 1)`. Positions and speeds are untouched.
    pub fn recolor_all(&mut self) {
        for color in &mut self.colors {
            *color = Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
        }
    }

    /// Number of live flakes (placement survivors).
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when every placement candidate was rejected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The dome radius the field was built for.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Flake positions, updated in place by [`advance`](Self::advance).
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-flake fall speeds. Fixed after creation.
    #[inline]
    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Flake colors, rewritten only by [`recolor_all`](Self::recolor_all).
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}
