//! Fixed-size particle storage and inlet respawn.

use crate::geometry::Polygon;
use crate::sampler::sample_inside;
use crate::types::ParticleId;
use glam::Vec2;
use rand::Rng;

/// Upper bound (exclusive) of the random ages given at initialization, in
/// seconds. Staggers staleness so the first frame doesn't look uniformly new.
pub const INITIAL_AGE_MAX: f32 = 5.0;
/// Upper bound (exclusive) of the forward x-jitter on respawn.
pub const RESPAWN_JITTER: f32 = 5.0;
/// Upper bound (exclusive) of the age given to respawned particles.
pub const RESPAWN_AGE_MAX: f32 = 0.1;

/// Per-particle arrays for a fixed particle count.
///
/// All four vectors always have the same length. A particle's index never
/// changes; respawning overwrites its position and age in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleState {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    /// Seconds since the last (re)spawn.
    pub ages: Vec<f32>,
    /// Render size; 0 until the first step.
    pub sizes: Vec<f32>,
}

impl ParticleState {
    /// Builds state from explicit positions: zero velocity, zero age, zero size.
    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        let n = positions.len();
        Self {
            positions,
            velocities: vec![Vec2::ZERO; n],
            ages: vec![0.0; n],
            sizes: vec![0.0; n],
        }
    }

    /// Pre-populates the duct with `count` particles at rest.
    ///
    /// Positions are uniform inside `polygon`, ages uniform in
    /// `[0, INITIAL_AGE_MAX)`. When `max_rounds` stops the sampler early the
    /// state holds fewer than `count` particles.
    pub fn initialize(
        count: usize,
        polygon: &Polygon,
        max_rounds: Option<usize>,
        rng: &mut impl Rng,
    ) -> Self {
        let positions = sample_inside(polygon, count, max_rounds, rng);
        if positions.len() < count {
            log::warn!(
                "initialized {} particles instead of {count}",
                positions.len()
            );
        }
        let mut state = Self::from_positions(positions);
        for age in &mut state.ages {
            *age = rng.random::<f32>() * INITIAL_AGE_MAX;
        }
        state
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn speed(&self, id: ParticleId) -> f32 {
        self.velocities[id].length()
    }

    /// Re-injects the given particles along the inlet segment.
    ///
    /// Each particle gets `y` interpolated between the inlet endpoints by a
    /// uniform ratio in `[0, 1)`, and `x = inlet_start.x + jitter` with
    /// `jitter` in `[0, RESPAWN_JITTER)`, so it starts just past the inlet
    /// line. Its age restarts in `[0, RESPAWN_AGE_MAX)`. Velocity and size are
    /// left for the next step to overwrite.
    ///
    /// ### Panics
    /// Panics if an index is out of bounds.
    pub fn respawn_at(
        &mut self,
        indices: &[ParticleId],
        inlet_start: Vec2,
        inlet_end: Vec2,
        rng: &mut impl Rng,
    ) {
        for &id in indices {
            let ratio = rng.random::<f32>();
            let jitter = rng.random::<f32>() * RESPAWN_JITTER;
            let y = inlet_start.y * (1.0 - ratio) + inlet_end.y * ratio;
            self.positions[id] = Vec2::new(inlet_start.x + jitter, y);
            self.ages[id] = rng.random::<f32>() * RESPAWN_AGE_MAX;
        }
    }
}
