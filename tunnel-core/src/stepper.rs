//! Per-tick update of the particle swarm and the run driver around it.
//!
//! One [`step`] does, in order:
//! 1. sample the [`VelocityField`] at every particle,
//! 2. integrate positions with explicit Euler over `dt`,
//! 3. age every particle by `dt`,
//! 4. flag particles that left the polygon or passed the outlet,
//! 5. respawn the flagged ones at the inlet,
//! 6. recompute render sizes from speed.
//!
//! [`Simulation`] bundles the immutable geometry with the mutable
//! [`ParticleState`] and counts steps.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::{FieldParams, VelocityField};
use crate::frame::Frame;
use crate::geometry::{Geometry, Landmarks, Polygon};
use crate::particles::ParticleState;
use crate::types::ParticleId;
use rand::Rng;

/// Speed, as a multiple of `base_velocity * boost_factor`, at which a
/// particle reaches the minimum render size.
pub const SIZE_SPEED_HEADROOM: f32 = 1.5;

/// Fixed parameters of the integration and size mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    pub dt: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Speed mapped to `size_min`.
    pub reference_speed: f32,
}

impl StepParams {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            dt: cfg.dt(),
            size_min: cfg.size_min,
            size_max: cfg.size_max,
            reference_speed: cfg.base_velocity * cfg.boost_factor * SIZE_SPEED_HEADROOM,
        }
    }

    /// Render size for a given speed. Faster particles are drawn smaller.
    #[inline]
    pub fn render_size(&self, speed: f32) -> f32 {
        let norm = (speed / self.reference_speed).clamp(0.0, 1.0);
        self.size_max - (self.size_max - self.size_min) * norm
    }
}

/// Counts from one step, mostly for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles that drifted through a wall.
    pub outside: usize,
    /// Particles past the outlet threshold.
    pub escaped: usize,
    /// Particles respawned (a particle can be both outside and escaped).
    pub respawned: usize,
}

/// Advances `state` by one `params.dt`.
///
/// ### Errors
/// [`Error::NonFinite`] if integration produced a NaN or infinite position.
/// The state is left as it was at that point and should be discarded.
pub fn step(
    state: &mut ParticleState,
    polygon: &Polygon,
    landmarks: &Landmarks,
    field: &VelocityField,
    params: &StepParams,
    rng: &mut impl Rng,
) -> Result<StepStats> {
    let dt = params.dt;

    field.evaluate_into(&state.positions, &mut state.velocities, rng);

    for (p, &v) in state.positions.iter_mut().zip(&state.velocities) {
        *p += v * dt;
    }
    for age in &mut state.ages {
        *age += dt;
    }

    let mut stats = StepStats::default();
    let mut to_respawn: Vec<ParticleId> = Vec::new();
    for (id, &p) in state.positions.iter().enumerate() {
        if !p.is_finite() {
            return Err(Error::NonFinite(format!(
                "particle {id} at ({}, {}) after integration",
                p.x, p.y
            )));
        }
        let outside = !polygon.contains(p);
        let escaped = p.x > landmarks.outlet_x;
        stats.outside += outside as usize;
        stats.escaped += escaped as usize;
        if outside || escaped {
            to_respawn.push(id);
        }
    }
    stats.respawned = to_respawn.len();

    state.respawn_at(&to_respawn, landmarks.inlet_start, landmarks.inlet_end, rng);

    // Sizes use this step's velocities, including for particles just respawned.
    for (size, v) in state.sizes.iter_mut().zip(&state.velocities) {
        *size = params.render_size(v.length());
    }

    Ok(stats)
}

/// A complete run: geometry, field and particles plus a step counter.
#[derive(Clone, Debug)]
pub struct Simulation {
    geometry: Geometry,
    field: VelocityField,
    params: StepParams,
    state: ParticleState,
    steps: usize,
}

impl Simulation {
    /// Validates `cfg`, normalizes the duct and pre-populates it with particles.
    ///
    /// ### Errors
    /// Any configuration or geometry error; no state is built in that case.
    pub fn new(cfg: &Config, rng: &mut impl Rng) -> Result<Self> {
        cfg.validate()?;
        let geometry = Geometry::from_config(cfg)?;
        let field = VelocityField::new(
            &geometry.landmarks,
            FieldParams::from_config(cfg),
            cfg.height / 2.0,
        );
        let state = ParticleState::initialize(
            cfg.particle_count,
            &geometry.polygon,
            cfg.max_sample_rounds,
            rng,
        );
        log::info!(
            "simulation ready: {} particles, dt = {:.4} s",
            state.len(),
            cfg.dt()
        );

        Ok(Self {
            geometry,
            field,
            params: StepParams::from_config(cfg),
            state,
            steps: 0,
        })
    }

    /// Advances one tick; see [`step`].
    pub fn step(&mut self, rng: &mut impl Rng) -> Result<StepStats> {
        let stats = step(
            &mut self.state,
            &self.geometry.polygon,
            &self.geometry.landmarks,
            &self.field,
            &self.params,
            rng,
        )?;
        self.steps += 1;
        log::debug!(
            "step {}: respawned {} ({} outside, {} escaped)",
            self.steps,
            stats.respawned,
            stats.outside,
            stats.escaped
        );
        Ok(stats)
    }

    /// Number of steps taken so far.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.params.dt
    }

    /// Simulated time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.steps as f32 * self.params.dt
    }

    #[inline]
    pub fn polygon(&self) -> &Polygon {
        &self.geometry.polygon
    }

    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.geometry.landmarks
    }

    #[inline]
    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    #[inline]
    pub fn params(&self) -> &StepParams {
        &self.params
    }

    pub fn snapshot(&self) -> Frame {
        Frame::capture(self.steps, self.time(), &self.state)
    }
}
