//! Analytic velocity field for the duct.
//!
//! The field is kinematic: it only looks at the current position of each
//! particle (plus fresh noise), never at its previous velocity. Flow is axial
//! (+x), fastest on the canvas centerline, throttled towards the walls and
//! boosted inside the throat.

use crate::config::Config;
use crate::geometry::Landmarks;
use glam::Vec2;
use rand::Rng;

/// Distance from the centerline, in inlet half-heights, at which the
/// attenuation reaches its floor.
pub const BOUNDARY_SPAN: f32 = 1.5;
/// Smallest fraction of the base speed kept near the walls.
pub const BOUNDARY_FLOOR: f32 = 0.1;

/// Speed-related parameters of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub base_velocity: f32,
    pub boost_factor: f32,
    pub turbulence_strength: f32,
}

impl FieldParams {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            base_velocity: cfg.base_velocity,
            boost_factor: cfg.boost_factor,
            turbulence_strength: cfg.turbulence_strength,
        }
    }
}

/// Velocity field sampler bound to one duct's landmarks.
#[derive(Clone, Debug)]
pub struct VelocityField {
    params: FieldParams,
    center_y: f32,
    half_inlet_height: f32,
    throat_start: f32,
    throat_end: f32,
}

impl VelocityField {
    /// `center_y` is the vertical centerline of the canvas (`height / 2`).
    pub fn new(landmarks: &Landmarks, params: FieldParams, center_y: f32) -> Self {
        Self {
            params,
            center_y,
            half_inlet_height: landmarks.half_inlet_height(),
            throat_start: landmarks.throat_start,
            throat_end: landmarks.throat_end,
        }
    }

    #[inline]
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Wall attenuation at height `y`, in `[BOUNDARY_FLOOR, 1]`.
    #[inline]
    pub fn boundary_factor(&self, y: f32) -> f32 {
        let dist = (y - self.center_y).abs();
        let r = dist / (self.half_inlet_height * BOUNDARY_SPAN);
        (1.0 - r * r).clamp(BOUNDARY_FLOOR, 1.0)
    }

    /// Deterministic part of the field (no turbulence).
    #[inline]
    pub fn mean_velocity(&self, pos: Vec2) -> Vec2 {
        let mut vx = self.params.base_velocity * self.boundary_factor(pos.y);
        if pos.x > self.throat_start && pos.x < self.throat_end {
            vx *= self.params.boost_factor;
        }
        Vec2::new(vx, 0.0)
    }

    /// Returns one velocity per position.
    pub fn evaluate(&self, positions: &[Vec2], rng: &mut impl Rng) -> Vec<Vec2> {
        let mut out = vec![Vec2::ZERO; positions.len()];
        self.evaluate_into(positions, &mut out, rng);
        out
    }

    /// Same as [`VelocityField::evaluate`], writing into `out`.
    ///
    /// ### Panics
    /// Panics if `out` and `positions` have different lengths.
    pub fn evaluate_into(&self, positions: &[Vec2], out: &mut [Vec2], rng: &mut impl Rng) {
        assert_eq!(positions.len(), out.len());
        let t = self.params.turbulence_strength;
        for (v, &p) in out.iter_mut().zip(positions) {
            let noise = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * 2.0 * t;
            *v = self.mean_velocity(p) + noise;
        }
    }
}
