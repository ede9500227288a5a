//! Per-frame particle snapshots handed to renderers and exporters.
//!
//! A [`Frame`] owns copies of the positions and render sizes; it holds no
//! borrow of the simulation.

use crate::particles::ParticleState;
use serde::Serialize;

/// One particle as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameParticle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Snapshot of all particles after one step, ordered by particle id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    /// Number of steps taken when the snapshot was captured.
    pub index: usize,
    /// Simulation time at this frame, in seconds.
    pub time: f32,
    pub particles: Vec<FrameParticle>,
}

impl Frame {
    pub fn capture(index: usize, time: f32, state: &ParticleState) -> Self {
        let particles = state
            .positions
            .iter()
            .zip(&state.sizes)
            .map(|(p, &size)| FrameParticle { x: p.x, y: p.y, size })
            .collect();
        Self {
            index,
            time,
            particles,
        }
    }
}
