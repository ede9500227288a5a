//! Run configuration for the tunnel simulation.
//!
//! Everything here is fixed when a [`crate::stepper::Simulation`] is built;
//! nothing is reconfigured while a run is in progress. A configuration can be
//! loaded from YAML, and every field has a default, so a file only needs to
//! list what it overrides:
//!
//! ```yaml
//! width: 1280
//! height: 720
//! particle_count: 2000
//! boost_factor: 1.8
//! seed: 42
//! ```

use crate::error::{Error, Result};
use glam::Vec2;
use rand::{Rng, SeedableRng, rng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw-input vertex indices that give the landmarks their meaning.
///
/// The indices are positional: they refer to the vertex order of
/// [`Config::polygon`], so changing the polygon usually means changing these
/// too. For the default duct:
///
/// - `inlet_start` = 9 (bottom-left corner), `inlet_end` = 0 (top-left corner)
/// - `throat_start` = 2, `throat_end` = 3 (top edge of the narrow section)
/// - `outlet` = 5 (bottom-right corner; only its x is used)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkIndices {
    pub inlet_start: usize,
    pub inlet_end: usize,
    pub throat_start: usize,
    pub throat_end: usize,
    pub outlet: usize,
}

impl Default for LandmarkIndices {
    fn default() -> Self {
        Self {
            inlet_start: 9,
            inlet_end: 0,
            throat_start: 2,
            throat_end: 3,
            outlet: 5,
        }
    }
}

/// Global configuration for a tunnel run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas width in render units (pixels).
    pub width: f32,
    /// Canvas height in render units (pixels).
    pub height: f32,
    /// Margin kept free around the scaled polygon.
    pub padding: f32,

    pub particle_count: usize,
    pub size_min: f32,
    pub size_max: f32,

    /// Axial speed at the centerline, render units per second.
    pub base_velocity: f32,
    /// Multiplier applied to axial speed inside the throat.
    pub boost_factor: f32,
    /// Half-width of the uniform turbulence added to each velocity component.
    pub turbulence_strength: f32,

    /// Frames per second; one step advances `1 / fps` seconds.
    pub fps: f32,
    pub frame_count: usize,

    /// Duct outline in arbitrary units, in the order the landmarks refer to.
    pub polygon: Vec<Vec2>,
    pub landmarks: LandmarkIndices,

    /// RNG seed. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
    /// Cap on rejection-sampling batches. `None` never gives up.
    pub max_sample_rounds: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            padding: 100.0,
            particle_count: 5000,
            size_min: 1.0,
            size_max: 6.0,
            base_velocity: 50.0,
            boost_factor: 1.0,
            turbulence_strength: 10.0,
            fps: 30.0,
            frame_count: 1200,
            polygon: default_duct(),
            landmarks: LandmarkIndices::default(),
            seed: None,
            max_sample_rounds: None,
        }
    }
}

/// The default venturi-style duct: straight inlet, converging section,
/// narrow throat, then a diffuser that opens towards the outlet.
pub fn default_duct() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 19.5),
        Vec2::new(31.0, 19.5),
        Vec2::new(89.0, 7.5),
        Vec2::new(134.0, 7.5),
        Vec2::new(234.0, 14.0),
        Vec2::new(234.0, -14.0),
        Vec2::new(134.0, -7.5),
        Vec2::new(89.0, -7.5),
        Vec2::new(31.0, -19.5),
        Vec2::new(0.0, -19.5),
    ]
}

impl Config {
    /// Parses a YAML document; missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(yaml)?;
        Ok(cfg)
    }

    /// Reads and parses a YAML configuration file.
    pub fn load_yaml(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Random source for a run: seeded from [`Config::seed`], or from the
    /// thread RNG when no seed is set. The seed in use is logged so a run can
    /// be reproduced.
    pub fn rng(&self) -> StdRng {
        let seed = self.seed.unwrap_or_else(|| rng().random());
        log::info!("rng seed {seed}");
        StdRng::seed_from_u64(seed)
    }

    /// Time advanced by one step.
    #[inline]
    pub fn dt(&self) -> f32 {
        1.0 / self.fps
    }

    /// Checks the scalar parameters. Polygon problems are reported later by
    /// the geometry stage, which knows what "degenerate" means.
    pub fn validate(&self) -> Result<()> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("fps", self.fps)?;
        positive("base_velocity", self.base_velocity)?;
        positive("boost_factor", self.boost_factor)?;
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(Error::InvalidParam(
                "padding must be finite and >= 0".into(),
            ));
        }
        if !self.turbulence_strength.is_finite() || self.turbulence_strength < 0.0 {
            return Err(Error::InvalidParam(
                "turbulence_strength must be finite and >= 0".into(),
            ));
        }
        if self.particle_count == 0 {
            return Err(Error::InvalidParam("particle_count must be > 0".into()));
        }
        if !self.size_min.is_finite() || !self.size_max.is_finite() || self.size_min < 0.0 {
            return Err(Error::InvalidParam(
                "size bounds must be finite and >= 0".into(),
            ));
        }
        if self.size_min > self.size_max {
            return Err(Error::InvalidParam(format!(
                "size_min ({}) must not exceed size_max ({})",
                self.size_min, self.size_max
            )));
        }
        if self.polygon.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParam("polygon vertices must be finite".into()));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParam(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}
