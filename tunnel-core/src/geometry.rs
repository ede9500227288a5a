//! Duct geometry: normalization into render space and derived landmarks.
//!
//! The raw polygon comes in arbitrary units. [`normalize`] fits it into the
//! canvas once at startup; [`Landmarks::from_polygon`] then reads the inlet,
//! throat and outlet positions from named vertices of the *scaled* polygon.

use crate::config::{Config, LandmarkIndices};
use crate::error::{Error, Result};
use glam::Vec2;

/// Closed, simple polygon in render-space coordinates.
///
/// Vertex order is kept exactly as given; the closing edge from the last
/// vertex back to the first is implicit.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned bounding box as `(min, max)`.
    ///
    /// Returns `(Vec2::ZERO, Vec2::ZERO)` for an empty polygon.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        bounds_of(&self.vertices)
    }

    /// Even-odd point-in-polygon test (ray cast towards +x).
    ///
    /// Points exactly on an edge may land on either side.
    pub fn contains(&self, p: Vec2) -> bool {
        let v = &self.vertices;
        let n = v.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (v[i], v[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn bounds_of(points: &[Vec2]) -> (Vec2, Vec2) {
    let Some(&first) = points.first() else {
        return (Vec2::ZERO, Vec2::ZERO);
    };
    points
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)))
}

/// Rescales `raw` so it fits `(width - 2*padding) x (height - 2*padding)` and
/// centers it on a `width x height` canvas.
///
/// The scale is uniform (`min` of the two axis ratios), so the aspect ratio is
/// never distorted.
///
/// ### Errors
/// - [`Error::InvalidParam`] for fewer than 3 vertices or no room left inside
///   the padding.
/// - [`Error::DegenerateGeometry`] when the bounding width or height is zero.
pub fn normalize(raw: &[Vec2], width: f32, height: f32, padding: f32) -> Result<Polygon> {
    if raw.len() < 3 {
        return Err(Error::InvalidParam(format!(
            "polygon needs at least 3 vertices, got {}",
            raw.len()
        )));
    }
    let available = Vec2::new(width - 2.0 * padding, height - 2.0 * padding);
    if !(available.x > 0.0 && available.y > 0.0) {
        return Err(Error::InvalidParam(format!(
            "padding {padding} leaves no room on a {width}x{height} canvas"
        )));
    }

    let (min, max) = bounds_of(raw);
    let dims = max - min;
    if dims.x <= 0.0 || dims.y <= 0.0 {
        return Err(Error::DegenerateGeometry(format!(
            "bounding box is {}x{}",
            dims.x, dims.y
        )));
    }

    let scale = (available.x / dims.x).min(available.y / dims.y);
    let scaled: Vec<Vec2> = raw.iter().map(|&p| (p - min) * scale).collect();

    // Scaled min corner is the origin, so the max corner is the scaled size.
    let (_, scaled_size) = bounds_of(&scaled);
    let offset = (Vec2::new(width, height) - scaled_size) / 2.0;

    Ok(Polygon::new(scaled.into_iter().map(|p| p + offset).collect()))
}

/// Scalar landmarks read from the scaled polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmarks {
    /// Inlet segment; particles are (re)injected along it.
    pub inlet_start: Vec2,
    pub inlet_end: Vec2,
    /// Open interval `(throat_start, throat_end)` on x where flow is boosted.
    pub throat_start: f32,
    pub throat_end: f32,
    /// Particles with `x` beyond this have left through the outlet.
    pub outlet_x: f32,
}

impl Landmarks {
    /// Picks the landmark vertices named by `idx` out of `polygon`.
    pub fn from_polygon(polygon: &Polygon, idx: &LandmarkIndices) -> Result<Self> {
        let v = &polygon.vertices;
        let at = |name: &str, i: usize| -> Result<Vec2> {
            v.get(i).copied().ok_or_else(|| {
                Error::InvalidParam(format!(
                    "landmark {name} index {i} out of range for {} vertices",
                    v.len()
                ))
            })
        };

        let landmarks = Self {
            inlet_start: at("inlet_start", idx.inlet_start)?,
            inlet_end: at("inlet_end", idx.inlet_end)?,
            throat_start: at("throat_start", idx.throat_start)?.x,
            throat_end: at("throat_end", idx.throat_end)?.x,
            outlet_x: at("outlet", idx.outlet)?.x,
        };

        if landmarks.half_inlet_height() <= 0.0 {
            return Err(Error::DegenerateGeometry(
                "inlet segment has zero vertical span".into(),
            ));
        }
        Ok(landmarks)
    }

    /// Half the vertical span of the inlet segment.
    #[inline]
    pub fn half_inlet_height(&self) -> f32 {
        (self.inlet_end.y - self.inlet_start.y).abs() / 2.0
    }

    /// `true` strictly inside the throat interval.
    #[inline]
    pub fn in_throat(&self, x: f32) -> bool {
        x > self.throat_start && x < self.throat_end
    }
}

/// Scaled polygon plus its landmarks; immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub polygon: Polygon,
    pub landmarks: Landmarks,
}

impl Geometry {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let polygon = normalize(&cfg.polygon, cfg.width, cfg.height, cfg.padding)?;
        let landmarks = Landmarks::from_polygon(&polygon, &cfg.landmarks)?;
        let (lo, hi) = polygon.bounds();
        log::info!(
            "duct normalized: {} vertices, bounds ({:.1}, {:.1})..({:.1}, {:.1}), throat {:.1}..{:.1}, outlet x {:.1}",
            polygon.vertices.len(),
            lo.x,
            lo.y,
            hi.x,
            hi.y,
            landmarks.throat_start,
            landmarks.throat_end,
            landmarks.outlet_x
        );
        Ok(Self { polygon, landmarks })
    }
}
