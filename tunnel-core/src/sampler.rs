//! Uniform rejection sampling inside a polygon.

use crate::geometry::Polygon;
use glam::Vec2;
use rand::Rng;

/// Draws `count` uniform random points strictly inside `polygon`.
///
/// Each round draws a batch of `count` points in the polygon's bounding box
/// and keeps the ones that pass [`Polygon::contains`]. Rounds repeat until at
/// least `count` points were accepted; the surplus is truncated.
///
/// A polygon that covers only a small fraction of its bounding box makes this
/// slow, not wrong. With `max_rounds = None` there is no bound on the number
/// of rounds. With `Some(n)` the sampler gives up after `n` rounds, logs a
/// warning and returns what it has, which may be fewer than `count` points.
///
/// ### Parameters
/// - `polygon` - Region to sample from.
/// - `count` - Number of points wanted.
/// - `max_rounds` - Optional cap on the number of batches.
/// - `rng` - Random source; a seeded generator gives a reproducible result.
pub fn sample_inside(
    polygon: &Polygon,
    count: usize,
    max_rounds: Option<usize>,
    rng: &mut impl Rng,
) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let (min, max) = polygon.bounds();
    let extent = max - min;
    let mut points = Vec::with_capacity(count);
    let mut rounds = 0usize;

    while points.len() < count {
        if let Some(cap) = max_rounds
            && rounds >= cap
        {
            log::warn!(
                "rejection sampling stopped after {rounds} rounds with {} of {count} points",
                points.len()
            );
            return points;
        }
        rounds += 1;

        for _ in 0..count {
            let p = min + Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * extent;
            if polygon.contains(p) {
                points.push(p);
            }
        }
    }

    points.truncate(count);
    points
}
