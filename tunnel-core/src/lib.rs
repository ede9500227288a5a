//! Core 2-D tracer-particle flow simulation through a duct.
//!
//! Main components:
//! - [`geometry`]: polygon normalization, landmarks and containment.
//! - [`sampler`]: rejection sampling of points inside a polygon.
//! - [`field`]: analytic velocity field with throat boost and turbulence.
//! - [`particles`]: fixed-size particle arrays and inlet respawn.
//! - [`stepper`]: the per-tick update and the [`stepper::Simulation`] driver.
//! - [`frame`]: per-frame snapshots handed to renderers.
//! - [`config`]: run configuration and YAML loading.
//! - [`error`]: crate-wide error type.
//! - [`types`]: shared type aliases and IDs.

pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod geometry;
pub mod particles;
pub mod sampler;
pub mod stepper;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use stepper::Simulation;
