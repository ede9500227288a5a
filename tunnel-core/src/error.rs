use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up or advancing a tunnel simulation.
///
/// Setup errors (`InvalidParam`, `DegenerateGeometry`, `Config`) are returned
/// before any particle state exists. `NonFinite` signals a broken invariant
/// during a step and is not meant to be retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value or API argument.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Polygon or landmark layout that cannot be normalized or sampled.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// NaN or infinity appeared in particle state.
    #[error("non-finite state: {0}")]
    NonFinite(String),

    /// Malformed YAML configuration.
    #[error("config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Propagated I/O errors (config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
