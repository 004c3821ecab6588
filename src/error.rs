//! Error types for the chart classification engine.
//!
//! Shape tests signal "not this shape" by returning `false`/`None`/empty,
//! never by raising; the variants here cover the cases a caller must react
//! to (bad input geometry, not enough data to decide, missing model).

/// Result type alias for chart classification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during chart-structure reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input geometry is malformed (NaN coordinates, empty point arrays)
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Too few points, legends, or axes to make a decision
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Fallback classifier model not loaded or not usable
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// IO error while loading a model artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Feature-range table could not be parsed
    #[error("Invalid feature-range table: {0}")]
    FeatureRange(#[from] serde_json::Error),

    /// ML inference error
    #[cfg(feature = "ml")]
    #[error("Model error: {0}")]
    Model(String),
}
