//! Error types for the takeoff engine
//!
//! Every failure in the engine is local and recoverable: the host reports it
//! and the user re-attempts the action (re-calibrate, configure the tool,
//! re-draw). A failed gesture never produces a measurement.

use crate::measurement::MeasurementId;
use crate::tool::ToolType;

/// Errors raised by calibration, derivation and store operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TakeoffError {
    /// Reference or measured pixel length was not strictly positive
    #[error("invalid calibration input: reference length {reference} and pixel length {pixels} must both be > 0")]
    InvalidCalibrationInput { reference: f64, pixels: f64 },

    /// Conversion attempted with no calibration and no fallback scale
    #[error("drawing is not calibrated and no fallback scale is configured")]
    NotCalibrated,

    /// Tool tag outside the closed set
    #[error("unsupported tool type: {0}")]
    UnsupportedToolType(String),

    /// A tool that needs configuration has none attached
    #[error("tool {0} requires a configuration before drawing")]
    MissingConfiguration(ToolType),

    /// Store operation against an unknown or cleared identity
    #[error("measurement not found: {0}")]
    NotFound(MeasurementId),

    /// Pointer-down received while no tool is active
    #[error("no drawing tool is active")]
    NoActiveTool,

    /// Geometry shape does not match the shape class of the tool type
    #[error("geometry does not match tool {0}")]
    GeometryMismatch(ToolType),

    /// Unit string that has no known linear conversion factor
    #[error("unsupported length unit: {0}")]
    UnsupportedUnit(String),
}

/// Result type for engine operations
pub type TakeoffResult<T> = Result<T, TakeoffError>;

/// Errors raised while loading engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid value for {0}")]
    InvalidValue(String),
}

/// Errors raised by CSV/JSON export and import
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Takeoff(#[from] TakeoffError),
}

pub type ExportResult<T> = Result<T, ExportError>;
