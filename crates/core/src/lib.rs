//! Takeoff Core Library
//!
//! Measurement engine for construction takeoffs: scale calibration, the
//! drawing gesture state machine, per-tool quantity derivation, the
//! measurement store and undo history.

pub mod calibration;
pub mod config;
pub mod derivation;
pub mod drawing;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod measurement;
pub mod session;
pub mod store;
pub mod tool;
pub mod tool_config;

pub use calibration::{convert_area, convert_length, CalibrationState, LengthUnit, ScaleCalibrator};
pub use config::EngineConfig;
pub use derivation::{derive, derive_tagged};
pub use drawing::{CompletedGesture, DrawingSession, DrawingState, GestureOutcome};
pub use error::{ConfigError, ExportError, ExportResult, TakeoffError, TakeoffResult};
pub use export::{
    export_measurements_csv, export_measurements_csv_string, export_measurements_json,
    import_measurements_json, CsvExportConfig,
};
pub use geometry::Point;
pub use history::{ActionHistory, HistoryEntry, ReversalInstruction};
pub use measurement::{Geometry, Measurement, MeasurementFields, MeasurementId, MeasurementPatch};
pub use session::{PointerOutcome, TakeoffSession, UndoOutcome};
pub use store::MeasurementStore;
pub use tool::{ShapeClass, ToolType};
pub use tool_config::{ToolConfigRegistry, ToolConfiguration};
