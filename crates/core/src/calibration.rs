//! Scale calibration
//!
//! Maps on-screen pixel distances to real-world distances. A calibration is
//! produced from a known reference length drawn on the plan; the resulting
//! scale is applied to every gesture committed afterwards.

use crate::error::{TakeoffError, TakeoffResult};
use std::fmt;
use std::str::FromStr;

/// Linear units offered for calibration
pub const CALIBRATION_UNITS: [&str; 6] = ["m", "ft", "cm", "mm", "in", "yd"];

/// A known linear unit with a fixed metric conversion factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Meters,
    Centimeters,
    Millimeters,
    Feet,
    Inches,
    Yards,
}

impl LengthUnit {
    /// Metres per one of this unit
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Meters => 1.0,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Feet => 0.3048,
            LengthUnit::Inches => 0.0254,
            LengthUnit::Yards => 0.9144,
        }
    }

    /// Short symbol used as the canonical unit tag
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Yards => "yd",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = TakeoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meters),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(LengthUnit::Centimeters)
            }
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(LengthUnit::Millimeters)
            }
            "ft" | "foot" | "feet" | "'" => Ok(LengthUnit::Feet),
            "in" | "inch" | "inches" | "\"" => Ok(LengthUnit::Inches),
            "yd" | "yard" | "yards" => Ok(LengthUnit::Yards),
            _ => Err(TakeoffError::UnsupportedUnit(s.to_string())),
        }
    }
}

/// Convert a length between two unit tags
///
/// Both tags must parse as a [`LengthUnit`]; relabeling a value without a
/// conversion factor is never done.
pub fn convert_length(value: f64, from: &str, to: &str) -> TakeoffResult<f64> {
    let from: LengthUnit = from.parse()?;
    let to: LengthUnit = to.parse()?;
    Ok(value * from.meters_per_unit() / to.meters_per_unit())
}

/// Convert an area between two linear unit tags (square of the linear factor)
pub fn convert_area(value: f64, from: &str, to: &str) -> TakeoffResult<f64> {
    let factor = convert_length(1.0, from, to)?;
    Ok(value * factor * factor)
}

/// Real units per pixel plus the unit tag they are expressed in
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationState {
    /// Real units per pixel (> 0)
    pub scale: f64,
    /// Symbolic unit string (e.g. "m", "ft")
    pub unit: String,
}

impl CalibrationState {
    /// Real length for a pixel length
    pub fn to_real_length(&self, pixels: f64) -> f64 {
        pixels * self.scale
    }

    /// Real area for a pixel area (scale squared)
    pub fn to_real_area(&self, square_pixels: f64) -> f64 {
        square_pixels * self.scale * self.scale
    }

    /// Pixel length for a real length
    pub fn to_pixels(&self, real_length: f64) -> f64 {
        real_length / self.scale
    }
}

/// Holds the active calibration and the host-supplied fallback
#[derive(Debug, Clone, Default)]
pub struct ScaleCalibrator {
    state: Option<CalibrationState>,
    fallback: Option<CalibrationState>,
}

impl ScaleCalibrator {
    /// Create an uncalibrated calibrator with no fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback conversion used while no calibration exists
    pub fn with_fallback(mut self, scale: f64, unit: impl Into<String>) -> Self {
        self.fallback = Some(CalibrationState {
            scale,
            unit: unit.into(),
        });
        self
    }

    /// Calibrate from a reference length and the pixel length it spans
    ///
    /// Replaces any previous calibration. Measurements committed earlier keep
    /// the values they were derived with.
    pub fn calibrate(
        &mut self,
        reference_length: f64,
        measured_pixel_length: f64,
        unit: impl Into<String>,
    ) -> TakeoffResult<CalibrationState> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(reference_length) || !valid(measured_pixel_length) {
            return Err(TakeoffError::InvalidCalibrationInput {
                reference: reference_length,
                pixels: measured_pixel_length,
            });
        }

        let state = CalibrationState {
            scale: reference_length / measured_pixel_length,
            unit: unit.into(),
        };
        tracing::info!(scale = state.scale, unit = %state.unit, "calibrated drawing scale");
        self.state = Some(state.clone());
        Ok(state)
    }

    /// Drop the explicit calibration, reverting to the fallback if any
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// The explicit calibration, if one has been made
    pub fn calibration(&self) -> Option<&CalibrationState> {
        self.state.as_ref()
    }

    /// True when an explicit calibration exists
    pub fn is_calibrated(&self) -> bool {
        self.state.is_some()
    }

    /// Calibration in effect: explicit first, then the fallback
    pub fn effective(&self) -> TakeoffResult<&CalibrationState> {
        self.state
            .as_ref()
            .or(self.fallback.as_ref())
            .ok_or(TakeoffError::NotCalibrated)
    }

    /// Convert a pixel length to real units
    pub fn convert(&self, pixels: f64) -> TakeoffResult<f64> {
        Ok(self.effective()?.to_real_length(pixels))
    }

    /// Convert a pixel area to square real units
    pub fn convert_area(&self, square_pixels: f64) -> TakeoffResult<f64> {
        Ok(self.effective()?.to_real_area(square_pixels))
    }

    /// Unit tag in effect
    pub fn unit(&self) -> TakeoffResult<&str> {
        Ok(self.effective()?.unit.as_str())
    }
}
