//! Quantity derivation
//!
//! Pure mapping from a tool type, the captured pixel path, the calibration in
//! effect and the tool's configuration to a fully populated measurement.
//! Derived scalars are never rounded here; rounding is a display concern.

use crate::calibration::ScaleCalibrator;
use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::Point;
use crate::measurement::{
    AreaFields, ConduitRunFields, Geometry, HydroHoleFields, HydroTrenchFields, Measurement,
    MeasurementFields, PotholeFields, TrenchFields,
};
use crate::tool::{ShapeClass, ToolType};
use crate::tool_config::{
    AreaConfig, ConduitRunConfig, HydroExcavationConfig, RemovalSpec, ToolConfiguration,
    TrenchConfig,
};

/// Divisor turning cubic feet into cubic yards
pub const CUBIC_FEET_PER_CUBIC_YARD: f64 = 27.0;

/// Assumed pothole bore radius in metres (8 inch diameter)
pub const POTHOLE_BORE_RADIUS_M: f64 = 0.1016;

/// Unit tag for point markers placed before any calibration exists
pub const UNCALIBRATED_UNIT: &str = "px";

/// Derive a measurement from a tool tag (see [`derive`])
pub fn derive_tagged(
    tool_tag: &str,
    points: &[Point],
    calibration: &ScaleCalibrator,
    config: Option<&ToolConfiguration>,
    page_index: u16,
) -> TakeoffResult<Measurement> {
    let tool: ToolType = tool_tag.parse()?;
    derive(tool, points, calibration, config, page_index)
}

/// Derive a measurement for one completed gesture
///
/// Path and polygon tools need a calibration (explicit or fallback). Point
/// markers only borrow the unit tag and fall back to [`UNCALIBRATED_UNIT`].
/// The returned measurement has no identity yet; the store assigns one.
pub fn derive(
    tool: ToolType,
    points: &[Point],
    calibration: &ScaleCalibrator,
    config: Option<&ToolConfiguration>,
    page_index: u16,
) -> TakeoffResult<Measurement> {
    let config = config.filter(|config| config.applies_to(tool));
    if tool.requires_configuration() && config.is_none() {
        return Err(TakeoffError::MissingConfiguration(tool));
    }

    let geometry = Geometry::from_points(tool.shape_class(), points)
        .ok_or(TakeoffError::GeometryMismatch(tool))?;

    let (unit, length, area) = match tool.shape_class() {
        ShapeClass::Point => {
            let unit = calibration
                .unit()
                .map(str::to_string)
                .unwrap_or_else(|_| UNCALIBRATED_UNIT.to_string());
            (unit, None, None)
        }
        ShapeClass::LineString | ShapeClass::Polygon => {
            let unit = calibration.unit()?.to_string();
            let length = geometry
                .pixel_length()
                .map(|px| calibration.convert(px))
                .transpose()?;
            let area = geometry
                .pixel_area()
                .map(|px2| calibration.convert_area(px2))
                .transpose()?;
            (unit, length, area)
        }
    };

    let fields = derive_fields(tool, length.unwrap_or(0.0), area, config)?;

    tracing::debug!(
        tool = %tool,
        points = points.len(),
        length = ?length,
        area = ?area,
        "derived measurement"
    );

    Ok(Measurement::new(page_index, geometry, unit, fields)?.with_metrics(length, area))
}

fn derive_fields(
    tool: ToolType,
    length: f64,
    area: Option<f64>,
    config: Option<&ToolConfiguration>,
) -> TakeoffResult<MeasurementFields> {
    let missing = || TakeoffError::MissingConfiguration(tool);

    let fields = match (tool, config) {
        (ToolType::Trench, Some(ToolConfiguration::Trench(trench))) => {
            MeasurementFields::Trench(trench_fields(length, trench))
        }
        (ToolType::BoreShot, config) => MeasurementFields::BoreShot(run_fields(config)),
        (ToolType::Conduit, config) => MeasurementFields::Conduit(run_fields(config)),
        (ToolType::Vault, Some(ToolConfiguration::Vault(vault))) => {
            MeasurementFields::Vault(vault.clone())
        }
        (
            ToolType::HydroExcavationTrench,
            Some(ToolConfiguration::HydroExcavation(HydroExcavationConfig::Trench {
                width,
                depth,
            })),
        ) => MeasurementFields::HydroExcavationTrench(HydroTrenchFields {
            width: *width,
            depth: *depth,
            spoil_volume: yard_volume(length, *width, *depth),
        }),
        (
            ToolType::HydroExcavationHole,
            Some(ToolConfiguration::HydroExcavation(HydroExcavationConfig::Hole {
                hole_shape,
                depth,
            })),
        ) => MeasurementFields::HydroExcavationHole(HydroHoleFields {
            hole_shape: hole_shape.clone(),
            depth: *depth,
            volume: hole_shape.plan_area() * depth,
        }),
        (
            ToolType::HydroExcavationPothole,
            Some(ToolConfiguration::HydroExcavation(HydroExcavationConfig::Pothole {
                average_depth,
                depth_unit,
            })),
        ) => {
            let depth_in_meters = depth_unit.to_meters(*average_depth);
            MeasurementFields::HydroExcavationPothole(PotholeFields {
                average_depth: *average_depth,
                depth_unit: *depth_unit,
                depth_in_meters,
                radius: POTHOLE_BORE_RADIUS_M,
                volume: cylinder_volume(POTHOLE_BORE_RADIUS_M, depth_in_meters),
            })
        }
        (ToolType::Area, config) => {
            let default_area = AreaConfig::default();
            let area_config = match config {
                Some(ToolConfiguration::Area(area_config)) => area_config,
                _ => &default_area,
            };
            MeasurementFields::Area(AreaFields {
                height: area_config.height,
                volume: area_config.height.map(|h| area.unwrap_or(0.0) * h),
                material: area_config.material.clone(),
            })
        }
        (ToolType::Note, _) => MeasurementFields::Note,
        _ => return Err(missing()),
    };
    Ok(fields)
}

fn trench_fields(length: f64, config: &TrenchConfig) -> TrenchFields {
    let removal_volume = |spec: &Option<RemovalSpec>| {
        spec.as_ref()
            .map(|s| yard_volume(length, s.width, s.thickness))
    };

    TrenchFields {
        width: config.width,
        depth: config.depth,
        spoil_volume: yard_volume(length, config.width, config.depth),
        asphalt_removal: config.asphalt_removal.clone(),
        asphalt_volume: removal_volume(&config.asphalt_removal),
        concrete_removal: config.concrete_removal.clone(),
        concrete_volume: removal_volume(&config.concrete_removal),
        backfill: config.backfill.clone(),
        backfill_volume: config
            .backfill
            .as_ref()
            .map(|b| yard_volume(length, b.width, b.depth)),
        conduits: config.conduits.clone(),
    }
}

fn run_fields(config: Option<&ToolConfiguration>) -> ConduitRunFields {
    match config {
        Some(ToolConfiguration::BoreShot(ConduitRunConfig { conduits }))
        | Some(ToolConfiguration::Conduit(ConduitRunConfig { conduits })) => ConduitRunFields {
            conduits: conduits.clone(),
        },
        _ => ConduitRunFields::default(),
    }
}

/// length x width x depth in cubic feet, expressed in cubic yards
fn yard_volume(length: f64, width: f64, depth: f64) -> f64 {
    length * width * depth / CUBIC_FEET_PER_CUBIC_YARD
}

fn cylinder_volume(radius: f64, depth: f64) -> f64 {
    std::f64::consts::PI * radius * radius * depth
}
