//! Committed takeoff measurements
//!
//! A measurement is the result of one drawing gesture. Its type, geometry and
//! unit are fixed at commit time; only the notes may change afterwards.
//! Geometry is stored in drawing pixel space, derived metrics in the real
//! units that were in effect when the gesture was committed.

use crate::calibration::{convert_area, convert_length};
use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::{self, Point};
use crate::tool::{ShapeClass, ToolType};
use crate::tool_config::{
    BackfillSpec, Conduit, DepthUnit, HoleShape, RemovalSpec, VaultConfig,
};

/// Unique identifier for measurements
///
/// The nil UUID marks a measurement that has not been committed to a store.
pub type MeasurementId = uuid::Uuid;

/// Committed geometry in drawing pixel space
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    Polygon(Vec<Point>),
}

impl Geometry {
    /// Build the geometry class expected by `shape` from captured points
    ///
    /// Point markers take the first captured point.
    pub fn from_points(shape: ShapeClass, points: &[Point]) -> Option<Geometry> {
        if points.len() < shape.min_points() {
            return None;
        }
        Some(match shape {
            ShapeClass::Point => Geometry::Point(points[0]),
            ShapeClass::LineString => Geometry::LineString(points.to_vec()),
            ShapeClass::Polygon => Geometry::Polygon(points.to_vec()),
        })
    }

    pub fn shape_class(&self) -> ShapeClass {
        match self {
            Geometry::Point(_) => ShapeClass::Point,
            Geometry::LineString(_) => ShapeClass::LineString,
            Geometry::Polygon(_) => ShapeClass::Polygon,
        }
    }

    /// Vertices of the geometry
    pub fn points(&self) -> &[Point] {
        match self {
            Geometry::Point(point) => std::slice::from_ref(point),
            Geometry::LineString(points) | Geometry::Polygon(points) => points,
        }
    }

    /// True if the vertex count satisfies the shape class
    pub fn is_well_formed(&self) -> bool {
        self.points().len() >= self.shape_class().min_points()
    }

    /// Path length in pixels (polygons include the closing edge)
    pub fn pixel_length(&self) -> Option<f64> {
        match self {
            Geometry::Point(_) => None,
            Geometry::LineString(points) => Some(geometry::polyline_length(points)),
            Geometry::Polygon(points) => {
                let closing = match (points.first(), points.last()) {
                    (Some(first), Some(last)) => last.distance_to(first),
                    _ => 0.0,
                };
                Some(geometry::polyline_length(points) + closing)
            }
        }
    }

    /// Enclosed area in square pixels
    pub fn pixel_area(&self) -> Option<f64> {
        match self {
            Geometry::Polygon(points) => Some(geometry::polygon_area(points)),
            _ => None,
        }
    }
}

/// Trench excavation quantities
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrenchFields {
    pub width: f64,
    pub depth: f64,
    pub spoil_volume: f64,
    #[serde(default)]
    pub asphalt_removal: Option<RemovalSpec>,
    #[serde(default)]
    pub asphalt_volume: Option<f64>,
    #[serde(default)]
    pub concrete_removal: Option<RemovalSpec>,
    #[serde(default)]
    pub concrete_volume: Option<f64>,
    #[serde(default)]
    pub backfill: Option<BackfillSpec>,
    #[serde(default)]
    pub backfill_volume: Option<f64>,
    #[serde(default)]
    pub conduits: Vec<Conduit>,
}

/// Bore-shot and conduit run payload
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConduitRunFields {
    #[serde(default)]
    pub conduits: Vec<Conduit>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HydroTrenchFields {
    pub width: f64,
    pub depth: f64,
    pub spoil_volume: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HydroHoleFields {
    pub hole_shape: HoleShape,
    pub depth: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PotholeFields {
    pub average_depth: f64,
    pub depth_unit: DepthUnit,
    pub depth_in_meters: f64,
    /// Assumed bore radius in metres
    pub radius: f64,
    /// Cylinder volume in cubic metres
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaFields {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub material: Option<String>,
}

/// Type-specific payload; the variant is the measurement's type
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MeasurementFields {
    Trench(TrenchFields),
    BoreShot(ConduitRunFields),
    Conduit(ConduitRunFields),
    Vault(VaultConfig),
    HydroExcavationTrench(HydroTrenchFields),
    HydroExcavationHole(HydroHoleFields),
    HydroExcavationPothole(PotholeFields),
    Area(AreaFields),
    Note,
}

impl MeasurementFields {
    pub fn tool_type(&self) -> ToolType {
        match self {
            MeasurementFields::Trench(_) => ToolType::Trench,
            MeasurementFields::BoreShot(_) => ToolType::BoreShot,
            MeasurementFields::Conduit(_) => ToolType::Conduit,
            MeasurementFields::Vault(_) => ToolType::Vault,
            MeasurementFields::HydroExcavationTrench(_) => ToolType::HydroExcavationTrench,
            MeasurementFields::HydroExcavationHole(_) => ToolType::HydroExcavationHole,
            MeasurementFields::HydroExcavationPothole(_) => ToolType::HydroExcavationPothole,
            MeasurementFields::Area(_) => ToolType::Area,
            MeasurementFields::Note => ToolType::Note,
        }
    }
}

/// Post-commit edit; only notes are editable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementPatch {
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl MeasurementPatch {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(Some(notes.into())),
        }
    }

    pub fn clear_notes() -> Self {
        Self { notes: Some(None) }
    }
}

/// A committed takeoff measurement
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Measurement {
    id: MeasurementId,
    page_index: u16,
    geometry: Geometry,
    unit: String,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    area: Option<f64>,
    fields: MeasurementFields,
    #[serde(default)]
    notes: Option<String>,
}

impl Measurement {
    /// Create an uncommitted measurement (nil identity)
    ///
    /// Fails if the geometry class does not match the type's shape class.
    pub fn new(
        page_index: u16,
        geometry: Geometry,
        unit: impl Into<String>,
        fields: MeasurementFields,
    ) -> TakeoffResult<Self> {
        let measurement = Self {
            id: MeasurementId::nil(),
            page_index,
            geometry,
            unit: unit.into(),
            length: None,
            area: None,
            fields,
            notes: None,
        };
        measurement.validate()?;
        Ok(measurement)
    }

    pub(crate) fn with_metrics(mut self, length: Option<f64>, area: Option<f64>) -> Self {
        self.length = length;
        self.area = area;
        self
    }

    /// Check that the geometry agrees with the measurement type
    pub fn validate(&self) -> TakeoffResult<()> {
        let tool = self.tool_type();
        if self.geometry.shape_class() != tool.shape_class() || !self.geometry.is_well_formed() {
            return Err(TakeoffError::GeometryMismatch(tool));
        }
        Ok(())
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    /// True once a store has assigned an identity
    pub fn has_identity(&self) -> bool {
        !self.id.is_nil()
    }

    pub(crate) fn assign_id(&mut self, id: MeasurementId) {
        self.id = id;
    }

    /// Copy with the identity stripped, for re-adding as a new measurement
    pub fn without_identity(mut self) -> Self {
        self.id = MeasurementId::nil();
        self
    }

    pub fn page_index(&self) -> u16 {
        self.page_index
    }

    pub fn tool_type(&self) -> ToolType {
        self.fields.tool_type()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Unit in effect when the measurement was committed
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn length(&self) -> Option<f64> {
        self.length
    }

    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn fields(&self) -> &MeasurementFields {
        &self.fields
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Apply an edit patch
    pub fn apply(&mut self, patch: MeasurementPatch) {
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }

    /// Length converted into another linear unit
    pub fn length_in(&self, unit: &str) -> TakeoffResult<Option<f64>> {
        self.length
            .map(|length| convert_length(length, &self.unit, unit))
            .transpose()
    }

    /// Area converted into the square of another linear unit
    pub fn area_in(&self, unit: &str) -> TakeoffResult<Option<f64>> {
        self.area
            .map(|area| convert_area(area, &self.unit, unit))
            .transpose()
    }

    /// Conduits carried along this run
    pub fn conduits(&self) -> &[Conduit] {
        match &self.fields {
            MeasurementFields::Trench(trench) => &trench.conduits,
            MeasurementFields::BoreShot(run) | MeasurementFields::Conduit(run) => &run.conduits,
            _ => &[],
        }
    }

    /// Total length per conduit (count x run length), computed on demand
    pub fn conduit_totals(&self) -> Vec<(&Conduit, f64)> {
        let length = self.length.unwrap_or(0.0);
        self.conduits()
            .iter()
            .map(|conduit| (conduit, conduit.total_length(length)))
            .collect()
    }

    /// Where a label should be drawn, in pixel space
    pub fn label_position(&self) -> Point {
        match &self.geometry {
            Geometry::Point(point) => *point,
            Geometry::LineString(points) => {
                geometry::path_midpoint(points).unwrap_or(Point::new(0.0, 0.0))
            }
            Geometry::Polygon(points) => {
                geometry::vertex_centroid(points).unwrap_or(Point::new(0.0, 0.0))
            }
        }
    }

    /// Pixel-space bounds as (min_x, min_y, max_x, max_y)
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        geometry::bounding_box(self.geometry.points()).unwrap_or((0.0, 0.0, 0.0, 0.0))
    }

    /// Check if a pixel-space point selects this measurement
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        match &self.geometry {
            Geometry::Point(marker) => point.distance_to(marker) <= tolerance,
            Geometry::LineString(points) => geometry::point_near_polyline(point, points, tolerance),
            Geometry::Polygon(points) => {
                if geometry::point_in_polygon(point, points) {
                    return true;
                }
                let mut ring = points.clone();
                if let Some(first) = points.first() {
                    ring.push(*first);
                }
                geometry::point_near_polyline(point, &ring, tolerance)
            }
        }
    }
}
