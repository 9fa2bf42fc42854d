//! Drawing tool identifiers
//!
//! The set of tools is closed. Each tool maps to a geometry shape class and,
//! for configurable tools, to the configuration slot it reads from.

use crate::error::TakeoffError;
use std::fmt;
use std::str::FromStr;

/// Closed set of takeoff tool types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    Trench,
    BoreShot,
    Conduit,
    Vault,
    HydroExcavationTrench,
    HydroExcavationHole,
    HydroExcavationPothole,
    Area,
    Note,
}

/// Geometry class a tool produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    /// Placement marker (single point is sufficient)
    Point,
    /// Open path, at least two points
    LineString,
    /// Closed ring, at least three points
    Polygon,
}

impl ShapeClass {
    /// Minimum number of captured points needed to commit a gesture
    pub fn min_points(self) -> usize {
        match self {
            ShapeClass::Point => 1,
            ShapeClass::LineString => 2,
            ShapeClass::Polygon => 3,
        }
    }
}

/// Configuration slot shared by one or more tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSlot {
    Trench,
    BoreShot,
    Conduit,
    HydroExcavation,
    Vault,
    Area,
}

impl ToolType {
    pub const ALL: [ToolType; 9] = [
        ToolType::Trench,
        ToolType::BoreShot,
        ToolType::Conduit,
        ToolType::Vault,
        ToolType::HydroExcavationTrench,
        ToolType::HydroExcavationHole,
        ToolType::HydroExcavationPothole,
        ToolType::Area,
        ToolType::Note,
    ];

    /// Wire tag (kebab-case)
    pub fn tag(self) -> &'static str {
        match self {
            ToolType::Trench => "trench",
            ToolType::BoreShot => "bore-shot",
            ToolType::Conduit => "conduit",
            ToolType::Vault => "vault",
            ToolType::HydroExcavationTrench => "hydro-excavation-trench",
            ToolType::HydroExcavationHole => "hydro-excavation-hole",
            ToolType::HydroExcavationPothole => "hydro-excavation-pothole",
            ToolType::Area => "area",
            ToolType::Note => "note",
        }
    }

    /// Human-readable name used in labels
    pub fn display_name(self) -> &'static str {
        match self {
            ToolType::Trench => "Trench",
            ToolType::BoreShot => "Bore Shot",
            ToolType::Conduit => "Conduit",
            ToolType::Vault => "Vault",
            ToolType::HydroExcavationTrench => "Hydro Trench",
            ToolType::HydroExcavationHole => "Hydro Hole",
            ToolType::HydroExcavationPothole => "Pothole",
            ToolType::Area => "Area",
            ToolType::Note => "Note",
        }
    }

    pub fn shape_class(self) -> ShapeClass {
        match self {
            ToolType::Trench
            | ToolType::BoreShot
            | ToolType::Conduit
            | ToolType::HydroExcavationTrench => ShapeClass::LineString,
            ToolType::Area => ShapeClass::Polygon,
            ToolType::Vault
            | ToolType::HydroExcavationHole
            | ToolType::HydroExcavationPothole
            | ToolType::Note => ShapeClass::Point,
        }
    }

    /// Slot holding this tool's configuration, if it takes one
    pub fn config_slot(self) -> Option<ConfigSlot> {
        match self {
            ToolType::Trench => Some(ConfigSlot::Trench),
            ToolType::BoreShot => Some(ConfigSlot::BoreShot),
            ToolType::Conduit => Some(ConfigSlot::Conduit),
            ToolType::Vault => Some(ConfigSlot::Vault),
            ToolType::HydroExcavationTrench
            | ToolType::HydroExcavationHole
            | ToolType::HydroExcavationPothole => Some(ConfigSlot::HydroExcavation),
            ToolType::Area => Some(ConfigSlot::Area),
            ToolType::Note => None,
        }
    }

    /// True if drawing must be blocked until a configuration is attached
    ///
    /// Bore-shot, conduit and area fall back to defaults when unconfigured.
    pub fn requires_configuration(self) -> bool {
        matches!(
            self,
            ToolType::Trench
                | ToolType::Vault
                | ToolType::HydroExcavationTrench
                | ToolType::HydroExcavationHole
                | ToolType::HydroExcavationPothole
        )
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ToolType {
    type Err = TakeoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ToolType::ALL
            .into_iter()
            .find(|tool| tool.tag() == tag)
            .or(match tag {
                // Legacy aliases
                "yardage" => Some(ToolType::Area),
                "pothole" => Some(ToolType::HydroExcavationPothole),
                _ => None,
            })
            .ok_or_else(|| TakeoffError::UnsupportedToolType(s.to_string()))
    }
}
