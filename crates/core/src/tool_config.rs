//! Per-tool configuration and the registry of active tool state
//!
//! Configurations are supplied by the host before a gesture is drawn and are
//! read-only to the engine. Derived measurements copy what they need, so
//! replacing a configuration never changes measurements already committed.

use crate::tool::{ConfigSlot, ToolType};
use std::collections::HashMap;

/// A conduit bundle laid along a run
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Conduit {
    /// Nominal size label (e.g. "2\"")
    pub size: String,
    /// Material (e.g. "PVC", "HDPE")
    #[serde(default)]
    pub material: String,
    /// Number of parallel conduits
    pub count: u32,
}

impl Conduit {
    /// Total conduit length for a run of `run_length`
    pub fn total_length(&self, run_length: f64) -> f64 {
        f64::from(self.count) * run_length
    }
}

/// Surface removal band (asphalt or concrete)
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RemovalSpec {
    pub width: f64,
    pub thickness: f64,
}

/// Backfill band placed back into the trench
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackfillSpec {
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrenchConfig {
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub asphalt_removal: Option<RemovalSpec>,
    #[serde(default)]
    pub concrete_removal: Option<RemovalSpec>,
    #[serde(default)]
    pub backfill: Option<BackfillSpec>,
    #[serde(default)]
    pub conduits: Vec<Conduit>,
}

impl TrenchConfig {
    pub fn new(width: f64, depth: f64) -> Self {
        Self {
            width,
            depth,
            asphalt_removal: None,
            concrete_removal: None,
            backfill: None,
            conduits: Vec::new(),
        }
    }
}

/// Configuration shared by bore-shot and conduit runs
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConduitRunConfig {
    #[serde(default)]
    pub conduits: Vec<Conduit>,
}

/// Unit of a configured depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthUnit {
    Inches,
    Feet,
    Meters,
}

impl DepthUnit {
    pub fn to_meters(self, depth: f64) -> f64 {
        match self {
            DepthUnit::Inches => depth * 0.0254,
            DepthUnit::Feet => depth * 0.3048,
            DepthUnit::Meters => depth,
        }
    }
}

/// Plan shape of a hydro-excavated hole
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum HoleShape {
    Rectangle { length: f64, width: f64 },
    Circle { radius: f64 },
}

impl HoleShape {
    /// Plan area of the hole
    pub fn plan_area(&self) -> f64 {
        match self {
            HoleShape::Rectangle { length, width } => length * width,
            HoleShape::Circle { radius } => std::f64::consts::PI * radius * radius,
        }
    }
}

/// Hydro-excavation parameters, by excavation kind
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HydroExcavationConfig {
    Trench { width: f64, depth: f64 },
    Hole { hole_shape: HoleShape, depth: f64 },
    Pothole { average_depth: f64, depth_unit: DepthUnit },
}

impl HydroExcavationConfig {
    /// Tool that this configuration kind serves
    pub fn tool_type(&self) -> ToolType {
        match self {
            HydroExcavationConfig::Trench { .. } => ToolType::HydroExcavationTrench,
            HydroExcavationConfig::Hole { .. } => ToolType::HydroExcavationHole,
            HydroExcavationConfig::Pothole { .. } => ToolType::HydroExcavationPothole,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VaultDimensions {
    pub length: f64,
    pub width: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HoleSize {
    pub length: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VaultConfig {
    pub dimensions: VaultDimensions,
    pub hole_size: HoleSize,
    #[serde(default)]
    pub excavation_volume: Option<f64>,
    #[serde(default)]
    pub asphalt_removal_volume: Option<f64>,
    #[serde(default)]
    pub concrete_removal_volume: Option<f64>,
    #[serde(default)]
    pub backfill_volume: Option<f64>,
    #[serde(default)]
    pub restoration_volume: Option<f64>,
    #[serde(default)]
    pub backfill_type: Option<String>,
    #[serde(default)]
    pub traffic_rated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaConfig {
    /// Fill height; turns area into volume when present
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub material: Option<String>,
}

/// Configuration object for one configurable tool slot
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "tool", content = "config", rename_all = "kebab-case")]
pub enum ToolConfiguration {
    Trench(TrenchConfig),
    BoreShot(ConduitRunConfig),
    Conduit(ConduitRunConfig),
    HydroExcavation(HydroExcavationConfig),
    Vault(VaultConfig),
    Area(AreaConfig),
}

impl ToolConfiguration {
    pub fn slot(&self) -> ConfigSlot {
        match self {
            ToolConfiguration::Trench(_) => ConfigSlot::Trench,
            ToolConfiguration::BoreShot(_) => ConfigSlot::BoreShot,
            ToolConfiguration::Conduit(_) => ConfigSlot::Conduit,
            ToolConfiguration::HydroExcavation(_) => ConfigSlot::HydroExcavation,
            ToolConfiguration::Vault(_) => ConfigSlot::Vault,
            ToolConfiguration::Area(_) => ConfigSlot::Area,
        }
    }

    /// True if this configuration can parameterize `tool`
    pub fn applies_to(&self, tool: ToolType) -> bool {
        match self {
            ToolConfiguration::HydroExcavation(hydro) => hydro.tool_type() == tool,
            other => tool.config_slot() == Some(other.slot()),
        }
    }
}

/// Active tool plus the configuration attached to each slot
#[derive(Debug, Clone, Default)]
pub struct ToolConfigRegistry {
    active_tool: Option<ToolType>,
    configs: HashMap<ConfigSlot, ToolConfiguration>,
}

impl ToolConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        tracing::debug!(tool = %tool, "tool selected");
        self.active_tool = Some(tool);
    }

    pub fn clear_tool(&mut self) {
        self.active_tool = None;
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    /// Attach a configuration, replacing the one in the same slot
    pub fn set_config(&mut self, config: ToolConfiguration) -> Option<ToolConfiguration> {
        self.configs.insert(config.slot(), config)
    }

    pub fn clear_config(&mut self, slot: ConfigSlot) -> Option<ToolConfiguration> {
        self.configs.remove(&slot)
    }

    /// Configuration usable by `tool`, if attached
    ///
    /// A hydro-excavation configuration of a different kind does not count.
    pub fn config_for(&self, tool: ToolType) -> Option<&ToolConfiguration> {
        let slot = tool.config_slot()?;
        self.configs
            .get(&slot)
            .filter(|config| config.applies_to(tool))
    }

    /// True if `tool` may start a gesture with the current configuration
    pub fn is_ready(&self, tool: ToolType) -> bool {
        !tool.requires_configuration() || self.config_for(tool).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conduit_total_length() {
        let conduit = Conduit {
            size: "2\"".to_string(),
            material: "PVC".to_string(),
            count: 3,
        };
        assert_eq!(conduit.total_length(20.0), 60.0);
    }

    #[test]
    fn test_depth_unit_to_meters() {
        assert!((DepthUnit::Inches.to_meters(8.0) - 0.2032).abs() < 1e-12);
        assert!((DepthUnit::Feet.to_meters(2.0) - 0.6096).abs() < 1e-12);
        assert_eq!(DepthUnit::Meters.to_meters(1.5), 1.5);
    }

    #[test]
    fn test_registry_readiness() {
        let mut registry = ToolConfigRegistry::new();
        assert!(!registry.is_ready(ToolType::Trench));
        assert!(registry.is_ready(ToolType::BoreShot));
        assert!(registry.is_ready(ToolType::Note));

        registry.set_config(ToolConfiguration::Trench(TrenchConfig::new(2.0, 3.0)));
        assert!(registry.is_ready(ToolType::Trench));
    }

    #[test]
    fn test_hydro_kind_must_match_tool() {
        let mut registry = ToolConfigRegistry::new();
        registry.set_config(ToolConfiguration::HydroExcavation(
            HydroExcavationConfig::Pothole {
                average_depth: 8.0,
                depth_unit: DepthUnit::Inches,
            },
        ));
        assert!(registry.is_ready(ToolType::HydroExcavationPothole));
        assert!(!registry.is_ready(ToolType::HydroExcavationHole));
        assert!(registry.config_for(ToolType::HydroExcavationTrench).is_none());
    }

    #[test]
    fn test_set_config_replaces_slot() {
        let mut registry = ToolConfigRegistry::new();
        assert!(registry
            .set_config(ToolConfiguration::Trench(TrenchConfig::new(1.0, 1.0)))
            .is_none());
        let previous =
            registry.set_config(ToolConfiguration::Trench(TrenchConfig::new(2.0, 4.0)));
        assert_eq!(
            previous,
            Some(ToolConfiguration::Trench(TrenchConfig::new(1.0, 1.0)))
        );
    }

    #[test]
    fn test_configuration_json_shape() {
        let json = r#"{"tool":"hydro-excavation","config":{"kind":"hole","hole_shape":{"shape":"circle","radius":0.5},"depth":1.2}}"#;
        let config: ToolConfiguration = serde_json::from_str(json).unwrap();
        assert!(config.applies_to(ToolType::HydroExcavationHole));
        assert!(!config.applies_to(ToolType::Trench));

        let json = r#"{"tool":"trench","config":{"width":2,"depth":3}}"#;
        let config: ToolConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config, ToolConfiguration::Trench(TrenchConfig::new(2.0, 3.0)));
    }
}
