//! Project configuration for orrery
//!
//! Configuration is stored in `.orrery/config.toml` and holds every layout
//! tunable. All fields have defaults, so a partial file (or none) works.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::layout::{LayoutError, LayoutStrategy};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Layout configuration
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
}

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Strategy used when none is given on the command line
    #[serde(default)]
    pub strategy: LayoutStrategy,

    /// Viewport width used by the force layout
    #[serde(default = "default_width")]
    pub width: f64,

    /// Viewport height used by the force layout
    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default)]
    pub dag: DagConfig,

    #[serde(default)]
    pub force: ForceConfig,
}

fn default_width() -> f64 {
    1200.0
}

fn default_height() -> f64 {
    800.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::default(),
            width: default_width(),
            height: default_height(),
            dag: DagConfig::default(),
            force: ForceConfig::default(),
        }
    }
}

/// Layered DAG layout tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagConfig {
    /// Horizontal distance between depth columns
    #[serde(default = "default_column_width")]
    pub column_width: f64,

    /// Vertical distance between nodes in a column
    #[serde(default = "default_row_height")]
    pub row_height: f64,

    /// Offset of the first column and row from the origin
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Barycentric reordering sweeps, alternating direction
    #[serde(default = "default_sweeps")]
    pub sweeps: usize,
}

fn default_column_width() -> f64 {
    240.0
}

fn default_row_height() -> f64 {
    120.0
}

fn default_padding() -> f64 {
    40.0
}

fn default_sweeps() -> usize {
    4
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            column_width: default_column_width(),
            row_height: default_row_height(),
            padding: default_padding(),
            sweeps: default_sweeps(),
        }
    }
}

/// Force-directed simulation tunables.
///
/// Strengths are starting points tuned by eye, not derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceConfig {
    /// Pairwise repulsion constant (`k / d²`)
    #[serde(default = "default_repulsion_strength")]
    pub repulsion_strength: f64,

    /// Rest length of edge springs
    #[serde(default = "default_link_distance")]
    pub link_distance: f64,

    /// Edge spring stiffness
    #[serde(default = "default_link_strength")]
    pub link_strength: f64,

    /// Node radius; collision passes push overlapping centers toward twice this apart
    #[serde(default = "default_collision_radius")]
    pub collision_radius: f64,

    /// Collision relaxation passes per step
    #[serde(default = "default_collision_iterations")]
    pub collision_iterations: usize,

    /// Pull toward the depth-derived ring
    #[serde(default = "default_radial_strength")]
    pub radial_strength: f64,

    /// Pull toward the viewport center
    #[serde(default = "default_center_strength")]
    pub center_strength: f64,

    /// Fraction of the gap between alpha and its target closed each step
    #[serde(default = "default_alpha_decay")]
    pub alpha_decay: f64,

    /// Alpha below which the simulation counts as settled
    #[serde(default = "default_alpha_min")]
    pub alpha_min: f64,

    /// Fraction of velocity lost each step
    #[serde(default = "default_velocity_decay")]
    pub velocity_decay: f64,

    /// Ring spacing per depth level for the radial hint
    #[serde(default = "default_layer_spacing")]
    pub layer_spacing: f64,

    /// Floor for pair distance in the repulsion term
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Alpha target held while a node is dragged
    #[serde(default = "default_drag_alpha_target")]
    pub drag_alpha_target: f64,

    /// Upper bound on steps for single-shot layouts
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_repulsion_strength() -> f64 {
    3000.0
}

fn default_link_distance() -> f64 {
    150.0
}

fn default_link_strength() -> f64 {
    0.3
}

fn default_collision_radius() -> f64 {
    40.0
}

fn default_collision_iterations() -> usize {
    3
}

fn default_radial_strength() -> f64 {
    0.05
}

fn default_center_strength() -> f64 {
    0.02
}

fn default_alpha_decay() -> f64 {
    // 1 - 0.001^(1/300): cools from 1.0 to alpha_min in about 300 steps
    0.0228
}

fn default_alpha_min() -> f64 {
    0.001
}

fn default_velocity_decay() -> f64 {
    0.4
}

fn default_layer_spacing() -> f64 {
    180.0
}

fn default_min_distance() -> f64 {
    1.0
}

fn default_drag_alpha_target() -> f64 {
    0.3
}

fn default_max_iterations() -> usize {
    2000
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: default_repulsion_strength(),
            link_distance: default_link_distance(),
            link_strength: default_link_strength(),
            collision_radius: default_collision_radius(),
            collision_iterations: default_collision_iterations(),
            radial_strength: default_radial_strength(),
            center_strength: default_center_strength(),
            alpha_decay: default_alpha_decay(),
            alpha_min: default_alpha_min(),
            velocity_decay: default_velocity_decay(),
            layer_spacing: default_layer_spacing(),
            min_distance: default_min_distance(),
            drag_alpha_target: default_drag_alpha_target(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!("{} must be finite", name)))
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), LayoutError> {
    check_finite(name, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

impl DagConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        check_finite("column_width", self.column_width)?;
        check_finite("row_height", self.row_height)?;
        check_finite("padding", self.padding)?;
        Ok(())
    }
}

impl ForceConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        check_finite("repulsion_strength", self.repulsion_strength)?;
        check_finite("link_distance", self.link_distance)?;
        check_finite("link_strength", self.link_strength)?;
        check_finite("collision_radius", self.collision_radius)?;
        check_finite("radial_strength", self.radial_strength)?;
        check_finite("center_strength", self.center_strength)?;
        check_finite("layer_spacing", self.layer_spacing)?;
        check_unit("alpha_decay", self.alpha_decay)?;
        check_unit("alpha_min", self.alpha_min)?;
        check_unit("velocity_decay", self.velocity_decay)?;
        check_unit("drag_alpha_target", self.drag_alpha_target)?;
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(LayoutError::InvalidConfig(
                "min_distance must be positive".to_string(),
            ));
        }
        if self.collision_radius < 0.0 {
            return Err(LayoutError::InvalidConfig(
                "collision_radius must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        check_finite("width", self.width)?;
        check_finite("height", self.height)?;
        self.dag.validate()?;
        self.force.validate()
    }
}

impl Config {
    /// Load configuration from .orrery/config.toml
    /// Returns default config if file doesn't exist
    pub fn load(orrery_dir: &Path) -> anyhow::Result<Self> {
        let config_path = orrery_dir.join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config: {}", e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        config.layout.validate()?;
        Ok(config)
    }

    /// Save configuration to .orrery/config.toml
    pub fn save(&self, orrery_dir: &Path) -> anyhow::Result<()> {
        let config_path = orrery_dir.join("config.toml");

        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

        fs::write(&config_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {}", e))?;

        Ok(())
    }

    /// Initialize default config file if it doesn't exist
    pub fn init(orrery_dir: &Path) -> anyhow::Result<bool> {
        let config_path = orrery_dir.join("config.toml");

        if config_path.exists() {
            return Ok(false);
        }

        let config = Self::default();
        config.save(orrery_dir)?;
        Ok(true)
    }
}
