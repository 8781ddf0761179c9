//! Print configuration files.
//!
//! A config is a YAML (or JSON) document with machine settings, a list of
//! layer entries cycled over successive layers, and the parts to print.
//! Everything except `layers` has defaults.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use layerpath::{LayerParams, PartParams};

/// A complete print job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Machine-level settings
    #[serde(default)]
    pub print: PrintSettings,

    /// Layer entries, used in turn for layer 1, 2, 3, ...
    pub layers: Vec<LayerEntry>,

    /// Parts to print (default: one part of 10 layers)
    #[serde(default = "default_parts")]
    pub parts: Vec<PartEntry>,
}

/// Machine and material settings shared by every part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Z of the build surface
    pub first_layer_z: f64,
    /// Subtracted from the path width for each shell inset
    pub trim_adjust: f64,
    pub filament_diameter: f64,
    /// Travels at least this long retract and lift first
    pub max_feed_traverse: f64,
    pub travel_speed: f64,
    pub retract_distance: f64,
    pub retract_speed: f64,
    /// Lift above the layer while travelling retracted
    pub z_clearance: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            first_layer_z: 0.0,
            trim_adjust: 0.0,
            filament_diameter: 1.75,
            max_feed_traverse: 10.0,
            travel_speed: 6000.0,
            retract_distance: 1.0,
            retract_speed: 1800.0,
            z_clearance: 1.0,
        }
    }
}

impl PrintSettings {
    /// Cross-section of the filament.
    pub fn filament_area(&self) -> f64 {
        let r = self.filament_diameter / 2.0;
        PI * r * r
    }
}

/// Parameters for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerEntry {
    #[serde(default = "default_layer_height")]
    pub layer_height: f64,

    #[serde(default = "default_path_width")]
    pub path_width: f64,

    #[serde(default = "default_shells")]
    pub shells: usize,

    /// Infill angle in degrees
    #[serde(default = "default_infill_angle")]
    pub infill_angle: f64,

    /// Row spacing (default: path width)
    #[serde(default)]
    pub infill_spacing: Option<f64>,

    #[serde(default)]
    pub infill_shift_x: f64,

    #[serde(default)]
    pub infill_shift_y: f64,
}

fn default_layer_height() -> f64 {
    0.2
}

fn default_path_width() -> f64 {
    0.5
}

fn default_shells() -> usize {
    2
}

fn default_infill_angle() -> f64 {
    45.0
}

/// One part: a stack of layers at an XY offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartEntry {
    /// Number of layers
    pub layers: usize,

    #[serde(default)]
    pub shift_x: f64,

    #[serde(default)]
    pub shift_y: f64,

    /// Fraction of a full bead to extrude
    #[serde(default = "default_solidity")]
    pub solidity_ratio: f64,

    /// Feed rate for extruding moves
    #[serde(default = "default_print_speed")]
    pub print_speed: f64,
}

fn default_solidity() -> f64 {
    1.0
}

fn default_print_speed() -> f64 {
    2000.0
}

fn default_parts() -> Vec<PartEntry> {
    vec![PartEntry {
        layers: 10,
        shift_x: 0.0,
        shift_y: 0.0,
        solidity_ratio: default_solidity(),
        print_speed: default_print_speed(),
    }]
}

impl PartEntry {
    pub fn part_params(&self) -> PartParams {
        PartParams { layer_count: self.layers, shift_x: self.shift_x, shift_y: self.shift_y }
    }
}

impl Config {
    /// Load a config, picking JSON or YAML by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config: Config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON config {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config {}", path.display()))?
        };
        config.validate().with_context(|| format!("in config {}", path.display()))?;
        Ok(config)
    }

    /// A config with one layer entry and default everything else.
    pub fn single_layer(layer: LayerEntry, trim_adjust: f64) -> Self {
        Self {
            print: PrintSettings { trim_adjust, ..PrintSettings::default() },
            layers: vec![layer],
            parts: default_parts(),
        }
    }

    /// Check every value the geometry and G-code depend on.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.layers.is_empty(), "config needs at least one layer entry");
        ensure!(!self.parts.is_empty(), "config needs at least one part");

        let p = &self.print;
        ensure!(p.filament_diameter > 0.0, "filament_diameter must be positive");
        ensure!(p.max_feed_traverse >= 0.0, "max_feed_traverse must not be negative");
        ensure!(p.travel_speed > 0.0, "travel_speed must be positive");
        ensure!(p.retract_speed > 0.0, "retract_speed must be positive");

        for (i, layer) in self.layers.iter().enumerate() {
            ensure!(layer.layer_height > 0.0, "layer {}: layer_height must be positive", i);
            ensure!(layer.path_width > 0.0, "layer {}: path_width must be positive", i);
            ensure!(
                layer.path_width - p.trim_adjust > 0.0 || layer.shells == 0,
                "layer {}: trim_adjust {} leaves no inset for path_width {}",
                i,
                p.trim_adjust,
                layer.path_width
            );
            if let Some(spacing) = layer.infill_spacing {
                ensure!(spacing > 0.0, "layer {}: infill_spacing must be positive", i);
            }
        }

        for (i, part) in self.parts.iter().enumerate() {
            ensure!(part.solidity_ratio > 0.0, "part {}: solidity_ratio must be positive", i);
            ensure!(part.print_speed > 0.0, "part {}: print_speed must be positive", i);
        }
        Ok(())
    }

    /// Library parameters for every layer entry, in order.
    pub fn layer_params(&self) -> Vec<LayerParams> {
        self.layers
            .iter()
            .map(|l| LayerParams {
                layer_height: l.layer_height,
                path_width: l.path_width,
                shell_count: l.shells,
                infill_angle: l.infill_angle,
                infill_spacing: l.infill_spacing.unwrap_or(l.path_width),
                infill_shift_x: l.infill_shift_x,
                infill_shift_y: l.infill_shift_y,
                trim_adjust: self.print.trim_adjust,
            })
            .collect()
    }
}
