//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::info;
use serde::Serialize;

use layerpath::{
    BoundingBox, InfillStage, LayerParams, LineGroup, Point, Shape, extract_shapes_from_svg,
    travel_distance,
};

use super::config::{Config, LayerEntry};

/// Output format for an ordered layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Svg,
    Json,
}

/// Infill stage as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    PartialRow,
    FullRow,
    FullField,
    TrimmedField,
}

impl From<StageArg> for InfillStage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::PartialRow => InfillStage::PartialRow,
            StageArg::FullRow => InfillStage::FullRow,
            StageArg::FullField => InfillStage::FullField,
            StageArg::TrimmedField => InfillStage::TrimmedField,
        }
    }
}

/// Layer parameters, from flags or from one entry of a config file.
#[derive(Args, Debug, Clone)]
pub struct LayerArgs {
    /// Take layer parameters from this config instead of the flags
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Config layer entry to use (cycled like layer numbers)
    #[arg(long, default_value = "0")]
    pub layer_index: usize,

    #[arg(long, default_value = "0.2")]
    pub layer_height: f64,

    #[arg(long, default_value = "0.5")]
    pub path_width: f64,

    /// Number of inward shells
    #[arg(long, default_value = "2")]
    pub shells: usize,

    /// Infill angle in degrees
    #[arg(short, long, default_value = "45")]
    pub angle: f64,

    /// Infill row spacing (default: path width)
    #[arg(short, long)]
    pub spacing: Option<f64>,

    #[arg(long, default_value = "0")]
    pub shift_x: f64,

    #[arg(long, default_value = "0")]
    pub shift_y: f64,

    /// Subtracted from the path width for each shell inset
    #[arg(long, default_value = "0")]
    pub trim_adjust: f64,
}

impl LayerArgs {
    /// Resolve to validated library parameters.
    pub fn params(&self) -> Result<LayerParams> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::single_layer(
                LayerEntry {
                    layer_height: self.layer_height,
                    path_width: self.path_width,
                    shells: self.shells,
                    infill_angle: self.angle,
                    infill_spacing: self.spacing,
                    infill_shift_x: self.shift_x,
                    infill_shift_y: self.shift_y,
                },
                self.trim_adjust,
            ),
        };
        config.validate()?;
        Ok(config.layer_params()[self.layer_index % config.layers.len()])
    }
}

/// Read an SVG file (or stdin for "-") and pick one closed outline.
pub fn load_outline(input: &str, index: usize) -> Result<Shape> {
    let content = if input == "-" {
        info!("Reading SVG from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read SVG from stdin")?;
        buffer
    } else {
        info!("Loading: {}", input);
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?
    };

    let shapes = extract_shapes_from_svg(&content)
        .with_context(|| format!("no usable outline in {}", input))?;
    let count = shapes.len();
    info!("Loaded {} outlines", count);

    shapes
        .into_iter()
        .nth(index)
        .with_context(|| format!("outline index {} out of range ({} found)", index, count))
}

/// Write to `path`, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content).context("failed to write to stdout")?;
        }
    }
    Ok(())
}

// ============================================================================
// SVG OUTPUT
// ============================================================================

fn bounds_of(lines: &LineGroup, outline: Option<&Shape>) -> BoundingBox {
    let mut bounds = match (lines.bounds(), outline) {
        (Some(b), Some(s)) => b.union(&s.bounds()),
        (Some(b), None) => b,
        (None, Some(s)) => s.bounds(),
        (None, None) => BoundingBox::from_point(Point::new(0.0, 0.0)),
    };
    let margin = (bounds.width().max(bounds.height()) * 0.05).max(1.0);
    bounds.include(Point::new(bounds.min_x - margin, bounds.min_y - margin));
    bounds.include(Point::new(bounds.max_x + margin, bounds.max_y + margin));
    bounds
}

/// Convert an ordered group to SVG (individual `<line>` elements).
///
/// The outline, when given, is drawn in grey underneath. With `travel`
/// set, pen-up moves between consecutive lines are drawn dashed.
pub fn lines_to_svg(lines: &LineGroup, outline: Option<&Shape>, travel: bool) -> String {
    let b = bounds_of(lines, outline);
    let stroke = (b.width().max(b.height()) / 400.0).max(0.01);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.3} {:.3} {:.3} {:.3}">
<rect x="{:.3}" y="{:.3}" width="100%" height="100%" fill="white"/>
"#,
        b.min_x,
        b.min_y,
        b.width(),
        b.height(),
        b.min_x,
        b.min_y
    ));

    if let Some(shape) = outline {
        svg.push_str(&format!(
            "<g stroke=\"#cccccc\" stroke-width=\"{:.4}\" fill=\"none\">\n<path d=\"M",
            stroke * 2.0
        ));
        for (i, pt) in shape.vertices().iter().enumerate() {
            if i == 0 {
                svg.push_str(&format!("{:.3},{:.3}", pt.x, pt.y));
            } else {
                svg.push_str(&format!(" L{:.3},{:.3}", pt.x, pt.y));
            }
        }
        svg.push_str(" Z\"/>\n</g>\n");
    }

    if travel && lines.len() > 1 {
        svg.push_str(&format!(
            "<g stroke=\"red\" stroke-width=\"{:.4}\" stroke-dasharray=\"{:.4}\" fill=\"none\">\n",
            stroke * 0.5,
            stroke * 3.0
        ));
        for pair in lines.lines().windows(2) {
            let (from, to) = (pair[0].end, pair[1].start);
            if from.approx_eq(to) {
                continue;
            }
            svg.push_str(&format!(
                "  <line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\"/>\n",
                from.x, from.y, to.x, to.y
            ));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str(&format!(
        "<g stroke=\"black\" stroke-width=\"{:.4}\" stroke-linecap=\"round\" fill=\"none\">\n",
        stroke
    ));
    for line in lines {
        svg.push_str(&format!(
            "  <line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\"/>\n",
            line.start.x, line.start.y, line.end.x, line.end.y
        ));
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

/// A line in JSON output format.
#[derive(Serialize)]
struct JsonLine {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// One ordered layer in JSON output format.
#[derive(Serialize)]
struct JsonLayer {
    line_count: usize,
    total_length: f64,
    travel_distance: f64,
    lines: Vec<JsonLine>,
}

/// Convert an ordered group to pretty-printed JSON.
pub fn lines_to_json(lines: &LineGroup) -> Result<String> {
    let layer = JsonLayer {
        line_count: lines.len(),
        total_length: lines.total_length(),
        travel_distance: travel_distance(lines, Point::new(0.0, 0.0)),
        lines: lines
            .iter()
            .map(|l| JsonLine { x1: l.start.x, y1: l.start.y, x2: l.end.x, y2: l.end.y })
            .collect(),
    };
    serde_json::to_string_pretty(&layer).context("failed to serialize layer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerpath::Line;

    fn two_lines() -> LineGroup {
        LineGroup::from_lines(vec![
            Line::from_coords(0.0, 0.0, 10.0, 0.0),
            Line::from_coords(10.0, 5.0, 0.0, 5.0),
        ])
    }

    #[test]
    fn svg_has_one_element_per_line() {
        let svg = lines_to_svg(&two_lines(), None, false);
        assert!(svg.starts_with("<?xml"));
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn svg_travel_moves_are_dashed() {
        let svg = lines_to_svg(&two_lines(), None, true);
        assert!(svg.contains("stroke-dasharray"));
        assert_eq!(svg.matches("<line").count(), 3);
    }

    #[test]
    fn json_lists_lines_in_order() {
        let json = lines_to_json(&two_lines()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["line_count"], 2);
        assert_eq!(value["lines"][1]["x1"], 10.0);
        assert_eq!(value["travel_distance"], 5.0);
    }

    #[test]
    fn stage_arg_maps_to_library_stage() {
        assert_eq!(InfillStage::from(StageArg::FullField), InfillStage::FullField);
    }
}
