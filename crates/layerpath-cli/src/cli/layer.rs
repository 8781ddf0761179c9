//! Layer command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use layerpath::{Point, build_layer, travel_distance};

use super::common::{LayerArgs, OutputFormat, lines_to_json, lines_to_svg, load_outline, write_output};

/// Execute the layer command: one ordered layer as SVG or JSON.
pub fn cmd_layer(
    input: &str,
    args: &LayerArgs,
    format: OutputFormat,
    travel: bool,
    output: Option<&Path>,
    index: usize,
) -> Result<()> {
    let outline = load_outline(input, index)?;
    let params = args.params()?;
    let layer = build_layer(&outline, &params).context("layer generation failed")?;

    info!(
        "Layer: {} lines, {:.1} drawn, {:.1} travel",
        layer.len(),
        layer.total_length(),
        travel_distance(&layer, Point::new(0.0, 0.0))
    );

    let content = match format {
        OutputFormat::Svg => lines_to_svg(&layer, Some(&outline), travel),
        OutputFormat::Json => lines_to_json(&layer)?,
    };
    write_output(output, content.as_bytes())
}
