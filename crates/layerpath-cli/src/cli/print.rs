//! Print command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use layerpath::PartPlanner;

use super::common::{load_outline, write_output};
use super::config::Config;
use super::gcode::GcodeWriter;

/// Execute the print command: G-code for every part of the config.
pub fn cmd_print(input: &str, config_path: &Path, output: Option<&Path>, index: usize) -> Result<()> {
    let config = Config::load(config_path)?;
    let outline = load_outline(input, index)?;
    let layer_params = config.layer_params();

    let mut planner = PartPlanner::new(&outline, config.print.first_layer_z);
    let mut writer = GcodeWriter::new(&config.print);
    writer.start(input);

    for (i, part) in config.parts.iter().enumerate() {
        let layers = planner
            .plan_part(&part.part_params(), &layer_params)
            .with_context(|| format!("part {} failed", i + 1))?;
        let used = writer.write_part(part, &layers);
        info!("Part {}: {} layers, {:.1} mm filament", i + 1, layers.len(), used);
    }

    info!(
        "Built {} distinct layers ({} reused)",
        planner.cache().len(),
        planner.cache().hits()
    );
    write_output(output, writer.finish().as_bytes())
}
