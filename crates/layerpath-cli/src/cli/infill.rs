//! Infill command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use layerpath::{InfillGenerator, InfillStage};

use super::common::{StageArg, lines_to_svg, load_outline, write_output};

/// Settings for one infill run.
#[derive(Debug, Clone, Copy)]
pub struct InfillSettings {
    pub stage: StageArg,
    pub angle: f64,
    pub spacing: f64,
    pub shift_x: f64,
    pub shift_y: f64,
}

/// Execute the infill command: run the pipeline up to a stage, write SVG.
pub fn cmd_infill(
    input: &str,
    settings: &InfillSettings,
    output: Option<&Path>,
    index: usize,
) -> Result<()> {
    let outline = load_outline(input, index)?;
    let stage = InfillStage::from(settings.stage);

    let pattern = InfillGenerator::new(&outline, settings.angle, settings.spacing)
        .with_shift(settings.shift_x, settings.shift_y)
        .generate_until(stage)
        .with_context(|| format!("infill failed at or before stage {}", stage.name()))?;

    info!("Infill ({}): {} lines", stage.name(), pattern.len());
    write_output(output, lines_to_svg(&pattern, Some(&outline), false).as_bytes())
}
