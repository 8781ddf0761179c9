//! Preview command implementation: render a layer to PNG with resvg.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use layerpath::build_layer;

use super::common::{LayerArgs, lines_to_svg, load_outline, write_output};

/// Rasterise an SVG document to PNG bytes, `width` pixels wide.
pub fn render_png(svg: &str, width: u32) -> Result<Vec<u8>> {
    if width == 0 {
        bail!("image width must be positive");
    }

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).context("failed to parse generated SVG")?;

    let size = tree.size();
    let scale = width as f32 / size.width();
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("cannot allocate {}x{} image", width, height))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().context("failed to encode PNG")
}

/// Execute the preview command.
pub fn cmd_preview(
    input: &str,
    args: &LayerArgs,
    output: &Path,
    width: u32,
    travel: bool,
    index: usize,
) -> Result<()> {
    let outline = load_outline(input, index)?;
    let params = args.params()?;
    let layer = build_layer(&outline, &params).context("layer generation failed")?;

    let png = render_png(&lines_to_svg(&layer, Some(&outline), travel), width)?;
    info!("Rendered {} lines into {} bytes of PNG", layer.len(), png.len());
    write_output(Some(output), &png)
}
