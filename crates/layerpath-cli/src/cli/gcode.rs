//! G-code serialization of planned parts.
//!
//! Absolute positioning and absolute extrusion throughout. Each part's
//! layers are drawn in order: short travels are plain rapid moves, long
//! ones retract and lift first and approach again after.

use chrono::Local;
use log::debug;

use layerpath::{Line, PlacedLayer, Point};

use super::config::{PartEntry, PrintSettings};

/// G-code command types.
#[derive(Clone, Debug, PartialEq)]
pub enum GcodeCommand {
    /// G0 - Rapid move (travel)
    RapidMove {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        f: Option<f64>,
    },
    /// G1 - Linear move (extrusion or filament only)
    LinearMove {
        x: Option<f64>,
        y: Option<f64>,
        e: Option<f64>,
        f: Option<f64>,
    },
    /// Comment
    Comment(String),
    /// Raw G-code line
    Raw(String),
}

impl GcodeCommand {
    /// Convert the command to a G-code string.
    pub fn to_gcode(&self) -> String {
        match self {
            GcodeCommand::RapidMove { x, y, z, f } => {
                let mut cmd = String::from("G0");
                if let Some(v) = x {
                    cmd.push_str(&format!(" X{:.3}", v));
                }
                if let Some(v) = y {
                    cmd.push_str(&format!(" Y{:.3}", v));
                }
                if let Some(v) = z {
                    cmd.push_str(&format!(" Z{:.3}", v));
                }
                if let Some(v) = f {
                    cmd.push_str(&format!(" F{:.0}", v));
                }
                cmd
            }
            GcodeCommand::LinearMove { x, y, e, f } => {
                let mut cmd = String::from("G1");
                if let Some(v) = x {
                    cmd.push_str(&format!(" X{:.3}", v));
                }
                if let Some(v) = y {
                    cmd.push_str(&format!(" Y{:.3}", v));
                }
                if let Some(v) = e {
                    cmd.push_str(&format!(" E{:.5}", v));
                }
                if let Some(v) = f {
                    cmd.push_str(&format!(" F{:.0}", v));
                }
                cmd
            }
            GcodeCommand::Comment(text) => format!(";{}", text),
            GcodeCommand::Raw(line) => line.clone(),
        }
    }
}

/// Accumulates G-code for a whole print job.
pub struct GcodeWriter<'a> {
    settings: &'a PrintSettings,
    out: String,
    part_count: usize,
}

impl<'a> GcodeWriter<'a> {
    pub fn new(settings: &'a PrintSettings) -> Self {
        Self { settings, out: String::new(), part_count: 0 }
    }

    fn emit(&mut self, cmd: GcodeCommand) {
        self.out.push_str(&cmd.to_gcode());
        self.out.push('\n');
    }

    fn comment(&mut self, text: impl Into<String>) {
        self.emit(GcodeCommand::Comment(text.into()));
    }

    fn raw(&mut self, line: &str) {
        self.emit(GcodeCommand::Raw(line.to_string()));
    }

    /// Header and machine setup.
    pub fn start(&mut self, source: &str) {
        self.comment(format!(
            "Generated by layerpath {} on {}",
            env!("CARGO_PKG_VERSION"),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.comment(format!("Outline: {}", source));
        self.raw("G21 ; millimetres");
        self.raw("G90 ; absolute positioning");
        self.raw("M82 ; absolute extrusion");
        self.raw("G92 E0");
    }

    /// Every layer of one part. Returns the filament used by the part.
    pub fn write_part(&mut self, part: &PartEntry, layers: &[PlacedLayer]) -> f64 {
        self.part_count += 1;
        self.out.push('\n');
        self.comment(format!("Part number: {}", self.part_count));
        self.comment(format!("{:?}", part));
        // Extrusion restarts from zero for every part.
        self.raw("G92 E0");

        let mut total = 0.0;
        for layer in layers {
            total = self.write_layer(part, layer, layers.len(), total);
        }

        self.comment(format!("Extrusion amount for part is ({:.1} mm)", total));
        debug!("gcode: part {} uses {:.3} mm filament", self.part_count, total);
        total
    }

    fn write_layer(&mut self, part: &PartEntry, layer: &PlacedLayer, of: usize, mut total: f64) -> f64 {
        let Some(first) = layer.lines.first().copied() else {
            self.comment(format!("Layer: {} (empty)", layer.number));
            return total;
        };

        let params = &layer.params;
        let rate = part.solidity_ratio * params.layer_height * params.path_width
            / self.settings.filament_area();

        self.comment(format!("Layer: {}", layer.number));
        self.comment(format!("{:?}", params));
        self.raw(&format!("M117 Layer {} of {}..", layer.number, of));

        self.travel_to(first.start);
        self.approach(layer.z, total);

        let mut lines = layer.lines.clone();
        lines.set_extrusion_rate(rate);

        let mut prev = first.start;
        for line in &lines {
            if !prev.approx_eq(line.start) {
                if prev.distance(line.start) < self.settings.max_feed_traverse {
                    self.travel_to(line.start);
                } else {
                    self.retract(layer.z, total);
                    self.travel_to(line.start);
                    self.approach(layer.z, total);
                }
            }
            total += extrusion_for(line, rate);
            self.emit(GcodeCommand::LinearMove {
                x: Some(line.end.x),
                y: Some(line.end.y),
                e: Some(total),
                f: Some(part.print_speed),
            });
            prev = line.end;
        }

        self.retract(layer.z, total);
        self.out.push('\n');
        total
    }

    fn travel_to(&mut self, to: Point) {
        self.emit(GcodeCommand::RapidMove {
            x: Some(to.x),
            y: Some(to.y),
            z: None,
            f: Some(self.settings.travel_speed),
        });
    }

    /// Pull filament back and lift clear of the layer.
    fn retract(&mut self, z: f64, total: f64) {
        self.emit(GcodeCommand::LinearMove {
            x: None,
            y: None,
            e: Some(total - self.settings.retract_distance),
            f: Some(self.settings.retract_speed),
        });
        self.emit(GcodeCommand::RapidMove {
            x: None,
            y: None,
            z: Some(z + self.settings.z_clearance),
            f: Some(self.settings.travel_speed),
        });
    }

    /// Drop to the layer and push the filament back to `total`.
    fn approach(&mut self, z: f64, total: f64) {
        self.emit(GcodeCommand::RapidMove {
            x: None,
            y: None,
            z: Some(z),
            f: Some(self.settings.travel_speed),
        });
        self.emit(GcodeCommand::LinearMove {
            x: None,
            y: None,
            e: Some(total),
            f: Some(self.settings.retract_speed),
        });
    }

    /// Footer; returns the finished program.
    pub fn finish(mut self) -> String {
        self.out.push('\n');
        self.raw("M104 S0 ; hotend off");
        self.raw("M84 ; motors off");
        self.comment("End of program");
        self.out
    }
}

/// Filament needed to draw `line`, using its own rate when tagged.
fn extrusion_for(line: &Line, fallback_rate: f64) -> f64 {
    line.length() * line.extrusion_rate.unwrap_or(fallback_rate)
}
