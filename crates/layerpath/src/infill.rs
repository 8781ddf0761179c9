//! Infill generation: tile a repeating pattern over a boundary, then trim.
//!
//! The generator is a short pipeline. A seed pattern (by default one long
//! horizontal segment) is extended into a row wide enough to cross the
//! boundary, the row is stacked into a field tall enough to cover it, and
//! the field is trimmed to the boundary. Each step is a plain function; a
//! caller may stop after any of them to inspect the intermediate pattern.
//!
//! A fill angle never rotates the pattern. Instead the boundary is rotated
//! into the pattern's frame, the pipeline runs axis-aligned, and the result
//! is rotated back.

use std::f64::consts::PI;

use log::{debug, warn};

use crate::error::GeometryError;
use crate::geometry::{EPSILON, Line, Point};
use crate::line_group::LineGroup;
use crate::shape::Shape;

/// Extra length on each side of the default seed row.
const SEED_MARGIN: f64 = 10.0;

/// How far along the pipeline a pattern has been taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfillStage {
    /// A seed pattern that may not yet span the boundary.
    PartialRow,
    /// One row at least as wide as the boundary, parked just below it.
    FullRow,
    /// Rows stacked at `spacing` until the boundary is covered.
    FullField,
    /// The field clipped to the boundary.
    TrimmedField,
}

impl InfillStage {
    /// Get stage name as string.
    pub fn name(&self) -> &'static str {
        match self {
            InfillStage::PartialRow => "partial-row",
            InfillStage::FullRow => "full-row",
            InfillStage::FullField => "full-field",
            InfillStage::TrimmedField => "trimmed-field",
        }
    }

    /// Parse stage from string.
    pub fn from_name(name: &str) -> Option<InfillStage> {
        match name.to_lowercase().as_str() {
            "partial-row" | "seed" => Some(InfillStage::PartialRow),
            "full-row" | "row" => Some(InfillStage::FullRow),
            "full-field" | "field" => Some(InfillStage::FullField),
            "trimmed-field" | "trimmed" => Some(InfillStage::TrimmedField),
            _ => None,
        }
    }

    /// All stages, in pipeline order.
    pub fn all() -> &'static [InfillStage] {
        &[
            InfillStage::PartialRow,
            InfillStage::FullRow,
            InfillStage::FullField,
            InfillStage::TrimmedField,
        ]
    }
}

/// Builds an infill pattern clipped to one boundary.
#[derive(Debug, Clone)]
pub struct InfillGenerator<'a> {
    boundary: &'a Shape,
    angle_degrees: f64,
    spacing: f64,
    shift_x: f64,
    shift_y: f64,
    seed: Option<(LineGroup, InfillStage)>,
}

/// The boundary and settings, expressed in the pattern's frame.
struct Tiling {
    boundary: Shape,
    spacing: f64,
    shift_x: f64,
    shift_y: f64,
}

type StageFn = fn(&Tiling, LineGroup) -> Result<LineGroup, GeometryError>;

/// Pipeline steps, each tagged with the stage its output reaches.
const PIPELINE: [(InfillStage, StageFn); 3] = [
    (InfillStage::FullRow, extend_row),
    (InfillStage::FullField, fill_field),
    (InfillStage::TrimmedField, trim_field),
];

impl<'a> InfillGenerator<'a> {
    pub fn new(boundary: &'a Shape, angle_degrees: f64, spacing: f64) -> Self {
        Self {
            boundary,
            angle_degrees,
            spacing,
            shift_x: 0.0,
            shift_y: 0.0,
            seed: None,
        }
    }

    /// Offset the pattern phase along the row (X) and across rows (Y).
    pub fn with_shift(mut self, shift_x: f64, shift_y: f64) -> Self {
        self.shift_x = shift_x;
        self.shift_y = shift_y;
        self
    }

    /// Use `pattern` instead of the default seed row.
    ///
    /// `stage` is how far along the pipeline `pattern` already is; only the
    /// later steps run on it. The pattern is given in its own axis-aligned
    /// frame, before the fill angle is applied.
    pub fn with_seed(mut self, pattern: LineGroup, stage: InfillStage) -> Self {
        self.seed = Some((pattern, stage));
        self
    }

    /// Run the full pipeline.
    pub fn generate(&self) -> Result<LineGroup, GeometryError> {
        self.generate_until(InfillStage::TrimmedField)
    }

    /// Run the pipeline up to and including `stop`.
    pub fn generate_until(&self, stop: InfillStage) -> Result<LineGroup, GeometryError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(GeometryError::InvalidSpacing { spacing: self.spacing });
        }
        if self.boundary.area() <= EPSILON {
            debug!("infill: boundary has no area, nothing to fill");
            return Ok(LineGroup::new());
        }

        let angle_rad = self.angle_degrees * PI / 180.0;
        let center = self.boundary.midpoint();
        let rotated = angle_rad.rem_euclid(2.0 * PI) != 0.0;
        let tiling = Tiling {
            boundary: if rotated {
                self.boundary.rotate_about(center, -angle_rad)
            } else {
                self.boundary.clone()
            },
            spacing: self.spacing,
            shift_x: self.shift_x,
            shift_y: self.shift_y,
        };

        let (mut design, reached) = match &self.seed {
            Some((pattern, stage)) => (pattern.clone(), *stage),
            None => (default_seed(&tiling.boundary), InfillStage::PartialRow),
        };
        if design.is_empty() {
            return Ok(design);
        }

        for (stage, step) in PIPELINE {
            if stage <= reached {
                continue;
            }
            if stage > stop {
                break;
            }
            design = step(&tiling, design)?;
            debug!("infill: {} -> {} lines", stage.name(), design.len());
        }

        if rotated {
            design = design.rotate_about(center, angle_rad);
        }
        Ok(design)
    }
}

/// One segment along y = 0 reaching past the boundary on both sides.
fn default_seed(boundary: &Shape) -> LineGroup {
    let b = boundary.bounds();
    LineGroup::from_lines(vec![Line::new(
        Point::new(b.min_x - SEED_MARGIN, 0.0),
        Point::new(b.max_x + SEED_MARGIN, 0.0),
    )])
}

/// Chain copies of the seed end to end until the row spans the boundary,
/// then park the row centred just below the boundary.
fn extend_row(tiling: &Tiling, design: LineGroup) -> Result<LineGroup, GeometryError> {
    let bounds = tiling.boundary.bounds();
    let required = bounds.width() + 2.0 * tiling.shift_x.abs();

    let (Some(first), Some(_)) = (design.first().copied(), design.last()) else {
        return Ok(design);
    };
    let tile = design.clone();
    let mut row = design;

    while row.width() < required {
        let Some(last) = row.last() else { break };
        let shift_x = last.end.x - first.start.x;
        let shift_y = last.end.y - first.start.y;
        if shift_x.abs() <= EPSILON {
            return Err(GeometryError::StalledSeed);
        }
        row.append(&tile.translate(shift_x, shift_y));
    }

    Ok(center_below(tiling, row))
}

/// Align the row's midpoint X with the boundary's and its top with the
/// boundary's bottom, then apply the pattern shift.
fn center_below(tiling: &Tiling, row: LineGroup) -> LineGroup {
    let (Some(row_box), Some(row_mid)) = (row.bounds(), row.midpoint()) else {
        return row;
    };
    let bounds = tiling.boundary.bounds();
    let target = bounds.center();

    let mut dx = target.x - row_mid.x + tiling.shift_x;
    let mut dy = bounds.min_y - row_box.max_y;

    // Y shift moves the row phase; keep the first row at or below the
    // boundary so the field still covers it.
    let phase = tiling.shift_y.rem_euclid(tiling.spacing);
    if phase > EPSILON {
        dy += phase - tiling.spacing;
    }
    if dx.abs() <= EPSILON {
        dx = 0.0;
    }

    row.translate(dx, dy)
}

/// Stack copies of the row `spacing` apart until one starts above the
/// boundary.
fn fill_field(tiling: &Tiling, row: LineGroup) -> Result<LineGroup, GeometryError> {
    let top = tiling.boundary.bounds().max_y;
    let mut field = row.clone();
    let mut next = row.translate(0.0, tiling.spacing);

    while let Some(b) = next.bounds() {
        if b.min_y >= top {
            break;
        }
        field.append(&next);
        next = next.translate(0.0, tiling.spacing);
    }

    Ok(field)
}

/// Clip every line of the field to the boundary.
fn trim_field(tiling: &Tiling, field: LineGroup) -> Result<LineGroup, GeometryError> {
    let trimmed = tiling.boundary.trim(&field);
    if trimmed.is_empty() {
        warn!("infill: no field line survived trimming");
    }
    Ok(trimmed)
}

// ============================================================================
// TESTS
// ============================================================================
