//! Error types for geometry primitives and layer building.
//!
//! Geometry errors are surfaced as soon as they happen. A wrong inset or a
//! wrong containment answer would corrupt every path built on top of it, so
//! nothing here is approximated away.

use thiserror::Error;

use crate::geometry::Point;

/// Failure of a geometric primitive (segment, offset, containment, tiling).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("zero-length segment at ({}, {})", .at.x, .at.y)]
    DegenerateSegment { at: Point },

    #[error("outline needs at least 3 distinct vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("outline is not closed (gap of {gap:.6} between last end and first start)")]
    NotClosed { gap: f64 },

    #[error("outline edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    #[error("offset of {width} exceeds the local feature size of the outline")]
    OffsetCollapsed { width: f64 },

    #[error("infill spacing must be positive and finite, got {spacing}")]
    InvalidSpacing { spacing: f64 },

    #[error("seed pattern does not advance along X and can never cover the boundary")]
    StalledSeed,
}

/// Failure of the organize step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrganizeError {
    #[error("no line groups supplied")]
    NoGroups,
}

/// A layer either fully resolves or fails with the stage that broke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("offset stage failed on shell {shell}: {source}")]
    Offset {
        shell: usize,
        #[source]
        source: GeometryError,
    },

    #[error("trim stage failed: {source}")]
    Trim {
        #[source]
        source: GeometryError,
    },

    #[error("organize stage failed: {source}")]
    Organize {
        #[source]
        source: OrganizeError,
    },
}

impl LayerError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            LayerError::Offset { .. } => "offset",
            LayerError::Trim { .. } => "trim",
            LayerError::Organize { .. } => "organize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_error_names_stage_and_input() {
        let err = LayerError::Offset {
            shell: 2,
            source: GeometryError::OffsetCollapsed { width: 3.0 },
        };
        assert_eq!(err.stage(), "offset");
        let text = err.to_string();
        assert!(text.contains("shell 2"), "got {}", text);
        assert!(text.contains("offset of 3"), "got {}", text);
    }

    #[test]
    fn degenerate_segment_reports_location() {
        let err = GeometryError::DegenerateSegment { at: Point::new(1.5, -2.0) };
        assert_eq!(err.to_string(), "zero-length segment at (1.5, -2)");
    }
}
