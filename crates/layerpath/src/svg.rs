//! SVG import - extract closed outlines from SVG documents.
//!
//! Uses usvg for complete SVG resolution (CSS, transforms, basic shapes)
//! then walks the tree and turns every closed subpath into a [`Shape`].
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). These must be
//! "flattened" into line segments before they can be offset or used as a
//! trim boundary. We use lyon_geom for accurate curve approximation with a
//! fixed tolerance.

use log::{debug, warn};
use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use thiserror::Error;
use usvg::tiny_skia_path::PathSegment;

use crate::error::GeometryError;
use crate::geometry::Point;
use crate::shape::Shape;

/// Error type for SVG import.
///
/// ## Rust Lesson #20: Error Handling
///
/// Rust uses `Result<T, E>` instead of exceptions. `thiserror` writes the
/// `Display` and `std::error::Error` impls for us from the `#[error]`
/// attributes, and `#[from]` lets `?` convert a `GeometryError` into
/// `SvgError::Geometry` automatically.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("SVG parse error: {0}")]
    Parse(String),

    #[error("no closed outlines found in SVG")]
    NoOutlines,

    #[error("SVG outline is not a usable shape: {0}")]
    Geometry(#[from] GeometryError),
}

/// Tolerance for curve flattening.
/// Lower = more points, smoother curves, slower.
const CURVE_TOLERANCE: f32 = 0.05;

/// Extract every closed outline from an SVG document, in document order.
///
/// Subpaths that do not form a valid simple polygon are skipped with a
/// warning. If nothing usable remains, the first such failure is returned,
/// or [`SvgError::NoOutlines`] when there was nothing to try.
pub fn extract_shapes_from_svg(svg_content: &str) -> Result<Vec<Shape>, SvgError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| SvgError::Parse(e.to_string()))?;

    let mut outlines: Vec<Vec<Point>> = Vec::new();
    collect_group(tree.root(), &mut outlines);
    debug!("svg: {} closed subpaths", outlines.len());

    let mut shapes = Vec::with_capacity(outlines.len());
    let mut first_error: Option<GeometryError> = None;
    for (i, points) in outlines.iter().enumerate() {
        match Shape::from_points(points) {
            Ok(shape) => shapes.push(shape),
            Err(e) => {
                warn!("svg: skipping subpath {}: {}", i, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match (shapes.is_empty(), first_error) {
        (false, _) => Ok(shapes),
        (true, Some(e)) => Err(SvgError::Geometry(e)),
        (true, None) => Err(SvgError::NoOutlines),
    }
}

/// Recursively collect outlines from a usvg Group.
fn collect_group(group: &usvg::Group, outlines: &mut Vec<Vec<Point>>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(group) => collect_group(group, outlines),
            usvg::Node::Path(path) => collect_path(path, outlines),
            // Ignore text, images, etc.
            _ => {}
        }
    }
}

/// Split a path into subpaths and keep the closed ones.
///
/// usvg hands us absolute coordinates; the element's own transform is
/// applied here so nested groups land where they render.
fn collect_path(path: &usvg::Path, outlines: &mut Vec<Vec<Point>>) {
    let data = path
        .data()
        .clone()
        .transform(path.abs_transform())
        .unwrap_or_else(|| path.data().clone());

    let mut points: Vec<Point> = Vec::new();
    let mut last: Option<(f32, f32)> = None;

    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                // An unclosed subpath is not an outline.
                points.clear();
                points.push(Point::new(p.x as f64, p.y as f64));
                last = Some((p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                points.push(Point::new(p.x as f64, p.y as f64));
                last = Some((p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        points.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    points.push(Point::new(p.x as f64, p.y as f64));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        points.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    points.push(Point::new(p.x as f64, p.y as f64));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::Close => {
                if points.len() >= 3 {
                    outlines.push(std::mem::take(&mut points));
                } else {
                    points.clear();
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
