//! Core geometry types for layerpath.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! `Point` and `Line` are small `Copy` values: passing one around copies
//! 16 or 40 bytes on the stack, which is cheaper than juggling references.
//! Anything that owns a `Vec` (a `LineGroup`, a `Shape`) is *not* `Copy`
//! and has to be cloned explicitly.

use std::cmp::Ordering;

use crate::error::GeometryError;

/// Tolerance for parametric tests (segment parameters, cross products).
pub const EPSILON: f64 = 1e-9;

/// Two points closer than this are the same point.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A directed line segment.
///
/// `extrusion_rate` stays `None` through all of the geometry; it is only
/// filled in when a serializer schedules the line for output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub extrusion_rate: Option<f64>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Result of intersecting two segments.
///
/// ## Rust Lesson #10: Enums (Sum Types)
///
/// Each variant carries exactly the data that makes sense for it, so a
/// caller can't read an intersection point out of a parallel pair by
/// accident: the compiler makes you `match` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The segments do not meet.
    None,
    /// The segments cross at `point`, which sits at parameter `t` along
    /// the segment `intersect` was called on.
    Point { point: Point, t: f64 },
    /// The segments are collinear and overlap; there is no single point.
    Collinear,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both coordinates agree within [`POINT_TOLERANCE`].
    #[inline]
    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() <= POINT_TOLERANCE && (self.y - other.y).abs() <= POINT_TOLERANCE
    }

    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate counter-clockwise by `angle_rad` around `center`.
    pub fn rotate_about(&self, center: Point, angle_rad: f64) -> Point {
        let (sin_a, cos_a) = angle_rad.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(
            center.x + dx * cos_a - dy * sin_a,
            center.y + dx * sin_a + dy * cos_a,
        )
    }

    /// Lexicographic x-then-y order that is total even for NaN.
    pub fn total_cmp(&self, other: &Point) -> Ordering {
        self.x.total_cmp(&other.x).then(self.y.total_cmp(&other.y))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Point) -> Option<Ordering> {
        match self.x.partial_cmp(&other.x)? {
            Ordering::Equal => self.y.partial_cmp(&other.y),
            ord => Some(ord),
        }
    }
}

impl Line {
    /// Build a segment without checking for zero length.
    #[inline]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end, extrusion_rate: None }
    }

    #[inline]
    pub const fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Build a segment, rejecting one whose endpoints coincide.
    pub fn try_new(start: Point, end: Point) -> Result<Self, GeometryError> {
        let line = Self::new(start, end);
        if line.is_degenerate() {
            return Err(GeometryError::DegenerateSegment { at: start });
        }
        Ok(line)
    }

    /// Length of the line segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start.approx_eq(self.end)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Direction vector (end - start), not normalised.
    #[inline]
    pub fn direction(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    /// Same segment drawn the other way.
    #[inline]
    pub fn reversed(&self) -> Line {
        Line { start: self.end, end: self.start, extrusion_rate: self.extrusion_rate }
    }

    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Line {
        Line {
            start: self.start.translate(dx, dy),
            end: self.end.translate(dx, dy),
            extrusion_rate: self.extrusion_rate,
        }
    }

    pub fn rotate_about(&self, center: Point, angle_rad: f64) -> Line {
        Line {
            start: self.start.rotate_about(center, angle_rad),
            end: self.end.rotate_about(center, angle_rad),
            extrusion_rate: self.extrusion_rate,
        }
    }

    /// Point at parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn point_at(&self, t: f64) -> Point {
        let (dx, dy) = self.direction();
        Point::new(self.start.x + t * dx, self.start.y + t * dy)
    }

    /// Projection of `p` onto this segment's direction, as a parameter.
    ///
    /// Sorting points by this value orders them along the segment no
    /// matter which way it points.
    pub fn parameter_of(&self, p: Point) -> f64 {
        let (dx, dy) = self.direction();
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return 0.0;
        }
        ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq
    }

    /// Shortest distance from `p` to any point of the segment.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let t = self.parameter_of(p).clamp(0.0, 1.0);
        self.point_at(t).distance(p)
    }

    /// Intersect with another segment.
    ///
    /// `self` is treated as closed (t in [0, 1]) while `other` is half-open
    /// (u in [0, 1)): when `self` crosses a polygon exactly at a vertex,
    /// only the edge that *starts* at that vertex reports it, so walking a
    /// polygon's edges never counts a vertex crossing twice.
    pub fn intersect(&self, other: &Line) -> Intersection {
        let (d1x, d1y) = self.direction();
        let (d2x, d2y) = other.direction();
        let denom = d2y * d1x - d2x * d1y;
        let scale = self.length() * other.length();

        let ox = self.start.x - other.start.x;
        let oy = self.start.y - other.start.y;

        if scale <= 0.0 {
            return Intersection::None;
        }

        // Parallel or coincident lines; denom / scale is the sine of the angle
        if denom.abs() <= EPSILON * scale {
            let offset_cross = d1x * oy - d1y * ox;
            if offset_cross.abs() > EPSILON * self.length().max(1.0) {
                return Intersection::None;
            }
            let a = self.parameter_of(other.start);
            let b = self.parameter_of(other.end);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            return if hi >= -EPSILON && lo <= 1.0 + EPSILON {
                Intersection::Collinear
            } else {
                Intersection::None
            };
        }

        let t = (d2x * oy - d2y * ox) / denom;
        let u = (d1x * oy - d1y * ox) / denom;

        let on_self = (-EPSILON..=1.0 + EPSILON).contains(&t);
        let on_other = u >= -EPSILON && u < 1.0 - EPSILON;
        if on_self && on_other {
            let t = t.clamp(0.0, 1.0);
            Intersection::Point { point: self.point_at(t), t }
        } else {
            Intersection::None
        }
    }
}

impl BoundingBox {
    /// Box around a single point.
    pub fn from_point(p: Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    /// Grow to include `p`.
    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// True when the boxes overlap or touch.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.max_x < other.min_x
            || other.max_x < self.min_x
            || self.max_y < other.min_y
            || other.max_y < self.min_y)
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

// ============================================================================
// TESTS
// ============================================================================
