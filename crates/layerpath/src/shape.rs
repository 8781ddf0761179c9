//! Closed outlines: construction checks, offsetting and containment.

use crate::clip::{self, Containment};
use crate::error::GeometryError;
use crate::geometry::{BoundingBox, EPSILON, Intersection, Line, Point, signed_area_of_points};
use crate::line_group::LineGroup;

/// Which way [`Shape::offset`] moves the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSide {
    /// Shrink toward the interior.
    Inside,
    /// Grow away from the interior.
    Outside,
}

/// A simple polygon stored as a closed loop of edges.
///
/// The last edge ends where the first begins, no edge has zero length and
/// non-adjacent edges never touch. Every constructor checks this, so the
/// containment and offset code can rely on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    group: LineGroup,
    bounds: BoundingBox,
}

impl Shape {
    /// Build a shape from its vertices, in drawing order.
    ///
    /// The loop is closed automatically; a repeated first vertex at the end
    /// and consecutive duplicates are dropped.
    pub fn from_points(points: &[Point]) -> Result<Shape, GeometryError> {
        let mut pts: Vec<Point> = points.to_vec();
        pts.dedup_by(|a, b| a.approx_eq(*b));
        while pts.len() > 1 && pts[0].approx_eq(pts[pts.len() - 1]) {
            pts.pop();
        }
        if pts.len() < 3 {
            return Err(GeometryError::TooFewVertices { count: pts.len() });
        }

        let n = pts.len();
        let lines = (0..n)
            .map(|i| Line::try_new(pts[i], pts[(i + 1) % n]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::checked(lines)
    }

    /// Build a shape from edges that already form a loop.
    pub fn from_lines(lines: Vec<Line>) -> Result<Shape, GeometryError> {
        if lines.len() < 3 {
            return Err(GeometryError::TooFewVertices { count: lines.len() });
        }
        if let Some(line) = lines.iter().find(|l| l.is_degenerate()) {
            return Err(GeometryError::DegenerateSegment { at: line.start });
        }
        for i in 0..lines.len() {
            let next = &lines[(i + 1) % lines.len()];
            if !lines[i].end.approx_eq(next.start) {
                return Err(GeometryError::NotClosed { gap: lines[i].end.distance(next.start) });
            }
        }
        Self::checked(lines)
    }

    fn checked(lines: Vec<Line>) -> Result<Shape, GeometryError> {
        if let Some((first, second)) = find_self_intersection(&lines) {
            return Err(GeometryError::SelfIntersecting { first, second });
        }
        Ok(Self::unchecked(lines))
    }

    fn unchecked(lines: Vec<Line>) -> Shape {
        let group = LineGroup::closed_loop(lines);
        // A shape always has at least three edges, so the group has bounds.
        let bounds = group
            .bounds()
            .unwrap_or(BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 });
        Shape { group, bounds }
    }

    /// The edges, in loop order.
    #[inline]
    pub fn edges(&self) -> &[Line] {
        self.group.lines()
    }

    /// The start point of every edge.
    pub fn vertices(&self) -> Vec<Point> {
        self.edges().iter().map(|l| l.start).collect()
    }

    /// The edges as a group flagged as a closed loop.
    #[inline]
    pub fn as_group(&self) -> &LineGroup {
        &self.group
    }

    pub fn into_group(self) -> LineGroup {
        self.group
    }

    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Center of the bounding box.
    #[inline]
    pub fn midpoint(&self) -> Point {
        self.bounds.center()
    }

    /// Positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.vertices())
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Classify a point as inside, outside or on the boundary.
    pub fn classify(&self, p: Point) -> Containment {
        clip::classify_point(p, self.edges())
    }

    /// Inside test used for trimming: boundary points are inside.
    #[inline]
    pub fn is_inside(&self, p: Point) -> bool {
        self.classify(p).is_inside()
    }

    /// Trim every line of `group` to this shape, keeping order.
    pub fn trim(&self, group: &LineGroup) -> LineGroup {
        LineGroup::from_lines(clip::trim_lines(group, self.edges(), &self.bounds))
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Shape {
        Self::unchecked(self.group.translate(dx, dy).into_lines())
    }

    pub fn rotate_about(&self, center: Point, angle_rad: f64) -> Shape {
        Self::unchecked(self.group.rotate_about(center, angle_rad).into_lines())
    }

    /// Move every edge `width` along its normal and rejoin the corners.
    ///
    /// Each edge is shifted parallel to itself; the new vertex is where
    /// neighbouring shifted edges meet. If any edge flips direction or the
    /// result crosses itself, `width` is larger than the local feature size
    /// and the call fails with [`GeometryError::OffsetCollapsed`].
    pub fn offset(&self, width: f64, side: OffsetSide) -> Result<Shape, GeometryError> {
        let collapsed = GeometryError::OffsetCollapsed { width };
        if !width.is_finite() {
            return Err(collapsed);
        }
        if width == 0.0 {
            return Ok(self.clone());
        }

        let area = self.signed_area();
        if area.abs() <= EPSILON {
            return Err(collapsed);
        }

        // Inward is to the left of a counter-clockwise loop.
        let winding = area.signum();
        let distance = match side {
            OffsetSide::Inside => width,
            OffsetSide::Outside => -width,
        };

        let edges = self.edges();
        let n = edges.len();
        let shifted: Vec<Line> = edges
            .iter()
            .map(|e| {
                let (dx, dy) = e.direction();
                let len = e.length();
                let nx = -dy / len * winding * distance;
                let ny = dx / len * winding * distance;
                e.translate(nx, ny)
            })
            .collect();

        let vertices: Vec<Point> = (0..n)
            .map(|i| join_point(&shifted[(i + n - 1) % n], &shifted[i]))
            .collect();

        let mut lines = Vec::with_capacity(n);
        for i in 0..n {
            let line = Line::new(vertices[i], vertices[(i + 1) % n]);
            let (ox, oy) = edges[i].direction();
            let (dx, dy) = line.direction();
            if line.is_degenerate() || ox * dx + oy * dy <= 0.0 {
                return Err(collapsed);
            }
            lines.push(line);
        }

        let new_area = signed_area_of_points(&vertices);
        if new_area.abs() <= EPSILON || new_area.signum() != winding {
            return Err(collapsed);
        }
        if find_self_intersection(&lines).is_some() {
            return Err(collapsed);
        }

        Ok(Self::unchecked(lines))
    }
}

/// Where the infinite extensions of two consecutive offset edges meet.
///
/// Parallel neighbours (a straight run through a vertex) just use the
/// start of the second edge.
fn join_point(prev: &Line, next: &Line) -> Point {
    let (d1x, d1y) = prev.direction();
    let (d2x, d2y) = next.direction();
    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() <= EPSILON * prev.length() * next.length() {
        return next.start;
    }
    let ox = next.start.x - prev.start.x;
    let oy = next.start.y - prev.start.y;
    let t = (ox * d2y - oy * d2x) / denom;
    prev.point_at(t)
}

/// First pair of non-adjacent edges that touch, if any.
fn find_self_intersection(lines: &[Line]) -> Option<(usize, usize)> {
    let n = lines.len();
    let boxes: Vec<BoundingBox> = lines
        .iter()
        .map(|l| {
            let mut b = BoundingBox::from_point(l.start);
            b.include(l.end);
            b
        })
        .collect();

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if !boxes[i].overlaps(&boxes[j]) {
                continue;
            }
            if !matches!(lines[i].intersect(&lines[j]), Intersection::None) {
                return Some((i, j));
            }
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================
