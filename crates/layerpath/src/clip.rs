//! Containment tests and line trimming against a closed boundary.
//!
//! This is the HOT PATH of infill generation: every row of the field is
//! split against every boundary edge.

use crate::geometry::{BoundingBox, Intersection, Line, POINT_TOLERANCE, Point};

/// Where a point sits relative to a closed boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    /// Within tolerance of an edge. Counted as inside for trimming.
    Boundary,
}

impl Containment {
    /// Boundary points count as inside.
    #[inline]
    pub fn is_inside(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Classify a point against the closed loop formed by `edges`.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. Points on an edge are
/// reported as [`Containment::Boundary`] before any ray is cast.
pub fn classify_point(p: Point, edges: &[Line]) -> Containment {
    if edges.len() < 3 {
        return Containment::Outside;
    }

    if edges.iter().any(|e| e.distance_to_point(p) <= POINT_TOLERANCE) {
        return Containment::Boundary;
    }

    let mut inside = false;
    for edge in edges {
        let (xi, yi) = (edge.start.x, edge.start.y);
        let (xj, yj) = (edge.end.x, edge.end.y);

        // Ray casting: check if horizontal ray from p crosses this edge
        if ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
    }

    if inside { Containment::Inside } else { Containment::Outside }
}

/// Test if a point is inside (or on) the closed loop formed by `edges`.
#[inline]
pub fn point_in_polygon(p: Point, edges: &[Line]) -> bool {
    classify_point(p, edges).is_inside()
}

// ============================================================================
// LINE-POLYGON INTERSECTIONS
// ============================================================================

/// Every point where `line` meets the boundary, sorted along `line`.
///
/// Returned as `(t, point)` with `t` the projection onto the line's own
/// direction. Edges lying on the line contribute their endpoints so a row
/// that runs along an edge is still split where the edge starts and stops.
pub fn boundary_crossings(line: &Line, edges: &[Line]) -> Vec<(f64, Point)> {
    let mut crossings = Vec::with_capacity(edges.len() / 2 + 2);

    for edge in edges {
        match line.intersect(edge) {
            Intersection::Point { point, t } => crossings.push((t, point)),
            Intersection::Collinear => {
                for p in [edge.start, edge.end] {
                    let t = line.parameter_of(p);
                    if (0.0..=1.0).contains(&t) {
                        crossings.push((t, p));
                    }
                }
            }
            Intersection::None => {}
        }
    }

    // Sort by t parameter (position along line)
    crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
    crossings
}

// ============================================================================
// LINE TRIMMING
// ============================================================================

/// Trim one line to the part lying inside the boundary.
///
/// The line is split at every boundary crossing; a piece survives when its
/// midpoint is inside (or on) the boundary. Adjacent survivors are merged
/// back together, so a row only breaks where it actually leaves the shape.
pub fn trim_line(line: &Line, edges: &[Line], bounds: &BoundingBox) -> Vec<Line> {
    let mut line_box = BoundingBox::from_point(line.start);
    line_box.include(line.end);
    // Fast bounding box rejection
    if !line_box.overlaps(bounds) {
        return Vec::new();
    }

    let mut points: Vec<(f64, Point)> = Vec::with_capacity(edges.len() / 2 + 2);
    points.push((0.0, line.start));
    points.extend(boundary_crossings(line, edges));
    points.push((1.0, line.end));
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.dedup_by(|next, prev| next.1.approx_eq(prev.1));

    let mut kept: Vec<Line> = Vec::new();
    for pair in points.windows(2) {
        let piece = Line::new(pair[0].1, pair[1].1);
        if piece.is_degenerate() || !point_in_polygon(piece.midpoint(), edges) {
            continue;
        }
        match kept.last_mut() {
            Some(prev) if prev.end.approx_eq(piece.start) => prev.end = piece.end,
            _ => kept.push(piece),
        }
    }

    kept
}

/// Trim every line of `lines` to the boundary, keeping input order.
///
/// For each input line, we get 0 or more output segments; `flat_map`
/// flattens them without building intermediate vectors of vectors.
pub fn trim_lines<'a, I>(lines: I, edges: &[Line], bounds: &BoundingBox) -> Vec<Line>
where
    I: IntoIterator<Item = &'a Line>,
{
    lines
        .into_iter()
        .flat_map(|line| trim_line(line, edges, bounds))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square_edges() -> Vec<Line> {
        vec![
            Line::from_coords(0.0, 0.0, 10.0, 0.0),
            Line::from_coords(10.0, 0.0, 10.0, 10.0),
            Line::from_coords(10.0, 10.0, 0.0, 10.0),
            Line::from_coords(0.0, 10.0, 0.0, 0.0),
        ]
    }

    fn square_bounds() -> BoundingBox {
        BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 }
    }

    /// A "U" shape: 0..30 wide, with a notch 10..20 cut from the top.
    fn notched_edges() -> Vec<Line> {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 20.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
        ];
        (0..pts.len())
            .map(|i| Line::new(pts[i], pts[(i + 1) % pts.len()]))
            .collect()
    }

    #[test]
    fn point_inside_square() {
        let sq = square_edges();
        assert_eq!(classify_point(Point::new(5.0, 5.0), &sq), Containment::Inside);
        assert_eq!(classify_point(Point::new(15.0, 5.0), &sq), Containment::Outside);
        assert_eq!(classify_point(Point::new(-1.0, 5.0), &sq), Containment::Outside);
    }

    #[test]
    fn boundary_points_count_as_inside() {
        let sq = square_edges();
        assert_eq!(classify_point(Point::new(10.0, 5.0), &sq), Containment::Boundary);
        assert_eq!(classify_point(Point::new(0.0, 0.0), &sq), Containment::Boundary);
        assert!(point_in_polygon(Point::new(5.0, 10.0), &sq));
    }

    #[test]
    fn line_entirely_inside() {
        let line = Line::from_coords(2.0, 5.0, 8.0, 5.0);
        let result = trim_line(&line, &square_edges(), &square_bounds());
        assert_eq!(result, vec![line]);
    }

    #[test]
    fn line_entirely_outside() {
        let line = Line::from_coords(15.0, 5.0, 20.0, 5.0);
        assert!(trim_line(&line, &square_edges(), &square_bounds()).is_empty());
    }

    #[test]
    fn line_crosses_polygon() {
        let line = Line::from_coords(-5.0, 5.0, 15.0, 5.0);
        let result = trim_line(&line, &square_edges(), &square_bounds());
        assert_eq!(result.len(), 1);
        // Should be clipped to [0, 5] -> [10, 5]
        assert_abs_diff_eq!(result[0].start.x, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result[0].end.x, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn reversed_line_keeps_its_direction() {
        let line = Line::from_coords(15.0, 5.0, -5.0, 5.0);
        let result = trim_line(&line, &square_edges(), &square_bounds());
        assert_eq!(result.len(), 1);
        assert_abs_diff_eq!(result[0].start.x, 10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result[0].end.x, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn line_along_edge_is_kept_once() {
        let line = Line::from_coords(-5.0, 0.0, 15.0, 0.0);
        let result = trim_line(&line, &square_edges(), &square_bounds());
        assert_eq!(result, vec![Line::from_coords(0.0, 0.0, 10.0, 0.0)]);
    }

    #[test]
    fn notch_splits_row_in_two() {
        let edges = notched_edges();
        let bounds = BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 30.0, max_y: 20.0 };
        let row = Line::from_coords(-5.0, 15.0, 35.0, 15.0);
        let result = trim_line(&row, &edges, &bounds);
        assert_eq!(result.len(), 2);
        assert_abs_diff_eq!(result[0].start.x, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result[0].end.x, 10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result[1].start.x, 20.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result[1].end.x, 30.0, epsilon = 1e-10);
    }

    #[test]
    fn diagonal_through_vertices() {
        // Corner-to-corner diagonal passes through two vertices.
        let line = Line::from_coords(-5.0, -5.0, 15.0, 15.0);
        let result = trim_line(&line, &square_edges(), &square_bounds());
        assert_eq!(result.len(), 1);
        assert!(result[0].start.approx_eq(Point::new(0.0, 0.0)));
        assert!(result[0].end.approx_eq(Point::new(10.0, 10.0)));
    }

    #[test]
    fn crossings_sorted_along_line() {
        let line = Line::from_coords(35.0, 15.0, -5.0, 15.0);
        let ts: Vec<f64> = boundary_crossings(&line, &notched_edges())
            .iter()
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(ts.len(), 4);
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }
}
