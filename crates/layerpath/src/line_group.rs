//! Ordered line collections and their resumable nearest-line supplier.
//!
//! A [`LineGroup`] is the unit everything else trades in: shells, infill,
//! seed patterns and finished layers are all line groups. Insertion order
//! is draw order.

use crate::geometry::{BoundingBox, Line, Point};

/// An ordered sequence of segments with a cached bounding box.
///
/// Transforms (`translate`, `rotate_about`) return a new group and leave
/// the receiver untouched, so a seed pattern can be stamped out many times
/// while the original stays valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineGroup {
    lines: Vec<Line>,
    bounds: Option<BoundingBox>,
    closed: bool,
}

impl LineGroup {
    /// Create an empty, open group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an open group from lines, in the given order.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let bounds = bounds_of(&lines);
        Self { lines, bounds, closed: false }
    }

    /// Create a group flagged as a closed loop.
    ///
    /// Only [`Shape`](crate::Shape) builds these, after checking closure.
    pub(crate) fn closed_loop(lines: Vec<Line>) -> Self {
        let bounds = bounds_of(&lines);
        Self { lines, bounds, closed: true }
    }

    /// Whether the organizer must draw this group in one uninterrupted run.
    #[inline]
    pub fn is_closed_loop(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn first(&self) -> Option<&Line> {
        self.lines.first()
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    /// Bounding box of every endpoint, `None` when empty.
    #[inline]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Width of the bounding box (0 when empty).
    pub fn width(&self) -> f64 {
        self.bounds.map_or(0.0, |b| b.width())
    }

    /// Height of the bounding box (0 when empty).
    pub fn height(&self) -> f64 {
        self.bounds.map_or(0.0, |b| b.height())
    }

    /// Center of the bounding box.
    pub fn midpoint(&self) -> Option<Point> {
        self.bounds.map(|b| b.center())
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f64 {
        self.lines.iter().map(Line::length).sum()
    }

    /// Append one line. Appending to a closed loop makes it an open group.
    pub fn push(&mut self, line: Line) {
        self.include(&line);
        self.lines.push(line);
        self.closed = false;
    }

    /// Append every line of `other`, keeping its order.
    pub fn append(&mut self, other: &LineGroup) {
        if other.is_empty() {
            return;
        }
        self.lines.extend_from_slice(&other.lines);
        self.bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        };
        self.closed = false;
    }

    /// Translated copy.
    pub fn translate(&self, dx: f64, dy: f64) -> LineGroup {
        LineGroup {
            lines: self.lines.iter().map(|l| l.translate(dx, dy)).collect(),
            bounds: self.bounds.map(|b| BoundingBox {
                min_x: b.min_x + dx,
                min_y: b.min_y + dy,
                max_x: b.max_x + dx,
                max_y: b.max_y + dy,
            }),
            closed: self.closed,
        }
    }

    /// Copy rotated counter-clockwise by `angle_rad` around `center`.
    pub fn rotate_about(&self, center: Point, angle_rad: f64) -> LineGroup {
        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|l| l.rotate_about(center, angle_rad))
            .collect();
        LineGroup { bounds: bounds_of(&lines), lines, closed: self.closed }
    }

    /// Tag every line with the rate a serializer will extrude it at.
    pub fn set_extrusion_rate(&mut self, rate: f64) {
        for line in &mut self.lines {
            line.extrusion_rate = Some(rate);
        }
    }

    /// Start a resumable nearest-line supplier over this group.
    ///
    /// Open groups may hand out a line reversed when its end is nearer the
    /// pen than its start.
    pub fn supplier(&self) -> LineSupplier<'_> {
        LineSupplier::new(&self.lines, self.closed, true)
    }

    /// Supplier that never reverses lines.
    pub fn supplier_in_direction(&self) -> LineSupplier<'_> {
        LineSupplier::new(&self.lines, self.closed, false)
    }

    fn include(&mut self, line: &Line) {
        match &mut self.bounds {
            Some(b) => {
                b.include(line.start);
                b.include(line.end);
            }
            None => {
                let mut b = BoundingBox::from_point(line.start);
                b.include(line.end);
                self.bounds = Some(b);
            }
        }
    }
}

impl FromIterator<Line> for LineGroup {
    fn from_iter<I: IntoIterator<Item = Line>>(iter: I) -> Self {
        LineGroup::from_lines(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LineGroup {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl std::ops::Index<usize> for LineGroup {
    type Output = Line;

    fn index(&self, index: usize) -> &Line {
        &self.lines[index]
    }
}

fn bounds_of(lines: &[Line]) -> Option<BoundingBox> {
    let first = lines.first()?;
    let mut b = BoundingBox::from_point(first.start);
    for line in lines {
        b.include(line.start);
        b.include(line.end);
    }
    Some(b)
}

// ============================================================================
// RESUMABLE SUPPLIER
// ============================================================================
//
// ## Rust Lesson #24: State Machines Instead of Generators
//
// In JS you might write `function* nearestLine()` and feed it values with
// `gen.next(value)`. Stable Rust has no generators, so the suspended state
// lives in a struct instead: a cursor, a "used" mask, and whatever line was
// offered last time. Each `poll()` is one resumption.

/// A line offered by a supplier, scored by pen travel to its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub line: Line,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Offer {
    index: usize,
    reversed: bool,
}

/// Cursor over one group that hands out the next line to draw.
///
/// The supplier is suspended between polls. Passing `resume = true` tells it
/// that the line it offered last was taken; `resume = false` means the offer
/// was passed over and may be reconsidered from the new pen position.
///
/// Closed loops pick the edge whose start is nearest the pen as their entry
/// point, then walk the loop in order and never reverse. Open groups offer
/// the nearest remaining line every time.
#[derive(Debug, Clone)]
pub struct LineSupplier<'a> {
    lines: &'a [Line],
    used: Vec<bool>,
    remaining: usize,
    closed: bool,
    reversible: bool,
    offered: Option<Offer>,
    cursor: Option<usize>,
}

impl<'a> LineSupplier<'a> {
    fn new(lines: &'a [Line], closed: bool, reversible: bool) -> Self {
        Self {
            lines,
            used: vec![false; lines.len()],
            remaining: lines.len(),
            closed,
            reversible: reversible && !closed,
            offered: None,
            cursor: None,
        }
    }

    /// Whether the group this supplier walks is a closed loop.
    #[inline]
    pub fn is_closed_loop(&self) -> bool {
        self.closed
    }

    /// Lines not yet taken.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Resume the supplier. Returns `None` once every line has been taken.
    pub fn poll(&mut self, resume: bool, pen: Point) -> Option<Candidate> {
        if let Some(offer) = self.offered.take() {
            if resume {
                self.used[offer.index] = true;
                self.remaining -= 1;
                self.cursor = Some(offer.index);
            }
        }

        if self.remaining == 0 {
            return None;
        }

        let offer = match (self.closed, self.cursor) {
            (true, Some(last)) => self.next_in_loop(last),
            (true, None) => self.nearest_start(pen),
            (false, _) => self.nearest_open(pen),
        };
        self.offered = Some(offer);

        let line = self.lines[offer.index];
        let line = if offer.reversed { line.reversed() } else { line };
        Some(Candidate { line, distance: pen.distance(line.start) })
    }

    fn next_in_loop(&self, last: usize) -> Offer {
        let n = self.lines.len();
        let index = (1..=n)
            .map(|step| (last + step) % n)
            .find(|&i| !self.used[i])
            .unwrap_or(last);
        Offer { index, reversed: false }
    }

    fn nearest_start(&self, pen: Point) -> Offer {
        let mut best = Offer { index: 0, reversed: false };
        let mut best_dist = f64::INFINITY;
        for (i, line) in self.lines.iter().enumerate() {
            if self.used[i] {
                continue;
            }
            let d = pen.distance(line.start);
            if d < best_dist {
                best_dist = d;
                best = Offer { index: i, reversed: false };
            }
        }
        best
    }

    fn nearest_open(&self, pen: Point) -> Offer {
        let mut best = Offer { index: 0, reversed: false };
        let mut best_dist = f64::INFINITY;
        for (i, line) in self.lines.iter().enumerate() {
            if self.used[i] {
                continue;
            }
            let d = pen.distance(line.start);
            if d < best_dist {
                best_dist = d;
                best = Offer { index: i, reversed: false };
            }
            if self.reversible {
                let d = pen.distance(line.end);
                if d < best_dist {
                    best_dist = d;
                    best = Offer { index: i, reversed: true };
                }
            }
        }
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> LineGroup {
        LineGroup::from_lines(vec![
            Line::from_coords(0.0, 0.0, 10.0, 0.0),
            Line::from_coords(0.0, 2.0, 10.0, 2.0),
            Line::from_coords(0.0, 4.0, 10.0, 4.0),
        ])
    }

    #[test]
    fn bounds_track_members() {
        let mut group = LineGroup::new();
        assert_eq!(group.bounds(), None);
        assert_eq!(group.width(), 0.0);

        group.push(Line::from_coords(1.0, 2.0, 5.0, -3.0));
        group.push(Line::from_coords(-4.0, 0.0, 0.0, 7.0));
        let b = group.bounds().unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-4.0, -3.0, 5.0, 7.0));
        assert_eq!(group.width(), 9.0);
        assert_eq!(group.height(), 10.0);
    }

    #[test]
    fn translate_returns_new_group() {
        let seed = rows();
        let moved = seed.translate(5.0, 1.0);
        assert_eq!(seed, rows());
        assert_eq!(moved[0], Line::from_coords(5.0, 1.0, 15.0, 1.0));
        assert_eq!(moved.bounds().unwrap().min_x, 5.0);
    }

    #[test]
    fn translate_by_zero_is_identity() {
        let group = rows();
        assert_eq!(group.translate(0.0, 0.0), group);
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut group = rows();
        group.append(&rows().translate(0.0, 10.0));
        assert_eq!(group.len(), 6);
        assert_eq!(group[3].start, Point::new(0.0, 10.0));
        assert_eq!(group.bounds().unwrap().max_y, 14.0);
    }

    #[test]
    fn extrusion_rate_tagging() {
        let mut group = rows();
        group.set_extrusion_rate(0.05);
        assert!(group.iter().all(|l| l.extrusion_rate == Some(0.05)));
    }

    #[test]
    fn open_supplier_hands_out_nearest() {
        let group = rows();
        let mut supplier = group.supplier_in_direction();

        let first = supplier.poll(false, Point::new(0.0, 4.5)).unwrap();
        assert_eq!(first.line.start, Point::new(0.0, 4.0));
        assert!((first.distance - 0.5).abs() < 1e-12);

        // Offer passed over: same pool, new pen position.
        let again = supplier.poll(false, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(again.line.start, Point::new(0.0, 0.0));
        assert_eq!(supplier.remaining(), 3);

        // Taken: the next poll drops it.
        let next = supplier.poll(true, again.line.end).unwrap();
        assert_eq!(supplier.remaining(), 2);
        assert_eq!(next.line.start, Point::new(0.0, 2.0));
    }

    #[test]
    fn open_supplier_reverses_when_end_is_nearer() {
        let group = rows();
        let mut supplier = group.supplier();
        let c = supplier.poll(false, Point::new(10.0, 0.0)).unwrap();
        assert_eq!(c.line.start, Point::new(10.0, 0.0));
        assert_eq!(c.line.end, Point::new(0.0, 0.0));
        assert_eq!(c.distance, 0.0);
    }

    #[test]
    fn supplier_exhausts() {
        let group = LineGroup::from_lines(vec![Line::from_coords(0.0, 0.0, 1.0, 0.0)]);
        let mut supplier = group.supplier();
        assert!(supplier.poll(false, Point::default()).is_some());
        assert!(supplier.poll(true, Point::new(1.0, 0.0)).is_none());

        let empty = LineGroup::new();
        assert!(empty.supplier().poll(false, Point::default()).is_none());
    }

    #[test]
    fn closed_supplier_walks_loop_from_nearest_start() {
        let square = LineGroup::closed_loop(vec![
            Line::from_coords(0.0, 0.0, 10.0, 0.0),
            Line::from_coords(10.0, 0.0, 10.0, 10.0),
            Line::from_coords(10.0, 10.0, 0.0, 10.0),
            Line::from_coords(0.0, 10.0, 0.0, 0.0),
        ]);
        let mut supplier = square.supplier();
        let mut pen = Point::new(11.0, 11.0);
        let mut order = Vec::new();
        let mut resume = false;
        while let Some(c) = supplier.poll(resume, pen) {
            order.push(c.line.start);
            pen = c.line.end;
            resume = true;
        }
        assert_eq!(
            order,
            vec![
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
            ]
        );
    }
}
