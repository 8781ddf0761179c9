//! Path ordering: stitch a layer's line groups into one draw sequence.
//!
//! When a layer has several groups (each shell contour plus the infill),
//! the order they are drawn in decides how far the nozzle travels with
//! nothing coming out. This module picks that order greedily.
//!
//! ## Algorithm
//!
//! - **Greedy nearest start**: every round, each group offers the line it
//!   would draw next from the current pen position; the nearest offer wins.
//! - **Closed-group drain**: once a closed loop (a shell) is started it is
//!   drawn to the end before anything else is considered.
//!
//! O(n²) in the number of lines, which is fine at layer scale.

use log::debug;

use crate::error::OrganizeError;
use crate::geometry::{Line, Point};
use crate::line_group::{Candidate, LineGroup, LineSupplier};

/// Merges a layer's line groups into one travel-minimising group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPathOrganizer {
    start: Point,
    allow_reversal: bool,
}

impl Default for LayerPathOrganizer {
    fn default() -> Self {
        Self { start: Point::new(0.0, 0.0), allow_reversal: true }
    }
}

impl LayerPathOrganizer {
    /// Organizer starting at the origin, reversing open lines when useful.
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the pen sits before the first line.
    pub fn with_start(mut self, start: Point) -> Self {
        self.start = start;
        self
    }

    /// Whether open groups may hand out a line end-first.
    pub fn allow_reversal(mut self, allow: bool) -> Self {
        self.allow_reversal = allow;
        self
    }

    /// Order every line of `groups` into a single open group.
    ///
    /// Empty input gives an empty group.
    pub fn organize(&self, groups: &[LineGroup]) -> LineGroup {
        let total: usize = groups.iter().map(LineGroup::len).sum();
        let mut suppliers: Vec<Option<LineSupplier<'_>>> = groups
            .iter()
            .map(|g| {
                Some(if self.allow_reversal { g.supplier() } else { g.supplier_in_direction() })
            })
            .collect();

        let mut out: Vec<Line> = Vec::with_capacity(total);
        let mut pen = self.start;
        let mut last_chosen: Option<usize> = None;

        loop {
            let mut best: Option<(usize, Candidate)> = None;
            for (i, slot) in suppliers.iter_mut().enumerate() {
                let Some(supplier) = slot else { continue };
                match supplier.poll(last_chosen == Some(i), pen) {
                    Some(c) => {
                        // Strict less-than keeps the earliest group on ties.
                        if best.is_none_or(|(_, b)| c.distance < b.distance) {
                            best = Some((i, c));
                        }
                    }
                    None => *slot = None,
                }
            }

            let Some((index, chosen)) = best else { break };
            out.push(chosen.line);
            pen = chosen.line.end;
            last_chosen = Some(index);

            let drain = suppliers[index].as_ref().is_some_and(|s| s.is_closed_loop());
            if drain {
                if let Some(supplier) = suppliers[index].as_mut() {
                    while let Some(c) = supplier.poll(true, pen) {
                        out.push(c.line);
                        pen = c.line.end;
                    }
                }
                suppliers[index] = None;
            }
        }

        let organized = LineGroup::from_lines(out);
        debug!(
            "organize: {} groups, {} lines, travel {:.3}",
            groups.len(),
            organized.len(),
            travel_distance(&organized, self.start)
        );
        organized
    }

    /// Like [`organize`](Self::organize), but at least one group is required.
    pub fn try_organize(&self, groups: &[LineGroup]) -> Result<LineGroup, OrganizeError> {
        if groups.is_empty() {
            return Err(OrganizeError::NoGroups);
        }
        Ok(self.organize(groups))
    }
}

/// Total pen-up distance of drawing `group` in order, starting at `start`.
pub fn travel_distance(group: &LineGroup, start: Point) -> f64 {
    let mut pen = start;
    let mut total = 0.0;
    for line in group {
        total += pen.distance(line.start);
        pen = line.end;
    }
    total
}
