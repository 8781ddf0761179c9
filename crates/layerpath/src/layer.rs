//! Layer building, memoization and whole-part planning.
//!
//! A layer is the outline, its shells and the infill, ordered into one draw
//! sequence. Layers whose geometry-affecting parameters match are identical,
//! so a part only builds each distinct layer once and places copies of it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{debug, info};

use crate::error::{GeometryError, LayerError};
use crate::infill::InfillGenerator;
use crate::line_group::LineGroup;
use crate::order::LayerPathOrganizer;
use crate::shape::{OffsetSide, Shape};

/// Everything that shapes a single layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerParams {
    pub layer_height: f64,
    pub path_width: f64,
    /// Inward offsets drawn inside the outline.
    pub shell_count: usize,
    /// Infill direction in degrees, counter-clockwise from +X.
    pub infill_angle: f64,
    pub infill_spacing: f64,
    pub infill_shift_x: f64,
    pub infill_shift_y: f64,
    /// Overlap between neighbouring shells; each inset is
    /// `path_width - trim_adjust`.
    pub trim_adjust: f64,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            path_width: 0.5,
            shell_count: 2,
            infill_angle: 45.0,
            infill_spacing: 0.5,
            infill_shift_x: 0.0,
            infill_shift_y: 0.0,
            trim_adjust: 0.0,
        }
    }
}

impl LayerParams {
    /// Distance between successive shells.
    #[inline]
    pub fn inset_step(&self) -> f64 {
        self.path_width - self.trim_adjust
    }

    /// Cache key for the geometry these parameters produce.
    pub fn key(&self) -> LayerKey {
        LayerKey {
            angle: key_bits(self.infill_angle.rem_euclid(360.0)),
            shell_count: self.shell_count,
            shift_x: key_bits(self.infill_shift_x),
            shift_y: key_bits(self.infill_shift_y),
            inset_step: key_bits(self.inset_step()),
            spacing: key_bits(self.infill_spacing),
        }
    }
}

/// Identity of a layer's geometry.
///
/// Floats are stored as bits so the key can be hashed; `-0.0` is folded
/// into `0.0`. Layer height is not part of the key: it only moves a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerKey {
    angle: u64,
    shell_count: usize,
    shift_x: u64,
    shift_y: u64,
    inset_step: u64,
    spacing: u64,
}

fn key_bits(value: f64) -> u64 {
    if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() }
}

/// Build one ordered layer.
///
/// The outline and `shell_count` successive insets are drawn as closed
/// loops; the innermost contour bounds the infill. Any failure names the
/// stage that broke and no partial layer is returned.
pub fn build_layer(outline: &Shape, params: &LayerParams) -> Result<LineGroup, LayerError> {
    let step = params.inset_step();
    let mut contours: Vec<Shape> = Vec::with_capacity(params.shell_count + 1);
    contours.push(outline.clone());

    for shell in 1..=params.shell_count {
        let outer = &contours[contours.len() - 1];
        let inner = if step > 0.0 {
            outer.offset(step, OffsetSide::Inside)
        } else {
            Err(GeometryError::OffsetCollapsed { width: step })
        }
        .map_err(|source| LayerError::Offset { shell, source })?;
        contours.push(inner);
    }

    let innermost = &contours[contours.len() - 1];
    let infill = InfillGenerator::new(innermost, params.infill_angle, params.infill_spacing)
        .with_shift(params.infill_shift_x, params.infill_shift_y)
        .generate()
        .map_err(|source| LayerError::Trim { source })?;

    debug!(
        "layer: {} contours, {} infill lines at {} deg",
        contours.len(),
        infill.len(),
        params.infill_angle
    );

    let mut groups: Vec<LineGroup> = contours.into_iter().map(Shape::into_group).collect();
    groups.push(infill);

    LayerPathOrganizer::new()
        .try_organize(&groups)
        .map_err(|source| LayerError::Organize { source })
}

/// Built layers of one outline, keyed by the parameters that shape them.
///
/// The key leaves the outline out, so a cache is tied to a single outline
/// for its whole life.
#[derive(Debug)]
pub struct LayerCache<'a> {
    outline: &'a Shape,
    layers: HashMap<LayerKey, LineGroup>,
    hits: usize,
    misses: usize,
}

impl<'a> LayerCache<'a> {
    pub fn new(outline: &'a Shape) -> Self {
        Self { outline, layers: HashMap::new(), hits: 0, misses: 0 }
    }

    /// The outline every cached layer was built from.
    pub fn outline(&self) -> &'a Shape {
        self.outline
    }

    /// Return the cached layer for `params`, building it on first use.
    ///
    /// A failed build is not cached.
    pub fn get_or_build(&mut self, params: &LayerParams) -> Result<&LineGroup, LayerError> {
        match self.layers.entry(params.key()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                debug!("layer cache hit ({} lines)", entry.get().len());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let layer = build_layer(self.outline, params)?;
                self.misses += 1;
                debug!("layer cache miss, built {} lines", layer.len());
                Ok(entry.insert(layer))
            }
        }
    }

    pub fn contains(&self, params: &LayerParams) -> bool {
        self.layers.contains_key(&params.key())
    }

    /// Number of distinct layers held.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// One part: a stack of layers printed at an XY offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartParams {
    pub layer_count: usize,
    pub shift_x: f64,
    pub shift_y: f64,
}

/// A finished layer placed in the part.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLayer {
    /// 1-based layer number within the part.
    pub number: usize,
    /// Height of the layer's top surface.
    pub z: f64,
    pub params: LayerParams,
    pub lines: LineGroup,
}

/// Plans every layer of one or more parts printed from the same outline.
#[derive(Debug)]
pub struct PartPlanner<'a> {
    first_layer_z: f64,
    cache: LayerCache<'a>,
}

impl<'a> PartPlanner<'a> {
    pub fn new(outline: &'a Shape, first_layer_z: f64) -> Self {
        Self { first_layer_z, cache: LayerCache::new(outline) }
    }

    pub fn cache(&self) -> &LayerCache<'a> {
        &self.cache
    }

    /// Lay out `part.layer_count` layers, cycling through `layers`.
    ///
    /// Each layer's height is added before it is placed, so the first
    /// layer sits at `first_layer_z + layer_height`. Cached geometry is
    /// copied and shifted, never modified.
    pub fn plan_part(
        &mut self,
        part: &PartParams,
        layers: &[LayerParams],
    ) -> Result<Vec<PlacedLayer>, LayerError> {
        if layers.is_empty() {
            return Ok(Vec::new());
        }

        let mut placed = Vec::with_capacity(part.layer_count);
        let mut z = self.first_layer_z;

        for (i, params) in layers.iter().cycle().take(part.layer_count).enumerate() {
            z += params.layer_height;
            let layer = self.cache.get_or_build(params)?;
            placed.push(PlacedLayer {
                number: i + 1,
                z,
                params: *params,
                lines: layer.translate(part.shift_x, part.shift_y),
            });
        }

        info!(
            "part: {} layers, {} distinct ({} cache hits)",
            placed.len(),
            self.cache.len(),
            self.cache.hits()
        );
        Ok(placed)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use approx::assert_abs_diff_eq;

    fn square(size: f64) -> Shape {
        Shape::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ])
        .unwrap()
    }

    fn params(shells: usize, angle: f64) -> LayerParams {
        LayerParams {
            layer_height: 0.25,
            path_width: 1.0,
            shell_count: shells,
            infill_angle: angle,
            infill_spacing: 2.0,
            ..LayerParams::default()
        }
    }

    #[test]
    fn key_ignores_layer_height_and_sign_of_zero() {
        let a = params(1, 0.0);
        let b = LayerParams { layer_height: 0.4, infill_angle: -0.0, ..a };
        assert_eq!(a.key(), b.key());
        let c = LayerParams { infill_angle: 360.0, ..a };
        assert_eq!(a.key(), c.key());
        assert_ne!(a.key(), params(2, 0.0).key());
        assert_ne!(a.key(), params(1, 90.0).key());
        assert_ne!(a.key(), LayerParams { infill_shift_y: 0.5, ..a }.key());
    }

    #[test]
    fn layer_with_no_shells_is_outline_plus_infill() {
        let layer = build_layer(&square(10.0), &params(0, 0.0)).unwrap();
        // 4 edges + rows at y = 0, 2, 4, 6, 8
        assert_eq!(layer.len(), 9);
        assert_abs_diff_eq!(layer.total_length(), 40.0 + 50.0, epsilon = 1e-9);
    }

    #[test]
    fn too_many_shells_fail_in_offset_stage() {
        let err = build_layer(&square(10.0), &params(6, 0.0)).unwrap_err();
        assert_eq!(err.stage(), "offset");
        assert!(matches!(err, LayerError::Offset { shell: 5, .. }), "got {:?}", err);
    }

    #[test]
    fn bad_spacing_fails_in_trim_stage() {
        let p = LayerParams { infill_spacing: 0.0, ..params(1, 0.0) };
        let err = build_layer(&square(10.0), &p).unwrap_err();
        assert_eq!(err.stage(), "trim");
    }

    #[test]
    fn cache_builds_each_key_once() {
        let outline = square(10.0);
        let mut cache = LayerCache::new(&outline);
        let a = params(1, 0.0);
        let b = params(1, 90.0);

        let first = cache.get_or_build(&a).unwrap().clone();
        let again = cache.get_or_build(&a).unwrap().clone();
        assert_eq!(first, again);
        cache.get_or_build(&b).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
        assert!(cache.contains(&a));

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(&a));
    }

    #[test]
    fn caches_never_share_layers_across_outlines() {
        let small = square(10.0);
        let big = square(50.0);
        let p = params(1, 0.0);

        let mut small_cache = LayerCache::new(&small);
        let mut big_cache = LayerCache::new(&big);
        let from_small = small_cache.get_or_build(&p).unwrap().clone();
        let from_big = big_cache.get_or_build(&p).unwrap().clone();

        assert_eq!(from_big, build_layer(&big, &p).unwrap());
        assert_abs_diff_eq!(from_small.bounds().unwrap().max_x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(from_big.bounds().unwrap().max_x, 50.0, epsilon = 1e-9);
        assert!(std::ptr::eq(big_cache.outline(), &big));
        assert_eq!(big_cache.misses(), 1);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let outline = square(10.0);
        let mut cache = LayerCache::new(&outline);
        assert!(cache.get_or_build(&params(9, 0.0)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn plan_part_cycles_params_and_stacks_z() {
        let outline = square(10.0);
        let mut planner = PartPlanner::new(&outline, 0.1);
        let part = PartParams { layer_count: 5, shift_x: 20.0, shift_y: -5.0 };
        let layers = [params(1, 0.0), params(1, 90.0)];

        let placed = planner.plan_part(&part, &layers).unwrap();
        assert_eq!(placed.len(), 5);
        assert_eq!(planner.cache().len(), 2);
        assert_eq!(planner.cache().hits(), 3);

        for (i, layer) in placed.iter().enumerate() {
            assert_eq!(layer.number, i + 1);
            assert_abs_diff_eq!(layer.z, 0.1 + 0.25 * (i + 1) as f64, epsilon = 1e-12);
            assert_eq!(layer.params.infill_angle, if i % 2 == 0 { 0.0 } else { 90.0 });
            let b = layer.lines.bounds().unwrap();
            assert_abs_diff_eq!(b.min_x, 20.0, epsilon = 1e-9);
            assert_abs_diff_eq!(b.min_y, -5.0, epsilon = 1e-9);
        }
        // Same key, same geometry.
        assert_eq!(placed[0].lines, placed[2].lines);
    }

    #[test]
    fn plan_part_without_layer_params_is_empty() {
        let outline = square(10.0);
        let mut planner = PartPlanner::new(&outline, 0.0);
        let part = PartParams { layer_count: 3, shift_x: 0.0, shift_y: 0.0 };
        assert!(planner.plan_part(&part, &[]).unwrap().is_empty());
    }
}
