//! # layerpath
//!
//! 2D toolpath geometry for layer-by-layer additive manufacturing.
//!
//! A closed outline ([`Shape`]) is inset into shells, the innermost contour
//! is filled with clipped parallel rows ([`InfillGenerator`]), and the
//! resulting line groups are stitched into one draw order per layer
//! ([`LayerPathOrganizer`]). [`PartPlanner`] stacks layers into a part and
//! reuses identical layers through a [`LayerCache`].
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod clip;
pub mod error;
pub mod geometry;
pub mod infill;
pub mod layer;
pub mod line_group;
pub mod order;
pub mod shape;
pub mod svg;

// Re-export common types at crate root for convenience.
pub use clip::{Containment, point_in_polygon, trim_line, trim_lines};
pub use error::{GeometryError, LayerError, OrganizeError};
pub use geometry::{BoundingBox, EPSILON, Intersection, Line, POINT_TOLERANCE, Point};
pub use infill::{InfillGenerator, InfillStage};
pub use layer::{LayerCache, LayerKey, LayerParams, PartParams, PartPlanner, PlacedLayer, build_layer};
pub use line_group::{Candidate, LineGroup, LineSupplier};
pub use order::{LayerPathOrganizer, travel_distance};
pub use shape::{OffsetSide, Shape};
pub use svg::{SvgError, extract_shapes_from_svg};
