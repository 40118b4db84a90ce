#![warn(missing_docs)]

//! Fixed-point 2D polygons for clearance hulls.
//!
//! Coordinates live on the integer grid defined by
//! [`fastener_math::SCALING_FACTOR`]. Convex hulls come from `geo`,
//! offsets from Clipper through `geo-clipper`, which runs at the same
//! fixed-point resolution so no precision is lost beyond one grid step.

pub mod clipper;
pub mod polygon;

pub use clipper::{convex_hull, offset, OffsetJoinType};
pub use polygon::{Point, Polygon};
