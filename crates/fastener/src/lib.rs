#![warn(missing_docs)]

//! Nuts embedded into FDM prints.
//!
//! A [`Part`] is a nut that gets inserted into a cavity while the print is
//! paused. For every layer the part supplies a clearance hull that
//! toolpaths must avoid, and once the print height passes its top surface
//! it emits placement G-code plus a machine-readable report exactly once.
//!
//! # Example
//!
//! ```
//! use fastener::{Part, PlacementPayloads, PlacingMethod};
//! use fastener_math::{Point2, Point3};
//!
//! let mut nut = Part::new(1, "M3 nut", Point2::origin(), [5.5, 5.5, 2.5])
//!     .with_position(Point3::new(20.0, 20.0, 3.0))
//!     .with_placing_method(PlacingMethod::Automatic);
//!
//! let hull = nut.hull_polygon(3.0, 3.2, 0.3);
//! assert!(!hull.is_empty());
//!
//! nut.mark_placed();
//! let payloads = PlacementPayloads::new("G1 Z50", "M0");
//! assert!(nut.place_gcode(5.4, &payloads).is_empty());
//! assert!(nut.place_gcode(5.5, &payloads).starts_with(";Automatically place"));
//! ```

mod body;
pub mod config;
pub mod error;
mod hull;
pub mod job;
mod orientation;
mod part;
mod placement;
mod report;

pub use body::{square_nut_body, square_nut_facets};
pub use config::{JobConfig, PartConfig};
pub use error::{FastenerError, Result};
pub use job::{generate_layer_tops, JobOutput, JobSettings, LayerOutput, PartHull, PrintJob};
pub use orientation::{PartOrientation, PlacingMethod};
pub use part::Part;
pub use placement::{PlacementPayloads, PlacementState};
