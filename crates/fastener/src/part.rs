//! The embedded part and its mutable state.

use fastener_math::{Point2, Point3, Rotation};

use crate::orientation::{PartOrientation, PlacingMethod};
use crate::placement::PlacementState;

/// A nut embedded into the printed object.
///
/// `origin` and `size` are fixed at construction. Destination, yaw,
/// orientation, placing method and the placement state change over the job.
#[derive(Debug, Clone)]
pub struct Part {
    part_id: u32,
    name: String,
    thread_size: String,
    origin: Point2,
    size: [f64; 3],
    footprint_height: f64,
    pub(crate) position: Point3,
    pub(crate) rotation: Rotation,
    pub(crate) orientation: PartOrientation,
    pub(crate) placing_method: PlacingMethod,
    pub(crate) state: PlacementState,
}

impl Part {
    /// Create a flat, unplaced part at the world origin.
    ///
    /// `size` is (radius-or-width, depth/length, thickness/height); which
    /// axis is the height depends on the orientation.
    pub fn new(part_id: u32, name: impl Into<String>, origin: Point2, size: [f64; 3]) -> Self {
        Self {
            part_id,
            name: name.into(),
            thread_size: String::new(),
            origin,
            size,
            footprint_height: 0.0,
            position: Point3::origin(),
            rotation: Rotation::default(),
            orientation: PartOrientation::Flat,
            placing_method: PlacingMethod::default(),
            state: PlacementState::Pending,
        }
    }

    /// Set the nominal thread descriptor (e.g. `"M3"`).
    pub fn with_thread_size(mut self, thread_size: impl Into<String>) -> Self {
        self.thread_size = thread_size.into();
        self
    }

    /// Set the vertical gap between the destination and a flat body.
    pub fn with_footprint_height(mut self, footprint_height: f64) -> Self {
        self.footprint_height = footprint_height;
        self
    }

    /// Set the world destination.
    pub fn with_position(mut self, position: Point3) -> Self {
        self.position = position;
        self
    }

    /// Set all three rotation angles (degrees).
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the orientation; see [`Part::set_orientation`].
    pub fn with_orientation(mut self, orientation: PartOrientation) -> Self {
        self.set_orientation(orientation);
        self
    }

    /// Set the placing method.
    pub fn with_placing_method(mut self, method: PlacingMethod) -> Self {
        self.placing_method = method;
        self
    }

    /// Stable id used in commands and reports.
    pub fn part_id(&self) -> u32 {
        self.part_id
    }

    /// Human-readable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal thread descriptor.
    pub fn thread_size(&self) -> &str {
        &self.thread_size
    }

    /// Local footprint reference point.
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    /// Size triple.
    pub fn size(&self) -> [f64; 3] {
        self.size
    }

    /// Gap between the destination and a flat body.
    pub fn footprint_height(&self) -> f64 {
        self.footprint_height
    }

    /// World destination.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Rotation angles in degrees.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Current mounting pose.
    pub fn orientation(&self) -> PartOrientation {
        self.orientation
    }

    /// Current placing method.
    pub fn placing_method(&self) -> PlacingMethod {
        self.placing_method
    }

    /// Where the part is in the placement lifecycle.
    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// The nut has been physically positioned.
    pub fn placed(&self) -> bool {
        self.state.placed()
    }

    /// The placement has been emitted.
    pub fn printed(&self) -> bool {
        self.state.printed()
    }

    /// World height of the part's top surface; placement fires once the
    /// print passes it.
    pub fn top_z(&self) -> f64 {
        self.position.z + self.size[2]
    }

    /// Move the destination.
    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    /// Set all three rotation angles (degrees).
    pub fn set_rotation(&mut self, x: f64, y: f64, z: f64) {
        self.rotation = Rotation::new(x, y, z);
    }

    /// Set the yaw (degrees), keeping tilt.
    pub fn set_z_rotation(&mut self, z: f64) {
        self.rotation.z = z;
    }

    /// Change the orientation. Tilt about x and y is reset; yaw is kept.
    pub fn set_orientation(&mut self, orientation: PartOrientation) {
        self.orientation = orientation;
        self.set_rotation(0.0, 0.0, self.rotation.z);
    }

    /// Change the orientation by name. Unknown names select `Flat`.
    pub fn set_orientation_from_name(&mut self, name: &str) -> PartOrientation {
        let orientation = PartOrientation::from_name(name);
        self.set_orientation(orientation);
        orientation
    }

    /// Change the placing method.
    pub fn set_placing_method(&mut self, method: PlacingMethod) {
        self.placing_method = method;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nut() -> Part {
        Part::new(7, "M3 nut", Point2::new(0.0, 0.0), [5.5, 5.5, 2.4])
            .with_thread_size("M3")
            .with_position(Point3::new(10.0, 20.0, 3.0))
    }

    #[test]
    fn test_defaults() {
        let part = Part::new(1, "n", Point2::origin(), [1.0, 2.0, 3.0]);
        assert_eq!(part.orientation(), PartOrientation::Flat);
        assert_eq!(part.placing_method(), PlacingMethod::None);
        assert!(!part.placed());
        assert!(!part.printed());
        assert_eq!(part.footprint_height(), 0.0);
    }

    #[test]
    fn test_orientation_resets_tilt_keeps_yaw() {
        let mut part = nut().with_rotation(Rotation::new(10.0, 20.0, 30.0));
        part.set_orientation(PartOrientation::Upright);
        assert_eq!(part.orientation(), PartOrientation::Upright);
        assert_eq!(part.rotation(), Rotation::new(0.0, 0.0, 30.0));
    }

    #[test]
    fn test_orientation_from_unknown_name() {
        let mut part = nut().with_orientation(PartOrientation::Upright);
        part.set_rotation(5.0, 5.0, 45.0);
        assert_eq!(part.set_orientation_from_name("standing"), PartOrientation::Flat);
        assert_eq!(part.orientation(), PartOrientation::Flat);
        assert_eq!(part.rotation(), Rotation::yaw(45.0));
    }

    #[test]
    fn test_z_rotation_only_touches_yaw() {
        let mut part = nut();
        part.set_rotation(1.0, 2.0, 3.0);
        part.set_z_rotation(90.0);
        assert_eq!(part.rotation(), Rotation::new(1.0, 2.0, 90.0));
    }

    #[test]
    fn test_top_z() {
        assert!((nut().top_z() - 5.4).abs() < 1e-12);
    }
}
