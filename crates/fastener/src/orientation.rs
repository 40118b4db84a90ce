//! Mounting poses and placing methods.
//!
//! Everything that differs between a flat and an upright nut is decided
//! here, once per variant: which height interval touches the part, where the
//! pivot sits relative to the destination point, how far the body is lifted,
//! and which size axis is reported as the height. The hull outline lives in
//! [`crate::hull`] next to the rest of the hull construction.

use fastener_math::Vec2;
use serde::{Deserialize, Serialize};

/// How a nut is mounted in its cavity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PartOrientation {
    /// Lying on its flat face, e.g. a hex nut resting on the hexagon.
    #[default]
    Flat,
    /// Standing on an edge, inserted sideways into a channel.
    Upright,
}

impl PartOrientation {
    /// All variants, in name-table order.
    pub const ALL: [PartOrientation; 2] = [PartOrientation::Flat, PartOrientation::Upright];

    /// Orientation names. Index 0 is the fallback.
    pub const NAMES: [&'static str; 2] = ["flat", "upright"];

    /// Exact, case-sensitive lookup in [`Self::NAMES`]. Anything else is `Flat`.
    pub fn from_name(name: &str) -> Self {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::ALL[i])
            .unwrap_or_default()
    }

    /// Whether `name` is one of [`Self::NAMES`].
    pub fn is_known_name(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    /// Name used in reports and job files.
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Does the print-height interval `[z_lower, z_upper)` touch a part whose
    /// base sits at `base_z`?
    ///
    /// Upright parts only count when the interval lies inside their standing
    /// height `size[1]`; flat parts count on any overlap with `size[2]`.
    pub fn affects(self, base_z: f64, size: &[f64; 3], z_lower: f64, z_upper: f64) -> bool {
        use fastener_math::EPSILON;
        match self {
            PartOrientation::Upright => z_lower >= base_z && z_upper < base_z + size[1] + EPSILON,
            PartOrientation::Flat => z_upper - base_z > EPSILON && z_lower < base_z + size[2],
        }
    }

    /// XY offset from the destination point to the part's pivot for a yaw of
    /// `yaw` radians.
    ///
    /// An upright part pivots on one face, so its centre is half the
    /// thickness `size[2]` away, perpendicular to the yaw direction.
    pub fn pivot_offset(self, size: &[f64; 3], yaw: f64) -> Vec2 {
        match self {
            PartOrientation::Upright => {
                let half = size[2] / 2.0;
                Vec2::new(half * -yaw.sin(), half * yaw.cos())
            }
            PartOrientation::Flat => Vec2::zeros(),
        }
    }

    /// Vertical lift applied to the body mesh above the destination point.
    pub fn body_lift(self, size: &[f64; 3], footprint_height: f64) -> f64 {
        match self {
            PartOrientation::Upright => size[1] / 2.0,
            PartOrientation::Flat => footprint_height,
        }
    }

    /// The size axis that is the part's height in this pose.
    pub fn reported_height(self, size: &[f64; 3]) -> f64 {
        match self {
            PartOrientation::Upright => size[1],
            PartOrientation::Flat => size[2],
        }
    }
}

impl std::fmt::Display for PartOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How the nut gets into its cavity once the print pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacingMethod {
    /// The machine inserts the part itself.
    Automatic,
    /// An operator inserts the part.
    Manual,
    /// Placing is disabled for this part.
    #[default]
    None,
}

impl PlacingMethod {
    /// Name used in logs and job files.
    pub fn name(self) -> &'static str {
        match self {
            PlacingMethod::Automatic => "automatic",
            PlacingMethod::Manual => "manual",
            PlacingMethod::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_name_exact_match() {
        assert_eq!(PartOrientation::from_name("flat"), PartOrientation::Flat);
        assert_eq!(PartOrientation::from_name("upright"), PartOrientation::Upright);
    }

    #[test]
    fn test_unknown_names_fall_back_to_flat() {
        for name in ["", "Upright", "UPRIGHT", " upright", "upright ", "sideways", "flat\n"] {
            assert_eq!(PartOrientation::from_name(name), PartOrientation::Flat, "{name:?}");
        }
        assert!(!PartOrientation::is_known_name("Upright"));
    }

    #[test]
    fn test_name_roundtrip() {
        for o in PartOrientation::ALL {
            assert_eq!(PartOrientation::from_name(o.name()), o);
        }
        assert_eq!(PartOrientation::Upright.to_string(), "upright");
    }

    #[test]
    fn test_upright_interval_must_fit_inside() {
        let size = [10.0, 20.0, 5.0];
        let o = PartOrientation::Upright;
        assert!(o.affects(0.0, &size, 0.0, 0.2));
        assert!(o.affects(0.0, &size, 19.8, 20.0));
        assert!(!o.affects(0.0, &size, -0.2, 0.0));
        assert!(!o.affects(0.0, &size, 19.9, 20.1));
    }

    #[test]
    fn test_flat_interval_overlap() {
        let size = [10.0, 20.0, 5.0];
        let o = PartOrientation::Flat;
        assert!(o.affects(0.0, &size, -1.0, 1.0));
        assert!(o.affects(0.0, &size, 4.9, 5.1));
        assert!(!o.affects(0.0, &size, 5.0, 5.2));
        assert!(!o.affects(0.0, &size, -0.2, 0.00001));
    }

    #[test]
    fn test_pivot_offset() {
        let size = [10.0, 20.0, 4.0];
        let up = PartOrientation::Upright.pivot_offset(&size, 0.0);
        assert_relative_eq!(up.x, 0.0);
        assert_relative_eq!(up.y, 2.0);
        let quarter = PartOrientation::Upright.pivot_offset(&size, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(quarter.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.y, 0.0, epsilon = 1e-12);
        assert_eq!(PartOrientation::Flat.pivot_offset(&size, 1.0), Vec2::zeros());
    }

    #[test]
    fn test_reported_height_axis() {
        let size = [10.0, 20.0, 5.0];
        assert_eq!(PartOrientation::Upright.reported_height(&size), 20.0);
        assert_eq!(PartOrientation::Flat.reported_height(&size), 5.0);
    }
}
