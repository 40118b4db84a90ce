//! Placement state machine and placement G-code.
//!
//! A part moves `Pending → PlacedUnrecorded → Recorded`. The first step is
//! driven from outside (operator or machine confirms the nut is in); the
//! second happens exactly once, inside [`Part::place_gcode`], as soon as the
//! print height clears the part's top surface.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::orientation::PlacingMethod;
use crate::part::Part;

/// Lifecycle of a part's physical placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlacementState {
    /// Not physically placed yet.
    #[default]
    Pending,
    /// Placed, but the placement has not been emitted.
    PlacedUnrecorded,
    /// Placement emitted. Terminal.
    Recorded,
}

impl PlacementState {
    /// The nut is physically in position.
    pub fn placed(self) -> bool {
        !matches!(self, PlacementState::Pending)
    }

    /// The placement has been emitted.
    pub fn printed(self) -> bool {
        matches!(self, PlacementState::Recorded)
    }
}

/// Caller-supplied G-code embedded verbatim into placement blocks.
///
/// No placeholder substitution is performed on the payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementPayloads {
    /// Appended after the automatic place directive.
    pub automatic: String,
    /// Appended after the operator message.
    pub manual: String,
    /// Emit `M363 P<id>` so firmware acknowledges a manual insertion.
    /// Off unless the firmware integration asks for it.
    pub manual_acknowledge: bool,
}

impl PlacementPayloads {
    /// Payloads with the acknowledgement directive disabled.
    pub fn new(automatic: impl Into<String>, manual: impl Into<String>) -> Self {
        Self {
            automatic: automatic.into(),
            manual: manual.into(),
            manual_acknowledge: false,
        }
    }
}

impl Part {
    /// Confirm the nut is physically in position. No-op unless pending.
    pub fn mark_placed(&mut self) {
        if self.state == PlacementState::Pending {
            self.state = PlacementState::PlacedUnrecorded;
        }
    }

    /// Placement G-code for the current print height `print_z`.
    ///
    /// Fires once, when the part is placed but not yet recorded and its top
    /// surface is at or below `print_z`; the part is then recorded. Every
    /// other call returns an empty string.
    pub fn place_gcode(&mut self, print_z: f64, payloads: &PlacementPayloads) -> String {
        if self.state != PlacementState::PlacedUnrecorded || self.top_z() > print_z {
            return String::new();
        }
        self.state = PlacementState::Recorded;

        let id = self.part_id();
        let mut gcode = String::new();
        match self.placing_method {
            PlacingMethod::Automatic => {
                let _ = writeln!(gcode, ";Automatically place part nr {id} {}", self.name());
                let _ = writeln!(gcode, "M361 P{id}");
                let _ = writeln!(gcode, "{}", payloads.automatic);
            }
            PlacingMethod::Manual => {
                let _ = writeln!(gcode, ";Manually place part nr {id}");
                let _ = writeln!(gcode, "M117 Insert component {id} {}", self.name());
                if payloads.manual_acknowledge {
                    let _ = writeln!(gcode, "M363 P{id}");
                } else {
                    debug!(part_id = id, "Manual placement acknowledgement disabled");
                }
                let _ = writeln!(gcode, "{}", payloads.manual);
            }
            PlacingMethod::None => {
                let _ = writeln!(gcode, ";Placing of part nr {id} {} is disabled", self.name());
            }
        }

        info!(
            part_id = id,
            method = self.placing_method.name(),
            print_z,
            "Recorded part placement"
        );
        gcode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastener_math::{Point2, Point3};

    fn payloads() -> PlacementPayloads {
        PlacementPayloads::new("G1 Z50 F600", "M0 Insert nut")
    }

    fn part(method: PlacingMethod) -> Part {
        let mut part = Part::new(3, "M3 nut", Point2::origin(), [10.0, 20.0, 5.0])
            .with_position(Point3::new(100.0, 100.0, 2.0))
            .with_placing_method(method);
        part.mark_placed();
        part
    }

    #[test]
    fn test_state_flags() {
        assert!(!PlacementState::Pending.placed());
        assert!(PlacementState::PlacedUnrecorded.placed());
        assert!(!PlacementState::PlacedUnrecorded.printed());
        assert!(PlacementState::Recorded.placed());
        assert!(PlacementState::Recorded.printed());
    }

    #[test]
    fn test_not_placed_never_fires() {
        let mut p = Part::new(1, "n", Point2::origin(), [1.0, 1.0, 1.0])
            .with_placing_method(PlacingMethod::Automatic);
        assert!(p.place_gcode(100.0, &payloads()).is_empty());
        assert_eq!(p.state(), PlacementState::Pending);
    }

    #[test]
    fn test_waits_for_top_surface() {
        let mut p = part(PlacingMethod::Automatic);
        assert!(p.place_gcode(6.99, &payloads()).is_empty());
        assert!(!p.printed());
        assert!(!p.place_gcode(7.0, &payloads()).is_empty());
        assert!(p.printed());
    }

    #[test]
    fn test_automatic_block() {
        let mut p = part(PlacingMethod::Automatic);
        let gcode = p.place_gcode(10.0, &payloads());
        assert_eq!(
            gcode,
            ";Automatically place part nr 3 M3 nut\nM361 P3\nG1 Z50 F600\n"
        );
    }

    #[test]
    fn test_manual_block_without_acknowledge() {
        let mut p = part(PlacingMethod::Manual);
        let gcode = p.place_gcode(10.0, &payloads());
        assert_eq!(
            gcode,
            ";Manually place part nr 3\nM117 Insert component 3 M3 nut\nM0 Insert nut\n"
        );
        assert!(!gcode.contains("M363"));
    }

    #[test]
    fn test_manual_block_with_acknowledge() {
        let mut p = part(PlacingMethod::Manual);
        let payloads = PlacementPayloads {
            manual_acknowledge: true,
            ..payloads()
        };
        let gcode = p.place_gcode(10.0, &payloads);
        assert_eq!(
            gcode,
            ";Manually place part nr 3\nM117 Insert component 3 M3 nut\nM363 P3\nM0 Insert nut\n"
        );
    }

    #[test]
    fn test_disabled_block_still_records() {
        let mut p = part(PlacingMethod::None);
        let gcode = p.place_gcode(10.0, &payloads());
        assert_eq!(gcode, ";Placing of part nr 3 M3 nut is disabled\n");
        assert!(p.printed());
    }

    #[test]
    fn test_fires_exactly_once() {
        let mut p = part(PlacingMethod::Manual);
        let mut emitted = 0;
        for step in 0..100 {
            let z = step as f64 * 0.2;
            if !p.place_gcode(z, &payloads()).is_empty() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
        assert!(p.place_gcode(7.0, &payloads()).is_empty());
        p.mark_placed();
        assert_eq!(p.state(), PlacementState::Recorded);
    }
}
