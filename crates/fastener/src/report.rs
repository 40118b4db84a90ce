//! Placement report comment block.

use std::fmt::Write as _;

use fastener_math::Vec2;

use crate::part::Part;

/// Significant digits in report numbers.
const SIGNIFICANT_DIGITS: usize = 6;

/// General number format: 6 significant digits, trailing zeros dropped,
/// exponent form only for very large or very small magnitudes.
pub(crate) fn format_general(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= SIGNIFICANT_DIGITS as i32 {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        sci.parse::<f64>().unwrap_or(v).to_string()
    }
}

impl Part {
    /// Report describing a recorded placement, as G-code comments.
    ///
    /// `world_offset` shifts the destination from object to bed coordinates.
    /// Empty until the part is recorded. The shape is the local, unrotated
    /// footprint rectangle regardless of orientation; only yaw is reported.
    pub fn place_description(&self, world_offset: Vec2) -> String {
        if !self.printed() {
            return String::new();
        }

        let f = format_general;
        let id = self.part_id();
        let size = self.size();
        let origin = self.origin();
        let (hw, hd) = (size[0] / 2.0, size[1] / 2.0);
        let corners = [
            (origin.x - hw, origin.y - hd),
            (origin.x - hw, origin.y + hd),
            (origin.x + hw, origin.y + hd),
            (origin.x + hw, origin.y - hd),
        ];

        let mut out = String::new();
        let _ = writeln!(out, ";<part id=\"{id}\" name=\"{}\">", self.name());
        let _ = writeln!(
            out,
            ";  <type identifier=\"nut\" thread_size=\"{}\"/>",
            self.thread_size()
        );
        let _ = writeln!(out, ";  <position box=\"{id}\"/>");
        let _ = writeln!(
            out,
            ";  <size height=\"{}\"/>",
            f(self.orientation.reported_height(&size))
        );
        out.push_str(";  <shape>\n");
        for (x, y) in corners {
            let _ = writeln!(out, ";    <point x=\"{}\" y=\"{}\"/>", f(x), f(y));
        }
        out.push_str(";  </shape>\n");
        let _ = writeln!(
            out,
            ";  <destination x=\"{}\" y=\"{}\" z=\"{}\"/>",
            f(self.position.x + world_offset.x),
            f(self.position.y + world_offset.y),
            f(self.position.z)
        );
        let _ = writeln!(
            out,
            ";  <orientation orientation=\"{}\"/>",
            self.orientation.name()
        );
        let _ = writeln!(out, ";  <rotation z=\"{}\"/>", f(self.rotation.z));
        out.push_str(";</part>\n\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::{PartOrientation, PlacingMethod};
    use crate::placement::PlacementPayloads;
    use fastener_math::{Point2, Point3, Rotation};

    fn recorded(orientation: PartOrientation) -> Part {
        let mut part = Part::new(4, "hex", Point2::new(1.0, 2.0), [10.0, 20.0, 5.0])
            .with_thread_size("M5")
            .with_position(Point3::new(100.0, 50.5, 0.0))
            .with_orientation(orientation)
            .with_rotation(Rotation::new(10.0, 20.0, 45.0))
            .with_placing_method(PlacingMethod::Manual);
        part.mark_placed();
        part.place_gcode(100.0, &PlacementPayloads::default());
        part
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(100.0), "100");
        assert_eq!(format_general(2.5), "2.5");
        assert_eq!(format_general(-5.0), "-5");
        assert_eq!(format_general(0.1 + 0.2), "0.3");
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(123.4567891), "123.457");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001234), "1.234e-05");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
    }

    #[test]
    fn test_empty_until_recorded() {
        let mut part = Part::new(1, "n", Point2::origin(), [1.0, 1.0, 1.0]);
        assert!(part.place_description(Vec2::zeros()).is_empty());
        part.mark_placed();
        assert!(part.place_description(Vec2::zeros()).is_empty());
    }

    #[test]
    fn test_full_report_flat() {
        let part = recorded(PartOrientation::Flat);
        let report = part.place_description(Vec2::new(10.0, -0.5));
        let expected = "\
;<part id=\"4\" name=\"hex\">
;  <type identifier=\"nut\" thread_size=\"M5\"/>
;  <position box=\"4\"/>
;  <size height=\"5\"/>
;  <shape>
;    <point x=\"-4\" y=\"-8\"/>
;    <point x=\"-4\" y=\"12\"/>
;    <point x=\"6\" y=\"12\"/>
;    <point x=\"6\" y=\"-8\"/>
;  </shape>
;  <destination x=\"110\" y=\"50\" z=\"0\"/>
;  <orientation orientation=\"flat\"/>
;  <rotation z=\"45\"/>
;</part>

";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_upright_reports_standing_height() {
        let report = recorded(PartOrientation::Upright).place_description(Vec2::zeros());
        assert!(report.contains(";  <size height=\"20\"/>\n"));
        assert!(report.contains(";  <orientation orientation=\"upright\"/>\n"));
        // Shape stays the local footprint in either pose
        assert!(report.contains(";    <point x=\"-4\" y=\"-8\"/>\n"));
    }

    #[test]
    fn test_only_yaw_is_reported() {
        let report = recorded(PartOrientation::Flat).place_description(Vec2::zeros());
        assert_eq!(report.matches("<rotation").count(), 1);
        assert!(report.contains(";  <rotation z=\"45\"/>\n"));
    }
}
