//! TOML job files.
//!
//! A job file has three tables: `[job]` layer settings, `[payloads]` G-code
//! snippets and one `[[parts]]` entry per nut.

use std::collections::HashSet;
use std::path::Path;

use fastener_math::{Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FastenerError, Result};
use crate::job::{JobSettings, PrintJob};
use crate::orientation::{PartOrientation, PlacingMethod};
use crate::part::Part;
use crate::placement::PlacementPayloads;

/// A complete job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    /// Layer and clearance settings.
    #[serde(default)]
    pub job: JobSettings,
    /// Placement payloads.
    #[serde(default)]
    pub payloads: PlacementPayloads,
    /// Part definitions.
    #[serde(default)]
    pub parts: Vec<PartConfig>,
}

/// One `[[parts]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartConfig {
    /// Unique part id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Thread descriptor, e.g. `"M3"`.
    #[serde(default)]
    pub thread_size: String,
    /// Local xy offset of the outline.
    #[serde(default)]
    pub origin: [f64; 2],
    /// Bounding extents.
    pub size: [f64; 3],
    /// World destination.
    #[serde(default)]
    pub position: [f64; 3],
    /// Rotation angles in degrees (x, y, z).
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Orientation name, see [`PartOrientation::NAMES`].
    #[serde(default = "default_orientation")]
    pub orientation: String,
    /// Placing method.
    #[serde(default)]
    pub placing_method: PlacingMethod,
    /// Already physically placed when the job starts.
    #[serde(default)]
    pub placed: bool,
    /// Gap between destination and a flat body.
    #[serde(default)]
    pub footprint_height: f64,
}

fn default_orientation() -> String {
    PartOrientation::Flat.name().to_string()
}

impl PartConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| FastenerError::InvalidPart {
            part_id: self.id,
            reason: reason.to_string(),
        };

        if self.size.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(invalid("size must be positive and finite"));
        }
        let finite = self
            .origin
            .iter()
            .chain(&self.position)
            .chain(&self.rotation)
            .all(|v| v.is_finite());
        if !finite {
            return Err(invalid("origin, position and rotation must be finite"));
        }
        if !(0.0..self.size[2]).contains(&self.footprint_height) {
            return Err(invalid("footprint_height must lie within the part height"));
        }
        Ok(())
    }

    /// Build the part. The configured rotation is applied after the
    /// orientation, so an explicit tilt survives the orientation reset.
    pub fn build(&self) -> Part {
        let [ox, oy] = self.origin;
        let [px, py, pz] = self.position;
        let [rx, ry, rz] = self.rotation;

        let mut part = Part::new(self.id, self.name.clone(), Point2::new(ox, oy), self.size)
            .with_thread_size(self.thread_size.clone())
            .with_footprint_height(self.footprint_height)
            .with_position(Point3::new(px, py, pz))
            .with_placing_method(self.placing_method);

        if !PartOrientation::is_known_name(&self.orientation) {
            warn!(
                part_id = self.id,
                orientation = %self.orientation,
                "Unknown orientation, using flat"
            );
        }
        part.set_orientation_from_name(&self.orientation);
        part.set_rotation(rx, ry, rz);

        if self.placed {
            part.mark_placed();
        }
        part
    }
}

impl JobConfig {
    /// Parse a job from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a job file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), parts = config.parts.len(), "Loaded job");
        Ok(config)
    }

    /// Check settings and every part definition.
    pub fn validate(&self) -> Result<()> {
        self.job.validate()?;
        let mut seen = HashSet::new();
        for part in &self.parts {
            part.validate()?;
            if !seen.insert(part.id) {
                return Err(FastenerError::DuplicatePartId(part.id));
            }
        }
        Ok(())
    }

    /// Validate, then build every part.
    pub fn build_parts(&self) -> Result<Vec<Part>> {
        self.validate()?;
        Ok(self.parts.iter().map(PartConfig::build).collect())
    }

    /// Validate, then build a ready-to-run job.
    pub fn into_job(self) -> Result<PrintJob> {
        let parts = self.build_parts()?;
        PrintJob::new(parts, self.job, self.payloads)
    }
}
