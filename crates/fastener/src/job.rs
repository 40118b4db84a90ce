//! Layer-by-layer driver.
//!
//! Walks the print height upward one layer at a time. For every layer it
//! collects the clearance hull of each part (in parallel, read-only), then
//! gives each part, in id order, the chance to record its placement and
//! appends the report for those that did.

use std::collections::HashSet;
use std::fmt::Write as _;

use fastener_math::{scale, unscale, Vec2, EPSILON};
use fastener_mesh::TriangleMesh;
use fastener_path::Polygon;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FastenerError, Result};
use crate::part::Part;
use crate::placement::PlacementPayloads;
use crate::report::format_general;

/// Upper bound on the number of layers a job may walk.
pub const MAX_LAYERS: usize = 1_000_000;

/// Layer and clearance parameters for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Layer height for non-first layers (mm).
    pub layer_height: f64,
    /// First layer height (mm).
    pub first_layer_height: f64,
    /// Highest print height to walk to (mm). Defaults to the highest part top.
    pub max_z: Option<f64>,
    /// Clearance added around every hull (mm).
    pub clearance: f64,
    /// Object-to-bed offset applied to report destinations (mm).
    pub world_offset: [f64; 2],
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            first_layer_height: 0.2,
            max_z: None,
            clearance: 0.3,
            world_offset: [0.0, 0.0],
        }
    }
}

impl JobSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.layer_height > 0.0 && self.layer_height <= 1.0) {
            return Err(FastenerError::InvalidLayers(
                "layer_height must be between 0 and 1mm".into(),
            ));
        }
        if !(self.first_layer_height > 0.0 && self.first_layer_height.is_finite()) {
            return Err(FastenerError::InvalidLayers(
                "first_layer_height must be a positive height".into(),
            ));
        }
        if !(self.clearance >= 0.0 && self.clearance.is_finite()) {
            return Err(FastenerError::InvalidLayers(
                "clearance must be a non-negative distance".into(),
            ));
        }
        if let Some(max_z) = self.max_z {
            if !max_z.is_finite() || max_z < 0.0 {
                return Err(FastenerError::InvalidLayers(
                    "max_z must be a non-negative height".into(),
                ));
            }
            self.check_layer_count(max_z)?;
        }
        Ok(())
    }

    /// Reject a print height that would need more than [`MAX_LAYERS`] layers.
    pub fn check_layer_count(&self, max_z: f64) -> Result<()> {
        let layers = (max_z - self.first_layer_height) / self.layer_height;
        if !(layers <= MAX_LAYERS as f64) {
            return Err(FastenerError::InvalidLayers(format!(
                "max_z {max_z} needs more than {MAX_LAYERS} layers"
            )));
        }
        Ok(())
    }
}

/// Layer top heights from the first layer up to and including `max_z`.
///
/// The last layer reaches or passes `max_z`. Heights are snapped onto the
/// fixed-point grid so repeated additions do not drift below a part's top.
pub fn generate_layer_tops(first_layer_height: f64, layer_height: f64, max_z: f64) -> Vec<f64> {
    if max_z <= 0.0 {
        return Vec::new();
    }
    let remaining = max_z - first_layer_height;
    // Use an integer layer count to avoid a float-compared loop
    let count = if remaining > 0.0 {
        (remaining / layer_height - EPSILON).ceil().max(0.0) as usize
    } else {
        0
    };
    let mut tops: Vec<f64> = (0..=count)
        .map(|i| unscale(scale(first_layer_height + i as f64 * layer_height)))
        .collect();
    // Snapping can land just under a top that is not on the grid
    if let Some(&last) = tops.last() {
        if last < max_z {
            tops.push(unscale(scale(last + layer_height)));
        }
    }
    tops
}

/// Hull of one part for one layer.
#[derive(Debug, Clone)]
pub struct PartHull {
    /// Owning part.
    pub part_id: u32,
    /// Clearance polygon on the fixed-point grid.
    pub polygon: Polygon,
}

/// Everything produced for one layer.
#[derive(Debug, Clone)]
pub struct LayerOutput {
    /// Layer index (0 = first layer).
    pub index: usize,
    /// Bottom of the layer (mm).
    pub z_lower: f64,
    /// Top of the layer, the print height (mm).
    pub z: f64,
    /// Non-empty hulls touching this layer.
    pub hulls: Vec<PartHull>,
    /// Placement G-code and reports emitted at this layer.
    pub gcode: String,
    /// Parts recorded at this layer, in id order.
    pub recorded: Vec<u32>,
}

/// Result of running a job.
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    /// Per-layer results, bottom to top.
    pub layers: Vec<LayerOutput>,
    /// Ids recorded during this run, in emission order.
    pub recorded: Vec<u32>,
    /// Ids that were placed but never recorded.
    pub unrecorded: Vec<u32>,
}

impl JobOutput {
    /// Placement G-code of every layer that emitted any, with layer markers.
    pub fn gcode(&self) -> String {
        let mut out = String::new();
        for layer in self.layers.iter().filter(|l| !l.gcode.is_empty()) {
            let _ = writeln!(out, "; layer {} z={}", layer.index, format_general(layer.z));
            out.push_str(&layer.gcode);
        }
        out
    }
}

/// A set of parts walked through a print.
#[derive(Debug, Clone)]
pub struct PrintJob {
    parts: Vec<Part>,
    settings: JobSettings,
    payloads: PlacementPayloads,
}

impl PrintJob {
    /// Create a job. Parts are kept in id order; ids must be unique.
    pub fn new(
        mut parts: Vec<Part>,
        settings: JobSettings,
        payloads: PlacementPayloads,
    ) -> Result<Self> {
        settings.validate()?;
        let mut seen = HashSet::new();
        for part in &parts {
            if !seen.insert(part.part_id()) {
                return Err(FastenerError::DuplicatePartId(part.part_id()));
            }
        }
        parts.sort_by_key(Part::part_id);
        let job = Self {
            parts,
            settings,
            payloads,
        };
        job.settings.check_layer_count(job.max_z())?;
        Ok(job)
    }

    /// Parts in id order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Mutable access to one part, e.g. to confirm its placement.
    pub fn part_mut(&mut self, part_id: u32) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.part_id() == part_id)
    }

    /// Job settings.
    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Placement payloads.
    pub fn payloads(&self) -> &PlacementPayloads {
        &self.payloads
    }

    /// Highest print height the job walks to.
    pub fn max_z(&self) -> f64 {
        self.settings.max_z.unwrap_or_else(|| {
            self.parts.iter().map(Part::top_z).fold(0.0, f64::max)
        })
    }

    /// Layer tops for this job.
    pub fn layer_heights(&self) -> Vec<f64> {
        generate_layer_tops(
            self.settings.first_layer_height,
            self.settings.layer_height,
            self.max_z(),
        )
    }

    /// Non-empty hulls of all parts for `[z_lower, z_upper)`.
    pub fn hulls(&self, z_lower: f64, z_upper: f64) -> Vec<PartHull> {
        let clearance = self.settings.clearance;
        self.parts
            .par_iter()
            .map(|part| PartHull {
                part_id: part.part_id(),
                polygon: part.hull_polygon(z_lower, z_upper, clearance),
            })
            .filter(|h| !h.polygon.is_empty())
            .collect()
    }

    /// Process one layer: hulls first, then placements in id order.
    pub fn process_layer(&mut self, index: usize, z_lower: f64, z: f64) -> LayerOutput {
        let hulls = self.hulls(z_lower, z);
        let offset = Vec2::new(self.settings.world_offset[0], self.settings.world_offset[1]);

        let mut gcode = String::new();
        let mut recorded = Vec::new();
        for part in &mut self.parts {
            let block = part.place_gcode(z, &self.payloads);
            if block.is_empty() {
                continue;
            }
            gcode.push_str(&block);
            gcode.push_str(&part.place_description(offset));
            recorded.push(part.part_id());
        }

        debug!(index, z, hulls = hulls.len(), "Processed layer");
        LayerOutput {
            index,
            z_lower,
            z,
            hulls,
            gcode,
            recorded,
        }
    }

    /// Walk every layer from the bed to [`Self::max_z`].
    pub fn run(&mut self) -> JobOutput {
        let heights = self.layer_heights();
        info!(
            parts = self.parts.len(),
            layers = heights.len(),
            "Running placement job"
        );

        let mut output = JobOutput::default();
        let mut z_lower = 0.0;
        for (index, &z) in heights.iter().enumerate() {
            let layer = self.process_layer(index, z_lower, z);
            output.recorded.extend_from_slice(&layer.recorded);
            output.layers.push(layer);
            z_lower = z;
        }

        for part in self.parts.iter().filter(|p| p.placed() && !p.printed()) {
            warn!(part_id = part.part_id(), "Placed part was never recorded");
            output.unrecorded.push(part.part_id());
        }
        output
    }

    /// All part bodies merged into one mesh.
    pub fn bodies(&self) -> TriangleMesh {
        let meshes: Vec<TriangleMesh> = self.parts.par_iter().map(Part::body_mesh).collect();
        let mut merged = TriangleMesh::new();
        for mesh in &meshes {
            merged.merge(mesh);
        }
        merged
    }
}
