//! Error types for job configuration.
//!
//! Geometry and placement operations never fail; only loading and
//! validating a job can.

use thiserror::Error;

/// Errors that can occur while loading or validating a job.
#[derive(Error, Debug)]
pub enum FastenerError {
    /// Reading the job file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The job file is not valid TOML for a job.
    #[error("invalid job file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A part definition is unusable.
    #[error("invalid part {part_id}: {reason}")]
    InvalidPart {
        /// Offending part id.
        part_id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// Two parts share an id.
    #[error("duplicate part id {0}")]
    DuplicatePartId(u32),

    /// Layer settings cannot produce a layer sequence.
    #[error("invalid layer settings: {0}")]
    InvalidLayers(String),
}

/// Result type for job operations.
pub type Result<T> = std::result::Result<T, FastenerError>;
