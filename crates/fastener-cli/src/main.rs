//! fastener CLI - run nut placement jobs
//!
//! Reads a TOML job file and writes placement G-code, clearance hulls or
//! part bodies.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fastener::{square_nut_body, JobConfig, PrintJob};
use fastener_mesh::TriangleMesh;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fastener")]
#[command(about = "Clearance hulls and placement G-code for embedded nuts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job and write the placement G-code
    Gcode {
        /// Job file (.toml)
        job: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print clearance hulls as JSON
    Hulls {
        /// Job file (.toml)
        job: PathBuf,
        /// Only the layer whose top is this height
        #[arg(short, long)]
        layer: Option<f64>,
    },
    /// Export part bodies as ASCII STL
    Stl {
        /// Job file (.toml)
        job: PathBuf,
        /// Output .stl file
        output: PathBuf,
        /// Export plain square nut boxes instead of oriented bodies
        #[arg(long = "box")]
        square: bool,
    },
}

#[derive(Serialize)]
struct LayerHulls {
    z_lower: f64,
    z: f64,
    hulls: Vec<HullJson>,
}

#[derive(Serialize)]
struct HullJson {
    part_id: u32,
    points: Vec<[f64; 2]>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gcode { job, output } => write_gcode(&job, output.as_deref())?,
        Commands::Hulls { job, layer } => print_hulls(&job, layer)?,
        Commands::Stl {
            job,
            output,
            square,
        } => export_stl(&job, &output, square)?,
    }

    Ok(())
}

fn load_job(path: &Path) -> Result<PrintJob> {
    let config =
        JobConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?;
    config
        .into_job()
        .with_context(|| format!("Invalid job {}", path.display()))
}

fn write_gcode(path: &Path, output: Option<&Path>) -> Result<()> {
    let mut job = load_job(path)?;
    let result = job.run();

    let gcode = result.gcode();
    match output {
        Some(out) => {
            std::fs::write(out, &gcode)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), parts = result.recorded.len(), "Wrote placement G-code");
        }
        None => io::stdout().write_all(gcode.as_bytes())?,
    }
    Ok(())
}

fn print_hulls(path: &Path, layer: Option<f64>) -> Result<()> {
    let job = load_job(path)?;
    let heights = job.layer_heights();

    let mut layers = Vec::new();
    let mut z_lower = 0.0;
    for z in heights {
        let wanted = layer.map_or(true, |l| (l - z).abs() < 1e-6);
        if wanted {
            let hulls = job
                .hulls(z_lower, z)
                .into_iter()
                .map(|h| HullJson {
                    part_id: h.part_id,
                    points: h.polygon.unscaled().iter().map(|p| [p.x, p.y]).collect(),
                })
                .collect();
            layers.push(LayerHulls { z_lower, z, hulls });
        }
        z_lower = z;
    }

    if let Some(l) = layer {
        if layers.is_empty() {
            anyhow::bail!("No layer ends at z={l}");
        }
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, &layers)?;
    writeln!(writer)?;
    Ok(())
}

fn export_stl(path: &Path, output: &Path, square: bool) -> Result<()> {
    let job = load_job(path)?;

    let mesh = if square {
        let mut merged = TriangleMesh::new();
        for part in job.parts() {
            let p = part.position();
            let size = part.size();
            merged.merge(&square_nut_body(p.x, p.y, p.z, size[0], size[2]));
        }
        merged
    } else {
        job.bodies()
    };

    let file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    fastener_mesh::write_stl(&mesh, "fastener", BufWriter::new(file))?;
    println!("Exported STL to {}", output.display());
    Ok(())
}
