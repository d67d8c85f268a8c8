// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: convert extracted floor plan geometry into an IFC file
//!
//! Usage:
//!   floorplan-to-ifc build [--data-dir DIR] [--output PATH] [options]
//!   floorplan-to-ifc demo-wall [--output PATH] [--length L] [--height H]
//!
//! Unset flags fall back to the `FLOORPLAN_*` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floorplan_ifc::{
    create_floor_plan_ifc, demo, write_document, CategoryOutcome, Config, PrecomputedGeometry,
};

#[derive(Parser)]
#[command(name = "floorplan-to-ifc")]
#[command(about = "Convert floor plan geometry into an IFC building model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a document from a geometry data directory
    Build {
        /// Directory holding transform, wall, floor and room files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Output path (.ifc is appended when there is no extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Source floor plan image, passed to the geometry extractor
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        wall_thickness: Option<f64>,
        #[arg(long)]
        slab_thickness: Option<f64>,
        #[arg(long)]
        space_height: Option<f64>,
        #[arg(long)]
        project_name: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Disable super-resolution in the extraction step
        #[arg(long)]
        no_sr: bool,
    },
    /// Write a document with a single wall at the origin
    DemoWall {
        #[arg(short, long, default_value = "test_single_wall.ifc")]
        output: PathBuf,
        #[arg(long, default_value_t = 10.0)]
        length: f64,
        #[arg(long, default_value_t = 3.0)]
        height: f64,
        #[arg(long, default_value_t = 0.3)]
        thickness: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,floorplan_ifc=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            data_dir,
            output,
            image,
            wall_thickness,
            slab_thickness,
            space_height,
            project_name,
            author,
            no_sr,
        } => {
            let mut config = Config::from_env();
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(path) = image {
                config.image_path = path;
            }
            if let Some(v) = wall_thickness {
                config.options.wall_thickness = v;
            }
            if let Some(v) = slab_thickness {
                config.options.slab_thickness = v;
            }
            if let Some(v) = space_height {
                config.options.space_height = v;
            }
            if let Some(name) = project_name {
                config.options.project_name = name;
            }
            if let Some(name) = author {
                config.options.author = name;
            }
            if no_sr {
                config.super_resolution.enabled = false;
            }
            run_build(&config)
        }
        Commands::DemoWall {
            output,
            length,
            height,
            thickness,
        } => run_demo_wall(output, length, height, thickness),
    }
}

fn run_build(config: &Config) -> Result<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        output = %config.output_path.display(),
        "starting conversion"
    );
    let extractor = PrecomputedGeometry::new(&config.data_dir);
    let report = create_floor_plan_ifc(config, &extractor)
        .with_context(|| format!("failed to convert {}", config.data_dir.display()))?;

    for category in &report.categories {
        match category.outcome {
            CategoryOutcome::Failed(_) => eprintln!("  {}", category),
            CategoryOutcome::Built { .. } => println!("  {}", category),
        }
    }
    if let Some(path) = &report.output_path {
        println!(
            "Created IFC file at {} ({} elements)",
            path.display(),
            report.element_count
        );
    }
    Ok(())
}

fn run_demo_wall(output: PathBuf, length: f64, height: f64, thickness: f64) -> Result<()> {
    let config = Config::from_env();
    let wall = demo::DemoWall {
        length,
        height,
        thickness,
    };
    let model = demo::single_wall_document(wall, &config.options)
        .context("failed to build single wall document")?;
    let path = write_document(&model, &output, &config.options, model.owner().creation_date)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Created IFC file at {}", path.display());
    println!(
        "Wall dimensions: {}m long x {}m high x {}m thick",
        length, height, thickness
    );
    Ok(())
}
