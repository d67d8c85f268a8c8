// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan geometry to IFC building model
//!
//! This crate turns the per-category geometry files produced by a floor plan
//! recognition step into an IFC4 document:
//! 1. Reading the transform and the wall, floor and room vertex files
//! 2. Deriving a placement and a swept solid for every element
//! 3. Building the project / site / building / storey hierarchy
//! 4. Containing every element in the storey and writing STEP
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_ifc::{create_ifc, BuildOptions};
//!
//! let report = create_ifc("Data/0", "out/floorplan", &BuildOptions::default())?;
//! for category in &report.categories {
//!     println!("{}", category);
//! }
//! ```

pub mod assembler;
pub mod config;
pub mod demo;
pub mod error;
pub mod finalizer;
pub mod hierarchy;
pub mod placement;
pub mod reader;
pub mod shape;
pub mod types;

pub use assembler::{CategoryOutcome, CategoryReport, ElementAssembler};
pub use config::{BuildOptions, Config, SuperResolution};
pub use demo::{single_wall_document, DemoWall};
pub use error::{Error, Result};
pub use finalizer::{finalize, resolve_output_path, write_document};
pub use hierarchy::{Contexts, SpatialHierarchy};
pub use placement::{bounding_box, wall_direction, wall_height, wall_length, WallFrame};
pub use reader::GeometryReader;
pub use types::{BoundingBox, Category, FloorData, GeometrySet, RoomData, Transform, WallData};

use std::path::{Path, PathBuf};

use floorplan_ifc_core::writer::unix_now;
use floorplan_ifc_core::{IfcModel, NodeKey};

/// Outcome of a document build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// One entry per element category, in build order
    pub categories: Vec<CategoryReport>,
    pub element_count: usize,
    /// Set once the document has been written
    pub output_path: Option<PathBuf>,
}

impl BuildReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Build the complete model from already read geometry.
///
/// Category failures are recorded in the report; only model errors and
/// invalid options are returned as errors.
pub fn build_document(set: GeometrySet, options: &BuildOptions) -> Result<(IfcModel, BuildReport)> {
    options.validate()?;

    let mut model = IfcModel::new();
    model.set_owner(options.owner(unix_now()));
    let hierarchy = SpatialHierarchy::build(&mut model, options)?;

    let mut assembler = ElementAssembler::new(&mut model, &hierarchy, options, set.transform);
    let categories = vec![
        assembler.assemble_walls(set.walls),
        assembler.assemble_floor(set.floor),
        assembler.assemble_rooms(set.rooms),
    ];
    let elements: Vec<NodeKey> = assembler.finish();

    finalize(&mut model, &hierarchy, &elements)?;

    Ok((
        model,
        BuildReport {
            categories,
            element_count: elements.len(),
            output_path: None,
        },
    ))
}

/// Read a data directory and write the document to `output`.
pub fn create_ifc(
    data_dir: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let data_dir = data_dir.as_ref();
    tracing::info!(data_dir = %data_dir.display(), "reading floor plan geometry");

    let set = GeometryReader::new(data_dir).read_all();
    let (model, mut report) = build_document(set, options)?;
    let written = write_document(&model, output.as_ref(), options, model.owner().creation_date)?;

    tracing::info!(
        path = %written.display(),
        elements = report.element_count,
        "created IFC file"
    );
    report.output_path = Some(written);
    Ok(report)
}

/// Produces a geometry data directory from a floor plan image
pub trait GeometryExtractor {
    /// Run extraction and return the directory holding the category files.
    fn extract(&self, image: &Path, super_resolution: &SuperResolution) -> Result<PathBuf>;
}

/// Extractor for geometry that was extracted ahead of time
#[derive(Debug, Clone)]
pub struct PrecomputedGeometry {
    pub data_dir: PathBuf,
}

impl PrecomputedGeometry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl GeometryExtractor for PrecomputedGeometry {
    fn extract(&self, image: &Path, super_resolution: &SuperResolution) -> Result<PathBuf> {
        tracing::debug!(
            image = %image.display(),
            sr_enabled = super_resolution.enabled,
            sr_scale = super_resolution.scale,
            sr_method = %super_resolution.method,
            "using precomputed geometry"
        );
        if !self.data_dir.is_dir() {
            return Err(Error::Extraction(format!(
                "data directory {} does not exist",
                self.data_dir.display()
            )));
        }
        Ok(self.data_dir.clone())
    }
}

/// Extract geometry from the configured image and convert it.
pub fn create_floor_plan_ifc(
    config: &Config,
    extractor: &dyn GeometryExtractor,
) -> Result<BuildReport> {
    let data_dir = extractor.extract(&config.image_path, &config.super_resolution)?;
    create_ifc(data_dir, &config.output_path, &config.options)
}
