// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single wall test document
//!
//! A minimal but complete model (hierarchy, units, one wall at the origin
//! running along +X) for checking that a viewer picks up placements and
//! extrusions.

use floorplan_ifc_core::{IfcModel, NodeKind};
use nalgebra::{Point3, Vector3};

use crate::config::BuildOptions;
use crate::error::Result;
use crate::finalizer::finalize;
use crate::hierarchy::SpatialHierarchy;
use crate::placement::WallFrame;
use crate::shape::wall_shape;

/// Dimensions of the demo wall in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoWall {
    pub length: f64,
    pub height: f64,
    pub thickness: f64,
}

impl Default for DemoWall {
    fn default() -> Self {
        Self {
            length: 10.0,
            height: 3.0,
            thickness: 0.3,
        }
    }
}

pub const DEMO_WALL_NAME: &str = "Test_Wall";

/// Build the single wall document
pub fn single_wall_document(wall: DemoWall, options: &BuildOptions) -> Result<IfcModel> {
    let mut model = IfcModel::new();
    model.set_owner(options.owner(floorplan_ifc_core::writer::unix_now()));
    let hierarchy = SpatialHierarchy::build(&mut model, options)?;

    let frame = WallFrame {
        origin: Point3::origin(),
        direction: Vector3::x(),
        length: wall.length,
        height: wall.height,
    };
    let shape = wall_shape(
        &frame,
        wall.thickness,
        hierarchy.contexts.body,
        hierarchy.contexts.axis,
    )?;

    let placement = model.add_placement(Some(hierarchy.storey_placement), frame.axes())?;
    let node = model.add_node(DEMO_WALL_NAME, NodeKind::Wall, Some(placement))?;
    model.set_representation(node, shape)?;

    finalize(&mut model, &hierarchy, &[node])?;
    tracing::info!(
        length = wall.length,
        height = wall.height,
        thickness = wall.thickness,
        "built single wall document"
    );
    Ok(model)
}
