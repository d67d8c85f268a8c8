// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape construction
//!
//! Every element gets a rectangular extrusion. Walls are built in their own
//! local frame (the placement carries position and orientation), floors and
//! rooms are built in storey coordinates from their bounding box.

use floorplan_ifc_core::{
    Axis2Placement3D, ContextKey, Polyline2D, ProductShape, Profile2D, ShapeRepresentation,
    SweptSolid,
};
use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};
use crate::placement::{bounding_box, WallFrame};

/// Minimum number of points for a footprint
pub const MIN_FOOTPRINT_POINTS: usize = 3;

/// Wall body: `length x thickness` rectangle extruded up by the wall height.
///
/// The rectangle runs from 0 to `length` along local X and is centred on
/// the wall axis across its thickness.
pub fn wall_body(frame: &WallFrame, thickness: f64, body: ContextKey) -> Result<ShapeRepresentation> {
    let profile = Profile2D::rectangle(frame.length, thickness)
        .with_centre(Point2::new(frame.length / 2.0, 0.0));
    let solid = SweptSolid::new(
        profile,
        Axis2Placement3D::identity(),
        Vector3::z(),
        frame.height,
    )
    .map_err(degenerate)?;
    Ok(ShapeRepresentation::body(body, solid))
}

/// Wall axis: straight 2D line along local X
pub fn wall_axis(frame: &WallFrame, axis: ContextKey) -> Result<ShapeRepresentation> {
    let line = Polyline2D::new(vec![Point2::origin(), Point2::new(frame.length, 0.0)])
        .map_err(degenerate)?;
    Ok(ShapeRepresentation::axis(axis, line))
}

/// Body and axis representations of a wall
pub fn wall_shape(
    frame: &WallFrame,
    thickness: f64,
    body: ContextKey,
    axis: ContextKey,
) -> Result<ProductShape> {
    Ok(ProductShape::new(vec![
        wall_body(frame, thickness, body)?,
        wall_axis(frame, axis)?,
    ]))
}

/// Box over the XY footprint of `points`, starting at the lowest point
fn footprint_solid(points: &[Point3<f64>], depth: f64) -> Result<SweptSolid> {
    if points.len() < MIN_FOOTPRINT_POINTS {
        return Err(Error::degenerate(format!(
            "footprint needs {} points, got {}",
            MIN_FOOTPRINT_POINTS,
            points.len()
        )));
    }
    let bbox = bounding_box(points);
    let (width, extent_y) = (bbox.width(), bbox.depth());
    if !(width > 0.0 && extent_y > 0.0) {
        return Err(Error::degenerate(format!(
            "footprint has no area ({} x {})",
            width, extent_y
        )));
    }

    SweptSolid::new(
        Profile2D::from_corner(width, extent_y),
        Axis2Placement3D::at(bbox.min),
        Vector3::z(),
        depth,
    )
    .map_err(degenerate)
}

/// Floor slab of the given thickness over the bounding box of `points`
pub fn floor_shape(points: &[Point3<f64>], thickness: f64, body: ContextKey) -> Result<ProductShape> {
    let solid = footprint_solid(points, thickness)?;
    Ok(ProductShape::new(vec![ShapeRepresentation::body(body, solid)]))
}

/// Room volume of the given ceiling height over the bounding box of `points`
pub fn space_shape(points: &[Point3<f64>], height: f64, body: ContextKey) -> Result<ProductShape> {
    let solid = footprint_solid(points, height)?;
    Ok(ProductShape::new(vec![ShapeRepresentation::body(body, solid)]))
}

fn degenerate(e: floorplan_ifc_core::Error) -> Error {
    Error::degenerate(e.to_string())
}
