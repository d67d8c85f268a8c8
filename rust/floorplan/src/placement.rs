// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement calculation for walls, floors and rooms
//!
//! A wall segment is four points ordered bottom-start, top-start,
//! bottom-end, top-end. Its local frame sits at bottom-start with Z up and
//! the X axis along the wall in plan. Floors and rooms are reduced to their
//! axis-aligned bounding box.

use floorplan_ifc_core::Axis2Placement3D;
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::types::BoundingBox;

/// Below this plan length a wall has no usable direction
pub const MIN_DIRECTION_LENGTH: f64 = 0.001;
/// Below this vertical extent the wall height falls back to the default
pub const MIN_WALL_HEIGHT: f64 = 0.01;
pub const DEFAULT_WALL_HEIGHT: f64 = 1.0;
/// Walls shorter than this cannot be extruded
pub const MIN_WALL_LENGTH: f64 = 1e-9;

/// Index of each corner in a wall segment
const BOTTOM_START: usize = 0;
const TOP_START: usize = 1;
const BOTTOM_END: usize = 2;

/// Unit direction from `start` to `end` projected onto the XY plane
///
/// Falls back to +X when the plan distance is below
/// [`MIN_DIRECTION_LENGTH`].
pub fn wall_direction(start: &Point3<f64>, end: &Point3<f64>) -> Vector3<f64> {
    let d = Vector3::new(end.x - start.x, end.y - start.y, 0.0);
    let len = d.norm();
    if len > MIN_DIRECTION_LENGTH {
        d / len
    } else {
        Vector3::x()
    }
}

/// Vertical distance between the bottom and top of a wall, clamped to
/// [`DEFAULT_WALL_HEIGHT`] when it is too small to be a wall.
pub fn wall_height(bottom: &Point3<f64>, top: &Point3<f64>) -> f64 {
    let h = (top.z - bottom.z).abs();
    if h > MIN_WALL_HEIGHT {
        h
    } else {
        DEFAULT_WALL_HEIGHT
    }
}

/// Full 3D distance between the two bottom corners
pub fn wall_length(bottom_start: &Point3<f64>, bottom_end: &Point3<f64>) -> f64 {
    (bottom_end - bottom_start).norm()
}

/// Axis-aligned bounds of a point set (unit box when empty)
pub fn bounding_box(points: &[Point3<f64>]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::default();
    };
    let (min, max) = points.iter().skip(1).fold((*first, *first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    });
    BoundingBox::new(min, max)
}

/// Local frame and extent of one wall segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFrame {
    /// Bottom-start corner
    pub origin: Point3<f64>,
    /// Unit plan direction along the wall
    pub direction: Vector3<f64>,
    pub length: f64,
    pub height: f64,
}

impl WallFrame {
    /// Derive the frame from a segment of at least four points.
    pub fn from_segment(points: &[Point3<f64>]) -> Result<Self> {
        if points.len() < 4 {
            return Err(Error::degenerate(format!(
                "wall segment needs 4 points, got {}",
                points.len()
            )));
        }
        if !points.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(Error::degenerate("wall segment has non-finite points"));
        }

        let bottom_start = &points[BOTTOM_START];
        let bottom_end = &points[BOTTOM_END];
        let length = wall_length(bottom_start, bottom_end);
        if length <= MIN_WALL_LENGTH {
            return Err(Error::degenerate(format!(
                "wall segment has zero length at ({}, {}, {})",
                bottom_start.x, bottom_start.y, bottom_start.z
            )));
        }

        Ok(Self {
            origin: *bottom_start,
            direction: wall_direction(bottom_start, bottom_end),
            length,
            height: wall_height(bottom_start, &points[TOP_START]),
        })
    }

    /// Placement axes: origin at bottom-start, Z up, X along the wall
    pub fn axes(&self) -> Axis2Placement3D {
        Axis2Placement3D::new(self.origin, Vector3::z(), self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wall_direction_normalized() {
        let d = wall_direction(&Point3::origin(), &Point3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(d.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(d.y, 0.8, epsilon = 1e-12);
        assert_relative_eq!(d.z, 0.0);
    }

    #[test]
    fn test_wall_direction_ignores_z() {
        let d = wall_direction(&Point3::origin(), &Point3::new(0.0, 2.0, 5.0));
        assert_relative_eq!(d.x, 0.0);
        assert_relative_eq!(d.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.z, 0.0);
    }

    #[test]
    fn test_wall_direction_fallback() {
        let d = wall_direction(&Point3::origin(), &Point3::origin());
        assert_eq!(d, Vector3::new(1.0, 0.0, 0.0));

        // Below the threshold in plan
        let d = wall_direction(&Point3::origin(), &Point3::new(0.0005, 0.0, 3.0));
        assert_eq!(d, Vector3::x());
    }

    #[test]
    fn test_wall_height_clamp() {
        let bottom = Point3::origin();
        assert_relative_eq!(wall_height(&bottom, &Point3::new(0.0, 0.0, 0.005)), 1.0);
        assert_relative_eq!(wall_height(&bottom, &Point3::new(0.0, 0.0, 2.4)), 2.4);
        // Inverted segments still give a positive height
        assert_relative_eq!(wall_height(&Point3::new(0.0, 0.0, 3.0), &bottom), 3.0);
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(4.0, 2.0, 1.0),
            Point3::new(1.0, 5.0, 3.0),
        ];
        let bbox = bounding_box(&points);
        assert_eq!(bbox.min, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(bbox.max, Point3::new(4.0, 5.0, 3.0));
        assert_relative_eq!(bbox.width(), 3.0);
        assert_relative_eq!(bbox.depth(), 4.0);
    }

    #[test]
    fn test_bounding_box_empty() {
        let bbox = bounding_box(&[]);
        assert_eq!(bbox, BoundingBox::default());
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_wall_frame_from_segment() {
        let segment = [
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 2.7),
            Point3::new(4.0, 5.0, 0.0),
            Point3::new(4.0, 5.0, 2.7),
        ];
        let frame = WallFrame::from_segment(&segment).unwrap();
        assert_eq!(frame.origin, Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(frame.length, 5.0, epsilon = 1e-12);
        assert_relative_eq!(frame.height, 2.7, epsilon = 1e-12);
        assert_relative_eq!(frame.direction.x, 0.6, epsilon = 1e-12);

        let axes = frame.axes();
        assert_eq!(axes.axis, Vector3::z());
        assert!(axes.validate().is_ok());
    }

    #[test]
    fn test_wall_frame_rejects_degenerate() {
        let short = [Point3::origin(); 3];
        assert!(matches!(
            WallFrame::from_segment(&short),
            Err(Error::DegenerateGeometry(_))
        ));

        let collapsed = [Point3::origin(); 4];
        assert!(WallFrame::from_segment(&collapsed).is_err());
    }
}
