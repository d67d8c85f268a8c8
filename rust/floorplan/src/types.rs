// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for the floor plan to IFC conversion

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Global offset applied to every raw point before placement
///
/// Only `position` takes part in the conversion. `rotation` and `shape` are
/// read so the file round-trips but are not applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub shape: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            shape: [0.0; 3],
        }
    }
}

impl Transform {
    pub fn offset(&self) -> Vector3<f64> {
        Vector3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Translate a raw point by the position offset
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        *p + self.offset()
    }

    pub fn apply_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

/// Input file family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transform,
    Walls,
    Floor,
    Rooms,
}

impl Category {
    /// Element categories in build order
    pub const ELEMENTS: [Category; 3] = [Category::Walls, Category::Floor, Category::Rooms];

    /// File stem of the vertex file (the transform has a single file)
    pub fn verts_stem(&self) -> &'static str {
        match self {
            Category::Transform => "transform",
            Category::Walls => "wall_verts",
            Category::Floor => "floor_verts",
            Category::Rooms => "rooms_verts",
        }
    }

    pub fn faces_stem(&self) -> Option<&'static str> {
        match self {
            Category::Transform => None,
            Category::Walls => Some("wall_faces"),
            Category::Floor => Some("floor_faces"),
            Category::Rooms => Some("rooms_faces"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Transform => "transform",
            Category::Walls => "walls",
            Category::Floor => "floor",
            Category::Rooms => "rooms",
        })
    }
}

/// Wall input: groups of 4-point face segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallData {
    /// `groups[g][s]` is segment `s` of wall group `g`
    pub groups: Vec<Vec<Vec<Point3<f64>>>>,
    pub faces: serde_json::Value,
}

/// Floor input: one flat point list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorData {
    pub points: Vec<Point3<f64>>,
    pub faces: serde_json::Value,
}

/// Room input: one point list per room
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomData {
    pub rooms: Vec<Vec<Point3<f64>>>,
    pub faces: serde_json::Value,
}

/// Everything read from one data directory
///
/// Each category is read independently; a failed category does not affect
/// the others.
#[derive(Debug)]
pub struct GeometrySet {
    pub transform: Transform,
    pub walls: Result<WallData>,
    pub floor: Result<FloorData>,
    pub rooms: Result<RoomData>,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for BoundingBox {
    /// Unit box used when there are no points
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::new(1.0, 1.0, 1.0),
        }
    }
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Extent along X
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_defaults_missing_fields() {
        let t: Transform = serde_json::from_str(r#"{"position": [1, 2, 3]}"#).unwrap();
        assert_eq!(t.position, [1.0, 2.0, 3.0]);
        assert_eq!(t.rotation, [0.0; 3]);

        let p = t.apply(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 3.0);
        assert_relative_eq!(p.z, 4.0);
    }

    #[test]
    fn test_category_files() {
        assert_eq!(Category::Walls.verts_stem(), "wall_verts");
        assert_eq!(Category::Rooms.faces_stem(), Some("rooms_faces"));
        assert_eq!(Category::Transform.faces_stem(), None);
        assert_eq!(Category::Floor.to_string(), "floor");
    }

    #[test]
    fn test_default_bbox_is_unit_box() {
        let bbox = BoundingBox::default();
        assert_relative_eq!(bbox.width(), 1.0);
        assert_relative_eq!(bbox.depth(), 1.0);
        assert_relative_eq!(bbox.height(), 1.0);
    }
}
