// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-category geometry files
//!
//! A data directory holds one JSON document per file: `transform`,
//! `wall_verts`/`wall_faces`, `floor_verts`/`floor_faces` and
//! `rooms_verts`/`rooms_faces`. The vertex files are nested arrays of
//! `[x, y, z]` triples. Structural problems (missing file, bad JSON, wrong
//! nesting) fail the whole category; individual vertex entries that are not
//! numeric triples are dropped.

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{Category, FloorData, GeometrySet, RoomData, Transform, WallData};

/// Extension of the files written by the geometry extraction step
pub const DEFAULT_EXTENSION: &str = "txt";

/// Reads the category files of one data directory
#[derive(Debug, Clone)]
pub struct GeometryReader {
    base: PathBuf,
    extension: String,
}

impl GeometryReader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Full path of a file stem inside the data directory
    pub fn path_for(&self, stem: &str) -> PathBuf {
        if self.extension.is_empty() {
            self.base.join(stem)
        } else {
            self.base.join(format!("{}.{}", stem, self.extension))
        }
    }

    fn read_json(&self, category: Category, stem: &str) -> Result<Value> {
        let path = self.path_for(stem);
        let text = fs::read_to_string(&path).map_err(|e| Error::missing(category, &path, e))?;
        let value =
            serde_json::from_str(&text).map_err(|e| Error::missing(category, &path, e))?;
        tracing::debug!(category = %category, path = %path.display(), "read input file");
        Ok(value)
    }

    fn read_faces(&self, category: Category) -> Result<Value> {
        match category.faces_stem() {
            Some(stem) => self.read_json(category, stem),
            None => Ok(Value::Null),
        }
    }

    pub fn read_transform(&self) -> Result<Transform> {
        let category = Category::Transform;
        let value = self.read_json(category, category.verts_stem())?;
        serde_json::from_value(value)
            .map_err(|e| Error::missing(category, self.path_for(category.verts_stem()), e))
    }

    /// Wall groups, each a list of face segments
    pub fn read_walls(&self) -> Result<WallData> {
        let category = Category::Walls;
        let verts = self.read_json(category, category.verts_stem())?;
        let faces = self.read_faces(category)?;
        let path = self.path_for(category.verts_stem());

        let groups = as_array(&verts, category, &path, "wall list")?
            .iter()
            .map(|group| {
                as_array(group, category, &path, "wall group")?
                    .iter()
                    .map(|segment| {
                        as_array(segment, category, &path, "wall segment").map(points)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WallData { groups, faces })
    }

    pub fn read_floor(&self) -> Result<FloorData> {
        let category = Category::Floor;
        let verts = self.read_json(category, category.verts_stem())?;
        let faces = self.read_faces(category)?;
        let path = self.path_for(category.verts_stem());

        let points = points(as_array(&verts, category, &path, "floor vertex list")?);
        Ok(FloorData { points, faces })
    }

    pub fn read_rooms(&self) -> Result<RoomData> {
        let category = Category::Rooms;
        let verts = self.read_json(category, category.verts_stem())?;
        let faces = self.read_faces(category)?;
        let path = self.path_for(category.verts_stem());

        let rooms = as_array(&verts, category, &path, "room list")?
            .iter()
            .map(|room| match room {
                Value::Null => Ok(Vec::new()),
                other => as_array(other, category, &path, "room").map(points),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RoomData { rooms, faces })
    }

    /// Read every category. Failures are kept per category; a missing or
    /// malformed transform falls back to no offset.
    pub fn read_all(&self) -> GeometrySet {
        let transform = self.read_transform().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "no usable transform, using zero offset");
            Transform::default()
        });

        GeometrySet {
            transform,
            walls: self.read_walls(),
            floor: self.read_floor(),
            rooms: self.read_rooms(),
        }
    }
}

fn as_array<'a>(
    value: &'a Value,
    category: Category,
    path: &Path,
    what: &str,
) -> Result<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::missing(category, path, format!("{} is not an array", what)))
}

/// Convert a `[x, y, z, ...]` entry; anything else is rejected
pub fn point_from_value(value: &Value) -> Option<Point3<f64>> {
    let coords = value.as_array()?;
    if coords.len() < 3 {
        return None;
    }
    let x = coords[0].as_f64()?;
    let y = coords[1].as_f64()?;
    let z = coords[2].as_f64()?;
    Some(Point3::new(x, y, z))
}

fn points(values: &[Value]) -> Vec<Point3<f64>> {
    values.iter().filter_map(point_from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_from_value() {
        assert_eq!(
            point_from_value(&json!([1, 2.5, -3])),
            Some(Point3::new(1.0, 2.5, -3.0))
        );
        // Extra coordinates are ignored
        assert_eq!(
            point_from_value(&json!([1, 2, 3, 4])),
            Some(Point3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(point_from_value(&json!([1, 2])), None);
        assert_eq!(point_from_value(&json!(["a", 2, 3])), None);
        assert_eq!(point_from_value(&json!({"x": 1})), None);
    }

    #[test]
    fn test_invalid_vertices_are_dropped() {
        let values = json!([[0, 0, 0], [1], null, [1, 1, 1]]);
        let pts = points(values.as_array().unwrap());
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_path_for_extension() {
        let reader = GeometryReader::new("/data/0");
        assert_eq!(
            reader.path_for("wall_verts"),
            PathBuf::from("/data/0/wall_verts.txt")
        );
        let reader = reader.with_extension(".json");
        assert_eq!(
            reader.path_for("transform"),
            PathBuf::from("/data/0/transform.json")
        );
    }

    #[test]
    fn test_missing_directory_fails_every_category() {
        let reader = GeometryReader::new("/nonexistent/floorplan/data");
        let set = reader.read_all();
        assert_eq!(set.transform, Transform::default());
        assert!(matches!(
            set.walls,
            Err(Error::MissingData {
                category: Category::Walls,
                ..
            })
        ));
        assert!(set.floor.is_err());
        assert!(set.rooms.is_err());
    }
}
