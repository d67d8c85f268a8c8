// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP (ISO-10303-21) serialization of an [`IfcModel`].
//!
//! The writer walks the arena once and assigns entity ids in emission order.
//! Every entity is written after the entities it references: owner history,
//! units, contexts, project, then each node preceded by its placement chain
//! and shape, and finally the relationships. One entity per line.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::geometry::{
    Axis2Placement3D, Polyline2D, ProductShape, RepresentationItem, ShapeRepresentation,
    SweptSolid,
};
use crate::keys::{ContextKey, NodeKey, PlacementKey};
use crate::model::{ContextKind, IfcModel, NodeKind, Relationship};
use crate::schema::IfcType;

/// Schema identifier written into FILE_SCHEMA
pub const SCHEMA_IDENTIFIER: &str = "IFC4";

/// Values for the STEP HEADER section
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub file_name: String,
    pub view_definition: String,
    pub author: String,
    pub organization: String,
    pub preprocessor: String,
    pub originating_system: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl Default for HeaderInfo {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            view_definition: "ViewDefinition [CoordinationView]".to_string(),
            author: String::new(),
            organization: String::new(),
            preprocessor: "floorplan-ifc".to_string(),
            originating_system: "FloorplanToIFC".to_string(),
            timestamp: unix_now(),
        }
    }
}

/// Current time in seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Serializes a model to STEP text.
pub struct StepWriter<'a> {
    model: &'a IfcModel,
    header: HeaderInfo,
    out: String,
    next_id: u64,
    owner_history: u64,
    placement_ids: FxHashMap<PlacementKey, u64>,
    context_ids: FxHashMap<ContextKey, u64>,
    node_ids: FxHashMap<NodeKey, u64>,
    // Identical points and directions are written once
    shared: FxHashMap<String, u64>,
}

impl<'a> StepWriter<'a> {
    pub fn new(model: &'a IfcModel, header: HeaderInfo) -> Self {
        Self {
            model,
            header,
            out: String::with_capacity(64 * 1024),
            next_id: 1,
            owner_history: 0,
            placement_ids: FxHashMap::default(),
            context_ids: FxHashMap::default(),
            node_ids: FxHashMap::default(),
            shared: FxHashMap::default(),
        }
    }

    /// Render the complete file.
    pub fn write(mut self) -> Result<String> {
        let model = self.model;
        model.project.ok_or(Error::MissingProject)?;

        self.write_header();
        self.out.push_str("DATA;\n");

        self.owner_history = self.write_owner_history();
        let units = self.write_units();
        for &key in &model.context_order {
            self.context_id(key)?;
        }
        for &key in &model.node_order {
            self.write_node(key, units)?;
        }
        for relationship in &model.relationships {
            self.write_relationship(relationship)?;
        }

        self.out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        tracing::debug!(
            entities = self.next_id - 1,
            bytes = self.out.len(),
            "serialized IFC model"
        );
        Ok(self.out)
    }

    fn write_header(&mut self) {
        let h = &self.header;
        let _ = write!(
            self.out,
            "ISO-10303-21;\nHEADER;\n\
             FILE_DESCRIPTION(({}),'2;1');\n\
             FILE_NAME({},{},({}),({}),{},{},'');\n\
             FILE_SCHEMA(('{}'));\n\
             ENDSEC;\n",
            string(&h.view_definition),
            string(&h.file_name),
            string(&iso_timestamp(h.timestamp)),
            string(&h.author),
            string(&h.organization),
            string(&h.preprocessor),
            string(&h.originating_system),
            SCHEMA_IDENTIFIER,
        );
    }

    fn entity(&mut self, ifc_type: IfcType, attributes: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let _ = writeln!(self.out, "#{}={}({});", id, ifc_type.as_str(), attributes);
        id
    }

    fn shared_entity(&mut self, ifc_type: IfcType, attributes: String) -> u64 {
        let key = format!("{}({})", ifc_type.as_str(), attributes);
        if let Some(&id) = self.shared.get(&key) {
            return id;
        }
        let id = self.entity(ifc_type, &attributes);
        self.shared.insert(key, id);
        id
    }

    // --- Geometry primitives ---

    fn point3(&mut self, p: &Point3<f64>) -> u64 {
        self.shared_entity(
            IfcType::IfcCartesianPoint,
            format!("({},{},{})", real(p.x), real(p.y), real(p.z)),
        )
    }

    fn point2(&mut self, p: &Point2<f64>) -> u64 {
        self.shared_entity(
            IfcType::IfcCartesianPoint,
            format!("({},{})", real(p.x), real(p.y)),
        )
    }

    fn direction3(&mut self, d: &Vector3<f64>) -> u64 {
        self.shared_entity(
            IfcType::IfcDirection,
            format!("({},{},{})", real(d.x), real(d.y), real(d.z)),
        )
    }

    fn axis2placement3d(&mut self, axes: &Axis2Placement3D) -> u64 {
        let location = self.point3(&axes.location);
        let axis = self.direction3(&axes.axis);
        let ref_direction = self.direction3(&axes.ref_direction);
        self.entity(
            IfcType::IfcAxis2Placement3D,
            &format!("#{},#{},#{}", location, axis, ref_direction),
        )
    }

    fn placement_id(&mut self, key: PlacementKey) -> Result<u64> {
        if let Some(&id) = self.placement_ids.get(&key) {
            return Ok(id);
        }
        let data = self
            .model
            .placements
            .get(key)
            .ok_or(Error::PlacementNotFound(key))?;
        let (parent, axes) = (data.parent, data.axes);
        let parent_ref = match parent {
            Some(p) => format!("#{}", self.placement_id(p)?),
            None => "$".to_string(),
        };
        let axes_id = self.axis2placement3d(&axes);
        let id = self.entity(
            IfcType::IfcLocalPlacement,
            &format!("{},#{}", parent_ref, axes_id),
        );
        self.placement_ids.insert(key, id);
        Ok(id)
    }

    // --- Ownership and units ---

    fn write_owner_history(&mut self) -> u64 {
        let owner = self.model.owner.clone();
        let person = self.entity(
            IfcType::IfcPerson,
            &format!("$,{},$,$,$,$,$,$", string(&owner.person)),
        );
        let organization = self.entity(
            IfcType::IfcOrganization,
            &format!("$,{},$,$,$", string(&owner.organization)),
        );
        let person_org = self.entity(
            IfcType::IfcPersonAndOrganization,
            &format!("#{},#{},$", person, organization),
        );
        let application = self.entity(
            IfcType::IfcApplication,
            &format!(
                "#{},{},{},{}",
                organization,
                string(&owner.application_version),
                string(&owner.application_name),
                string(&owner.application_id)
            ),
        );
        self.entity(
            IfcType::IfcOwnerHistory,
            &format!(
                "#{},#{},$,$,$,$,$,{}",
                person_org, application, owner.creation_date
            ),
        )
    }

    fn write_units(&mut self) -> Option<u64> {
        let model = self.model;
        let units = model.units.as_ref()?;
        let ids: Vec<u64> = units
            .units
            .iter()
            .map(|unit| {
                self.entity(
                    IfcType::IfcSIUnit,
                    &format!(
                        "*,{},$,{}",
                        enumeration(unit.unit_type.as_str()),
                        enumeration(unit.name.as_str())
                    ),
                )
            })
            .collect();
        Some(self.entity(IfcType::IfcUnitAssignment, &format!("({})", refs(&ids))))
    }

    // --- Contexts ---

    fn context_id(&mut self, key: ContextKey) -> Result<u64> {
        if let Some(&id) = self.context_ids.get(&key) {
            return Ok(id);
        }
        let data = self
            .model
            .contexts
            .get(key)
            .ok_or(Error::ContextNotFound(key))?
            .clone();
        let identifier = data.identifier.as_deref().map_or_else(|| "$".to_string(), string);
        let id = match data.kind {
            ContextKind::Root {
                dimension,
                precision,
                world,
            } => {
                let world_id = self.axis2placement3d(&world);
                self.entity(
                    IfcType::IfcGeometricRepresentationContext,
                    &format!(
                        "{},{},{},{},#{},$",
                        identifier,
                        string(&data.context_type),
                        dimension,
                        real(precision),
                        world_id
                    ),
                )
            }
            ContextKind::Sub { parent, projection } => {
                let parent_id = self.context_id(parent)?;
                self.entity(
                    IfcType::IfcGeometricRepresentationSubContext,
                    &format!(
                        "{},{},*,*,*,*,#{},$,{},$",
                        identifier,
                        string(&data.context_type),
                        parent_id,
                        enumeration(projection.as_str())
                    ),
                )
            }
        };
        self.context_ids.insert(key, id);
        Ok(id)
    }

    // --- Shapes ---

    fn swept_solid(&mut self, solid: &SweptSolid) -> u64 {
        let centre = self.point2(&solid.profile.centre);
        let profile_position = self.entity(IfcType::IfcAxis2Placement2D, &format!("#{},$", centre));
        let profile = self.entity(
            IfcType::IfcRectangleProfileDef,
            &format!(
                "{},$,#{},{},{}",
                enumeration(solid.profile.profile_type.as_str()),
                profile_position,
                real(solid.profile.x_dim),
                real(solid.profile.y_dim)
            ),
        );
        let position = self.axis2placement3d(&solid.position);
        let direction = self.direction3(&solid.extrusion_direction);
        self.entity(
            IfcType::IfcExtrudedAreaSolid,
            &format!(
                "#{},#{},#{},{}",
                profile,
                position,
                direction,
                real(solid.depth)
            ),
        )
    }

    fn polyline(&mut self, line: &Polyline2D) -> u64 {
        let points: Vec<u64> = line.points.iter().map(|p| self.point2(p)).collect();
        self.entity(IfcType::IfcPolyline, &format!("({})", refs(&points)))
    }

    fn shape_representation(&mut self, rep: &ShapeRepresentation) -> Result<u64> {
        let context = self.context_id(rep.context)?;
        let item = match &rep.item {
            RepresentationItem::SweptSolid(solid) => self.swept_solid(solid),
            RepresentationItem::Curve(line) => self.polyline(line),
        };
        Ok(self.entity(
            IfcType::IfcShapeRepresentation,
            &format!(
                "#{},{},{},(#{})",
                context,
                string(rep.identifier()),
                string(rep.representation_type()),
                item
            ),
        ))
    }

    fn product_shape(&mut self, shape: &ProductShape) -> Result<u64> {
        let reps = shape
            .representations
            .iter()
            .map(|r| self.shape_representation(r))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.entity(
            IfcType::IfcProductDefinitionShape,
            &format!("$,$,({})", refs(&reps)),
        ))
    }

    // --- Nodes ---

    fn write_node(&mut self, key: NodeKey, units: Option<u64>) -> Result<()> {
        let model = self.model;
        let node = model.nodes.get(key).ok_or(Error::NodeNotFound(key))?;
        let placement = match node.placement {
            Some(p) => format!("#{}", self.placement_id(p)?),
            None => "$".to_string(),
        };
        let representation = match node.shape.as_ref().filter(|s| !s.is_empty()) {
            Some(shape) => format!("#{}", self.product_shape(shape)?),
            None => "$".to_string(),
        };
        let root = format!(
            "{},#{},{},$,$",
            string(&node.global_id),
            self.owner_history,
            string(&node.name)
        );

        let attributes = match &node.kind {
            NodeKind::Project { contexts } => {
                let ids = contexts
                    .iter()
                    .map(|c| self.context_id(*c))
                    .collect::<Result<Vec<_>>>()?;
                let units = units.map_or_else(|| "$".to_string(), |u| format!("#{}", u));
                format!("{},$,$,({}),{}", root, refs(&ids), units)
            }
            NodeKind::Site { composition } => format!(
                "{},{},{},$,{},$,$,$,$,$",
                root,
                placement,
                representation,
                enumeration(composition.as_str())
            ),
            NodeKind::Building { composition } => format!(
                "{},{},{},$,{},$,$,$",
                root,
                placement,
                representation,
                enumeration(composition.as_str())
            ),
            NodeKind::Storey {
                composition,
                elevation,
            } => format!(
                "{},{},{},$,{},{}",
                root,
                placement,
                representation,
                enumeration(composition.as_str()),
                real(*elevation)
            ),
            NodeKind::Wall => format!("{},{},{},$,$", root, placement, representation),
            NodeKind::Slab { predefined } => format!(
                "{},{},{},$,{}",
                root,
                placement,
                representation,
                enumeration(predefined.as_str())
            ),
            NodeKind::Space { composition } => format!(
                "{},{},{},$,{},$,$",
                root,
                placement,
                representation,
                enumeration(composition.as_str())
            ),
        };

        let id = self.entity(node.ifc_type(), &attributes);
        self.node_ids.insert(key, id);
        Ok(())
    }

    fn node_ref(&self, key: NodeKey) -> Result<u64> {
        self.node_ids.get(&key).copied().ok_or(Error::NodeNotFound(key))
    }

    fn write_relationship(&mut self, relationship: &Relationship) -> Result<()> {
        match relationship {
            Relationship::Aggregates {
                global_id,
                relating,
                related,
            } => {
                let relating = self.node_ref(*relating)?;
                let related = related
                    .iter()
                    .map(|k| self.node_ref(*k))
                    .collect::<Result<Vec<_>>>()?;
                self.entity(
                    IfcType::IfcRelAggregates,
                    &format!(
                        "{},#{},$,$,#{},({})",
                        string(global_id),
                        self.owner_history,
                        relating,
                        refs(&related)
                    ),
                );
            }
            Relationship::Contains {
                global_id,
                structure,
                elements,
            } => {
                let structure = self.node_ref(*structure)?;
                let elements = elements
                    .iter()
                    .map(|k| self.node_ref(*k))
                    .collect::<Result<Vec<_>>>()?;
                self.entity(
                    IfcType::IfcRelContainedInSpatialStructure,
                    &format!(
                        "{},#{},$,$,({}),#{}",
                        string(global_id),
                        self.owner_history,
                        refs(&elements),
                        structure
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Serialize a model to a STEP string.
pub fn to_step_string(model: &IfcModel, header: HeaderInfo) -> Result<String> {
    StepWriter::new(model, header).write()
}

/// Serialize a model and write it to `path`.
///
/// Parent directories are created. The content goes to a temporary sibling
/// first and is renamed over the target, so an existing file is either
/// fully replaced or left untouched.
pub fn write_to_path(model: &IfcModel, header: HeaderInfo, path: &Path) -> Result<()> {
    let content = to_step_string(model, header)?;
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = temporary_sibling(path);
    if let Err(source) = fs::write(&tmp, content.as_bytes()) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        io_err(source)
    })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "wrote IFC file");
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.ifc".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

// --- Attribute encoding ---

/// STEP string literal. Quotes and backslashes are doubled, non-ASCII
/// characters use the `\X2\` UTF-16 hex encoding.
pub fn string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                out.push_str("\\X2\\");
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "{:04X}", unit);
                }
                while let Some(&next) = chars.peek() {
                    if next.is_ascii() && !next.is_ascii_control() {
                        break;
                    }
                    chars.next();
                    for unit in next.encode_utf16(&mut buf) {
                        let _ = write!(out, "{:04X}", unit);
                    }
                }
                out.push_str("\\X0\\");
            }
        }
    }
    out.push('\'');
    out
}

/// STEP real literal: always carries a decimal point.
pub fn real(value: f64) -> String {
    // Display never uses exponent notation for f64
    let value = if value == 0.0 { 0.0 } else { value };
    let s = format!("{}", value);
    if s.contains('.') {
        s
    } else {
        format!("{}.", s)
    }
}

fn enumeration(value: &str) -> String {
    format!(".{}.", value)
}

fn refs(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| format!("#{}", id))
        .collect::<Vec<_>>()
        .join(",")
}

/// `YYYY-MM-DDTHH:MM:SS` for a Unix timestamp (UTC). Out of range
/// timestamps fall back to the epoch.
pub fn iso_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_formatting() {
        assert_eq!(real(0.0), "0.");
        assert_eq!(real(-0.0), "0.");
        assert_eq!(real(1.0), "1.");
        assert_eq!(real(2.5), "2.5");
        assert_eq!(real(-3.0), "-3.");
        assert_eq!(real(1e-5), "0.00001");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(string("Wall_0_1"), "'Wall_0_1'");
        assert_eq!(string("it's"), "'it''s'");
        assert_eq!(string("a\\b"), "'a\\\\b'");
        assert_eq!(string("Küche"), "'K\\X2\\00FC\\X0\\che'");
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(0), "1970-01-01T00:00:00");
        assert_eq!(iso_timestamp(951_782_400), "2000-02-29T00:00:00");
        assert_eq!(iso_timestamp(1_700_000_000), "2023-11-14T22:13:20");
        assert_eq!(iso_timestamp(i64::MAX), "1970-01-01T00:00:00");
    }

    #[test]
    fn test_header_uses_current_time_by_default() {
        let before = unix_now();
        let header = HeaderInfo::default();
        assert!(header.timestamp >= before);
        assert!(header.timestamp - before < 60);
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let model = IfcModel::new();
        assert!(matches!(
            to_step_string(&model, HeaderInfo::default()),
            Err(Error::MissingProject)
        ));
    }
}
