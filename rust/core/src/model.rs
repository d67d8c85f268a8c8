// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for a generated IFC model.
//!
//! The [`IfcModel`] is the single owner of every placement, representation
//! context and rooted entity. Entities refer to each other through slotmap
//! keys and relationships are stored as key lists, so the graph can be
//! walked in insertion order by the writer without reference cycles.
//!
//! Insertion enforces dependency order: a placement's parent, a node's
//! placement and a representation's context must already exist when the
//! referencing item is added.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};
use crate::geometry::{Axis2Placement3D, ProductShape};
use crate::guid::new_global_id;
use crate::keys::{ContextKey, NodeKey, PlacementKey};
use crate::schema::{ElementComposition, GeometricProjection, IfcType, SlabType};
use crate::units::UnitAssignment;

/// IfcLocalPlacement: a frame relative to an optional parent placement
#[derive(Debug, Clone)]
pub struct PlacementData {
    pub parent: Option<PlacementKey>,
    pub axes: Axis2Placement3D,
}

/// Root context or subcontext data
#[derive(Debug, Clone)]
pub enum ContextKind {
    /// IfcGeometricRepresentationContext
    Root {
        dimension: u8,
        precision: f64,
        world: Axis2Placement3D,
    },
    /// IfcGeometricRepresentationSubContext
    Sub {
        parent: ContextKey,
        projection: GeometricProjection,
    },
}

/// A geometric representation context
#[derive(Debug, Clone)]
pub struct ContextData {
    pub identifier: Option<String>,
    pub context_type: String,
    pub kind: ContextKind,
}

/// Type-specific attributes of a rooted entity
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Project { contexts: Vec<ContextKey> },
    Site { composition: ElementComposition },
    Building { composition: ElementComposition },
    Storey { composition: ElementComposition, elevation: f64 },
    Wall,
    Slab { predefined: SlabType },
    Space { composition: ElementComposition },
}

impl NodeKind {
    pub fn ifc_type(&self) -> IfcType {
        match self {
            NodeKind::Project { .. } => IfcType::IfcProject,
            NodeKind::Site { .. } => IfcType::IfcSite,
            NodeKind::Building { .. } => IfcType::IfcBuilding,
            NodeKind::Storey { .. } => IfcType::IfcBuildingStorey,
            NodeKind::Wall => IfcType::IfcWallStandardCase,
            NodeKind::Slab { .. } => IfcType::IfcSlab,
            NodeKind::Space { .. } => IfcType::IfcSpace,
        }
    }
}

/// A rooted entity: project, spatial structure element or building element
#[derive(Debug, Clone)]
pub struct NodeData {
    pub global_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub placement: Option<PlacementKey>,
    pub shape: Option<ProductShape>,
}

impl NodeData {
    pub fn ifc_type(&self) -> IfcType {
        self.kind.ifc_type()
    }
}

/// Objectified relationships between nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Relationship {
    /// IfcRelAggregates: `related` are parts of `relating`
    Aggregates {
        global_id: String,
        relating: NodeKey,
        related: SmallVec<[NodeKey; 1]>,
    },
    /// IfcRelContainedInSpatialStructure: `elements` reside in `structure`
    Contains {
        global_id: String,
        structure: NodeKey,
        elements: Vec<NodeKey>,
    },
}

impl Relationship {
    pub fn ifc_type(&self) -> IfcType {
        match self {
            Relationship::Aggregates { .. } => IfcType::IfcRelAggregates,
            Relationship::Contains { .. } => IfcType::IfcRelContainedInSpatialStructure,
        }
    }
}

/// Authoring information written into the owner history
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerInfo {
    pub person: String,
    pub organization: String,
    pub application_name: String,
    pub application_id: String,
    pub application_version: String,
    /// Seconds since the Unix epoch
    pub creation_date: i64,
}

impl Default for OwnerInfo {
    fn default() -> Self {
        Self {
            person: "Unknown".to_string(),
            organization: "Unknown".to_string(),
            application_name: "FloorplanToIFC".to_string(),
            application_id: "FloorplanToIFC".to_string(),
            application_version: "1.0".to_string(),
            creation_date: 0,
        }
    }
}

/// The central arena that owns the whole model.
///
/// # Example
///
/// ```
/// use floorplan_ifc_core::{Axis2Placement3D, IfcModel, NodeKind};
///
/// let mut model = IfcModel::new();
/// let project = model.add_node("Project", NodeKind::Project { contexts: vec![] }, None).unwrap();
/// let global = model.add_global_placement();
/// let site_placement = model.add_placement(Some(global), Axis2Placement3D::identity()).unwrap();
/// let site = model
///     .add_node("Site", NodeKind::Site { composition: Default::default() }, Some(site_placement))
///     .unwrap();
/// model.aggregate(project, site).unwrap();
///
/// assert_eq!(model.node_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IfcModel {
    pub(crate) placements: SlotMap<PlacementKey, PlacementData>,
    pub(crate) contexts: SlotMap<ContextKey, ContextData>,
    pub(crate) nodes: SlotMap<NodeKey, NodeData>,

    // Insertion order, which is dependency order
    pub(crate) placement_order: Vec<PlacementKey>,
    pub(crate) context_order: Vec<ContextKey>,
    pub(crate) node_order: Vec<NodeKey>,

    pub(crate) relationships: Vec<Relationship>,
    pub(crate) units: Option<UnitAssignment>,
    pub(crate) owner: OwnerInfo,
    pub(crate) project: Option<NodeKey>,
}

impl IfcModel {
    /// Creates a new, empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Ownership ---

    pub fn set_owner(&mut self, owner: OwnerInfo) {
        self.owner = owner;
    }

    pub fn owner(&self) -> &OwnerInfo {
        &self.owner
    }

    // --- Placement operations ---

    /// Adds the root placement every other placement chain starts from.
    pub fn add_global_placement(&mut self) -> PlacementKey {
        let key = self.placements.insert(PlacementData {
            parent: None,
            axes: Axis2Placement3D::identity(),
        });
        self.placement_order.push(key);
        key
    }

    /// Adds a placement relative to `parent` (or to the world when `None`).
    pub fn add_placement(
        &mut self,
        parent: Option<PlacementKey>,
        axes: Axis2Placement3D,
    ) -> Result<PlacementKey> {
        if let Some(p) = parent {
            if !self.placements.contains_key(p) {
                return Err(Error::PlacementNotFound(p));
            }
        }
        axes.validate()?;
        let key = self.placements.insert(PlacementData { parent, axes });
        self.placement_order.push(key);
        Ok(key)
    }

    /// Returns the placement data for the given key, or `None` if not found.
    pub fn placement(&self, key: PlacementKey) -> Option<&PlacementData> {
        self.placements.get(key)
    }

    /// Number of placement hops from `key` up to a root placement.
    pub fn placement_depth(&self, key: PlacementKey) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.placements.get(key)?;
        while let Some(parent) = current.parent {
            current = self.placements.get(parent)?;
            depth += 1;
        }
        Some(depth)
    }

    // --- Context operations ---

    /// Adds a root geometric representation context.
    pub fn add_context(
        &mut self,
        context_type: &str,
        dimension: u8,
        precision: f64,
        world: Axis2Placement3D,
    ) -> Result<ContextKey> {
        world.validate()?;
        let key = self.contexts.insert(ContextData {
            identifier: None,
            context_type: context_type.to_string(),
            kind: ContextKind::Root {
                dimension,
                precision,
                world,
            },
        });
        self.context_order.push(key);
        Ok(key)
    }

    /// Adds a named subcontext of an existing context.
    pub fn add_subcontext(
        &mut self,
        parent: ContextKey,
        identifier: &str,
        projection: GeometricProjection,
    ) -> Result<ContextKey> {
        let context_type = self
            .contexts
            .get(parent)
            .ok_or(Error::ContextNotFound(parent))?
            .context_type
            .clone();
        let key = self.contexts.insert(ContextData {
            identifier: Some(identifier.to_string()),
            context_type,
            kind: ContextKind::Sub { parent, projection },
        });
        self.context_order.push(key);
        Ok(key)
    }

    pub fn context(&self, key: ContextKey) -> Option<&ContextData> {
        self.contexts.get(key)
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    // --- Node operations ---

    /// Adds a rooted entity with a fresh GlobalId.
    ///
    /// The project must come first and carries no placement; every other
    /// node needs an existing placement.
    pub fn add_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        placement: Option<PlacementKey>,
    ) -> Result<NodeKey> {
        let ifc_type = kind.ifc_type();
        match (&kind, placement) {
            (NodeKind::Project { contexts }, None) => {
                if self.project.is_some() {
                    return Err(Error::InvalidModel(
                        "model already has an IfcProject".to_string(),
                    ));
                }
                if let Some(missing) = contexts.iter().find(|c| !self.contexts.contains_key(**c)) {
                    return Err(Error::ContextNotFound(*missing));
                }
            }
            (NodeKind::Project { .. }, Some(_)) => {
                return Err(Error::InvalidModel(
                    "IfcProject cannot have an object placement".to_string(),
                ));
            }
            (_, None) => {
                return Err(Error::InvalidModel(format!(
                    "{} requires an object placement",
                    ifc_type
                )));
            }
            (_, Some(p)) => {
                if self.project.is_none() {
                    return Err(Error::MissingProject);
                }
                if !self.placements.contains_key(p) {
                    return Err(Error::PlacementNotFound(p));
                }
            }
        }

        let key = self.nodes.insert(NodeData {
            global_id: new_global_id(),
            name: name.to_string(),
            kind,
            placement,
            shape: None,
        });
        if ifc_type == IfcType::IfcProject {
            self.project = Some(key);
        }
        self.node_order.push(key);
        Ok(key)
    }

    /// Attaches a product shape to a building element.
    pub fn set_representation(&mut self, node: NodeKey, shape: ProductShape) -> Result<()> {
        if let Some(missing) = shape
            .representations
            .iter()
            .map(|r| r.context)
            .find(|c| !self.contexts.contains_key(*c))
        {
            return Err(Error::ContextNotFound(missing));
        }
        let data = self.nodes.get_mut(node).ok_or(Error::NodeNotFound(node))?;
        if !data.ifc_type().is_element() {
            return Err(Error::InvalidModel(format!(
                "{} cannot carry a body representation",
                data.ifc_type()
            )));
        }
        data.shape = Some(shape);
        Ok(())
    }

    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn project(&self) -> Option<NodeKey> {
        self.project
    }

    /// Nodes of one type, in insertion order.
    pub fn nodes_of_type(&self, ifc_type: IfcType) -> Vec<NodeKey> {
        self.node_order
            .iter()
            .copied()
            .filter(|k| self.nodes[*k].ifc_type() == ifc_type)
            .collect()
    }

    /// The parent placement of a node's own placement.
    pub fn placement_parent_of(&self, node: NodeKey) -> Option<PlacementKey> {
        let placement = self.nodes.get(node)?.placement?;
        self.placements.get(placement)?.parent
    }

    // --- Relationship operations ---

    /// Records that `child` is a part of `parent` in the spatial tree.
    ///
    /// The child's placement must be relative to the parent's placement, or
    /// to a root placement when the parent is the project.
    pub fn aggregate(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_data = self.nodes.get(parent).ok_or(Error::NodeNotFound(parent))?;
        let child_data = self.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
        let (parent_type, child_type) = (parent_data.ifc_type(), child_data.ifc_type());

        if !child_type.is_spatial() || child_type.structural_parent() != Some(parent_type) {
            return Err(Error::InvalidParent {
                parent: parent_type,
                child: child_type,
            });
        }
        self.check_placement_parent(parent, child)?;

        if self.aggregating_parent(child).is_some() {
            return Err(Error::InvalidModel(format!(
                "{} is already aggregated",
                child_type
            )));
        }

        self.relationships.push(Relationship::Aggregates {
            global_id: new_global_id(),
            relating: parent,
            related: smallvec![child],
        });
        Ok(())
    }

    /// Links a set of building elements to the spatial structure they are in.
    pub fn contain(&mut self, structure: NodeKey, elements: &[NodeKey]) -> Result<()> {
        if elements.is_empty() {
            return Err(Error::EmptyRelationship(
                IfcType::IfcRelContainedInSpatialStructure,
            ));
        }
        let structure_type = self
            .nodes
            .get(structure)
            .ok_or(Error::NodeNotFound(structure))?
            .ifc_type();

        let mut seen = FxHashSet::default();
        for &element in elements {
            let element_type = self
                .nodes
                .get(element)
                .ok_or(Error::NodeNotFound(element))?
                .ifc_type();
            if element_type.structural_parent() != Some(structure_type) || !element_type.is_element()
            {
                return Err(Error::InvalidParent {
                    parent: structure_type,
                    child: element_type,
                });
            }
            self.check_placement_parent(structure, element)?;
            if !seen.insert(element) || self.containing_structure(element).is_some() {
                return Err(Error::InvalidModel(format!(
                    "{} is contained more than once",
                    element_type
                )));
            }
        }

        self.relationships.push(Relationship::Contains {
            global_id: new_global_id(),
            structure,
            elements: elements.to_vec(),
        });
        Ok(())
    }

    fn check_placement_parent(&self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_placement = self.nodes[parent].placement;
        let child_parent = self.placement_parent_of(child);
        let ok = match parent_placement {
            Some(pp) => child_parent == Some(pp),
            // Children of the project hang off a root placement
            None => child_parent.map_or(false, |cp| self.placements[cp].parent.is_none()),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidModel(format!(
                "{} placement is not relative to its {} placement",
                self.nodes[child].ifc_type(),
                self.nodes[parent].ifc_type()
            )))
        }
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationship_count(&self, ifc_type: IfcType) -> usize {
        self.relationships
            .iter()
            .filter(|r| r.ifc_type() == ifc_type)
            .count()
    }

    /// The node `child` is aggregated under, if any.
    pub fn aggregating_parent(&self, child: NodeKey) -> Option<NodeKey> {
        self.relationships.iter().find_map(|r| match r {
            Relationship::Aggregates {
                relating, related, ..
            } if related.contains(&child) => Some(*relating),
            _ => None,
        })
    }

    /// The spatial structure `element` is contained in, if any.
    pub fn containing_structure(&self, element: NodeKey) -> Option<NodeKey> {
        self.relationships.iter().find_map(|r| match r {
            Relationship::Contains {
                structure,
                elements,
                ..
            } if elements.contains(&element) => Some(*structure),
            _ => None,
        })
    }

    // --- Units ---

    /// Binds the unit assignment to the project. Only allowed once.
    pub fn assign_units(&mut self, units: UnitAssignment) -> Result<()> {
        if self.project.is_none() {
            return Err(Error::MissingProject);
        }
        if self.units.is_some() {
            return Err(Error::UnitsAlreadyAssigned);
        }
        self.units = Some(units);
        Ok(())
    }

    pub fn units(&self) -> Option<&UnitAssignment> {
        self.units.as_ref()
    }

    // --- Validation ---

    /// Checks the structural invariants a viewer relies on:
    /// one project with units, every spatial node aggregated exactly once
    /// under the right parent, every element contained exactly once with its
    /// placement relative to the storey, and every representation context
    /// declared on the project.
    pub fn validate(&self) -> Result<()> {
        let project = self.project.ok_or(Error::MissingProject)?;
        if self.units.is_none() {
            return Err(Error::InvalidModel("project has no units".to_string()));
        }

        let declared: FxHashSet<ContextKey> = match &self.nodes[project].kind {
            NodeKind::Project { contexts } => contexts.iter().copied().collect(),
            _ => FxHashSet::default(),
        };

        for &key in &self.node_order {
            let node = &self.nodes[key];
            let ifc_type = node.ifc_type();

            if ifc_type.is_spatial() && ifc_type != IfcType::IfcProject {
                let count = self
                    .relationships
                    .iter()
                    .filter(|r| matches!(r, Relationship::Aggregates { related, .. } if related.contains(&key)))
                    .count();
                if count != 1 {
                    return Err(Error::InvalidModel(format!(
                        "{} '{}' is aggregated {} times",
                        ifc_type, node.name, count
                    )));
                }
            }

            if ifc_type.is_element() {
                let structures: Vec<NodeKey> = self
                    .relationships
                    .iter()
                    .filter_map(|r| match r {
                        Relationship::Contains {
                            structure,
                            elements,
                            ..
                        } if elements.contains(&key) => Some(*structure),
                        _ => None,
                    })
                    .collect();
                if structures.len() != 1 {
                    return Err(Error::InvalidModel(format!(
                        "{} '{}' is contained {} times",
                        ifc_type,
                        node.name,
                        structures.len()
                    )));
                }
                self.check_placement_parent(structures[0], key)?;
            }

            if let Some(shape) = &node.shape {
                if let Some(r) = shape
                    .representations
                    .iter()
                    .find(|r| !self.context_is_declared(r.context, &declared))
                {
                    return Err(Error::InvalidModel(format!(
                        "{} '{}' uses undeclared context {:?}",
                        ifc_type, node.name, r.context
                    )));
                }
            }
        }
        Ok(())
    }

    fn context_is_declared(&self, key: ContextKey, declared: &FxHashSet<ContextKey>) -> bool {
        if declared.contains(&key) {
            return true;
        }
        match self.contexts.get(key).map(|c| &c.kind) {
            Some(ContextKind::Sub { parent, .. }) => declared.contains(parent),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Profile2D, ShapeRepresentation, SweptSolid};
    use nalgebra::Vector3;

    struct Fixture {
        model: IfcModel,
        body: ContextKey,
        project: NodeKey,
        site: NodeKey,
        storey: NodeKey,
        storey_placement: PlacementKey,
    }

    fn fixture() -> Fixture {
        let mut model = IfcModel::new();
        let ctx = model
            .add_context("Model", 3, 1e-5, Axis2Placement3D::identity())
            .unwrap();
        let body = model
            .add_subcontext(ctx, "Body", GeometricProjection::ModelView)
            .unwrap();
        let project = model
            .add_node("P", NodeKind::Project { contexts: vec![ctx, body] }, None)
            .unwrap();
        let global = model.add_global_placement();
        let site_pl = model
            .add_placement(Some(global), Axis2Placement3D::identity())
            .unwrap();
        let site = model
            .add_node("S", NodeKind::Site { composition: ElementComposition::Element }, Some(site_pl))
            .unwrap();
        model.aggregate(project, site).unwrap();
        let building_pl = model
            .add_placement(Some(site_pl), Axis2Placement3D::identity())
            .unwrap();
        let building = model
            .add_node(
                "B",
                NodeKind::Building { composition: ElementComposition::Element },
                Some(building_pl),
            )
            .unwrap();
        model.aggregate(site, building).unwrap();
        let storey_pl = model
            .add_placement(Some(building_pl), Axis2Placement3D::identity())
            .unwrap();
        let storey = model
            .add_node(
                "G",
                NodeKind::Storey {
                    composition: ElementComposition::Element,
                    elevation: 0.0,
                },
                Some(storey_pl),
            )
            .unwrap();
        model.aggregate(building, storey).unwrap();
        model.assign_units(UnitAssignment::metric()).unwrap();
        Fixture {
            model,
            body,
            project,
            site,
            storey,
            storey_placement: storey_pl,
        }
    }

    fn add_wall(f: &mut Fixture, parent: PlacementKey) -> NodeKey {
        let pl = f
            .model
            .add_placement(Some(parent), Axis2Placement3D::identity())
            .unwrap();
        let wall = f.model.add_node("W", NodeKind::Wall, Some(pl)).unwrap();
        let solid = SweptSolid::new(
            Profile2D::rectangle(2.0, 0.3),
            Axis2Placement3D::identity(),
            Vector3::z(),
            2.5,
        )
        .unwrap();
        f.model
            .set_representation(wall, ProductShape::new(vec![ShapeRepresentation::body(f.body, solid)]))
            .unwrap();
        wall
    }

    #[test]
    fn test_hierarchy_validates_without_elements() {
        let f = fixture();
        assert!(f.model.validate().is_ok());
        assert_eq!(f.model.relationship_count(IfcType::IfcRelAggregates), 3);
        assert_eq!(
            f.model
                .relationship_count(IfcType::IfcRelContainedInSpatialStructure),
            0
        );
        assert_eq!(f.model.aggregating_parent(f.site), Some(f.project));
    }

    #[test]
    fn test_contained_wall_validates() {
        let mut f = fixture();
        let placement = f.storey_placement;
        let wall = add_wall(&mut f, placement);
        f.model.contain(f.storey, &[wall]).unwrap();
        assert!(f.model.validate().is_ok());
        assert_eq!(f.model.containing_structure(wall), Some(f.storey));
        assert_eq!(f.model.placement_parent_of(wall), Some(f.storey_placement));
    }

    #[test]
    fn test_uncontained_wall_fails_validation() {
        let mut f = fixture();
        let placement = f.storey_placement;
        add_wall(&mut f, placement);
        assert!(matches!(f.model.validate(), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_wall_placed_on_site_cannot_be_contained_in_storey() {
        let mut f = fixture();
        let site_placement = f.model.node(f.site).unwrap().placement.unwrap();
        let wall = add_wall(&mut f, site_placement);
        assert!(f.model.contain(f.storey, &[wall]).is_err());
    }

    #[test]
    fn test_empty_containment_rejected() {
        let mut f = fixture();
        assert!(matches!(
            f.model.contain(f.storey, &[]),
            Err(Error::EmptyRelationship(_))
        ));
    }

    #[test]
    fn test_double_containment_rejected() {
        let mut f = fixture();
        let placement = f.storey_placement;
        let wall = add_wall(&mut f, placement);
        f.model.contain(f.storey, &[wall]).unwrap();
        assert!(f.model.contain(f.storey, &[wall]).is_err());
    }

    #[test]
    fn test_units_assigned_once() {
        let mut f = fixture();
        assert!(matches!(
            f.model.assign_units(UnitAssignment::metric()),
            Err(Error::UnitsAlreadyAssigned)
        ));
    }

    #[test]
    fn test_wrong_aggregation_parent_rejected() {
        let mut f = fixture();
        let pl = f
            .model
            .add_placement(Some(f.storey_placement), Axis2Placement3D::identity())
            .unwrap();
        let building = f
            .model
            .add_node(
                "B2",
                NodeKind::Building { composition: ElementComposition::Element },
                Some(pl),
            )
            .unwrap();
        assert!(matches!(
            f.model.aggregate(f.project, building),
            Err(Error::InvalidParent { .. })
        ));
    }

    #[test]
    fn test_placement_depth() {
        let f = fixture();
        assert_eq!(f.model.placement_depth(f.storey_placement), Some(3));
    }

    #[test]
    fn test_nodes_require_project_first() {
        let mut model = IfcModel::new();
        let global = model.add_global_placement();
        let result = model.add_node("W", NodeKind::Wall, Some(global));
        assert!(matches!(result, Err(Error::MissingProject)));
    }

    #[test]
    fn test_project_rejects_placement() {
        let mut model = IfcModel::new();
        let global = model.add_global_placement();
        let result = model.add_node("P", NodeKind::Project { contexts: vec![] }, Some(global));
        assert!(result.is_err());
    }
}
