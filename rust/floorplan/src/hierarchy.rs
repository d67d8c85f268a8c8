// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial hierarchy: project, site, building and storey
//!
//! Built once per document in strict order. Each level's placement is
//! relative to its parent's placement and each parent/child pair is
//! aggregated as soon as the child exists.

use floorplan_ifc_core::{
    Axis2Placement3D, ContextKey, ElementComposition, GeometricProjection, IfcModel, NodeKey,
    NodeKind, PlacementKey,
};

use crate::config::BuildOptions;
use crate::error::Result;

/// Precision of the model context
pub const MODEL_PRECISION: f64 = 1e-5;

/// The representation contexts declared on the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contexts {
    pub model: ContextKey,
    /// Solid bodies
    pub body: ContextKey,
    /// Wall axis curves
    pub axis: ContextKey,
}

impl Contexts {
    fn declare(model: &mut IfcModel) -> Result<Self> {
        let root = model.add_context("Model", 3, MODEL_PRECISION, Axis2Placement3D::identity())?;
        let body = model.add_subcontext(root, "Body", GeometricProjection::ModelView)?;
        let axis = model.add_subcontext(root, "Axis", GeometricProjection::GraphView)?;
        Ok(Self {
            model: root,
            body,
            axis,
        })
    }

    pub fn all(&self) -> Vec<ContextKey> {
        vec![self.model, self.body, self.axis]
    }
}

/// Handles to the four spatial levels and their placements
#[derive(Debug, Clone, Copy)]
pub struct SpatialHierarchy {
    pub contexts: Contexts,
    pub global_placement: PlacementKey,
    pub project: NodeKey,
    pub site: NodeKey,
    pub site_placement: PlacementKey,
    pub building: NodeKey,
    pub building_placement: PlacementKey,
    pub storey: NodeKey,
    /// Every building element is placed relative to this
    pub storey_placement: PlacementKey,
}

impl SpatialHierarchy {
    /// Declare contexts and create project, site, building and storey with
    /// their three aggregation relationships.
    pub fn build(model: &mut IfcModel, options: &BuildOptions) -> Result<Self> {
        let contexts = Contexts::declare(model)?;
        let project = model.add_node(
            &options.project_name,
            NodeKind::Project {
                contexts: contexts.all(),
            },
            None,
        )?;

        let global_placement = model.add_global_placement();

        let site_placement = model.add_placement(Some(global_placement), Axis2Placement3D::identity())?;
        let site = model.add_node(
            &options.site_name,
            NodeKind::Site {
                composition: ElementComposition::Element,
            },
            Some(site_placement),
        )?;
        model.aggregate(project, site)?;

        let building_placement =
            model.add_placement(Some(site_placement), Axis2Placement3D::identity())?;
        let building = model.add_node(
            &options.building_name,
            NodeKind::Building {
                composition: ElementComposition::Element,
            },
            Some(building_placement),
        )?;
        model.aggregate(site, building)?;

        // Element coordinates are absolute, so the elevation is recorded on
        // the storey only and its placement stays at the building origin
        let storey_placement =
            model.add_placement(Some(building_placement), Axis2Placement3D::identity())?;
        let storey = model.add_node(
            &options.storey_name,
            NodeKind::Storey {
                composition: ElementComposition::Element,
                elevation: options.storey_elevation,
            },
            Some(storey_placement),
        )?;
        model.aggregate(building, storey)?;

        tracing::debug!(
            project = %options.project_name,
            storey = %options.storey_name,
            "built spatial hierarchy"
        );

        Ok(Self {
            contexts,
            global_placement,
            project,
            site,
            site_placement,
            building,
            building_placement,
            storey,
            storey_placement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_ifc_core::IfcType;

    #[test]
    fn test_hierarchy_chain() {
        let mut model = IfcModel::new();
        let h = SpatialHierarchy::build(&mut model, &BuildOptions::default()).unwrap();

        assert_eq!(model.relationship_count(IfcType::IfcRelAggregates), 3);
        assert_eq!(model.aggregating_parent(h.site), Some(h.project));
        assert_eq!(model.aggregating_parent(h.building), Some(h.site));
        assert_eq!(model.aggregating_parent(h.storey), Some(h.building));

        assert_eq!(model.placement_parent_of(h.site), Some(h.global_placement));
        assert_eq!(model.placement_parent_of(h.building), Some(h.site_placement));
        assert_eq!(model.placement_parent_of(h.storey), Some(h.building_placement));
        assert_eq!(model.placement_depth(h.storey_placement), Some(3));
    }

    #[test]
    fn test_names_and_contexts() {
        let mut model = IfcModel::new();
        let h = SpatialHierarchy::build(&mut model, &BuildOptions::default()).unwrap();

        let project = model.node(h.project).unwrap();
        assert_eq!(project.name, "Floorplan Project");
        match &project.kind {
            NodeKind::Project { contexts } => assert_eq!(contexts.len(), 3),
            other => panic!("unexpected project kind {:?}", other),
        }
        assert_eq!(model.node(h.storey).unwrap().name, "Ground Floor");
        assert_eq!(
            model.context(h.contexts.axis).unwrap().identifier.as_deref(),
            Some("Axis")
        );
        assert_eq!(model.context_count(), 3);
    }

    #[test]
    fn test_elevation_does_not_move_storey_placement() {
        let options = BuildOptions {
            storey_elevation: 3.5,
            ..BuildOptions::default()
        };
        let mut model = IfcModel::new();
        let h = SpatialHierarchy::build(&mut model, &options).unwrap();

        match model.node(h.storey).unwrap().kind {
            NodeKind::Storey { elevation, .. } => assert_eq!(elevation, 3.5),
            ref other => panic!("unexpected storey kind {:?}", other),
        }
        let placement = model.placement(h.storey_placement).unwrap();
        assert_eq!(placement.axes, Axis2Placement3D::identity());
    }
}
