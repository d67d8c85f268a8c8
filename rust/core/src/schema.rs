// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! The subset of IFC4 entity and enumeration types a generated floor plan
//! model is written with.

use std::fmt;

/// IFC Entity Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfcType {
    // Spatial structure
    IfcProject,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,

    // Building elements
    IfcWallStandardCase,
    IfcSlab,

    // Relationships
    IfcRelAggregates,
    IfcRelContainedInSpatialStructure,

    // Geometry
    IfcCartesianPoint,
    IfcDirection,
    IfcAxis2Placement2D,
    IfcAxis2Placement3D,
    IfcLocalPlacement,
    IfcRectangleProfileDef,
    IfcExtrudedAreaSolid,
    IfcPolyline,
    IfcShapeRepresentation,
    IfcProductDefinitionShape,

    // Contexts
    IfcGeometricRepresentationContext,
    IfcGeometricRepresentationSubContext,

    // Units
    IfcSIUnit,
    IfcUnitAssignment,

    // Ownership
    IfcPerson,
    IfcOrganization,
    IfcPersonAndOrganization,
    IfcApplication,
    IfcOwnerHistory,
}

impl IfcType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfcProject => "IFCPROJECT",
            Self::IfcSite => "IFCSITE",
            Self::IfcBuilding => "IFCBUILDING",
            Self::IfcBuildingStorey => "IFCBUILDINGSTOREY",
            Self::IfcSpace => "IFCSPACE",

            Self::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            Self::IfcSlab => "IFCSLAB",

            Self::IfcRelAggregates => "IFCRELAGGREGATES",
            Self::IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",

            Self::IfcCartesianPoint => "IFCCARTESIANPOINT",
            Self::IfcDirection => "IFCDIRECTION",
            Self::IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
            Self::IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
            Self::IfcLocalPlacement => "IFCLOCALPLACEMENT",
            Self::IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
            Self::IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
            Self::IfcPolyline => "IFCPOLYLINE",
            Self::IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
            Self::IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",

            Self::IfcGeometricRepresentationContext => "IFCGEOMETRICREPRESENTATIONCONTEXT",
            Self::IfcGeometricRepresentationSubContext => "IFCGEOMETRICREPRESENTATIONSUBCONTEXT",

            Self::IfcSIUnit => "IFCSIUNIT",
            Self::IfcUnitAssignment => "IFCUNITASSIGNMENT",

            Self::IfcPerson => "IFCPERSON",
            Self::IfcOrganization => "IFCORGANIZATION",
            Self::IfcPersonAndOrganization => "IFCPERSONANDORGANIZATION",
            Self::IfcApplication => "IFCAPPLICATION",
            Self::IfcOwnerHistory => "IFCOWNERHISTORY",
        }
    }

    /// Check if this is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            Self::IfcProject | Self::IfcSite | Self::IfcBuilding | Self::IfcBuildingStorey
        )
    }

    /// Check if this type can be contained in a storey
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            Self::IfcWallStandardCase | Self::IfcSlab | Self::IfcSpace
        )
    }

    /// The spatial type a node of this type must be aggregated under.
    ///
    /// Elements return the storey they are contained in; the project has no
    /// parent.
    pub fn structural_parent(&self) -> Option<IfcType> {
        match self {
            Self::IfcSite => Some(Self::IfcProject),
            Self::IfcBuilding => Some(Self::IfcSite),
            Self::IfcBuildingStorey => Some(Self::IfcBuilding),
            Self::IfcWallStandardCase | Self::IfcSlab | Self::IfcSpace => {
                Some(Self::IfcBuildingStorey)
            }
            _ => None,
        }
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// IfcElementCompositionEnum (generated models are never decomposed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementComposition {
    #[default]
    Element,
}

impl ElementComposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "ELEMENT",
        }
    }
}

/// IfcSlabTypeEnum (the value a generated floor plan uses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlabType {
    #[default]
    Floor,
}

impl SlabType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Floor => "FLOOR",
        }
    }
}

/// IfcGeometricProjectionEnum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometricProjection {
    ModelView,
    GraphView,
}

impl GeometricProjection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelView => "MODEL_VIEW",
            Self::GraphView => "GRAPH_VIEW",
        }
    }
}

/// IfcProfileTypeEnum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileType {
    #[default]
    Area,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Area => "AREA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(IfcType::IfcWallStandardCase.as_str(), "IFCWALLSTANDARDCASE");
        assert_eq!(
            IfcType::IfcGeometricRepresentationSubContext.to_string(),
            "IFCGEOMETRICREPRESENTATIONSUBCONTEXT"
        );
        assert_eq!(SlabType::default().as_str(), "FLOOR");
        assert_eq!(GeometricProjection::GraphView.as_str(), "GRAPH_VIEW");
    }

    #[test]
    fn test_structural_parents() {
        assert_eq!(IfcType::IfcProject.structural_parent(), None);
        assert_eq!(
            IfcType::IfcSite.structural_parent(),
            Some(IfcType::IfcProject)
        );
        assert_eq!(
            IfcType::IfcSpace.structural_parent(),
            Some(IfcType::IfcBuildingStorey)
        );
        assert!(IfcType::IfcSlab.is_element());
        assert!(!IfcType::IfcSite.is_element());
    }
}
