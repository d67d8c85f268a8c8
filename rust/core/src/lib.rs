// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorplan IFC Core
//!
//! In-memory IFC entity graph and STEP writer for generated building models.
//!
//! ## Overview
//!
//! - **Arena model**: placements, representation contexts and rooted
//!   entities live in [slotmap](https://docs.rs/slotmap) arenas and refer to
//!   each other by key
//! - **Checked relationships**: aggregation and containment enforce the
//!   project / site / building / storey chain and placement parentage
//! - **STEP output**: entities are numbered in emission order so every
//!   reference points backwards
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use floorplan_ifc_core::{IfcModel, NodeKind, Axis2Placement3D, HeaderInfo, to_step_string};
//!
//! let mut model = IfcModel::new();
//! let project = model.add_node("Project", NodeKind::Project { contexts: vec![] }, None)?;
//! let global = model.add_global_placement();
//! let site_pl = model.add_placement(Some(global), Axis2Placement3D::identity())?;
//! let site = model.add_node("Site", NodeKind::Site { composition: Default::default() }, Some(site_pl))?;
//! model.aggregate(project, site)?;
//! let step = to_step_string(&model, HeaderInfo::default())?;
//! ```

pub mod error;
pub mod geometry;
pub mod guid;
pub mod keys;
pub mod model;
pub mod scan;
pub mod schema;
pub mod units;
pub mod writer;

pub use error::{Error, Result};
pub use geometry::{
    Axis2Placement3D, Polyline2D, ProductShape, Profile2D, RepresentationItem,
    ShapeRepresentation, SweptSolid,
};
pub use guid::{compress_uuid, new_global_id, GLOBAL_ID_LEN};
pub use keys::{ContextKey, NodeKey, PlacementKey};
pub use model::{
    ContextData, ContextKind, IfcModel, NodeData, NodeKind, OwnerInfo, PlacementData,
    Relationship,
};
pub use scan::{EntityScanner, ScannedEntity};
pub use schema::{ElementComposition, GeometricProjection, IfcType, ProfileType, SlabType};
pub use units::{SiUnit, SiUnitName, UnitAssignment, UnitType};
pub use writer::{to_step_string, write_to_path, HeaderInfo, StepWriter, SCHEMA_IDENTIFIER};
