// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for building and writing IFC models.

use std::path::PathBuf;

use crate::keys::{ContextKey, NodeKey, PlacementKey};
use crate::schema::IfcType;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or serializing a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced placement does not exist in the model.
    #[error("placement not found: {0:?}")]
    PlacementNotFound(PlacementKey),

    /// A referenced node does not exist in the model.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// A referenced representation context does not exist in the model.
    #[error("representation context not found: {0:?}")]
    ContextNotFound(ContextKey),

    /// A node was attached below a parent its type cannot live under.
    #[error("{child:?} cannot be placed under {parent:?}")]
    InvalidParent { parent: IfcType, child: IfcType },

    /// A relationship was requested with no related objects.
    #[error("{0:?} requires at least one related object")]
    EmptyRelationship(IfcType),

    /// The project already carries a unit assignment.
    #[error("units are already assigned to the project")]
    UnitsAlreadyAssigned,

    /// The model has no project node.
    #[error("model has no IfcProject")]
    MissingProject,

    /// Geometry that cannot be represented (non-finite or non-positive).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A structural invariant of the model does not hold.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Writing the serialized model failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
