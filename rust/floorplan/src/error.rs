// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Category;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A category's input file is absent or cannot be parsed
    #[error("missing {category} data at {path}: {reason}")]
    MissingData {
        category: Category,
        path: PathBuf,
        reason: String,
    },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model error: {0}")]
    Model(#[from] floorplan_ifc_core::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("geometry extraction failed: {0}")]
    Extraction(String),
}

impl Error {
    pub fn missing(category: Category, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::MissingData {
            category,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }
}
