// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion configuration loaded from environment variables.

use std::path::PathBuf;

use floorplan_ifc_core::OwnerInfo;

use crate::error::{Error, Result};

/// Default wall thickness in metres.
pub const DEFAULT_WALL_THICKNESS: f64 = 0.3;
/// Default floor slab thickness in metres.
pub const DEFAULT_SLAB_THICKNESS: f64 = 0.1;
/// Default room ceiling height in metres.
pub const DEFAULT_SPACE_HEIGHT: f64 = 2.5;

/// Super-resolution options handed to the geometry extractor untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperResolution {
    pub enabled: bool,
    pub scale: u32,
    pub method: String,
}

impl Default for SuperResolution {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 2,
            method: "bicubic".to_string(),
        }
    }
}

/// Names, dimensions and identity used while building the document.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub wall_thickness: f64,
    pub slab_thickness: f64,
    pub space_height: f64,
    pub project_name: String,
    pub site_name: String,
    pub building_name: String,
    pub storey_name: String,
    pub storey_elevation: f64,
    pub author: String,
    pub organization: String,
    pub application_name: String,
    pub application_version: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            wall_thickness: DEFAULT_WALL_THICKNESS,
            slab_thickness: DEFAULT_SLAB_THICKNESS,
            space_height: DEFAULT_SPACE_HEIGHT,
            project_name: "Floorplan Project".to_string(),
            site_name: "Site".to_string(),
            building_name: "Building".to_string(),
            storey_name: "Ground Floor".to_string(),
            storey_elevation: 0.0,
            author: "Unknown".to_string(),
            organization: "Unknown".to_string(),
            application_name: "FloorplanToIFC".to_string(),
            application_version: "1.0".to_string(),
        }
    }
}

impl BuildOptions {
    /// Reject dimensions no element could be built with.
    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("wall thickness", self.wall_thickness),
            ("slab thickness", self.slab_thickness),
            ("space height", self.space_height),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.storey_elevation.is_finite() {
            return Err(Error::Config("storey elevation must be finite".to_string()));
        }
        Ok(())
    }

    /// Owner history data stamped with `creation_date` (Unix seconds).
    pub fn owner(&self, creation_date: i64) -> OwnerInfo {
        OwnerInfo {
            person: self.author.clone(),
            organization: self.organization.clone(),
            application_name: self.application_name.clone(),
            application_id: self.application_name.clone(),
            application_version: self.application_version.clone(),
            creation_date,
        }
    }
}

/// Conversion configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Floor plan image given to the geometry extractor.
    pub image_path: PathBuf,
    /// Target document path; `.ifc` is appended when it has no extension.
    pub output_path: PathBuf,
    /// Directory of already extracted geometry files.
    pub data_dir: PathBuf,
    /// Forwarded to the geometry extractor.
    pub super_resolution: SuperResolution,
    pub options: BuildOptions,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = BuildOptions::default();
        let sr = SuperResolution::default();
        Self {
            image_path: env_or("FLOORPLAN_IMAGE_PATH", "floorplan.png").into(),
            output_path: env_or("FLOORPLAN_OUTPUT_PATH", "floorplan.ifc").into(),
            data_dir: env_or("FLOORPLAN_DATA_DIR", "Data/0").into(),
            super_resolution: SuperResolution {
                enabled: parse_env("FLOORPLAN_SR_ENABLED", sr.enabled),
                scale: parse_env("FLOORPLAN_SR_SCALE", sr.scale),
                method: env_or("FLOORPLAN_SR_METHOD", &sr.method),
            },
            options: BuildOptions {
                wall_thickness: parse_env("FLOORPLAN_WALL_THICKNESS", defaults.wall_thickness),
                slab_thickness: parse_env("FLOORPLAN_SLAB_THICKNESS", defaults.slab_thickness),
                space_height: parse_env("FLOORPLAN_SPACE_HEIGHT", defaults.space_height),
                project_name: env_or("FLOORPLAN_PROJECT_NAME", &defaults.project_name),
                author: env_or("FLOORPLAN_AUTHOR", &defaults.author),
                ..defaults
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Parse an environment variable, keeping `default` when it is unset or
/// does not parse.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_option_defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.wall_thickness, 0.3);
        assert_eq!(options.slab_thickness, 0.1);
        assert_eq!(options.space_height, 2.5);
        assert_eq!(options.storey_name, "Ground Floor");
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(BuildOptions::default().validate().is_ok());
        let options = BuildOptions {
            slab_thickness: 0.0,
            ..BuildOptions::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));
        let options = BuildOptions {
            wall_thickness: f64::NAN,
            ..BuildOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_owner_from_options() {
        let owner = BuildOptions::default().owner(42);
        assert_eq!(owner.application_name, "FloorplanToIFC");
        assert_eq!(owner.creation_date, 42);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        std::env::set_var("FLOORPLAN_TEST_GARBAGE_THICKNESS", "thick");
        assert_eq!(parse_env("FLOORPLAN_TEST_GARBAGE_THICKNESS", 0.3), 0.3);
        std::env::set_var("FLOORPLAN_TEST_GOOD_THICKNESS", " 0.25 ");
        assert_eq!(parse_env("FLOORPLAN_TEST_GOOD_THICKNESS", 0.3), 0.25);
        assert_eq!(parse_env("FLOORPLAN_TEST_UNSET_VALUE", 7u32), 7);
    }
}
