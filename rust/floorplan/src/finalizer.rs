// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document finalization: units, containment and output

use std::path::{Path, PathBuf};

use floorplan_ifc_core::{write_to_path, HeaderInfo, IfcModel, NodeKey, UnitAssignment};

use crate::config::BuildOptions;
use crate::error::Result;
use crate::hierarchy::SpatialHierarchy;

/// Extension every output path ends in
pub const OUTPUT_EXTENSION: &str = "ifc";
/// File stem used when the output path is empty
pub const DEFAULT_OUTPUT_STEM: &str = "floorplan";

/// Bind metric units to the project, contain every element in the storey
/// and check the finished graph.
///
/// No containment relationship is created when `elements` is empty.
pub fn finalize(
    model: &mut IfcModel,
    hierarchy: &SpatialHierarchy,
    elements: &[NodeKey],
) -> Result<()> {
    model.assign_units(UnitAssignment::metric())?;
    if elements.is_empty() {
        tracing::info!("no building elements, writing empty storey");
    } else {
        model.contain(hierarchy.storey, elements)?;
    }
    model.validate()?;
    Ok(())
}

/// Output path that always ends in `.ifc`.
///
/// Any other extension is kept as part of the name (`plan.json` becomes
/// `plan.json.ifc`). An empty path, a path ending in a separator and an
/// existing directory resolve to `floorplan.ifc` inside that directory.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    let text = path.as_os_str().to_string_lossy();
    if text.is_empty() || text.ends_with(std::path::is_separator) || path.is_dir() {
        return path.join(DEFAULT_OUTPUT_STEM).with_extension(OUTPUT_EXTENSION);
    }
    let has_ifc_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if has_ifc_extension {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    PathBuf::from(name)
}

/// STEP header for a document written to `path`
pub fn header_for(path: &Path, options: &BuildOptions, timestamp: i64) -> HeaderInfo {
    HeaderInfo {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        author: options.author.clone(),
        organization: options.organization.clone(),
        originating_system: options.application_name.clone(),
        timestamp,
        ..HeaderInfo::default()
    }
}

/// Serialize `model` to `path` (after extension resolution), creating
/// parent directories. Returns the path written.
pub fn write_document(
    model: &IfcModel,
    path: &Path,
    options: &BuildOptions,
    timestamp: i64,
) -> Result<PathBuf> {
    let path = resolve_output_path(path);
    write_to_path(model, header_for(&path, options, timestamp), &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_ifc_core::IfcType;

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(
            resolve_output_path(Path::new("out/model")),
            PathBuf::from("out/model.ifc")
        );
        assert_eq!(
            resolve_output_path(Path::new("out/model.ifc")),
            PathBuf::from("out/model.ifc")
        );
        // Dots in the stem are kept
        assert_eq!(
            resolve_output_path(Path::new("plan.v2.ifc")),
            PathBuf::from("plan.v2.ifc")
        );
        assert_eq!(
            resolve_output_path(Path::new("out/model.IFC")),
            PathBuf::from("out/model.IFC")
        );
        assert_eq!(resolve_output_path(Path::new("")), PathBuf::from("floorplan.ifc"));
    }

    #[test]
    fn test_foreign_extension_gets_ifc_appended() {
        assert_eq!(
            resolve_output_path(Path::new("out/plan.json")),
            PathBuf::from("out/plan.json.ifc")
        );
        assert_eq!(
            resolve_output_path(Path::new("out/plan.v2")),
            PathBuf::from("out/plan.v2.ifc")
        );
    }

    #[test]
    fn test_directory_path_gets_default_name() {
        assert_eq!(
            resolve_output_path(Path::new("out/")),
            PathBuf::from("out/floorplan.ifc")
        );
        let dir = std::env::temp_dir();
        assert_eq!(resolve_output_path(&dir), dir.join("floorplan.ifc"));
    }

    #[test]
    fn test_finalize_without_elements() {
        let mut model = IfcModel::new();
        let hierarchy = SpatialHierarchy::build(&mut model, &BuildOptions::default()).unwrap();
        finalize(&mut model, &hierarchy, &[]).unwrap();

        assert!(model.units().is_some());
        assert_eq!(
            model.relationship_count(IfcType::IfcRelContainedInSpatialStructure),
            0
        );
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut model = IfcModel::new();
        let hierarchy = SpatialHierarchy::build(&mut model, &BuildOptions::default()).unwrap();
        finalize(&mut model, &hierarchy, &[]).unwrap();
        assert!(finalize(&mut model, &hierarchy, &[]).is_err());
    }

    #[test]
    fn test_header_uses_file_name() {
        let header = header_for(Path::new("out/dir/plan.ifc"), &BuildOptions::default(), 7);
        assert_eq!(header.file_name, "plan.ifc");
        assert_eq!(header.timestamp, 7);
        assert_eq!(header.originating_system, "FloorplanToIFC");
    }
}
