// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP output of hand-built models

use std::fs;

use floorplan_ifc_core::{
    to_step_string, write_to_path, Axis2Placement3D, ElementComposition, EntityScanner,
    GeometricProjection, HeaderInfo, IfcModel, NodeKey, NodeKind, OwnerInfo, PlacementKey,
    ProductShape, Profile2D, ShapeRepresentation, SlabType, SweptSolid, UnitAssignment,
};
use nalgebra::{Point3, Vector3};

struct Built {
    model: IfcModel,
    storey: NodeKey,
    storey_placement: PlacementKey,
}

fn hierarchy() -> (Built, floorplan_ifc_core::ContextKey) {
    let mut model = IfcModel::new();
    model.set_owner(OwnerInfo {
        person: "Tester".to_string(),
        creation_date: 1_700_000_000,
        ..OwnerInfo::default()
    });
    let ctx = model
        .add_context("Model", 3, 1e-5, Axis2Placement3D::identity())
        .unwrap();
    let body = model
        .add_subcontext(ctx, "Body", GeometricProjection::ModelView)
        .unwrap();
    let project = model
        .add_node("Project", NodeKind::Project { contexts: vec![ctx, body] }, None)
        .unwrap();
    model.assign_units(UnitAssignment::metric()).unwrap();

    let global = model.add_global_placement();
    let site_pl = model
        .add_placement(Some(global), Axis2Placement3D::identity())
        .unwrap();
    let site = model
        .add_node(
            "Site",
            NodeKind::Site {
                composition: ElementComposition::Element,
            },
            Some(site_pl),
        )
        .unwrap();
    model.aggregate(project, site).unwrap();

    let building_pl = model
        .add_placement(Some(site_pl), Axis2Placement3D::identity())
        .unwrap();
    let building = model
        .add_node(
            "Building",
            NodeKind::Building {
                composition: ElementComposition::Element,
            },
            Some(building_pl),
        )
        .unwrap();
    model.aggregate(site, building).unwrap();

    let storey_pl = model
        .add_placement(Some(building_pl), Axis2Placement3D::identity())
        .unwrap();
    let storey = model
        .add_node(
            "Ground Floor",
            NodeKind::Storey {
                composition: ElementComposition::Element,
                elevation: 0.0,
            },
            Some(storey_pl),
        )
        .unwrap();
    model.aggregate(building, storey).unwrap();

    (
        Built {
            model,
            storey,
            storey_placement: storey_pl,
        },
        body,
    )
}

fn slab(built: &mut Built, body: floorplan_ifc_core::ContextKey) -> NodeKey {
    let pl = built
        .model
        .add_placement(Some(built.storey_placement), Axis2Placement3D::identity())
        .unwrap();
    let node = built
        .model
        .add_node(
            "Floor",
            NodeKind::Slab {
                predefined: SlabType::Floor,
            },
            Some(pl),
        )
        .unwrap();
    let solid = SweptSolid::new(
        Profile2D::from_corner(5.0, 4.0),
        Axis2Placement3D::at(Point3::new(1.0, 2.0, 0.0)),
        Vector3::z(),
        0.1,
    )
    .unwrap();
    built
        .model
        .set_representation(node, ProductShape::new(vec![ShapeRepresentation::body(body, solid)]))
        .unwrap();
    node
}

fn attribute_count(content: &str, type_name: &str) -> usize {
    EntityScanner::new(content).find_by_type(type_name)[0]
        .split_attributes()
        .len()
}

#[test]
fn test_ifc4_attribute_arity() {
    let (mut built, body) = hierarchy();
    let floor = slab(&mut built, body);
    built.model.contain(built.storey, &[floor]).unwrap();
    built.model.validate().unwrap();

    let content = to_step_string(&built.model, HeaderInfo::default()).unwrap();

    assert_eq!(attribute_count(&content, "IFCPROJECT"), 9);
    assert_eq!(attribute_count(&content, "IFCSITE"), 14);
    assert_eq!(attribute_count(&content, "IFCBUILDING"), 12);
    assert_eq!(attribute_count(&content, "IFCBUILDINGSTOREY"), 10);
    assert_eq!(attribute_count(&content, "IFCSLAB"), 9);
    assert_eq!(attribute_count(&content, "IFCOWNERHISTORY"), 8);
    assert_eq!(attribute_count(&content, "IFCGEOMETRICREPRESENTATIONSUBCONTEXT"), 10);
    assert_eq!(attribute_count(&content, "IFCRECTANGLEPROFILEDEF"), 5);
    assert_eq!(attribute_count(&content, "IFCRELCONTAINEDINSPATIALSTRUCTURE"), 6);
}

#[test]
fn test_header_and_owner() {
    let (built, _) = hierarchy();
    let header = HeaderInfo {
        file_name: "model.ifc".to_string(),
        author: "Tester".to_string(),
        timestamp: 1_700_000_000,
        ..HeaderInfo::default()
    };
    let content = to_step_string(&built.model, header).unwrap();

    assert!(content.contains("FILE_NAME('model.ifc','2023-11-14T22:13:20',('Tester')"));
    assert!(content.contains("IFCPERSON($,'Tester',$,$,$,$,$,$);"));
    assert!(content.contains(",1700000000);"));
    assert!(content.contains("IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);"));
    assert!(content.contains(".MODEL_VIEW."));
}

#[test]
fn test_shared_points_written_once() {
    let (built, _) = hierarchy();
    let content = to_step_string(&built.model, HeaderInfo::default()).unwrap();

    // Every identity placement reuses the same origin and axes
    let origins = content.matches("IFCCARTESIANPOINT((0.,0.,0.))").count();
    assert_eq!(origins, 1);
    let z = content.matches("IFCDIRECTION((0.,0.,1.))").count();
    assert_eq!(z, 1);
}

#[test]
fn test_storey_placement_chain() {
    let (built, _) = hierarchy();
    let content = to_step_string(&built.model, HeaderInfo::default()).unwrap();
    let index = EntityScanner::new(&content).index();

    let storey = EntityScanner::new(&content).find_by_type("IFCBUILDINGSTOREY")[0];
    let mut placement: u64 = storey.split_attributes()[5][1..].parse().unwrap();
    let mut depth = 0;
    loop {
        let entity = index[&placement];
        assert_eq!(entity.type_name, "IFCLOCALPLACEMENT");
        let parent = entity.split_attributes()[0];
        if parent == "$" {
            break;
        }
        placement = parent[1..].parse().unwrap();
        depth += 1;
    }
    assert_eq!(depth, 3);
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = std::env::temp_dir().join(format!("floorplan-ifc-core-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let path = dir.join("sub").join("model.ifc");

    let (built, _) = hierarchy();
    write_to_path(&built.model, HeaderInfo::default(), &path).unwrap();
    fs::write(&path, "stale").unwrap();
    write_to_path(&built.model, HeaderInfo::default(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("ISO-10303-21;"));
    assert_eq!(fs::read_dir(dir.join("sub")).unwrap().count(), 1);

    let _ = fs::remove_dir_all(&dir);
}
