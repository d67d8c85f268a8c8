// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building element assembly
//!
//! Walls, then the floor slab, then rooms. Every element is placed relative
//! to the storey placement. An element whose shape cannot be built is
//! skipped and never enters the model; a category whose data could not be
//! read is skipped as a whole.

use std::fmt;

use floorplan_ifc_core::{
    Axis2Placement3D, ElementComposition, IfcModel, NodeKey, NodeKind, ProductShape, SlabType,
};

use crate::config::BuildOptions;
use crate::error::Result;
use crate::hierarchy::SpatialHierarchy;
use crate::placement::WallFrame;
use crate::shape::{floor_shape, space_shape, wall_shape};
use crate::types::{Category, FloorData, RoomData, Transform, WallData};

/// Result of one element category
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    /// `built` elements entered the model, `skipped` inputs were degenerate
    Built { built: usize, skipped: usize },
    /// The category was not processed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub category: Category,
    pub outcome: CategoryOutcome,
}

impl CategoryReport {
    pub fn built(&self) -> usize {
        match self.outcome {
            CategoryOutcome::Built { built, .. } => built,
            CategoryOutcome::Failed(_) => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, CategoryOutcome::Failed(_))
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CategoryOutcome::Built { built, skipped } => {
                write!(f, "{}: {} built, {} skipped", self.category, built, skipped)
            }
            CategoryOutcome::Failed(reason) => write!(f, "{}: failed ({})", self.category, reason),
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    built: usize,
    skipped: usize,
}

/// Creates building elements below the storey of a hierarchy
pub struct ElementAssembler<'a> {
    model: &'a mut IfcModel,
    hierarchy: &'a SpatialHierarchy,
    options: &'a BuildOptions,
    transform: Transform,
    elements: Vec<NodeKey>,
}

impl<'a> ElementAssembler<'a> {
    pub fn new(
        model: &'a mut IfcModel,
        hierarchy: &'a SpatialHierarchy,
        options: &'a BuildOptions,
        transform: Transform,
    ) -> Self {
        Self {
            model,
            hierarchy,
            options,
            transform,
            elements: Vec::new(),
        }
    }

    /// Run one category, turning a read failure or a model error into a
    /// failed report. Elements created before a model error stay in the
    /// element list.
    fn assemble<T>(
        &mut self,
        category: Category,
        data: Result<T>,
        build: impl FnOnce(&mut Self, &T) -> Result<Tally>,
    ) -> CategoryReport {
        let outcome = match data.and_then(|d| build(self, &d)) {
            Ok(Tally { built, skipped }) => {
                tracing::info!(category = %category, built, skipped, "assembled category");
                CategoryOutcome::Built { built, skipped }
            }
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "skipping category");
                CategoryOutcome::Failed(e.to_string())
            }
        };
        CategoryReport { category, outcome }
    }

    pub fn assemble_walls(&mut self, data: Result<WallData>) -> CategoryReport {
        self.assemble(Category::Walls, data, |this, walls| this.build_walls(walls))
    }

    pub fn assemble_floor(&mut self, data: Result<FloorData>) -> CategoryReport {
        self.assemble(Category::Floor, data, |this, floor| this.build_floor(floor))
    }

    pub fn assemble_rooms(&mut self, data: Result<RoomData>) -> CategoryReport {
        self.assemble(Category::Rooms, data, |this, rooms| this.build_rooms(rooms))
    }

    /// Elements created so far, in creation order
    pub fn finish(self) -> Vec<NodeKey> {
        self.elements
    }

    fn add_element(
        &mut self,
        name: &str,
        kind: NodeKind,
        axes: Axis2Placement3D,
        shape: ProductShape,
    ) -> Result<NodeKey> {
        let placement = self
            .model
            .add_placement(Some(self.hierarchy.storey_placement), axes)?;
        let node = self.model.add_node(name, kind, Some(placement))?;
        self.model.set_representation(node, shape)?;
        self.elements.push(node);
        tracing::debug!(name, "added element");
        Ok(node)
    }

    fn build_walls(&mut self, walls: &WallData) -> Result<Tally> {
        let contexts = self.hierarchy.contexts;
        let mut tally = Tally::default();

        for (g, group) in walls.groups.iter().enumerate() {
            for (s, segment) in group.iter().enumerate() {
                let name = format!("Wall_{}_{}", g, s);
                let points = self.transform.apply_all(segment);

                let shaped = WallFrame::from_segment(&points).and_then(|frame| {
                    let shape = wall_shape(
                        &frame,
                        self.options.wall_thickness,
                        contexts.body,
                        contexts.axis,
                    )?;
                    Ok((frame, shape))
                });
                match shaped {
                    Ok((frame, shape)) => {
                        self.add_element(&name, NodeKind::Wall, frame.axes(), shape)?;
                        tally.built += 1;
                    }
                    Err(e) => {
                        tracing::warn!(wall = %name, error = %e, "skipping wall");
                        tally.skipped += 1;
                    }
                }
            }
        }
        Ok(tally)
    }

    fn build_floor(&mut self, floor: &FloorData) -> Result<Tally> {
        let mut tally = Tally::default();
        if floor.points.is_empty() {
            return Ok(tally);
        }

        let points = self.transform.apply_all(&floor.points);
        match floor_shape(
            &points,
            self.options.slab_thickness,
            self.hierarchy.contexts.body,
        ) {
            Ok(shape) => {
                self.add_element(
                    "Floor",
                    NodeKind::Slab {
                        predefined: SlabType::Floor,
                    },
                    Axis2Placement3D::identity(),
                    shape,
                )?;
                tally.built += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping floor slab");
                tally.skipped += 1;
            }
        }
        Ok(tally)
    }

    fn build_rooms(&mut self, rooms: &RoomData) -> Result<Tally> {
        let mut tally = Tally::default();

        for (i, room) in rooms.rooms.iter().enumerate() {
            if room.is_empty() {
                continue;
            }
            let name = format!("Room_{}", i);
            let points = self.transform.apply_all(room);

            match space_shape(
                &points,
                self.options.space_height,
                self.hierarchy.contexts.body,
            ) {
                Ok(shape) => {
                    self.add_element(
                        &name,
                        NodeKind::Space {
                            composition: ElementComposition::Element,
                        },
                        Axis2Placement3D::identity(),
                        shape,
                    )?;
                    tally.built += 1;
                }
                Err(e) => {
                    tracing::warn!(room = %name, error = %e, "skipping room");
                    tally.skipped += 1;
                }
            }
        }
        Ok(tally)
    }
}
