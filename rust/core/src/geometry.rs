// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric value types carried by placements and shape representations.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};
use crate::keys::ContextKey;
use crate::schema::ProfileType;

/// Tolerance below which a direction is treated as zero length.
const DIRECTION_EPSILON: f64 = 1e-12;

/// IfcAxis2Placement3D: origin, Z axis and X reference direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis2Placement3D {
    pub location: Point3<f64>,
    pub axis: Vector3<f64>,
    pub ref_direction: Vector3<f64>,
}

impl Axis2Placement3D {
    pub fn new(location: Point3<f64>, axis: Vector3<f64>, ref_direction: Vector3<f64>) -> Self {
        Self {
            location,
            axis,
            ref_direction,
        }
    }

    /// Origin, Z up, X forward
    pub fn identity() -> Self {
        Self::at(Point3::origin())
    }

    /// Axis-aligned frame translated to `location`
    pub fn at(location: Point3<f64>) -> Self {
        Self::new(location, Vector3::z(), Vector3::x())
    }

    /// Check that the frame can be written: finite values, non-zero and
    /// non-parallel axes.
    pub fn validate(&self) -> Result<()> {
        let finite = self.location.iter().all(|v| v.is_finite())
            && self.axis.iter().all(|v| v.is_finite())
            && self.ref_direction.iter().all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidGeometry(
                "placement has non-finite components".to_string(),
            ));
        }
        if self.axis.norm() < DIRECTION_EPSILON || self.ref_direction.norm() < DIRECTION_EPSILON {
            return Err(Error::InvalidGeometry(
                "placement axis has zero length".to_string(),
            ));
        }
        if self.axis.cross(&self.ref_direction).norm() < DIRECTION_EPSILON {
            return Err(Error::InvalidGeometry(
                "placement axis and reference direction are parallel".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Axis2Placement3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rectangular profile (IfcRectangleProfileDef)
///
/// IFC rectangles are centred on their 2D position, so `centre` is where
/// the middle of the rectangle sits in the profile plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile2D {
    pub profile_type: ProfileType,
    pub centre: Point2<f64>,
    pub x_dim: f64,
    pub y_dim: f64,
}

impl Profile2D {
    /// Rectangle centred on the profile origin
    pub fn rectangle(x_dim: f64, y_dim: f64) -> Self {
        Self {
            profile_type: ProfileType::Area,
            centre: Point2::origin(),
            x_dim,
            y_dim,
        }
    }

    /// Rectangle whose minimum corner sits on the profile origin
    pub fn from_corner(x_dim: f64, y_dim: f64) -> Self {
        Self::rectangle(x_dim, y_dim).with_centre(Point2::new(x_dim / 2.0, y_dim / 2.0))
    }

    pub fn with_centre(mut self, centre: Point2<f64>) -> Self {
        self.centre = centre;
        self
    }

    pub fn area(&self) -> f64 {
        self.x_dim * self.y_dim
    }

    /// Minimum and maximum corner in the profile plane
    pub fn corners(&self) -> (Point2<f64>, Point2<f64>) {
        let hx = self.x_dim / 2.0;
        let hy = self.y_dim / 2.0;
        (
            Point2::new(self.centre.x - hx, self.centre.y - hy),
            Point2::new(self.centre.x + hx, self.centre.y + hy),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.x_dim.is_finite() && self.y_dim.is_finite())
            || !self.centre.iter().all(|v| v.is_finite())
        {
            return Err(Error::InvalidGeometry(
                "profile has non-finite dimensions".to_string(),
            ));
        }
        if self.x_dim <= 0.0 || self.y_dim <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "profile dimensions must be positive, got {} x {}",
                self.x_dim, self.y_dim
            )));
        }
        Ok(())
    }
}

/// Extruded area solid: a planar profile swept along a direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptSolid {
    pub profile: Profile2D,
    pub position: Axis2Placement3D,
    pub extrusion_direction: Vector3<f64>,
    pub depth: f64,
}

impl SweptSolid {
    /// Build a solid, rejecting anything a viewer could not render.
    pub fn new(
        profile: Profile2D,
        position: Axis2Placement3D,
        extrusion_direction: Vector3<f64>,
        depth: f64,
    ) -> Result<Self> {
        profile.validate()?;
        position.validate()?;
        if !extrusion_direction.iter().all(|v| v.is_finite())
            || extrusion_direction.norm() < DIRECTION_EPSILON
        {
            return Err(Error::InvalidGeometry(
                "extrusion direction has zero length".to_string(),
            ));
        }
        if !depth.is_finite() || depth <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "extrusion depth must be positive, got {}",
                depth
            )));
        }
        Ok(Self {
            profile,
            position,
            extrusion_direction,
            depth,
        })
    }

    /// Enclosed volume (profile area times depth along the sweep)
    pub fn volume(&self) -> f64 {
        let dir = self.extrusion_direction.normalize();
        let normal = self.position.axis.normalize();
        self.profile.area() * self.depth * dir.dot(&normal).abs()
    }
}

/// Open 2D polyline (IfcPolyline of 2D points)
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline2D {
    pub points: Vec<Point2<f64>>,
}

impl Polyline2D {
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidGeometry(
                "polyline needs at least 2 points".to_string(),
            ));
        }
        if !points.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(Error::InvalidGeometry(
                "polyline has non-finite points".to_string(),
            ));
        }
        Ok(Self { points })
    }

    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Geometric item of a shape representation
#[derive(Debug, Clone, PartialEq)]
pub enum RepresentationItem {
    SweptSolid(SweptSolid),
    Curve(Polyline2D),
}

/// IfcShapeRepresentation: one item drawn in one context
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRepresentation {
    pub context: ContextKey,
    pub item: RepresentationItem,
}

impl ShapeRepresentation {
    pub fn body(context: ContextKey, solid: SweptSolid) -> Self {
        Self {
            context,
            item: RepresentationItem::SweptSolid(solid),
        }
    }

    pub fn axis(context: ContextKey, curve: Polyline2D) -> Self {
        Self {
            context,
            item: RepresentationItem::Curve(curve),
        }
    }

    /// RepresentationIdentifier
    pub fn identifier(&self) -> &'static str {
        match self.item {
            RepresentationItem::SweptSolid(_) => "Body",
            RepresentationItem::Curve(_) => "Axis",
        }
    }

    /// RepresentationType
    pub fn representation_type(&self) -> &'static str {
        match self.item {
            RepresentationItem::SweptSolid(_) => "SweptSolid",
            RepresentationItem::Curve(_) => "Curve2D",
        }
    }
}

/// IfcProductDefinitionShape: every representation of one product
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductShape {
    pub representations: Vec<ShapeRepresentation>,
}

impl ProductShape {
    pub fn new(representations: Vec<ShapeRepresentation>) -> Self {
        Self { representations }
    }

    /// The body solid, if the product has one
    pub fn body(&self) -> Option<&SweptSolid> {
        self.representations.iter().find_map(|r| match &r.item {
            RepresentationItem::SweptSolid(solid) => Some(solid),
            RepresentationItem::Curve(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }
}
