//! # Bolt Groups
//!
//! Bolt positions in the y-z plane plus the bearing plate used by the
//! neutral-axis tension distributor. Every bolt carries unit weight, so the
//! group "area" is the bolt count and Ip = Σ r².
//!
//! ## Example
//!
//! ```rust
//! use joint_core::geometry::{BoltGroup, Plate, Vec2};
//!
//! // 3 rows x 2 columns, 75 pitch, 100 gauge, 20 mm bolts
//! let bolts = BoltGroup::from_pattern(3, 2, 75.0, 100.0, Vec2::new(0.0, 0.0), 20.0).unwrap();
//! assert_eq!(bolts.len(), 6);
//!
//! let plate = Plate::from_dimensions(250.0, 180.0, Vec2::new(0.0, 0.0));
//! assert!(plate.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::{extent, GroupProperties, Vec2};
use crate::errors::{JointError, JointResult};

/// Bolt group with cached properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoltGroup {
    positions: Vec<Vec2>,
    diameter: f64,
    properties: GroupProperties,
    span: f64,
}

impl BoltGroup {
    pub fn new(positions: Vec<Vec2>, diameter: f64) -> JointResult<Self> {
        if !(diameter > 0.0) || !diameter.is_finite() {
            return Err(JointError::invalid_input(
                "diameter",
                diameter.to_string(),
                "Bolt diameter must be positive",
            ));
        }
        if positions.is_empty() {
            return Err(JointError::degenerate_geometry(
                "bolt group",
                "at least one bolt is required",
            ));
        }
        if let Some((i, p)) = positions.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(JointError::invalid_input(
                format!("positions[{}]", i),
                format!("({}, {})", p.y, p.z),
                "Bolt coordinates must be finite",
            ));
        }

        let properties =
            GroupProperties::from_weighted("bolt group", positions.iter().map(|p| (*p, 1.0, 1.0)))?;
        let (span_y, span_z) = extent(&positions);

        Ok(BoltGroup {
            positions,
            diameter,
            properties,
            span: span_y.max(span_z),
        })
    }

    /// Rectangular grid: `rows` stacked along y at `spacing_y`, `cols` along z
    /// at `spacing_z`, centered on `center`.
    pub fn from_pattern(
        rows: usize,
        cols: usize,
        spacing_y: f64,
        spacing_z: f64,
        center: Vec2,
        diameter: f64,
    ) -> JointResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(JointError::degenerate_geometry(
                "bolt group",
                format!("pattern needs at least one row and column, got {}x{}", rows, cols),
            ));
        }
        let y0 = center.y - spacing_y * (rows as f64 - 1.0) / 2.0;
        let z0 = center.z - spacing_z * (cols as f64 - 1.0) / 2.0;
        let mut positions = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                positions.push(Vec2::new(y0 + r as f64 * spacing_y, z0 + c as f64 * spacing_z));
            }
        }
        BoltGroup::new(positions, diameter)
    }

    /// `count` bolts evenly spaced on a circle, the first on the +y axis.
    pub fn from_circle(count: usize, radius: f64, center: Vec2, diameter: f64) -> JointResult<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(JointError::invalid_input(
                "radius",
                radius.to_string(),
                "Bolt circle radius must be positive",
            ));
        }
        let positions = (0..count)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / count as f64;
                Vec2::new(center.y + radius * angle.cos(), center.z + radius * angle.sin())
            })
            .collect();
        BoltGroup::new(positions, diameter)
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn properties(&self) -> &GroupProperties {
        &self.properties
    }

    /// Largest extent of the pattern along y or z
    pub fn span(&self) -> f64 {
        self.span
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Rectangular bearing plate in the y-z plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Plate {
    /// Plate spanning two opposite corners (in any order)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Plate {
            y_min: a.y.min(b.y),
            y_max: a.y.max(b.y),
            z_min: a.z.min(b.z),
            z_max: a.z.max(b.z),
        }
    }

    /// Plate of `depth_y` by `depth_z` centered on `center`
    pub fn from_dimensions(depth_y: f64, depth_z: f64, center: Vec2) -> Self {
        Plate {
            y_min: center.y - depth_y / 2.0,
            y_max: center.y + depth_y / 2.0,
            z_min: center.z - depth_z / 2.0,
            z_max: center.z + depth_z / 2.0,
        }
    }

    pub fn depth_y(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn depth_z(&self) -> f64 {
        self.z_max - self.z_min
    }

    /// Both depths must be positive and finite.
    pub fn validate(&self) -> JointResult<()> {
        for (axis, depth) in [("y", self.depth_y()), ("z", self.depth_z())] {
            if !(depth > 0.0) || !depth.is_finite() {
                return Err(JointError::invalid_plate(axis, depth));
            }
        }
        Ok(())
    }
}
