//! Applied loads and equilibrium targets
//!
//! An [`AppliedLoad`] is six generalized components acting at an
//! application point. It can be carried rigidly to any reference point
//! (M' = M + r × F), which is how the solvers obtain the demand about a
//! group centroid.
//!
//! # Sign Convention
//!
//! - Forces are positive along +x, +y, +z (x runs along the member).
//! - Mx (in-plane torsion) is counter-clockwise positive viewed from +x.
//! - My > 0 puts the +z side in tension; Mz > 0 puts the +y side in tension.
//!
//! # Example
//!
//! ```
//! use joint_core::loads::{AppliedLoad, Point3};
//!
//! // 10 kN down at 150 mm from the reference point
//! let load = AppliedLoad::force(0.0, -10_000.0, 0.0).at(Point3::new(0.0, 0.0, 150.0));
//! let (mx, _, _) = load.moments_about(Point3::origin());
//! assert!((mx - 1_500_000.0).abs() < 1e-6);
//! ```

pub mod target;

pub use target::{EquilibriumTarget, LoadRegime};

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};

/// A point in connection space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub const fn origin() -> Self {
        Point3::new(0.0, 0.0, 0.0)
    }
}

/// Six-component load at an application point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AppliedLoad {
    /// Axial force (out of plane)
    #[serde(default)]
    pub fx: f64,
    /// In-plane shear along y
    #[serde(default)]
    pub fy: f64,
    /// In-plane shear along z
    #[serde(default)]
    pub fz: f64,
    /// In-plane torsion
    #[serde(default)]
    pub mx: f64,
    /// Bending about y
    #[serde(default)]
    pub my: f64,
    /// Bending about z
    #[serde(default)]
    pub mz: f64,
    /// Application point
    #[serde(default)]
    pub location: Point3,
}

impl AppliedLoad {
    /// Forces only, applied at the origin
    pub fn force(fx: f64, fy: f64, fz: f64) -> Self {
        AppliedLoad {
            fx,
            fy,
            fz,
            ..Default::default()
        }
    }

    /// In-plane shear applied at a point in the y-z plane
    pub fn shear_at(fy: f64, fz: f64, y: f64, z: f64) -> Self {
        AppliedLoad::force(0.0, fy, fz).at(Point3::new(0.0, y, z))
    }

    pub fn with_moments(mut self, mx: f64, my: f64, mz: f64) -> Self {
        self.mx = mx;
        self.my = my;
        self.mz = mz;
        self
    }

    pub fn at(mut self, location: Point3) -> Self {
        self.location = location;
        self
    }

    /// All components must be finite.
    pub fn validate(&self) -> JointResult<()> {
        let fields = [
            ("fx", self.fx),
            ("fy", self.fy),
            ("fz", self.fz),
            ("mx", self.mx),
            ("my", self.my),
            ("mz", self.mz),
            ("location.x", self.location.x),
            ("location.y", self.location.y),
            ("location.z", self.location.z),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(JointError::invalid_input(
                    field,
                    value.to_string(),
                    "Load components must be finite",
                ));
            }
        }
        Ok(())
    }

    /// In-plane shear magnitude P = hypot(Fy, Fz)
    pub fn shear_magnitude(&self) -> f64 {
        self.fy.hypot(self.fz)
    }

    /// Total moments `(Mx, My, Mz)` about `point`.
    pub fn moments_about(&self, point: Point3) -> (f64, f64, f64) {
        let dx = self.location.x - point.x;
        let dy = self.location.y - point.y;
        let dz = self.location.z - point.z;

        let mx = self.mx + self.fz * dy - self.fy * dz;
        let my = self.my + self.fx * dz - self.fz * dx;
        let mz = self.mz + self.fx * dy - self.fy * dx;
        (mx, my, mz)
    }

    /// Statically equivalent load acting at `point`.
    pub fn equivalent_at(&self, point: Point3) -> AppliedLoad {
        let (mx, my, mz) = self.moments_about(point);
        AppliedLoad {
            fx: self.fx,
            fy: self.fy,
            fz: self.fz,
            mx,
            my,
            mz,
            location: point,
        }
    }
}
