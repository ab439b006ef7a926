//! # Connection Geometry
//!
//! Discretized element sets for weld and bolt groups, plus the shared
//! direction utilities used by every solver.
//!
//! ## Coordinate System
//!
//! All geometry lives in the y-z plane of the connection (x runs along the
//! member, out of the page). Coordinates are unit-agnostic.
//!
//! ## Modules
//!
//! - [`weld`] - Weld kinds, discretized weld elements, weld groups
//! - [`bolt`] - Bolt groups, layout builders, bearing plates

pub mod bolt;
pub mod weld;

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};

pub use bolt::{BoltGroup, Plate};
pub use weld::{FilletWeld, WeldElement, WeldGroup, WeldKind, WeldPath};

/// Threshold for treating a force, moment or stiffness as zero
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// Threshold for treating a distance as zero
pub const POSITION_TOLERANCE: f64 = 1e-9;

/// A point or direction in the y-z plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub y: f64,
    pub z: f64,
}

impl Vec2 {
    pub const fn new(y: f64, z: f64) -> Self {
        Vec2 { y, z }
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        self.y.hypot(self.z)
    }

    /// Offset from `origin` to this point
    pub fn minus(&self, origin: Vec2) -> Vec2 {
        Vec2::new(self.y - origin.y, self.z - origin.z)
    }

    pub fn distance_to(&self, other: Vec2) -> f64 {
        self.minus(other).norm()
    }

    pub fn dot(&self, other: Vec2) -> f64 {
        self.y * other.y + self.z * other.z
    }

    /// In-plane cross product `self.y * other.z - self.z * other.y`
    pub fn cross(&self, other: Vec2) -> f64 {
        self.y * other.z - self.z * other.y
    }

    pub fn scaled(&self, factor: f64) -> Vec2 {
        Vec2::new(self.y * factor, self.z * factor)
    }

    /// Rotate 90° counter-clockwise: (y, z) -> (-z, y)
    pub fn perp(&self) -> Vec2 {
        Vec2::new(-self.z, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.y.is_finite() && self.z.is_finite()
    }
}

/// Unit vector perpendicular (counter-clockwise) to the in-plane shear.
///
/// The ICR search line passes through the centroid along this direction.
/// With no shear the direction is arbitrary and `(1, 0)` is returned.
pub fn perpendicular_direction(fy: f64, fz: f64) -> Vec2 {
    let p = fy.hypot(fz);
    if p < ZERO_TOLERANCE {
        return Vec2::new(1.0, 0.0);
    }
    Vec2::new(fy / p, fz / p).perp()
}

/// Extent of a point set along y and z: `(span_y, span_z)`
pub fn extent<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> (f64, f64) {
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut z_min = f64::INFINITY;
    let mut z_max = f64::NEG_INFINITY;
    let mut count = 0usize;
    for p in points {
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
        z_min = z_min.min(p.z);
        z_max = z_max.max(p.z);
        count += 1;
    }
    if count < 2 {
        return (0.0, 0.0);
    }
    (y_max - y_min, z_max - z_min)
}

/// Group properties about the centroid.
///
/// Computed once when a group is built and read-only afterwards. For welds
/// the weights are element areas (throat × arc length); for bolts every
/// weight is 1 so `total_weight` is the bolt count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupProperties {
    /// Weighted centroid
    pub centroid: Vec2,
    /// Total weight: weld area, or bolt count
    pub total_weight: f64,
    /// Total weld length (equal to bolt count for bolt groups)
    pub total_length: f64,
    /// Second moment about the y-axis, Σ dz²·w
    pub iy: f64,
    /// Second moment about the z-axis, Σ dy²·w
    pub iz: f64,
    /// Polar moment, Iy + Iz
    pub ip: f64,
}

impl GroupProperties {
    /// Compute properties from `(position, weight, length)` triples.
    pub fn from_weighted(
        group: &str,
        items: impl IntoIterator<Item = (Vec2, f64, f64)> + Clone,
    ) -> JointResult<Self> {
        let mut total_weight = 0.0;
        let mut total_length = 0.0;
        let mut sum_y = 0.0;
        let mut sum_z = 0.0;
        for (p, w, l) in items.clone() {
            total_weight += w;
            total_length += l;
            sum_y += p.y * w;
            sum_z += p.z * w;
        }
        if !(total_weight > ZERO_TOLERANCE) || !total_weight.is_finite() {
            return Err(JointError::degenerate_geometry(
                group,
                format!("total weight must be positive, got {}", total_weight),
            ));
        }

        let centroid = Vec2::new(sum_y / total_weight, sum_z / total_weight);
        let mut iy = 0.0;
        let mut iz = 0.0;
        for (p, w, _) in items {
            let d = p.minus(centroid);
            iy += d.z * d.z * w;
            iz += d.y * d.y * w;
        }
        let ip = iy + iz;
        // Ip / A is the squared radius of gyration; zero means one point
        if !(ip > ZERO_TOLERANCE * total_weight) {
            return Err(JointError::degenerate_geometry(
                group,
                format!("elements coincide at one point, polar moment {} cannot resist torsion", ip),
            ));
        }

        Ok(GroupProperties {
            centroid,
            total_weight,
            total_length,
            iy,
            iz,
            ip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_perpendicular_direction() {
        let perp = perpendicular_direction(-100.0, 0.0);
        assert_abs_diff_eq!(perp.y, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(perp.z, -1.0, epsilon = 1e-15);

        let perp = perpendicular_direction(3.0, 4.0);
        assert_abs_diff_eq!(perp.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(perp.dot(Vec2::new(3.0, 4.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_direction_without_shear() {
        assert_eq!(perpendicular_direction(0.0, 0.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_extent() {
        let pts = [Vec2::new(-1.0, 2.0), Vec2::new(3.0, -4.0), Vec2::new(0.0, 0.0)];
        assert_eq!(extent(&pts), (4.0, 6.0));
        assert_eq!(extent(&pts[..1]), (0.0, 0.0));
    }

    #[test]
    fn test_unit_weight_properties() {
        // 2x2 square pattern at ±50
        let pts = [
            Vec2::new(-50.0, -50.0),
            Vec2::new(-50.0, 50.0),
            Vec2::new(50.0, -50.0),
            Vec2::new(50.0, 50.0),
        ];
        let props =
            GroupProperties::from_weighted("bolt", pts.iter().map(|p| (*p, 1.0, 1.0))).unwrap();
        assert_eq!(props.centroid, Vec2::new(0.0, 0.0));
        assert_abs_diff_eq!(props.iy, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.iz, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.ip, 20_000.0, epsilon = 1e-9);
        assert_eq!(props.total_weight, 4.0);
    }

    #[test]
    fn test_coincident_elements_are_degenerate() {
        let pts = [Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0)];
        let err = GroupProperties::from_weighted("bolt", pts.iter().map(|p| (*p, 1.0, 1.0))).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");

        let single = [(Vec2::new(10.0, -5.0), 25.0, 6.0)];
        assert!(GroupProperties::from_weighted("weld", single.iter().copied()).is_err());
    }

    #[test]
    fn test_zero_weight_is_degenerate() {
        let err = GroupProperties::from_weighted("weld", std::iter::empty()).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");
    }
}
