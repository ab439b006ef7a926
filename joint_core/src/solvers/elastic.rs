//! # Elastic Distribution
//!
//! Closed-form superposition of a uniform direct term and a term linear in
//! the offset from the centroid. Always available, so it doubles as the
//! fallback when the ICR search cannot produce a field.
//!
//! ## Weld stresses
//!
//! ```text
//! f_direct = F / A                 (y, z, and axial x)
//! f_moment = (-Mx·dz, Mx·dy) / Ip  (perpendicular to the radius)
//! f_bending = My·dz / Iy + Mz·dy / Iz
//! ```
//!
//! ## Bolt forces
//!
//! Same in-plane terms with unit weight per bolt: `F/n` and `Mx·d/Ip`.
//!
//! A moment about an axis the group has no second moment about (My on a
//! weld line along y, say) cannot be resisted and is reported as
//! degenerate geometry rather than dropped.

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};
use crate::geometry::{BoltGroup, GroupProperties, Vec2, WeldGroup, ZERO_TOLERANCE};
use crate::loads::{AppliedLoad, Point3};

/// Stress components at one weld point, force per unit throat area.
///
/// In-plane components act in the y–z plane; axial and bending act along x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressComponents {
    pub direct_y: f64,
    pub direct_z: f64,
    pub moment_y: f64,
    pub moment_z: f64,
    pub axial: f64,
    pub bending: f64,
}

impl StressComponents {
    pub fn total_y(&self) -> f64 {
        self.direct_y + self.moment_y
    }

    pub fn total_z(&self) -> f64 {
        self.direct_z + self.moment_z
    }

    pub fn total_axial(&self) -> f64 {
        self.axial + self.bending
    }

    /// In-plane shear stress magnitude
    pub fn shear_resultant(&self) -> f64 {
        self.total_y().hypot(self.total_z())
    }

    /// Magnitude of all three components
    pub fn resultant(&self) -> f64 {
        (self.total_y().powi(2) + self.total_z().powi(2) + self.total_axial().powi(2)).sqrt()
    }
}

/// Moments `(Mx, My, Mz)` about the group centroid in the x = 0 plane
fn centroid_moments(load: &AppliedLoad, properties: &GroupProperties) -> (f64, f64, f64) {
    let c = properties.centroid;
    load.moments_about(Point3::new(0.0, c.y, c.z))
}

/// Relative size below which a moment counts as zero, scaled by load × span
const RELATIVE_MOMENT_TOLERANCE: f64 = 1e-9;

/// `moment / inertia`, the stress gradient a moment produces.
///
/// A negligible moment gives zero whatever the inertia; a real moment on a
/// zero inertia is an error.
fn gradient(
    group: &'static str,
    axis: &'static str,
    moment: f64,
    inertia: f64,
    negligible: f64,
) -> JointResult<f64> {
    if inertia > ZERO_TOLERANCE {
        Ok(moment / inertia)
    } else if moment.abs() <= negligible {
        Ok(0.0)
    } else {
        Err(JointError::degenerate_geometry(
            group,
            format!("moment {} about {} meets a zero second moment", moment, axis),
        ))
    }
}

/// Moment magnitude treated as zero for `load` on a group of `span`
fn negligible_moment(load: &AppliedLoad, span: f64) -> f64 {
    let force = load.fx.abs() + load.fy.abs() + load.fz.abs();
    ZERO_TOLERANCE.max(RELATIVE_MOMENT_TOLERANCE * force * span.max(1.0))
}

/// Elastic stress at every weld element, in element order.
///
/// # Errors
///
/// `DegenerateGeometry` when My or Mz acts on a group with a zero Iy or Iz.
pub fn weld_stresses(group: &WeldGroup, load: &AppliedLoad) -> JointResult<Vec<StressComponents>> {
    let props = group.properties();
    let (mx, my, mz) = centroid_moments(load, props);
    let area = props.total_weight;
    let negligible = negligible_moment(load, group.span());

    let torsion = gradient("weld group", "x", mx, props.ip, negligible)?;
    let bending_y = gradient("weld group", "y", my, props.iy, negligible)?;
    let bending_z = gradient("weld group", "z", mz, props.iz, negligible)?;
    let direct_y = load.fy / area;
    let direct_z = load.fz / area;
    let axial = load.fx / area;

    Ok(group
        .elements()
        .iter()
        .map(|el| {
            let d = el.position.minus(props.centroid);
            StressComponents {
                direct_y,
                direct_z,
                moment_y: -torsion * d.z,
                moment_z: torsion * d.y,
                axial,
                bending: bending_y * d.z + bending_z * d.y,
            }
        })
        .collect())
}

/// Elastic in-plane shear force `(Fy, Fz)` at every bolt, in bolt order.
pub fn bolt_forces(group: &BoltGroup, load: &AppliedLoad) -> JointResult<Vec<Vec2>> {
    let props = group.properties();
    let (mx, _, _) = centroid_moments(load, props);
    let n = group.len() as f64;
    let torsion = gradient("bolt group", "x", mx, props.ip, negligible_moment(load, group.span()))?;

    Ok(group
        .positions()
        .iter()
        .map(|p| {
            let d = p.minus(props.centroid);
            Vec2::new(load.fy / n - torsion * d.z, load.fz / n + torsion * d.y)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FilletWeld, WeldKind, WeldPath};
    use approx::assert_abs_diff_eq;

    fn rectangle() -> WeldGroup {
        let fillet = FilletWeld::from_leg(6.0).unwrap();
        WeldGroup::from_paths(
            &[WeldPath::rectangle(100.0, 200.0, Vec2::default())],
            WeldKind::Fillet(fillet),
            120,
        )
        .unwrap()
    }

    #[test]
    fn test_weld_stresses_reproduce_load() {
        let group = rectangle();
        let load = AppliedLoad::shear_at(-30_000.0, 12_000.0, 40.0, 150.0);
        let stresses = weld_stresses(&group, &load).unwrap();
        let c = group.properties().centroid;

        let mut fy = 0.0;
        let mut fz = 0.0;
        let mut m = 0.0;
        for (i, (el, s)) in group.elements().iter().zip(&stresses).enumerate() {
            let a = group.element_area(i);
            let d = el.position.minus(c);
            fy += s.total_y() * a;
            fz += s.total_z() * a;
            m += (d.y * s.total_z() - d.z * s.total_y()) * a;
        }
        let (mx, _, _) = load.moments_about(Point3::new(0.0, c.y, c.z));
        assert_abs_diff_eq!(fy, -30_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fz, 12_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m, mx, epsilon = 1e-3);
    }

    #[test]
    fn test_weld_axial_and_bending() {
        let group = rectangle();
        let load = AppliedLoad::force(10_000.0, 0.0, 0.0).with_moments(0.0, 2.0e6, 0.0);
        let stresses = weld_stresses(&group, &load).unwrap();
        let area = group.properties().total_weight;
        let iy = group.properties().iy;

        for (el, s) in group.elements().iter().zip(&stresses) {
            assert_abs_diff_eq!(s.axial, 10_000.0 / area, epsilon = 1e-12);
            assert_abs_diff_eq!(s.bending, 2.0e6 * el.position.z / iy, epsilon = 1e-9);
            assert_eq!(s.shear_resultant(), 0.0);
        }
    }

    #[test]
    fn test_bending_without_inertia_is_an_error() {
        // Line along y: every element at dz = 0, so Iy = 0
        let fillet = FilletWeld::from_leg(6.0).unwrap();
        let line = WeldPath::line(Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0));
        let group = WeldGroup::from_paths(&[line], WeldKind::Fillet(fillet), 40).unwrap();
        assert_eq!(group.properties().iy, 0.0);

        let load = AppliedLoad::force(0.0, -1_000.0, 0.0).with_moments(0.0, 5.0e4, 0.0);
        let err = weld_stresses(&group, &load).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");

        // Mz bends about the axis the line does have inertia for
        let load = AppliedLoad::force(0.0, -1_000.0, 0.0).with_moments(0.0, 0.0, 5.0e4);
        let stresses = weld_stresses(&group, &load).unwrap();
        let iz = group.properties().iz;
        for (el, s) in group.elements().iter().zip(&stresses) {
            assert_abs_diff_eq!(s.bending, 5.0e4 * el.position.y / iz, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bolt_line_shares_concentric_shear() {
        let group = BoltGroup::new(vec![Vec2::new(10.0, 20.0), Vec2::new(10.0, 60.0)], 16.0).unwrap();
        let load = AppliedLoad::shear_at(-500.0, 0.0, 10.0, 40.0);
        let forces = bolt_forces(&group, &load).unwrap();
        assert_eq!(forces, vec![Vec2::new(-250.0, 0.0), Vec2::new(-250.0, 0.0)]);
    }

    #[test]
    fn test_bolt_torsion() {
        let group = BoltGroup::new(vec![Vec2::new(0.0, 50.0), Vec2::new(0.0, -50.0)], 20.0).unwrap();
        let load = AppliedLoad::default().with_moments(10_000.0, 0.0, 0.0);
        let forces = bolt_forces(&group, &load).unwrap();
        // Ip = 5000, F = M·d/Ip = 100 perpendicular to each radius
        assert_abs_diff_eq!(forces[0].y, -100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(forces[1].y, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stress_component_totals() {
        let s = StressComponents {
            direct_y: 3.0,
            moment_z: 4.0,
            axial: 6.0,
            bending: 6.0,
            ..Default::default()
        };
        assert_eq!(s.shear_resultant(), 5.0);
        assert_eq!(s.resultant(), 13.0);
    }
}
