//! Equilibrium targets for the ICR search
//!
//! The applied load is carried to the group centroid (x = 0) and reduced to
//! the in-plane shear P = hypot(Fy, Fz) and the target moment/shear ratio
//! -M/P that a trial rotation center has to reproduce.

use serde::{Deserialize, Serialize};

use super::{AppliedLoad, Point3};
use crate::geometry::{Vec2, ZERO_TOLERANCE};

/// Relative tolerance on moments, scaled by P × group span
const RELATIVE_MOMENT_TOLERANCE: f64 = 1e-9;

/// In-plane load regime about the centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadRegime {
    /// Neither shear nor in-plane moment
    NoInPlaneLoad,
    /// Shear through the centroid
    PureShear,
    /// In-plane moment with no shear
    PureTorsion,
    /// Shear with a moment arm: the only case that needs an ICR search
    Eccentric,
}

impl LoadRegime {
    /// Whether the closed-form elastic distribution is exact for this regime
    pub fn bypasses_search(&self) -> bool {
        !matches!(self, LoadRegime::Eccentric)
    }
}

/// Demand about the group centroid, reduced for the ICR search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumTarget {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    /// In-plane moment about the centroid (applied torsion plus shear eccentricity)
    pub moment: f64,
    pub my: f64,
    pub mz: f64,
    /// In-plane shear magnitude P
    pub shear: f64,
    /// -M / P, zero when P vanishes
    pub target_ratio: f64,
    /// |M| / P, a search seed only
    pub eccentricity: f64,
    pub regime: LoadRegime,
    moment_tolerance: f64,
}

impl EquilibriumTarget {
    /// Reduce `load` about `centroid`. `span` scales the moment tolerance.
    pub fn new(load: &AppliedLoad, centroid: Vec2, span: f64) -> Self {
        let (moment, my, mz) = load.moments_about(Point3::new(0.0, centroid.y, centroid.z));
        let shear = load.shear_magnitude();
        let moment_tolerance = ZERO_TOLERANCE.max(RELATIVE_MOMENT_TOLERANCE * shear * span.max(1.0));

        let has_shear = shear >= ZERO_TOLERANCE;
        let has_moment = moment.abs() > moment_tolerance;
        let regime = match (has_shear, has_moment) {
            (false, false) => LoadRegime::NoInPlaneLoad,
            (true, false) => LoadRegime::PureShear,
            (false, true) => LoadRegime::PureTorsion,
            (true, true) => LoadRegime::Eccentric,
        };

        let (target_ratio, eccentricity) = if has_shear {
            (-moment / shear, moment.abs() / shear)
        } else {
            (0.0, 0.0)
        };

        EquilibriumTarget {
            fx: load.fx,
            fy: load.fy,
            fz: load.fz,
            moment,
            my,
            mz,
            shear,
            target_ratio,
            eccentricity,
            regime,
            moment_tolerance,
        }
    }

    /// Direction of rotation assumed by the search: +1 counter-clockwise
    pub fn rotation_sign(&self) -> f64 {
        if self.moment < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Out-of-plane components present at the centroid ("Fx", "My", "Mz")
    pub fn out_of_plane_components(&self) -> Vec<&'static str> {
        let force_tolerance = ZERO_TOLERANCE.max(RELATIVE_MOMENT_TOLERANCE * self.shear);
        let mut found = Vec::new();
        if self.fx.abs() > force_tolerance {
            found.push("Fx");
        }
        if self.my.abs() > self.moment_tolerance {
            found.push("My");
        }
        if self.mz.abs() > self.moment_tolerance {
            found.push("Mz");
        }
        found
    }

    /// Tolerance under which the in-plane moment counts as zero
    pub fn moment_tolerance(&self) -> f64 {
        self.moment_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_eccentric_shear() {
        let load = AppliedLoad::shear_at(-100.0, 0.0, 0.0, 100.0);
        let target = EquilibriumTarget::new(&load, Vec2::new(0.0, 0.0), 100.0);
        assert_eq!(target.regime, LoadRegime::Eccentric);
        assert_abs_diff_eq!(target.shear, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(target.moment, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(target.target_ratio, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(target.eccentricity, 100.0, epsilon = 1e-9);
        assert_eq!(target.rotation_sign(), 1.0);
    }

    #[test]
    fn test_shear_through_centroid_is_pure_shear() {
        let load = AppliedLoad::shear_at(30.0, 40.0, 12.5, -7.5);
        let target = EquilibriumTarget::new(&load, Vec2::new(12.5, -7.5), 200.0);
        assert_eq!(target.regime, LoadRegime::PureShear);
        assert!(target.regime.bypasses_search());
    }

    #[test]
    fn test_round_off_moment_is_negligible() {
        // Centroid round-off on a large load must not trigger a search
        let load = AppliedLoad::shear_at(-140_000.0, 45_000.0, 1e-10, 0.0);
        let target = EquilibriumTarget::new(&load, Vec2::new(0.0, 0.0), 300.0);
        assert_eq!(target.regime, LoadRegime::PureShear);
    }

    #[test]
    fn test_pure_torsion_and_no_load() {
        let torsion = AppliedLoad::default().with_moments(5_000.0, 0.0, 0.0);
        let target = EquilibriumTarget::new(&torsion, Vec2::new(3.0, 4.0), 50.0);
        assert_eq!(target.regime, LoadRegime::PureTorsion);
        assert_eq!(target.target_ratio, 0.0);

        let target = EquilibriumTarget::new(&AppliedLoad::default(), Vec2::default(), 50.0);
        assert_eq!(target.regime, LoadRegime::NoInPlaneLoad);
    }

    #[test]
    fn test_out_of_plane_detection() {
        let load = AppliedLoad::force(0.0, 0.0, 100.0).at(Point3::new(25.0, 0.0, 0.0));
        let target = EquilibriumTarget::new(&load, Vec2::default(), 100.0);
        assert_eq!(target.out_of_plane_components(), vec!["My"]);

        let load = AppliedLoad::force(5.0, -100.0, 0.0);
        let target = EquilibriumTarget::new(&load, Vec2::default(), 100.0);
        assert_eq!(target.out_of_plane_components(), vec!["Fx"]);

        let load = AppliedLoad::shear_at(-100.0, 0.0, 10.0, 60.0);
        let target = EquilibriumTarget::new(&load, Vec2::default(), 100.0);
        assert!(target.out_of_plane_components().is_empty());
    }
}
