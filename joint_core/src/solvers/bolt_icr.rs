//! # Bolt Group ICR Evaluator
//!
//! Bolts are isotropic: each deforms perpendicular to its radius from the
//! trial center with δ_i = Δmax · c_i / c_max, and resists with the
//! Crawford–Kulak force R(δ_i). Everything else (sign correction, ratio,
//! scaling) is shared with the weld evaluator.

use tracing::trace;

use super::icr::{locate_icr, Candidate, IcrSearchConfig, ResponseEvaluator, SearchRegion};
use super::{
    align_with_applied, field_balance, scale_to_applied, IcrFailure, IcrSolution, SearchLine,
    TrialField,
};
use crate::equations::CrawfordKulak;
use crate::geometry::{BoltGroup, Vec2, POSITION_TOLERANCE};
use crate::loads::EquilibriumTarget;

/// Evaluates the bolt group response at a trial ICR.
pub struct BoltIcrEvaluator<'a> {
    group: &'a BoltGroup,
    applied: Vec2,
    model: CrawfordKulak,
    r_ult: f64,
}

impl<'a> BoltIcrEvaluator<'a> {
    pub fn new(
        group: &'a BoltGroup,
        target: &EquilibriumTarget,
        model: CrawfordKulak,
        r_ult: f64,
    ) -> Self {
        BoltIcrEvaluator {
            group,
            applied: Vec2::new(target.fy, target.fz),
            model,
            r_ult,
        }
    }
}

impl ResponseEvaluator for BoltIcrEvaluator<'_> {
    type State = TrialField;

    fn evaluate(&self, icr: Vec2) -> Option<Candidate<TrialField>> {
        let radii: Vec<Vec2> = self.group.positions().iter().map(|p| p.minus(icr)).collect();

        // A center sitting on a bolt leaves that bolt without a direction
        let c_min = radii.iter().map(Vec2::norm).fold(f64::INFINITY, f64::min);
        let c_max = radii.iter().map(Vec2::norm).fold(0.0, f64::max);
        if !(c_min >= POSITION_TOLERANCE) || !c_max.is_finite() {
            trace!(y = icr.y, z = icr.z, c_min, c_max, "rejecting bolt candidate on a bolt");
            return None;
        }

        let mut forces: Vec<Vec2> = radii
            .iter()
            .map(|r| {
                let c = r.norm();
                let delta = self.model.delta_max * c / c_max;
                r.perp().scaled(self.model.force(delta, self.r_ult) / c)
            })
            .collect();

        align_with_applied(&mut forces, self.applied);
        let balance = field_balance(
            self.group.positions().iter(),
            &forces,
            self.group.properties().centroid,
            self.applied,
        )?;

        Some(Candidate {
            ratio: balance.ratio,
            misalignment: balance.misalignment,
            state: TrialField {
                icr,
                forces,
                resultant: balance.resultant,
            },
        })
    }
}

/// Run the ICR search for a bolt group under an eccentric shear.
///
/// `r_ult` is the nominal bolt capacity divided by its resistance factor.
pub fn solve(
    group: &BoltGroup,
    target: &EquilibriumTarget,
    model: CrawfordKulak,
    r_ult: f64,
    search: &IcrSearchConfig,
) -> Result<IcrSolution, IcrFailure> {
    let evaluator = BoltIcrEvaluator::new(group, target, model, r_ult);
    let line = SearchLine::new(group.properties().centroid, target);
    let region = SearchRegion::new(line, group.positions(), target.eccentricity, group.diameter());
    let result = locate_icr(&evaluator, target.target_ratio, &region, search)?;
    scale_to_applied(&result, &line, target.shear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::AppliedLoad;
    use approx::assert_abs_diff_eq;

    fn solve_default(group: &BoltGroup, load: &AppliedLoad) -> IcrSolution {
        let target = EquilibriumTarget::new(load, group.properties().centroid, group.span());
        solve(
            group,
            &target,
            CrawfordKulak::default(),
            100.0,
            &IcrSearchConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_two_bolts_share_eccentric_shear() {
        // Equilibrium alone fixes the answer: R_near = 150, R_far = 50
        let group = BoltGroup::new(vec![Vec2::new(0.0, 50.0), Vec2::new(0.0, -50.0)], 20.0).unwrap();
        let load = AppliedLoad::shear_at(-100.0, 0.0, 0.0, 100.0);
        let solution = solve_default(&group, &load);

        assert!(solution.converged);
        assert_abs_diff_eq!(solution.forces[0].y, -150.0, epsilon = 0.05);
        assert_abs_diff_eq!(solution.forces[1].y, 50.0, epsilon = 0.05);
        assert_abs_diff_eq!(solution.forces[0].z, 0.0, epsilon = 1e-9);
        // ICR sits between the bolts, just short of the far one
        assert!(solution.icr.z < 0.0 && solution.icr.z > -50.0);
    }

    #[test]
    fn test_symmetric_pattern_keeps_icr_on_axis() {
        let group = BoltGroup::from_pattern(4, 2, 75.0, 90.0, Vec2::default(), 20.0).unwrap();
        let load = AppliedLoad::shear_at(-200_000.0, 0.0, 0.0, 150.0);
        let solution = solve_default(&group, &load);

        assert!(solution.icr.y.abs() < 1e-9);
        let total = crate::solvers::sum_forces(&solution.forces);
        assert_abs_diff_eq!(total.y, -200_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(total.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_oblique_load_on_l_pattern_balances() {
        // Asymmetric L: the ICR leaves the line through the centroid
        let group = BoltGroup::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(75.0, 0.0),
                Vec2::new(150.0, 0.0),
                Vec2::new(0.0, 75.0),
                Vec2::new(0.0, 150.0),
            ],
            20.0,
        )
        .unwrap();
        let load = AppliedLoad::shear_at(-40_000.0, 30_000.0, 200.0, 300.0);
        let target = EquilibriumTarget::new(&load, group.properties().centroid, group.span());
        let solution = solve_default(&group, &load);

        assert!(solution.converged);
        assert!(solution.misalignment <= 1e-6);
        let total = crate::solvers::sum_forces(&solution.forces);
        assert_abs_diff_eq!(total.y, -40_000.0, epsilon = 0.5);
        assert_abs_diff_eq!(total.z, 30_000.0, epsilon = 0.5);

        let centroid = group.properties().centroid;
        let moment: f64 = group
            .positions()
            .iter()
            .zip(&solution.forces)
            .map(|(p, f)| p.minus(centroid).cross(*f))
            .sum();
        assert!((moment - target.moment).abs() <= 1e-5 * target.moment.abs());
    }

    #[test]
    fn test_bolt_force_grows_with_radius() {
        let group = BoltGroup::from_pattern(3, 1, 80.0, 0.0, Vec2::default(), 20.0).unwrap();
        let load = AppliedLoad::shear_at(0.0, 10_000.0, -120.0, 0.0);
        let solution = solve_default(&group, &load);
        let magnitudes: Vec<f64> = solution.forces.iter().map(Vec2::norm).collect();
        let max = magnitudes.iter().cloned().fold(0.0, f64::max);
        let min = magnitudes.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(max > min);
        assert!(solution.scale.is_finite() && solution.scale > 0.0);
    }
}
