//! # Fillet Weld ICR Evaluator
//!
//! For a trial center every element deforms perpendicular to its radius,
//! proportionally to its distance `c` from the center. The element that
//! first reaches its own ultimate deformation Δu(θ) sets the global scale
//! λ = min(Δu_i / c_i); each element then sits at Δ_i = min(λ·c_i, Δu_i) on
//! the AISC stress curve, and the force is stress × throat × arc length.
//!
//! Only fillet welds have this curve, so the evaluator takes a
//! [`FilletWeld`] directly: groove, plug and slot welds cannot reach it.

use tracing::trace;

use super::icr::{locate_icr, Candidate, ResponseEvaluator, SearchRegion};
use super::{
    align_with_applied, field_balance, scale_to_applied, IcrFailure, IcrSolution, SearchLine,
    TrialField,
};
use crate::equations::{deformation_limits, directional_factor, fillet_weld_stress, load_angle};
use crate::geometry::{FilletWeld, Vec2, WeldGroup, POSITION_TOLERANCE};
use crate::loads::EquilibriumTarget;
use crate::settings::AnalysisSettings;

/// ICR result for a fillet weld group
#[derive(Debug, Clone, PartialEq)]
pub struct WeldIcrSolution {
    pub solution: IcrSolution,
    /// Directional strength factor k_ds at each element (1.0 when disabled)
    pub directional_factors: Vec<f64>,
}

/// Unscaled weld field plus the k_ds each element was loaded at
#[derive(Debug, Clone, PartialEq)]
pub struct WeldTrial {
    pub field: TrialField,
    pub directional_factors: Vec<f64>,
}

impl AsRef<TrialField> for WeldTrial {
    fn as_ref(&self) -> &TrialField {
        &self.field
    }
}

/// Evaluates the fillet weld response at a trial ICR.
pub struct WeldIcrEvaluator<'a> {
    group: &'a WeldGroup,
    fillet: FilletWeld,
    applied: Vec2,
    f_exx: f64,
    directional_strength: bool,
}

impl<'a> WeldIcrEvaluator<'a> {
    pub fn new(
        group: &'a WeldGroup,
        fillet: FilletWeld,
        target: &EquilibriumTarget,
        settings: &AnalysisSettings,
    ) -> Self {
        WeldIcrEvaluator {
            group,
            fillet,
            applied: Vec2::new(target.fy, target.fz),
            f_exx: settings.reference_f_exx,
            directional_strength: settings.include_directional_strength,
        }
    }
}

impl ResponseEvaluator for WeldIcrEvaluator<'_> {
    type State = WeldTrial;

    fn evaluate(&self, icr: Vec2) -> Option<Candidate<WeldTrial>> {
        let leg = self.fillet.leg;

        let kinematics: Vec<_> = self
            .group
            .elements()
            .iter()
            .map(|el| {
                let r = el.position.minus(icr);
                let c = r.norm().max(POSITION_TOLERANCE);
                let direction = r.perp().scaled(1.0 / c);
                let theta = load_angle(direction, el.tangent);
                (c, direction, theta, deformation_limits(theta, leg))
            })
            .collect();

        let lambda = kinematics
            .iter()
            .map(|(c, _, _, limits)| limits.ultimate / c)
            .fold(f64::INFINITY, f64::min);
        if !lambda.is_finite() || lambda <= 0.0 {
            trace!(y = icr.y, z = icr.z, lambda, "rejecting weld candidate with invalid deformation scale");
            return None;
        }

        let throat = self.group.throat();
        let (mut forces, directional_factors): (Vec<Vec2>, Vec<f64>) = self
            .group
            .elements()
            .iter()
            .zip(&kinematics)
            .map(|(el, (c, direction, theta, limits))| {
                let k_ds = if self.directional_strength {
                    directional_factor(*theta)
                } else {
                    1.0
                };
                let delta = (lambda * c).min(limits.ultimate);
                let stress = fillet_weld_stress(delta, *limits, self.f_exx, k_ds);
                (direction.scaled(stress * throat * el.length), k_ds)
            })
            .unzip();

        align_with_applied(&mut forces, self.applied);
        let positions = self.group.elements().iter().map(|el| &el.position);
        let balance = field_balance(positions, &forces, self.group.properties().centroid, self.applied)?;

        Some(Candidate {
            ratio: balance.ratio,
            misalignment: balance.misalignment,
            state: WeldTrial {
                field: TrialField {
                    icr,
                    forces,
                    resultant: balance.resultant,
                },
                directional_factors,
            },
        })
    }
}

/// Run the ICR search for a fillet weld group under an eccentric shear.
pub fn solve(
    group: &WeldGroup,
    fillet: FilletWeld,
    target: &EquilibriumTarget,
    settings: &AnalysisSettings,
) -> Result<WeldIcrSolution, IcrFailure> {
    let evaluator = WeldIcrEvaluator::new(group, fillet, target, settings);
    let line = SearchLine::new(group.properties().centroid, target);
    let region = SearchRegion::new(
        line,
        group.elements().iter().map(|el| &el.position),
        target.eccentricity,
        fillet.leg,
    );
    let search = locate_icr(&evaluator, target.target_ratio, &region, &settings.search)?;
    let solution = scale_to_applied(&search, &line, target.shear)?;

    Ok(WeldIcrSolution {
        solution,
        directional_factors: search.state.directional_factors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{WeldKind, WeldPath};
    use crate::loads::AppliedLoad;

    fn channel() -> (WeldGroup, FilletWeld) {
        // C-shaped weld: two flanges and a web, open toward +z
        let fillet = FilletWeld::from_leg(6.0).unwrap();
        let path = WeldPath::open(vec![
            Vec2::new(100.0, 80.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(-100.0, 0.0),
            Vec2::new(-100.0, 80.0),
        ]);
        let group = WeldGroup::from_paths(&[path], WeldKind::Fillet(fillet), 180).unwrap();
        (group, fillet)
    }

    #[test]
    fn test_candidate_field_is_aligned_with_load() {
        let (group, fillet) = channel();
        let load = AppliedLoad::shear_at(-50_000.0, 0.0, 0.0, 250.0);
        let target = EquilibriumTarget::new(&load, group.properties().centroid, group.span());
        let settings = AnalysisSettings::default();
        let evaluator = WeldIcrEvaluator::new(&group, fillet, &target, &settings);

        let candidate = evaluator.evaluate(Vec2::new(0.0, -40.0)).unwrap();
        let trial = candidate.state;
        let sum = crate::solvers::sum_forces(&trial.field.forces);
        assert!(sum.dot(Vec2::new(-1.0, 0.0)) > 0.0);
        assert_eq!(trial.directional_factors.len(), group.len());
        assert!(trial.directional_factors.iter().all(|k| (1.0..=1.5).contains(k)));
        // Symmetric about y = 0: a center on that axis leaves no misalignment
        assert!(candidate.misalignment.abs() < 1e-12);
    }

    #[test]
    fn test_distant_center_is_still_feasible() {
        // λ = Δu / c is tiny this far out but still a valid deformation scale
        let (group, fillet) = channel();
        let load = AppliedLoad::shear_at(-50_000.0, 0.0, 0.0, 250.0);
        let target = EquilibriumTarget::new(&load, group.properties().centroid, group.span());
        let settings = AnalysisSettings::default();
        let evaluator = WeldIcrEvaluator::new(&group, fillet, &target, &settings);

        let candidate = evaluator.evaluate(Vec2::new(0.0, -1.0e11)).unwrap();
        assert!(candidate.ratio.is_finite());
        assert!(candidate.state.field.resultant > 0.0);
    }

    #[test]
    fn test_oblique_load_on_asymmetric_group_balances() {
        // Channel loaded at 60 degrees: the ICR leaves the line through the centroid
        let (group, fillet) = channel();
        let centroid = group.properties().centroid;
        let load = AppliedLoad::shear_at(-50_000.0, 86_602.540378, -346.410162, -200.0);
        let target = EquilibriumTarget::new(&load, centroid, group.span());
        let line = SearchLine::new(centroid, &target);
        let result = solve(&group, fillet, &target, &AnalysisSettings::default()).unwrap();
        let solution = result.solution;

        assert!(solution.converged);
        assert!(solution.misalignment <= 1e-6);
        let off_line = solution.icr.minus(line.point_at(solution.distance)).norm();
        assert!(off_line > 1.0);

        let sum = crate::solvers::sum_forces(&solution.forces);
        assert!(sum.minus(Vec2::new(target.fy, target.fz)).norm() < 1e-5 * target.shear);
    }

    #[test]
    fn test_solution_balances_symmetric_channel() {
        // Channel is symmetric about y = 0, shear along y: the resultant must
        // stay on the load line and the ICR on the z-axis through the centroid
        let (group, fillet) = channel();
        let centroid = group.properties().centroid;
        let load = AppliedLoad::shear_at(-50_000.0, 0.0, 0.0, 250.0);
        let target = EquilibriumTarget::new(&load, centroid, group.span());
        let result = solve(&group, fillet, &target, &AnalysisSettings::default()).unwrap();
        let solution = result.solution;

        assert!(solution.converged);
        assert!(solution.scale > 0.0);
        assert!(solution.icr.y.abs() < 1e-9);

        let sum = crate::solvers::sum_forces(&solution.forces);
        assert!((sum.y + 50_000.0).abs() < 1e-6 * 50_000.0);
        assert!(sum.z.abs() < 1e-6 * 50_000.0);

        let moment: f64 = group
            .elements()
            .iter()
            .zip(&solution.forces)
            .map(|(el, f)| el.position.minus(centroid).cross(*f))
            .sum();
        let tol = AnalysisSettings::default().search.tolerance * target.target_ratio.abs().max(1.0);
        assert!((moment - target.moment).abs() <= tol * target.shear * 1.0001);
    }

    #[test]
    fn test_directional_strength_can_be_disabled() {
        let (group, fillet) = channel();
        let load = AppliedLoad::shear_at(-50_000.0, 0.0, 0.0, 250.0);
        let target = EquilibriumTarget::new(&load, group.properties().centroid, group.span());
        let settings = AnalysisSettings {
            include_directional_strength: false,
            ..Default::default()
        };
        let result = solve(&group, fillet, &target, &settings).unwrap();
        assert!(result.directional_factors.iter().all(|k| *k == 1.0));
    }
}
