//! # Force Distribution Solvers
//!
//! ## Modules
//!
//! - [`icr`] - Generic ICR root finder, search bounds, evaluator trait
//! - [`weld_icr`] - Fillet weld response law for the ICR search
//! - [`bolt_icr`] - Crawford–Kulak bolt response law for the ICR search
//! - [`elastic`] - Closed-form elastic distribution (always available)
//! - [`tension`] - Plate neutral-axis bolt tension distributor
//!
//! The two ICR evaluators share the post-processing in this module: the
//! search line that seeds the center, the sign correction against the
//! applied shear, the equilibrium residuals of a trial field and the final
//! scaling.

pub mod bolt_icr;
pub mod elastic;
pub mod icr;
pub mod tension;
pub mod weld_icr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{perpendicular_direction, Vec2, ZERO_TOLERANCE};
use crate::loads::EquilibriumTarget;
use icr::IcrSearch;

/// Why an ICR analysis could not produce a force field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcrFailure {
    /// Every candidate distance was infeasible
    NoFeasibleCandidate,
    /// The winning candidate gave a non-finite or non-positive scale factor
    InvalidScale,
    /// The best center found stays outside the acceptance residual
    NotConverged,
}

/// Converged (or best-effort) ICR force field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcrSolution {
    /// Instantaneous center of rotation
    pub icr: Vec2,
    /// Signed offset of the ICR from the centroid along the search line
    pub distance: f64,
    /// |ratio - target| achieved
    pub error: f64,
    /// Sine of the angle between the field resultant and the applied shear
    pub misalignment: f64,
    pub converged: bool,
    /// Applied shear / unscaled resultant
    pub scale: f64,
    pub evaluations: usize,
    /// Per-element forces, sign-corrected and scaled
    pub forces: Vec<Vec2>,
}

/// Unscaled element forces for one trial center
#[derive(Debug, Clone, PartialEq)]
pub struct TrialField {
    pub icr: Vec2,
    pub forces: Vec<Vec2>,
    /// Magnitude of the summed forces, P_base
    pub resultant: f64,
}

impl AsRef<TrialField> for TrialField {
    fn as_ref(&self) -> &TrialField {
        self
    }
}

/// Search line through the centroid, oriented by the moment sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLine {
    centroid: Vec2,
    direction: Vec2,
}

impl SearchLine {
    pub fn new(centroid: Vec2, target: &EquilibriumTarget) -> Self {
        SearchLine::through(
            centroid,
            perpendicular_direction(target.fy, target.fz).scaled(target.rotation_sign()),
        )
    }

    pub(crate) fn through(centroid: Vec2, direction: Vec2) -> Self {
        SearchLine { centroid, direction }
    }

    pub fn point_at(&self, distance: f64) -> Vec2 {
        Vec2::new(
            self.centroid.y + self.direction.y * distance,
            self.centroid.z + self.direction.z * distance,
        )
    }

    pub fn signed_distance(&self, point: Vec2) -> f64 {
        point.minus(self.centroid).dot(self.direction)
    }
}

/// Negate every force when their sum opposes the applied shear.
///
/// The trial center assumes one rotation sense; when the resulting field
/// points against the load the whole field is reversed. Returns whether a
/// flip was applied.
pub(crate) fn align_with_applied(forces: &mut [Vec2], applied: Vec2) -> bool {
    let sum = sum_forces(forces);
    if sum.dot(applied) < 0.0 {
        for f in forces.iter_mut() {
            *f = f.scaled(-1.0);
        }
        return true;
    }
    false
}

pub(crate) fn sum_forces(forces: &[Vec2]) -> Vec2 {
    forces
        .iter()
        .fold(Vec2::default(), |acc, f| Vec2::new(acc.y + f.y, acc.z + f.z))
}

/// Equilibrium residuals of an unscaled trial field
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FieldBalance {
    /// Resisting moment over resultant, `Σ(dz·Fy - dy·Fz) / P_base`
    pub ratio: f64,
    /// `(ΣF × P̂) / P_base`, zero when the resultant lies on the shear
    pub misalignment: f64,
    /// P_base
    pub resultant: f64,
}

/// Residuals of `forces` about `centroid` against the `applied` shear.
///
/// Returns `None` when the field has no resultant.
pub(crate) fn field_balance<'a>(
    positions: impl Iterator<Item = &'a Vec2>,
    forces: &[Vec2],
    centroid: Vec2,
    applied: Vec2,
) -> Option<FieldBalance> {
    let sum = sum_forces(forces);
    let resultant = sum.norm();
    let shear = applied.norm();
    if !(resultant >= ZERO_TOLERANCE) || !resultant.is_finite() || !(shear >= ZERO_TOLERANCE) {
        trace!(resultant, "rejecting candidate with vanishing resultant");
        return None;
    }
    let moment: f64 = positions
        .zip(forces)
        .map(|(p, f)| f.cross(p.minus(centroid)))
        .sum();
    Some(FieldBalance {
        ratio: moment / resultant,
        misalignment: sum.cross(applied) / (resultant * shear),
        resultant,
    })
}

/// Scale the winning trial field to the applied shear.
pub(crate) fn scale_to_applied<S: AsRef<TrialField>>(
    search: &IcrSearch<S>,
    line: &SearchLine,
    shear: f64,
) -> Result<IcrSolution, IcrFailure> {
    let field = search.state.as_ref();
    let scale = shear / field.resultant;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(IcrFailure::InvalidScale);
    }
    Ok(IcrSolution {
        icr: field.icr,
        distance: line.signed_distance(field.icr),
        error: search.error,
        misalignment: search.misalignment,
        converged: search.converged,
        scale,
        evaluations: search.evaluations,
        forces: field.forces.iter().map(|f| f.scaled(scale)).collect(),
    })
}
