//! # Connection Calculations
//!
//! User-facing analyses. Each calculation follows the pattern:
//!
//! - `*Input` - Connection definition plus load (JSON-serializable)
//! - `*Result` - Per-element forces/stresses and diagnostics (JSON-serializable)
//! - `calculate(input, settings) -> JointResult<*Result>` - Pure calculation function
//!
//! Prebuilt groups can skip the input layer and call `analyze` directly.
//!
//! ## Method Resolution
//!
//! An ICR request does not always run the ICR search. Loads with no shear
//! or no moment about the centroid are solved exactly by the elastic
//! method, and a search that finds no feasible candidate, or none close
//! enough to equilibrium, degrades to it as well.
//!
//! The elastic distribution is also the upper bound. An ICR field whose peak
//! is more severe than the elastic peak is discarded in favour of the
//! elastic one, reported as [`FallbackReason::ElasticGoverns`].
//!
//! Every result records the method actually used in [`MethodUsed`], so a
//! caller can tell a real ICR field from a fallback.
//!
//! ## Available Calculations
//!
//! - [`weld`] - Weld group stress (elastic or ICR, fillet welds only for ICR)
//! - [`bolt`] - Bolt group shear (elastic or ICR) and plate tension

pub mod bolt;
pub mod weld;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::JointResult;
use crate::geometry::Vec2;
use crate::loads::{EquilibriumTarget, LoadRegime};
use crate::settings::AnalysisSettings;
use crate::solvers::{sum_forces, IcrFailure, IcrSolution};

pub use crate::solvers::elastic::StressComponents;
pub use bolt::{BoltCapacity, BoltConnection, BoltForce, BoltInput, BoltResult};
pub use weld::{WeldInput, WeldPointStress, WeldResult};

/// Requested force distribution method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Elastic,
    #[default]
    Icr,
}

impl AnalysisMethod {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisMethod::Elastic => "elastic",
            AnalysisMethod::Icr => "icr",
        }
    }
}

/// Why an ICR request was answered with the elastic distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoInPlaneLoad,
    PureShear,
    PureTorsion,
    NoFeasibleCandidate,
    InvalidScale,
    /// The search ended outside the acceptance residual
    NotConverged,
    /// The ICR peak exceeded the elastic peak
    ElasticGoverns,
}

impl FallbackReason {
    /// Reason a load regime skips the search, `None` for eccentric shear
    pub fn for_regime(regime: LoadRegime) -> Option<Self> {
        match regime {
            LoadRegime::NoInPlaneLoad => Some(FallbackReason::NoInPlaneLoad),
            LoadRegime::PureShear => Some(FallbackReason::PureShear),
            LoadRegime::PureTorsion => Some(FallbackReason::PureTorsion),
            LoadRegime::Eccentric => None,
        }
    }
}

impl From<IcrFailure> for FallbackReason {
    fn from(failure: IcrFailure) -> Self {
        match failure {
            IcrFailure::NoFeasibleCandidate => FallbackReason::NoFeasibleCandidate,
            IcrFailure::InvalidScale => FallbackReason::InvalidScale,
            IcrFailure::NotConverged => FallbackReason::NotConverged,
        }
    }
}

/// Method that produced a result's force field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "reason", rename_all = "snake_case")]
pub enum MethodUsed {
    Elastic,
    Icr,
    ElasticFallback(FallbackReason),
}

impl MethodUsed {
    pub fn is_icr(&self) -> bool {
        matches!(self, MethodUsed::Icr)
    }
}

/// Search diagnostics attached to an ICR result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcrDiagnostics {
    pub icr_point: Vec2,
    /// Projection of the ICR on the line through the centroid perpendicular
    /// to the shear, measured from the centroid
    pub distance: f64,
    /// |ratio - target| at the returned ICR
    pub achieved_error: f64,
    /// Sine of the angle between the field resultant and the applied shear
    pub misalignment: f64,
    pub converged: bool,
    pub scale: f64,
    pub evaluations: usize,
    /// |ΣF - (Fy, Fz)| of the scaled field
    pub force_residual: f64,
}

impl IcrDiagnostics {
    pub(crate) fn new(solution: &IcrSolution, target: &EquilibriumTarget) -> Self {
        let total = sum_forces(&solution.forces);
        IcrDiagnostics {
            icr_point: solution.icr,
            distance: solution.distance,
            achieved_error: solution.error,
            misalignment: solution.misalignment,
            converged: solution.converged,
            scale: solution.scale,
            evaluations: solution.evaluations,
            force_residual: total.minus(Vec2::new(target.fy, target.fz)).norm(),
        }
    }
}

/// Run `solve` unless the load regime or the search says otherwise.
///
/// `Err` carries the reason the caller has to use the elastic method.
pub(crate) fn attempt_icr<T>(
    group: &'static str,
    target: &EquilibriumTarget,
    solve: impl FnOnce() -> Result<T, IcrFailure>,
) -> Result<T, FallbackReason> {
    if let Some(reason) = FallbackReason::for_regime(target.regime) {
        debug!(group, regime = ?target.regime, "load regime solved exactly by elastic method");
        return Err(reason);
    }
    solve().map_err(|failure| {
        warn!(
            group,
            failure = ?failure,
            shear = target.shear,
            moment = target.moment,
            "ICR analysis failed, falling back to elastic distribution"
        );
        FallbackReason::from(failure)
    })
}

/// Whether the elastic field bounds the ICR field, comparing peak demands.
///
/// `tolerance` is the relative slack the search tolerance leaves on the ICR
/// peak; where statics alone fix the field both methods agree to within it.
pub(crate) fn elastic_governs(group: &'static str, icr_peak: f64, elastic_peak: f64, tolerance: f64) -> bool {
    if icr_peak > elastic_peak * (1.0 + tolerance) {
        debug!(group, icr_peak, elastic_peak, "ICR peak exceeds elastic peak, reporting elastic field");
        return true;
    }
    false
}

/// Enum wrapper for all calculation types.
///
/// This allows storing heterogeneous calculations in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Weld group stress calculation
    Weld(WeldInput),
    /// Bolt group force calculation
    Bolt(BoltInput),
}

/// Result of a [`CalculationItem`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Weld(WeldResult),
    Bolt(BoltResult),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Weld(w) => &w.label,
            CalculationItem::Bolt(b) => &b.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Weld(_) => "Weld",
            CalculationItem::Bolt(_) => "Bolt",
        }
    }

    pub fn calculate(&self, settings: &AnalysisSettings) -> JointResult<CalculationOutput> {
        match self {
            CalculationItem::Weld(input) => weld::calculate(input, settings).map(CalculationOutput::Weld),
            CalculationItem::Bolt(input) => bolt::calculate(input, settings).map(CalculationOutput::Bolt),
        }
    }
}
