//! # Weld Group Calculation
//!
//! Stress at every discretized weld point by the elastic method or the
//! instantaneous center of rotation (ICR) method.
//!
//! ## Reported stresses
//!
//! Elastic points carry all six [`StressComponents`] with `k_ds = 1`.
//!
//! ICR points carry the in-plane stress vector `F_i / (a·ds)` in the moment
//! components, together with the directional strength factor `k_ds` the
//! element was loaded at. Dividing by `k_ds` gives the "equivalent base
//! stress", which is compared directly against `φ·0.60·F_EXX`; the summary
//! statistics use it so that both methods share one capacity.
//!
//! ## Example
//!
//! ```rust
//! use joint_core::calculations::weld::analyze;
//! use joint_core::calculations::{AnalysisMethod, MethodUsed};
//! use joint_core::geometry::{FilletWeld, Vec2, WeldGroup, WeldKind, WeldPath};
//! use joint_core::loads::AppliedLoad;
//! use joint_core::settings::AnalysisSettings;
//!
//! let kind = WeldKind::Fillet(FilletWeld::from_leg(8.0).unwrap());
//! let group = WeldGroup::from_paths(&[WeldPath::rectangle(150.0, 75.0, Vec2::default())], kind, 200).unwrap();
//! let load = AppliedLoad::shear_at(-140_000.0, 45_000.0, 20.0, -55.0);
//!
//! let settings = AnalysisSettings::default();
//! let icr = analyze(&group, &load, AnalysisMethod::Icr, &settings).unwrap();
//! let elastic = analyze(&group, &load, AnalysisMethod::Elastic, &settings).unwrap();
//! assert_eq!(icr.method_used, MethodUsed::Icr);
//! assert!(icr.max_stress() < elastic.max_stress());
//! ```

use serde::{Deserialize, Serialize};

use super::{
    attempt_icr, elastic_governs, AnalysisMethod, FallbackReason, IcrDiagnostics, MethodUsed,
    StressComponents,
};
use crate::errors::{JointError, JointResult};
use crate::geometry::{GroupProperties, Vec2, WeldGroup, WeldKind, WeldPath};
use crate::loads::{AppliedLoad, EquilibriumTarget};
use crate::settings::AnalysisSettings;
use crate::solvers::{elastic, weld_icr};

/// Default number of elements a weld input is split into
pub const DEFAULT_DISCRETIZATION: usize = 200;

/// Resistance factor for weld metal in shear (AISC 360 J2)
pub const WELD_RESISTANCE_FACTOR: f64 = 0.75;

fn default_discretization() -> usize {
    DEFAULT_DISCRETIZATION
}

/// Input parameters for a weld group.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "W-1",
///   "paths": [{"vertices": [{"y": -100.0, "z": 0.0}, {"y": 100.0, "z": 0.0}], "closed": false}],
///   "kind": {"type": "Fillet", "leg": 6.0, "throat": 4.242},
///   "load": {"fy": -50000.0, "location": {"x": 0.0, "y": 0.0, "z": 150.0}},
///   "method": "icr"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeldInput {
    /// User label for this weld group (e.g., "W-1", "Bracket weld")
    pub label: String,

    /// Straight-segment weld paths
    pub paths: Vec<WeldPath>,

    pub kind: WeldKind,

    /// Total number of elements across all paths
    #[serde(default = "default_discretization")]
    pub discretization: usize,

    pub load: AppliedLoad,

    #[serde(default)]
    pub method: AnalysisMethod,
}

impl WeldInput {
    pub fn build_group(&self) -> JointResult<WeldGroup> {
        if self.discretization == 0 {
            return Err(JointError::invalid_input(
                "discretization",
                "0",
                "At least one weld element is required",
            ));
        }
        WeldGroup::from_paths(&self.paths, self.kind, self.discretization)
    }
}

/// Stress at one weld point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeldPointStress {
    pub position: Vec2,
    pub components: StressComponents,
    /// Directional strength factor the element was loaded at (1.0 for elastic)
    pub k_ds: f64,
    /// Effective throat area of the element, a·ds
    pub area: f64,
}

impl WeldPointStress {
    /// Resultant stress magnitude
    pub fn stress(&self) -> f64 {
        self.components.resultant()
    }

    /// Stress normalised by k_ds, comparable against φ·0.60·F_EXX
    pub fn equivalent_stress(&self) -> f64 {
        self.stress() / self.k_ds
    }

    /// In-plane force carried by the element
    pub fn force(&self) -> Vec2 {
        Vec2::new(
            self.components.total_y() * self.area,
            self.components.total_z() * self.area,
        )
    }
}

/// Weld group stress results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldResult {
    pub method_requested: AnalysisMethod,
    pub method_used: MethodUsed,
    /// Weld kind label ("fillet", "pjp", ...)
    pub weld_type: String,
    pub throat: f64,
    pub properties: GroupProperties,
    pub points: Vec<WeldPointStress>,
    /// Present only when the ICR search produced the field
    pub icr: Option<IcrDiagnostics>,
}

impl WeldResult {
    /// Largest equivalent stress
    pub fn max_stress(&self) -> f64 {
        self.points
            .iter()
            .map(WeldPointStress::equivalent_stress)
            .fold(0.0, f64::max)
    }

    pub fn min_stress(&self) -> f64 {
        self.points
            .iter()
            .map(WeldPointStress::equivalent_stress)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn mean_stress(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(WeldPointStress::equivalent_stress).sum::<f64>() / self.points.len() as f64
    }

    /// Point with the largest equivalent stress
    pub fn max_point(&self) -> Option<&WeldPointStress> {
        self.points
            .iter()
            .max_by(|a, b| a.equivalent_stress().total_cmp(&b.equivalent_stress()))
    }

    /// Weld metal utilisation per point, u = f / (φ·0.60·F_EXX)
    pub fn utilizations(&self, f_exx: f64, resistance_factor: f64) -> Vec<f64> {
        let capacity = resistance_factor * 0.60 * f_exx;
        self.points
            .iter()
            .map(|p| p.equivalent_stress() / capacity)
            .collect()
    }

    /// Governing utilisation with φ = 0.75
    pub fn utilization(&self, f_exx: f64) -> f64 {
        self.max_stress() / (WELD_RESISTANCE_FACTOR * 0.60 * f_exx)
    }

    /// Sum of element forces in the y-z plane
    pub fn net_force(&self) -> Vec2 {
        self.points.iter().fold(Vec2::default(), |acc, p| {
            let f = p.force();
            Vec2::new(acc.y + f.y, acc.z + f.z)
        })
    }

    /// Counter-clockwise moment of the element forces about `point`
    pub fn net_moment_about(&self, point: Vec2) -> f64 {
        self.points
            .iter()
            .map(|p| {
                let d = p.position.minus(point);
                let f = p.force();
                d.y * f.z - d.z * f.y
            })
            .sum()
    }

    pub fn icr_point(&self) -> Option<Vec2> {
        self.icr.map(|d| d.icr_point)
    }
}

/// Build the group from `input` and analyze it.
pub fn calculate(input: &WeldInput, settings: &AnalysisSettings) -> JointResult<WeldResult> {
    let group = input.build_group()?;
    analyze(&group, &input.load, input.method, settings)
}

/// Analyze a prebuilt weld group.
///
/// # Errors
///
/// - `UnsupportedMethod` when ICR is requested for a non-fillet weld
/// - `OutOfPlaneLoad` when ICR is requested with Fx, My or Mz at the centroid
/// - `DegenerateGeometry` when My or Mz bends a group about an axis it has
///   no second moment about
/// - `InvalidInput` for non-finite loads or invalid settings
pub fn analyze(
    group: &WeldGroup,
    load: &AppliedLoad,
    method: AnalysisMethod,
    settings: &AnalysisSettings,
) -> JointResult<WeldResult> {
    load.validate()?;
    settings.validate()?;

    let target = EquilibriumTarget::new(load, group.properties().centroid, group.span());

    let method_used = match method {
        AnalysisMethod::Elastic => MethodUsed::Elastic,
        AnalysisMethod::Icr => {
            let fillet = match group.kind() {
                WeldKind::Fillet(fillet) => *fillet,
                other => {
                    return Err(JointError::unsupported_method(method.name(), other.name()));
                }
            };
            let out_of_plane = target.out_of_plane_components();
            if !out_of_plane.is_empty() {
                return Err(JointError::out_of_plane(out_of_plane.join(", ")));
            }

            match attempt_icr("weld", &target, || weld_icr::solve(group, fillet, &target, settings)) {
                Ok(result) => {
                    let icr = icr_result(group, method, &target, result);
                    let governs = MethodUsed::ElasticFallback(FallbackReason::ElasticGoverns);
                    let elastic = elastic_result(group, load, method, governs)?;
                    if elastic_governs("weld", icr.max_stress(), elastic.max_stress(), settings.search.tolerance) {
                        return Ok(elastic);
                    }
                    return Ok(icr);
                }
                Err(reason) => MethodUsed::ElasticFallback(reason),
            }
        }
    };

    elastic_result(group, load, method, method_used)
}

fn elastic_result(
    group: &WeldGroup,
    load: &AppliedLoad,
    method: AnalysisMethod,
    method_used: MethodUsed,
) -> JointResult<WeldResult> {
    let points = group
        .elements()
        .iter()
        .zip(elastic::weld_stresses(group, load)?)
        .enumerate()
        .map(|(i, (el, components))| WeldPointStress {
            position: el.position,
            components,
            k_ds: 1.0,
            area: group.element_area(i),
        })
        .collect();

    Ok(WeldResult {
        method_requested: method,
        method_used,
        weld_type: group.kind().name().to_string(),
        throat: group.throat(),
        properties: *group.properties(),
        points,
        icr: None,
    })
}

fn icr_result(
    group: &WeldGroup,
    method: AnalysisMethod,
    target: &EquilibriumTarget,
    result: weld_icr::WeldIcrSolution,
) -> WeldResult {
    let solution = &result.solution;
    let points = group
        .elements()
        .iter()
        .zip(&solution.forces)
        .zip(&result.directional_factors)
        .enumerate()
        .map(|(i, ((el, force), k_ds))| {
            let area = group.element_area(i);
            WeldPointStress {
                position: el.position,
                components: StressComponents {
                    moment_y: force.y / area,
                    moment_z: force.z / area,
                    ..Default::default()
                },
                k_ds: *k_ds,
                area,
            }
        })
        .collect();

    WeldResult {
        method_requested: method,
        method_used: MethodUsed::Icr,
        weld_type: group.kind().name().to_string(),
        throat: group.throat(),
        properties: *group.properties(),
        points,
        icr: Some(IcrDiagnostics::new(solution, target)),
    }
}
