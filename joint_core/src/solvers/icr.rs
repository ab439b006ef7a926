//! # ICR Root Finder
//!
//! Generic search for the instantaneous center of rotation in the y-z plane.
//!
//! A trial center produces an unscaled element field. Two residuals measure
//! how far that field is from equilibrium with the applied shear:
//!
//! - misalignment: sine of the angle between the field resultant and the
//!   applied shear, `(ΣF × P̂) / |ΣF|`
//! - moment: the resisting moment ratio `M_base / P_base` minus the target
//!   ratio `-M / P`
//!
//! Both vanish at the true ICR, after which scaling the field to the applied
//! shear satisfies ΣFy, ΣFz and ΣM together. The response law is supplied
//! through [`ResponseEvaluator`]; the search knows nothing about welds or
//! bolts.
//!
//! ## Algorithm
//!
//! 1. Line seed: the search line through the centroid perpendicular to the
//!    shear is swept with log-spaced distances across `[dist_min, dist_max]`
//!    plus the eccentricity |M|/P. Every sign change of the moment residual
//!    between consecutive feasible candidates is a bracket.
//!
//!    The ratio has a pole wherever the trial resultant passes through zero,
//!    and the residual changes sign across it too. A root has small residuals
//!    on both sides while a pole has large ones, so the bracket with the
//!    smallest `|r_lo| + |r_hi|` is bisected rather than the first one.
//!    For a group symmetric about the load line the misalignment is zero
//!    along the whole line and the seed is already the answer.
//! 2. Plane refinement: Newton steps on both residuals with a
//!    finite-difference Jacobian, capped at the group length and
//!    backtracked until the combined residual decreases.
//! 3. Grid restart: if the seed does not converge, the padded bounding box
//!    of the elements is sampled and Newton restarts from the best points.
//! 4. Acceptance: the best center found is returned with its residuals. A
//!    center whose normalized residual exceeds `acceptance` is rejected with
//!    [`IcrFailure::NotConverged`] so the caller can fall back.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{IcrFailure, SearchLine};
use crate::errors::{JointError, JointResult};
use crate::geometry::{Vec2, POSITION_TOLERANCE};

/// Finite-difference step relative to the group length
const JACOBIAN_STEP: f64 = 1e-7;

/// Step halvings tried before a Newton iteration gives up
const BACKTRACK_LIMIT: usize = 20;

/// Bounding box padding relative to the group length
const GRID_PADDING: f64 = 0.1;

/// Search budget and tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcrSearchConfig {
    /// Coarse candidates never exceed twice this
    pub max_iterations: usize,
    /// Relative tolerance on the moment/shear ratio and on the misalignment
    pub tolerance: f64,
    /// Number of log-spaced coarse candidates
    pub min_candidates: usize,
    /// Bisect a bracket found in the coarse phase
    pub refine_bisection: bool,
    pub bisection_iterations: usize,
    /// Newton iterations per start point in the plane
    pub newton_iterations: usize,
    /// Points per side of the restart grid
    pub grid_resolution: usize,
    /// Grid points Newton is restarted from
    pub grid_restarts: usize,
    /// Largest normalized residual still reported as an ICR field
    pub acceptance: f64,
}

impl Default for IcrSearchConfig {
    fn default() -> Self {
        IcrSearchConfig {
            max_iterations: 100,
            tolerance: 1e-6,
            min_candidates: 60,
            refine_bisection: true,
            bisection_iterations: 20,
            newton_iterations: 30,
            grid_resolution: 7,
            grid_restarts: 3,
            acceptance: 1e-3,
        }
    }
}

impl IcrSearchConfig {
    pub fn validate(&self) -> JointResult<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(JointError::invalid_input(
                "search.tolerance",
                self.tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if self.min_candidates < 2 || self.max_iterations == 0 {
            return Err(JointError::invalid_input(
                "search.min_candidates",
                self.min_candidates.to_string(),
                "At least two coarse candidates and one iteration are required",
            ));
        }
        if self.grid_resolution == 1 {
            return Err(JointError::invalid_input(
                "search.grid_resolution",
                "1",
                "The restart grid needs at least two points per side, or zero to disable it",
            ));
        }
        if !(self.acceptance >= self.tolerance) || !self.acceptance.is_finite() {
            return Err(JointError::invalid_input(
                "search.acceptance",
                self.acceptance.to_string(),
                "Acceptance must be finite and no tighter than the tolerance",
            ));
        }
        Ok(())
    }

    fn candidate_count(&self) -> usize {
        self.min_candidates.min(self.max_iterations * 2).max(2)
    }
}

/// Interval searched along the line, `0 < dist_min < dist_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub dist_min: f64,
    pub dist_max: f64,
}

/// Bracket for the ICR distance along the search line.
///
/// # Formula
/// L = max(span, 2·size, 1)
///
/// d_min = max(1e-9, 0.02·L, 0.1·size)
///
/// d_max = max(50·d_min, 10·L, 5·e)
///
/// # Arguments
/// * `span` - Largest extent of the element set along y or z
/// * `eccentricity` - |M| / P
/// * `characteristic_size` - Weld leg or bolt diameter
pub fn search_bounds(span: f64, eccentricity: f64, characteristic_size: f64) -> SearchBounds {
    let char_length = span.max(2.0 * characteristic_size).max(1.0);
    let dist_min = POSITION_TOLERANCE
        .max(0.02 * char_length)
        .max(0.1 * characteristic_size);
    let mut dist_max = (50.0 * dist_min)
        .max(10.0 * char_length)
        .max(5.0 * eccentricity);
    if dist_max <= dist_min {
        dist_max = 10.0 * dist_min;
    }
    SearchBounds { dist_min, dist_max }
}

/// Where the ICR is looked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRegion {
    pub line: SearchLine,
    pub bounds: SearchBounds,
    /// |M| / P, tried as an extra line distance
    pub eccentricity: f64,
    /// max(span, 1): Newton step cap and finite-difference scale
    pub length: f64,
    /// Padded bounding box corners of the elements
    pub lower: Vec2,
    pub upper: Vec2,
}

impl SearchRegion {
    pub fn new<'a>(
        line: SearchLine,
        positions: impl IntoIterator<Item = &'a Vec2>,
        eccentricity: f64,
        characteristic_size: f64,
    ) -> Self {
        let (lower, upper) = positions.into_iter().fold(
            (
                Vec2::new(f64::INFINITY, f64::INFINITY),
                Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), p| {
                (
                    Vec2::new(lo.y.min(p.y), lo.z.min(p.z)),
                    Vec2::new(hi.y.max(p.y), hi.z.max(p.z)),
                )
            },
        );
        let span = if lower.is_finite() && upper.is_finite() {
            (upper.y - lower.y).max(upper.z - lower.z)
        } else {
            0.0
        };
        let length = span.max(1.0);
        let pad = GRID_PADDING * length;
        SearchRegion {
            line,
            bounds: search_bounds(span, eccentricity, characteristic_size),
            eccentricity,
            length,
            lower: Vec2::new(lower.y - pad, lower.z - pad),
            upper: Vec2::new(upper.y + pad, upper.z + pad),
        }
    }
}

/// Outcome of one trial center.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<S> {
    /// Observed moment/shear ratio M_base / P_base
    pub ratio: f64,
    /// Sine of the angle from the applied shear to the field resultant
    pub misalignment: f64,
    /// Per-element data kept only if this candidate wins
    pub state: S,
}

/// A per-element response law evaluated at a trial ICR.
///
/// Implementations must be pure: the same center always gives the same
/// answer, whatever order candidates are tried in.
pub trait ResponseEvaluator {
    /// Per-element data produced by a candidate
    type State;

    /// Evaluate a trial center; `None` marks the candidate infeasible.
    fn evaluate(&self, icr: Vec2) -> Option<Candidate<Self::State>>;
}

/// Result of [`locate_icr`].
#[derive(Debug, Clone, PartialEq)]
pub struct IcrSearch<S> {
    pub icr: Vec2,
    /// |ratio - target| at `icr`
    pub error: f64,
    /// |misalignment| at `icr`
    pub misalignment: f64,
    /// Whether both residuals are within tolerance
    pub converged: bool,
    /// Number of evaluator calls made
    pub evaluations: usize,
    pub state: S,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Residual {
    misalignment: f64,
    moment: f64,
}

struct Trial<S> {
    point: Vec2,
    residual: Residual,
    state: S,
}

/// Sign change of the moment residual between two consecutive candidates
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lo: f64,
    residual_lo: f64,
    hi: f64,
    /// |residual_lo| + |residual_hi|
    span: f64,
}

/// `n` log-spaced values from `lo` to `hi` inclusive
fn geomspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![lo];
    }
    let ratio = hi / lo;
    (0..n)
        .map(|i| {
            if i + 1 == n {
                hi
            } else {
                lo * ratio.powf(i as f64 / (n - 1) as f64)
            }
        })
        .collect()
}

struct Search<'a, E: ResponseEvaluator> {
    evaluator: &'a E,
    config: &'a IcrSearchConfig,
    target_ratio: f64,
    /// max(1, |target|), puts both residuals on the moment scale
    scale: f64,
    evaluations: usize,
}

impl<'a, E: ResponseEvaluator> Search<'a, E> {
    fn trial(&mut self, point: Vec2) -> Option<Trial<E::State>> {
        self.evaluations += 1;
        let candidate = self.evaluator.evaluate(point)?;
        let residual = Residual {
            misalignment: candidate.misalignment,
            moment: candidate.ratio - self.target_ratio,
        };
        if !residual.misalignment.is_finite() || !residual.moment.is_finite() {
            trace!(y = point.y, z = point.z, "rejecting candidate with non-finite residual");
            return None;
        }
        Some(Trial {
            point,
            residual,
            state: candidate.state,
        })
    }

    fn norm(&self, r: &Residual) -> f64 {
        (r.misalignment * self.scale).hypot(r.moment)
    }

    fn is_converged(&self, r: &Residual) -> bool {
        r.misalignment.abs() <= self.config.tolerance
            && r.moment.abs() <= self.config.tolerance * self.scale
    }

    /// Larger of the two residuals, each relative to its own tolerance scale
    fn normalized(&self, r: &Residual) -> f64 {
        r.misalignment.abs().max(r.moment.abs() / self.scale)
    }

    fn keep_better(&self, best: Option<Trial<E::State>>, next: Trial<E::State>) -> Option<Trial<E::State>> {
        match best {
            Some(b) if self.norm(&b.residual) <= self.norm(&next.residual) => Some(b),
            _ => Some(next),
        }
    }

    /// Sweep and bisect the moment residual along the search line.
    fn line_seed(&mut self, region: &SearchRegion) -> Option<Trial<E::State>> {
        let tolerance = self.config.tolerance * self.scale;
        let bounds = region.bounds;

        let mut distances = geomspace(bounds.dist_min, bounds.dist_max, self.config.candidate_count());
        if region.eccentricity > bounds.dist_min {
            distances.push(region.eccentricity);
            distances.sort_by(f64::total_cmp);
            distances.dedup();
        }

        let mut best: Option<Trial<E::State>> = None;
        let mut previous: Option<(f64, f64)> = None;
        let mut bracket: Option<Bracket> = None;

        for &distance in &distances {
            let Some(trial) = self.trial(region.line.point_at(distance)) else {
                continue;
            };
            let residual = trial.residual.moment;
            if residual.abs() <= tolerance {
                debug!(distance, error = residual.abs(), evaluations = self.evaluations, "line seed converged in coarse phase");
                return Some(trial);
            }

            if let Some((prev_distance, prev_residual)) = previous {
                if residual * prev_residual < 0.0 {
                    let span = residual.abs() + prev_residual.abs();
                    if bracket.as_ref().map_or(true, |b| span < b.span) {
                        bracket = Some(Bracket {
                            lo: prev_distance,
                            residual_lo: prev_residual,
                            hi: distance,
                            span,
                        });
                    }
                }
            }
            previous = Some((distance, residual));
            best = self.keep_moment_better(best, trial);
        }

        if !self.config.refine_bisection {
            return best;
        }
        let Some(Bracket {
            mut lo,
            mut residual_lo,
            mut hi,
            ..
        }) = bracket
        else {
            return best;
        };

        for _ in 0..self.config.bisection_iterations {
            let mid = 0.5 * (lo + hi);
            let Some(trial) = self.trial(region.line.point_at(mid)) else {
                break;
            };
            let residual = trial.residual.moment;
            if residual.abs() <= tolerance {
                debug!(distance = mid, error = residual.abs(), evaluations = self.evaluations, "line seed converged by bisection");
                return Some(trial);
            }
            if residual * residual_lo < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                residual_lo = residual;
            }
            best = self.keep_moment_better(best, trial);
        }
        best
    }

    fn keep_moment_better(&self, best: Option<Trial<E::State>>, next: Trial<E::State>) -> Option<Trial<E::State>> {
        match best {
            Some(b) if b.residual.moment.abs() <= next.residual.moment.abs() => Some(b),
            _ => Some(next),
        }
    }

    /// Damped Newton on both residuals from `current`.
    fn refine(&mut self, mut current: Trial<E::State>, length: f64) -> Trial<E::State> {
        let h = JACOBIAN_STEP * length;
        for _ in 0..self.config.newton_iterations {
            if self.is_converged(&current.residual) {
                break;
            }
            let r = current.residual;
            let p = current.point;

            let Some(along_y) = self.trial(Vec2::new(p.y + h, p.z)) else {
                break;
            };
            let Some(along_z) = self.trial(Vec2::new(p.y, p.z + h)) else {
                break;
            };
            let a = (along_y.residual.misalignment - r.misalignment) / h;
            let c = (along_y.residual.moment - r.moment) / h;
            let b = (along_z.residual.misalignment - r.misalignment) / h;
            let d = (along_z.residual.moment - r.moment) / h;

            let det = a * d - b * c;
            if det == 0.0 || !det.is_finite() {
                trace!(y = p.y, z = p.z, "singular Jacobian, stopping Newton");
                break;
            }
            let mut step = Vec2::new(
                (-r.misalignment * d + r.moment * b) / det,
                (-a * r.moment + c * r.misalignment) / det,
            );
            let step_length = step.norm();
            if step_length > length {
                step = step.scaled(length / step_length);
            }

            let start_norm = self.norm(&r);
            let mut t = 1.0;
            let mut improved = None;
            for _ in 0..BACKTRACK_LIMIT {
                let next = Vec2::new(p.y + t * step.y, p.z + t * step.z);
                if let Some(trial) = self.trial(next) {
                    if self.norm(&trial.residual) < start_norm {
                        improved = Some(trial);
                        break;
                    }
                }
                t *= 0.5;
            }
            match improved {
                Some(trial) => current = trial,
                None => break,
            }
        }
        current
    }

    /// Grid points over the padded bounding box, best residual first
    fn grid(&mut self, region: &SearchRegion) -> Vec<(f64, Vec2)> {
        let n = self.config.grid_resolution;
        if n < 2 {
            return Vec::new();
        }
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let y = region.lower.y + (region.upper.y - region.lower.y) * i as f64 / (n - 1) as f64;
                let z = region.lower.z + (region.upper.z - region.lower.z) * j as f64 / (n - 1) as f64;
                let point = Vec2::new(y, z);
                if let Some(trial) = self.trial(point) {
                    points.push((self.norm(&trial.residual), point));
                }
            }
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }
}

/// Find the rotation center whose field balances the applied shear and moment.
///
/// # Errors
///
/// - [`IcrFailure::NoFeasibleCandidate`] when no trial center was feasible
/// - [`IcrFailure::NotConverged`] when the best center is further from
///   equilibrium than `config.acceptance`
pub fn locate_icr<E: ResponseEvaluator>(
    evaluator: &E,
    target_ratio: f64,
    region: &SearchRegion,
    config: &IcrSearchConfig,
) -> Result<IcrSearch<E::State>, IcrFailure> {
    let mut search = Search {
        evaluator,
        config,
        target_ratio,
        scale: target_ratio.abs().max(1.0),
        evaluations: 0,
    };

    let mut best = search
        .line_seed(region)
        .map(|seed| search.refine(seed, region.length));

    if !best.as_ref().is_some_and(|b| search.is_converged(&b.residual)) {
        let starts = search.grid(region);
        debug!(
            starts = starts.len(),
            evaluations = search.evaluations,
            "line seed did not converge, restarting from grid"
        );
        for &(_, point) in starts.iter().take(config.grid_restarts) {
            let Some(start) = search.trial(point) else {
                continue;
            };
            let refined = search.refine(start, region.length);
            best = search.keep_better(best, refined);
            if best.as_ref().is_some_and(|b| search.is_converged(&b.residual)) {
                break;
            }
        }
    }

    let best = best.ok_or(IcrFailure::NoFeasibleCandidate)?;
    let converged = search.is_converged(&best.residual);
    let normalized = search.normalized(&best.residual);
    if !converged && normalized > config.acceptance {
        debug!(
            y = best.point.y,
            z = best.point.z,
            normalized,
            evaluations = search.evaluations,
            "ICR search could not approach equilibrium"
        );
        return Err(IcrFailure::NotConverged);
    }

    debug!(
        y = best.point.y,
        z = best.point.z,
        converged,
        normalized,
        evaluations = search.evaluations,
        "ICR search finished"
    );
    Ok(IcrSearch {
        icr: best.point,
        error: best.residual.moment.abs(),
        misalignment: best.residual.misalignment.abs(),
        converged,
        evaluations: search.evaluations,
        state: best.state,
    })
}
