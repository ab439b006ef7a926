//! # Plate Neutral-Axis Bolt Tension
//!
//! Out-of-plane bolt tension from bending of a rigid bearing plate. Each
//! bending moment is handled on its own axis and the results are summed:
//!
//! - `My` bends across the plate z-depth (bolts grouped by z)
//! - `Mz` bends across the plate y-depth (bolts grouped by y)
//!
//! For one axis the compression edge follows the moment sign (a positive
//! moment puts tension on the + side), the neutral axis sits at mid-depth
//! or d/6 from the compression edge, and the farthest tension row carries
//!
//! ```text
//! T1 = |M| / Σ y_i · (y_i/y1 - yc/y1)
//! ```
//!
//! where `y_i` are the tension-row distances from the NA, `y1` the largest,
//! and `yc` the (negative) lever arm to the compression resultant at the
//! plate edge. Row forces scale as `T1 · y_i/y1` and split evenly within a
//! row. Bolts carry tension only, so per-bolt totals are clamped at zero.
//!
//! ## Example
//!
//! ```rust
//! use joint_core::geometry::{BoltGroup, Plate, Vec2};
//! use joint_core::loads::AppliedLoad;
//! use joint_core::solvers::tension::{distribute, TensionMethod};
//!
//! let bolts = BoltGroup::from_pattern(2, 2, 100.0, 160.0, Vec2::default(), 20.0).unwrap();
//! let plate = Plate::from_dimensions(200.0, 300.0, Vec2::default());
//! let load = AppliedLoad::default().with_moments(0.0, 1.0e6, 0.0);
//!
//! let result = distribute(&bolts, &plate, &load, TensionMethod::Conservative).unwrap();
//! // Bolts at z = -80 sit on the compression side
//! assert_eq!(result.tensions[0], 0.0);
//! assert!((result.tensions[1] - 1.0e6 / 230.0 / 2.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{JointError, JointResult};
use crate::geometry::{BoltGroup, Plate, POSITION_TOLERANCE, ZERO_TOLERANCE};
use crate::loads::{AppliedLoad, Point3};

/// Neutral-axis placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensionMethod {
    /// NA at plate mid-depth
    #[default]
    Conservative,
    /// NA at d/6 from the compression edge
    Accurate,
}

/// Bending axis of a moment component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BendingAxis {
    /// Moment My, tension gradient along z
    Y,
    /// Moment Mz, tension gradient along y
    Z,
}

impl BendingAxis {
    /// Name of the plate direction the gradient runs along
    fn depth_direction(&self) -> &'static str {
        match self {
            BendingAxis::Y => "z",
            BendingAxis::Z => "y",
        }
    }
}

/// Neutral-axis solution for one bending axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralAxisSolution {
    pub axis: BendingAxis,
    /// Moment about the bolt group centroid
    pub moment: f64,
    /// Plate edge carrying the compression resultant
    pub compression_edge: f64,
    /// Neutral-axis coordinate along the plate depth
    pub neutral_axis: f64,
    /// yc, always ≤ 0
    pub compression_lever: f64,
    /// y1, zero when no bolt is on the tension side
    pub farthest_distance: f64,
    /// T1, total force in the farthest tension row
    pub critical_row_force: f64,
    /// Per-bolt tension from this axis, in bolt order
    pub contributions: Vec<f64>,
}

/// Per-bolt tension from direct axial load plus both bending axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionDistribution {
    /// Uniform share of a tensile Fx per bolt
    pub direct: f64,
    pub about_y: Option<NeutralAxisSolution>,
    pub about_z: Option<NeutralAxisSolution>,
    /// Final tension per bolt, never negative
    pub tensions: Vec<f64>,
}

/// Bolt rows at a shared coordinate: `(coordinate, bolt indices)`
fn group_rows(coords: &[f64], tolerance: f64) -> Vec<(f64, Vec<usize>)> {
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| coords[a].total_cmp(&coords[b]));

    let mut rows: Vec<(f64, Vec<usize>)> = Vec::new();
    for i in order {
        match rows.last_mut() {
            Some((u, members)) if (coords[i] - *u).abs() <= tolerance => members.push(i),
            _ => rows.push((coords[i], vec![i])),
        }
    }
    rows
}

/// Solve the neutral axis for a single moment component.
///
/// Returns `Ok(None)` when the moment is negligible.
///
/// # Errors
/// `InvalidPlate` when the plate depth along the gradient is not positive.
pub fn neutral_axis(
    group: &BoltGroup,
    plate: &Plate,
    moment: f64,
    axis: BendingAxis,
    method: TensionMethod,
) -> JointResult<Option<NeutralAxisSolution>> {
    if moment.abs() < ZERO_TOLERANCE {
        return Ok(None);
    }

    let (coords, u_min, u_max): (Vec<f64>, f64, f64) = match axis {
        BendingAxis::Y => (
            group.positions().iter().map(|p| p.z).collect(),
            plate.z_min,
            plate.z_max,
        ),
        BendingAxis::Z => (
            group.positions().iter().map(|p| p.y).collect(),
            plate.y_min,
            plate.y_max,
        ),
    };
    let depth = u_max - u_min;
    if !(depth > 0.0) || !depth.is_finite() {
        return Err(JointError::invalid_plate(axis.depth_direction(), depth));
    }

    let tension_sign = if moment > 0.0 { 1.0 } else { -1.0 };
    let compression_edge = if moment > 0.0 { u_min } else { u_max };
    let neutral_axis = match method {
        TensionMethod::Conservative => 0.5 * (u_min + u_max),
        TensionMethod::Accurate => compression_edge + tension_sign * depth / 6.0,
    };
    let compression_lever = -(compression_edge - neutral_axis).abs();

    let tension_rows: Vec<(f64, Vec<usize>)> = group_rows(&coords, POSITION_TOLERANCE * depth.max(1.0))
        .into_iter()
        .filter(|(u, _)| tension_sign * (u - neutral_axis) > 0.0)
        .map(|(u, members)| ((u - neutral_axis).abs(), members))
        .collect();

    let mut solution = NeutralAxisSolution {
        axis,
        moment,
        compression_edge,
        neutral_axis,
        compression_lever,
        farthest_distance: 0.0,
        critical_row_force: 0.0,
        contributions: vec![0.0; group.len()],
    };

    let y1 = tension_rows.iter().map(|(y, _)| *y).fold(0.0, f64::max);
    if y1 <= 0.0 {
        debug!(axis = ?axis, neutral_axis, "no bolts on the tension side");
        return Ok(Some(solution));
    }
    solution.farthest_distance = y1;

    let denominator: f64 = tension_rows
        .iter()
        .map(|(y, _)| y * (y / y1 - compression_lever / y1))
        .sum();
    if denominator.abs() < ZERO_TOLERANCE {
        debug!(axis = ?axis, denominator, "tension denominator vanished, axis contributes nothing");
        return Ok(Some(solution));
    }

    let t1 = moment.abs() / denominator;
    solution.critical_row_force = t1;
    for (y, members) in &tension_rows {
        let per_bolt = t1 * y / y1 / members.len() as f64;
        for &i in members {
            solution.contributions[i] += per_bolt;
        }
    }
    Ok(Some(solution))
}

/// Distribute out-of-plane demand over the bolts of a plate connection.
///
/// Moments are taken about the bolt group centroid. A compressive Fx is
/// carried by plate bearing and adds nothing to the bolts.
pub fn distribute(
    group: &BoltGroup,
    plate: &Plate,
    load: &AppliedLoad,
    method: TensionMethod,
) -> JointResult<TensionDistribution> {
    let c = group.properties().centroid;
    let (_, my, mz) = load.moments_about(Point3::new(0.0, c.y, c.z));

    let direct = load.fx.max(0.0) / group.len() as f64;
    let about_y = neutral_axis(group, plate, my, BendingAxis::Y, method)?;
    let about_z = neutral_axis(group, plate, mz, BendingAxis::Z, method)?;

    let tensions = (0..group.len())
        .map(|i| {
            let bending: f64 = [&about_y, &about_z]
                .iter()
                .filter_map(|s| s.as_ref())
                .map(|s| s.contributions[i])
                .sum();
            (direct + bending).max(0.0)
        })
        .collect();

    Ok(TensionDistribution {
        direct,
        about_y,
        about_z,
        tensions,
    })
}
