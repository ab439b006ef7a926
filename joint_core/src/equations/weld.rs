//! # Fillet Weld Load-Deformation Model
//!
//! Angle-dependent deformation capacity and the nonlinear stress law for
//! fillet welds used by the instantaneous center of rotation method.
//!
//! ## Notation
//!
//! - `w` = Weld leg size
//! - `θ` = Load angle from the weld axis (degrees)
//! - `Δu` = Deformation at ultimate
//! - `Δm` = Deformation at maximum stress
//! - `p` = Δ / Δm
//!
//! ## References
//!
//! - AISC Steel Construction Manual, Part 8, Eq. 8-2 through 8-5
//! - AISC 360-22 Eq. J2-5 (directional strength increase)

use crate::geometry::Vec2;

/// Lower clamp on p and on p(1.9 - 0.9p)
const P_FLOOR: f64 = 1e-6;

/// Upper clamp on p; the curve is not defined beyond the descending branch
const P_CEILING: f64 = 2.1;

// =============================================================================
// DEFORMATION LIMITS
// =============================================================================

/// Ultimate and peak-stress deformation of a fillet weld element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformationLimits {
    /// Δu, deformation at fracture
    pub ultimate: f64,
    /// Δm, deformation at maximum stress
    pub peak: f64,
}

/// Angle-dependent deformation limits
///
/// # Formula
/// Δu = min(0.17w, 1.087(θ + 6)^-0.65 · w)
///
/// Δm = 0.209(θ + 2)^-0.32 · w
///
/// # Arguments
/// * `theta_deg` - Load angle from the weld axis in degrees
/// * `leg` - Weld leg size w
///
/// # Example
/// ```rust
/// use joint_core::equations::deformation_limits;
///
/// let limits = deformation_limits(90.0, 8.0);
/// assert!(limits.ultimate < limits.peak * 2.0);
/// // Longitudinal welds are governed by the 0.17w cap
/// assert!((deformation_limits(0.0, 8.0).ultimate - 1.36).abs() < 1e-12);
/// ```
#[inline]
pub fn deformation_limits(theta_deg: f64, leg: f64) -> DeformationLimits {
    let ultimate = (0.17 * leg).min(1.087 * (theta_deg + 6.0).powf(-0.65) * leg);
    let peak = 0.209 * (theta_deg + 2.0).powf(-0.32) * leg;
    DeformationLimits { ultimate, peak }
}

// =============================================================================
// STRENGTH
// =============================================================================

/// Directional strength factor
///
/// # Formula
/// k_ds = 1.0 + 0.50 sin^1.5(θ)
///
/// # Example
/// ```rust
/// use joint_core::equations::directional_factor;
///
/// assert_eq!(directional_factor(0.0), 1.0);
/// assert!((directional_factor(90.0) - 1.5).abs() < 1e-12);
/// ```
#[inline]
pub fn directional_factor(theta_deg: f64) -> f64 {
    1.0 + 0.5 * theta_deg.to_radians().sin().abs().powf(1.5)
}

/// Fillet weld stress at a given deformation
///
/// # Formula
/// f_w = 0.60 · F_EXX · k_ds · [p(1.9 - 0.9p)]^0.3
///
/// with Δ first capped at Δu and p = Δ/Δm clamped to [1e-6, 2.1].
///
/// # Arguments
/// * `delta` - Element deformation
/// * `limits` - Deformation limits for the element's load angle
/// * `f_exx` - Electrode strength
/// * `k_ds` - Directional strength factor (1.0 to ignore it)
///
/// # Returns
/// Stress on the effective throat
#[inline]
pub fn fillet_weld_stress(delta: f64, limits: DeformationLimits, f_exx: f64, k_ds: f64) -> f64 {
    let delta = delta.min(limits.ultimate);
    let p = (delta / limits.peak).clamp(P_FLOOR, P_CEILING);
    let shape = (p * (1.9 - 0.9 * p)).max(P_FLOOR);
    0.60 * f_exx * k_ds * shape.powf(0.3)
}

/// Angle in degrees between a force direction and the weld tangent
///
/// Only the acute angle matters, so the absolute dot product is clamped to
/// [0, 1] before `acos`.
#[inline]
pub fn load_angle(direction: Vec2, tangent: Vec2) -> f64 {
    direction.dot(tangent).abs().clamp(0.0, 1.0).acos().to_degrees()
}
