//! # Load-Deformation Equations
//!
//! Closed-form per-element response laws used by the ICR solvers.
//!
//! ## Modules
//!
//! - [`weld`] - AISC fillet weld deformation limits, directional strength, stress law
//! - [`bolt`] - Crawford–Kulak bolt shear load-deformation curve
//!
//! ## Conventions
//!
//! - **Angles**: θ is the angle between the element force and the weld axis,
//!   0° longitudinal, 90° transverse
//! - **Deformations**: same length unit as the geometry
//!
//! ## References
//!
//! - AISC 360-22 Section J2.4 and Manual Part 8: Instantaneous center of rotation method
//! - Crawford, S.F. & Kulak, G.L. (1971), "Eccentrically Loaded Bolted Connections"
//! - Lesik, D.F. & Kennedy, D.J.L. (1990), "Ultimate Strength of Fillet Welded Connections"

pub mod bolt;
pub mod weld;

pub use bolt::CrawfordKulak;
pub use weld::{
    deformation_limits, directional_factor, fillet_weld_stress, load_angle, DeformationLimits,
};
