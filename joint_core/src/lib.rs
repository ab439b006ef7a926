//! # joint_core - Steel Connection Force Distribution Engine
//!
//! `joint_core` distributes combined 3D loads over the elements of welded
//! and bolted steel connections. It provides the elastic method and the
//! instantaneous center of rotation (ICR) method for in-plane shear, plus a
//! plate neutral-axis solver for out-of-plane bolt tension. All inputs and
//! outputs are JSON-serializable; units are whatever the caller uses,
//! consistently.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: Precondition violations are structured errors;
//!   numeric degeneracy is reported on the result, never raised
//! - **Transparent Fallback**: Every result records the method actually used
//!
//! ## Quick Start
//!
//! ```rust
//! use joint_core::calculations::{weld, AnalysisMethod};
//! use joint_core::geometry::{FilletWeld, Vec2, WeldGroup, WeldKind, WeldPath};
//! use joint_core::loads::AppliedLoad;
//! use joint_core::settings::AnalysisSettings;
//!
//! // Two vertical 200 mm fillet welds, 100 mm apart
//! let kind = WeldKind::Fillet(FilletWeld::from_leg(6.0).unwrap());
//! let paths = [
//!     WeldPath::line(Vec2::new(-100.0, -50.0), Vec2::new(100.0, -50.0)),
//!     WeldPath::line(Vec2::new(-100.0, 50.0), Vec2::new(100.0, 50.0)),
//! ];
//! let group = WeldGroup::from_paths(&paths, kind, 100).unwrap();
//!
//! // 50 kN down, 150 mm out from the weld centroid
//! let load = AppliedLoad::shear_at(-50_000.0, 0.0, 0.0, 150.0);
//! let result = weld::analyze(&group, &load, AnalysisMethod::Icr, &AnalysisSettings::default()).unwrap();
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("\"method\": \"icr\""));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Weld and bolt analyses with their inputs and results
//! - [`solvers`] - ICR root finder, response laws, elastic and tension solvers
//! - [`equations`] - Closed-form load-deformation laws
//! - [`geometry`] - Weld groups, bolt groups, plates and group properties
//! - [`loads`] - Applied loads and equilibrium targets
//! - [`settings`] - JSON-loadable analysis settings
//! - [`errors`] - Structured error types
//!
//! ## Logging
//!
//! Events go through the `tracing` facade: `debug!` for search completion
//! and load-regime shortcuts, `warn!` when an ICR request degrades to the
//! elastic method, `trace!` for rejected candidates. Install a subscriber
//! to see them.

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod geometry;
pub mod loads;
pub mod settings;
pub mod solvers;

// Re-export commonly used types at crate root for convenience
pub use calculations::{AnalysisMethod, MethodUsed};
pub use errors::{JointError, JointResult};
pub use loads::AppliedLoad;
pub use settings::AnalysisSettings;
