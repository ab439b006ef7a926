//! # Error Types
//!
//! Structured error types for joint_core. Only precondition violations are
//! errors: a candidate rejected inside the ICR search, a degenerate tension
//! axis, or a search that never converges are reported through result
//! diagnostics instead (see [`crate::calculations::MethodUsed`]).
//!
//! ## Example
//!
//! ```rust
//! use joint_core::errors::{JointError, JointResult};
//!
//! fn validate_leg(leg: f64) -> JointResult<()> {
//!     if leg <= 0.0 {
//!         return Err(JointError::invalid_input(
//!             "leg",
//!             leg.to_string(),
//!             "Weld leg must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_leg(-1.0).unwrap_err().is_precondition());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for joint_core operations
pub type JointResult<T> = Result<T, JointError>;

/// Structured error type for connection analysis.
///
/// Every variant except [`JointError::SerializationError`] is a precondition
/// violation: the request is rejected before any numeric work is attempted.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum JointError {
    /// An input value is invalid (non-finite, non-positive, out of range)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Element set is empty or has no measurable extent
    #[error("Degenerate geometry for {group}: {reason}")]
    DegenerateGeometry { group: String, reason: String },

    /// Analysis method not permitted for this weld type
    #[error("Method '{method}' is not valid for {weld_type} welds")]
    UnsupportedMethod { method: String, weld_type: String },

    /// Out-of-plane demand handed to a strictly in-plane solver
    #[error("Out-of-plane loading detected ({components}); the ICR method only supports in-plane loading")]
    OutOfPlaneLoad { components: String },

    /// Plate depth along a bending axis is not positive
    #[error("Plate depth along {axis} must be positive, got {depth}")]
    InvalidPlate { axis: String, depth: f64 },

    /// Out-of-plane bolt demand without a bearing plate
    #[error("A plate is required for out-of-plane bolt effects ({components})")]
    MissingPlate { components: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl JointError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        JointError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DegenerateGeometry error
    pub fn degenerate_geometry(group: impl Into<String>, reason: impl Into<String>) -> Self {
        JointError::DegenerateGeometry {
            group: group.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedMethod error
    pub fn unsupported_method(method: impl Into<String>, weld_type: impl Into<String>) -> Self {
        JointError::UnsupportedMethod {
            method: method.into(),
            weld_type: weld_type.into(),
        }
    }

    /// Create an OutOfPlaneLoad error
    pub fn out_of_plane(components: impl Into<String>) -> Self {
        JointError::OutOfPlaneLoad {
            components: components.into(),
        }
    }

    /// Create an InvalidPlate error
    pub fn invalid_plate(axis: impl Into<String>, depth: f64) -> Self {
        JointError::InvalidPlate {
            axis: axis.into(),
            depth,
        }
    }

    /// Create a MissingPlate error
    pub fn missing_plate(components: impl Into<String>) -> Self {
        JointError::MissingPlate {
            components: components.into(),
        }
    }

    /// Whether this error rejects the request before analysis
    pub fn is_precondition(&self) -> bool {
        !matches!(self, JointError::SerializationError { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            JointError::InvalidInput { .. } => "INVALID_INPUT",
            JointError::DegenerateGeometry { .. } => "DEGENERATE_GEOMETRY",
            JointError::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            JointError::OutOfPlaneLoad { .. } => "OUT_OF_PLANE_LOAD",
            JointError::InvalidPlate { .. } => "INVALID_PLATE",
            JointError::MissingPlate { .. } => "MISSING_PLATE",
            JointError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for JointError {
    fn from(err: serde_json::Error) -> Self {
        JointError::SerializationError {
            reason: err.to_string(),
        }
    }
}
