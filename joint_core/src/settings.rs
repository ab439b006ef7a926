//! # Analysis Settings
//!
//! Tunable parameters shared by every analysis: ICR search budget, bolt
//! load-deformation constants, reference strengths and the tension method.
//! Settings are plain serde data so they can live in a JSON file next to the
//! connection definitions.
//!
//! ## Example
//!
//! ```rust
//! use joint_core::settings::AnalysisSettings;
//!
//! let settings = AnalysisSettings::from_json(r#"{"search": {"tolerance": 1e-8}}"#).unwrap();
//! assert_eq!(settings.search.tolerance, 1e-8);
//! assert_eq!(settings.search.max_iterations, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::CrawfordKulak;
use crate::errors::{JointError, JointResult};
use crate::solvers::icr::IcrSearchConfig;
use crate::solvers::tension::TensionMethod;

/// Settings for weld and bolt analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// ICR root-finder budget and tolerance
    pub search: IcrSearchConfig,

    /// Bolt shear load-deformation curve
    pub crawford_kulak: CrawfordKulak,

    /// Electrode strength used to shape the weld curve.
    ///
    /// Only the relative distribution matters: the ICR forces are scaled to
    /// the applied shear, so this value cancels out of the result.
    pub reference_f_exx: f64,

    /// Bolt ultimate capacity used when a connection does not specify one
    pub reference_bolt_capacity: f64,

    /// Apply k_ds = 1 + 0.5 sin^1.5(θ) in the ICR weld law
    pub include_directional_strength: bool,

    /// Neutral-axis placement for bolt tension
    pub tension_method: TensionMethod,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            search: IcrSearchConfig::default(),
            crawford_kulak: CrawfordKulak::default(),
            reference_f_exx: 483.0,
            reference_bolt_capacity: 100.0,
            include_directional_strength: true,
            tension_method: TensionMethod::default(),
        }
    }
}

impl AnalysisSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> JointResult<Self> {
        let settings: AnalysisSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> JointResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject non-positive or non-finite numeric settings.
    pub fn validate(&self) -> JointResult<()> {
        self.search.validate()?;
        self.crawford_kulak.validate()?;
        for (field, value) in [
            ("reference_f_exx", self.reference_f_exx),
            ("reference_bolt_capacity", self.reference_bolt_capacity),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(JointError::invalid_input(
                    field,
                    value.to_string(),
                    "Reference strengths must be positive",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.search.min_candidates, 60);
        assert_eq!(settings.search.bisection_iterations, 20);
        assert_eq!(settings.search.newton_iterations, 30);
        assert_eq!(settings.search.acceptance, 1e-3);
        assert_eq!(settings.crawford_kulak.delta_max, 8.64);
        assert_eq!(settings.reference_f_exx, 483.0);
        assert_eq!(settings.tension_method, TensionMethod::Conservative);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = AnalysisSettings::default();
        settings.tension_method = TensionMethod::Accurate;
        settings.crawford_kulak.mu = 8.0;
        let json = settings.to_json().unwrap();
        let back = AnalysisSettings::from_json(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            AnalysisSettings::from_json("{}").unwrap(),
            AnalysisSettings::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AnalysisSettings::from_json(r#"{"reference_f_exx": -1.0}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = AnalysisSettings::from_json(r#"{"search": {"acceptance": 1e-9}}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = AnalysisSettings::from_json("{not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
