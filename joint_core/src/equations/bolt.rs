//! # Crawford–Kulak Bolt Model
//!
//! Empirical shear load-deformation curve for a single bolt:
//!
//! ```text
//! R = R_ult · (1 - e^(-μ·ρ))^λ,    ρ = clamp(Δ / Δmax, 1e-6, 1)
//! ```
//!
//! The constants are the published values for 3/4" A325 bolts and are kept
//! configurable rather than derived from the bolt diameter or grade.

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};

/// Crawford–Kulak curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawfordKulak {
    /// Curve steepness μ
    pub mu: f64,
    /// Exponent λ
    pub lambda: f64,
    /// Deformation of the most distant bolt, Δmax
    pub delta_max: f64,
}

impl Default for CrawfordKulak {
    fn default() -> Self {
        CrawfordKulak {
            mu: 10.0,
            lambda: 0.55,
            delta_max: 8.64,
        }
    }
}

impl CrawfordKulak {
    /// Bolt force at deformation `delta` for ultimate capacity `r_ult`
    ///
    /// # Example
    /// ```rust
    /// use joint_core::equations::CrawfordKulak;
    ///
    /// let ck = CrawfordKulak::default();
    /// let r = ck.force(ck.delta_max, 100.0);
    /// assert!((r - 100.0 * (1.0 - (-10.0_f64).exp()).powf(0.55)).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn force(&self, delta: f64, r_ult: f64) -> f64 {
        let rho = (delta / self.delta_max).clamp(1e-6, 1.0);
        r_ult * (1.0 - (-self.mu * rho).exp()).powf(self.lambda)
    }

    pub fn validate(&self) -> JointResult<()> {
        for (field, value) in [
            ("crawford_kulak.mu", self.mu),
            ("crawford_kulak.lambda", self.lambda),
            ("crawford_kulak.delta_max", self.delta_max),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(JointError::invalid_input(
                    field,
                    value.to_string(),
                    "Crawford-Kulak parameters must be positive",
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
    fn test_force_is_monotonic() {
        let ck = CrawfordKulak::default();
        let mut last = 0.0;
        for i in 1..=10 {
            let r = ck.force(ck.delta_max * i as f64 / 10.0, 100.0);
            assert!(r > last);
            last = r;
        }
        assert!(last < 100.0);
    }

    #[test]
    fn test_force_saturates_beyond_delta_max() {
        let ck = CrawfordKulak::default();
        assert_eq!(ck.force(ck.delta_max, 50.0), ck.force(3.0 * ck.delta_max, 50.0));
    }

    #[test]
    fn test_zero_deformation_uses_floor() {
        let ck = CrawfordKulak::default();
        let r = ck.force(0.0, 100.0);
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn test_validate() {
        assert!(CrawfordKulak::default().validate().is_ok());
        let bad = CrawfordKulak {
            lambda: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
