// Configuration for logistic regression fits
//
// Newton-Raphson converges quadratically on well-posed admissions data, so
// the iteration cap only matters for separated or near-separated designs.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a logistic regression fit
///
/// # Example
/// ```
/// use confound::regression::FitConfig;
///
/// let config = FitConfig::default();
/// assert_eq!(config.max_iterations, 1000);
/// assert_eq!(config.l2_penalty, 0.0); // plain maximum likelihood
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Newton iteration cap
    ///
    /// When reached, the best iterate is returned together with a
    /// `ConvergenceWarning`.
    ///
    /// Default: 1000
    pub max_iterations: usize,

    /// Convergence tolerance on the largest absolute coefficient step
    ///
    /// Default: 1e-10
    pub tolerance: f64,

    /// L2 penalty on the slopes (the intercept is never penalized)
    ///
    /// - 0.0 (default): unpenalized maximum likelihood
    /// - 1.0: equivalent to an inverse regularization strength C = 1
    pub l2_penalty: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            l2_penalty: 0.0,
        }
    }
}

impl FitConfig {
    /// Tighter tolerance and a larger iteration budget
    pub fn strict() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-12,
            l2_penalty: 0.0,
        }
    }

    /// Ridge-penalized fit with inverse regularization strength `c`
    ///
    /// Matches the common `C` parametrization: the penalty is `1 / c`.
    /// A non-positive `c` yields an invalid configuration.
    pub fn ridge(c: f64) -> Self {
        Self {
            l2_penalty: if c > 0.0 { 1.0 / c } else { f64::NAN },
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_iterations must be >= 1, got 0".to_string(),
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        if !(self.l2_penalty.is_finite() && self.l2_penalty >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "l2_penalty must be non-negative, got {}",
                self.l2_penalty
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FitConfig::default();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.tolerance, 1e-10);
        assert_eq!(config.l2_penalty, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = FitConfig::strict();
        assert_eq!(config.max_iterations, 5000);
        assert!(config.tolerance < FitConfig::default().tolerance);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ridge_config() {
        let config = FitConfig::ridge(2.0);
        assert_eq!(config.l2_penalty, 0.5);
        assert!(config.validate().is_ok());
        assert!(FitConfig::ridge(0.0).validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_max_iterations() {
        let mut config = FitConfig::default();
        config.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_tolerance() {
        let mut config = FitConfig::default();
        config.tolerance = -1.0;
        assert!(config.validate().is_err());
        config.tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_penalty() {
        let mut config = FitConfig::default();
        config.l2_penalty = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FitConfig = toml::from_str("max_iterations = 50").unwrap();
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.tolerance, 1e-10);
    }
}
