//! Analysis configuration (`confound.toml`)
//!
//! Every table is optional; missing keys fall back to their defaults.
//!
//! # Example confound.toml
//!
//! ```toml
//! group_by = ["sex", "major"]
//! correction = "yates"
//!
//! [fit]
//! max_iterations = 1000
//! tolerance = 1e-10
//! l2_penalty = 0.0
//!
//! [comparison]
//! reference_department = "A"
//!
//! [report]
//! format = "text"
//! precision = 4
//! show_coefficients = true
//! show_classification = false
//! ```
//!
//! A top-level `[fit]` table applies to the comparison fits unless
//! `[comparison.fit]` is given explicitly.

use crate::comparison::ComparisonConfig;
use crate::error::AnalysisError;
use crate::independence::{ContinuityCorrection, GroupingAttribute};
use crate::regression::FitConfig;
use crate::report::ReportConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reference department and regression settings for both fits
    pub comparison: ComparisonConfig,
    pub report: ReportConfig,
    /// Attributes tested for independence from the outcome
    pub group_by: Vec<GroupingAttribute>,
    pub correction: ContinuityCorrection,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            comparison: ComparisonConfig::default(),
            report: ReportConfig::default(),
            group_by: vec![GroupingAttribute::Sex, GroupingAttribute::Department],
            correction: ContinuityCorrection::default(),
        }
    }
}

/// Raw file layout, used to tell an explicit `[comparison.fit]` from a default
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    fit: Option<FitConfig>,
    comparison: Option<FileComparison>,
    report: ReportConfig,
    group_by: Option<Vec<GroupingAttribute>>,
    correction: ContinuityCorrection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileComparison {
    reference_department: Option<String>,
    fit: Option<FitConfig>,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// ```no_run
    /// use confound::config::AnalysisConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_file("confound.toml")?;
    /// println!("reference: {:?}", config.comparison.reference_department);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).context("Failed to parse TOML")?;

        let comparison = file.comparison.unwrap_or_default();
        let config = Self {
            comparison: ComparisonConfig {
                reference_department: comparison.reference_department,
                fit: comparison.fit.or(file.fit).unwrap_or_default(),
            },
            report: file.report,
            group_by: file
                .group_by
                .unwrap_or_else(|| Self::default().group_by),
            correction: file.correction,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every nested section
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        self.comparison.fit.validate()?;
        self.report.validate()?;

        if let Some(reference) = &self.comparison.reference_department {
            if reference.trim().is_empty() {
                return Err(AnalysisError::InvalidConfig(
                    "reference_department must not be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.group_by,
            vec![GroupingAttribute::Sex, GroupingAttribute::Department]
        );
        assert_eq!(config.correction, ContinuityCorrection::Yates);
        assert!(config.comparison.reference_department.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
group_by = ["sex", "major", "year"]
correction = "disabled"

[fit]
max_iterations = 200
l2_penalty = 1.0

[comparison]
reference_department = "C"

[report]
format = "json"
precision = 6
"#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.group_by.len(), 3);
        assert_eq!(config.group_by[2], GroupingAttribute::Year);
        assert_eq!(config.correction, ContinuityCorrection::Disabled);
        assert_eq!(config.comparison.fit.max_iterations, 200);
        assert_eq!(config.comparison.fit.l2_penalty, 1.0);
        assert_eq!(
            config.comparison.reference_department.as_deref(),
            Some("C")
        );
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.precision, 6);
    }

    #[test]
    fn test_comparison_fit_overrides_top_level() {
        let toml = r#"
[fit]
max_iterations = 200

[comparison.fit]
max_iterations = 50
"#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.comparison.fit.max_iterations, 50);
    }

    #[test]
    fn test_top_level_fit_reaches_comparison() {
        let config = AnalysisConfig::from_toml_str("[fit]\nl2_penalty = 0.25\n").unwrap();
        assert_eq!(config.comparison.fit.l2_penalty, 0.25);
        assert_eq!(config.comparison.fit.max_iterations, FitConfig::default().max_iterations);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AnalysisConfig::from_toml_str("[fit]\nmax_iterations = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_iterations"));

        assert!(AnalysisConfig::from_toml_str("[report]\nprecision = 40\n").is_err());
        assert!(AnalysisConfig::from_toml_str("[comparison]\nreference_department = \" \"\n").is_err());
    }

    #[test]
    fn test_unknown_grouping_attribute_rejected() {
        assert!(AnalysisConfig::from_toml_str("group_by = [\"height\"]").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = AnalysisConfig::from_toml_str("[fit\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confound.toml");
        fs::write(&path, "[comparison]\nreference_department = \"B\"\n").unwrap();
        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(
            config.comparison.reference_department.as_deref(),
            Some("B")
        );
    }

    #[test]
    fn test_from_missing_file() {
        let err = AnalysisConfig::from_file("/nonexistent/confound.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
