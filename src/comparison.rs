// Naive vs. department-adjusted model comparison
//
// Fits two logistic models on the same encoded data:
// - naive: admitted ~ Gender
// - full:  admitted ~ Gender + department indicators (reference dropped)
//
// A change in the sign class of the gender coefficient between the two fits
// is reported as Simpson's Paradox.

use crate::dataset::Dataset;
use crate::encoder::{encode, PredictorColumn};
use crate::error::{AnalysisError, Result};
use crate::regression::{fit_with, FitConfig, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magnitude at or below which a coefficient counts as zero
pub const SIGN_ZERO_TOLERANCE: f64 = 1e-9;

/// Sign class of a coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoefficientSign {
    Negative,
    Zero,
    Positive,
}

impl CoefficientSign {
    pub fn of(value: f64) -> Self {
        if value.abs() <= SIGN_ZERO_TOLERANCE {
            CoefficientSign::Zero
        } else if value > 0.0 {
            CoefficientSign::Positive
        } else {
            CoefficientSign::Negative
        }
    }
}

impl fmt::Display for CoefficientSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientSign::Negative => f.write_str("negative"),
            CoefficientSign::Zero => f.write_str("zero"),
            CoefficientSign::Positive => f.write_str("positive"),
        }
    }
}

/// Comparison settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Department whose indicator is dropped from the full model
    ///
    /// Default: the first department in sorted order
    pub reference_department: Option<String>,

    /// Settings shared by both fits
    pub fit: FitConfig,
}

/// Outcome of comparing the naive and adjusted models
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub naive: ModelResult,
    pub full: ModelResult,
    /// Department absorbed into the full model's intercept
    pub reference_department: String,
    /// full − naive gender coefficient
    pub gender_coefficient_change: f64,
    /// full − naive accuracy
    pub accuracy_change: f64,
    pub naive_sign: CoefficientSign,
    pub full_sign: CoefficientSign,
    /// The gender coefficient changed sign class
    pub paradox_detected: bool,
}

impl ComparisonResult {
    pub fn naive_gender_coefficient(&self) -> f64 {
        self.naive.gender_coefficient().unwrap_or(f64::NAN)
    }

    pub fn full_gender_coefficient(&self) -> f64 {
        self.full.gender_coefficient().unwrap_or(f64::NAN)
    }

    /// Either fit ended with a convergence warning
    pub fn has_convergence_warning(&self) -> bool {
        !(self.naive.converged() && self.full.converged())
    }

    /// Human-readable verdict
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.paradox_detected {
            report.push_str("❌ SIMPSON'S PARADOX DETECTED\n\n");
            report.push_str(&format!(
                "Gender effect is {} without department and {} with department\n",
                self.naive_sign, self.full_sign
            ));
        } else {
            report.push_str("✅ NO SIMPSON'S PARADOX\n\n");
            report.push_str(&format!(
                "Gender effect stays {} after controlling for department\n",
                self.full_sign
            ));
        }

        report.push_str(&format!(
            "Reference department: {}\n",
            self.reference_department
        ));

        report.push_str("\n📊 Gender coefficient:\n");
        report.push_str(&format!(
            "  naive: {:.4} (odds ratio {:.4}, accuracy {:.4})\n",
            self.naive_gender_coefficient(),
            self.naive.gender_odds_ratio().unwrap_or(f64::NAN),
            self.naive.accuracy
        ));
        report.push_str(&format!(
            "  full:  {:.4} (odds ratio {:.4}, accuracy {:.4})\n",
            self.full_gender_coefficient(),
            self.full.gender_odds_ratio().unwrap_or(f64::NAN),
            self.full.accuracy
        ));
        report.push_str(&format!(
            "  change: {:+.4} (accuracy {:+.4})\n",
            self.gender_coefficient_change, self.accuracy_change
        ));

        for (label, model) in [("naive", &self.naive), ("full", &self.full)] {
            if let Some(warning) = &model.convergence_warning {
                report.push_str(&format!("\n⚠️  {} model: {}\n", label, warning));
            }
        }

        report
    }
}

/// Compare with default settings
pub fn compare(dataset: &Dataset) -> Result<ComparisonResult> {
    compare_with(dataset, &ComparisonConfig::default())
}

/// Fit the naive and full models and classify the gender sign change
pub fn compare_with(dataset: &Dataset, config: &ComparisonConfig) -> Result<ComparisonResult> {
    let encoded = encode(dataset);
    let departments = encoded.departments();

    let reference = match &config.reference_department {
        Some(name) => departments
            .iter()
            .find(|d| *d == name)
            .cloned()
            .ok_or_else(|| {
                AnalysisError::InvalidConfig(format!(
                    "reference department '{}' not present in data (known: {})",
                    name,
                    departments.join(", ")
                ))
            })?,
        None => departments.first().cloned().ok_or_else(|| {
            AnalysisError::DegenerateInput("dataset has no departments".to_string())
        })?,
    };

    let full_predictors: Vec<PredictorColumn> = std::iter::once(PredictorColumn::Gender)
        .chain(
            departments
                .iter()
                .filter(|d| **d != reference)
                .cloned()
                .map(PredictorColumn::Department),
        )
        .collect();

    tracing::debug!(
        reference = %reference,
        predictors = full_predictors.len(),
        "comparing naive and department-adjusted models"
    );

    let naive = fit_with(&encoded, &[PredictorColumn::Gender], &config.fit)?;
    let full = fit_with(&encoded, &full_predictors, &config.fit)?;

    let naive_coefficient = naive.gender_coefficient().unwrap_or(f64::NAN);
    let full_coefficient = full.gender_coefficient().unwrap_or(f64::NAN);
    let naive_sign = CoefficientSign::of(naive_coefficient);
    let full_sign = CoefficientSign::of(full_coefficient);
    let paradox_detected = naive_sign != full_sign;

    if paradox_detected {
        tracing::debug!(
            naive = naive_coefficient,
            full = full_coefficient,
            "gender coefficient changed sign"
        );
    }

    Ok(ComparisonResult {
        gender_coefficient_change: full_coefficient - naive_coefficient,
        accuracy_change: full.accuracy - naive.accuracy,
        naive,
        full,
        reference_department: reference,
        naive_sign,
        full_sign,
        paradox_detected,
    })
}
