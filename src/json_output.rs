//! JSON output format for analysis results
//!
//! Envelope: `{ version, format: "confound-json-v1", summary, aggregate,
//! independence, comparison }`. Undefined rates serialize as `null`.

use crate::aggregate::GroupStats;
use crate::comparison::{CoefficientSign, ComparisonResult};
use crate::dataset::DatasetSummary;
use crate::independence::IndependenceTest;
use crate::pipeline::Analysis;
use crate::regression::{ClassificationReport, ModelResult};
use crate::report::ReportConfig;
use serde::Serialize;

/// One independence test
#[derive(Debug, Clone, Serialize)]
pub struct JsonIndependenceTest {
    /// Grouping attribute ("Sex", "Major", "Year")
    pub attribute: String,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub significant: bool,
    pub correction_applied: bool,
    /// Observed and expected counts per category
    pub table: Vec<JsonContingencyRow>,
}

/// One category row of a contingency table
#[derive(Debug, Clone, Serialize)]
pub struct JsonContingencyRow {
    pub label: String,
    pub accepted: u64,
    pub rejected: u64,
    pub expected_accepted: f64,
    pub expected_rejected: f64,
}

/// One coefficient with its odds ratio
#[derive(Debug, Clone, Serialize)]
pub struct JsonCoefficient {
    pub predictor: String,
    pub coefficient: f64,
    pub odds_ratio: f64,
}

/// A fitted model
#[derive(Debug, Clone, Serialize)]
pub struct JsonModel {
    pub predictors: Vec<String>,
    pub intercept: f64,
    pub gender_coefficient: f64,
    pub gender_odds_ratio: f64,
    pub accuracy: f64,
    pub log_likelihood: f64,
    pub iterations: usize,
    /// Present when the fit did not converge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convergence_warning: Option<String>,
    /// Coefficients sorted descending (if enabled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<JsonCoefficient>>,
    /// Per-class metrics (if enabled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_report: Option<ClassificationReport>,
}

impl JsonModel {
    fn from_model(model: &ModelResult, config: &ReportConfig) -> Self {
        let coefficients = config.show_coefficients.then(|| {
            match &model.coefficient_table {
                Some(table) => table
                    .iter()
                    .map(|row| JsonCoefficient {
                        predictor: row.predictor.to_string(),
                        coefficient: row.coefficient,
                        odds_ratio: row.odds_ratio,
                    })
                    .collect(),
                None => model
                    .predictors
                    .iter()
                    .zip(model.coefficients.iter().zip(&model.odds_ratios))
                    .map(|(p, (&c, &o))| JsonCoefficient {
                        predictor: p.to_string(),
                        coefficient: c,
                        odds_ratio: o,
                    })
                    .collect(),
            }
        });

        Self {
            predictors: model.predictors.iter().map(|p| p.to_string()).collect(),
            intercept: model.intercept,
            gender_coefficient: model.gender_coefficient().unwrap_or(f64::NAN),
            gender_odds_ratio: model.gender_odds_ratio().unwrap_or(f64::NAN),
            accuracy: model.accuracy,
            log_likelihood: model.log_likelihood,
            iterations: model.iterations,
            convergence_warning: model.convergence_warning.as_ref().map(|w| w.to_string()),
            coefficients,
            classification_report: config
                .show_classification
                .then(|| model.classification_report.clone()),
        }
    }
}

/// Naive vs. full comparison
#[derive(Debug, Clone, Serialize)]
pub struct JsonComparison {
    pub paradox_detected: bool,
    pub reference_department: String,
    pub naive_sign: CoefficientSign,
    pub full_sign: CoefficientSign,
    pub gender_coefficient_change: f64,
    pub accuracy_change: f64,
    pub naive: JsonModel,
    pub full: JsonModel,
}

impl JsonComparison {
    fn from_comparison(result: &ComparisonResult, config: &ReportConfig) -> Self {
        Self {
            paradox_detected: result.paradox_detected,
            reference_department: result.reference_department.clone(),
            naive_sign: result.naive_sign,
            full_sign: result.full_sign,
            gender_coefficient_change: result.gender_coefficient_change,
            accuracy_change: result.accuracy_change,
            naive: JsonModel::from_model(&result.naive, config),
            full: JsonModel::from_model(&result.full, config),
        }
    }
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub format: String,
    pub summary: DatasetSummary,
    pub aggregate: Vec<GroupStats>,
    pub independence: Vec<JsonIndependenceTest>,
    pub comparison: JsonComparison,
}

impl JsonOutput {
    pub fn new(analysis: &Analysis, config: &ReportConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "confound-json-v1".to_string(),
            summary: analysis.summary.clone(),
            aggregate: analysis.aggregate.groups().to_vec(),
            independence: analysis
                .independence
                .iter()
                .map(json_independence)
                .collect(),
            comparison: JsonComparison::from_comparison(&analysis.comparison, config),
        }
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn json_independence(test: &IndependenceTest) -> JsonIndependenceTest {
    JsonIndependenceTest {
        attribute: test.attribute.to_string(),
        statistic: test.statistic,
        p_value: test.p_value,
        degrees_of_freedom: test.degrees_of_freedom,
        significant: test.significant,
        correction_applied: test.correction_applied,
        table: (0..test.contingency_table.labels.len())
            .map(|i| JsonContingencyRow {
                label: test.contingency_table.labels[i].clone(),
                accepted: test.contingency_table.accepted[i],
                rejected: test.contingency_table.rejected[i],
                expected_accepted: test.expected[i][0],
                expected_rejected: test.expected[i][1],
            })
            .collect(),
    }
}
