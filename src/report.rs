//! Rendering of an [`Analysis`] as text, JSON or CSV

use crate::cli::OutputFormat;
use crate::csv_output::CsvOutput;
use crate::error::{AnalysisError, Result};
use crate::json_output::JsonOutput;
use crate::pipeline::Analysis;
use crate::regression::{ClassMetrics, ModelResult};
use serde::{Deserialize, Serialize};

const MAX_PRECISION: usize = 12;

/// Output settings (the `[report]` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Decimal places for rates, statistics and coefficients
    pub precision: usize,
    /// Include coefficient tables
    pub show_coefficients: bool,
    /// Include per-class precision/recall/F1
    pub show_classification: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            precision: 4,
            show_coefficients: true,
            show_classification: false,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(AnalysisError::InvalidConfig(format!(
                "precision must be <= {}, got {}",
                MAX_PRECISION, self.precision
            )));
        }
        Ok(())
    }
}

/// Render in the configured format
pub fn render(analysis: &Analysis, config: &ReportConfig) -> serde_json::Result<String> {
    match config.format {
        OutputFormat::Text => Ok(render_text(analysis, config)),
        OutputFormat::Json => JsonOutput::new(analysis, config).to_json(),
        OutputFormat::Csv => Ok(CsvOutput::from_table(&analysis.aggregate, config.precision).to_csv()),
    }
}

/// Human-readable report
pub fn render_text(analysis: &Analysis, config: &ReportConfig) -> String {
    let p = config.precision;
    let mut out = String::new();

    let s = &analysis.summary;
    out.push_str("📋 Dataset Summary:\n");
    out.push_str(&format!("  Total applications: {}\n", s.total_applications));
    out.push_str(&format!("  Departments: {}\n", s.departments));
    out.push_str(&format!(
        "  Applicants: {} male, {} female\n",
        s.male_applicants, s.female_applicants
    ));
    out.push_str(&format!(
        "  Admitted: {}, rejected: {} (rate {:.*})\n",
        s.total_admitted, s.total_rejected, p, s.overall_admission_rate
    ));

    out.push_str("\n📊 Admission Rates by Major and Sex:\n");
    out.push_str(&format!(
        "  {:<12} {:<4} {:>9} {:>9} {:>10}\n",
        "Major", "Sex", "Admitted", "Total", "Rate"
    ));
    for group in analysis.aggregate.groups() {
        out.push_str(&format!(
            "  {:<12} {:<4} {:>9} {:>9} {:>10.*}\n",
            group.department, group.sex, group.admitted, group.total, p, group.admission_rate
        ));
    }
    out.push_str("\n  Pooled across departments:\n");
    for pooled in analysis.aggregate.pooled_by_sex() {
        out.push_str(&format!(
            "  {:<12} {:<4} {:>9} {:>9} {:>10.*}\n",
            "(all)", pooled.sex, pooled.admitted, pooled.total, p, pooled.admission_rate
        ));
    }

    if !analysis.independence.is_empty() {
        out.push_str("\n🔬 Chi-square Tests of Independence:\n");
        for test in &analysis.independence {
            let marker = if test.significant { "significant" } else { "not significant" };
            out.push_str(&format!(
                "  {} vs Admission: chi2={:.*}, p={:.*}, dof={}{} ({})\n",
                test.attribute,
                p,
                test.statistic,
                p,
                test.p_value,
                test.degrees_of_freedom,
                if test.correction_applied { ", Yates" } else { "" },
                marker
            ));
        }
    }

    out.push('\n');
    out.push_str(&analysis.comparison.to_report_string());

    if config.show_coefficients {
        out.push_str("\n📈 Coefficients (naive model):\n");
        push_coefficients(&mut out, &analysis.comparison.naive, p);
        out.push_str("\n📈 Coefficients (full model):\n");
        push_coefficients(&mut out, &analysis.comparison.full, p);
    }

    if config.show_classification {
        for (label, model) in [
            ("naive", &analysis.comparison.naive),
            ("full", &analysis.comparison.full),
        ] {
            out.push_str(&format!("\n🎯 Classification report ({} model):\n", label));
            push_classification(&mut out, model, p);
        }
    }

    out
}

fn push_coefficients(out: &mut String, model: &ModelResult, p: usize) {
    out.push_str(&format!(
        "  {:<16} {:>12} {:>12}\n",
        "Feature", "Coefficient", "Odds Ratio"
    ));
    out.push_str(&format!(
        "  {:<16} {:>12.*} {:>12}\n",
        "Intercept", p, model.intercept, "-"
    ));

    let rows: Vec<(String, f64, f64)> = match &model.coefficient_table {
        Some(table) => table
            .iter()
            .map(|r| (r.predictor.to_string(), r.coefficient, r.odds_ratio))
            .collect(),
        None => model
            .predictors
            .iter()
            .zip(model.coefficients.iter().zip(&model.odds_ratios))
            .map(|(name, (&c, &o))| (name.to_string(), c, o))
            .collect(),
    };
    for (name, coefficient, odds_ratio) in rows {
        out.push_str(&format!(
            "  {:<16} {:>12.*} {:>12.*}\n",
            name, p, coefficient, p, odds_ratio
        ));
    }
}

fn push_classification(out: &mut String, model: &ModelResult, p: usize) {
    let report = &model.classification_report;
    out.push_str(&format!(
        "  {:<14} {:>10} {:>10} {:>10} {:>8}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    let line = |name: &str, m: &ClassMetrics| {
        format!(
            "  {:<14} {:>10.*} {:>10.*} {:>10.*} {:>8}\n",
            name, p, m.precision, p, m.recall, p, m.f1_score, m.support
        )
    };
    out.push_str(&line("Rejected", &report.rejected));
    out.push_str(&line("Accepted", &report.accepted));
    out.push_str(&format!(
        "  {:<14} {:>32.*} {:>8}\n",
        "accuracy",
        p,
        report.accuracy,
        report.confusion.total()
    ));
    out.push_str(&line("macro avg", &report.macro_avg));
    out.push_str(&line("weighted avg", &report.weighted_avg));
}
