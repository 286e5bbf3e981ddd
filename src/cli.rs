//! CLI argument parsing for confound

use crate::config::AnalysisConfig;
use crate::independence::GroupingAttribute;
use crate::regression::FitConfig;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV aggregate table for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "confound")]
#[command(version)]
#[command(
    about = "Detect Simpson's paradox in admissions data with paired logistic regression",
    long_about = None
)]
pub struct Cli {
    /// Admissions CSV with Year, Major, Sex and Admission columns
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format (overrides the config file)
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Analysis configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Department used as the reference category in the full model
    #[arg(short = 'r', long = "reference", value_name = "DEPT")]
    pub reference: Option<String>,

    /// Newton iteration cap for both fits
    #[arg(long = "max-iter", value_name = "N")]
    pub max_iter: Option<usize>,

    /// Ridge-penalized fit with inverse regularization strength C
    #[arg(long = "ridge", value_name = "C")]
    pub ridge: Option<f64>,

    /// Attribute to test for independence from admission (repeatable)
    #[arg(short = 'g', long = "group-by", value_name = "ATTR")]
    pub group_by: Vec<GroupingAttribute>,

    /// Decimal places in text and CSV output
    #[arg(long = "precision", value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Include per-class precision/recall/F1 for both models
    #[arg(long = "classification")]
    pub classification: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(precision) = self.precision {
            config.report.precision = precision;
        }
        if self.classification {
            config.report.show_classification = true;
        }
        if let Some(reference) = &self.reference {
            config.comparison.reference_department = Some(reference.clone());
        }
        if let Some(c) = self.ridge {
            config.comparison.fit.l2_penalty = FitConfig::ridge(c).l2_penalty;
        }
        if let Some(max_iter) = self.max_iter {
            config.comparison.fit.max_iterations = max_iter;
        }
        if !self.group_by.is_empty() {
            config.group_by = self.group_by.clone();
        }
    }
}
