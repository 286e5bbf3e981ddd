//! End-to-end analysis of one dataset
//!
//! Summary → aggregate table → independence tests → model comparison.
//! The first failing step aborts the run.

use crate::aggregate::{aggregate, AggregateTable};
use crate::comparison::{compare_with, ComparisonResult};
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, DatasetSummary};
use crate::error::Result;
use crate::independence::{test_independence_with, IndependenceTest};
use serde::Serialize;

/// Everything computed for one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: DatasetSummary,
    pub aggregate: AggregateTable,
    /// One test per configured grouping attribute, in configuration order
    pub independence: Vec<IndependenceTest>,
    pub comparison: ComparisonResult,
}

/// Run the full analysis
pub fn run(dataset: &Dataset, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;

    let summary = dataset.summary();
    tracing::debug!(
        applications = summary.total_applications,
        departments = summary.departments,
        "dataset summary"
    );

    let aggregate = aggregate(dataset);

    let independence = config
        .group_by
        .iter()
        .map(|&attribute| test_independence_with(dataset, attribute, config.correction))
        .collect::<Result<Vec<_>>>()?;

    let comparison = compare_with(dataset, &config.comparison)?;

    Ok(Analysis {
        summary,
        aggregate,
        independence,
        comparison,
    })
}
