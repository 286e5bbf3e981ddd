//! Chi-square test of independence between a grouping attribute and outcome
//!
//! Builds a k × 2 contingency table (categories × {Accepted, Rejected}) and
//! applies Pearson's chi-square test with the large-sample approximation.
//! For 2 × 2 tables (one degree of freedom) Yates' continuity correction is
//! applied unless disabled.

use crate::dataset::{Dataset, Record, Sex};
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Significance threshold for independence tests
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Attribute used to group applicants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingAttribute {
    Sex,
    #[serde(alias = "major")]
    Department,
    Year,
}

impl fmt::Display for GroupingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingAttribute::Sex => f.write_str("Sex"),
            GroupingAttribute::Department => f.write_str("Major"),
            GroupingAttribute::Year => f.write_str("Year"),
        }
    }
}

impl FromStr for GroupingAttribute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sex" | "gender" => Ok(GroupingAttribute::Sex),
            "department" | "major" => Ok(GroupingAttribute::Department),
            "year" => Ok(GroupingAttribute::Year),
            other => Err(format!(
                "unknown grouping attribute '{}' (expected sex, major or year)",
                other
            )),
        }
    }
}

/// Continuity correction policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuityCorrection {
    /// Yates' correction when the table has one degree of freedom
    #[default]
    Yates,
    Disabled,
}

/// Category × outcome counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    pub attribute: GroupingAttribute,
    /// Category labels, one per row
    pub labels: Vec<String>,
    pub accepted: Vec<u64>,
    pub rejected: Vec<u64>,
}

impl ContingencyTable {
    /// Build from explicit `(label, accepted, rejected)` rows
    pub fn from_counts(attribute: GroupingAttribute, rows: Vec<(String, u64, u64)>) -> Self {
        let mut labels = Vec::with_capacity(rows.len());
        let mut accepted = Vec::with_capacity(rows.len());
        let mut rejected = Vec::with_capacity(rows.len());
        for (label, a, r) in rows {
            labels.push(label);
            accepted.push(a);
            rejected.push(r);
        }
        Self {
            attribute,
            labels,
            accepted,
            rejected,
        }
    }

    /// Cross-tabulate a dataset
    ///
    /// Sex always yields both rows (F, M), even if one has no applicants.
    /// Department and year rows are the observed values in sorted order.
    pub fn from_dataset(dataset: &Dataset, attribute: GroupingAttribute) -> Self {
        let rows = match attribute {
            GroupingAttribute::Sex => {
                let mut counts: BTreeMap<Sex, (u64, u64)> =
                    Sex::ALL.iter().map(|&s| (s, (0, 0))).collect();
                tally(dataset, &mut counts, Record::sex);
                labelled(counts)
            }
            GroupingAttribute::Department => {
                let mut counts: BTreeMap<String, (u64, u64)> = BTreeMap::new();
                tally(dataset, &mut counts, |r| r.department().to_string());
                labelled(counts)
            }
            GroupingAttribute::Year => {
                let mut counts: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
                tally(dataset, &mut counts, Record::year);
                labelled(counts)
            }
        };

        Self::from_counts(attribute, rows)
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn row_total(&self, row: usize) -> u64 {
        self.accepted[row] + self.rejected[row]
    }

    /// Column totals as (accepted, rejected)
    pub fn column_totals(&self) -> (u64, u64) {
        (self.accepted.iter().sum(), self.rejected.iter().sum())
    }

    pub fn grand_total(&self) -> u64 {
        let (a, r) = self.column_totals();
        a + r
    }

    /// Expected frequencies under independence, `[accepted, rejected]` per row
    pub fn expected(&self) -> Vec<[f64; 2]> {
        let (col_a, col_r) = self.column_totals();
        let total = self.grand_total() as f64;
        (0..self.rows())
            .map(|i| {
                let row = self.row_total(i) as f64;
                if total == 0.0 {
                    [0.0, 0.0]
                } else {
                    [row * col_a as f64 / total, row * col_r as f64 / total]
                }
            })
            .collect()
    }
}

fn tally<K: Ord>(
    dataset: &Dataset,
    counts: &mut BTreeMap<K, (u64, u64)>,
    key: impl Fn(&Record) -> K,
) {
    for record in dataset {
        let entry = counts.entry(key(record)).or_insert((0, 0));
        if record.admission().is_accepted() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
}

fn labelled<K: ToString>(counts: BTreeMap<K, (u64, u64)>) -> Vec<(String, u64, u64)> {
    counts
        .into_iter()
        .map(|(k, (a, r))| (k.to_string(), a, r))
        .collect()
}

/// Result of a chi-square independence test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndependenceTest {
    pub attribute: GroupingAttribute,
    /// Chi-square statistic
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    /// `p_value < SIGNIFICANCE_LEVEL`
    pub significant: bool,
    /// Whether Yates' correction was applied
    pub correction_applied: bool,
    /// Expected frequencies, `[accepted, rejected]` per row
    pub expected: Vec<[f64; 2]>,
    pub contingency_table: ContingencyTable,
}

/// Test association between `attribute` and admission outcome
pub fn test_independence(dataset: &Dataset, attribute: GroupingAttribute) -> Result<IndependenceTest> {
    test_independence_with(dataset, attribute, ContinuityCorrection::default())
}

/// Same as [`test_independence`] with an explicit correction policy
pub fn test_independence_with(
    dataset: &Dataset,
    attribute: GroupingAttribute,
    correction: ContinuityCorrection,
) -> Result<IndependenceTest> {
    let table = ContingencyTable::from_dataset(dataset, attribute);
    chi_square(table, correction)
}

/// Chi-square test on a prepared contingency table
pub fn chi_square(
    table: ContingencyTable,
    correction: ContinuityCorrection,
) -> Result<IndependenceTest> {
    if table.rows() < 2 {
        return Err(AnalysisError::DegenerateTable(format!(
            "{} has {} category; at least 2 are required",
            table.attribute,
            table.rows()
        )));
    }

    let expected = table.expected();
    for (i, cells) in expected.iter().enumerate() {
        if cells.iter().any(|&e| e <= 0.0) {
            return Err(AnalysisError::DegenerateTable(format!(
                "{} = '{}' has a non-positive expected frequency (row total {}, column totals {:?})",
                table.attribute,
                table.labels[i],
                table.row_total(i),
                table.column_totals()
            )));
        }
    }

    let degrees_of_freedom = table.rows() - 1;
    let correction_applied = degrees_of_freedom == 1 && correction == ContinuityCorrection::Yates;

    let mut statistic = 0.0;
    for (i, cells) in expected.iter().enumerate() {
        let observed = [table.accepted[i] as f64, table.rejected[i] as f64];
        for (obs, &exp) in observed.iter().zip(cells.iter()) {
            let mut diff = obs - exp;
            if correction_applied {
                // shrink |O - E| by 0.5, never past zero
                diff = diff.signum() * (diff.abs() - diff.abs().min(0.5));
            }
            statistic += diff * diff / exp;
        }
    }

    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| AnalysisError::DegenerateTable(e.to_string()))?;
    let p_value = distribution.sf(statistic);

    tracing::debug!(
        attribute = %table.attribute,
        statistic,
        p_value,
        degrees_of_freedom,
        "chi-square independence test"
    );

    Ok(IndependenceTest {
        attribute: table.attribute,
        statistic,
        p_value,
        degrees_of_freedom,
        significant: p_value < SIGNIFICANCE_LEVEL,
        correction_applied,
        expected,
        contingency_table: table,
    })
}
