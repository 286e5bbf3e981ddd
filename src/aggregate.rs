//! Group-wise admission counts and rates
//!
//! Groups are (department, sex) pairs. Only observed pairs appear in the
//! table, ordered by department then sex.

use crate::dataset::{Dataset, Sex};
use serde::Serialize;
use std::collections::BTreeMap;

/// Admission rate, NaN when there are no applicants
pub fn admission_rate(admitted: u64, total: u64) -> f64 {
    if total == 0 {
        f64::NAN
    } else {
        admitted as f64 / total as f64
    }
}

/// Counts for one (department, sex) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub department: String,
    pub sex: Sex,
    pub admitted: u64,
    pub total: u64,
    /// admitted / total, NaN when total is 0
    pub admission_rate: f64,
}

impl GroupStats {
    pub fn new(department: impl Into<String>, sex: Sex, admitted: u64, total: u64) -> Self {
        Self {
            department: department.into(),
            sex,
            admitted,
            total,
            admission_rate: admission_rate(admitted, total),
        }
    }
}

/// Pooled (department-blind) counts for one sex
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledRate {
    pub sex: Sex,
    pub admitted: u64,
    pub total: u64,
    pub admission_rate: f64,
}

/// Grouped admission table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateTable {
    groups: Vec<GroupStats>,
}

impl AggregateTable {
    /// Build from precomputed groups (kept in the given order)
    pub fn from_groups(groups: Vec<GroupStats>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[GroupStats] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of group totals
    pub fn total_applicants(&self) -> u64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    /// Sum of admitted counts
    pub fn total_admitted(&self) -> u64 {
        self.groups.iter().map(|g| g.admitted).sum()
    }

    /// Admission rate for one group, `None` if the group was not observed
    pub fn rate(&self, department: &str, sex: Sex) -> Option<f64> {
        self.groups
            .iter()
            .find(|g| g.department == department && g.sex == sex)
            .map(|g| g.admission_rate)
    }

    /// Department-blind rates, one entry per sex (F, M)
    pub fn pooled_by_sex(&self) -> Vec<PooledRate> {
        Sex::ALL
            .iter()
            .map(|&sex| {
                let (admitted, total) = self
                    .groups
                    .iter()
                    .filter(|g| g.sex == sex)
                    .fold((0, 0), |(a, t), g| (a + g.admitted, t + g.total));
                PooledRate {
                    sex,
                    admitted,
                    total,
                    admission_rate: admission_rate(admitted, total),
                }
            })
            .collect()
    }
}

/// Count admissions per (department, sex)
pub fn aggregate(dataset: &Dataset) -> AggregateTable {
    let mut counts: BTreeMap<(&str, Sex), (u64, u64)> = BTreeMap::new();

    for record in dataset {
        let entry = counts
            .entry((record.department(), record.sex()))
            .or_insert((0, 0));
        if record.admission().is_accepted() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let groups = counts
        .into_iter()
        .map(|((department, sex), (admitted, total))| {
            GroupStats::new(department, sex, admitted, total)
        })
        .collect();

    AggregateTable { groups }
}
