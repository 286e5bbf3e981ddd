//! Feature encoding: categorical records to numeric columns
//!
//! - `admitted`: 1 for `Accepted`, 0 for `Rejected`
//! - `gender`: 1 for male, 0 for female (see [`Sex`])
//! - one indicator per distinct department, exactly one set per row
//!
//! The full indicator set is kept. Regressing on all of them together with an
//! intercept is rank-deficient; callers drop a reference department first
//! (the [`comparison`](crate::comparison) module does this).

use crate::dataset::{Dataset, RawRecord, Sex};
use crate::error::{AnalysisError, Result};
use nalgebra::DMatrix;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A column that can be used as a regression predictor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredictorColumn {
    /// 1 = male, 0 = female
    Gender,
    /// Indicator for one department label
    Department(String),
}

impl PredictorColumn {
    pub fn department(label: impl Into<String>) -> Self {
        PredictorColumn::Department(label.into())
    }
}

impl fmt::Display for PredictorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictorColumn::Gender => f.write_str("Gender"),
            PredictorColumn::Department(label) => write!(f, "Major_{}", label),
        }
    }
}

impl Serialize for PredictorColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One encoded applicant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedRow {
    pub admitted: u8,
    pub gender: u8,
    /// Indicators aligned with [`EncodedDataset::departments`]
    pub departments: Vec<u8>,
}

/// Encoded rows plus the department labels that name the indicator columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedDataset {
    departments: Vec<String>,
    rows: Vec<EncodedRow>,
}

impl EncodedDataset {
    /// Department labels, sorted; one indicator column each
    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn rows(&self) -> &[EncodedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gender followed by every department indicator
    pub fn all_predictors(&self) -> Vec<PredictorColumn> {
        std::iter::once(PredictorColumn::Gender)
            .chain(self.departments.iter().cloned().map(PredictorColumn::Department))
            .collect()
    }

    /// Outcome column (`admitted`) as floats
    pub fn outcome(&self) -> Vec<f64> {
        self.rows.iter().map(|r| f64::from(r.admitted)).collect()
    }

    /// Values of one predictor column
    pub fn column(&self, predictor: &PredictorColumn) -> Result<Vec<f64>> {
        match predictor {
            PredictorColumn::Gender => Ok(self.rows.iter().map(|r| f64::from(r.gender)).collect()),
            PredictorColumn::Department(label) => {
                let index = self
                    .departments
                    .iter()
                    .position(|d| d == label)
                    .ok_or_else(|| {
                        AnalysisError::Schema(format!("unknown department column '{}'", label))
                    })?;
                Ok(self
                    .rows
                    .iter()
                    .map(|r| f64::from(r.departments[index]))
                    .collect())
            }
        }
    }

    /// Dense n × k matrix of the requested predictors (no intercept column)
    pub fn design_matrix(&self, predictors: &[PredictorColumn]) -> Result<DMatrix<f64>> {
        let columns = predictors
            .iter()
            .map(|p| self.column(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(DMatrix::from_fn(self.rows.len(), predictors.len(), |i, j| {
            columns[j][i]
        }))
    }
}

/// Encode a validated dataset
pub fn encode(dataset: &Dataset) -> EncodedDataset {
    let departments = dataset.departments();
    let index: HashMap<&str, usize> = departments
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .collect();

    let rows = dataset
        .iter()
        .map(|record| {
            let mut indicators = vec![0u8; departments.len()];
            // every record's department is in the index by construction
            if let Some(&i) = index.get(record.department()) {
                indicators[i] = 1;
            }
            EncodedRow {
                admitted: u8::from(record.admission().is_accepted()),
                gender: u8::from(record.sex() == Sex::Male),
                departments: indicators,
            }
        })
        .collect();

    tracing::debug!(
        rows = dataset.len(),
        departments = departments.len(),
        "encoded dataset"
    );

    EncodedDataset { departments, rows }
}

/// Validate raw records and encode them
///
/// Fails with a schema error on missing fields and an encoding error on
/// unexpected sex or outcome categories.
pub fn encode_raw(raw: &[RawRecord]) -> Result<EncodedDataset> {
    let dataset = Dataset::from_raw(raw)?;
    Ok(encode(&dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sample() -> Vec<RawRecord> {
        vec![
            RawRecord::new("1973", "B", "M", "Accepted"),
            RawRecord::new("1973", "A", "F", "Rejected"),
            RawRecord::new("1973", "C", "F", "Accepted"),
            RawRecord::new("1973", "A", "M", "Rejected"),
        ]
    }

    #[test]
    fn test_encode_binary_columns() {
        let encoded = encode_raw(&raw_sample()).unwrap();
        let admitted: Vec<u8> = encoded.rows().iter().map(|r| r.admitted).collect();
        let gender: Vec<u8> = encoded.rows().iter().map(|r| r.gender).collect();
        assert_eq!(admitted, vec![1, 0, 1, 0]);
        assert_eq!(gender, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_encode_full_indicator_set() {
        let encoded = encode_raw(&raw_sample()).unwrap();
        assert_eq!(encoded.departments(), ["A", "B", "C"]);
        assert_eq!(encoded.rows()[0].departments, vec![0, 1, 0]);
        assert_eq!(encoded.rows()[2].departments, vec![0, 0, 1]);
        for row in encoded.rows() {
            assert_eq!(row.departments.iter().map(|&v| v as u32).sum::<u32>(), 1);
        }
    }

    #[test]
    fn test_encode_raw_propagates_encoding_error() {
        let raw = vec![RawRecord::new("1973", "A", "Unknown", "Accepted")];
        assert!(matches!(
            encode_raw(&raw),
            Err(AnalysisError::Encoding { field: "Sex", .. })
        ));
    }

    #[test]
    fn test_encode_raw_propagates_schema_error() {
        let raw = vec![RawRecord {
            sex: None,
            ..RawRecord::new("1973", "A", "M", "Accepted")
        }];
        assert!(matches!(encode_raw(&raw), Err(AnalysisError::Schema(_))));
    }

    #[test]
    fn test_design_matrix_layout() {
        let encoded = encode_raw(&raw_sample()).unwrap();
        let x = encoded
            .design_matrix(&[PredictorColumn::Gender, PredictorColumn::department("A")])
            .unwrap();
        assert_eq!(x.shape(), (4, 2));
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(1, 1)], 1.0);
        assert_eq!(x[(2, 1)], 0.0);
    }

    #[test]
    fn test_unknown_department_column() {
        let encoded = encode_raw(&raw_sample()).unwrap();
        let err = encoded
            .design_matrix(&[PredictorColumn::department("Z")])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[test]
    fn test_predictor_display_names() {
        assert_eq!(PredictorColumn::Gender.to_string(), "Gender");
        assert_eq!(PredictorColumn::department("E").to_string(), "Major_E");
    }

    #[test]
    fn test_all_predictors_order() {
        let encoded = encode_raw(&raw_sample()).unwrap();
        let names: Vec<String> = encoded.all_predictors().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Gender", "Major_A", "Major_B", "Major_C"]);
    }
}
