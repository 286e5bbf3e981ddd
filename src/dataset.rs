//! Admissions records and the validated dataset container
//!
//! The schema is fixed: every applicant has a year, a department (`Major`),
//! a sex and an admission outcome. Raw text records are validated once, when
//! the [`Dataset`] is built, so downstream analyses never re-check fields.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Applicant sex
///
/// Encoded as `gender = 1` for [`Sex::Male`] and `gender = 0` for
/// [`Sex::Female`]. This direction fixes the sign of every gender coefficient:
/// a positive coefficient favors male applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Sex {
    /// Both categories in table order (F before M)
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    /// Parse a raw sex label (`M`/`Male`/`F`/`Female`, case-insensitive)
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(AnalysisError::Encoding {
                field: "Sex",
                value: value.to_string(),
                expected: "M or F",
            }),
        }
    }

    /// Short dataset label
    pub fn code(self) -> &'static str {
        match self {
            Sex::Female => "F",
            Sex::Male => "M",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Admission outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Admission {
    Accepted,
    Rejected,
}

impl Admission {
    /// Parse a raw outcome label (`Accepted`/`Rejected`, case-insensitive)
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" => Ok(Admission::Accepted),
            "rejected" => Ok(Admission::Rejected),
            _ => Err(AnalysisError::Encoding {
                field: "Admission",
                value: value.to_string(),
                expected: "Accepted or Rejected",
            }),
        }
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Accepted => f.write_str("Accepted"),
            Admission::Rejected => f.write_str("Rejected"),
        }
    }
}

/// One applicant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    year: i32,
    department: String,
    sex: Sex,
    admission: Admission,
}

impl Record {
    /// Create a record; the department label must not be blank
    pub fn new(
        year: i32,
        department: impl Into<String>,
        sex: Sex,
        admission: Admission,
    ) -> Result<Self> {
        let department = department.into().trim().to_string();
        if department.is_empty() {
            return Err(AnalysisError::Schema(
                "department ('Major') must not be blank".to_string(),
            ));
        }

        Ok(Self {
            year,
            department,
            sex,
            admission,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }
}

/// Untyped record as delivered by a loader
///
/// Fields are `None` when the source had no value for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub year: Option<String>,
    pub major: Option<String>,
    pub sex: Option<String>,
    pub admission: Option<String>,
}

impl RawRecord {
    /// Build a fully populated raw record
    pub fn new(year: &str, major: &str, sex: &str, admission: &str) -> Self {
        Self {
            year: Some(year.to_string()),
            major: Some(major.to_string()),
            sex: Some(sex.to_string()),
            admission: Some(admission.to_string()),
        }
    }

    /// Validate into a typed [`Record`]
    ///
    /// Missing or blank fields and a non-integer year are schema errors;
    /// unexpected sex or outcome categories are encoding errors.
    pub fn validate(&self) -> Result<Record> {
        let year_text = required("Year", self.year.as_deref())?;
        let year = year_text.parse::<i32>().map_err(|_| {
            AnalysisError::Schema(format!("field 'Year' is not an integer: '{}'", year_text))
        })?;
        let major = required("Major", self.major.as_deref())?;
        let sex = Sex::parse(required("Sex", self.sex.as_deref())?)?;
        let admission = Admission::parse(required("Admission", self.admission.as_deref())?)?;

        Record::new(year, major, sex, admission)
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AnalysisError::Schema(format!(
            "missing required field '{}'",
            field
        ))),
    }
}

/// Ordered collection of validated records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Validate raw records, failing on the first bad row
    ///
    /// Schema errors are prefixed with the 1-based row number.
    pub fn from_raw(raw: &[RawRecord]) -> Result<Self> {
        let mut records = Vec::with_capacity(raw.len());
        for (index, row) in raw.iter().enumerate() {
            let record = row.validate().map_err(|err| match err {
                AnalysisError::Schema(msg) => {
                    AnalysisError::Schema(format!("row {}: {}", index + 1, msg))
                }
                other => other,
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct department labels in sorted order
    pub fn departments(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.department.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Headline counts for the dataset
    pub fn summary(&self) -> DatasetSummary {
        let total = self.records.len();
        let total_admitted = self
            .records
            .iter()
            .filter(|r| r.admission.is_accepted())
            .count();
        let male_applicants = self.records.iter().filter(|r| r.sex == Sex::Male).count();

        DatasetSummary {
            total_applications: total,
            departments: self.departments().len(),
            male_applicants,
            female_applicants: total - male_applicants,
            total_admitted,
            total_rejected: total - total_admitted,
            overall_admission_rate: if total == 0 {
                f64::NAN
            } else {
                total_admitted as f64 / total as f64
            },
        }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Basic dataset statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_applications: usize,
    pub departments: usize,
    pub male_applicants: usize,
    pub female_applicants: usize,
    pub total_admitted: usize,
    pub total_rejected: usize,
    /// NaN for an empty dataset
    pub overall_admission_rate: f64,
}
