//! CSV input for admissions records
//!
//! The header must name `Year`, `Major`, `Sex` and `Admission` (any order,
//! case-insensitive, extra columns ignored). Quoting and line endings
//! (`\n`, `\r\n` or bare `\r`) are handled by the `csv` reader; fields are
//! trimmed and blank lines are skipped.

use crate::dataset::{Dataset, RawRecord};
use crate::error::AnalysisError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 4] = ["Year", "Major", "Sex", "Admission"];

/// Errors raised while loading input
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Schema(#[from] AnalysisError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Read raw records from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let records = parse_records(&content)?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Read and validate a CSV file
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let raw = load_records(path)?;
    Ok(Dataset::from_raw(&raw)?)
}

/// Parse CSV text into raw records
///
/// Empty fields become `None`; validation happens later in
/// [`Dataset::from_raw`].
pub fn parse_records(content: &str) -> std::result::Result<Vec<RawRecord>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = reader
        .records()
        .map(|result| result.map_err(|e| AnalysisError::Schema(format!("malformed CSV: {}", e))))
        .filter(|row| !matches!(row, Ok(record) if is_blank(record)));

    let header = rows
        .next()
        .transpose()?
        .ok_or_else(|| AnalysisError::Schema("input has no header row".to_string()))?;
    let columns = locate_columns(&header)?;

    rows.map(|row| {
        let record = row?;
        if record.len() > header.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(AnalysisError::Schema(format!(
                "line {}: {} fields but header has {}",
                line,
                record.len(),
                header.len()
            )));
        }

        let field = |i: usize| -> Option<String> {
            record
                .get(i)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
        };

        Ok(RawRecord {
            year: field(columns[0]),
            major: field(columns[1]),
            sex: field(columns[2]),
            admission: field(columns[3]),
        })
    })
    .collect()
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Column index of each required field
fn locate_columns(header: &csv::StringRecord) -> std::result::Result<[usize; 4], AnalysisError> {
    let mut indices = [0usize; 4];
    let mut missing = Vec::new();

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match header
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        {
            Some(i) => indices[slot] = i,
            None => missing.push(*name),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(AnalysisError::Schema(format!(
            "header is missing required column(s): {}",
            missing.join(", ")
        )))
    }
}
