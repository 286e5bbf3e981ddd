//! confound - Simpson's paradox detection for admissions data
//!
//! This library loads applicant records, aggregates admission rates by
//! department and sex, tests independence with chi-square, and compares a
//! gender-only logistic regression against one that controls for department.
//! A sign change of the gender coefficient between the two fits is reported
//! as Simpson's paradox.
//!
//! ```
//! use confound::comparison::compare;
//! use confound::dataset::{Dataset, RawRecord};
//!
//! let mut raw = Vec::new();
//! for (dept, sex, admitted, rejected) in [
//!     ("A", "M", 60, 20),
//!     ("A", "F", 16, 4),
//!     ("B", "M", 4, 16),
//!     ("B", "F", 20, 60),
//! ] {
//!     raw.extend((0..admitted).map(|_| RawRecord::new("1973", dept, sex, "Accepted")));
//!     raw.extend((0..rejected).map(|_| RawRecord::new("1973", dept, sex, "Rejected")));
//! }
//! let dataset = Dataset::from_raw(&raw).unwrap();
//! let result = compare(&dataset).unwrap();
//! assert!(result.paradox_detected);
//! ```

pub mod aggregate;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod csv_output;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod independence;
pub mod json_output;
pub mod loader;
pub mod pipeline;
pub mod regression;
pub mod report;

pub use comparison::{compare, compare_with, ComparisonConfig, ComparisonResult};
pub use config::AnalysisConfig;
pub use dataset::{Dataset, RawRecord, Record};
pub use error::{AnalysisError, Result};
pub use pipeline::{run, Analysis};
