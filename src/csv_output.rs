//! CSV output format for the aggregate admission table
//!
//! Columns: `Major,Sex,Admitted,Total,Admission_Rate`

use crate::aggregate::{AggregateTable, GroupStats};

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    groups: Vec<GroupStats>,
    precision: usize,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new(precision: usize) -> Self {
        Self {
            groups: Vec::new(),
            precision,
        }
    }

    /// Formatter pre-filled with every group of `table`
    pub fn from_table(table: &AggregateTable, precision: usize) -> Self {
        let mut output = Self::new(precision);
        for group in table.groups() {
            output.add_group(group.clone());
        }
        output
    }

    /// Add a group row
    pub fn add_group(&mut self, group: GroupStats) {
        self.groups.push(group);
    }

    fn header(&self) -> &'static str {
        "Major,Sex,Admitted,Total,Admission_Rate"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    pub(crate) fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a group as CSV row; an undefined rate is left empty
    fn format_group(&self, group: &GroupStats) -> String {
        let rate = if group.admission_rate.is_nan() {
            String::new()
        } else {
            format!("{:.*}", self.precision, group.admission_rate)
        };

        [
            Self::escape_field(&group.department),
            group.sex.code().to_string(),
            group.admitted.to_string(),
            group.total.to_string(),
            rate,
        ]
        .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(self.header());
        output.push('\n');

        for group in &self.groups {
            output.push_str(&self.format_group(group));
            output.push('\n');
        }

        output
    }
}
