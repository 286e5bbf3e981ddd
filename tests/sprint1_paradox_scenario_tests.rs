// Sprint 1: Simpson's paradox scenarios end to end
//
// Library-level scenarios from record construction through the comparison,
// plus the 1973 Berkeley graduate admissions counts as a real-world fixture.

use confound::aggregate::aggregate;
use confound::comparison::{compare, CoefficientSign};
use confound::config::AnalysisConfig;
use confound::dataset::{Dataset, RawRecord, Sex};
use confound::encoder::{encode, PredictorColumn};
use confound::error::AnalysisError;
use confound::independence::{test_independence, GroupingAttribute};
use confound::loader::load_dataset;
use confound::pipeline::run;
use confound::regression::fit;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn dataset(counts: &[(&str, &str, usize, usize)]) -> Dataset {
    let mut raw = Vec::new();
    for &(dept, sex, admitted, rejected) in counts {
        raw.extend((0..admitted).map(|_| RawRecord::new("1973", dept, sex, "Accepted")));
        raw.extend((0..rejected).map(|_| RawRecord::new("1973", dept, sex, "Rejected")));
    }
    Dataset::from_raw(&raw).unwrap()
}

/// Berkeley 1973: men 44.5% vs women 30.4% overall, women ahead in most departments
#[test]
fn test_berkeley_paradox_detected() {
    let data = load_dataset(fixture("berkeley_1973.csv")).unwrap();
    assert_eq!(data.len(), 4526);
    assert_eq!(data.departments(), vec!["A", "B", "C", "D", "E", "F"]);

    let result = compare(&data).unwrap();
    assert!(result.paradox_detected);
    assert_eq!(result.naive_sign, CoefficientSign::Positive);
    assert_eq!(result.full_sign, CoefficientSign::Negative);
    assert!((result.naive_gender_coefficient() - 0.6104).abs() < 1e-3);
    assert!((result.full_gender_coefficient() - (-0.0999)).abs() < 1e-3);
    assert!((result.naive.accuracy - 0.6122).abs() < 1e-3);
    assert!((result.full.accuracy - 0.7059).abs() < 1e-3);
    assert!(result.accuracy_change > 0.0);
    assert!(result.naive.converged() && result.full.converged());
}

#[test]
fn test_berkeley_aggregate_and_pooled_rates() {
    let data = load_dataset(fixture("berkeley_1973.csv")).unwrap();
    let table = aggregate(&data);
    assert_eq!(table.len(), 12);
    assert_eq!(table.total_applicants(), 4526);
    assert_eq!(table.total_admitted(), 1755);
    assert!((table.rate("A", Sex::Female).unwrap() - 89.0 / 108.0).abs() < 1e-12);
    assert!((table.rate("A", Sex::Male).unwrap() - 512.0 / 825.0).abs() < 1e-12);

    let pooled = table.pooled_by_sex();
    assert_eq!((pooled[0].admitted, pooled[0].total), (557, 1835));
    assert_eq!((pooled[1].admitted, pooled[1].total), (1198, 2691));
}

#[test]
fn test_berkeley_independence() {
    let data = load_dataset(fixture("berkeley_1973.csv")).unwrap();

    let sex = test_independence(&data, GroupingAttribute::Sex).unwrap();
    assert!(sex.correction_applied);
    assert!((sex.statistic - 91.6096).abs() < 1e-3);
    assert!(sex.significant);

    let major = test_independence(&data, GroupingAttribute::Department).unwrap();
    assert_eq!(major.degrees_of_freedom, 5);
    assert!(!major.correction_applied);
    assert!((major.statistic - 778.9065).abs() < 1e-3);
    assert!(major.p_value < 1e-100);
}

#[test]
fn test_berkeley_full_pipeline() {
    let data = load_dataset(fixture("berkeley_1973.csv")).unwrap();
    let analysis = run(&data, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.summary.total_applications, 4526);
    assert_eq!(analysis.summary.male_applicants, 2691);
    assert_eq!(analysis.summary.female_applicants, 1835);
    assert_eq!(analysis.independence.len(), 2);
    assert!(analysis.comparison.paradox_detected);

    // departments F is the hardest, A the easiest
    let full = &analysis.comparison.full;
    let table = full.coefficient_table.as_ref().unwrap();
    assert_eq!(table.last().unwrap().predictor, PredictorColumn::department("F"));
}

#[test]
fn test_no_confounding_no_paradox() {
    let data = dataset(&[
        ("A", "M", 30, 20),
        ("A", "F", 30, 20),
        ("B", "M", 15, 35),
        ("B", "F", 15, 35),
    ]);
    let result = compare(&data).unwrap();
    assert_eq!(result.naive_sign, CoefficientSign::Zero);
    assert_eq!(result.full_sign, CoefficientSign::Zero);
    assert!(!result.paradox_detected);
}

#[test]
fn test_consistent_bias_no_paradox() {
    // men ahead both within departments and overall
    let data = dataset(&[
        ("A", "M", 40, 10),
        ("A", "F", 30, 20),
        ("B", "M", 20, 30),
        ("B", "F", 10, 40),
    ]);
    let result = compare(&data).unwrap();
    assert_eq!(result.naive_sign, CoefficientSign::Positive);
    assert_eq!(result.full_sign, CoefficientSign::Positive);
    assert!(!result.paradox_detected);
}

#[test]
fn test_zero_total_category_is_degenerate_table() {
    // nobody admitted anywhere: the Accepted column is empty
    let data = dataset(&[("A", "M", 0, 10), ("A", "F", 0, 10)]);
    let err = test_independence(&data, GroupingAttribute::Sex).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateTable(_)));
}

#[test]
fn test_missing_sex_is_degenerate_table() {
    let data = dataset(&[("A", "M", 5, 10), ("B", "M", 3, 10)]);
    let err = test_independence(&data, GroupingAttribute::Sex).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateTable(_)));
}

#[test]
fn test_full_indicator_set_without_reference_is_degenerate() {
    let data = dataset(&[
        ("A", "M", 10, 5),
        ("A", "F", 6, 4),
        ("B", "M", 3, 9),
        ("B", "F", 7, 8),
    ]);
    let encoded = encode(&data);
    let err = fit(&encoded, &encoded.all_predictors()).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateInput(_)));
}

#[test]
fn test_single_class_outcome_is_degenerate() {
    let data = dataset(&[("A", "M", 10, 0), ("B", "F", 7, 0)]);
    assert!(matches!(
        compare(&data),
        Err(AnalysisError::DegenerateInput(_))
    ));
}

#[test]
fn test_perfect_separation_returns_with_warning() {
    let data = dataset(&[("A", "M", 25, 0), ("A", "F", 0, 25), ("B", "M", 25, 0), ("B", "F", 0, 25)]);
    let encoded = encode(&data);
    let model = fit(&encoded, &[PredictorColumn::Gender]).unwrap();
    assert!(model.convergence_warning.is_some());
    assert!(model.gender_coefficient().unwrap() > 10.0);
    assert_eq!(model.accuracy, 1.0);
}

#[test]
fn test_invalid_category_reports_field() {
    let err = Dataset::from_raw(&[RawRecord::new("1973", "A", "M", "Waitlisted")]).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Encoding {
            field: "Admission",
            ..
        }
    ));
    assert!(err.to_string().contains("Waitlisted"));
}
