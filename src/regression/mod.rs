// Logistic Regression of Admission Outcomes
//
// Fits `admitted ~ intercept + predictors` by maximum likelihood and reports
// coefficients, odds ratios and in-sample classification quality.
//
// Implementation:
// - Newton-Raphson / IRLS on a dense design matrix (nalgebra)
// - Cholesky solve of the (optionally ridge-penalized) Hessian
// - Step halving keeps the log-likelihood monotone
// - Deterministic: fixed zero start, no sampling
//
// Failure modes:
// - DegenerateInput: empty data, single outcome class, constant or collinear
//   predictors
// - ConvergenceWarning (non-fatal): iteration cap or singular Hessian, the
//   best iterate is still returned

mod config;
mod logistic;
mod metrics;

pub use config::FitConfig;
pub use logistic::{
    fit, fit_with, sigmoid, CoefficientRow, ConvergenceFailure, ConvergenceWarning, ModelResult,
    DECISION_THRESHOLD,
};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
