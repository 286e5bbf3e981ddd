// Binary logistic regression by Newton-Raphson (IRLS)
//
// P(admitted = 1) = sigmoid(intercept + Σ βᵢ xᵢ)
//
// - Starts from all-zero coefficients and uses no randomness, so repeated fits
//   on identical input are bit-identical.
// - Each Newton step solves (XᵀWX + λI') δ = Xᵀ(y − p) − λβ' through a
//   Cholesky factorization; a step that lowers the log-likelihood is halved.
// - Convergence is judged on the full Newton step, never on a halved one.
// - Rank deficiency and single-class outcomes are rejected before fitting.
// - Hitting the iteration cap, a singular Hessian (perfect separation) or a
//   step that cannot be made to improve is not fatal: the best iterate is
//   returned with a ConvergenceWarning.

use crate::encoder::{EncodedDataset, PredictorColumn};
use crate::error::{AnalysisError, Result};
use crate::regression::config::FitConfig;
use crate::regression::metrics::ClassificationReport;
use nalgebra::{Cholesky, DMatrix, DVector};
use serde::Serialize;
use std::fmt;

/// Predicted probability above which a row is labelled Accepted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Relative singular-value cutoff for declaring XᵀX rank-deficient
const RANK_TOLERANCE: f64 = 1e-10;

const MAX_STEP_HALVINGS: usize = 30;

/// Relative log-likelihood drop tolerated as rounding noise in the line search
const LIKELIHOOD_SLACK: f64 = 1e-12;

/// Why a fit stopped before converging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConvergenceFailure {
    /// The iteration cap was reached
    IterationLimit,
    /// XᵀWX lost positive definiteness, typically from perfect separation
    SingularHessian,
    /// No halving of the Newton step kept the log-likelihood from falling
    NoImprovingStep,
}

/// Non-fatal notice that a fit did not converge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceWarning {
    pub reason: ConvergenceFailure,
    /// Newton iterations performed
    pub iterations: usize,
    /// Largest absolute component of the last full Newton step
    pub last_step: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            ConvergenceFailure::IterationLimit => "iteration limit reached",
            ConvergenceFailure::SingularHessian => "singular Hessian (possible perfect separation)",
            ConvergenceFailure::NoImprovingStep => "no step improved the log-likelihood",
        };
        write!(
            f,
            "ConvergenceWarning: logistic fit did not converge after {} iterations ({}); last step {:.3e}",
            self.iterations, reason, self.last_step
        )
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRow {
    pub predictor: PredictorColumn,
    pub coefficient: f64,
    pub odds_ratio: f64,
}

/// Fitted logistic model and its in-sample diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResult {
    /// Predictors in design-matrix order
    pub predictors: Vec<PredictorColumn>,
    pub intercept: f64,
    /// One coefficient per predictor
    pub coefficients: Vec<f64>,
    /// exp(coefficient) per predictor
    pub odds_ratios: Vec<f64>,
    /// In-sample accuracy at the 0.5 threshold
    pub accuracy: f64,
    /// 0/1 labels per row
    #[serde(skip)]
    pub predictions: Vec<u8>,
    /// P(admitted = 1) per row
    #[serde(skip)]
    pub probabilities: Vec<f64>,
    pub classification_report: ClassificationReport,
    /// Sorted by coefficient, descending; only for multi-predictor models
    pub coefficient_table: Option<Vec<CoefficientRow>>,
    /// Log-likelihood at the returned coefficients (penalty included)
    pub log_likelihood: f64,
    pub iterations: usize,
    pub convergence_warning: Option<ConvergenceWarning>,
}

impl ModelResult {
    pub fn coefficient(&self, predictor: &PredictorColumn) -> Option<f64> {
        self.position(predictor).map(|i| self.coefficients[i])
    }

    pub fn odds_ratio(&self, predictor: &PredictorColumn) -> Option<f64> {
        self.position(predictor).map(|i| self.odds_ratios[i])
    }

    pub fn gender_coefficient(&self) -> Option<f64> {
        self.coefficient(&PredictorColumn::Gender)
    }

    pub fn gender_odds_ratio(&self) -> Option<f64> {
        self.odds_ratio(&PredictorColumn::Gender)
    }

    pub fn converged(&self) -> bool {
        self.convergence_warning.is_none()
    }

    fn position(&self, predictor: &PredictorColumn) -> Option<usize> {
        self.predictors.iter().position(|p| p == predictor)
    }
}

/// Fit with the default configuration
pub fn fit(data: &EncodedDataset, predictors: &[PredictorColumn]) -> Result<ModelResult> {
    fit_with(data, predictors, &FitConfig::default())
}

/// Fit `admitted ~ intercept + predictors`
pub fn fit_with(
    data: &EncodedDataset,
    predictors: &[PredictorColumn],
    config: &FitConfig,
) -> Result<ModelResult> {
    config.validate()?;

    if data.is_empty() {
        return Err(AnalysisError::DegenerateInput(
            "cannot fit a model on zero rows".to_string(),
        ));
    }
    if predictors.is_empty() {
        return Err(AnalysisError::DegenerateInput(
            "at least one predictor is required".to_string(),
        ));
    }

    let outcome = data.outcome();
    let admitted = outcome.iter().filter(|&&v| v == 1.0).count();
    if admitted == 0 || admitted == outcome.len() {
        return Err(AnalysisError::DegenerateInput(format!(
            "outcome has a single observed class ({} of {} admitted)",
            admitted,
            outcome.len()
        )));
    }

    let design = data.design_matrix(predictors)?;
    check_rank(&design, predictors)?;

    let x = with_intercept(&design);
    let y = DVector::from_vec(outcome);

    tracing::debug!(
        rows = x.nrows(),
        predictors = predictors.len(),
        "fitting logistic regression"
    );

    let solution = newton(&x, &y, config);
    if let Some(warning) = &solution.warning {
        tracing::warn!("{}", warning);
    }

    let probabilities: Vec<f64> = (&x * &solution.beta).iter().map(|&e| sigmoid(e)).collect();
    let predictions: Vec<u8> = probabilities
        .iter()
        .map(|&p| u8::from(p > DECISION_THRESHOLD))
        .collect();
    let truth: Vec<u8> = data.rows().iter().map(|r| r.admitted).collect();
    let classification_report = ClassificationReport::from_labels(&truth, &predictions);

    let intercept = solution.beta[0];
    let coefficients: Vec<f64> = solution.beta.iter().skip(1).copied().collect();
    let odds_ratios: Vec<f64> = coefficients.iter().map(|c| c.exp()).collect();

    let coefficient_table = (predictors.len() > 1).then(|| {
        let mut rows: Vec<CoefficientRow> = predictors
            .iter()
            .zip(coefficients.iter().zip(&odds_ratios))
            .map(|(p, (&c, &o))| CoefficientRow {
                predictor: p.clone(),
                coefficient: c,
                odds_ratio: o,
            })
            .collect();
        rows.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));
        rows
    });

    tracing::debug!(
        iterations = solution.iterations,
        log_likelihood = solution.log_likelihood,
        accuracy = classification_report.accuracy,
        "logistic regression fitted"
    );

    Ok(ModelResult {
        predictors: predictors.to_vec(),
        intercept,
        coefficients,
        odds_ratios,
        accuracy: classification_report.accuracy,
        predictions,
        probabilities,
        classification_report,
        coefficient_table,
        log_likelihood: solution.log_likelihood,
        iterations: solution.iterations,
        convergence_warning: solution.warning,
    })
}

fn with_intercept(design: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(design.nrows(), design.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            design[(i, j - 1)]
        }
    })
}

/// Reject designs whose columns (plus an intercept) are linearly dependent
fn check_rank(design: &DMatrix<f64>, predictors: &[PredictorColumn]) -> Result<()> {
    for (j, predictor) in predictors.iter().enumerate() {
        let column = design.column(j);
        if column.iter().all(|&v| v == column[0]) {
            return Err(AnalysisError::DegenerateInput(format!(
                "predictor '{}' is constant ({}) and collinear with the intercept",
                predictor, column[0]
            )));
        }
    }

    let x = with_intercept(design);
    let singular_values = x.tr_mul(&x).svd(false, false).singular_values;
    let largest = singular_values.max();
    let smallest = singular_values.min();

    if smallest.is_nan() || smallest <= largest * RANK_TOLERANCE {
        let names: Vec<String> = predictors.iter().map(|p| p.to_string()).collect();
        return Err(AnalysisError::DegenerateInput(format!(
            "design matrix [Intercept, {}] is rank-deficient; drop a reference category \
             from a full indicator set",
            names.join(", ")
        )));
    }

    Ok(())
}

struct Solution {
    beta: DVector<f64>,
    log_likelihood: f64,
    iterations: usize,
    warning: Option<ConvergenceWarning>,
}

fn newton(x: &DMatrix<f64>, y: &DVector<f64>, config: &FitConfig) -> Solution {
    let k = x.ncols();
    let penalty = config.l2_penalty;

    let mut beta = DVector::<f64>::zeros(k);
    let mut log_likelihood = penalized_log_likelihood(x, y, &beta, penalty);
    let mut best = (beta.clone(), log_likelihood);
    let mut last_step = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let p = (x * &beta).map(sigmoid);
        let mut gradient = x.tr_mul(&(y - &p));

        let weighted = DMatrix::from_fn(x.nrows(), k, |i, j| x[(i, j)] * p[i] * (1.0 - p[i]));
        let mut hessian = x.tr_mul(&weighted);

        if penalty > 0.0 {
            for j in 1..k {
                gradient[j] -= penalty * beta[j];
                hessian[(j, j)] += penalty;
            }
        }

        let Some(cholesky) = Cholesky::new(hessian) else {
            return Solution {
                beta: best.0,
                log_likelihood: best.1,
                iterations: iteration - 1,
                warning: Some(ConvergenceWarning {
                    reason: ConvergenceFailure::SingularHessian,
                    iterations: iteration - 1,
                    last_step,
                }),
            };
        };

        let mut step = cholesky.solve(&gradient);
        if step.iter().any(|v| !v.is_finite()) {
            return Solution {
                beta: best.0,
                log_likelihood: best.1,
                iterations: iteration - 1,
                warning: Some(ConvergenceWarning {
                    reason: ConvergenceFailure::SingularHessian,
                    iterations: iteration - 1,
                    last_step,
                }),
            };
        }

        // converged on the full Newton step, before any halving
        last_step = step.amax();
        if last_step < config.tolerance {
            let beta = &beta + &step;
            let log_likelihood = penalized_log_likelihood(x, y, &beta, penalty);
            return Solution {
                beta,
                log_likelihood,
                iterations: iteration,
                warning: None,
            };
        }

        let floor = log_likelihood - LIKELIHOOD_SLACK * log_likelihood.abs();
        let mut halvings = 0;
        let (candidate, candidate_ll) = loop {
            let candidate = &beta + &step;
            let candidate_ll = penalized_log_likelihood(x, y, &candidate, penalty);
            if candidate_ll >= floor {
                break (candidate, candidate_ll);
            }
            if halvings == MAX_STEP_HALVINGS {
                return Solution {
                    beta: best.0,
                    log_likelihood: best.1,
                    iterations: iteration,
                    warning: Some(ConvergenceWarning {
                        reason: ConvergenceFailure::NoImprovingStep,
                        iterations: iteration,
                        last_step,
                    }),
                };
            }
            step *= 0.5;
            halvings += 1;
        };

        beta = candidate;
        log_likelihood = candidate_ll;
        if log_likelihood >= best.1 {
            best = (beta.clone(), log_likelihood);
        }
    }

    Solution {
        beta: best.0,
        log_likelihood: best.1,
        iterations: config.max_iterations,
        warning: Some(ConvergenceWarning {
            reason: ConvergenceFailure::IterationLimit,
            iterations: config.max_iterations,
            last_step,
        }),
    }
}

fn penalized_log_likelihood(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    beta: &DVector<f64>,
    penalty: f64,
) -> f64 {
    let eta = x * beta;
    let ll: f64 = eta
        .iter()
        .zip(y.iter())
        .map(|(&e, &yi)| -(yi * softplus(-e) + (1.0 - yi) * softplus(e)))
        .sum();

    if penalty > 0.0 {
        let slopes: f64 = beta.iter().skip(1).map(|b| b * b).sum();
        ll - 0.5 * penalty * slopes
    } else {
        ll
    }
}

/// Numerically stable logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// log(1 + eˣ) without overflow
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}
