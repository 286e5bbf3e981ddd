// In-sample classification metrics for fitted models
//
// Class 0 is "Rejected" and class 1 is "Accepted". Ratios with a zero
// denominator are reported as 0.0.

use serde::Serialize;

/// 2 × 2 confusion matrix (positive class = Accepted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_positive: u64,
}

impl ConfusionMatrix {
    /// Tally true vs. predicted 0/1 labels
    pub fn from_labels(truth: &[u8], predicted: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t != 0, p != 0) {
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (true, true) => matrix.true_positive += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> u64 {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Fraction of correct labels, NaN when empty
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            f64::NAN
        } else {
            (self.true_negative + self.true_positive) as f64 / total as f64
        }
    }
}

/// Precision / recall / F1 for one class (or an average)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: u64,
}

impl ClassMetrics {
    fn from_counts(true_pos: u64, false_pos: u64, false_neg: u64) -> Self {
        let precision = ratio(true_pos, true_pos + false_pos);
        let recall = ratio(true_pos, true_pos + false_neg);
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1_score,
            support: true_pos + false_neg,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-class and averaged metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub rejected: ClassMetrics,
    pub accepted: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_labels(truth: &[u8], predicted: &[u8]) -> Self {
        let confusion = ConfusionMatrix::from_labels(truth, predicted);
        let ConfusionMatrix {
            true_negative: tn,
            false_positive: fp,
            false_negative: fn_,
            true_positive: tp,
        } = confusion;

        let accepted = ClassMetrics::from_counts(tp, fp, fn_);
        // for the Rejected class the roles of the off-diagonal cells swap
        let rejected = ClassMetrics::from_counts(tn, fn_, fp);
        let total = confusion.total();

        let macro_avg = ClassMetrics {
            precision: (rejected.precision + accepted.precision) / 2.0,
            recall: (rejected.recall + accepted.recall) / 2.0,
            f1_score: (rejected.f1_score + accepted.f1_score) / 2.0,
            support: total,
        };

        let weight = |r: f64, a: f64| {
            if total == 0 {
                0.0
            } else {
                (r * rejected.support as f64 + a * accepted.support as f64) / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(rejected.precision, accepted.precision),
            recall: weight(rejected.recall, accepted.recall),
            f1_score: weight(rejected.f1_score, accepted.f1_score),
            support: total,
        };

        Self {
            rejected,
            accepted,
            accuracy: confusion.accuracy(),
            macro_avg,
            weighted_avg,
            confusion,
        }
    }
}
