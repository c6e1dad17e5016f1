use serde::Serialize;
use std::fmt;
use strum::IntoEnumIterator;

use crate::model::RiskLabel;

/// Precision / recall / F1 for one class value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out metrics for one binary label, both classes reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn from_predictions(truth: &[bool], predicted: &[bool]) -> Self {
        let mut tp = 0;
        let mut tn = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t, p) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
            }
        }

        let total = tp + tn + fp + fn_;
        Self {
            positive: class_metrics(tp, fp, fn_),
            negative: class_metrics(tn, fn_, fp),
            accuracy: ratio(tp + tn, total),
        }
    }
}

// Undefined ratios are reported as 0
fn class_metrics(hits: usize, false_alarms: usize, misses: usize) -> ClassMetrics {
    let precision = ratio(hits, hits + false_alarms);
    let recall = ratio(hits, hits + misses);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: hits + misses,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Outcome of the held-out evaluation run during a fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub train_size: usize,
    pub test_size: usize,
    pub cancellation: ClassificationReport,
    pub fraud: ClassificationReport,
}

impl EvaluationReport {
    pub fn report(&self, label: RiskLabel) -> &ClassificationReport {
        match label {
            RiskLabel::Cancellation => &self.cancellation,
            RiskLabel::Fraud => &self.fraud,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model evaluation ({} train / {} held out)",
            self.train_size, self.test_size
        )?;
        for label in RiskLabel::iter() {
            let report = self.report(label);
            writeln!(f)?;
            writeln!(f, "{label} model:")?;
            writeln!(f, "{:>10} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
            for (class, m) in [("0", &report.negative), ("1", &report.positive)] {
                writeln!(
                    f,
                    "{:>10} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                    class, m.precision, m.recall, m.f1, m.support
                )?;
            }
            writeln!(f, "{:>10} {:>29.2} {:>9}", "accuracy", report.accuracy, self.test_size)?;
        }
        Ok(())
    }
}
