//! Accuracy and per-class precision/recall/F1 for evaluation runs.

use crate::classifier::Label;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Binary confusion matrix indexed as `[actual][predicted]`. Both classes always have a row and a
/// column, whether or not they occur in either input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[Label], predicted: &[Label]) -> Self {
        let mut counts = [[0; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            counts[a.target()][p.target()] += 1;
        }
        ConfusionMatrix { counts }
    }

    pub fn count(&self, actual: Label, predicted: Label) -> usize {
        self.counts[actual.target()][predicted.target()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct = self.count(Label::Real, Label::Real) + self.count(Label::Fake, Label::Fake);
        correct as f64 / total as f64
    }

    /// Precision, recall and F1 for one class; undefined ratios are reported as 0.
    pub fn class_metrics(&self, class: Label) -> ClassMetrics {
        let tp = self.count(class, class) as f64;
        let support: usize = self.counts[class.target()].iter().sum();
        let predicted: usize = self.counts.iter().map(|row| row[class.target()]).sum();

        let precision = if predicted == 0 { 0.0 } else { tp / predicted as f64 };
        let recall = if support == 0 { 0.0 } else { tp / support as f64 };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    }
}

/// Per-class metrics plus accuracy, macro and weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub real: ClassMetrics,
    pub fake: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(actual: &[Label], predicted: &[Label]) -> Self {
        let matrix = ConfusionMatrix::from_labels(actual, predicted);
        let real = matrix.class_metrics(Label::Real);
        let fake = matrix.class_metrics(Label::Fake);
        let total = real.support + fake.support;

        let average = |weight_real: f64, weight_fake: f64| ClassMetrics {
            precision: real.precision * weight_real + fake.precision * weight_fake,
            recall: real.recall * weight_real + fake.recall * weight_fake,
            f1: real.f1 * weight_real + fake.f1 * weight_fake,
            support: total,
        };

        let macro_avg = average(0.5, 0.5);
        let weighted_avg = if total == 0 {
            ClassMetrics::default()
        } else {
            average(
                real.support as f64 / total as f64,
                fake.support as f64 / total as f64,
            )
        };

        ClassificationReport {
            real,
            fake,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        row(f, "Real (0)", &self.real)?;
        row(f, "Fake (1)", &self.fake)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Label::{Fake, Real};

    #[test]
    fn test_confusion_counts() {
        let matrix = ConfusionMatrix::from_labels(&[Real, Real, Fake, Fake], &[Real, Fake, Fake, Fake]);
        assert_eq!(matrix.count(Real, Real), 1);
        assert_eq!(matrix.count(Real, Fake), 1);
        assert_eq!(matrix.count(Fake, Fake), 2);
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.accuracy(), 0.75);
    }

    #[test]
    fn test_report_values() {
        let report = ClassificationReport::new(&[Real, Real, Fake, Fake], &[Real, Fake, Fake, Fake]);
        assert_eq!(report.real.precision, 1.0);
        assert_eq!(report.real.recall, 0.5);
        assert_eq!(report.fake.precision, 2.0 / 3.0);
        assert_eq!(report.fake.recall, 1.0);
        assert_eq!(report.fake.support, 2);
        assert_eq!(report.macro_avg.recall, 0.75);
        assert_eq!(report.weighted_avg.support, 4);
        assert!(report.to_string().contains("Fake (1)"));
    }

    #[test]
    fn test_empty_inputs_do_not_divide_by_zero() {
        let report = ClassificationReport::new(&[], &[]);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.real, ClassMetrics::default());
        assert_eq!(report.weighted_avg, ClassMetrics::default());
    }

    #[test]
    fn test_class_missing_from_predictions_still_counts() {
        let report = ClassificationReport::new(&[Real, Fake], &[Real, Real]);
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.fake.support, 1);
        assert_eq!(report.fake.recall, 0.0);
        assert_eq!(report.fake.precision, 0.0);
        assert_eq!(report.real.precision, 0.5);
        assert_eq!(report.real.recall, 1.0);
    }
}
