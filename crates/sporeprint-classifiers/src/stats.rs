//! Binary classification metrics.
//!
//! Labels are the encoded target codes; `1` is the positive (poisonous) class.
//! Scores are positive-class probabilities where higher means more likely positive.
//! Accuracy, precision, recall and the ROC curve come from `linfa::metrics`; the
//! precision-recall curve has no linfa counterpart and is computed here.
use std::collections::HashMap;

use linfa::dataset::{AsTargets, Labels, Pr};
use linfa::metrics::{BinaryClassification, ToConfusionMatrix};
use ndarray::{Array1, ArrayView1, Ix1};

use crate::error::{ClassifierError, Result};

pub const POSITIVE_LABEL: usize = 1;
pub const NEGATIVE_LABEL: usize = 0;

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(ClassifierError::LengthMismatch {
            scores: a,
            labels: b,
        });
    }
    Ok(())
}

fn binarize(labels: &Array1<usize>) -> Array1<usize> {
    labels.mapv(|label| usize::from(label == POSITIVE_LABEL))
}

/// Labels whose class list is always `[positive, negative]`, so linfa's binary
/// scores refer to the poisonous class even when one class is absent.
struct PositiveFirst(Array1<usize>);

impl AsTargets for PositiveFirst {
    type Elem = usize;
    type Ix = Ix1;

    fn as_targets(&self) -> ArrayView1<usize> {
        self.0.view()
    }
}

impl Labels for PositiveFirst {
    type Elem = usize;

    fn label_count(&self) -> Vec<HashMap<usize, usize>> {
        let mut counts = HashMap::from([(POSITIVE_LABEL, 0), (NEGATIVE_LABEL, 0)]);
        for &label in self.0.iter() {
            *counts.entry(label).or_insert(0) += 1;
        }
        vec![counts]
    }

    fn labels(&self) -> Vec<usize> {
        vec![POSITIVE_LABEL, NEGATIVE_LABEL]
    }
}

/// linfa yields NaN for a zero denominator.
fn finite_or_zero(value: f32) -> f64 {
    if value.is_finite() {
        value as f64
    } else {
        0.0
    }
}

/// 2x2 confusion matrix. Rows are true labels, columns are predicted labels.
///
/// The scores are taken from linfa's confusion matrix with the true labels on
/// its rows and the positive class first.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
    accuracy: f64,
    precision: f64,
    recall: f64,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<Self> {
        check_lengths(y_pred.len(), y_true.len())?;
        let truth = binarize(y_true);
        let predicted = binarize(y_pred);

        let scores = PositiveFirst(truth.clone()).confusion_matrix(&predicted)?;

        let mut cm = ConfusionMatrix {
            accuracy: finite_or_zero(scores.accuracy()),
            precision: finite_or_zero(scores.precision()),
            recall: finite_or_zero(scores.recall()),
            ..ConfusionMatrix::default()
        };
        for (&actual, &pred) in truth.iter().zip(predicted.iter()) {
            match (actual == POSITIVE_LABEL, pred == POSITIVE_LABEL) {
                (false, false) => cm.true_negatives += 1,
                (false, true) => cm.false_positives += 1,
                (true, false) => cm.false_negatives += 1,
                (true, true) => cm.true_positives += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    /// Counts laid out as `[[tn, fp], [fn, tp]]`.
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Zero when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Zero when there are no positive samples.
    pub fn recall(&self) -> f64 {
        self.recall
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn accuracy_score(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
    if y_true.is_empty() {
        return Err(ClassifierError::EmptyInput("accuracy"));
    }
    Ok(ConfusionMatrix::from_predictions(y_true, y_pred)?.accuracy())
}

pub fn precision_score(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(y_true, y_pred)?.precision())
}

pub fn recall_score(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(y_true, y_pred)?.recall())
}

/// Cumulative false/true positive counts at every distinct score threshold,
/// walking thresholds from the highest score down. Feeds the precision-recall
/// curve, which linfa does not provide.
struct ThresholdCounts {
    thresholds: Vec<f64>,
    fps: Vec<usize>,
    tps: Vec<usize>,
}

fn threshold_counts(y_true: &Array1<usize>, scores: &Array1<f64>) -> Result<ThresholdCounts> {
    check_lengths(scores.len(), y_true.len())?;
    if scores.is_empty() {
        return Err(ClassifierError::EmptyInput("threshold curve"));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut counts = ThresholdCounts {
        thresholds: Vec::new(),
        fps: Vec::new(),
        tps: Vec::new(),
    };
    let (mut tp, mut fp) = (0usize, 0usize);
    for (pos, &idx) in order.iter().enumerate() {
        if y_true[idx] == POSITIVE_LABEL {
            tp += 1;
        } else {
            fp += 1;
        }
        // emit a point only once all samples sharing this score are counted
        let last_of_group = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_group {
            counts.thresholds.push(scores[idx]);
            counts.fps.push(fp);
            counts.tps.push(tp);
        }
    }
    Ok(counts)
}

/// Receiver operating characteristic points.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Decreasing thresholds; the first point (0, 0) uses `+inf`.
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

/// ROC curve and its area, computed by `linfa`'s `BinaryClassification::roc`.
pub fn roc_curve(y_true: &Array1<usize>, scores: &Array1<f64>) -> Result<RocCurve> {
    check_lengths(scores.len(), y_true.len())?;
    if scores.is_empty() {
        return Err(ClassifierError::EmptyInput("roc curve"));
    }
    if let Some(score) = scores.iter().find(|score| !(0.0..=1.0).contains(*score)) {
        return Err(ClassifierError::MalformedData(format!(
            "roc curve needs probabilities in [0, 1], got {}",
            score
        )));
    }

    let truth: Vec<bool> = y_true.iter().map(|&label| label == POSITIVE_LABEL).collect();
    let positives = truth.iter().filter(|&&positive| positive).count();
    if positives == truth.len() {
        log::warn!("No negative samples in y_true, false positive rate is undefined");
    }
    if positives == 0 {
        log::warn!("No positive samples in y_true, true positive rate is undefined");
    }

    let probabilities: Array1<Pr> = scores.mapv(|score| Pr::new(score as f32));
    let roc = probabilities.roc(truth.as_slice())?;

    // linfa walks thresholds upwards and records the fraction of each class
    // scored below the threshold, as (positives, negatives).
    let mut below = roc.get_curve();
    let mut thresholds = roc.get_thresholds();
    let mut area = roc.area_under_curve();
    // no origin is emitted when the lowest scores are zero
    if let Some(&(tp0, fp0)) = below.first() {
        if tp0 > 0.0 || fp0 > 0.0 {
            area += tp0 * fp0 / 2.0;
            below.insert(0, (0.0, 0.0));
            thresholds.insert(0, scores.fold(f64::INFINITY, |a, &b| a.min(b)) as f32);
        }
    }

    let mut curve = RocCurve {
        fpr: Vec::with_capacity(below.len()),
        tpr: Vec::with_capacity(below.len()),
        thresholds: Vec::with_capacity(below.len()),
        auc: finite_or_zero(area),
    };
    for (idx, &(tp_below, fp_below)) in below.iter().enumerate().rev() {
        curve.fpr.push(finite_or_zero(1.0 - fp_below));
        curve.tpr.push(finite_or_zero(1.0 - tp_below));
        curve
            .thresholds
            .push(thresholds.get(idx).map_or(f64::INFINITY, |&t| t as f64));
    }
    Ok(curve)
}

/// Precision/recall points, ordered by increasing threshold and ending at
/// (recall 0, precision 1).
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub average_precision: f64,
}

pub fn precision_recall_curve(
    y_true: &Array1<usize>,
    scores: &Array1<f64>,
) -> Result<PrecisionRecallCurve> {
    let counts = threshold_counts(y_true, scores)?;
    let positives = counts.tps.last().copied().unwrap_or(0);

    // stop once full recall is reached
    let last = counts
        .tps
        .iter()
        .position(|&tp| tp == positives)
        .unwrap_or(counts.tps.len() - 1);

    let mut precision = Vec::with_capacity(last + 2);
    let mut recall = Vec::with_capacity(last + 2);
    let mut thresholds = Vec::with_capacity(last + 1);
    for i in (0..=last).rev() {
        precision.push(ratio(counts.tps[i], counts.tps[i] + counts.fps[i]));
        recall.push(ratio(counts.tps[i], positives));
        thresholds.push(counts.thresholds[i]);
    }
    precision.push(1.0);
    recall.push(0.0);

    // AP = sum_n (R_n - R_{n-1}) P_n over decreasing thresholds
    let average_precision = (0..recall.len() - 1)
        .map(|i| (recall[i] - recall[i + 1]) * precision[i])
        .sum();

    Ok(PrecisionRecallCurve {
        precision,
        recall,
        thresholds,
        average_precision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_matrix_counts() {
        let y_true = Array1::from_vec(vec![0, 0, 1, 1, 1]);
        let y_pred = Array1::from_vec(vec![0, 1, 1, 0, 1]);
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();
        assert_eq!(cm.as_rows(), [[1, 1], [1, 2]]);
        assert!((cm.accuracy() - 0.6).abs() < 1e-6);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-6);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn scores_refer_to_the_positive_class() {
        // class 0 would give precision 1 and recall 3/4
        let y_true = Array1::from_vec(vec![1, 1, 0, 0, 0, 0]);
        let y_pred = Array1::from_vec(vec![1, 1, 1, 0, 0, 0]);
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();
        assert_eq!(cm.as_rows(), [[3, 1], [0, 2]]);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(cm.recall(), 1.0);
        assert!((cm.accuracy() - 5.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn single_predicted_class_still_counts_every_row() {
        let y_true = Array1::from_vec(vec![1, 0, 1, 0]);
        let y_pred = Array1::from_vec(vec![1, 1, 1, 1]);
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();
        assert_eq!(cm.total(), 4);
        assert!((cm.accuracy() - 0.5).abs() < 1e-6);
        assert!((cm.precision() - 0.5).abs() < 1e-6);
        assert_eq!(cm.recall(), 1.0);
    }

    #[test]
    fn precision_is_zero_without_positive_predictions() {
        let y_true = Array1::from_vec(vec![0, 1]);
        let y_pred = Array1::from_vec(vec![0, 0]);
        assert_eq!(precision_score(&y_true, &y_pred).unwrap(), 0.0);
        assert_eq!(recall_score(&y_true, &y_pred).unwrap(), 0.0);
    }

    #[test]
    fn accuracy_of_empty_input_is_an_error() {
        let empty = Array1::<usize>::zeros(0);
        assert!(matches!(
            accuracy_score(&empty, &empty),
            Err(ClassifierError::EmptyInput(_))
        ));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let y_true = Array1::from_vec(vec![0, 1]);
        let scores = Array1::from_vec(vec![0.3]);
        assert!(matches!(
            roc_curve(&y_true, &scores),
            Err(ClassifierError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn roc_of_perfect_ranking() {
        let y_true = Array1::from_vec(vec![0, 0, 1, 1]);
        let scores = Array1::from_vec(vec![0.1, 0.2, 0.8, 0.9]);
        let roc = roc_curve(&y_true, &scores).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.0, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0, 1.0]);
        assert!((roc.auc - 1.0).abs() < 1e-6);
    }

    #[test]
    fn roc_groups_tied_scores() {
        let y_true = Array1::from_vec(vec![0, 1, 0, 1]);
        let scores = Array1::from_vec(vec![0.5, 0.5, 0.5, 0.5]);
        let roc = roc_curve(&y_true, &scores).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 1.0]);
        assert!((roc.auc - 0.5).abs() < 1e-6);
    }

    #[test]
    fn roc_keeps_the_origin_for_zero_scores() {
        let y_true = Array1::from_vec(vec![0, 0, 1, 1]);
        let scores = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0]);
        let roc = roc_curve(&y_true, &scores).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0]);
        assert_eq!(roc.thresholds[2], 0.0);
        // one positive outranks both negatives, the other ties them
        assert!((roc.auc - 0.75).abs() < 1e-6);
    }

    #[test]
    fn scores_outside_unit_interval_are_rejected() {
        let y_true = Array1::from_vec(vec![0, 1]);
        let scores = Array1::from_vec(vec![-0.5, f64::NAN]);
        assert!(matches!(
            roc_curve(&y_true, &scores),
            Err(ClassifierError::MalformedData(_))
        ));
    }

    #[test]
    fn precision_recall_curve_ends_at_full_precision() {
        let y_true = Array1::from_vec(vec![0, 0, 1, 1]);
        let scores = Array1::from_vec(vec![0.1, 0.4, 0.35, 0.8]);
        let pr = precision_recall_curve(&y_true, &scores).unwrap();
        assert_eq!(pr.recall.last(), Some(&0.0));
        assert_eq!(pr.precision.last(), Some(&1.0));
        assert_eq!(pr.precision.len(), pr.thresholds.len() + 1);
        // thresholds 0.35, 0.4, 0.8
        assert_eq!(pr.thresholds, vec![0.35, 0.4, 0.8]);
        assert_eq!(pr.recall, vec![1.0, 0.5, 0.5, 0.0]);
        assert!((pr.precision[0] - 2.0 / 3.0).abs() < 1e-12);
        // AP = 0.5 * 2/3 + 0.5 * 1.0
        assert!((pr.average_precision - (1.0 / 3.0 + 0.5)).abs() < 1e-12);
    }
}
