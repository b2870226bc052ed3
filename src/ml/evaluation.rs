use std::collections::BTreeMap;

use crate::domain::classification::LabelMap;

/// Label name → F1 score, ordered by label name.
pub type F1Scores = BTreeMap<String, f64>;

/// Per-class F1 for every label of `labels`.
///
/// F1 = 2·TP / (2·TP + FP + FN). A class that is neither predicted
/// nor present in `targets` scores 0.
pub fn per_class_f1(labels: &LabelMap, targets: &[usize], predictions: &[usize]) -> F1Scores {
    let n = labels.len();
    let mut tp = vec![0usize; n];
    let mut fp = vec![0usize; n];
    let mut fn_ = vec![0usize; n];

    for (&target, &predicted) in targets.iter().zip(predictions) {
        if target == predicted {
            tp[target] += 1;
        } else {
            fp[predicted] += 1;
            fn_[target] += 1;
        }
    }

    labels
        .names()
        .iter()
        .enumerate()
        .map(|(id, name)| {
            let denominator = 2 * tp[id] + fp[id] + fn_[id];
            let f1 = if denominator == 0 {
                0.0
            } else {
                (2 * tp[id]) as f64 / denominator as f64
            };
            (name.clone(), f1)
        })
        .collect()
}
