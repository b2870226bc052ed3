// ============================================================
// Layer 4 - Train/Evaluation Splitter
// ============================================================
// Holds out an evaluation set by shuffling and cutting each label
// separately, so every label keeps its share in both sets.
//
// Seeded: the same samples and seed give the same split.
// Labels are grouped through a BTreeMap so the iteration order,
// and therefore the RNG draws, never depend on hash order.

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::LabelledText;
use crate::error::{Error, Result};

/// Split per label: each label sends `round(n * test_fraction)` of
/// its `n` samples to the test side, but always keeps at least one
/// sample for training.
pub fn stratified_split(
    samples: Vec<LabelledText>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<LabelledText>, Vec<LabelledText>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(Error::InvalidConfig(format!(
            "test_fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let mut by_label: BTreeMap<String, Vec<LabelledText>> = BTreeMap::new();
    for sample in samples {
        by_label.entry(sample.label.clone()).or_default().push(sample);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (label, mut group) in by_label {
        group.shuffle(&mut rng);
        let n = group.len();
        let n_test = ((n as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(n.saturating_sub(1));

        tracing::debug!("label '{}': {} train / {} test", label, n - n_test, n_test);

        test.extend(group.drain(..n_test));
        train.extend(group);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok((train, test))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(facture: usize, autre: usize) -> Vec<LabelledText> {
        (0..facture)
            .map(|i| LabelledText::new(format!("facture {i}"), "facture"))
            .chain((0..autre).map(|i| LabelledText::new(format!("courrier {i}"), "autre")))
            .collect()
    }

    #[test]
    fn test_same_seed_same_split() {
        let (a, _) = stratified_split(corpus(6, 6), 0.5, 42).unwrap();
        let (b, _) = stratified_split(corpus(6, 6), 0.5, 42).unwrap();
        let texts = |set: &[LabelledText]| set.iter().map(|s| s.text.clone()).collect::<Vec<_>>();
        assert_eq!(texts(&a), texts(&b));
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = stratified_split(Vec::new(), 0.2, 0).unwrap();
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_stratified_keeps_label_shares() {
        let (train, test) = stratified_split(corpus(10, 5), 0.2, 42).unwrap();
        let count = |set: &[LabelledText], label: &str| set.iter().filter(|s| s.label == label).count();

        assert_eq!(count(&test, "facture"), 2);
        assert_eq!(count(&test, "autre"), 1);
        assert_eq!(count(&train, "facture"), 8);
        assert_eq!(count(&train, "autre"), 4);
    }

    #[test]
    fn test_stratified_singleton_label_stays_in_training() {
        let (train, test) = stratified_split(corpus(4, 1), 0.5, 1).unwrap();
        assert!(train.iter().any(|s| s.label == "autre"));
        assert!(test.iter().all(|s| s.label == "facture"));
        assert_eq!(train.len() + test.len(), 5);
    }

    #[test]
    fn test_stratified_rejects_bad_fraction() {
        assert!(matches!(
            stratified_split(corpus(2, 2), 1.0, 0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
