use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use docclass::ml::backbone::create_backbone;
use docclass::ml::model::EncoderConfig;
use docclass::{ClassifierConfig, Error, TextClassifier, TrainOptions};

type Backend = Autodiff<NdArray>;

const FACTURES: [&str; 5] = [
    "Facture numero 2024-001 montant total 120 EUR",
    "Facture ACME energie total a payer 89 EUR",
    "Facture client montant HT TVA total",
    "Facture du mois de mars total TTC",
    "Facture electricite echeance montant",
];

const AUTRES: [&str; 5] = [
    "Lettre de relance concernant votre dossier",
    "Courrier administratif informations generales",
    "Bulletin d'information de la mairie",
    "Attestation de presence a la reunion",
    "Compte rendu de la reunion annuelle",
];

fn corpus() -> (Vec<&'static str>, Vec<&'static str>) {
    let texts: Vec<&str> = FACTURES.iter().chain(AUTRES.iter()).copied().collect();
    let labels: Vec<&str> = std::iter::repeat("facture")
        .take(5)
        .chain(std::iter::repeat("autre").take(5))
        .collect();
    (texts, labels)
}

fn backbone(dir: &Path) {
    let texts: Vec<String> = corpus().0.into_iter().map(String::from).collect();
    let config = EncoderConfig::new(0)
        .with_max_position(64)
        .with_d_model(16)
        .with_num_heads(2)
        .with_num_layers(1)
        .with_d_ff(32);
    create_backbone(dir, &texts, 200, config).unwrap();
}

fn classifier(backbone: &Path, labels: &[&str], seed: u64) -> TextClassifier<Backend> {
    TextClassifier::new(
        labels.iter().copied(),
        ClassifierConfig {
            backbone: backbone.to_path_buf(),
            max_length: 64,
            seed: Some(seed),
        },
        Default::default(),
    )
    .unwrap()
}

fn one_epoch() -> TrainOptions {
    TrainOptions {
        epochs: 1,
        batch_size: 4,
        learning_rate: 1e-3,
        ..TrainOptions::default()
    }
}

#[test]
fn one_epoch_reports_f1_for_every_label() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let mut clf = classifier(dir.path(), &["facture", "autre"], 1);

    let (texts, labels) = corpus();
    let scores = clf
        .train(
            texts.as_slice(),
            labels.as_slice(),
            Some((texts.as_slice(), labels.as_slice())),
            &one_epoch(),
            None,
        )
        .unwrap();

    assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["autre", "facture"]);
    assert!(scores.values().all(|f1| (0.0..=1.0).contains(f1)));
}

#[test]
fn training_without_eval_returns_no_scores_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let mut clf = classifier(dir.path(), &["facture", "autre"], 2);

    let out = dir.path().join("model");
    let (texts, labels) = corpus();
    let scores = clf
        .train(texts.as_slice(), labels.as_slice(), None, &one_epoch(), Some(out.as_path()))
        .unwrap();

    assert!(scores.is_empty());
    for file in ["tokenizer.json", "encoder.mpk.gz", "classifier_head.mpk.gz", "manifest.json", "metrics.csv"] {
        assert!(out.join(file).exists(), "missing {file}");
    }
}

#[test]
fn predictions_stay_in_label_set_and_unit_interval() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let clf = classifier(dir.path(), &["facture", "bulletin", "autre"], 3);
    assert_eq!(clf.label_map().len(), 3);

    for text in ["Facture numero 12", "", "mot inconnu partout"] {
        let result = clf.predict(text).unwrap();
        assert!(clf.labels().contains(&result.label));
        assert!((0.0..=1.0).contains(&result.score));
        assert_eq!(clf.predict(text).unwrap(), result);
    }
}

#[test]
fn save_then_load_reproduces_predictions() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let mut trained = classifier(dir.path(), &["facture", "autre"], 4);
    let (texts, labels) = corpus();
    trained
        .train(texts.as_slice(), labels.as_slice(), None, &one_epoch(), None)
        .unwrap();

    let saved = dir.path().join("saved");
    trained.save(&saved).unwrap();

    // different seed: a different random head until the state is loaded
    let mut restored = classifier(dir.path(), &["facture", "autre"], 99);
    restored.load(&saved).unwrap();

    for text in texts {
        assert_eq!(trained.predict(text).unwrap(), restored.predict(text).unwrap());
    }
}

#[test]
fn loading_state_saved_for_other_labels_fails() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let saved = dir.path().join("saved");
    classifier(dir.path(), &["facture", "autre"], 5)
        .save(&saved)
        .unwrap();

    let mut other = classifier(dir.path(), &["facture", "bulletin"], 5);
    match other.load(&saved) {
        Err(Error::LabelMismatch { expected, found }) => {
            assert_eq!(expected, vec!["facture", "bulletin"]);
            assert_eq!(found, vec!["facture", "autre"]);
        }
        result => panic!("unexpected: {:?}", result.err()),
    }
}

#[test]
fn load_from_missing_directory_is_a_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let mut clf = classifier(dir.path(), &["facture", "autre"], 6);
    assert!(matches!(
        clf.load(&dir.path().join("nothing-here")),
        Err(Error::Persistence { .. })
    ));
}

#[test]
fn unknown_evaluation_label_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let clf = classifier(dir.path(), &["facture", "autre"], 7);
    assert!(matches!(
        clf.evaluate(&["Facture 1"], &["courrier"]),
        Err(Error::LabelLookup(label)) if label == "courrier"
    ));
}

#[test]
fn evaluate_counts_every_example() {
    let dir = tempfile::tempdir().unwrap();
    backbone(dir.path());
    let clf = classifier(dir.path(), &["facture", "autre"], 8);

    // 17 examples: one full batch of 16 plus a remainder of 1
    let texts: Vec<&str> = (0..17).map(|i| if i % 2 == 0 { FACTURES[0] } else { AUTRES[0] }).collect();
    let labels: Vec<&str> = (0..17).map(|i| if i % 2 == 0 { "facture" } else { "autre" }).collect();
    let scores = clf.evaluate(texts.as_slice(), labels.as_slice()).unwrap();

    // Each distinct text gets one fixed prediction, so with 9 factures
    // and 8 autres the only reachable F1 values are these.
    let reachable = [0.0, 1.0, 18.0 / 26.0, 16.0 / 25.0];
    assert_eq!(scores.len(), 2);
    for f1 in scores.values() {
        assert!(reachable.iter().any(|r| (r - f1).abs() < 1e-9), "unexpected F1 {f1}");
    }
}
