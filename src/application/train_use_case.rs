// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates one fine-tuning run:
//
//   Step 1: Load the labelled JSONL dataset      (Layer 4 - data)
//   Step 2: Stratified train/eval split          (Layer 4 - data)
//   Step 3: Build the classifier on a backbone   (Layer 5 - ml)
//   Step 4: Save the run configuration           (Layer 6 - infra)
//   Step 5: Train, evaluate, save                (Layer 5 - ml)
//
// `init_backbone` prepares the backbone directory Step 3 reads.
//
// Reference: Burn Book §5 (Training)

use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{loader::load_jsonl, splitter::stratified_split};
use crate::error::{Error, Result};
use crate::infra::checkpoint::Manifest;
use crate::ml::backbone::create_backbone;
use crate::ml::classifier::{ClassifierConfig, TextClassifier};
use crate::ml::evaluation::F1Scores;
use crate::ml::model::EncoderConfig;
use crate::ml::trainer::TrainOptions;

pub const TRAIN_CONFIG_FILE: &str = "train_config.json";

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    pub backbone: PathBuf,
    /// Complete label set, in head order
    pub labels: Vec<String>,
    pub test_fraction: f64,
    pub max_length: usize,
    pub options: TrainOptions,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/train.jsonl"),
            output_dir: PathBuf::from("model"),
            backbone: PathBuf::from("backbone"),
            labels: Vec::new(),
            test_fraction: 0.2,
            max_length: 512,
            options: TrainOptions::default(),
        }
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub train_count: usize,
    pub eval_count: usize,
    pub scores: F1Scores,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase<B: AutodiffBackend> {
    config: TrainConfig,
    device: B::Device,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> TrainUseCase<B> {
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        Self {
            config,
            device,
            _backend: PhantomData,
        }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Dataset ───────────────────────────────────────────────────
        let records = load_jsonl(&cfg.dataset)?;
        if records.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "dataset '{}' has no records",
                cfg.dataset.display()
            )));
        }

        // ── Step 2: Split ─────────────────────────────────────────────────────
        let (train, eval) = stratified_split(records, cfg.test_fraction, cfg.options.seed)?;
        tracing::info!("Split: {} train, {} evaluation", train.len(), eval.len());

        let (train_texts, train_labels): (Vec<String>, Vec<String>) =
            train.into_iter().map(|r| (r.text, r.label)).unzip();
        let (eval_texts, eval_labels): (Vec<String>, Vec<String>) =
            eval.into_iter().map(|r| (r.text, r.label)).unzip();

        // ── Step 3: Classifier ────────────────────────────────────────────────
        let mut classifier = TextClassifier::<B>::new(
            cfg.labels.clone(),
            ClassifierConfig {
                backbone: cfg.backbone.clone(),
                max_length: cfg.max_length,
                seed: Some(cfg.options.seed),
            },
            self.device.clone(),
        )?;

        // ── Step 4: Run configuration ─────────────────────────────────────────
        save_config(cfg)?;

        // ── Step 5: Train + evaluate + save ───────────────────────────────────
        let eval_set = (!eval_texts.is_empty())
            .then_some((eval_texts.as_slice(), eval_labels.as_slice()));
        let scores = classifier.train(
            train_texts.as_slice(),
            train_labels.as_slice(),
            eval_set,
            &cfg.options,
            Some(cfg.output_dir.as_path()),
        )?;

        Ok(TrainReport {
            train_count: train_texts.len(),
            eval_count: eval_texts.len(),
            scores,
        })
    }
}

fn save_config(cfg: &TrainConfig) -> Result<()> {
    fs::create_dir_all(&cfg.output_dir).map_err(|e| Error::persistence(&cfg.output_dir, e))?;
    let path = cfg.output_dir.join(TRAIN_CONFIG_FILE);
    let json = serde_json::to_string_pretty(cfg).map_err(|e| Error::persistence(&path, e))?;
    fs::write(&path, json).map_err(|e| Error::persistence(&path, e))?;
    tracing::debug!("Saved training config to '{}'", path.display());
    Ok(())
}

/// Build a weightless backbone in `dir` from the texts of a JSONL
/// dataset.
pub fn init_backbone(
    dir: &Path,
    corpus: &Path,
    max_vocab: usize,
    encoder: EncoderConfig,
) -> Result<Manifest> {
    let texts: Vec<String> = load_jsonl(corpus)?.into_iter().map(|r| r.text).collect();
    if texts.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "corpus '{}' has no records",
            corpus.display()
        )));
    }
    create_backbone(dir, &texts, max_vocab, encoder)
}
