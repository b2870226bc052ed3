// ============================================================
// Layer 5 - Text Classifier
// ============================================================
// Ties the pieces together for one fixed label set:
//
//   SequenceEncoder → ClassifierModel (backbone encoder + linear head)
//
// Lifecycle: `new` builds an untrained head on top of a backbone,
// `train` fine-tunes encoder and head together, `load` swaps in a
// saved state. `predict`, `evaluate` and `save` work in either
// state. Mutation needs `&mut self`; inference runs on the inner
// backend through `valid()`, so it never records gradients and
// dropout stays off.

use std::path::{Path, PathBuf};

use burn::{module::AutodiffModule, nn::LinearConfig, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};

use crate::data::dataset::{ClassificationDataset, EncodedSample};
use crate::data::encoding::{Encoding, SequenceEncoder, MIN_SEQUENCE_LENGTH};
use crate::domain::classification::{ClassificationResult, LabelMap};
use crate::domain::traits::DocumentClassifier;
use crate::error::{Error, Result};
use crate::infra::checkpoint::{CheckpointManager, Manifest, ENCODER_RECORD, HEAD_RECORD};
use crate::infra::metrics::MetricsLogger;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::backbone::Backbone;
use crate::ml::evaluation::{per_class_f1, F1Scores};
use crate::ml::inferencer::{argmax, class_probabilities, predict_ids};
use crate::ml::model::{ClassifierModel, EncoderConfig};
use crate::ml::trainer::{run_training, TrainOptions};

/// Sequences per forward pass during evaluation.
pub const EVAL_BATCH_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Backbone directory (tokenizer + encoder)
    pub backbone: PathBuf,
    /// Longest id sequence fed to the encoder, [CLS] and [SEP] included
    pub max_length: usize,
    /// Seeds parameter initialisation of the head (and a random backbone)
    pub seed: Option<u64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backbone: PathBuf::from("backbone"),
            max_length: 512,
            seed: None,
        }
    }
}

pub struct TextClassifier<B: AutodiffBackend> {
    labels: LabelMap,
    max_length: usize,
    encoder_config: EncoderConfig,
    sequence_encoder: SequenceEncoder,
    model: ClassifierModel<B>,
    device: B::Device,
}

impl<B: AutodiffBackend> TextClassifier<B> {
    pub fn new<I, S>(labels: I, config: ClassifierConfig, device: B::Device) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = LabelMap::new(labels)?;
        if config.max_length < MIN_SEQUENCE_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "max_length must be at least {MIN_SEQUENCE_LENGTH}, got {}",
                config.max_length
            )));
        }
        if let Some(seed) = config.seed {
            B::seed(seed);
        }

        let backbone = Backbone::<B>::load(&config.backbone, &device)?;
        if config.max_length > backbone.config.max_position {
            return Err(Error::InvalidConfig(format!(
                "max_length {} exceeds the encoder's {} positions",
                config.max_length, backbone.config.max_position
            )));
        }

        let head = LinearConfig::new(backbone.config.d_model, labels.len()).init(&device);
        let model = ClassifierModel {
            encoder: backbone.encoder,
            head,
        };

        tracing::info!(
            "Classifier ready: {} labels {:?}, backbone '{}'",
            labels.len(),
            labels.names(),
            config.backbone.display()
        );

        Ok(Self {
            labels,
            max_length: config.max_length,
            encoder_config: backbone.config,
            sequence_encoder: backbone.sequence_encoder,
            model,
            device,
        })
    }

    pub fn labels(&self) -> &[String] {
        self.labels.names()
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.labels
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// `[CLS] tokens [SEP]` per text, truncated to `max_length` and
    /// padded to the longest sequence of the batch.
    pub fn encode<S: AsRef<str>>(&self, texts: &[S], max_length: usize) -> Result<Encoding> {
        if max_length > self.encoder_config.max_position {
            return Err(Error::InvalidConfig(format!(
                "max_length {max_length} exceeds the encoder's {} positions",
                self.encoder_config.max_position
            )));
        }
        self.sequence_encoder.encode(texts, max_length)
    }

    /// Fine-tune on (texts, labels), then score `eval` when given.
    ///
    /// Every label of both sets is checked before the first step.
    /// With `output_dir`, per-epoch losses go to `metrics.csv` and
    /// the trained state is saved there.
    pub fn train<S, L>(
        &mut self,
        texts: &[S],
        labels: &[L],
        eval: Option<(&[S], &[L])>,
        options: &TrainOptions,
        output_dir: Option<&Path>,
    ) -> Result<F1Scores>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        check_lengths(texts.len(), labels.len())?;
        let label_ids = self.labels.ids_for(labels)?;
        if let Some((eval_texts, eval_labels)) = eval {
            check_lengths(eval_texts.len(), eval_labels.len())?;
            self.labels.ids_for(eval_labels)?;
        }
        options.validate()?;
        if texts.is_empty() {
            return Err(Error::InvalidConfig("training set is empty".into()));
        }

        let samples = texts
            .iter()
            .zip(label_ids)
            .map(|(text, label_id)| {
                Ok(EncodedSample {
                    input_ids: self.sequence_encoder.encode_one(text.as_ref(), self.max_length)?,
                    label_id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let logger = output_dir.map(MetricsLogger::new).transpose()?;

        self.model = run_training(
            self.model.clone(),
            ClassificationDataset::new(samples),
            self.sequence_encoder.pad_id(),
            options,
            &self.device,
            logger.as_ref(),
        )?;

        let scores = match eval {
            Some((eval_texts, eval_labels)) => self.evaluate(eval_texts, eval_labels)?,
            None => F1Scores::new(),
        };

        if let Some(dir) = output_dir {
            self.save(dir)?;
        }
        Ok(scores)
    }

    /// Per-class F1 over exactly `texts.len()` examples.
    pub fn evaluate<S, L>(&self, texts: &[S], labels: &[L]) -> Result<F1Scores>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        check_lengths(texts.len(), labels.len())?;
        let targets = self.labels.ids_for(labels)?;

        let model = self.model.valid();
        let mut predictions = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EVAL_BATCH_SIZE) {
            let encoding = self.encode(chunk, self.max_length)?;
            predictions.extend(
                predict_ids(&model, &encoding, &self.device)
                    .into_iter()
                    .map(|(id, _)| id),
            );
        }

        let scores = per_class_f1(&self.labels, &targets, &predictions);
        tracing::info!("Evaluated {} examples: {:?}", texts.len(), scores);
        Ok(scores)
    }

    /// Most probable label for `text` and its softmax probability.
    pub fn predict(&self, text: &str) -> Result<ClassificationResult> {
        let encoding = self.encode(&[text], self.max_length)?;
        let probabilities = class_probabilities(&self.model.valid(), &encoding, &self.device);
        let row = probabilities
            .first()
            .ok_or_else(|| Error::Tokenization("empty encoding".into()))?;

        let (id, score) = argmax(row);
        let label = self
            .labels
            .name(id)
            .ok_or_else(|| Error::LabelLookup(format!("#{id}")))?;
        Ok(ClassificationResult::new(label, score))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let manager = CheckpointManager::new(dir);
        manager.create_dir()?;

        TokenizerStore::new(dir).save(self.sequence_encoder.tokenizer())?;
        manager.save_module(ENCODER_RECORD, &self.model.encoder)?;
        manager.save_module(HEAD_RECORD, &self.model.head)?;
        manager.save_manifest(&Manifest::new(
            self.labels.names().to_vec(),
            self.encoder_config.clone(),
            self.max_length,
        ))?;

        tracing::info!("Classifier saved to '{}'", dir.display());
        Ok(())
    }

    /// Replace tokenizer and parameters with the state saved in `dir`.
    ///
    /// Nothing is modified unless the whole state loads.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(Error::persistence(dir, "model directory does not exist"));
        }
        let manager = CheckpointManager::new(dir);
        let manifest = manager.load_manifest()?;

        if let Some(manifest) = &manifest {
            if manifest.labels != self.labels.names() {
                return Err(Error::LabelMismatch {
                    expected: self.labels.names().to_vec(),
                    found: manifest.labels.clone(),
                });
            }
            manifest.encoder.validate()?;
        }
        let encoder_config = manifest
            .as_ref()
            .map_or_else(|| self.encoder_config.clone(), |m| m.encoder.clone());
        let max_length = manifest.as_ref().map_or(self.max_length, |m| m.max_length);

        let sequence_encoder = SequenceEncoder::new(TokenizerStore::new(dir).load()?)?;
        let encoder = manager.load_module(
            ENCODER_RECORD,
            encoder_config.init::<B>(&self.device),
            &self.device,
        )?;
        let head = manager.load_module(
            HEAD_RECORD,
            LinearConfig::new(encoder_config.d_model, self.labels.len()).init::<B>(&self.device),
            &self.device,
        )?;

        let [_, outputs] = head.weight.val().dims();
        if outputs != self.labels.len() {
            return Err(Error::persistence(
                manager.record_path(HEAD_RECORD),
                format!("head has {outputs} outputs for {} labels", self.labels.len()),
            ));
        }

        self.sequence_encoder = sequence_encoder;
        self.encoder_config = encoder_config;
        self.max_length = max_length;
        self.model = ClassifierModel { encoder, head };

        tracing::info!("Classifier loaded from '{}'", dir.display());
        Ok(())
    }
}

impl<B: AutodiffBackend> DocumentClassifier for TextClassifier<B> {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.predict(text)
    }
}

fn check_lengths(texts: usize, labels: usize) -> Result<()> {
    if texts != labels {
        return Err(Error::InvalidConfig(format!(
            "{texts} texts but {labels} labels"
        )));
    }
    Ok(())
}
