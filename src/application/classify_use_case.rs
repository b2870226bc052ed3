// ============================================================
// Layer 2 - ClassifyUseCase
// ============================================================
// Batch classification of scanned documents:
//
//   Step 1: Probe Tesseract and PDFium            (Layer 6 - infra)
//   Step 2: Restore the trained classifier        (Layer 5 - ml)
//   Step 3: OCR + classify every document         (Layer 2 - pipeline)
//
// A trained model directory is also a valid backbone directory,
// so the classifier is built on it and then its head is loaded.

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::application::pipeline::DocumentPipeline;
use crate::data::ocr::{OcrConfig, OcrEngine};
use crate::domain::document::DocumentPrediction;
use crate::error::{Error, Result};
use crate::infra::{checkpoint::CheckpointManager, pdfium, tesseract};
use crate::ml::classifier::{ClassifierConfig, TextClassifier};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyConfig {
    pub model_dir: PathBuf,
    /// Overrides the label list stored in the model manifest
    pub labels: Option<Vec<String>>,
    pub ocr: OcrConfig,
}

pub struct ClassifyUseCase<B: AutodiffBackend> {
    config: ClassifyConfig,
    device: B::Device,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ClassifyUseCase<B> {
    pub fn new(config: ClassifyConfig, device: B::Device) -> Self {
        Self {
            config,
            device,
            _backend: PhantomData,
        }
    }

    pub fn execute<P: AsRef<Path>>(&self, documents: &[P]) -> Result<Vec<DocumentPrediction>> {
        let cfg = &self.config;

        // ── Step 1: OCR capabilities ──────────────────────────────────────────
        let ocr = OcrEngine::new(
            cfg.ocr.clone(),
            tesseract::probe(&cfg.ocr),
            pdfium::probe(),
        )?;

        // ── Step 2: Classifier ────────────────────────────────────────────────
        let classifier = self.load_classifier()?;

        // ── Step 3: Documents ─────────────────────────────────────────────────
        DocumentPipeline::new(ocr, classifier).bulk_process(documents)
    }

    /// Rebuild the classifier saved in `model_dir`.
    pub fn load_classifier(&self) -> Result<TextClassifier<B>> {
        let model_dir = &self.config.model_dir;
        let manifest = CheckpointManager::new(model_dir).load_manifest()?;

        let labels = match (&self.config.labels, &manifest) {
            (Some(labels), _) => labels.clone(),
            (None, Some(manifest)) => manifest.labels.clone(),
            (None, None) => {
                return Err(Error::InvalidConfig(format!(
                    "no labels given and no manifest in '{}'",
                    model_dir.display()
                )))
            }
        };
        let max_length = manifest
            .as_ref()
            .map_or(ClassifierConfig::default().max_length, |m| m.max_length);

        let mut classifier = TextClassifier::<B>::new(
            labels,
            ClassifierConfig {
                backbone: model_dir.clone(),
                max_length,
                seed: None,
            },
            self.device.clone(),
        )?;
        classifier.load(model_dir)?;
        Ok(classifier)
    }
}
