// ============================================================
// Layer 2 - Document Pipeline
// ============================================================
// One document:
//
//   OcrEngine::run → pages → aggregate text + confidence
//                          → classifier → DocumentPrediction
//
// Errors from either stage are returned as-is; a failed document
// yields no partial record. `bulk_process` handles documents one
// after the other, in input order, and stops at the first failure.

use std::path::Path;

use crate::data::ocr::OcrEngine;
use crate::domain::document::DocumentPrediction;
use crate::domain::traits::DocumentClassifier;
use crate::error::Result;

pub struct DocumentPipeline<C: DocumentClassifier> {
    ocr: OcrEngine,
    classifier: C,
}

impl<C: DocumentClassifier> DocumentPipeline<C> {
    pub fn new(ocr: OcrEngine, classifier: C) -> Self {
        Self { ocr, classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn process(&self, document_path: &Path) -> Result<DocumentPrediction> {
        let ocr_pages = self.ocr.run(document_path)?;
        let aggregated_text = OcrEngine::aggregate_text(&ocr_pages);
        let mean_confidence = OcrEngine::aggregate_confidence(&ocr_pages);
        let prediction = self.classifier.classify(&aggregated_text)?;

        tracing::info!(
            "{} → {} ({:.3}) over {} pages",
            document_path.display(),
            prediction.label,
            prediction.score,
            ocr_pages.len()
        );

        Ok(DocumentPrediction {
            path: document_path.to_path_buf(),
            ocr_pages,
            aggregated_text,
            mean_confidence,
            prediction,
        })
    }

    pub fn bulk_process<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<DocumentPrediction>> {
        paths.iter().map(|p| self.process(p.as_ref())).collect()
    }
}
