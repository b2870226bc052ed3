//! OCR extraction and trainable text classification for scanned
//! documents.
//!
//! A [`DocumentPipeline`] runs an [`OcrEngine`] over a PDF or image,
//! joins the page texts and hands them to a [`TextClassifier`], a
//! transformer encoder with a linear head built on burn.
//!
//! Layers, outermost first:
//!
//! - `application` - pipeline and use cases
//! - `domain` - plain data types and the capability traits
//! - `data` - OCR engine, tokenised datasets, batching
//! - `ml` - model, training, inference, evaluation
//! - `infra` - persistence and the native OCR adapters

#![recursion_limit = "256"]

pub mod application;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use application::pipeline::DocumentPipeline;
pub use data::ocr::{OcrConfig, OcrEngine};
pub use domain::classification::{ClassificationResult, LabelMap};
pub use domain::document::{DocumentPrediction, OcrPageResult};
pub use domain::traits::{Capability, DocumentClassifier, PageRasterizer, TextRecognizer};
pub use error::{Error, Result};
pub use ml::classifier::{ClassifierConfig, TextClassifier};
pub use ml::evaluation::F1Scores;
pub use ml::trainer::TrainOptions;
