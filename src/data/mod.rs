// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between a document on disk and a tensor batch.
//
// Inference path:
//
//   PDF / image
//       │
//       ▼
//   OcrEngine         → page images → recognized tokens → page text
//       │
//       ▼
//   SequenceEncoder   → [CLS] ids [SEP], truncated and padded
//
// Training path:
//
//   train.jsonl
//       │
//       ▼
//   load_jsonl        → LabelledText records
//       │
//       ▼
//   stratified_split  → train / evaluation sets
//       │
//       ▼
//   ClassificationDataset → ClassificationBatcher → DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// PDF and image text extraction over pluggable recognizers
pub mod ocr;

/// Token framing, truncation and padding
pub mod encoding;

/// Reads labelled JSONL datasets
pub mod loader;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded and stratified train/evaluation splits
pub mod splitter;
