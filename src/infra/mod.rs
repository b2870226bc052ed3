// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Files on disk and native libraries:
//
//   checkpoint.rs      - model directory layout: parameter records
//                        and manifest.json
//   tokenizer_store.rs - tokenizer.json, and building a word-level
//                        tokenizer from a corpus
//   metrics.rs         - per-epoch CSV log
//   tesseract.rs       - TextRecognizer over Tesseract (leptess)
//   pdfium.rs          - PageRasterizer over PDFium (pdfium-render)
//
// The two native adapters sit behind cargo features; without them
// `probe()` reports the capability as unavailable.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model directory persistence
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;

/// Tesseract text recognition
pub mod tesseract;

/// PDFium page rasterization
pub mod pdfium;
