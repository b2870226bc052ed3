// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with: pages, predictions, labels, and the
// capabilities the core consumes.
//
// No Burn types, no file I/O, no recognizer bindings here.

/// OCR page results and per-document predictions
pub mod document;

/// Classification results and the label↔id mapping
pub mod classification;

/// Recognizer / rasterizer / classifier abstractions
pub mod traits;
