// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no printing.
//
//   pipeline.rs           - OCR then classification, per document
//   train_use_case.rs     - dataset → split → fine-tune → save
//   classify_use_case.rs  - probe OCR, restore model, classify a batch
//
// Reference: Clean Architecture pattern

pub mod pipeline;

// The training workflow
pub mod train_use_case;

// The batch classification workflow
pub mod classify_use_case;
