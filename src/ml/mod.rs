// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here.
//
//   model.rs       - transformer encoder + linear classification head
//   backbone.rs    - loads or creates the pretrained part
//   trainer.rs     - AdamW fine-tuning loop
//   inferencer.rs  - softmax probabilities over encoded batches
//   evaluation.rs  - per-class F1
//   classifier.rs  - TextClassifier: the public train / evaluate /
//                    predict / save / load surface
//
// Backends: training needs an AutodiffBackend. `CpuBackend` runs
// everywhere; `WgpuBackend` needs the `wgpu` feature.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod backbone;
pub mod classifier;
pub mod evaluation;
pub mod inferencer;
pub mod model;
pub mod trainer;

pub type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;

#[cfg(feature = "wgpu")]
pub type WgpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
