// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Fine-tunes encoder and head jointly with AdamW.
//
// Per epoch:
//   - the DataLoader reshuffles the samples (seeded)
//   - forward → cross-entropy over the [CLS] logits → backward
//   - one AdamW step per mini-batch
//   - mean batch loss logged, and appended to metrics.csv when a
//     MetricsLogger is given
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::ClassificationBatcher, dataset::ClassificationDataset};
use crate::error::{Error, Result};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::ClassifierModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    /// Seeds the batch order and the backend RNG (dropout).
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 3,
            batch_size: 8,
            learning_rate: 5e-5,
            weight_decay: 0.01,
            seed: 42,
        }
    }
}

impl TrainOptions {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}

/// Run `options.epochs` passes over `dataset` and return the
/// updated model.
pub fn run_training<B: AutodiffBackend>(
    mut model: ClassifierModel<B>,
    dataset: ClassificationDataset,
    pad_id: u32,
    options: &TrainOptions,
    device: &B::Device,
    metrics: Option<&MetricsLogger>,
) -> Result<ClassifierModel<B>> {
    options.validate()?;
    B::seed(options.seed);

    let sample_count = dataset.sample_count();
    let mut optim = AdamWConfig::new()
        .with_weight_decay(options.weight_decay as f32)
        .init();

    let batcher = ClassificationBatcher::<B>::new(device.clone(), pad_id);
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(options.batch_size)
        .shuffle(options.seed)
        .build(dataset);

    tracing::info!(
        "Training on {} samples: {} epochs, batch size {}, lr {}",
        sample_count,
        options.epochs,
        options.batch_size,
        options.learning_rate
    );

    for epoch in 1..=options.epochs {
        let mut loss_sum = 0.0f64;
        let mut steps = 0usize;

        for batch in loader.iter() {
            let loss = model.forward_loss(batch.input_ids, batch.padding_mask, batch.targets);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            steps += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(options.learning_rate, model, grads);
        }

        let mean_loss = if steps > 0 {
            loss_sum / steps as f64
        } else {
            f64::NAN
        };
        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | steps={}",
            epoch,
            options.epochs,
            mean_loss,
            steps
        );

        if let Some(logger) = metrics {
            logger.log(&EpochMetrics::new(epoch, mean_loss, steps))?;
        }
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::EncodedSample;
    use crate::ml::model::EncoderConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_options_defaults() {
        let options = TrainOptions::default();
        assert_eq!(options.epochs, 3);
        assert_eq!(options.batch_size, 8);
        assert_eq!(options.learning_rate, 5e-5);
        assert_eq!(options.weight_decay, 0.01);

        let parsed: TrainOptions = serde_json::from_str(r#"{"epochs": 1}"#).unwrap();
        assert_eq!(parsed.epochs, 1);
        assert_eq!(parsed.batch_size, 8);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let options = TrainOptions {
            batch_size: 0,
            ..TrainOptions::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
    }

    fn tiny_model(device: &<TestBackend as Backend>::Device) -> ClassifierModel<TestBackend> {
        EncoderConfig::new(10)
            .with_max_position(8)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .init_classifier::<TestBackend>(2, device)
    }

    fn three_samples() -> ClassificationDataset {
        ClassificationDataset::new(vec![
            EncodedSample { input_ids: vec![2, 5, 3], label_id: 0 },
            EncodedSample { input_ids: vec![2, 6, 7, 3], label_id: 1 },
            EncodedSample { input_ids: vec![2, 5, 5, 3], label_id: 0 },
        ])
    }

    fn one_epoch() -> TrainOptions {
        TrainOptions {
            epochs: 1,
            batch_size: 2,
            learning_rate: 1e-3,
            ..TrainOptions::default()
        }
    }

    fn values<const D: usize>(tensor: Tensor<TestBackend, D>) -> Vec<f32> {
        tensor.into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_one_epoch_logs_metrics() {
        let device = Default::default();
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        run_training(
            tiny_model(&device),
            three_samples(),
            0,
            &one_epoch(),
            &device,
            Some(&logger),
        )
        .unwrap();

        let csv = std::fs::read_to_string(logger.csv_path()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("1,"));
        assert!(row.ends_with(",2"));
    }

    #[test]
    fn test_step_updates_encoder_and_head() {
        let device = Default::default();
        let model = tiny_model(&device);
        let embedding_before = values(model.encoder.token_embedding.weight.val());
        let head_before = values(model.head.weight.val());

        let trained =
            run_training(model, three_samples(), 0, &one_epoch(), &device, None).unwrap();

        assert_ne!(values(trained.encoder.token_embedding.weight.val()), embedding_before);
        assert_ne!(values(trained.head.weight.val()), head_before);
    }
}
