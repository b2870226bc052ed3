// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Forward pass + softmax over an already encoded batch.
//
// Callers pass the model on a plain (non-autodiff) backend, i.e.
// the result of `model.valid()`: dropout is then inactive and the
// same input always yields the same probabilities.

use burn::prelude::*;

use crate::data::batcher::encoding_tensors;
use crate::data::encoding::Encoding;
use crate::ml::model::ClassifierModel;

/// One row of label probabilities per encoded sequence.
pub fn class_probabilities<B: Backend>(
    model: &ClassifierModel<B>,
    encoding: &Encoding,
    device: &B::Device,
) -> Vec<Vec<f32>> {
    if encoding.batch_size() == 0 {
        return Vec::new();
    }

    let (input_ids, padding_mask) = encoding_tensors::<B>(encoding, device);
    let logits = model.forward(input_ids, padding_mask);
    let [_, num_labels] = logits.dims();

    let probs: Vec<f32> = burn::tensor::activation::softmax(logits, 1)
        .into_data()
        .iter::<f32>()
        .collect();

    probs.chunks(num_labels).map(<[f32]>::to_vec).collect()
}

/// Index and value of the highest probability; the first one wins ties.
pub fn argmax(probabilities: &[f32]) -> (usize, f32) {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
            if p > best.1 {
                (i, p)
            } else {
                best
            }
        })
}

/// Predicted (label id, probability) for each sequence of the batch.
pub fn predict_ids<B: Backend>(
    model: &ClassifierModel<B>,
    encoding: &Encoding,
    device: &B::Device,
) -> Vec<(usize, f32)> {
    class_probabilities(model, encoding, device)
        .iter()
        .map(|row| argmax(row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoding::pad_batch;
    use crate::ml::model::EncoderConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_argmax_first_max_wins() {
        assert_eq!(argmax(&[0.2, 0.5, 0.3]), (1, 0.5));
        assert_eq!(argmax(&[0.5, 0.5]), (0, 0.5));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = Default::default();
        let model = EncoderConfig::new(12)
            .with_max_position(8)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .init_classifier::<NdArray>(3, &device);

        let encoding = pad_batch(&[vec![2, 5, 6, 3], vec![2, 3]], 0);
        let probs = class_probabilities(&model, &encoding, &device);

        assert_eq!(probs.len(), 2);
        for row in &probs {
            assert_eq!(row.len(), 3);
            let total: f32 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-5);
        }
        assert!(class_probabilities(&model, &pad_batch(&[], 0), &device).is_empty());
    }
}
