// ============================================================
// Layer 4 - Classification Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec<EncodedSample> becomes
// one ClassificationBatch of tensors.
//
// Samples arrive unpadded. Each mini-batch is padded to its own
// longest sequence (see data::encoding::pad_batch), so the
// tensors are [batch_size, longest_in_batch].
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::EncodedSample;
use crate::data::encoding::{pad_batch, Encoding};

/// A mini-batch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids - shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// true where the position is padding - shape: [batch_size, seq_len]
    pub padding_mask: Tensor<B, 2, Bool>,

    /// Label ids - shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    device: B::Device,
    pad_id: u32,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device, pad_id: u32) -> Self {
        Self { device, pad_id }
    }
}

/// Turn a padded `Encoding` into (input_ids, padding_mask) tensors.
pub fn encoding_tensors<B: Backend>(
    encoding: &Encoding,
    device: &B::Device,
) -> (Tensor<B, 2, Int>, Tensor<B, 2, Bool>) {
    let shape = [encoding.batch_size(), encoding.seq_len()];

    let ids_flat: Vec<i32> = encoding
        .input_ids
        .iter()
        .flat_map(|row| row.iter().map(|&x| x as i32))
        .collect();
    let mask_flat: Vec<i32> = encoding
        .attention_mask
        .iter()
        .flat_map(|row| row.iter().map(|&x| x as i32))
        .collect();

    let input_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), device).reshape(shape);
    let padding_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), device)
        .reshape(shape)
        .equal_elem(0);

    (input_ids, padding_mask)
}

impl<B: Backend> Batcher<EncodedSample, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<EncodedSample>) -> ClassificationBatch<B> {
        let sequences: Vec<Vec<u32>> = items.iter().map(|s| s.input_ids.clone()).collect();
        let encoding = pad_batch(&sequences, self.pad_id);
        let (input_ids, padding_mask) = encoding_tensors::<B>(&encoding, &self.device);

        let targets: Vec<i32> = items.iter().map(|s| s.label_id as i32).collect();
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        ClassificationBatch {
            input_ids,
            padding_mask,
            targets,
        }
    }
}
