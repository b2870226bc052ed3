use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One annotated document text as stored in a JSONL dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledText {
    pub text: String,
    pub label: String,
}

impl LabelledText {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// A tokenised, unpadded sample: [CLS] ... [SEP] plus its label id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedSample {
    pub input_ids: Vec<u32>,
    pub label_id: usize,
}

pub struct ClassificationDataset {
    samples: Vec<EncodedSample>,
}

impl ClassificationDataset {
    pub fn new(samples: Vec<EncodedSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<EncodedSample> for ClassificationDataset {
    fn get(&self, index: usize) -> Option<EncodedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
