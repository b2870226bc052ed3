// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and all their flags:
//
//   init-backbone  build a tokenizer + encoder config from a corpus
//   train          fine-tune a classifier on a labelled JSONL file
//   classify       OCR and classify scanned documents
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use docclass::application::{classify_use_case::ClassifyConfig, train_use_case::TrainConfig};
use docclass::data::ocr::OcrConfig;
use docclass::ml::model::EncoderConfig;
use docclass::ml::trainer::TrainOptions;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a backbone directory (tokenizer + encoder config) from a JSONL corpus
    InitBackbone(InitBackboneArgs),

    /// Fine-tune the classifier on an annotated JSONL dataset
    Train(TrainArgs),

    /// OCR and classify PDF or image documents with a trained model
    Classify(ClassifyArgs),
}

/// Where tensors live.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceArg {
    #[default]
    Cpu,
    #[cfg(feature = "wgpu")]
    Wgpu,
}

#[derive(Args, Debug)]
pub struct InitBackboneArgs {
    /// JSONL file whose "text" fields form the tokenizer corpus
    pub corpus: PathBuf,

    /// Directory to write tokenizer.json and manifest.json into
    pub output_dir: PathBuf,

    /// Upper bound on tokenizer entries, special tokens included
    #[arg(long, default_value_t = 30000)]
    pub vocab_size: usize,

    /// Longest sequence the encoder can embed
    #[arg(long, default_value_t = 512)]
    pub max_position: usize,

    /// Hidden dimension; must be divisible by --num-heads
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
}

impl From<&InitBackboneArgs> for EncoderConfig {
    fn from(a: &InitBackboneArgs) -> Self {
        // vocab_size is filled in from the built tokenizer
        EncoderConfig::new(0)
            .with_max_position(a.max_position)
            .with_d_model(a.d_model)
            .with_num_heads(a.num_heads)
            .with_num_layers(a.num_layers)
            .with_d_ff(a.d_ff)
            .with_dropout(a.dropout)
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSONL file with one {"text", "label"} object per line
    pub dataset: PathBuf,

    /// Directory to save the trained model into
    pub output_dir: PathBuf,

    /// Complete list of labels (e.g. facture bulletin courrier)
    #[arg(long, num_args = 1.., required = true)]
    pub labels: Vec<String>,

    /// Backbone directory created by `init-backbone`
    #[arg(long, default_value = "backbone")]
    pub backbone: PathBuf,

    /// Share of each label held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5e-5)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Seeds the split, the batch order and head initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Longest token sequence, [CLS] and [SEP] included
    #[arg(long, default_value_t = 512)]
    pub max_length: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset: a.dataset,
            output_dir: a.output_dir,
            backbone: a.backbone,
            labels: a.labels,
            test_fraction: a.test_size,
            max_length: a.max_length,
            options: TrainOptions {
                epochs: a.epochs,
                batch_size: a.batch_size,
                learning_rate: a.learning_rate,
                weight_decay: a.weight_decay,
                seed: a.seed,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// PDF or image files, processed in the given order
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Directory written by `train`
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Label list; defaults to the one saved with the model
    #[arg(long, num_args = 1..)]
    pub labels: Option<Vec<String>>,

    /// Tesseract language code
    #[arg(long, default_value = "fra")]
    pub language: String,

    /// Rasterization resolution for PDF pages
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    /// Custom tessdata directory
    #[arg(long)]
    pub tessdata_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,
}

impl From<&ClassifyArgs> for ClassifyConfig {
    fn from(a: &ClassifyArgs) -> Self {
        ClassifyConfig {
            model_dir: a.model_dir.clone(),
            labels: a.labels.clone(),
            ocr: OcrConfig {
                language: a.language.clone(),
                dpi: a.dpi,
                tessdata_dir: a.tessdata_dir.clone(),
            },
        }
    }
}
