// ============================================================
// Layer 5 - Backbone
// ============================================================
// A backbone directory is a model directory without a head:
//
//   tokenizer.json   required
//   manifest.json    required (encoder config; labels empty)
//   encoder.mpk.gz   optional pretrained weights
//
// Without weights the encoder starts from random parameters and
// a warning is logged.

use std::path::Path;

use burn::prelude::*;

use crate::data::encoding::SequenceEncoder;
use crate::error::{Error, Result};
use crate::infra::checkpoint::{CheckpointManager, Manifest, ENCODER_RECORD};
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::{EncoderConfig, TextEncoder};

pub struct Backbone<B: Backend> {
    pub sequence_encoder: SequenceEncoder,
    pub config: EncoderConfig,
    pub encoder: TextEncoder<B>,
    pub pretrained: bool,
}

impl<B: Backend> Backbone<B> {
    pub fn load(dir: &Path, device: &B::Device) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotFound(dir.to_path_buf()));
        }

        let manager = CheckpointManager::new(dir);
        let manifest = manager
            .load_manifest()?
            .ok_or_else(|| Error::persistence(manager.manifest_path(), "backbone manifest is missing"))?;
        let config = manifest.encoder;
        config.validate()?;

        let sequence_encoder = SequenceEncoder::new(TokenizerStore::new(dir).load()?)?;
        if sequence_encoder.vocab_size() > config.vocab_size {
            return Err(Error::InvalidConfig(format!(
                "tokenizer emits {} ids but the encoder embeds only {}",
                sequence_encoder.vocab_size(),
                config.vocab_size
            )));
        }

        let encoder = config.init::<B>(device);
        let pretrained = manager.has_record(ENCODER_RECORD);
        let encoder = if pretrained {
            tracing::info!("Loading pretrained encoder from '{}'", dir.display());
            manager.load_module(ENCODER_RECORD, encoder, device)?
        } else {
            tracing::warn!(
                "No encoder weights in '{}', starting from random initialisation",
                dir.display()
            );
            encoder
        };

        Ok(Self {
            sequence_encoder,
            config,
            encoder,
            pretrained,
        })
    }
}

/// Write a weightless backbone: a word-level tokenizer built from
/// `corpus` (at most `max_vocab` entries) and a manifest carrying
/// `config` with its vocab_size set to the tokenizer's.
pub fn create_backbone(
    dir: &Path,
    corpus: &[String],
    max_vocab: usize,
    mut config: EncoderConfig,
) -> Result<Manifest> {
    let tokenizer = TokenizerStore::new(dir).build_and_save(corpus, max_vocab)?;
    config.vocab_size = SequenceEncoder::new(tokenizer)?.vocab_size();
    config.validate()?;

    let manifest = Manifest::new(Vec::new(), config.clone(), config.max_position);
    CheckpointManager::new(dir).save_manifest(&manifest)?;

    tracing::info!(
        "Backbone written to '{}': vocab {}, d_model {}, {} layers",
        dir.display(),
        config.vocab_size,
        config.d_model,
        config.num_layers
    );
    Ok(manifest)
}
