// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores a model directory:
//
//   <dir>/
//     tokenizer.json          ← written by TokenizerStore
//     encoder.mpk.gz          ← encoder parameters
//     classifier_head.mpk.gz  ← head parameters (absent in a backbone)
//     manifest.json           ← format version, labels, encoder config,
//                               max sequence length
//
// Records go through NamedMpkGzFileRecorder at full precision so a
// reloaded model reproduces the saved one bit for bit.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    module::Module,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ml::model::EncoderConfig;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const ENCODER_RECORD: &str = "encoder";
pub const HEAD_RECORD: &str = "classifier_head";
pub const FORMAT_VERSION: u32 = 1;

const RECORD_EXTENSION: &str = "mpk.gz";

/// Everything needed to rebuild the model before loading weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    /// Label names in id order; empty for a backbone.
    pub labels: Vec<String>,
    pub encoder: EncoderConfig,
    pub max_length: usize,
}

impl Manifest {
    pub fn new(labels: Vec<String>, encoder: EncoderConfig, max_length: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            labels,
            encoder,
            max_length,
        }
    }
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(&self.dir, e))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.create_dir()?;
        let path = self.manifest_path();
        let json =
            serde_json::to_string_pretty(manifest).map_err(|e| Error::persistence(&path, e))?;
        fs::write(&path, json).map_err(|e| Error::persistence(&path, e))?;
        tracing::debug!("Saved manifest to '{}'", path.display());
        Ok(())
    }

    /// `Ok(None)` when the directory has no manifest.
    pub fn load_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(|e| Error::persistence(&path, e))?;
        let manifest: Manifest =
            serde_json::from_str(&json).map_err(|e| Error::persistence(&path, e))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::persistence(
                &path,
                format!(
                    "unsupported format version {} (expected {FORMAT_VERSION})",
                    manifest.format_version
                ),
            ));
        }
        Ok(Some(manifest))
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECORD_EXTENSION}"))
    }

    pub fn has_record(&self, name: &str) -> bool {
        self.record_path(name).exists()
    }

    /// Write `module`'s parameters to `<dir>/<name>.mpk.gz`.
    pub fn save_module<B: Backend, M: Module<B>>(&self, name: &str, module: &M) -> Result<()> {
        self.create_dir()?;
        let path = self.dir.join(name);
        let recorder = NamedMpkGzFileRecorder::<FullPrecisionSettings>::new();
        Recorder::<B>::record(&recorder, module.clone().into_record(), path)
            .map_err(|e| Error::persistence(self.record_path(name), e))?;
        tracing::debug!("Saved record '{}'", self.record_path(name).display());
        Ok(())
    }

    /// Load `<dir>/<name>.mpk.gz` into `module`, which must have the
    /// architecture the record was saved from.
    pub fn load_module<B: Backend, M: Module<B>>(
        &self,
        name: &str,
        module: M,
        device: &B::Device,
    ) -> Result<M> {
        let record_path = self.record_path(name);
        if !record_path.exists() {
            return Err(Error::persistence(&record_path, "record file is missing"));
        }

        let recorder = NamedMpkGzFileRecorder::<FullPrecisionSettings>::new();
        let record = Recorder::<B>::load(&recorder, self.dir.join(name), device)
            .map_err(|e| Error::persistence(&record_path, e))?;
        Ok(module.load_record(record))
    }
}
