// ============================================================
// Layer 6 - Tokenizer Store
// ============================================================
// Reads and writes `tokenizer.json` inside a model directory,
// and builds a fresh word-level tokenizer from a corpus.
//
// The built tokenizer is written directly as HuggingFace JSON
// (WordLevel model, BERT normalizer, Whitespace pre-tokenizer)
// and then loaded back through Tokenizer::from_file, so a built
// tokenizer and a saved one go through the same loader.
//
// Word counts come from the same normalizer and pre-tokenizer
// instances that are serialised into the JSON, so every counted
// word is a word the tokenizer will later look up.
//
// Special tokens get the first ids:
//   [PAD]=0 [UNK]=1 [CLS]=2 [SEP]=3 [MASK]=4
//
// Reference: Sennrich et al. (2016) BPE paper

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString,
    PreTokenizer, Tokenizer,
};

use crate::error::{Error, Result};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load a previously saved tokenizer
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path).map_err(|e| Error::persistence(&path, e))
    }

    pub fn save(&self, tokenizer: &Tokenizer) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(&self.dir, e))?;
        let path = self.path();
        tokenizer
            .save(&path, true)
            .map_err(|e| Error::persistence(&path, e))
    }

    /// Build a word-level vocabulary from `texts`, keep the
    /// `vocab_size - 5` most frequent words, write the tokenizer
    /// JSON and load it back.
    pub fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if vocab_size <= SPECIAL_TOKENS.len() {
            return Err(Error::InvalidConfig(format!(
                "vocab_size must exceed {} special tokens, got {vocab_size}",
                SPECIAL_TOKENS.len()
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(&self.dir, e))?;

        // ── Step 1: Word frequencies ──────────────────────────────────────────
        let normalizer = normalizer();
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in pre_tokenize(&normalizer, text)? {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        // Most frequent first; ties broken alphabetically so the
        // same corpus always produces the same ids.
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size - SPECIAL_TOKENS.len());

        // ── Step 2: Vocab JSON ────────────────────────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        for (word, _) in &words {
            if !vocab.contains_key(word) {
                let id = vocab.len();
                vocab.insert(word.clone(), serde_json::json!(id));
            }
        }
        let vocab_len = vocab.len();

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, token)| {
                serde_json::json!({
                    "id": id, "content": token, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        // ── Step 3: HuggingFace tokenizer JSON ────────────────────────────────
        let tok_path = self.path();
        let to_json = |e: serde_json::Error| Error::persistence(&tok_path, e);
        let normalizer_json = serde_json::to_value(normalizer).map_err(to_json)?;
        let pre_tokenizer_json = serde_json::to_value(Whitespace).map_err(to_json)?;

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": normalizer_json,
            "pre_tokenizer": pre_tokenizer_json,
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let json = serde_json::to_string_pretty(&tokenizer_json).map_err(to_json)?;
        std::fs::write(&tok_path, json).map_err(|e| Error::persistence(&tok_path, e))?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            vocab_len,
            tok_path.display()
        );

        self.load()
    }
}

/// Lower-casing, CJK-splitting, accent-preserving BERT normalizer.
fn normalizer() -> BertNormalizer {
    BertNormalizer::new(true, true, Some(false), true)
}

/// Normalize `text` and split it into the words the WordLevel
/// model will be asked for.
fn pre_tokenize(normalizer: &BertNormalizer, text: &str) -> Result<Vec<String>> {
    let tokenization = |e: tokenizers::Error| Error::Tokenization(e.to_string());

    let mut normalized = NormalizedString::from(text);
    normalizer.normalize(&mut normalized).map_err(tokenization)?;

    let mut pre_tokenized = PreTokenizedString::from(normalized);
    Whitespace
        .pre_tokenize(&mut pre_tokenized)
        .map_err(tokenization)?;

    Ok(pre_tokenized
        .get_splits(OffsetReferential::Normalized, OffsetType::None)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .collect())
}
