// ============================================================
// Layer 4 - Sequence Encoding
// ============================================================
// Turns raw strings into the id sequences the encoder reads:
//
//   [CLS] tok tok tok ... [SEP] [PAD] [PAD]
//
// - truncation keeps the trailing [SEP]: at most max_length ids
// - padding goes to the longest sequence of the batch, which is
//   therefore never longer than max_length
// - attention mask: 1 for real tokens, 0 for padding
//
// BERT-style special tokens are preferred; RoBERTa-style ones
// (<s>, </s>, <pad>) are accepted for imported tokenizers.

use tokenizers::Tokenizer;

use crate::error::{Error, Result};

/// Smallest useful max_length: [CLS] + [SEP].
pub const MIN_SEQUENCE_LENGTH: usize = 2;

/// Ids of the tokens framing and padding every sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad: u32,
    pub cls: u32,
    pub sep: u32,
}

impl SpecialTokens {
    pub fn resolve(tokenizer: &Tokenizer) -> Result<Self> {
        let lookup = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|t| tokenizer.token_to_id(t))
                .ok_or_else(|| {
                    Error::Tokenization(format!("tokenizer has none of {candidates:?}"))
                })
        };
        Ok(Self {
            pad: lookup(&["[PAD]", "<pad>"])?,
            cls: lookup(&["[CLS]", "<s>"])?,
            sep: lookup(&["[SEP]", "</s>"])?,
        })
    }
}

/// A padded batch of id sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub input_ids: Vec<Vec<u32>>,
    pub attention_mask: Vec<Vec<u32>>,
}

impl Encoding {
    pub fn batch_size(&self) -> usize {
        self.input_ids.len()
    }

    /// Padded length shared by every row
    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }
}

/// Pad every sequence to the longest one with `pad_id`.
pub fn pad_batch(sequences: &[Vec<u32>], pad_id: u32) -> Encoding {
    let seq_len = sequences.iter().map(Vec::len).max().unwrap_or(0);

    let mut input_ids = Vec::with_capacity(sequences.len());
    let mut attention_mask = Vec::with_capacity(sequences.len());
    for seq in sequences {
        let mut ids = seq.clone();
        let mut mask = vec![1u32; seq.len()];
        ids.resize(seq_len, pad_id);
        mask.resize(seq_len, 0);
        input_ids.push(ids);
        attention_mask.push(mask);
    }

    Encoding {
        input_ids,
        attention_mask,
    }
}

/// Tokenizer plus the framing rules above.
#[derive(Clone)]
pub struct SequenceEncoder {
    tokenizer: Tokenizer,
    special: SpecialTokens,
}

impl SequenceEncoder {
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        let special = SpecialTokens::resolve(&tokenizer)?;
        Ok(Self { tokenizer, special })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn special_tokens(&self) -> SpecialTokens {
        self.special
    }

    pub fn pad_id(&self) -> u32 {
        self.special.pad
    }

    /// Embedding rows needed to cover every id the tokenizer can emit.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer
            .get_vocab(true)
            .values()
            .max()
            .map_or(0, |&id| id as usize + 1)
    }

    /// Encode one text without padding.
    pub fn encode_one(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
        if max_length < MIN_SEQUENCE_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "max_length must be at least {MIN_SEQUENCE_LENGTH}, got {max_length}"
            )));
        }

        let encoded = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| Error::Tokenization(e.to_string()))?;

        let body = encoded.get_ids();
        let body = &body[..body.len().min(max_length - MIN_SEQUENCE_LENGTH)];

        let mut ids = Vec::with_capacity(body.len() + MIN_SEQUENCE_LENGTH);
        ids.push(self.special.cls);
        ids.extend_from_slice(body);
        ids.push(self.special.sep);
        Ok(ids)
    }

    /// Encode a batch: truncate each text to `max_length`, then pad
    /// to the longest sequence in the batch.
    pub fn encode<S: AsRef<str>>(&self, texts: &[S], max_length: usize) -> Result<Encoding> {
        let sequences = texts
            .iter()
            .map(|t| self.encode_one(t.as_ref(), max_length))
            .collect::<Result<Vec<_>>>()?;
        Ok(pad_batch(&sequences, self.special.pad))
    }
}
