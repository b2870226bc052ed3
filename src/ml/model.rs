// ============================================================
// Layer 5 - Encoder + Classification Head
// ============================================================
// TextEncoder: token + position embeddings, `num_layers` post-norm
// transformer blocks, final layer norm. Output [batch, seq, d_model].
//
// ClassifierModel: the encoder plus one linear layer reading the
// hidden state at position 0 ([CLS]) and emitting one logit per
// label. Encoder and head are recorded separately so a backbone
// directory can ship the encoder alone.
//
// Padding positions are excluded from attention through the
// padding mask (true = padding).
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, LayerNorm, LayerNormConfig, Linear,
        LinearConfig,
    },
    prelude::*,
};

use crate::error::Error;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize,
// and its serde impls name the two-argument `Result`, so the crate alias
// must not be imported here.
#[derive(Config, Debug, PartialEq)]
pub struct EncoderConfig {
    pub vocab_size: usize,
    #[config(default = 512)]
    pub max_position: usize,
    #[config(default = 128)]
    pub d_model: usize,
    #[config(default = 4)]
    pub num_heads: usize,
    #[config(default = 2)]
    pub num_layers: usize,
    #[config(default = 512)]
    pub d_ff: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl EncoderConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.vocab_size == 0 || self.max_position == 0 || self.num_layers == 0 {
            return Err(Error::InvalidConfig(
                "vocab_size, max_position and num_layers must be positive".into(),
            ));
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            return Err(Error::InvalidConfig(format!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_position, self.d_model).init(device);
        let layers = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        TextEncoder {
            token_embedding,
            position_embedding,
            layers,
            final_norm: LayerNormConfig::new(self.d_model).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }

    /// Encoder plus a freshly initialised head for `num_labels` classes.
    pub fn init_classifier<B: Backend>(
        &self,
        num_labels: usize,
        device: &B::Device,
    ) -> ClassifierModel<B> {
        ClassifierModel {
            encoder: self.init(device),
            head: LinearConfig::new(self.d_model, num_labels).init(device),
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        EncoderBlock {
            self_attn,
            ffn_linear1: LinearConfig::new(self.d_model, self.d_ff).init(device),
            ffn_linear2: LinearConfig::new(self.d_ff, self.d_model).init(device),
            norm1: LayerNormConfig::new(self.d_model).init(device),
            norm2: LayerNormConfig::new(self.d_model).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn: MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1: LayerNorm<B>,
    pub norm2: LayerNorm<B>,
    pub dropout: Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, padding_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input = MhaInput::self_attn(x.clone()).mask_pad(padding_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(burn::tensor::activation::gelu(
            self.ffn_linear1.forward(x.clone()),
        ));
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding: Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers: Vec<EncoderBlock<B>>,
    pub final_norm: LayerNorm<B>,
    pub dropout: Dropout,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids: [batch, seq_len] → hidden states: [batch, seq_len, d_model]
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        padding_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, padding_mask.clone());
        }
        self.final_norm.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct ClassifierModel<B: Backend> {
    pub encoder: TextEncoder<B>,
    pub head: Linear<B>,
}

impl<B: Backend> ClassifierModel<B> {
    /// Logits over the labels - shape: [batch, num_labels]
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        padding_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 2> {
        let hidden = self.encoder.forward(input_ids, padding_mask);
        let [batch_size, _, d_model] = hidden.dims();
        let cls = hidden
            .slice([0..batch_size, 0..1, 0..d_model])
            .reshape([batch_size, d_model]);
        self.head.forward(cls)
    }

    /// Mean cross-entropy between the logits and the true label ids.
    pub fn forward_loss(
        &self,
        input_ids: Tensor<B, 2, Int>,
        padding_mask: Tensor<B, 2, Bool>,
        targets: Tensor<B, 1, Int>,
    ) -> Tensor<B, 1> {
        let logits = self.forward(input_ids, padding_mask);
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }
}
