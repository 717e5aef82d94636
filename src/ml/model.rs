// ============================================================
// Layer 5 — Sequence Model
// ============================================================
// The contract every checkpointed model fulfils, plus a small
// reference implementation.
//
// Contract (SequenceModel):
//   forward(source, lengths, mode) → log-probabilities
//     source   [seq_len, batch] (or [batch, seq_len] when the
//              model was configured batch-first)
//     lengths  [batch] — real length of every row
//     output   [out_len, batch, output_vocab]
//
// Train/eval behaviour is selected per call by ForwardMode,
// so a shared model is never switched into a mode and back.
//
// Reference model (TransformerTagger):
//   token embedding + position embedding
//     → N encoder blocks (self-attention, GELU FFN, post-norm)
//     → output projection → log_softmax
//   One output distribution per input position.

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, log_softmax},
};
use serde::{de::DeserializeOwned, Serialize};

/// Selects training-only behaviour (dropout) for one forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    Training,
    Inference,
}

impl ForwardMode {
    pub fn is_training(self) -> bool {
        self == Self::Training
    }

    /// Dropout in training mode, identity otherwise.
    pub fn dropout<B: Backend, const D: usize>(self, dropout: &Dropout, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Training => dropout.forward(x),
            Self::Inference => x,
        }
    }
}

/// A model that can be stored in and restored from a checkpoint.
pub trait SequenceModel<B: Backend>: Module<B> {
    /// Hyper-parameters needed to rebuild the model before its
    /// weights are loaded.
    type Config: Serialize + DeserializeOwned;

    fn init(config: &Self::Config, device: &B::Device) -> Self;

    fn config(&self) -> Self::Config;

    fn forward(
        &self,
        source: Tensor<B, 2, Int>,
        lengths: Tensor<B, 1, Int>,
        mode: ForwardMode,
    ) -> Tensor<B, 3>;

    /// Put recurrent weights into a contiguous layout after loading.
    /// Models without recurrent layers keep the default.
    fn flatten_parameters(self) -> Self {
        self
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TransformerTaggerConfig {
    pub input_vocab_size:  usize,
    pub output_vocab_size: usize,
    pub max_seq_len:       usize,
    pub d_model:           usize,
    pub num_heads:         usize,
    pub num_layers:        usize,
    pub d_ff:              usize,
    #[config(default = 0.1)]
    pub dropout:           f64,
    /// Input arrives as [batch, seq_len] instead of [seq_len, batch]
    #[config(default = false)]
    pub batch_first:       bool,
}

impl TransformerTaggerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TransformerTagger<B> {
        let token_embedding    = EmbeddingConfig::new(self.input_vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm  = LayerNormConfig::new(self.d_model).init(device);
        let output_head = LinearConfig::new(self.d_model, self.output_vocab_size).init(device);
        let dropout     = DropoutConfig::new(self.dropout).init();
        TransformerTagger {
            token_embedding, position_embedding, layers,
            final_norm, output_head, dropout,
            input_vocab_size:  self.input_vocab_size,
            output_vocab_size: self.output_vocab_size,
            max_seq_len:       self.max_seq_len,
            d_model:           self.d_model,
            num_heads:         self.num_heads,
            num_layers:        self.num_layers,
            d_ff:              self.d_ff,
            batch_first:       self.batch_first,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        // Attention dropout stays off; the block applies its own
        // mode-dependent dropout to the attention output.
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(0.0)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// x: [batch, seq_len, d_model], pad_mask: [batch, seq_len] (true = padding)
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>, mode: ForwardMode) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + mode.dropout(&self.dropout, attn_output));
        let ffn_out = self.ffn_linear2.forward(gelu(self.ffn_linear1.forward(x.clone())));
        self.norm2.forward(x + mode.dropout(&self.dropout, ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TransformerTagger<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub output_head:        Linear<B>,
    pub dropout:            Dropout,
    pub input_vocab_size:   usize,
    pub output_vocab_size:  usize,
    pub max_seq_len:        usize,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_layers:         usize,
    pub d_ff:               usize,
    pub batch_first:        bool,
}

impl<B: Backend> SequenceModel<B> for TransformerTagger<B> {
    type Config = TransformerTaggerConfig;

    fn init(config: &TransformerTaggerConfig, device: &B::Device) -> Self {
        config.init(device)
    }

    fn config(&self) -> TransformerTaggerConfig {
        TransformerTaggerConfig::new(
            self.input_vocab_size, self.output_vocab_size, self.max_seq_len,
            self.d_model, self.num_heads, self.num_layers, self.d_ff,
        )
        .with_dropout(self.dropout.prob)
        .with_batch_first(self.batch_first)
    }

    fn forward(
        &self,
        source: Tensor<B, 2, Int>,
        lengths: Tensor<B, 1, Int>,
        mode: ForwardMode,
    ) -> Tensor<B, 3> {
        let source = if self.batch_first { source } else { source.transpose() };
        let [batch_size, seq_len] = source.dims();
        let device = source.device();

        let tok_emb = self.token_embedding.forward(source);

        // Positions past the table reuse its last row.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .clamp_max(self.max_seq_len as i64 - 1)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let limits   = lengths.unsqueeze_dim::<2>(1).expand([batch_size, seq_len]);
        let indices  = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pad_mask = indices.greater_equal(limits);

        let mut x = mode.dropout(&self.dropout, tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone(), mode);
        }
        let x = self.final_norm.forward(x);

        let logits = self.output_head.forward(x); // [batch, seq_len, vocab]
        log_softmax(logits, 2).swap_dims(0, 1)     // [seq_len, batch, vocab]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> TransformerTaggerConfig {
        TransformerTaggerConfig::new(10, 7, 16, 8, 2, 1, 16)
    }

    fn ids(values: &[i32], device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2, Int> {
        Tensor::<TestBackend, 1, Int>::from_ints(values, device).unsqueeze::<2>()
    }

    #[test]
    fn test_output_is_time_major_log_probabilities() {
        let device = Default::default();
        let model: TransformerTagger<TestBackend> = tiny_config().init(&device);

        let source  = ids(&[2, 3, 4], &device).transpose(); // [3, 1]
        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([3], &device);
        let output  = SequenceModel::forward(&model, source, lengths, ForwardMode::Inference);
        assert_eq!(output.dims(), [3, 1, 7]);

        // Every position is a distribution over the output vocabulary
        let sums: Vec<f32> = output.exp().sum_dim(2).into_data().to_vec::<f32>().unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-4, "row sums to {s}");
        }
    }

    #[test]
    fn test_batch_first_layout_matches_time_major() {
        let device = Default::default();
        let time_major: TransformerTagger<TestBackend> = tiny_config().init(&device);
        let batch_first = tiny_config()
            .with_batch_first(true)
            .init::<TestBackend>(&device)
            .load_record(time_major.clone().into_record());

        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([4], &device);
        let a = SequenceModel::forward(
            &time_major, ids(&[1, 2, 3, 4], &device).transpose(), lengths.clone(), ForwardMode::Inference,
        );
        let b = SequenceModel::forward(
            &batch_first, ids(&[1, 2, 3, 4], &device), lengths, ForwardMode::Inference,
        );

        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_inputs_longer_than_position_table() {
        let device = Default::default();
        let model = TransformerTaggerConfig::new(10, 7, 2, 8, 2, 1, 16).init::<TestBackend>(&device);
        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([5], &device);
        let output = SequenceModel::forward(
            &model, ids(&[1, 2, 3, 4, 5], &device).transpose(), lengths, ForwardMode::Inference,
        );
        assert_eq!(output.dims(), [5, 1, 7]);
    }

    #[test]
    fn test_config_reflects_model() {
        let device = Default::default();
        let cfg = tiny_config().with_dropout(0.25).with_batch_first(true);
        let model: TransformerTagger<TestBackend> = cfg.init(&device);
        let back = SequenceModel::config(&model);

        assert_eq!(back.input_vocab_size, 10);
        assert_eq!(back.output_vocab_size, 7);
        assert_eq!(back.max_seq_len, 16);
        assert_eq!(back.num_layers, 1);
        assert_eq!(back.dropout, 0.25);
        assert!(back.batch_first);
    }

    #[test]
    fn test_forward_mode() {
        assert!(ForwardMode::Training.is_training());
        assert!(!ForwardMode::Inference.is_training());
    }
}
