// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Single-example top-k decoding over a restored model. Text is
// handed to the input encoder untouched; its normaliser owns
// all cleanup.
//
//   input text ─► input encoder ─► [1, len] batch
//     ─► transpose to [len, 1] unless batch-first
//     ─► model.forward(.., ForwardMode::Inference)
//     ─► [out_len, 1, vocab] log-probabilities
//     ─► top-k indices per output position
//     ─► candidate i = i-th best index at every position
//     ─► output encoder decode + exp(log_prob) confidences
//
// Ties between equal scores go to the lower vocabulary index.

use burn::prelude::*;

use crate::domain::prediction::{Prediction, Predictions, SequenceInput};
use crate::domain::traits::TextCodec;
use crate::error::{CheckpointError, Result};
use crate::ml::model::{ForwardMode, SequenceModel};

pub struct Inferencer<'a, B: Backend, M: SequenceModel<B>> {
    model:          &'a M,
    input_encoder:  &'a dyn TextCodec,
    output_encoder: &'a dyn TextCodec,
    device:         &'a B::Device,
}

impl<'a, B: Backend, M: SequenceModel<B>> Inferencer<'a, B, M> {
    pub fn new(
        model:          &'a M,
        input_encoder:  &'a dyn TextCodec,
        output_encoder: &'a dyn TextCodec,
        device:         &'a B::Device,
    ) -> Self {
        Self { model, input_encoder, output_encoder, device }
    }

    /// Predict up to `top_k` output sequences for one input.
    ///
    /// `top_k == 1` yields `Predictions::Single`; any other value yields
    /// `Predictions::Ranked` with `min(top_k, vocab)` candidates.
    pub fn predict(
        &self,
        input:       SequenceInput,
        batch_first: bool,
        top_k:       usize,
    ) -> Result<Predictions> {
        let ids = match input {
            SequenceInput::Text(text) => self.input_encoder.encode(&text)?,
            SequenceInput::Tokens(ids) => ids,
        };
        if ids.is_empty() {
            return Err(CheckpointError::EmptyInput);
        }

        let input_vocab = self.input_encoder.vocab_size();
        if let Some(bad) = ids.iter().find(|&&id| id as usize >= input_vocab) {
            return Err(CheckpointError::Encoder(format!(
                "token id {bad} is outside the input vocabulary of {input_vocab}"
            )));
        }

        // ── Build a batch of one ──────────────────────────────────────────────
        let seq_len = ids.len();
        let tokens: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        let batch = Tensor::<B, 1, Int>::from_ints(tokens.as_slice(), self.device)
            .unsqueeze::<2>(); // [1, seq_len]
        let batch = if batch_first { batch } else { batch.transpose() };
        let lengths = Tensor::<B, 1, Int>::from_ints([seq_len as i32], self.device);

        // ── Forward pass ──────────────────────────────────────────────────────
        let output = self.model.forward(batch, lengths, ForwardMode::Inference);
        let [out_len, batch_size, vocab] = output.dims();
        let scores: Vec<f32> = output
            .reshape([out_len * batch_size, vocab])
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| CheckpointError::Tensor(format!("{e:?}")))?;

        // Only the first (and only) batch row is decoded
        self.rank(&scores[..out_len * vocab], out_len, vocab, top_k)
    }

    /// Turn one row of `[out_len, vocab]` log-probabilities into candidates.
    ///
    /// `top_k == 0` yields an empty `Ranked`. An empty output vocabulary
    /// has no candidates to offer and is an error.
    fn rank(&self, scores: &[f32], out_len: usize, vocab: usize, top_k: usize) -> Result<Predictions> {
        if vocab == 0 {
            return Err(CheckpointError::Tensor(
                "model produced an empty output vocabulary".to_string(),
            ));
        }

        let ranked = top_k_indices(scores, vocab, top_k);
        let candidates = top_k.min(vocab);

        // ── Make human readable ───────────────────────────────────────────────
        let mut predictions = Vec::with_capacity(candidates);
        for rank in 0..candidates {
            let column: Vec<u32> = ranked.iter().map(|row| row[rank] as u32).collect();
            let confidences: Vec<f32> = ranked
                .iter()
                .enumerate()
                .map(|(pos, row)| scores[pos * vocab + row[rank]].exp())
                .collect();
            let sequence = self.output_encoder.decode(&column)?;
            predictions.push(Prediction::new(sequence, confidences));
        }

        tracing::debug!(
            "Decoded {} candidate(s) over {} output positions (vocab {})",
            predictions.len(),
            out_len,
            vocab,
        );

        if top_k == 1 {
            if let Some(best) = predictions.pop() {
                return Ok(Predictions::Single(best));
            }
        }
        Ok(Predictions::Ranked(predictions))
    }
}

/// Indices of the `k` highest scores of every `width`-wide row, best first.
///
/// Each returned row has `min(k, width)` entries. Equal scores keep their
/// index order.
pub fn top_k_indices(scores: &[f32], width: usize, k: usize) -> Vec<Vec<usize>> {
    if width == 0 {
        return Vec::new();
    }

    scores
        .chunks(width)
        .map(|row| {
            let mut order: Vec<usize> = (0..row.len()).collect();
            order.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
            order.truncate(k);
            order
        })
        .collect()
}
