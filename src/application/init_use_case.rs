// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Produces a fresh checkpoint from a parallel corpus:
//
//   Step 1: Load source/target pairs      (Layer 4 - data)
//   Step 2: Build both text encoders      (Layer 6 - infra)
//   Step 3: Initialise model + optimizer  (Layer 5 - ml)
//   Step 4: Save a checkpoint             (Layer 6 - infra)
//
// The resulting file is what `predict` and any later training
// run start from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::optim::AdamConfig;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{corpus::ParallelCorpus, preprocessor::Preprocessor};
use crate::domain::placement::DeviceTag;
use crate::domain::traits::{PairSource, TextCodec};
use crate::infra::{
    checkpoint::Checkpoint,
    device::PlacementBackend,
    optimizer::OptimizerState,
    text_encoder::TextEncoder,
};
use crate::ml::model::{TransformerTagger, TransformerTaggerConfig};

// ─── Init Configuration ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    pub corpus:         String,
    pub checkpoint_dir: String,
    /// Accelerator ordinal; `None` or negative runs on the host
    pub device:         Option<i32>,
    pub vocab_size:     usize,
    pub max_seq_len:    usize,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub batch_first:    bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            corpus:         "data/pairs.tsv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            device:         None,
            vocab_size:     8000,
            max_seq_len:    128,
            d_model:        128,
            num_heads:      4,
            num_layers:     2,
            d_ff:           512,
            dropout:        0.1,
            batch_first:    false,
        }
    }
}

// ─── InitUseCase ──────────────────────────────────────────────────────────────
pub struct InitUseCase {
    config: InitConfig,
}

impl InitUseCase {
    pub fn new(config: InitConfig) -> Self {
        Self { config }
    }

    /// Returns the saved checkpoint path, or `None` when a checkpoint
    /// with the same name already existed.
    pub fn execute(&self) -> Result<Option<PathBuf>> {
        match self.config.device {
            Some(index) if index >= 0 => {
                type B = Autodiff<Wgpu>;
                let device = B::place(DeviceTag::Accelerator(index as usize))?;
                self.init_on::<B>(device, Some(index as usize))
            }
            _ => {
                type B = Autodiff<NdArray>;
                self.init_on::<B>(B::host_device(), None)
            }
        }
    }

    fn init_on<B>(&self, device: B::Device, ordinal: Option<usize>) -> Result<Option<PathBuf>>
    where
        B: AutodiffBackend + PlacementBackend,
    {
        let cfg = &self.config;

        // ── Step 1: Load the corpus ──────────────────────────────────────────
        let pairs = ParallelCorpus::new(&cfg.corpus).load_pairs()?;
        anyhow::ensure!(!pairs.is_empty(), "Corpus '{}' holds no usable pairs", cfg.corpus);

        // ── Step 2: Build encoders ───────────────────────────────────────────
        // Source side is case-folded, target labels keep their case
        let prep = Preprocessor::new();
        let (sources, targets): (Vec<String>, Vec<String>) = pairs
            .iter()
            .map(|p| (prep.clean(&p.source), prep.clean(&p.target)))
            .unzip();

        let input_text_encoder  = TextEncoder::build(&sources, cfg.vocab_size, true)
            .context("Cannot build input text encoder")?;
        let output_text_encoder = TextEncoder::build(&targets, cfg.vocab_size, false)
            .context("Cannot build output text encoder")?;
        tracing::info!(
            "Vocabulary sizes: input {}, output {}",
            input_text_encoder.vocab_size(),
            output_text_encoder.vocab_size()
        );

        // ── Step 3: Model and optimizer ──────────────────────────────────────
        let model: TransformerTagger<B> = TransformerTaggerConfig::new(
            input_text_encoder.vocab_size(),
            output_text_encoder.vocab_size(),
            cfg.max_seq_len,
            cfg.d_model,
            cfg.num_heads,
            cfg.num_layers,
            cfg.d_ff,
        )
        .with_dropout(cfg.dropout)
        .with_batch_first(cfg.batch_first)
        .init(&device);

        let optimizer = AdamConfig::new().init::<B, TransformerTagger<B>>();
        let optimizer = OptimizerState::capture::<B, TransformerTagger<B>, _>(&optimizer)?;

        // ── Step 4: Save ─────────────────────────────────────────────────────
        let saved = Checkpoint::<B>::save(
            &cfg.checkpoint_dir,
            &model,
            &optimizer,
            &input_text_encoder,
            &output_text_encoder,
            ordinal,
        )?;
        Ok(saved)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::placement::Placement;

    #[test]
    fn test_init_writes_a_loadable_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("pairs.tsv");
        std::fs::write(&corpus, "the cat sat\tDET NOUN VERB\na dog ran\tDET NOUN VERB\n").unwrap();

        let config = InitConfig {
            corpus:         corpus.display().to_string(),
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            d_model:        16,
            num_heads:      2,
            num_layers:     1,
            d_ff:           32,
            ..InitConfig::default()
        };
        let path = InitUseCase::new(config).execute().unwrap().unwrap();

        let loaded = Checkpoint::<NdArray>::load(&path, Placement::KeepOrigin).unwrap();
        assert_eq!(loaded.input_text_encoder.vocab_size(), 8);
        assert_eq!(loaded.output_text_encoder.vocab_size(), 5);
        assert!(loaded.optimizer.is_some());
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("pairs.tsv");
        std::fs::write(&corpus, "# nothing here\n").unwrap();

        let config = InitConfig {
            corpus:         corpus.display().to_string(),
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            ..InitConfig::default()
        };
        assert!(InitUseCase::new(config).execute().is_err());
    }
}
