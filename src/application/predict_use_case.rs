// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads a checkpoint (explicit file, or the most recent one in
// a directory) and runs top-k prediction on a single input.
//
// Backend choice follows where the tensors will end up:
//   no device, negative device   → NdArray on the host
//   N >= 0, host-origin storage  → NdArray on the host
//   N >= 0, accelerator storage  → Wgpu accelerator N

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::backend::{NdArray, Wgpu};
use serde::{Deserialize, Serialize};

use crate::domain::placement::Placement;
use crate::domain::prediction::Predictions;
use crate::infra::checkpoint::{latest_checkpoint_path, target_device, Checkpoint};
use crate::infra::device::PlacementBackend;
use crate::ml::model::SequenceModel;

// ─── Predict Configuration ───────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub input:          String,
    /// Explicit checkpoint file; takes precedence over `checkpoint_dir`
    pub checkpoint:     Option<String>,
    pub checkpoint_dir: String,
    pub top_k:          usize,
    /// Expected input layout; must agree with the model when given
    pub batch_first:    Option<bool>,
    pub device:         Option<i32>,
}

/// Predictions together with the file they came from.
#[derive(Debug)]
pub struct PredictOutcome {
    pub checkpoint_path: PathBuf,
    pub predictions:     Predictions,
}

// ─── PredictUseCase ───────────────────────────────────────────────────────────
pub struct PredictUseCase {
    config: PredictConfig,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PredictOutcome> {
        let cfg = &self.config;
        let placement = Placement::from_selector(cfg.device);
        let path = self.checkpoint_path()?;

        let accelerated = match cfg.device {
            Some(index) if index >= 0 => target_device(&path, placement)
                .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?
                .is_accelerator(),
            _ => false,
        };

        if accelerated {
            self.predict_on::<Wgpu>(&path, placement)
        } else {
            self.predict_on::<NdArray>(&path, placement)
        }
    }

    fn checkpoint_path(&self) -> Result<PathBuf> {
        let cfg = &self.config;
        match &cfg.checkpoint {
            Some(path) => Ok(PathBuf::from(path)),
            None => find_latest(&cfg.checkpoint_dir)?
                .with_context(|| format!("No checkpoint found in '{}'", cfg.checkpoint_dir)),
        }
    }

    fn predict_on<B: PlacementBackend>(&self, path: &Path, placement: Placement) -> Result<PredictOutcome> {
        let cfg = &self.config;

        let checkpoint: Checkpoint<B> = Checkpoint::load(path, placement)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        // The layout is a property of the trained model
        let batch_first = checkpoint.model.config().batch_first;
        if let Some(requested) = cfg.batch_first {
            anyhow::ensure!(
                requested == batch_first,
                "Checkpoint '{}' expects {} input, but {} input was requested",
                path.display(),
                layout_name(batch_first),
                layout_name(requested),
            );
        }

        let predictions = checkpoint.predict(cfg.input.as_str(), batch_first, cfg.top_k)?;

        Ok(PredictOutcome {
            checkpoint_path: checkpoint.checkpoint_path,
            predictions,
        })
    }
}

fn layout_name(batch_first: bool) -> &'static str {
    if batch_first { "batch-major" } else { "time-major" }
}

/// Path `predict` would load from `checkpoint_dir` when no file is given.
pub fn find_latest(checkpoint_dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let dir = checkpoint_dir.as_ref();
    latest_checkpoint_path(dir)
        .with_context(|| format!("Cannot list checkpoints in '{}'", dir.display()))
}
