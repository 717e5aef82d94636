// ============================================================
// Layer 6 — Checkpoint
// ============================================================
// A checkpoint bundles everything needed to resume or serve a
// sequence model:
//   1. model weights (+ the config to rebuild the model)
//   2. optimizer state
//   3. input text encoder
//   4. output text encoder
//
// File naming convention (local time, second resolution):
//   checkpoints/
//     03m_14d_09h_26m_53s.pt        ← primary process
//     03m_14d_09h_26m_53s_[1].pt    ← device 1 of a multi-device run
//
// The name is zero-padded so lexicographic order is time order
// within a year; `recent` relies on it. A file is never
// overwritten: a second save in the same second is skipped and
// logged at error level.

use std::fs;
use std::path::{Path, PathBuf};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
};
use chrono::NaiveDateTime;

use crate::domain::placement::{DeviceTag, Placement};
use crate::domain::prediction::{Predictions, SequenceInput};
use crate::error::{CheckpointError, Result};
use crate::infra::bundle::{CheckpointBundle, CHECKPOINT_EXTENSION, FORMAT_VERSION};
use crate::infra::device::PlacementBackend;
use crate::infra::optimizer::OptimizerState;
use crate::infra::text_encoder::TextEncoder;
use crate::ml::inferencer::Inferencer;
use crate::ml::model::{SequenceModel, TransformerTagger};

/// A model restored from disk together with its encoders.
pub struct Checkpoint<B: PlacementBackend, M: SequenceModel<B> = TransformerTagger<B>> {
    /// File this checkpoint was loaded from
    pub checkpoint_path: PathBuf,

    /// Model with weights loaded onto `device`
    pub model: M,

    /// Optimizer state, absent when the file carried none
    pub optimizer: Option<OptimizerState>,

    pub input_text_encoder: TextEncoder,

    pub output_text_encoder: TextEncoder,

    /// Device the model was placed on
    pub device: B::Device,

    /// Device the checkpoint was saved from
    pub origin: DeviceTag,
}

impl<B: PlacementBackend, M: SequenceModel<B>> Checkpoint<B, M> {
    /// Load a checkpoint file, placing tensors according to `placement`.
    ///
    /// Decoding and schema errors are returned unchanged.
    pub fn load(checkpoint_path: impl AsRef<Path>, placement: Placement) -> Result<Self> {
        let path = checkpoint_path.as_ref();
        let bundle = CheckpointBundle::read(path)?.validate(path)?;

        let target = placement.resolve(bundle.origin);
        if bundle.origin.is_accelerator() && target != bundle.origin {
            tracing::debug!("Remapping storage from {} to {}", bundle.origin, target);
        }
        let device = match B::place(target) {
            Ok(device) => device,
            Err(CheckpointError::DeviceUnavailable(index)) if placement == Placement::KeepOrigin => {
                tracing::warn!(
                    "Accelerator {} is not available, loading '{}' into host memory",
                    index,
                    path.display()
                );
                B::host_device()
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            "Loading checkpoint from {} onto {}",
            path.display(),
            B::device_tag(&device)
        );

        let config: M::Config = serde_json::from_str(&bundle.model_config).map_err(|e| {
            CheckpointError::SchemaMismatch {
                path: path.to_path_buf(),
                reason: format!("model config: {e}"),
            }
        })?;

        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let record = Recorder::<B>::load(&recorder, bundle.model, &device)
            .map_err(|e| CheckpointError::Record(format!("model: {e}")))?;
        let model = M::init(&config, &device)
            .load_record(record)
            .flatten_parameters();

        let input_text_encoder  = TextEncoder::from_json(&bundle.input_text_encoder)?;
        let output_text_encoder = TextEncoder::from_json(&bundle.output_text_encoder)?;

        let optimizer = bundle.optimizer.map(OptimizerState::from_bytes);
        if optimizer.is_none() {
            tracing::warn!("Checkpoint '{}' carries no optimizer state", path.display());
        }

        Ok(Self {
            checkpoint_path: path.to_path_buf(),
            model,
            optimizer,
            input_text_encoder,
            output_text_encoder,
            device,
            origin: bundle.origin,
        })
    }

    /// Load the most recent checkpoint in `save_directory`.
    ///
    /// Returns `Ok(None)` when the directory holds no checkpoint.
    pub fn recent(save_directory: impl AsRef<Path>, placement: Placement) -> Result<Option<Self>> {
        match latest_checkpoint_path(save_directory)? {
            Some(path) => Self::load(path, placement).map(Some),
            None => Ok(None),
        }
    }

    /// Save a snapshot named after the current local time.
    ///
    /// `device` distinguishes processes of a multi-device run; device 0
    /// and `None` produce the same unsuffixed name. Returns the written
    /// path, or `Ok(None)` when a checkpoint of that name already exists
    /// (the collision is logged, the existing file is kept).
    pub fn save(
        save_directory:      impl AsRef<Path>,
        model:               &M,
        optimizer:           &OptimizerState,
        input_text_encoder:  &TextEncoder,
        output_text_encoder: &TextEncoder,
        device:              Option<usize>,
    ) -> Result<Option<PathBuf>> {
        let now = chrono::Local::now().naive_local();
        Self::save_at(
            save_directory, &now, model, optimizer,
            input_text_encoder, output_text_encoder, device,
        )
    }

    /// `save` with an explicit timestamp.
    pub fn save_at(
        save_directory:      impl AsRef<Path>,
        timestamp:           &NaiveDateTime,
        model:               &M,
        optimizer:           &OptimizerState,
        input_text_encoder:  &TextEncoder,
        output_text_encoder: &TextEncoder,
        device:              Option<usize>,
    ) -> Result<Option<PathBuf>> {
        let dir = save_directory.as_ref();
        fs::create_dir_all(dir)?;

        let name = checkpoint_name(timestamp, device);
        let path = dir.join(&name);

        if path.exists() {
            tracing::error!("Cannot save checkpoint; file ({}) already exists.", path.display());
            return Ok(None);
        }

        let origin = model
            .devices()
            .first()
            .map(B::device_tag)
            .unwrap_or(DeviceTag::Host);

        let model_config = serde_json::to_string(&model.config()).map_err(|e| CheckpointError::Encode {
            path: path.clone(),
            reason: format!("model config: {e}"),
        })?;

        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let model_bytes = Recorder::<B>::record(&recorder, model.clone().into_record(), ())
            .map_err(|e| CheckpointError::Record(format!("model: {e}")))?;

        let bundle = CheckpointBundle {
            format_version:      FORMAT_VERSION,
            origin,
            model_config:        Some(model_config),
            model:               Some(model_bytes),
            optimizer:           Some(optimizer.as_bytes().to_vec()),
            input_text_encoder:  Some(input_text_encoder.to_json()?),
            output_text_encoder: Some(output_text_encoder.to_json()?),
        };

        tracing::info!("Saving checkpoint {}", name);
        if !bundle.write_new(&path)? {
            tracing::error!("Cannot save checkpoint; file ({}) already exists.", path.display());
            return Ok(None);
        }

        Ok(Some(path))
    }

    /// Predict up to `top_k` output sequences for one input.
    ///
    /// See [`Inferencer::predict`] for the result shape.
    pub fn predict(
        &self,
        input:       impl Into<SequenceInput>,
        batch_first: bool,
        top_k:       usize,
    ) -> Result<Predictions> {
        Inferencer::<B, M>::new(
            &self.model,
            &self.input_text_encoder,
            &self.output_text_encoder,
            &self.device,
        )
        .predict(input.into(), batch_first, top_k)
    }

    /// Tag of the device the model now lives on
    pub fn device_tag(&self) -> DeviceTag {
        B::device_tag(&self.device)
    }
}

/// File name for a checkpoint taken at `timestamp`.
pub fn checkpoint_name(timestamp: &NaiveDateTime, device: Option<usize>) -> String {
    let date_time = timestamp.format("%mm_%dd_%Hh_%Mm_%Ss").to_string();
    match device {
        Some(index) if index != 0 => format!("{date_time}_[{index}]{CHECKPOINT_EXTENSION}"),
        _ => format!("{date_time}{CHECKPOINT_EXTENSION}"),
    }
}

/// Device a checkpoint would be placed on, read from its origin tag.
///
/// Lets a caller pick a backend before loading: host targets need no
/// accelerator backend at all.
pub fn target_device(checkpoint_path: impl AsRef<Path>, placement: Placement) -> Result<DeviceTag> {
    let bundle = CheckpointBundle::read(checkpoint_path.as_ref())?;
    Ok(placement.resolve(bundle.origin))
}

/// Path of the checkpoint `recent` would load, if any.
///
/// Names containing the checkpoint extension are sorted in descending
/// lexicographic order and the first one wins.
pub fn latest_checkpoint_path(save_directory: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let dir = save_directory.as_ref();

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        if let Ok(name) = entry?.file_name().into_string() {
            if name.contains(CHECKPOINT_EXTENSION) {
                names.push(name);
            }
        }
    }

    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(names.into_iter().next().map(|name| dir.join(name)))
}
