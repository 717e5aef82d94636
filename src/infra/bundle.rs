// ============================================================
// Layer 6 — Checkpoint File Format
// ============================================================
// One checkpoint is one file: a bincode-encoded
// CheckpointBundle.
//
//   format_version        must equal FORMAT_VERSION to load
//   origin                device the model lived on at save
//   model_config          JSON of the model's Burn config
//   model                 Burn record bytes (full precision)
//   optimizer             Burn record bytes (full precision)
//   input_text_encoder    tokenizer JSON
//   output_text_encoder   tokenizer JSON
//
// The payload fields are optional so an incomplete file still
// decodes; `validate` then names whatever is missing.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::placement::DeviceTag;
use crate::error::{CheckpointError, Result};

/// Bumped whenever the bundle layout changes. Files written with any
/// other version are rejected.
pub const FORMAT_VERSION: u32 = 1;

/// Marker every checkpoint file name carries.
pub const CHECKPOINT_EXTENSION: &str = ".pt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointBundle {
    pub format_version:      u32,
    pub origin:              DeviceTag,
    pub model_config:        Option<String>,
    pub model:               Option<Vec<u8>>,
    pub optimizer:           Option<Vec<u8>>,
    pub input_text_encoder:  Option<String>,
    pub output_text_encoder: Option<String>,
}

/// A bundle whose required fields are known to be present.
#[derive(Debug, Clone)]
pub struct ValidBundle {
    pub origin:              DeviceTag,
    pub model_config:        String,
    pub model:               Vec<u8>,
    pub optimizer:           Option<Vec<u8>>,
    pub input_text_encoder:  String,
    pub output_text_encoder: String,
}

impl CheckpointBundle {
    /// Read and decode a bundle. Any decoding failure is returned as-is.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| CheckpointError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the bundle to a path that must not exist yet.
    ///
    /// Returns `Ok(false)` without touching the file system when the
    /// path is already taken. A partially written file is removed.
    pub fn write_new(&self, path: &Path) -> Result<bool> {
        let file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut writer = BufWriter::new(file);
        let written = bincode::serialize_into(&mut writer, self)
            .map_err(|e| CheckpointError::Encode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
            .and_then(|_| writer.flush().map_err(CheckpointError::from));

        if let Err(e) = written {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), "Cannot remove partial checkpoint: {}", cleanup);
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Check version and required fields.
    pub fn validate(self, path: &Path) -> Result<ValidBundle> {
        if self.format_version != FORMAT_VERSION {
            return Err(schema_mismatch(
                path,
                format!(
                    "format version {} (expected {})",
                    self.format_version, FORMAT_VERSION
                ),
            ));
        }

        let model_config = self
            .model_config
            .ok_or_else(|| schema_mismatch(path, "missing field `model_config`".into()))?;
        let model = self
            .model
            .ok_or_else(|| schema_mismatch(path, "missing field `model`".into()))?;
        let input_text_encoder = self
            .input_text_encoder
            .ok_or_else(|| schema_mismatch(path, "missing field `input_text_encoder`".into()))?;
        let output_text_encoder = self
            .output_text_encoder
            .ok_or_else(|| schema_mismatch(path, "missing field `output_text_encoder`".into()))?;

        Ok(ValidBundle {
            origin: self.origin,
            model_config,
            model,
            optimizer: self.optimizer,
            input_text_encoder,
            output_text_encoder,
        })
    }
}

fn schema_mismatch(path: &Path, reason: String) -> CheckpointError {
    CheckpointError::SchemaMismatch {
        path: path.to_path_buf(),
        reason,
    }
}
