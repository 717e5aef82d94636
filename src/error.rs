//! Error type for checkpoint persistence and inference.

use std::path::PathBuf;

/// Errors raised by the checkpoint layer.
///
/// Load-time failures are never swallowed: a malformed file surfaces as
/// `Decode`, a structurally valid file with the wrong shape as
/// `SchemaMismatch`.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot decode checkpoint '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Cannot encode checkpoint '{path}': {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Schema mismatch in '{path}': {reason}")]
    SchemaMismatch { path: PathBuf, reason: String },

    #[error("Record error: {0}")]
    Record(String),

    #[error("Text encoder error: {0}")]
    Encoder(String),

    #[error("Accelerator device {0} is not available on this backend")]
    DeviceUnavailable(usize),

    #[error("Input sequence is empty")]
    EmptyInput,

    #[error("Tensor data error: {0}")]
    Tensor(String),
}

pub type Result<T> = std::result::Result<T, CheckpointError>;
