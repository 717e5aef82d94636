#![recursion_limit = "256"]

// ============================================================
// seq-checkpoint
// ============================================================
// Persists and restores trained sequence models (weights,
// optimizer state, text encoders) and runs single-example
// top-k inference over a restored model.
//
// Layers, outermost first:
//   cli          — clap commands (init, latest, predict)
//   application  — use cases wiring config to infra and ml
//   domain       — plain types and traits, no Burn
//   data         — parallel corpus loading and text cleaning
//   ml           — model trait, reference model, inferencer
//   infra        — checkpoint container and its file format

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use domain::placement::{DeviceTag, Placement};
pub use domain::prediction::{Prediction, Predictions, SequenceInput};
pub use error::{CheckpointError, Result};
pub use infra::checkpoint::Checkpoint;
