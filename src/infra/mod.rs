// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches disk or a concrete Burn device:
//
//   checkpoint.rs    — Checkpoint container
//                      load / recent / save / predict
//
//   bundle.rs        — On-disk checkpoint format
//                      versioned bincode struct, write-once
//
//   text_encoder.rs  — Word-level text encoder
//                      built from a corpus, persisted as
//                      tokenizer JSON inside the checkpoint
//
//   optimizer.rs     — Opaque optimizer state bytes
//
//   device.rs        — Backend device placement
//                      maps DeviceTag to Burn devices
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Checkpoint container
pub mod checkpoint;

/// Versioned checkpoint file format
pub mod bundle;

/// Backend device placement
pub mod device;

/// Optimizer state snapshot
pub mod optimizer;

/// Word-level text encoder
pub mod text_encoder;
