// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits. No Burn types, no file
// I/O — only the vocabulary the other layers speak in.

/// Device tags and the load-time placement policy
pub mod placement;

/// Inference inputs and results
pub mod prediction;

/// An aligned source/target example
pub mod sequence_pair;

/// Encoder and data-source abstractions
pub mod traits;
