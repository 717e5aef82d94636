// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All tensor code lives here.
//
//   model.rs      — SequenceModel contract, ForwardMode and the
//                   reference TransformerTagger
//
//   inferencer.rs — top-k decoding of one input through a
//                   restored model and its encoders

/// Model contract and reference transformer tagger
pub mod model;

/// Single-example top-k inference
pub mod inferencer;
