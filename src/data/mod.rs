// ============================================================
// Layer 4 — Data Helpers
// ============================================================
// The only data the crate itself reads is the small parallel
// corpus used to build the vocabularies of a fresh checkpoint.
//
//   corpus.tsv
//       │
//       ▼
//   ParallelCorpus    → reads and splits source/target lines
//       │
//       ▼
//   Preprocessor      → whitespace and control-char cleanup
//       │
//       ▼
//   TextEncoder       → vocabulary (Layer 6, infra)

/// Tab-separated source/target pair loader
pub mod corpus;

/// Cleans and normalises a single text sequence
pub mod preprocessor;
