// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seams between the checkpoint core and its collaborators.
//
//   TextCodec   — text ⇄ token ids (input and output encoders)
//   PairSource  — anything that yields source/target text pairs
//
// Neither trait mentions Burn; tensors only appear in Layer 5.

use crate::domain::sequence_pair::SequencePair;
use crate::error::Result;

// ─── TextCodec ────────────────────────────────────────────────────────────────
/// Two-way mapping between text and vocabulary indices.
///
/// Implementations:
///   - TextEncoder → word-level vocabulary persisted in checkpoints
pub trait TextCodec {
    /// Split text into vocabulary indices.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Join vocabulary indices back into text, dropping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Number of distinct indices this codec can produce.
    fn vocab_size(&self) -> usize;
}

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can load aligned source/target examples.
///
/// Implementations:
///   - ParallelCorpus → tab-separated text file
pub trait PairSource {
    fn load_pairs(&self) -> anyhow::Result<Vec<SequencePair>>;
}
