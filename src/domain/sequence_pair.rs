// ============================================================
// Layer 3 — SequencePair Domain Type
// ============================================================
// One aligned example: an input sequence and the output
// sequence the model should produce for it. Used to build the
// input and output vocabularies of a fresh checkpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePair {
    /// Text fed to the input encoder
    pub source: String,

    /// Text produced through the output encoder
    pub target: String,
}

impl SequencePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
