// ============================================================
// Layer 3 — Prediction Domain Types
// ============================================================
// What goes into and comes out of one inference call.
//
//   SequenceInput  → raw text or already-tokenised ids
//   Prediction     → one decoded candidate + per-token confidence
//   Predictions    → a single pair when one candidate was asked
//                    for, otherwise a ranked list

use serde::{Deserialize, Serialize};

/// Input to a single prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceInput {
    /// Raw text, tokenised by the input encoder
    Text(String),

    /// Token ids, used as-is
    Tokens(Vec<u32>),
}

impl From<&str> for SequenceInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SequenceInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u32>> for SequenceInput {
    fn from(ids: Vec<u32>) -> Self {
        Self::Tokens(ids)
    }
}

/// One decoded candidate sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Output sequence decoded by the output encoder
    pub sequence: String,

    /// Probability of the chosen token at every output position.
    /// Range: [0.0, 1.0]
    pub confidences: Vec<f32>,
}

impl Prediction {
    pub fn new(sequence: impl Into<String>, confidences: Vec<f32>) -> Self {
        Self {
            sequence: sequence.into(),
            confidences,
        }
    }

    /// Confidence at the first output position, 0.0 for empty output
    pub fn head_confidence(&self) -> f32 {
        self.confidences.first().copied().unwrap_or(0.0)
    }
}

/// Result shape of a prediction call.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    /// Exactly one candidate was requested
    Single(Prediction),

    /// Candidates in descending order of first-position confidence
    Ranked(Vec<Prediction>),
}

impl Predictions {
    /// Number of candidates carried
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Ranked(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a list regardless of shape
    pub fn into_vec(self) -> Vec<Prediction> {
        match self {
            Self::Single(one) => vec![one],
            Self::Ranked(all) => all,
        }
    }
}
