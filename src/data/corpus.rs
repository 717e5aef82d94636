// ============================================================
// Layer 4 — Parallel Corpus Loader
// ============================================================
// Reads aligned examples from a tab-separated text file:
//
//   # comment lines and blank lines are ignored
//   the cat sat<TAB>DET NOUN VERB
//   a dog ran<TAB>DET NOUN VERB
//
// Everything before the first tab is the source sequence,
// everything after it the target. Lines without a tab, or with
// an empty side, are skipped with a warning rather than failing
// the whole load.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::preprocessor::Preprocessor;
use crate::domain::sequence_pair::SequencePair;
use crate::domain::traits::PairSource;

pub struct ParallelCorpus {
    /// Path to the .tsv file
    path: PathBuf,
}

impl ParallelCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse corpus text that is already in memory.
    pub fn parse(content: &str) -> Vec<SequencePair> {
        let prep = Preprocessor::new();
        let mut pairs = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((source, target)) = line.split_once('\t') else {
                tracing::warn!("Skipping corpus line {}: no tab separator", number + 1);
                continue;
            };

            let source = prep.clean(source);
            let target = prep.clean(target);
            if source.is_empty() || target.is_empty() {
                tracing::warn!("Skipping corpus line {}: empty side", number + 1);
                continue;
            }

            pairs.push(SequencePair::new(source, target));
        }

        pairs
    }
}

impl PairSource for ParallelCorpus {
    fn load_pairs(&self) -> Result<Vec<SequencePair>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let pairs = Self::parse(&content);
        tracing::info!(
            "Loaded {} sequence pairs from '{}'",
            pairs.len(),
            self.path.display()
        );
        Ok(pairs)
    }
}
