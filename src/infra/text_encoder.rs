// ============================================================
// Layer 6 — Text Encoder
// ============================================================
// Word-level vocabulary used for both sides of a sequence
// model. Built on the Hugging Face `tokenizers` crate so the
// whole encoder (normaliser, pre-tokenizer, vocabulary) can be
// written into a checkpoint as one JSON document and restored
// byte-for-byte.
//
// Id layout:
//   0        [PAD]
//   1        [UNK]
//   2..      corpus words, most frequent first
//            (equal counts ordered alphabetically)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tokenizers::Tokenizer;

use crate::domain::traits::TextCodec;
use crate::error::{CheckpointError, Result};

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

/// Number of ids reserved ahead of corpus words
const RESERVED: usize = 2;

#[derive(Clone)]
pub struct TextEncoder {
    tokenizer: Tokenizer,
}

impl TextEncoder {
    /// Build a vocabulary from `texts`, keeping at most `vocab_size` ids
    /// (special tokens included).
    pub fn build(texts: &[String], vocab_size: usize, lowercase: bool) -> Result<Self> {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            let text = text.replace(|c: char| c.is_control(), " ");
            for word in text.split_whitespace() {
                let word = if lowercase { word.to_lowercase() } else { word.to_string() };
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(String, usize)> = freq
            .into_iter()
            .filter(|(w, _)| w != PAD_TOKEN && w != UNK_TOKEN)
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(RESERVED));

        let mut vocab = serde_json::json!({
            "[PAD]": PAD_ID,
            "[UNK]": UNK_ID,
        });
        for (id, (word, _)) in words.iter().enumerate() {
            vocab[word.as_str()] = serde_json::json!(id + RESERVED);
        }

        // Control characters act as word breaks
        let mut normalizers = vec![serde_json::json!({
            "type": "Replace",
            "pattern": { "Regex": "\\p{Cc}" },
            "content": " "
        })];
        if lowercase {
            normalizers.push(serde_json::json!({ "type": "Lowercase" }));
        }
        let normalizer = serde_json::json!({ "type": "Sequence", "normalizers": normalizers });

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_ID, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": UNK_ID, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": normalizer,
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let encoder = Self::from_json(&tokenizer_json.to_string())?;
        tracing::debug!("Built text encoder with {} ids", encoder.vocab_size());
        Ok(encoder)
    }

    /// Restore an encoder from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let tokenizer = Tokenizer::from_str(json)
            .map_err(|e| CheckpointError::Encoder(format!("cannot parse tokenizer: {e}")))?;
        Ok(Self { tokenizer })
    }

    /// Serialise the full encoder as a JSON document.
    pub fn to_json(&self) -> Result<String> {
        self.tokenizer
            .to_string(false)
            .map_err(|e| CheckpointError::Encoder(format!("cannot serialise tokenizer: {e}")))
    }

    /// Look up the text of a single id
    pub fn id_to_token(&self, id: u32) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }
}

impl TextCodec for TextEncoder {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| CheckpointError::Encoder(format!("encode: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| CheckpointError::Encoder(format!("decode: {e}")))
    }

    fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }
}

impl fmt::Debug for TextEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEncoder")
            .field("vocab_size", &self.vocab_size())
            .finish()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "the cat sat".to_string(),
            "The dog sat".to_string(),
            "a cat ran".to_string(),
        ]
    }

    #[test]
    fn test_vocab_is_ordered_by_frequency() {
        let enc = TextEncoder::build(&corpus(), 100, true).unwrap();
        // cat, sat and the appear twice; ties resolve alphabetically
        assert_eq!(enc.id_to_token(0).as_deref(), Some(PAD_TOKEN));
        assert_eq!(enc.id_to_token(1).as_deref(), Some(UNK_TOKEN));
        assert_eq!(enc.id_to_token(2).as_deref(), Some("cat"));
        assert_eq!(enc.id_to_token(3).as_deref(), Some("sat"));
        assert_eq!(enc.id_to_token(4).as_deref(), Some("the"));
        assert_eq!(enc.vocab_size(), 2 + 6);
    }

    #[test]
    fn test_vocab_size_is_capped() {
        let enc = TextEncoder::build(&corpus(), 4, true).unwrap();
        assert_eq!(enc.vocab_size(), 4);
    }

    #[test]
    fn test_encode_decode() {
        let enc = TextEncoder::build(&corpus(), 100, true).unwrap();
        let ids = enc.encode("The cat ran").unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(enc.decode(&ids).unwrap(), "the cat ran");
    }

    #[test]
    fn test_unknown_words_map_to_unk_and_vanish_on_decode() {
        let enc = TextEncoder::build(&corpus(), 100, true).unwrap();
        let ids = enc.encode("cat zebra").unwrap();
        assert_eq!(ids[1], UNK_ID);
        assert_eq!(enc.decode(&ids).unwrap(), "cat");
    }

    #[test]
    fn test_control_characters_split_words() {
        let texts = vec!["the\u{0}cat sat".to_string()];
        let enc = TextEncoder::build(&texts, 10, true).unwrap();
        assert_eq!(enc.vocab_size(), 2 + 3);

        let ids = enc.encode("The\u{7}cat\tsat\r\n").unwrap();
        assert_eq!(ids, enc.encode("the cat sat").unwrap());
        assert!(!ids.contains(&UNK_ID));
    }

    #[test]
    fn test_case_is_kept_without_lowercasing() {
        let texts = vec!["DET NOUN".to_string()];
        let enc = TextEncoder::build(&texts, 10, false).unwrap();
        let ids = enc.encode("DET NOUN").unwrap();
        assert!(!ids.contains(&UNK_ID));
        assert_eq!(enc.decode(&ids).unwrap(), "DET NOUN");
    }

    #[test]
    fn test_json_roundtrip_preserves_behaviour() {
        let enc = TextEncoder::build(&corpus(), 100, true).unwrap();
        let restored = TextEncoder::from_json(&enc.to_json().unwrap()).unwrap();

        let ids = enc.encode("a dog sat").unwrap();
        assert_eq!(restored.encode("a dog sat").unwrap(), ids);
        assert_eq!(restored.decode(&ids).unwrap(), enc.decode(&ids).unwrap());
    }

    #[test]
    fn test_garbage_json_is_rejected() {
        assert!(matches!(
            TextEncoder::from_json("not json"),
            Err(CheckpointError::Encoder(_))
        ));
    }
}
