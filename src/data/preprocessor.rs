// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises one sequence of text before it reaches an encoder.
// Corpus lines and prediction inputs go through the same
// cleaning so the vocabulary sees identical token boundaries.
//
// Cleaning steps (applied in order):
//   1. Map Unicode whitespace variants and tabs to a space
//   2. Map remaining control characters (newlines included)
//      to a space
//   3. Collapse runs of spaces into one
//   4. Trim both ends

#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a sequence into a single whitespace-normalised line.
    pub fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_space = true;

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // At most one trailing space survives the loop
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }
}
