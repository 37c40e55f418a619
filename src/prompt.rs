//! Prompt generation.

use crate::{Difficulty, SYLLABLES};

/// One kana string for the player to type, paired with its expected reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kana: String,
    pub romaji: String,
}

/// Build a random prompt for `difficulty`.
///
/// `rng(n)` must return a uniform index in `0..n`. The browser build feeds it
/// from `Math.random`; tests feed it scripted values. Prompt length is drawn
/// first, then one syllable per position.
pub fn generate(difficulty: Difficulty, rng: &mut dyn FnMut(usize) -> usize) -> Prompt {
    let (min, max) = difficulty.prompt_len();
    let len = min + rng(max - min + 1);

    let mut kana = String::new();
    let mut romaji = String::new();
    for _ in 0..len {
        let (k, r) = SYLLABLES[rng(SYLLABLES.len())];
        kana.push_str(k);
        romaji.push_str(r);
    }

    Prompt { kana, romaji }
}
