//! Kana Sprint core crate.
//!
//! A 60-second kana typing trainer that runs entirely in the browser: the
//! host page calls [`start_game`] once and the crate owns everything from
//! there, from DOM widgets and the countdown timer to scoring, localStorage
//! persistence and oscillator sound. Gameplay logic (normalization, prompts,
//! ranking, storage formats) is kept free of browser APIs so it can be tested
//! on the host with plain `cargo test`.

use wasm_bindgen::prelude::*;

mod audio;
mod game;
pub mod prompt;
pub mod ranking;
pub mod romaji;
pub mod session;
pub mod storage;
mod ui;

pub use prompt::Prompt;
pub use ranking::{RankingEntry, Rankings};
pub use session::Session;
pub use storage::{BestOutcome, HighScores};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Shared kana dataset
// Hepburn-style readings; ぢ/じ both read "ji" and づ/ず both read "zu".
// -----------------------------------------------------------------------------

pub const SYLLABLES: &[(&str, &str)] = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("を", "wo"), ("ん", "n"),
    ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
    ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
    ("だ", "da"), ("ぢ", "ji"), ("づ", "zu"), ("で", "de"), ("ど", "do"),
    ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
    ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
];

// -----------------------------------------------------------------------------
// Difficulties
// -----------------------------------------------------------------------------

/// Prompt difficulty. Controls how many syllables a prompt strings together;
/// also the bucketing key for personal bests and the local ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Key used in storage JSON and as the `<select>` option value.
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Label shown in the difficulty selector.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "かんたん",
            Difficulty::Normal => "ふつう",
            Difficulty::Hard => "むずかしい",
        }
    }

    /// Inclusive bounds for the number of syllables in a prompt.
    pub fn prompt_len(self) -> (usize, usize) {
        match self {
            Difficulty::Easy => (2, 3),
            Difficulty::Normal => (3, 4),
            Difficulty::Hard => (4, 5),
        }
    }

    pub fn from_key(key: &str) -> Option<Difficulty> {
        match key {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::start()
}
