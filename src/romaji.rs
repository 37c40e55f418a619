//! Romanized-input normalization.
//!
//! Players answer either in Latin letters or in kana (an IME commonly commits
//! kana or full-width Latin into the answer box); both must compare equal
//! against the prompt's expected reading. Folding order mirrors what browsers
//! hand us: trim, lowercase, NFKC, then Latin-or-kana resolution.

use unicode_normalization::UnicodeNormalization;

/// Reading for a single hiragana character, if the dataset knows it.
pub fn kana_to_romaji(kana: char) -> Option<&'static str> {
    crate::SYLLABLES
        .iter()
        .find(|(k, _)| k.chars().next() == Some(kana))
        .map(|&(_, r)| r)
}

/// Normalize raw player input (or an expected reading) into comparable form.
///
/// Latin wins: if any `a..z` survives trimming, lowercasing and NFKC folding
/// (full-width Latin becomes ASCII there), exactly those characters form the
/// result. Otherwise each known kana contributes its reading and every other
/// character is skipped, so the result may be empty.
pub fn normalize(value: &str) -> String {
    let folded: String = value.trim().to_lowercase().nfkc().collect();

    let latin: String = folded.chars().filter(|c| c.is_ascii_lowercase()).collect();
    if !latin.is_empty() {
        return latin;
    }

    folded.chars().filter_map(kana_to_romaji).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_passes_through() {
        assert_eq!(normalize("shi"), "shi");
    }

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize("  KA \u{3000}"), "ka");
    }

    #[test]
    fn fullwidth_latin_folds_to_ascii() {
        assert_eq!(normalize("ｓｈｉ"), "shi");
        assert_eq!(normalize("ＴＳＵ"), "tsu");
    }

    #[test]
    fn kana_folds_to_reading() {
        assert_eq!(normalize("しか"), "shika");
        assert_eq!(normalize("ぢ"), "ji");
        assert_eq!(normalize("しん"), "shin");
    }

    #[test]
    fn latin_wins_over_kana_in_mixed_input() {
        assert_eq!(normalize("しka"), "ka");
    }

    #[test]
    fn unknown_characters_are_skipped() {
        // Punctuation and digits vanish on the Latin path...
        assert_eq!(normalize("ka-12!"), "ka");
        // ...and unknown kana (katakana, small きゃ glide) vanish on the kana path.
        assert_eq!(normalize("カし"), "shi");
        assert_eq!(normalize("きゃ"), "ki");
    }

    #[test]
    fn combining_voiced_mark_composes_before_lookup() {
        // か + U+3099 composes to が under NFKC.
        assert_eq!(normalize("か\u{3099}"), "ga");
    }

    #[test]
    fn empty_and_whitespace_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("・!?"), "");
    }

    #[test]
    fn every_dataset_kana_resolves() {
        for &(kana, romaji) in crate::SYLLABLES {
            let c = kana.chars().next().unwrap();
            assert_eq!(kana_to_romaji(c), Some(romaji), "missing reading for {kana}");
        }
    }
}
