// Integration tests for kana dataset invariants.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::{HashMap, HashSet};

#[test]
fn syllable_entries_are_unique_and_valid() {
    let mut seen = HashSet::new();
    for (kana, romaji) in kana_sprint::SYLLABLES {
        assert!(seen.insert(*kana), "duplicate kana '{}' in SYLLABLES", kana);
        assert_eq!(kana.chars().count(), 1, "kana '{}' should be a single character", kana);
        let s = *romaji;
        assert!(!s.is_empty(), "empty romaji for kana '{}'", kana);
        assert!(s.len() <= 3, "romaji '{}' for '{}' is longer than any Hepburn reading", s, kana);
        for c in s.chars() {
            assert!(c.is_ascii_lowercase(), "invalid char '{}' in romaji '{}' for '{}'", c, s, kana);
        }
    }
}

#[test]
fn only_ji_and_zu_readings_are_shared() {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_kana, romaji) in kana_sprint::SYLLABLES {
        *counts.entry(*romaji).or_insert(0) += 1;
    }
    for (romaji, count) in counts {
        if romaji == "ji" || romaji == "zu" {
            // じ/ぢ and ず/づ read the same in Hepburn.
            assert_eq!(count, 2, "reading '{}' should be shared by exactly two kana", romaji);
        } else {
            assert_eq!(count, 1, "reading '{}' is unexpectedly shared", romaji);
        }
    }
}

#[test]
fn every_entry_survives_normalization_both_ways() {
    for (kana, romaji) in kana_sprint::SYLLABLES {
        assert_eq!(
            kana_sprint::romaji::normalize(kana),
            *romaji,
            "kana '{}' does not fold to '{}'",
            kana,
            romaji
        );
        assert_eq!(
            kana_sprint::romaji::normalize(romaji),
            *romaji,
            "romaji '{}' is not normalization-stable",
            romaji
        );
    }
}

#[test]
fn difficulty_ranges_grow_and_stay_sane() {
    let mut prev_min = 0;
    for difficulty in kana_sprint::Difficulty::ALL {
        let (min, max) = difficulty.prompt_len();
        assert!(min >= 1 && min <= max, "bad prompt range for {:?}", difficulty);
        assert!(min > prev_min, "prompt ranges should grow with difficulty");
        prev_min = min;
    }
    assert_eq!(kana_sprint::Difficulty::Easy.prompt_len(), (2, 3));
    assert_eq!(kana_sprint::Difficulty::Hard.prompt_len(), (4, 5));
}
