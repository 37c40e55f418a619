//! localStorage persistence for personal bests and the local ranking.
//!
//! Keys and JSON shapes are kept compatible with what earlier page versions
//! wrote, so stored data survives upgrades. Parsing is lenient per field: a
//! malformed bucket falls back to its default instead of discarding the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{console, Storage};

use crate::ranking::{RankingEntry, Rankings};
use crate::Difficulty;

pub const HIGH_SCORE_KEY: &str = "typingGame.pages.localHighScores";
pub const RANKING_KEY: &str = "typingGame.pages.rankings";

// -----------------------------------------------------------------------------
// Personal bests
// -----------------------------------------------------------------------------

/// Best score per difficulty. Difficulties never played stay absent from the
/// stored JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easy: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard: Option<u32>,
}

/// How a finished run compares against the stored personal best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestOutcome {
    Improved,
    Tied,
    Unchanged,
}

impl HighScores {
    pub fn get(&self, difficulty: Difficulty) -> Option<u32> {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }

    fn slot_mut(&mut self, difficulty: Difficulty) -> &mut Option<u32> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Fold a finished run into the table. A missing best counts as 0, and a
    /// tie at 0 is reported as [`BestOutcome::Unchanged`] so an idle run does
    /// not celebrate.
    pub fn record(&mut self, difficulty: Difficulty, score: u32) -> BestOutcome {
        let best = self.get(difficulty).unwrap_or(0);
        if score > best {
            *self.slot_mut(difficulty) = Some(score);
            BestOutcome::Improved
        } else if score == best && score != 0 {
            BestOutcome::Tied
        } else {
            BestOutcome::Unchanged
        }
    }
}

// -----------------------------------------------------------------------------
// Lenient JSON parsing
// -----------------------------------------------------------------------------

/// Parse a stored high-score blob, keeping whatever fields are usable.
pub fn parse_high_scores(raw: &str) -> HighScores {
    checked_parse_high_scores(raw).unwrap_or_default()
}

/// Parse a stored rankings blob, keeping whatever buckets and entries are
/// usable.
pub fn parse_rankings(raw: &str) -> Rankings {
    checked_parse_rankings(raw).unwrap_or_default()
}

// `None` means the blob is not JSON at all; the load path warns on that.
// Shape problems inside valid JSON degrade per field instead.
fn checked_parse_high_scores(raw: &str) -> Option<HighScores> {
    let value: Value = serde_json::from_str(raw).ok()?;
    Some(high_scores_from_value(&value))
}

fn checked_parse_rankings(raw: &str) -> Option<Rankings> {
    let value: Value = serde_json::from_str(raw).ok()?;
    Some(rankings_from_value(&value))
}

fn high_scores_from_value(value: &Value) -> HighScores {
    let mut scores = HighScores::default();
    for difficulty in Difficulty::ALL {
        *scores.slot_mut(difficulty) = value.get(difficulty.key()).and_then(score_from);
    }
    scores
}

fn rankings_from_value(value: &Value) -> Rankings {
    let mut rankings = Rankings::default();
    for difficulty in Difficulty::ALL {
        *rankings.bucket_mut(difficulty) = entries_from(value.get(difficulty.key()));
    }
    rankings
}

fn entries_from(value: Option<&Value>) -> Vec<RankingEntry> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(entry_from).collect(),
        _ => Vec::new(),
    }
}

// Entries need a usable score; a missing timestamp renders as "-" later, so
// it defaults to empty rather than dropping the entry.
fn entry_from(item: &Value) -> Option<RankingEntry> {
    let score = item.get("score").and_then(score_from)?;
    let created_at = item
        .get("created_at")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(RankingEntry { score, created_at })
}

fn score_from(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

// -----------------------------------------------------------------------------
// localStorage plumbing
// -----------------------------------------------------------------------------

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read_raw(key: &str) -> Option<String> {
    let storage = local_storage()?;
    match storage.get_item(key) {
        Ok(value) => value,
        Err(err) => {
            console::warn_2(&JsValue::from_str("failed to read localStorage:"), &err);
            None
        }
    }
}

fn write_json<T: Serialize>(key: &str, value: &T) {
    let Some(storage) = local_storage() else {
        return;
    };
    if let Ok(json) = serde_json::to_string(value) {
        if let Err(err) = storage.set_item(key, &json) {
            console::warn_2(&JsValue::from_str("failed to write localStorage:"), &err);
        }
    }
}

pub fn load_high_scores() -> HighScores {
    let Some(raw) = read_raw(HIGH_SCORE_KEY) else {
        return HighScores::default();
    };
    checked_parse_high_scores(&raw).unwrap_or_else(|| {
        console::warn_1(&JsValue::from_str("failed to parse stored high scores"));
        HighScores::default()
    })
}

pub fn save_high_scores(scores: &HighScores) {
    write_json(HIGH_SCORE_KEY, scores);
}

pub fn load_rankings() -> Rankings {
    let Some(raw) = read_raw(RANKING_KEY) else {
        return Rankings::default();
    };
    checked_parse_rankings(&raw).unwrap_or_else(|| {
        console::warn_1(&JsValue::from_str("failed to parse stored rankings"));
        Rankings::default()
    })
}

pub fn save_rankings(rankings: &Rankings) {
    write_json(RANKING_KEY, rankings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_high_scores() {
        let scores = parse_high_scores(r#"{"easy": 500, "hard": 1200}"#);
        assert_eq!(scores.easy, Some(500));
        assert_eq!(scores.normal, None);
        assert_eq!(scores.hard, Some(1200));
    }

    #[test]
    fn junk_high_score_fields_fall_back_to_none() {
        let scores = parse_high_scores(r#"{"easy": "abc", "normal": 4.5, "hard": -3}"#);
        assert_eq!(scores, HighScores::default());
    }

    #[test]
    fn invalid_high_score_json_falls_back_to_default() {
        assert_eq!(parse_high_scores("not json"), HighScores::default());
        assert_eq!(parse_high_scores(""), HighScores::default());
        assert_eq!(parse_high_scores("[1,2,3]"), HighScores::default());
    }

    #[test]
    fn high_scores_serialize_without_absent_fields() {
        let json = serde_json::to_string(&HighScores {
            normal: Some(700),
            ..HighScores::default()
        })
        .unwrap();
        assert_eq!(json, r#"{"normal":700}"#);
    }

    #[test]
    fn record_reports_improved_tied_unchanged() {
        let mut scores = HighScores::default();
        assert_eq!(scores.record(Difficulty::Easy, 300), BestOutcome::Improved);
        assert_eq!(scores.easy, Some(300));

        assert_eq!(scores.record(Difficulty::Easy, 300), BestOutcome::Tied);
        assert_eq!(scores.record(Difficulty::Easy, 100), BestOutcome::Unchanged);
        assert_eq!(scores.easy, Some(300));
    }

    #[test]
    fn zero_score_never_ties_or_improves() {
        let mut scores = HighScores::default();
        assert_eq!(scores.record(Difficulty::Normal, 0), BestOutcome::Unchanged);
        assert_eq!(scores.normal, None);
    }

    #[test]
    fn parses_rankings_and_drops_unusable_entries() {
        let raw = r#"{
            "easy": [
                {"score": 800, "created_at": "2026-03-01T10:00:00.000Z"},
                {"score": "bad"},
                {"created_at": "2026-03-02T10:00:00.000Z"},
                {"score": 400}
            ],
            "normal": "nope"
        }"#;
        let rankings = parse_rankings(raw);
        assert_eq!(rankings.easy.len(), 2);
        assert_eq!(rankings.easy[0].score, 800);
        assert_eq!(rankings.easy[1].score, 400);
        assert_eq!(rankings.easy[1].created_at, "");
        assert!(rankings.normal.is_empty());
        assert!(rankings.hard.is_empty());
    }

    #[test]
    fn invalid_ranking_json_falls_back_to_default() {
        assert_eq!(parse_rankings("{broken"), Rankings::default());
        assert_eq!(parse_rankings("42"), Rankings::default());
    }

    #[test]
    fn unreadable_blobs_are_told_apart_from_foreign_shapes() {
        // The load path warns exactly when the checked parse yields None.
        assert_eq!(checked_parse_high_scores("{broken"), None);
        assert_eq!(checked_parse_rankings("not json"), None);
        assert_eq!(
            checked_parse_high_scores("[1,2,3]"),
            Some(HighScores::default())
        );
        assert_eq!(checked_parse_rankings("42"), Some(Rankings::default()));
    }

    #[test]
    fn rankings_survive_a_save_load_cycle() {
        let mut rankings = Rankings::default();
        rankings.easy.push(RankingEntry {
            score: 900,
            created_at: "2026-04-01T09:30:00.000Z".to_string(),
        });
        let json = serde_json::to_string(&rankings).unwrap();
        assert_eq!(parse_rankings(&json), rankings);
    }
}
