//! Local top-10 ranking per difficulty.

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Entries kept per difficulty bucket.
pub const MAX_RANKING_ENTRIES: usize = 10;

/// One finished run: final score plus an ISO-8601 creation timestamp.
///
/// ISO-8601 strings compare chronologically as plain strings, so ties are
/// broken lexicographically on `created_at` with no date parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub score: u32,
    pub created_at: String,
}

/// The three persisted ranking buckets.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rankings {
    pub easy: Vec<RankingEntry>,
    pub normal: Vec<RankingEntry>,
    pub hard: Vec<RankingEntry>,
}

impl Rankings {
    pub fn bucket(&self, difficulty: Difficulty) -> &[RankingEntry] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn bucket_mut(&mut self, difficulty: Difficulty) -> &mut Vec<RankingEntry> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Insert `entry`, keeping the bucket sorted by score (highest first) with
/// older entries winning ties, then cap it at [`MAX_RANKING_ENTRIES`].
pub fn submit(bucket: &mut Vec<RankingEntry>, entry: RankingEntry) {
    bucket.push(entry);
    bucket.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    bucket.truncate(MAX_RANKING_ENTRIES);
}
