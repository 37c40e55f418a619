//! Scoring state for one 60-second run.

use crate::romaji;

/// Points for a correct answer.
pub const SUCCESS_POINTS: u32 = 100;
/// Points lost on a miss; the score never goes below zero.
pub const MISS_PENALTY: u32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub score: u32,
    pub successes: u32,
    pub attempts: u32,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// Grade one submission against the expected normalized reading.
    ///
    /// Returns `None` when the input normalizes to nothing; such a submission
    /// is ignored outright and no attempt is counted. Otherwise one attempt is
    /// recorded and `Some(correct)` reports the outcome.
    pub fn check_answer(&mut self, input: &str, expected: &str) -> Option<bool> {
        let normalized = romaji::normalize(input);
        if normalized.is_empty() {
            return None;
        }

        self.attempts += 1;
        if normalized == expected {
            self.successes += 1;
            self.score += SUCCESS_POINTS;
            Some(true)
        } else {
            self.score = self.score.saturating_sub(MISS_PENALTY);
            Some(false)
        }
    }

    /// Whole-percent accuracy, rounded half up; 0 before the first attempt.
    pub fn accuracy_percent(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        (self.successes as f64 / self.attempts as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_scores_and_counts() {
        let mut s = Session::new();
        assert_eq!(s.check_answer("shi", "shi"), Some(true));
        assert_eq!(s.score, SUCCESS_POINTS);
        assert_eq!(s.successes, 1);
        assert_eq!(s.attempts, 1);
    }

    #[test]
    fn miss_costs_points_but_never_goes_negative() {
        let mut s = Session::new();
        assert_eq!(s.check_answer("ka", "shi"), Some(false));
        assert_eq!(s.score, 0);
        assert_eq!(s.attempts, 1);

        s.score = 5;
        s.check_answer("ka", "shi");
        assert_eq!(s.score, 0);
    }

    #[test]
    fn miss_after_successes_subtracts_penalty() {
        let mut s = Session::new();
        s.check_answer("a", "a");
        s.check_answer("a", "a");
        s.check_answer("xx", "a");
        assert_eq!(s.score, 2 * SUCCESS_POINTS - MISS_PENALTY);
        assert_eq!(s.successes, 2);
        assert_eq!(s.attempts, 3);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut s = Session::new();
        assert_eq!(s.check_answer("", "shi"), None);
        assert_eq!(s.check_answer("   ", "shi"), None);
        assert_eq!(s.check_answer("?!", "shi"), None);
        assert_eq!(s.attempts, 0);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn kana_input_matches_romaji_expectation() {
        let mut s = Session::new();
        assert_eq!(s.check_answer("しか", "shika"), Some(true));
    }

    #[test]
    fn accuracy_rounds_to_whole_percent() {
        let mut s = Session::new();
        assert_eq!(s.accuracy_percent(), 0);

        s.check_answer("a", "a");
        s.check_answer("a", "a");
        s.check_answer("b", "a");
        assert_eq!(s.accuracy_percent(), 67);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = Session::new();
        s.check_answer("a", "a");
        s.reset();
        assert_eq!(s, Session::default());
    }
}
