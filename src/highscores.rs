//! Best score per level

use serde::{Deserialize, Serialize};

/// Best scores, indexed by level
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    pub best: Vec<u64>,
}

impl HighScores {
    pub fn new() -> Self {
        Self { best: Vec::new() }
    }

    /// Best score recorded for a level (0 if none)
    pub fn best(&self, level: usize) -> u64 {
        self.best.get(level).copied().unwrap_or(0)
    }

    /// Record a score; returns true when it beats the stored best
    pub fn record(&mut self, level: usize, score: u64) -> bool {
        if score == 0 || score <= self.best(level) {
            return false;
        }
        if self.best.len() <= level {
            self.best.resize(level + 1, 0);
        }
        self.best[level] = score;
        true
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_best() {
        let mut scores = HighScores::new();
        assert!(scores.record(3, 500));
        assert!(!scores.record(3, 400));
        assert!(scores.record(3, 900));
        assert_eq!(scores.best(3), 900);
        assert_eq!(scores.best(0), 0);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.record(0, 0));
        assert!(scores.best.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut scores = HighScores::new();
        scores.record(1, 1234);
        let back = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(back, scores);
    }
}
