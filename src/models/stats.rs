//! Shared derived statistics models.

use serde::{Deserialize, Serialize};

/// Result of one map from the subject team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapOutcome {
    Win,
    Loss,
}

/// Win/loss tally over maps with a determined outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WinRecord {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    /// Win rate in percent (0.0 to 100.0)
    pub win_rate: f64,
}

impl WinRecord {
    /// Add one outcome; `None` (undetermined) is ignored.
    pub fn record(&mut self, outcome: Option<MapOutcome>) {
        match outcome {
            Some(MapOutcome::Win) => self.wins += 1,
            Some(MapOutcome::Loss) => self.losses += 1,
            None => return,
        }
        self.games += 1;
        self.win_rate = win_rate_percent(self.wins, self.games);
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: &WinRecord) {
        self.games += other.games;
        self.wins += other.wins;
        self.losses += other.losses;
        self.win_rate = win_rate_percent(self.wins, self.games);
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Option<MapOutcome>>,
    {
        let mut record = Self::default();
        for outcome in outcomes {
            record.record(outcome);
        }
        record
    }
}

/// Win rate in percent, zero when there are no games.
pub fn win_rate_percent(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64 * 100.0
    }
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rating band for a 0.0 to 1.0 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceRating {
    Excellent,
    Fair,
    NeedsImprovement,
}

impl BalanceRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            BalanceRating::Excellent
        } else if score >= 0.6 {
            BalanceRating::Fair
        } else {
            BalanceRating::NeedsImprovement
        }
    }
}

impl std::fmt::Display for BalanceRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceRating::Excellent => write!(f, "excellent"),
            BalanceRating::Fair => write!(f, "fair"),
            BalanceRating::NeedsImprovement => write!(f, "needs improvement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_rating_from_score() {
        assert_eq!(BalanceRating::from_score(0.95), BalanceRating::Excellent);
        assert_eq!(BalanceRating::from_score(0.8), BalanceRating::Excellent);
        assert_eq!(BalanceRating::from_score(0.79), BalanceRating::Fair);
        assert_eq!(BalanceRating::from_score(0.6), BalanceRating::Fair);
        assert_eq!(BalanceRating::from_score(0.59), BalanceRating::NeedsImprovement);
    }

    #[test]
    fn test_win_record_ignores_undetermined() {
        let record = WinRecord::from_outcomes(vec![
            Some(MapOutcome::Win),
            None,
            Some(MapOutcome::Loss),
            Some(MapOutcome::Win),
        ]);

        assert_eq!(record.games, 3);
        assert_eq!(record.wins, 2);
        assert_eq!(record.losses, 1);
        assert!((record.win_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_win_record_empty() {
        let record = WinRecord::from_outcomes(Vec::new());
        assert_eq!(record, WinRecord::default());
        assert_eq!(record.win_rate, 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.04), 0.0);
    }
}
