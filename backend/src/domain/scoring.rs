//! Score values and the fixed 3/1/0 points rule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest score a participant may report.
pub const SCORE_MAX: i64 = 999;

/// Points awarded for a win.
pub const WIN_POINTS: u32 = 3;
/// Points awarded to each side of a draw.
pub const DRAW_POINTS: u32 = 1;
/// Points awarded for a loss.
pub const LOSS_POINTS: u32 = 0;

/// Errors raised when a reported score is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreValidationError {
    /// Scores cannot be negative.
    #[error("score must not be negative (got {0})")]
    Negative(i64),
    /// Scores are capped at [`SCORE_MAX`].
    #[error("score must be at most {SCORE_MAX} (got {0})")]
    TooLarge(i64),
}

/// A single side's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Score(u16);

impl Score {
    /// Validate a raw score.
    pub fn new(raw: i64) -> Result<Self, ScoreValidationError> {
        if raw < 0 {
            return Err(ScoreValidationError::Negative(raw));
        }
        if raw > SCORE_MAX {
            return Err(ScoreValidationError::TooLarge(raw));
        }
        u16::try_from(raw)
            .map(Self)
            .map_err(|_| ScoreValidationError::TooLarge(raw))
    }

    /// Numeric value.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u16 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Score report for a match, ordered as (player1, player2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScorePair {
    /// Score of the match's first player.
    pub score1: Score,
    /// Score of the match's second player.
    pub score2: Score,
}

impl ScorePair {
    /// Build a pair from already validated scores.
    pub const fn new(score1: Score, score2: Score) -> Self {
        Self { score1, score2 }
    }

    /// Validate both raw scores.
    ///
    /// # Examples
    /// ```
    /// use scorekeeper::domain::ScorePair;
    ///
    /// let pair = ScorePair::try_from_raw(3, 1).unwrap();
    /// assert_eq!(pair.points(), (3, 0));
    /// assert!(ScorePair::try_from_raw(-1, 0).is_err());
    /// ```
    pub fn try_from_raw(score1: i64, score2: i64) -> Result<Self, ScoreValidationError> {
        Ok(Self::new(Score::new(score1)?, Score::new(score2)?))
    }

    /// Outcome from the first player's point of view.
    pub fn outcome(self) -> MatchOutcome {
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => MatchOutcome::Player1Win,
            std::cmp::Ordering::Less => MatchOutcome::Player2Win,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    /// Points for (player1, player2) under the 3/1/0 rule.
    pub fn points(self) -> (u32, u32) {
        points(self.score1.get(), self.score2.get())
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.score1, self.score2)
    }
}

/// Result category of a confirmed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// First player scored more.
    Player1Win,
    /// Second player scored more.
    Player2Win,
    /// Equal scores.
    Draw,
}

/// Points awarded to each side for a final score.
///
/// Winner takes [`WIN_POINTS`], loser [`LOSS_POINTS`], a draw gives both
/// sides [`DRAW_POINTS`].
///
/// # Examples
/// ```
/// use scorekeeper::domain::points;
///
/// assert_eq!(points(3, 1), (3, 0));
/// assert_eq!(points(1, 1), (1, 1));
/// assert_eq!(points(0, 2), (0, 3));
/// ```
pub fn points(score_a: u16, score_b: u16) -> (u32, u32) {
    match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => (WIN_POINTS, LOSS_POINTS),
        std::cmp::Ordering::Less => (LOSS_POINTS, WIN_POINTS),
        std::cmp::Ordering::Equal => (DRAW_POINTS, DRAW_POINTS),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3, 1, (3, 0))]
    #[case(1, 1, (1, 1))]
    #[case(0, 2, (0, 3))]
    #[case(0, 0, (1, 1))]
    #[case(999, 998, (3, 0))]
    fn points_follow_three_one_zero(#[case] a: u16, #[case] b: u16, #[case] expected: (u32, u32)) {
        assert_eq!(points(a, b), expected);
    }

    #[rstest]
    #[case(-1, ScoreValidationError::Negative(-1))]
    #[case(1000, ScoreValidationError::TooLarge(1000))]
    #[case(i64::MAX, ScoreValidationError::TooLarge(i64::MAX))]
    fn score_rejects_out_of_range(#[case] raw: i64, #[case] expected: ScoreValidationError) {
        assert_eq!(Score::new(raw), Err(expected));
    }

    #[rstest]
    #[case(2, 1, MatchOutcome::Player1Win)]
    #[case(1, 2, MatchOutcome::Player2Win)]
    #[case(4, 4, MatchOutcome::Draw)]
    fn outcome_compares_scores(#[case] a: i64, #[case] b: i64, #[case] expected: MatchOutcome) {
        let pair = ScorePair::try_from_raw(a, b).expect("valid scores");
        assert_eq!(pair.outcome(), expected);
    }

    #[rstest]
    fn pair_deserialisation_validates_scores() {
        let ok: ScorePair =
            serde_json::from_str(r#"{"score1": 2, "score2": 0}"#).expect("valid pair");
        assert_eq!(ok.to_string(), "2-0");

        let bad: Result<ScorePair, _> = serde_json::from_str(r#"{"score1": -3, "score2": 0}"#);
        assert!(bad.is_err());
    }
}
