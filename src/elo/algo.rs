use std::f64::consts::SQRT_2;

use crate::config::EloParams;
use crate::error::{EloError, Result};

pub const INITIAL_ELO: f64 = 2000.0;

/// Outcome of a game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Loss,
    Draw,
    Win,
}

impl GameResult {
    pub fn score(self) -> f64 {
        match self {
            GameResult::Loss => 0.0,
            GameResult::Draw => 0.5,
            GameResult::Win => 1.0,
        }
    }

    /// The same game seen from the other side of the board.
    pub fn opposite(self) -> GameResult {
        match self {
            GameResult::Loss => GameResult::Win,
            GameResult::Draw => GameResult::Draw,
            GameResult::Win => GameResult::Loss,
        }
    }
}

impl TryFrom<f64> for GameResult {
    type Error = EloError;

    fn try_from(result: f64) -> Result<Self> {
        if result == 0.0 {
            Ok(GameResult::Loss)
        } else if result == 0.5 {
            Ok(GameResult::Draw)
        } else if result == 1.0 {
            Ok(GameResult::Win)
        } else {
            Err(EloError::InvalidResult(result))
        }
    }
}

/// Logistic CDF: probability that a player `difference` points ahead wins.
pub fn expectation(difference: f64, base: f64, coefficient: f64) -> f64 {
    1.0 / (1.0 + base.powf(-difference / coefficient))
}

/// Derivative of [`expectation`] with respect to `difference`.
pub fn density(difference: f64, base: f64, coefficient: f64) -> f64 {
    let b = base.powf(-difference / coefficient);
    base.ln() * b / (1.0 + b).powi(2) / coefficient
}

/// Normal CDF of the score difference of two players whose performances
/// each have standard deviation `coefficient`.
pub fn normal_expectation(difference: f64, coefficient: f64) -> f64 {
    let standardized = difference / (SQRT_2 * coefficient);
    0.5 * (1.0 + erf(standardized / SQRT_2))
}

// Abramowitz & Stegun 7.1.26, |error| < 1.5e-7
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    if x == 0.0 {
        return 0.0;
    }
    let t = 1.0 / (1.0 + P * x.abs());
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    (1.0 - poly * (-x * x).exp()).copysign(x)
}

fn calc_new_rating(old_rating: f64, expected: f64, k: f64, result: GameResult) -> f64 {
    old_rating + k * (result.score() - expected)
}

/// New rating of `player_rating` after a game with result `result`.
pub fn new_rating(
    params: &EloParams,
    player_rating: f64,
    opponent_rating: f64,
    result: GameResult,
) -> f64 {
    let expected = params.expected_score(player_rating - opponent_rating);
    calc_new_rating(player_rating, expected, params.max_points, result)
}

/// Like [`new_rating`], but takes the raw score and rejects anything other than 0, 0.5 or 1.
pub fn update(
    params: &EloParams,
    player_rating: f64,
    opponent_rating: f64,
    result: f64,
) -> Result<f64> {
    let result = GameResult::try_from(result)?;
    Ok(new_rating(params, player_rating, opponent_rating, result))
}

/// Rates both players of one game from the same snapshot of their ratings.
pub fn calculate(params: &EloParams, r1: f64, r2: f64, result: GameResult) -> (f64, f64) {
    (
        new_rating(params, r1, r2, result),
        new_rating(params, r2, r1, result.opposite()),
    )
}
