use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::EloParams;
use crate::elo::algo::{calculate, new_rating, GameResult};
use crate::elo::multiplayer::{apply, rating_changes, weighted_changes};
use crate::error::{EloError, Result};

/// Endless series of games between the same two players.
///
/// Each step rates the player first and then rates the opponent against the
/// player's already updated rating, so the two updates are sequential rather
/// than taken from one snapshot.
#[derive(Debug, Clone)]
pub struct Duel {
    params: EloParams,
    player: f64,
    opponent: f64,
    result: GameResult,
    played: usize,
}

impl Duel {
    /// Both players start at `initial`; the player always gets `result`.
    pub fn new(params: EloParams, initial: f64, result: GameResult) -> Self {
        Duel {
            params,
            player: initial,
            opponent: initial,
            result,
            played: 0,
        }
    }

    pub fn ratings(&self) -> (f64, f64) {
        (self.player, self.opponent)
    }

    pub fn played(&self) -> usize {
        self.played
    }
}

impl Iterator for Duel {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.player = new_rating(&self.params, self.player, self.opponent, self.result);
        self.opponent =
            new_rating(&self.params, self.opponent, self.player, self.result.opposite());
        self.played += 1;
        trace!(game = self.played, player = self.player, opponent = self.opponent);
        Some((self.player, self.opponent))
    }
}

/// Rating history of both players, including the starting ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub player: Vec<f64>,
    pub opponent: Vec<f64>,
}

impl Trajectory {
    pub fn games(&self) -> usize {
        self.player.len().saturating_sub(1)
    }

    /// Rating points the player picked up in each game.
    pub fn player_gains(&self) -> Vec<f64> {
        self.player.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn final_gap(&self) -> f64 {
        match (self.player.last(), self.opponent.last()) {
            (Some(p), Some(o)) => p - o,
            _ => 0.0,
        }
    }
}

/// Plays `games` games in which the player always wins, starting from equal ratings.
pub fn simulate(params: EloParams, initial: f64, games: usize) -> Trajectory {
    simulate_with(params, initial, games, GameResult::Win)
}

pub fn simulate_with(
    params: EloParams,
    initial: f64,
    games: usize,
    result: GameResult,
) -> Trajectory {
    let mut player = Vec::with_capacity(games + 1);
    let mut opponent = Vec::with_capacity(games + 1);
    player.push(initial);
    opponent.push(initial);

    for (p, o) in Duel::new(params, initial, result).take(games) {
        player.push(p);
        opponent.push(o);
    }

    let trajectory = Trajectory { player, opponent };
    debug!(
        games,
        final_gap = trajectory.final_gap(),
        "simulation finished"
    );
    trajectory
}

/// How far linear weighting of one observation drifts from replaying it.
///
/// A player `rating_gap` points ahead wins one game. Weighting that game by
/// `weight` multiplies the single-game change; replaying it `weight` times lets
/// the expectation catch up between games. Returns `replayed - linear`.
pub fn weighting_drift(params: &EloParams, rating_gap: f64, weight: u32) -> f64 {
    let single = new_rating(params, rating_gap, 0.0, GameResult::Win) - rating_gap;
    let linear = weight as f64 * single;

    let (mut winner, mut loser) = (rating_gap, 0.0);
    for _ in 0..weight {
        (winner, loser) = calculate(params, winner, loser, GameResult::Win);
    }
    let replayed = winner - rating_gap;

    replayed - linear
}

/// Rating history of one participant when the same ranked game repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDrift {
    /// Each occurrence applied once with its changes scaled by the weight.
    pub linear: Vec<f64>,
    /// Each occurrence replayed `weight` times.
    pub replayed: Vec<f64>,
}

impl FieldDrift {
    pub fn differences(&self) -> Vec<f64> {
        self.replayed
            .iter()
            .zip(&self.linear)
            .map(|(r, l)| r - l)
            .collect()
    }

    /// Occurrence count at which the two weightings disagree most, and by how much.
    pub fn largest(&self) -> Option<(usize, f64)> {
        self.differences()
            .into_iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

/// Whole-field version of [`weighting_drift`].
///
/// Everyone in `ranks` starts at 0 and the same result repeats `occurrences`
/// times. The linear run applies every occurrence once, weighted; the replayed
/// run plays it `weight` times. Both histories of `tracked` start with its
/// starting rating.
pub fn field_drift(
    params: &EloParams,
    ranks: &[(&str, u32)],
    tracked: &str,
    occurrences: usize,
    weight: u32,
) -> Result<FieldDrift> {
    if !ranks.iter().any(|&(name, _)| name == tracked) {
        return Err(EloError::UnknownPlayer(tracked.to_owned()));
    }
    let start: HashMap<String, f64> =
        ranks.iter().map(|&(name, _)| (name.to_owned(), 0.0)).collect();

    let mut ratings = start.clone();
    let mut linear = Vec::with_capacity(occurrences + 1);
    linear.push(ratings[tracked]);
    for _ in 0..occurrences {
        let changes = rating_changes(params, &ratings, ranks)?;
        apply(&mut ratings, &weighted_changes(&changes, weight as f64))?;
        linear.push(ratings[tracked]);
    }

    let mut ratings = start;
    let mut replayed = Vec::with_capacity(occurrences + 1);
    replayed.push(ratings[tracked]);
    for _ in 0..occurrences {
        for _ in 0..weight {
            let changes = rating_changes(params, &ratings, ranks)?;
            apply(&mut ratings, &changes)?;
        }
        replayed.push(ratings[tracked]);
    }

    let drift = FieldDrift { linear, replayed };
    debug!(occurrences, weight, largest = ?drift.largest(), "field drift");
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elo::algo::{update, INITIAL_ELO};
    use ntest::assert_about_eq;

    #[test]
    fn test_lengths() {
        let t = simulate(EloParams::default(), INITIAL_ELO, 50);
        assert_eq!(t.player.len(), 51);
        assert_eq!(t.opponent.len(), 51);
        assert_eq!(t.games(), 50);

        let empty = simulate(EloParams::default(), INITIAL_ELO, 0);
        assert_eq!(empty.player, vec![INITIAL_ELO]);
        assert_eq!(empty.opponent, vec![INITIAL_ELO]);
    }

    #[test]
    fn test_first_game() {
        let p = EloParams::default();
        let t = simulate(p, 2000.0, 1);
        assert_eq!(t.player[1], 2016.0);
        // opponent is rated against the updated player
        assert_eq!(t.opponent[1], update(&p, 2000.0, 2016.0, 0.0).unwrap());
        assert!(t.opponent[1] > 1984.0);
    }

    #[test]
    fn test_matches_sequential_updates() {
        let p = EloParams::default();
        let t = simulate(p, 2000.0, 20);
        let (mut player, mut opponent) = (2000.0, 2000.0);
        for i in 1..=20 {
            player = update(&p, player, opponent, 1.0).unwrap();
            opponent = update(&p, opponent, player, 0.0).unwrap();
            assert_eq!(t.player[i], player);
            assert_eq!(t.opponent[i], opponent);
        }
    }

    #[test]
    fn test_player_converges() {
        let t = simulate(EloParams::default(), 2000.0, 1000);
        let gains = t.player_gains();

        assert!(t.player.iter().all(|r| r.is_finite()));
        assert!(gains.iter().all(|&g| g >= 0.0));
        assert!(gains.windows(2).all(|w| w[1] <= w[0]));
        assert!(gains[gains.len() - 1] < 0.5);
        assert!(t.opponent.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_draws_keep_ratings() {
        let t = simulate_with(EloParams::default(), 1500.0, 10, GameResult::Draw);
        assert!(t.player.iter().all(|&r| r == 1500.0));
        assert!(t.opponent.iter().all(|&r| r == 1500.0));
    }

    #[test]
    fn test_duel_is_lazy() {
        let mut duel = Duel::new(EloParams::default(), 2000.0, GameResult::Win);
        assert_eq!(duel.played(), 0);
        let last = duel.by_ref().nth(99_999).unwrap();
        assert_eq!(duel.played(), 100_000);
        assert_eq!(duel.ratings(), last);
        assert!(last.0.is_finite() && last.0 > 2000.0);
    }

    #[test]
    fn test_weighting_drift() {
        let p = EloParams::default();
        assert_eq!(weighting_drift(&p, 0.0, 1), 0.0);
        assert_eq!(weighting_drift(&p, 250.0, 0), 0.0);

        let two = weighting_drift(&p, 0.0, 2);
        assert!(two < 0.0);
        // second win at a 32 point gap earns less than the first
        let expected = update(&p, 16.0, -16.0, 1.0).unwrap() - 16.0 - 16.0;
        assert_about_eq!(two, expected, 1e-9);

        assert!(weighting_drift(&p, 0.0, 5) < two);
    }

    const FIELD: [(&str, u32); 5] =
        [("winner", 1), ("tie1", 2), ("tie2", 2), ("tie3", 2), ("loser", 5)];

    #[test]
    fn test_field_drift_unit_weight() {
        let drift = field_drift(&EloParams::default(), &FIELD, "winner", 12, 1).unwrap();
        assert_eq!(drift.linear.len(), 13);
        assert_eq!(drift.replayed.len(), 13);
        for d in drift.differences() {
            assert_about_eq!(d, 0.0, 1e-9);
        }
    }

    #[test]
    fn test_field_drift_winner() {
        let drift = field_drift(&EloParams::default(), &FIELD, "winner", 20, 2).unwrap();
        assert_eq!(drift.replayed.len(), 21);
        assert_eq!(drift.differences()[0], 0.0);
        // first occurrence: linear doubles a 25.6 point gain
        assert_about_eq!(drift.linear[1], 51.2, 1e-9);
        assert!(drift.differences()[1..].iter().all(|&d| d < 0.0));

        let (at, largest) = drift.largest().unwrap();
        assert!(at > 0);
        assert!(largest < 0.0);
    }

    #[test]
    fn test_field_drift_matches_duel_for_two() {
        let p = EloParams::default();
        let drift = field_drift(&p, &[("w", 1), ("l", 2)], "w", 1, 2).unwrap();
        assert_about_eq!(drift.differences()[1], weighting_drift(&p, 0.0, 2), 1e-9);
    }

    #[test]
    fn test_field_drift_unknown_player() {
        assert_eq!(
            field_drift(&EloParams::default(), &FIELD, "nobody", 3, 2),
            Err(EloError::UnknownPlayer("nobody".to_owned()))
        );
    }
}
