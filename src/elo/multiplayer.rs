//! Elo for a single ranked game with any number of participants.
//!
//! Every participant plays an implicit game against every other one. Expected
//! and actual scores are both normalised so they sum to 1 over the game, and the
//! resulting changes are scaled by `n - 1` so that winning a large field moves a
//! rating more than winning a small one. With two participants this reduces to
//! the ordinary two-player update.

use std::collections::HashMap;

use tracing::debug;

use crate::config::EloParams;
use crate::error::{EloError, Result};

fn pairings(n: usize) -> f64 {
    (n * (n - 1) / 2) as f64
}

/// Expected share of the game's total score for `player`.
pub fn expected_score(
    params: &EloParams,
    player: &str,
    ratings: &HashMap<String, f64>,
) -> Result<f64> {
    if ratings.len() < 2 {
        return Err(EloError::NotEnoughPlayers(ratings.len()));
    }
    let rating = *ratings
        .get(player)
        .ok_or_else(|| EloError::UnknownPlayer(player.to_owned()))?;

    let sum: f64 = ratings
        .iter()
        .filter(|(name, _)| name.as_str() != player)
        .map(|(_, opponent)| params.expected_score(rating - opponent))
        .sum();

    Ok(sum / pairings(ratings.len()))
}

/// Turns finishing ranks (lowest is the winner) into scores summing to 1.
/// The last place scores 0; tied participants share the mean of the places they cover.
pub fn actual_scores(ranks: &[(&str, u32)]) -> Result<HashMap<String, f64>> {
    let n = ranks.len();
    if n < 2 {
        return Err(EloError::NotEnoughPlayers(n));
    }

    let mut ordered = ranks.to_vec();
    ordered.sort_by_key(|&(_, rank)| rank);

    let mut scores = HashMap::with_capacity(n);
    let total = pairings(n);
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && ordered[end].1 == ordered[start].1 {
            end += 1;
        }
        // raw score of position i is n - 1 - i; mean over the tied run [start, end)
        let shared = (2 * n - start - end - 1) as f64 / 2.0;
        for &(name, _) in &ordered[start..end] {
            if scores.insert(name.to_owned(), shared / total).is_some() {
                return Err(EloError::DuplicatePlayer(name.to_owned()));
            }
        }
        start = end;
    }

    Ok(scores)
}

/// Rating change of every ranked participant after the game.
pub fn rating_changes(
    params: &EloParams,
    ratings: &HashMap<String, f64>,
    ranks: &[(&str, u32)],
) -> Result<HashMap<String, f64>> {
    let mut participants = HashMap::with_capacity(ranks.len());
    for &(name, _) in ranks {
        let rating = ratings
            .get(name)
            .ok_or_else(|| EloError::UnknownPlayer(name.to_owned()))?;
        if participants.insert(name.to_owned(), *rating).is_some() {
            return Err(EloError::DuplicatePlayer(name.to_owned()));
        }
    }

    let actual = actual_scores(ranks)?;
    let scale = (ranks.len() - 1) as f64 * params.max_points;

    let mut changes = HashMap::with_capacity(ranks.len());
    for (name, score) in actual {
        let expected = expected_score(params, &name, &participants)?;
        changes.insert(name, scale * (score - expected));
    }

    debug!(players = ranks.len(), "rated multiplayer game");
    Ok(changes)
}

/// Linear weighting of an observation's changes.
pub fn weighted_changes(changes: &HashMap<String, f64>, weight: f64) -> HashMap<String, f64> {
    changes
        .iter()
        .map(|(name, change)| (name.clone(), weight * change))
        .collect()
}

/// Applies `changes` to `ratings` in place. Nothing is changed if any name is unrated.
pub fn apply(ratings: &mut HashMap<String, f64>, changes: &HashMap<String, f64>) -> Result<()> {
    if let Some(name) = changes.keys().find(|name| !ratings.contains_key(*name)) {
        return Err(EloError::UnknownPlayer(name.clone()));
    }
    for (name, change) in changes {
        if let Some(rating) = ratings.get_mut(name) {
            *rating += change;
        }
    }
    Ok(())
}
