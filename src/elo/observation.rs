//! Best/worst poll replies rated as multiplayer games.
//!
//! A respondent is shown a handful of options and picks the best and the worst.
//! The pick is a ranked game: best first, worst last, everything else tied in
//! between. Each reply carries a weight that scales its rating changes linearly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EloParams;
use crate::elo::multiplayer::{apply, rating_changes, weighted_changes};
use crate::error::{EloError, Result};

pub const STARTING_SCORE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub best: String,
    pub worst: String,
    pub options: Vec<String>,
    pub weight: f64,
}

impl Observation {
    pub fn new(best: &str, worst: &str, options: &[&str], weight: f64) -> Self {
        Observation {
            best: best.to_owned(),
            worst: worst.to_owned(),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            weight,
        }
    }

    /// Ranks of the presented options: best is 1, the unpicked ones tie at 2
    /// and worst comes last at `options.len() + 1`.
    pub fn ranks(&self) -> Result<Vec<(&str, u32)>> {
        if !self.options.contains(&self.best) {
            return Err(EloError::DefectiveObservation(format!(
                "best {:?} was not presented",
                self.best
            )));
        }
        if !self.options.contains(&self.worst) {
            return Err(EloError::DefectiveObservation(format!(
                "worst {:?} was not presented",
                self.worst
            )));
        }
        if self.best == self.worst {
            return Err(EloError::DefectiveObservation(format!(
                "{:?} picked as both best and worst",
                self.best
            )));
        }

        let mut ranks = Vec::with_capacity(self.options.len());
        ranks.push((self.best.as_str(), 1));
        ranks.extend(
            self.options
                .iter()
                .filter(|o| **o != self.best && **o != self.worst)
                .map(|o| (o.as_str(), 2)),
        );
        ranks.push((self.worst.as_str(), self.options.len() as u32 + 1));
        Ok(ranks)
    }
}

/// Observations whose picks were actually presented.
pub fn clean(observations: &[Observation]) -> Vec<&Observation> {
    let kept: Vec<_> = observations
        .iter()
        .filter(|o| match o.ranks() {
            Ok(_) => true,
            Err(e) => {
                warn!(%e, "dropping observation");
                false
            }
        })
        .collect();
    debug!(
        kept = kept.len(),
        dropped = observations.len() - kept.len(),
        "cleaned observations"
    );
    kept
}

/// Rates every option over a sequence of observations, in order.
///
/// Defective observations are dropped first. Every option that appears in a
/// kept observation starts at `starting_score`.
pub fn rate_observations(
    params: &EloParams,
    observations: &[Observation],
    starting_score: f64,
) -> Result<HashMap<String, f64>> {
    let kept = clean(observations);

    let mut ratings = HashMap::new();
    for observation in &kept {
        for option in &observation.options {
            ratings.entry(option.clone()).or_insert(starting_score);
        }
    }

    for observation in kept {
        let changes = rating_changes(params, &ratings, &observation.ranks()?)?;
        apply(&mut ratings, &weighted_changes(&changes, observation.weight))?;
    }

    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntest::assert_about_eq;

    const OPTIONS: [&str; 5] = ["tea", "coffee", "juice", "water", "milk"];

    #[test]
    fn test_ranks() {
        let o = Observation::new("coffee", "milk", &OPTIONS, 1.0);
        let ranks = o.ranks().unwrap();
        assert_eq!(ranks.len(), 5);
        assert_eq!(ranks[0], ("coffee", 1));
        assert_eq!(ranks[4], ("milk", 6));
        for (name, rank) in &ranks[1..4] {
            assert_eq!(*rank, 2);
            assert!(["tea", "juice", "water"].contains(name));
        }
    }

    #[test]
    fn test_defective_ranks() {
        let missing_best = Observation::new("cola", "milk", &OPTIONS, 1.0);
        let missing_worst = Observation::new("tea", "cola", &OPTIONS, 1.0);
        let same = Observation::new("tea", "tea", &OPTIONS, 1.0);
        for o in [missing_best, missing_worst, same] {
            assert!(matches!(o.ranks(), Err(EloError::DefectiveObservation(_))));
        }
    }

    #[test]
    fn test_clean_drops_defective() {
        let observations = vec![
            Observation::new("tea", "milk", &OPTIONS, 1.0),
            Observation::new("cola", "milk", &OPTIONS, 1.0),
            Observation::new("water", "juice", &OPTIONS, 2.0),
        ];
        let kept = clean(&observations);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].best, "tea");
        assert_eq!(kept[1].best, "water");
    }

    #[test]
    fn test_rate_single_observation() {
        let p = EloParams::default();
        let observations = [Observation::new("tea", "milk", &OPTIONS, 1.0)];
        let ratings = rate_observations(&p, &observations, STARTING_SCORE).unwrap();

        // five equal options: expected 0.2 each, actual 0.4 / 0.2 / 0
        assert_about_eq!(ratings["tea"], 4.0 * 32.0 * 0.2, 1e-9);
        assert_about_eq!(ratings["milk"], -4.0 * 32.0 * 0.2, 1e-9);
        for tied in ["coffee", "juice", "water"] {
            assert_about_eq!(ratings[tied], 0.0, 1e-9);
        }
    }

    #[test]
    fn test_weight_scales_changes() {
        let p = EloParams::default();
        let once = rate_observations(&p, &[Observation::new("tea", "milk", &OPTIONS, 1.0)], 0.0)
            .unwrap();
        let heavy = rate_observations(&p, &[Observation::new("tea", "milk", &OPTIONS, 2.5)], 0.0)
            .unwrap();
        for option in OPTIONS {
            assert_about_eq!(heavy[option], 2.5 * once[option], 1e-9);
        }
    }

    #[test]
    fn test_rate_sequence() {
        let p = EloParams::default();
        let observations = vec![
            Observation::new("tea", "milk", &OPTIONS, 1.0),
            Observation::new("cola", "milk", &["cola", "milk", "tea"], 1.0),
            Observation::new("tea", "water", &["tea", "water", "juice"], 0.5),
            Observation::new("ghost", "milk", &OPTIONS, 3.0),
            Observation::new("coffee", "milk", &OPTIONS, 1.5),
        ];
        let ratings = rate_observations(&p, &observations, 1000.0).unwrap();

        assert_eq!(ratings.len(), 6);
        assert!(!ratings.contains_key("ghost"));
        assert!(ratings["tea"] > 1000.0);
        assert!(ratings["milk"] < ratings["water"]);
        assert_about_eq!(ratings.values().sum::<f64>(), 6000.0, 1e-9);
    }

    #[test]
    fn test_repeated_option_rejected() {
        let p = EloParams::default();
        let o = Observation::new("tea", "milk", &["tea", "milk", "juice", "juice"], 1.0);
        assert_eq!(
            rate_observations(&p, &[o], 0.0),
            Err(EloError::DuplicatePlayer("juice".to_owned()))
        );
    }
}
