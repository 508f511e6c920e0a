use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::elo::algo::{expectation, normal_expectation};
use crate::error::{EloError, Result};

/// Probability model used to turn a rating difference into an expected score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectationModel {
    /// Logistic (Verhulst) CDF, as in chess Elo.
    #[default]
    Logistic,
    /// CDF of the difference of two normal performances.
    Normal,
}

impl FromStr for ExpectationModel {
    type Err = EloError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(ExpectationModel::Logistic),
            "normal" => Ok(ExpectationModel::Normal),
            other => Err(EloError::InvalidParams(format!(
                "unknown expectation model {other:?}, must be logistic or normal"
            ))),
        }
    }
}

/// Parameters of the rating model. Fixed for a run and passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloParams {
    /// Base of the logistic function. Controls curve steepness.
    pub base: f64,

    /// Rating points per logistic unit. Also the performance deviation of the normal model.
    pub coefficient: f64,

    /// K-factor: most points a single game can move a rating.
    pub max_points: f64,

    #[serde(default)]
    pub model: ExpectationModel,
}

impl Default for EloParams {
    fn default() -> Self {
        Self {
            base: 10f64.sqrt(),
            coefficient: 200.0,
            max_points: 32.0,
            model: ExpectationModel::Logistic,
        }
    }
}

impl EloParams {
    pub fn new(base: f64, coefficient: f64, max_points: f64) -> Self {
        Self {
            base,
            coefficient,
            max_points,
            model: ExpectationModel::Logistic,
        }
    }

    pub fn with_model(self, model: ExpectationModel) -> Self {
        Self { model, ..self }
    }

    /// Load parameters from environment variables, falling back to chess defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EloParams::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut params = Self::default();

        if let Some(base) = parse_f64("ELO_BASE", lookup("ELO_BASE"))? {
            params.base = base;
        }

        if let Some(coefficient) = parse_f64("ELO_COEFFICIENT", lookup("ELO_COEFFICIENT"))? {
            params.coefficient = coefficient;
        }

        if let Some(max_points) = parse_f64("ELO_MAX_POINTS", lookup("ELO_MAX_POINTS"))? {
            params.max_points = max_points;
        }

        if let Some(model) = lookup("ELO_MODEL") {
            params.model = model.parse()?;
        }

        params.validate()?;
        debug!(?params, "loaded model parameters");
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base > 1.0) {
            return Err(EloError::InvalidParams(format!(
                "base must be greater than 1, got {}",
                self.base
            )));
        }
        if !(self.coefficient > 0.0) {
            return Err(EloError::InvalidParams(format!(
                "coefficient must be positive, got {}",
                self.coefficient
            )));
        }
        if !(self.max_points > 0.0) {
            return Err(EloError::InvalidParams(format!(
                "max_points must be positive, got {}",
                self.max_points
            )));
        }
        Ok(())
    }

    /// Expected score of a player leading by `difference` points under the configured model.
    pub fn expected_score(&self, difference: f64) -> f64 {
        match self.model {
            ExpectationModel::Logistic => expectation(difference, self.base, self.coefficient),
            ExpectationModel::Normal => normal_expectation(difference, self.coefficient),
        }
    }
}

fn parse_f64(key: &str, raw: Option<String>) -> Result<Option<f64>> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| EloError::InvalidParams(format!("{key}={raw:?}: {e}"))),
        None => Ok(None),
    }
}
