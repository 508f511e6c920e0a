//! Logistic (Verhulst) Elo rating model.
//!
//! Expectation and density curves, the single-game rating update, rating
//! updates for ranked multiplayer games and weighted poll replies, and
//! simulation drivers.

pub mod config;
pub mod elo;
pub mod error;
pub mod simulation;

pub use config::{EloParams, ExpectationModel};
pub use elo::algo::{
    calculate, density, expectation, new_rating, normal_expectation, update, GameResult,
};
pub use elo::observation::{rate_observations, Observation};
pub use error::{EloError, Result};
pub use simulation::{field_drift, simulate, Duel, FieldDrift, Trajectory};
