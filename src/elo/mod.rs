pub mod algo;
pub mod multiplayer;
pub mod observation;
