use std::collections::HashMap;

use anyhow::Context;
use tracing::info;

use verhulst_elo::elo::algo::INITIAL_ELO;
use verhulst_elo::elo::multiplayer;
use verhulst_elo::elo::observation::STARTING_SCORE;
use verhulst_elo::simulation::{field_drift, simulate, weighting_drift};
use verhulst_elo::{density, rate_observations, update, EloParams, Observation};

const GAMES: usize = 100;

const FIELD: [(&str, u32); 5] =
    [("winner", 1), ("tie1", 2), ("tie2", 2), ("tie3", 2), ("loser", 5)];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let params = EloParams::from_env().context("loading model parameters")?;
    info!(?params, "starting");

    curve(&params);

    let rating = update(&params, INITIAL_ELO, INITIAL_ELO, 1.0)?;
    println!("win between equals at {INITIAL_ELO}: {rating:.2}");

    let trajectory = simulate(params, INITIAL_ELO, GAMES);
    println!("\n{:>5} {:>10} {:>10}", "game", "player", "opponent");
    for (game, (p, o)) in trajectory
        .player
        .iter()
        .zip(&trajectory.opponent)
        .enumerate()
        .step_by(10)
    {
        println!("{game:>5} {p:>10.2} {o:>10.2}");
    }
    info!(
        games = trajectory.games(),
        final_gap = trajectory.final_gap(),
        "player always wins"
    );

    field(&params)?;
    poll(&params)?;

    println!("\n{:>6} {:>10}", "gap", "drift(w=2)");
    for gap in (0..=800).step_by(200) {
        let drift = weighting_drift(&params, gap as f64, 2);
        println!("{gap:>6} {drift:>10.4}");
    }

    let drift = field_drift(&params, &FIELD, "winner", 20, 2)?;
    if let Some((occurrences, largest)) = drift.largest() {
        println!("\nwinner drift over 20 wins at weight 2: {largest:.4} after {occurrences}");
    }

    Ok(())
}

fn curve(params: &EloParams) {
    println!("{:>6} {:>8} {:>10}", "diff", "expect", "density");
    for d in (-800..=800).step_by(100) {
        let d = d as f64;
        println!(
            "{:>6} {:>8.4} {:>10.6}",
            d,
            params.expected_score(d),
            density(d, params.base, params.coefficient)
        );
    }
}

// One ranked game over five participants, three of them tied
fn field(params: &EloParams) -> anyhow::Result<()> {
    let mut ratings: HashMap<String, f64> =
        FIELD.iter().map(|&(name, _)| (name.to_owned(), 0.0)).collect();

    let changes = multiplayer::rating_changes(params, &ratings, &FIELD)?;
    multiplayer::apply(&mut ratings, &multiplayer::weighted_changes(&changes, 1.5))?;
    standings(ratings);
    Ok(())
}

fn poll(params: &EloParams) -> anyhow::Result<()> {
    let options = ["tea", "coffee", "juice", "water", "milk"];
    let observations = [
        Observation::new("coffee", "milk", &options, 1.0),
        Observation::new("tea", "water", &options, 0.5),
        Observation::new("coffee", "juice", &options, 2.0),
        Observation::new("cola", "milk", &options, 1.0),
        Observation::new("tea", "milk", &options, 1.25),
    ];
    let ratings = rate_observations(params, &observations, STARTING_SCORE)?;
    standings(ratings);
    Ok(())
}

fn standings(ratings: HashMap<String, f64>) {
    let mut standings: Vec<_> = ratings.into_iter().collect();
    standings.sort_by(|a, b| b.1.total_cmp(&a.1));
    println!();
    for (name, rating) in standings {
        println!("{name:>8}: {rating:.2}");
    }
}
