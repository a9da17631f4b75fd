//! battle_sim - plays a seeded battle headlessly and prints every TurnResult
//!
//! Output is one JSON object per line on stdout; logs go to stderr.

mod error;
mod rosters;
mod simulation;

pub use error::SimError;

use battle_core::config::{load_constants, load_unit_catalog};
use battle_core::{default_catalog, Battle, BattleConstants, ShuffleTies};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rosters::RostersConfig;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Headless battle runner
#[derive(Parser, Debug)]
#[command(name = "battle_sim")]
#[command(about = "Play a seeded battle between two rosters and print each turn as JSON")]
struct Args {
    /// Unit catalog TOML (defaults to the bundled catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Rosters TOML with [attackers] and [defenders] (defaults to a demo engagement)
    #[arg(long)]
    rosters: Option<PathBuf>,

    /// Battle constants TOML (defaults to built-in values)
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds
    #[arg(long, default_value_t = 100)]
    max_rounds: u32,

    /// Shuffle units of equal initiative each round
    #[arg(long)]
    shuffle_ties: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let catalog = match &args.catalog {
        Some(path) => load_unit_catalog(path)?,
        None => default_catalog()?,
    };
    let rosters = match &args.rosters {
        Some(path) => RostersConfig::load(path)?,
        None => RostersConfig::demo()?,
    };
    let constants = match &args.constants {
        Some(path) => load_constants(path)?,
        None => BattleConstants::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, units = catalog.len(), "Loaded configuration");

    let attackers = rosters.attackers.build(&catalog)?;
    let defenders = rosters.defenders.build(&catalog)?;
    let mut battle = Battle::new(catalog, constants, attackers, defenders)?;
    if args.shuffle_ties {
        battle = battle.with_randomizer(ShuffleTies::new(ChaCha8Rng::seed_from_u64(seed)));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = simulation::run(&mut battle, args.max_rounds, &mut rng, |result| {
        serde_json::to_writer(&mut out, result)?;
        writeln!(out)?;
        Ok(())
    })?;

    match summary.winner {
        Some(winner) => writeln!(out, "{}", serde_json::to_string(&winner)?)?,
        None => writeln!(out, "null")?,
    }
    Ok(())
}
