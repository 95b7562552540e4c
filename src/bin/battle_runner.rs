//! Headless Battle Runner
//!
//! Runs one AI vs AI quick battle and prints the result as JSON or text.

use std::process::ExitCode;

use clap::Parser;
use fleet_tactics::battle::ai::{AiDuel, AiKind};
use fleet_tactics::battle::{quick_battle_with_config, BattleStats, StatLine};
use fleet_tactics::core::{BattleConfig, Result};
use serde::Serialize;

/// Headless Battle Runner - AI vs AI quick battle
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run an AI vs AI quick battle and print its result")]
struct Args {
    /// Attacker AI: passive, bully, tactical, or a personality name
    #[arg(long, default_value = "tactical")]
    attacker: String,

    /// Defender AI: passive, bully, tactical, or a personality name
    #[arg(long, default_value = "bully")]
    defender: String,

    /// Ships per fleet
    #[arg(long, default_value_t = 3)]
    ships: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Battle configuration file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct BattleResult {
    outcome: String,
    cycles: u32,
    attacker: String,
    defender: String,
    seed: u64,
    stats: Vec<StatLine>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fleet_tactics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };

    let duel = AiDuel::new(AiKind::from_name(&args.attacker)?, AiKind::from_name(&args.defender)?)
        .with_ships(args.ships)
        .with_config(config.clone());

    let mut battle = quick_battle_with_config(args.ships, args.ships, seed, config);
    let stats = BattleStats::watch(&mut battle);
    let result = duel.play(&mut battle, seed)?;

    let outcome = match result.winner {
        Some(0) => "attacker",
        Some(_) => "defender",
        None => "draw",
    };
    let stats = match stats.lock() {
        Ok(stats) => stats.important(10),
        Err(_) => Vec::new(),
    };
    let result = BattleResult {
        outcome: outcome.to_string(),
        cycles: result.cycles,
        attacker: duel.first.name(),
        defender: duel.second.name(),
        seed,
        stats,
    };

    match args.format.as_str() {
        "text" => {
            println!("Battle Result");
            println!("=============");
            println!("Outcome: {}", result.outcome);
            println!("Cycles: {}", result.cycles);
            println!("AIs: {} vs {}", result.attacker, result.defender);
            println!("Seed: {}", result.seed);
            println!();
            for line in &result.stats {
                println!("{:<24} {:>8} {:>8}", line.name, line.attacker, line.defender);
            }
        }
        format => {
            if format != "json" {
                eprintln!("Unknown format '{}', defaulting to json", format);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
