//! AI Tournament
//!
//! Round robin of quick battles between AIs, run in parallel, then prints
//! the ranking.

use std::process::ExitCode;

use clap::Parser;
use fleet_tactics::battle::ai::{AiKind, AiTournament};
use fleet_tactics::core::Result;

#[derive(Parser, Debug)]
#[command(name = "ai_tournament")]
#[command(about = "Rank AIs over a round robin of quick battles")]
struct Args {
    /// Battles per pair of contenders
    #[arg(long, default_value_t = 10)]
    rounds: u32,

    /// Seed of the first battle (next ones use the following seeds)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Contenders (passive, bully, tactical or personality names);
    /// defaults to passive, bully and tactical
    #[arg(long, value_delimiter = ',')]
    personalities: Vec<String>,

    /// Ships per fleet
    #[arg(long, default_value_t = 3)]
    ships: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fleet_tactics=warn")),
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
    let mut tournament = if args.personalities.is_empty() {
        AiTournament::standard()
    } else {
        let contenders = args
            .personalities
            .iter()
            .map(|name| AiKind::from_name(name))
            .collect::<Result<Vec<_>>>()?;
        AiTournament::new(contenders)
    };
    tournament.ships = args.ships;

    let result = tournament.run(args.rounds, args.seed)?;

    println!("Final result ({} battles)", result.duels.len());
    println!("========================================");
    println!("{:<24} {:>5} {:>5} {:>5} {:>7}", "AI", "won", "lost", "draw", "score");
    for standing in &result.ranking {
        println!(
            "{:<24} {:>5} {:>5} {:>5} {:>7.3}",
            standing.name, standing.wins, standing.losses, standing.draws, standing.score
        );
    }
    Ok(())
}
