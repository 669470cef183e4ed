use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mineopoly_core::{
    PlayerColor,
    agent::{AgentConfig, MinerAgent, ScorePolicy},
    board::{BoardGenerator, GeneratorConfig},
    environment::{Environment, MatchConfig},
};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(version, about = "Generate Mineopoly boards and play greedy miners against each other", long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board generated from a seed
    Board {
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Side length of the board (even, at least 10)
        #[arg(short = 'n', long, default_value_t = 20)]
        size: usize,
        /// Chance that a deposit is replaced by a random kind
        #[arg(long, default_value_t = 0.2)]
        resource_chance: f32,
    },
    /// Play rounds between two greedy miners
    Play {
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        #[arg(short = 'n', long, default_value_t = 20)]
        size: usize,
        #[arg(long, default_value_t = 5)]
        inventory: usize,
        #[arg(long, default_value_t = 5000)]
        winning_score: u32,
        #[arg(long, default_value_t = 1000)]
        max_turns: u32,
        /// Number of rounds; round `i` uses seed `seed + i`
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,
        /// Keep each miner's score between rounds
        #[arg(long)]
        persist_score: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Board {
            seed,
            size,
            resource_chance,
        } => {
            let config = GeneratorConfig {
                random_resource_chance: resource_chance,
                ..GeneratorConfig::default()
            };
            let board = BoardGenerator::with_config(seed, config)?
                .generate_board(size)
                .with_context(|| format!("Failed to generate board for seed {seed}"))?;
            print!("{board}");
        }
        Command::Play {
            seed,
            size,
            inventory,
            winning_score,
            max_turns,
            rounds,
            persist_score,
        } => {
            let score_policy = if persist_score {
                ScorePolicy::PersistAcrossRounds
            } else {
                ScorePolicy::ResetEachRound
            };
            let agent_config = AgentConfig { score_policy };

            let mut wins = [0u32; 2];
            for round in 0..rounds {
                let config = MatchConfig {
                    board_size: size,
                    max_inventory_size: inventory,
                    winning_score,
                    max_turns,
                    seed: seed.wrapping_add(u64::from(round)),
                };
                let red = MinerAgent::new("red miner", agent_config);
                let blue = MinerAgent::new("blue miner", agent_config);
                let mut environment = Environment::new(config, Box::new(red), Box::new(blue))
                    .with_context(|| format!("Failed to set up round {round}"))?;
                let result = environment.run()?;

                match result.winner {
                    Some(PlayerColor::Red) => wins[0] += 1,
                    Some(PlayerColor::Blue) => wins[1] += 1,
                    None => {}
                }
                info!(round, ?result, "round result");
                println!(
                    "round {round}: red {} - blue {} after {} turns ({})",
                    result.red_score,
                    result.blue_score,
                    result.turns,
                    match result.winner {
                        Some(color) => format!("{color:?} wins"),
                        None => "no winner".to_string(),
                    }
                );
            }
            println!("wins: red {} - blue {}", wins[0], wins[1]);
        }
    }

    Ok(())
}

/// Installs a stderr fmt subscriber at the requested verbosity.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
