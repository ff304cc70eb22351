//! Maze Hunt - Entry Point
//!
//! Plays one episode on the classic maze with the named agent and prints the
//! summary as text or JSON.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use maze_hunt::agents;
use maze_hunt::core::{load_config, GameConfig, Result};
use maze_hunt::game::{Episode, EpisodeSummary};
use maze_hunt::maze::Maze;

/// Maze Hunt - catch hidden targets using noisy range readings
#[derive(Parser, Debug)]
#[command(name = "maze-hunt")]
#[command(about = "Play a maze pursuit episode with a bundled hunter agent")]
struct Args {
    /// Agent to play (greedy, tracker)
    agent: String,

    /// Number of targets
    targets: Option<usize>,

    /// Seconds the agent has to choose each move
    time_limit: Option<f64>,

    /// 0 = observations only, 1 = agent beliefs, 2 = ground truth
    information_level: Option<u8>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Game configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between turns in seconds; also prints the board each turn
    #[arg(long)]
    delay: Option<f64>,

    /// Turn cap
    #[arg(long)]
    max_turns: Option<u32>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GameConfig::default(),
        };

        if let Some(targets) = self.targets {
            config.targets = targets;
        }
        if let Some(time_limit) = self.time_limit {
            config.time_limit_secs = time_limit;
        }
        if let Some(level) = self.information_level {
            config.information_level = level;
        }
        if let Some(delay) = self.delay {
            config.turn_delay_secs = delay;
        }
        if let Some(max_turns) = self.max_turns {
            config.max_turns = max_turns;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        // Pin the seed so it can be reported and replayed
        config.seed.get_or_insert_with(rand::random);

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "maze_hunt=debug"
    } else {
        "maze_hunt=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args).and_then(|summary| print_summary(&summary, &args.format)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let maze_hunt::core::HuntError::UnknownAgent(_) = e {
                eprintln!("Available agents: {}", agents::AGENT_NAMES.join(", "));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<EpisodeSummary> {
    let config = args.game_config()?;
    let maze = Arc::new(Maze::classic());
    let agent = agents::build(&args.agent, &maze, &config)?;

    tracing::info!(
        agent = agent.name(),
        targets = config.targets,
        seed = ?config.seed,
        "starting episode"
    );

    let delay = Duration::from_secs_f64(config.turn_delay_secs);
    let mut episode = Episode::new(maze, agent, config)?;
    let start = Instant::now();

    while !episode.is_over() {
        let report = episode.play_turn()?;
        if !delay.is_zero() {
            eprintln!("Turn {}  Score {}", report.turn, report.score);
            eprintln!("{}", episode);
            thread::sleep(delay);
        }
    }

    Ok(episode.summary(start.elapsed()))
}

fn print_summary(summary: &EpisodeSummary, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", summary.to_json()?),
        "text" => {
            println!("Episode Result");
            println!("==============");
            println!("Agent: {}", summary.agent);
            println!("Turns: {}", summary.turns);
            println!("Captured: {}/{}", summary.captured, summary.targets);
            for (i, turn) in summary.capture_turns.iter().enumerate() {
                match turn {
                    Some(turn) => println!("  target {}: caught on turn {}", i, turn),
                    None => println!("  target {}: escaped", i),
                }
            }
            println!("Score: {}", summary.score);
            println!("Elapsed: {:.2}s", summary.elapsed_secs);
            println!("Seed: {}", summary.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", format);
            println!("{}", summary.to_json()?);
        }
    }
    Ok(())
}
