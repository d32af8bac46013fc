//! Headless duel runner.
//!
//! Runs duels without graphics and prints JSON results on stdout.
//! Designed for balance sweeps and CI determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Run a single duel
//! cargo run -p duel_headless -- run --red warrior --blue mage --seed 42
//!
//! # Run a batch for balance testing
//! cargo run -p duel_headless -- batch --red assassin --blue paladin --count 500 --output results/
//!
//! # List presets, or dump one as a RON starting point
//! cargo run -p duel_headless -- presets --dump spearman
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_headless::{
    batch::{run_batch, BatchConfig},
    error::{HeadlessError, Result},
    presets,
    runner::{
        load_arena, load_duel_config, load_fighter, load_skills, run_duel, EventLine, RunConfig,
    },
};

#[derive(Parser)]
#[command(name = "duel_headless")]
#[command(about = "Headless 1v1 duel runner for AI balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Inputs shared by `run` and `batch`.
#[derive(clap::Args)]
struct MatchArgs {
    /// Red fighter: preset name or RON file
    #[arg(long, default_value = "warrior")]
    red: String,

    /// Blue fighter: preset name or RON file
    #[arg(long, default_value = "mage")]
    blue: String,

    /// Arena RON file (default: open 24x16 rectangle)
    #[arg(long)]
    arena: Option<PathBuf>,

    /// Duel tuning RON file
    #[arg(long)]
    duel_config: Option<PathBuf>,

    /// Skill catalog RON file (default: built-in skills)
    #[arg(long)]
    skills: Option<PathBuf>,

    /// Step budget per duel (0 = twice the maximum duration)
    #[arg(long, default_value = "0")]
    max_steps: u64,
}

impl MatchArgs {
    fn load(&self) -> Result<RunConfig> {
        let mut config = RunConfig::new(load_fighter(&self.red)?, load_fighter(&self.blue)?)
            .with_max_steps(self.max_steps);
        if let Some(path) = &self.arena {
            config = config.with_arena(load_arena(path)?);
        }
        if let Some(path) = &self.duel_config {
            config = config.with_duel_config(load_duel_config(path)?);
        }
        if let Some(path) = &self.skills {
            config = config.with_skills(load_skills(path)?);
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single duel and print its metrics
    Run {
        #[command(flatten)]
        fighters: MatchArgs,

        /// Duel seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print every combat event as a JSON line before the metrics
        #[arg(long)]
        events: bool,
    },

    /// Run a batch of seeded duels for balance testing
    Batch {
        #[command(flatten)]
        fighters: MatchArgs,

        /// Number of duels to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel duels (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Directory to save full results to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List built-in fighter presets
    Presets {
        /// Print the named preset as RON instead of listing
        #[arg(long)]
        dump: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for results)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            fighters,
            seed,
            events,
        }) => cmd_run(&fighters, seed, events),
        Some(Commands::Batch {
            fighters,
            count,
            seed,
            parallel,
            output,
        }) => cmd_batch(&fighters, count, seed, parallel, output),
        Some(Commands::Presets { dump }) => cmd_presets(dump.as_deref()),
        None => cmd_presets(None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run a single duel
fn cmd_run(fighters: &MatchArgs, seed: u64, events: bool) -> Result<()> {
    let config = fighters.load()?.with_seed(seed);

    let mut event_error = None;
    let metrics = run_duel(&config, |tick, event| {
        if events && event_error.is_none() {
            match serde_json::to_string(&EventLine { tick, event }) {
                Ok(line) => println!("{line}"),
                Err(e) => event_error = Some(e),
            }
        }
    });
    if let Some(e) = event_error {
        return Err(e.into());
    }

    println!("{}", serde_json::to_string(&metrics)?);
    Ok(())
}

/// Run a batch of duels
fn cmd_batch(
    fighters: &MatchArgs,
    count: u32,
    seed: u64,
    parallel: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let run = fighters.load()?;
    let config = BatchConfig {
        red: run.red,
        blue: run.blue,
        arena: run.arena,
        duel: run.duel,
        skills: run.skills,
        duel_count: count,
        parallel,
        seed_start: seed,
        max_steps: run.max_steps,
    };

    let results = run_batch(config)?;

    if let Some(dir) = output {
        let path = dir.join("batch_results.json");
        results.save(&path)?;
        tracing::info!(path = %path.display(), "Results saved");
    }

    println!("{}", serde_json::to_string_pretty(&results.summary)?);
    Ok(())
}

/// List presets or dump one as RON
fn cmd_presets(dump: Option<&str>) -> Result<()> {
    if let Some(name) = dump {
        let config =
            presets::preset(name).ok_or_else(|| HeadlessError::UnknownFighter(name.to_string()))?;
        let ron = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())?;
        println!("{ron}");
        return Ok(());
    }

    for (name, config) in presets::all() {
        let weapon = config
            .weapon
            .as_ref()
            .map_or("unarmed", |w| w.name.as_str());
        println!("{name:<10} {:<10} {:<12} {weapon}", config.name, config.class_name);
    }
    Ok(())
}
