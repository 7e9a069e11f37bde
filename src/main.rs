//! STPPG - Entry Point
//!
//! Loads a simulation configuration, generates a batch of Hawkes process
//! realizations and reports what was produced.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use stppg::core::error::Result;
use stppg::SimulationConfig;

/// Spatio-temporal Hawkes point process generator
#[derive(Parser, Debug)]
#[command(name = "stppg")]
#[command(about = "Generate spatio-temporal Hawkes process realizations by thinning")]
struct Args {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Random seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Number of sequences to generate
    #[arg(long)]
    batch_size: Option<usize>,

    /// Minimum events per accepted sequence
    #[arg(long)]
    min_points: Option<usize>,

    /// Attempts per sequence before giving up
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Log thinning progress
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    kernel: &'static str,
    batch_size: usize,
    max_len: usize,
    total_events: usize,
    lengths: Vec<usize>,
    elapsed_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stppg=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(min_points) = args.min_points {
        config.min_points = min_points;
    }
    if args.max_attempts.is_some() {
        config.max_attempts = args.max_attempts;
    }
    config.verbose |= args.verbose;
    config.validate()?;

    let process = config.build_process()?;
    tracing::info!(
        "Sampling {} sequences with {} kernel, upper bound {}",
        config.batch_size,
        process.intensity().kernel().name(),
        config.intensity.upper_bound
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let start = Instant::now();
    let batch = process.generate(
        config.time,
        &config.space,
        config.batch_size,
        config.min_points,
        config.verbose,
        &mut rng,
    )?;
    let elapsed = start.elapsed();

    let summary = RunSummary {
        seed: config.seed,
        kernel: process.intensity().kernel().name(),
        batch_size: batch.batch_size(),
        max_len: batch.max_len(),
        total_events: batch.total_events(),
        lengths: batch.lengths().to_vec(),
        elapsed_ms: elapsed.as_millis() as u64,
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Generated {} sequences in {}ms", summary.batch_size, summary.elapsed_ms);
        println!("Kernel: {}, seed: {}", summary.kernel, summary.seed);
        println!("Events: {} total, longest sequence {}", summary.total_events, summary.max_len);
        for (i, len) in summary.lengths.iter().enumerate() {
            let events = batch.events(i);
            let span = match (events.first(), events.last()) {
                (Some(first), Some(last)) => format!("t in [{:.4}, {:.4}]", first.t, last.t),
                _ => "empty".to_string(),
            };
            println!("  sequence {:>3}: {:>5} events, {}", i + 1, len, span);
        }
    }

    Ok(())
}
