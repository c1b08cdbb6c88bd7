use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::time::Instant;
use swx_core::{
    score_pair, sequence::DEFAULT_SEED, tiled::DEFAULT_TILE_SIZE, Engine, RunReport, ScoreError,
    ScoringScheme, SequenceGenerator,
};

#[derive(Parser)]
#[command(name = "swx")]
#[command(about = "SWx - Parallel Smith-Waterman scoring engine")]
#[command(version)]
#[command(long_about = "
SWx computes the maximum local alignment score of two seeded random
sequences. The score and checksum are exact and invariant over the
thread count; only wall-clock time changes with T.

Examples:
  swx 10000 8
  swx 10000 8 --engine tiled --tile-size 256
  swx 4096 4 --seed 7 --match 3 --mismatch -2 --gap -4
  swx 10000 8 --json
")]
struct Cli {
    /// Sequence length N (positive)
    #[arg(allow_hyphen_values = true)]
    length: i64,

    /// Worker thread count T (positive; defaults to all logical CPUs)
    #[arg(allow_hyphen_values = true)]
    threads: Option<i64>,

    /// Seed for the sequence generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Scoring engine
    #[arg(long, value_enum, default_value = "wavefront")]
    engine: EngineArg,

    /// Match bonus
    #[arg(long = "match", default_value_t = 2, allow_hyphen_values = true)]
    match_score: i32,

    /// Mismatch penalty
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    mismatch: i32,

    /// Gap penalty
    #[arg(long, default_value_t = -2, allow_hyphen_values = true)]
    gap: i32,

    /// Tile edge length for the tiled engine
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: usize,

    /// Also emit the run report as a JSON line
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Reference,
    Wavefront,
    Tiled,
}

impl EngineArg {
    fn to_engine(self, tile_size: usize) -> Engine {
        match self {
            EngineArg::Reference => Engine::Reference,
            EngineArg::Wavefront => Engine::Wavefront,
            EngineArg::Tiled => Engine::Tiled { tile_size },
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

/// Reject zero and negative harness arguments before any computation
fn positive(value: i64, what: &str) -> Result<usize> {
    if value <= 0 {
        return Err(ScoreError::invalid_argument(format!("{} must be positive, got {}", what, value)).into());
    }
    Ok(value as usize)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    let length = positive(cli.length, "sequence length")?;
    let threads = match cli.threads {
        Some(t) => positive(t, "thread count")?,
        None => num_cpus::get(),
    };
    let engine = cli.engine.to_engine(cli.tile_size);
    let scoring = ScoringScheme::new(cli.match_score, cli.mismatch, cli.gap);

    log::info!(
        "scoring two length-{} sequences with {} threads ({} engine, seed {})",
        length,
        threads,
        engine,
        cli.seed
    );

    // Generation is excluded from the timed region.
    let mut generator = SequenceGenerator::with_seed(cli.seed);
    let (seq1, seq2) = generator.generate_pair(length)?;

    let start = Instant::now();
    let report = score_pair(&seq1, &seq2, &scoring, engine, threads)?;
    let elapsed = start.elapsed().as_secs_f64();

    let run = RunReport::new(seq1.len(), seq2.len(), threads, engine, report, elapsed);
    print!("{}", run.harness_lines());
    if cli.json {
        println!("{}", serde_json::to_string(&run)?);
    }

    Ok(())
}
