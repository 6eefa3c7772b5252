use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_formulate::cp::{BacktrackingSolver, SolverConfig};
use u_formulate::problems::suko::{self, SukoPuzzle};

/// solves the Suko and Sujiko reference puzzles as constraint models
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only this puzzle number (875, 1392 or 4695)
    #[arg(short, long)]
    number: Option<u32>,

    /// Drop the colour sums
    #[arg(long)]
    no_colours: bool,

    /// Shuffle value order with this seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Search time limit, 0 for none
    #[arg(short, long, default_value_t = 60_000)]
    time_limit_ms: i64,

    /// Log filter, e.g. `info` or `u_formulate::cp=debug`
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level)?)
        .with_writer(std::io::stderr)
        .init();

    let mut config = SolverConfig::default().with_time_limit_ms(cli.time_limit_ms);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let mut puzzles = SukoPuzzle::reference_set();
    if let Some(number) = cli.number {
        puzzles.retain(|p| p.number == number);
        if puzzles.is_empty() {
            bail!("no reference puzzle numbered {number}");
        }
    }

    let solver = BacktrackingSolver::new();
    for mut puzzle in puzzles {
        if cli.no_colours {
            puzzle = puzzle.without_colours();
        }
        let outcome = suko::solve(&puzzle, &solver, &config)?;
        print!("{}", suko::render(&puzzle, &outcome));
    }
    Ok(())
}
