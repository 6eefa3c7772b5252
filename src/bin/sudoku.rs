use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_formulate::cp::{BacktrackingSolver, SolverConfig};
use u_formulate::problems::sudoku::{self, SudokuGrid};

/// solves a 9x9 sudoku as a constraint model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 81 cells, row by row; `0` or `.` for blanks
    #[arg(short, long)]
    puzzle: Option<SudokuGrid>,

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

    let puzzle = cli.puzzle.unwrap_or_default();
    let outcome = sudoku::solve(&puzzle, &BacktrackingSolver::new(), &config)?;
    print!("{}", sudoku::render(&puzzle, &outcome));
    Ok(())
}
