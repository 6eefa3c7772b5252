use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_formulate::lp::MicrolpSolver;
use u_formulate::problems::textbook;

/// solves the three textbook integer programs in order
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter, e.g. `info` or `u_formulate::lp=debug`
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level)?)
        .with_writer(std::io::stderr)
        .init();

    for report in textbook::solve_all(&MicrolpSolver::new())? {
        print!("{}", report.render());
    }
    Ok(())
}
