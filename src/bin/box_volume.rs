use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_formulate::nlp::Method;
use u_formulate::problems::box_volume::{self, BoxConfig, DEFAULT_SURFACE_AREA};

/// largest box whose surface area stays within a budget
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Minimization method
    #[arg(short, long, default_value_t = Method::default_constrained())]
    method: Method,

    /// Surface-area budget
    #[arg(short, long, default_value_t = DEFAULT_SURFACE_AREA)]
    surface_area: f64,

    /// Print the solver summary before the dimensions
    #[arg(short, long)]
    verbose: bool,

    /// Log filter, e.g. `info` or `u_formulate::nlp=debug`
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level)?)
        .with_writer(std::io::stderr)
        .init();

    let config = BoxConfig::default()
        .with_method(cli.method)
        .with_surface_area(cli.surface_area);

    let report = box_volume::solve(&config)?;
    if cli.verbose {
        print!("{}", report.summary());
    }
    print!("{}", report.render());
    Ok(())
}
