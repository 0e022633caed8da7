use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use deorbit_report::config::{self, ReportConfig};

/// Render a deorbit analysis table into a 2x2 chart panel (PNG)
#[derive(Parser, Debug)]
#[command(name = "deorbit-report")]
#[command(about = "Render delta-V, decay time and ESA compliance charts from a deorbit table", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (report.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input table (.csv, .tsv, .json, .parquet); overrides [input] path
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PNG; overrides [output] path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output resolution; overrides [output] dpi
    #[arg(long, value_name = "DPI")]
    dpi: Option<f64>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors; the completion line is still printed
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn apply(&self, config: &mut ReportConfig) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(dpi) = self.dpi {
            config.output.dpi = dpi;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            config::load_config(path)?
        }
        None => ReportConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let written = deorbit_report::run(&config).with_context(|| {
        format!(
            "could not render report from {}",
            config.input.path.display()
        )
    })?;

    println!("Deorbit analysis complete: {}", written.display());
    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` applies when no flag is given.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let mut builder = Builder::new();
    builder.filter_level(match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    });
    if !quiet && verbose == 0 {
        builder.parse_default_env();
    }
    builder
        .format(|buf, record| writeln!(buf, "[{:<5}] {}", record.level(), record.args()))
        .init();
}
