//! manhattan-bins: summarise EPACTS association results for Manhattan plots
//!
//! Usage: manhattan-bins [OPTIONS] <INPUT> <OUTPUT>

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::process;

use manhattan_bins::commands::{ManhattanCommand, ManhattanStats};
use manhattan_bins::config::{
    BinningConfig, DEFAULT_BIN_LENGTH, DEFAULT_BIN_THRESHOLD, DEFAULT_MAX_UNBINNED,
    DEFAULT_NEGLOG10_BIN_DIGITS, DEFAULT_NEGLOG10_BIN_SIZE,
};
use manhattan_bins::VariantError;

#[derive(Parser)]
#[command(name = "manhattan-bins")]
#[command(version)]
#[command(about = "Bin genome-wide association results into a compact Manhattan plot summary", long_about = None)]
struct Cli {
    /// EPACTS results file (plain, gzip or bgzip)
    input: PathBuf,

    /// Output JSON file
    output: PathBuf,

    /// Width of each genomic bin in base pairs
    #[arg(long, default_value_t = DEFAULT_BIN_LENGTH)]
    bin_length: u64,

    /// Maximum number of variants written individually
    #[arg(long, default_value_t = DEFAULT_MAX_UNBINNED)]
    max_unbinned: usize,

    /// P-values below this are written individually (lowered if too many)
    #[arg(long, default_value_t = DEFAULT_BIN_THRESHOLD)]
    bin_threshold: f64,

    /// Grid step for -log10(p) values inside bins
    #[arg(long = "neglog10-bin-size", default_value_t = DEFAULT_NEGLOG10_BIN_SIZE)]
    neglog10_bin_size: f64,

    /// Decimal digits kept on grid values
    #[arg(long = "neglog10-digits", default_value_t = DEFAULT_NEGLOG10_BIN_DIGITS)]
    neglog10_digits: i32,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print run statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    Builder::new().filter_level(level).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<ManhattanStats, VariantError> {
    let config = BinningConfig::new()
        .with_bin_length(cli.bin_length)
        .with_max_unbinned(cli.max_unbinned)
        .with_bin_threshold(cli.bin_threshold)
        .with_neglog10_bin_size(cli.neglog10_bin_size)
        .with_neglog10_bin_digits(cli.neglog10_digits);

    let cmd = ManhattanCommand::new()
        .with_config(config)
        .with_pretty(cli.pretty);
    let stats = cmd.run(&cli.input, &cli.output)?;

    info!("{} -> {}", cli.input.display(), cli.output.display());
    if cli.stats {
        eprintln!("Manhattan stats: {}", stats);
    }

    Ok(stats)
}
