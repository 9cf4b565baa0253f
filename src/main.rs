use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use particles2parquet::{convert_dir, ConvertConfig};

/// Convert a directory of binary particle dumps into scattered,
/// disk-page-aligned Parquet output.
#[derive(Parser)]
#[command(name = "particles2parquet")]
#[command(version)]
#[command(about = "Convert binary particle dumps into scattered, page-aligned Parquet output")]
struct Cli {
    /// Size of each output fragment, in MiB
    #[arg(short = 'f', long = "fragment-mb", value_name = "MB", default_value_t = 4)]
    fragment_mb: u64,

    /// Worker threads for the batch driver (0 = one per core)
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = 0)]
    jobs: usize,

    /// Skip scattering: write one monolithic file per dump
    #[arg(short = 's', long = "skip-scattering", value_name = "0|1", default_value_t = 0)]
    skip_scattering: u8,

    /// Skip alignment padding and scattering entirely
    #[arg(short = 'S', long = "skip-padding", value_name = "0|1", default_value_t = 0)]
    skip_padding: u8,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Directory of input particle dumps
    input_dir: PathBuf,

    /// Directory that receives one output per dump
    output_dir: PathBuf,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // RUST_LOG wins over the CLI level; fall back to info on a bad filter.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer()),
    );
}

fn build_config(cli: &Cli) -> ConvertConfig {
    let mut config = ConvertConfig {
        workers: cli.jobs,
        ..Default::default()
    };
    config.scatter.fragment_size = cli.fragment_mb << 20;
    if cli.skip_scattering != 0 {
        config.writer.skip_scattering = true;
    }
    if cli.skip_padding != 0 {
        config = config.with_padding_and_scattering_skipped();
    }
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if !cli.input_dir.is_dir() {
        anyhow::bail!("input path {} is not a directory", cli.input_dir.display());
    }

    let config = build_config(&cli);
    let summary = convert_dir(&config, &cli.input_dir, &cli.output_dir)
        .with_context(|| format!("failed to convert {}", cli.input_dir.display()))?;

    info!(
        files = summary.files,
        failed = summary.failed,
        rows = summary.rows,
        bytes = summary.bytes_written,
        "batch complete"
    );
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} conversions failed; see the log for details",
            summary.failed,
            summary.files
        );
    }
    Ok(())
}
