use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use particles2parquet::stats::{EnergyStats, TAIL_FRACTIONS};

/// Report kinetic-energy tail quantiles across a directory of particle dumps.
#[derive(Parser)]
#[command(name = "particle-stats")]
#[command(version)]
struct Cli {
    /// Directory of input particle dumps
    input_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if !cli.input_dir.is_dir() {
        anyhow::bail!("input path {} is not a directory", cli.input_dir.display());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&cli.input_dir)
        .with_context(|| format!("failed to open {}", cli.input_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut stats = EnergyStats::new();
    for file in &files {
        let read = stats
            .add_file(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        println!("processed {}: {} particles", file.display(), read);
    }

    let report = stats.finish();
    println!("total particles: {}", report.total());
    for fraction in TAIL_FRACTIONS {
        if let Some(ke) = report.tail_value(fraction) {
            println!("{fraction:.6}: {ke:.6}");
        }
    }
    Ok(())
}
