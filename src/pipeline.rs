//! Batch conversion driver.
//!
//! Walks an input directory of particle dumps and fans per-file conversions
//! out over a bounded worker pool. Each task owns its reader, writer, and
//! output directory exclusively; a failing task is logged and counted
//! without stopping the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{error, info};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::particle::DumpReader;
use crate::sink::{FileStream, ParquetStream, ScatterStream};
use crate::writer::{ParquetWriter, WriterSummary};

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertSummary {
    pub files: usize,
    pub failed: usize,
    pub rows: u64,
    pub bytes_written: u64,
}

/// Convert one dump file into `output`: a fragment directory when
/// scattering, a single Parquet file otherwise.
pub fn convert_file(config: &ConvertConfig, input: &Path, output: &Path) -> Result<WriterSummary> {
    let mut reader = DumpReader::open(input)?;
    if config.writer.skip_scattering {
        let sink = FileStream::create(output)?;
        drive(&mut reader, ParquetWriter::new(config.writer.clone(), sink)?)
    } else {
        let sink = ScatterStream::open(config.scatter.clone(), output)?;
        drive(&mut reader, ParquetWriter::new(config.writer.clone(), sink)?)
    }
}

fn drive<S: ParquetStream>(
    reader: &mut DumpReader,
    mut writer: ParquetWriter<S>,
) -> Result<WriterSummary> {
    while let Some(particle) = reader.next_particle()? {
        writer.add(&particle)?;
    }
    writer.finish()
}

/// Convert every regular file under `input_dir`, in parallel.
pub fn convert_dir(
    config: &ConvertConfig,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<ConvertSummary> {
    config.validate()?;
    let inputs = list_dump_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| ConvertError::WorkerPool(e.to_string()))?;

    let results: Vec<Result<WriterSummary>> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let output = output_dir.join(output_name(input));
                let started = Instant::now();
                let result = convert_file(config, input, &output);
                match &result {
                    Ok(summary) => info!(
                        input = %input.display(),
                        output = %output.display(),
                        rows = summary.rows,
                        row_groups = summary.row_groups,
                        bytes = summary.bytes_written,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "converted dump"
                    ),
                    Err(e) => error!(input = %input.display(), error = %e, "conversion failed"),
                }
                result
            })
            .collect()
    });

    let mut summary = ConvertSummary {
        files: inputs.len(),
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(writer) => {
                summary.rows += writer.rows;
                summary.bytes_written += writer.bytes_written;
            }
            Err(_) => summary.failed += 1,
        }
    }
    Ok(summary)
}

/// Regular files under `dir`, sorted for deterministic scheduling.
fn list_dump_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn output_name(input: &Path) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".parquet");
    PathBuf::from(name)
}
