//! Shared harness for conversion tests: dump synthesis and output readback.

use std::fs;
use std::io::Write;
use std::path::Path;

use particles2parquet::particle::{Particle, RECORD_SIZE};
use particles2parquet::schema::{particle_schema_descr, RowGroupLayout};
use particles2parquet::ConvertConfig;

/// Deterministic particle: every field is an exact binary fraction of the
/// id, so float equality is safe in assertions.
pub fn particle(id: i64) -> Particle {
    let f = id as f32;
    Particle {
        id,
        x: f * 0.5,
        y: f * 0.25,
        z: -f,
        i: 0.0,
        ux: 0.0,
        uy: 0.0,
        uz: 0.0,
        ke: f * 2.0,
    }
}

pub fn encode_record(particle: &Particle) -> [u8; RECORD_SIZE as usize] {
    let mut record = [0u8; RECORD_SIZE as usize];
    record[0..8].copy_from_slice(&particle.id.to_le_bytes());
    let floats = [
        particle.x,
        particle.y,
        particle.z,
        particle.i,
        particle.ux,
        particle.uy,
        particle.uz,
        particle.ke,
    ];
    for (slot, value) in floats.iter().enumerate() {
        let at = 16 + slot * 4;
        record[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }
    record
}

/// Write a dump of `count` particles with ids `0..count`.
pub fn write_dump(path: &Path, count: u64) {
    let mut file = fs::File::create(path).unwrap();
    for id in 0..count {
        file.write_all(&encode_record(&particle(id as i64))).unwrap();
    }
}

/// Small sizes so row-group boundary scenarios stay fast: 64 KiB row
/// groups, 256 KiB fragments (four row groups per fragment).
pub fn small_config() -> ConvertConfig {
    let mut config = ConvertConfig::default();
    config.writer.rowgroup_size = 64 << 10;
    config.scatter.fragment_size = 256 << 10;
    config
}

/// Rows per row group under `config`.
pub fn max_rows(config: &ConvertConfig) -> u64 {
    RowGroupLayout::new(&config.writer, &particle_schema_descr().unwrap())
        .unwrap()
        .max_rows
}

/// Names of the fragment files in an output directory, in stream order.
pub fn fragment_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("rgb-"))
        .collect();
    names.sort();
    names
}

/// Reassemble the logical stream: every fragment in offset order, then the
/// metadata file.
pub fn concat_view(dir: &Path) -> Vec<u8> {
    let mut view = Vec::new();
    for name in fragment_names(dir) {
        view.extend_from_slice(&fs::read(dir.join(name)).unwrap());
    }
    view.extend_from_slice(&fs::read(dir.join("metadata")).unwrap());
    view
}
