//! Particle dump records.
//!
//! Input dumps are flat sequences of fixed-size little-endian records. Only a
//! subset of the fields ends up in the columnar output; the rest are carried
//! on [`Particle`] for analysis tools.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use bytes::Buf;

use crate::error::{ConvertError, Result};

/// On-disk size of one dump record.
pub const RECORD_SIZE: u64 = 48;

/// One particle, as laid out in a dump record: a 64-bit id, 8 bytes of
/// alignment padding, then eight 32-bit floats.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub id: i64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub i: f32,
    pub ux: f32,
    pub uy: f32,
    pub uz: f32,
    pub ke: f32,
}

impl Particle {
    /// Decode one record. `buf` must hold exactly [`RECORD_SIZE`] bytes.
    fn decode(mut buf: &[u8]) -> Self {
        let id = buf.get_i64_le();
        buf.advance(8); // struct alignment padding in the dump format
        let x = buf.get_f32_le();
        let y = buf.get_f32_le();
        let z = buf.get_f32_le();
        let i = buf.get_f32_le();
        let ux = buf.get_f32_le();
        let uy = buf.get_f32_le();
        let uz = buf.get_f32_le();
        let ke = buf.get_f32_le();
        Particle {
            id,
            x,
            y,
            z,
            i,
            ux,
            uy,
            uz,
            ke,
        }
    }
}

/// Sequential reader over one particle dump file.
///
/// The file length is checked up front: a trailing partial record means the
/// dump is malformed and the whole file is rejected.
#[derive(Debug)]
pub struct DumpReader {
    reader: BufReader<File>,
    path: PathBuf,
    remaining: u64,
}

impl DumpReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % RECORD_SIZE != 0 {
            return Err(ConvertError::bad_input(
                path,
                format!("{len} bytes is not a whole number of {RECORD_SIZE}-byte records"),
            ));
        }
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            remaining: len / RECORD_SIZE,
        })
    }

    /// Total records in the dump.
    pub fn record_count(&self) -> u64 {
        self.remaining
    }

    /// Read the next record, or `None` at end of file.
    pub fn next_particle(&mut self) -> Result<Option<Particle>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let mut record = [0u8; RECORD_SIZE as usize];
        self.reader.read_exact(&mut record).map_err(|e| {
            ConvertError::bad_input(&self.path, format!("short read mid-record: {e}"))
        })?;
        self.remaining -= 1;
        Ok(Some(Particle::decode(&record)))
    }
}
