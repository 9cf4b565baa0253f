//! Convert binary particle dumps into a customized columnar layout built on
//! Parquet, engineered for partial reads on filesystems where the allocation
//! unit matters.
//!
//! The output stack, bottom up: a [`ScatterStream`] splits one linear byte
//! stream into fixed-size fragment files plus a `metadata` file; a
//! [`StashableStream`] lets trailing bytes be relocated past padding on an
//! append-only sink; and the [`ParquetWriter`] drives the Parquet encoder to
//! emit fixed-size, disk-page-aligned row groups, each a self-contained
//! Parquet sub-file, with a combined footer describing all of them.

pub mod config;
pub mod error;
pub mod particle;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod stats;
pub mod writer;

pub use config::{ConvertConfig, ScatterConfig, WriterConfig};
pub use error::{ConvertError, Result};
pub use particle::{DumpReader, Particle};
pub use pipeline::{convert_dir, convert_file, ConvertSummary};
pub use sink::{FileStream, ParquetStream, ScatterStream, StashableStream};
pub use writer::{ParquetWriter, WriterSummary};
