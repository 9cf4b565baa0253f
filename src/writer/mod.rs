//! The aligned row-group writer.
//!
//! Every row group is emitted as a standalone Parquet sub-file occupying
//! exactly `rowgroup_size` bytes: a header padded to one disk page, one
//! column chunk per field padded to its page-aligned budget, zero fill, and
//! the sub-file footer relocated to the very end so that its offset falls in
//! the final disk page. Particles are buffered per row group and encoded at
//! flush through a position-rebased view of the sink, so the column-chunk
//! offsets the encoder records are sub-file-relative. A second copy of every
//! row group's metadata, rebased to outer-stream coordinates, is written as
//! the combined footer at `finish`.

mod metadata;

use std::io::Write;

use parquet::column::writer::{get_column_writer, ColumnCloseResult, ColumnWriter};
use parquet::file::properties::WriterPropertiesPtr;
use parquet::file::writer::{SerializedPageWriter, TrackedWrite};
use parquet::schema::types::ColumnDescPtr;
use tracing::trace;

use crate::config::WriterConfig;
use crate::error::Result;
use crate::particle::Particle;
use crate::schema::{particle_schema_descr, writer_properties, RowGroupLayout, SchemaDescPtr};
use crate::sink::{write_zeros, ParquetStream, StashableStream};

use metadata::{FlushedRowGroup, PARQUET_MAGIC};

/// Totals reported after a writer finishes.
#[derive(Debug, Clone, Copy)]
pub struct WriterSummary {
    pub rows: u64,
    pub row_groups: usize,
    pub bytes_written: u64,
}

/// Particle values buffered for the open row group, column by column.
struct RowGroupBuffer {
    /// Offset of this row group within the output stream.
    base: u64,
    ids: Vec<i64>,
    xs: Vec<f32>,
    ys: Vec<f32>,
    zs: Vec<f32>,
    kes: Vec<f32>,
}

/// Borrowed column batch in schema order.
enum ColumnValues<'a> {
    Int64(&'a [i64]),
    Float(&'a [f32]),
}

impl RowGroupBuffer {
    fn with_capacity(base: u64, rows: usize) -> Self {
        Self {
            base,
            ids: Vec::with_capacity(rows),
            xs: Vec::with_capacity(rows),
            ys: Vec::with_capacity(rows),
            zs: Vec::with_capacity(rows),
            kes: Vec::with_capacity(rows),
        }
    }

    fn rows(&self) -> u64 {
        self.ids.len() as u64
    }

    fn push(&mut self, particle: &Particle) {
        self.ids.push(particle.id);
        self.xs.push(particle.x);
        self.ys.push(particle.y);
        self.zs.push(particle.z);
        self.kes.push(particle.ke);
    }

    fn column(&self, index: usize) -> ColumnValues<'_> {
        match index {
            0 => ColumnValues::Int64(&self.ids),
            1 => ColumnValues::Float(&self.xs),
            2 => ColumnValues::Float(&self.ys),
            3 => ColumnValues::Float(&self.zs),
            4 => ColumnValues::Float(&self.kes),
            _ => unreachable!("particle schema has five columns"),
        }
    }
}

/// Encode one column chunk through the rebased sink view and close it.
fn write_column<W: Write + Send>(
    view: &mut TrackedWrite<W>,
    descr: ColumnDescPtr,
    props: WriterPropertiesPtr,
    values: ColumnValues<'_>,
) -> Result<ColumnCloseResult> {
    let page_writer = Box::new(SerializedPageWriter::new(view));
    let mut column = get_column_writer(descr, props, page_writer);
    match (&mut column, values) {
        (ColumnWriter::Int64ColumnWriter(writer), ColumnValues::Int64(batch)) => {
            writer.write_batch(batch, None, None)?;
        }
        (ColumnWriter::FloatColumnWriter(writer), ColumnValues::Float(batch)) => {
            writer.write_batch(batch, None, None)?;
        }
        _ => unreachable!("column writer does not match the particle schema"),
    }
    let result = match column {
        ColumnWriter::Int64ColumnWriter(writer) => writer.close()?,
        ColumnWriter::FloatColumnWriter(writer) => writer.close()?,
        _ => unreachable!("column writer does not match the particle schema"),
    };
    Ok(result)
}

pub struct ParquetWriter<S: ParquetStream> {
    sink: StashableStream<S>,
    config: WriterConfig,
    layout: RowGroupLayout,
    schema_descr: SchemaDescPtr,
    props: WriterPropertiesPtr,
    current: Option<RowGroupBuffer>,
    flushed: Vec<FlushedRowGroup>,
    total_rows: u64,
}

impl<S: ParquetStream> ParquetWriter<S> {
    pub fn new(config: WriterConfig, sink: S) -> Result<Self> {
        let schema_descr = particle_schema_descr()?;
        let layout = RowGroupLayout::new(&config, &schema_descr)?;
        let props = writer_properties(&config);
        Ok(Self {
            sink: StashableStream::new(sink),
            config,
            layout,
            schema_descr,
            props,
            current: None,
            flushed: Vec::new(),
            total_rows: 0,
        })
    }

    /// Rows admitted per row group before an internal flush.
    pub fn max_rows_per_group(&self) -> u64 {
        self.layout.max_rows
    }

    /// Rows accepted so far, including any still buffered.
    pub fn rows_written(&self) -> u64 {
        self.total_rows
    }

    pub fn add(&mut self, particle: &Particle) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|buffer| buffer.rows() >= self.layout.max_rows)
        {
            self.flush_row_group()?;
        }
        if self.current.is_none() {
            self.open_row_group()?;
        }
        self.current
            .as_mut()
            .expect("row group just opened")
            .push(particle);
        self.total_rows += 1;
        Ok(())
    }

    /// Force the current row group to end; remaining space is padded.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_row_group()
    }

    /// Flush any open row group, write the combined footer, and close the
    /// sink. The footer is written outside any row-group region, so a
    /// scattering sink routes it to the metadata file.
    pub fn finish(mut self) -> Result<WriterSummary> {
        self.flush_row_group()?;
        if !self.config.skip_scattering {
            self.sink.finish()?;
        }
        let combined =
            metadata::combined_metadata(&self.props, &self.schema_descr, &self.flushed)?;
        self.sink.write_all(PARQUET_MAGIC)?;
        metadata::write_footer(&mut self.sink, &combined)?;
        let bytes_written = self.sink.tell();
        self.sink.close()?;
        Ok(WriterSummary {
            rows: self.total_rows,
            row_groups: self.flushed.len(),
            bytes_written,
        })
    }

    fn open_row_group(&mut self) -> Result<()> {
        if !self.config.skip_scattering {
            self.sink.begin_row_group()?;
        }
        let base = self.sink.tell();
        trace!(base, "opening row group");
        self.current = Some(RowGroupBuffer::with_capacity(
            base,
            self.layout.max_rows as usize,
        ));
        Ok(())
    }

    fn flush_row_group(&mut self) -> Result<()> {
        let Some(buffer) = self.current.take() else {
            return Ok(());
        };
        let num_rows = buffer.rows() as i64;
        let pad = !self.config.skip_padding;

        // The sub-file body: magic, padded header page, then each column
        // chunk padded to its budget. The tracked view rebases offsets to
        // the sub-file, which is exactly what its footer must record.
        let columns = {
            let mut view = TrackedWrite::new(&mut self.sink);
            view.write_all(PARQUET_MAGIC)?;
            if pad {
                let header_len = view.bytes_written() as u64;
                assert!(
                    header_len <= self.layout.diskpage_size,
                    "sub-file header overflowed the {} byte disk page: {header_len} bytes",
                    self.layout.diskpage_size
                );
                write_zeros(&mut view, self.layout.diskpage_size - header_len)?;
            }
            let mut columns = Vec::with_capacity(self.schema_descr.num_columns());
            for (index, descr) in self.schema_descr.columns().iter().enumerate() {
                let column_base = view.bytes_written() as u64;
                let close = write_column(
                    &mut view,
                    descr.clone(),
                    self.props.clone(),
                    buffer.column(index),
                )?;
                if pad {
                    let written = view.bytes_written() as u64 - column_base;
                    let budget = self.layout.column_sizes[index];
                    assert!(
                        written <= budget,
                        "column {} overflowed its {budget} byte aligned budget: {written} bytes",
                        descr.path()
                    );
                    write_zeros(&mut view, budget - written)?;
                }
                columns.push(close.metadata);
            }
            view.flush()?;
            columns
        };

        let sub_file =
            metadata::sub_file_metadata(&self.props, &self.schema_descr, columns, num_rows)?;

        // Catch the footer in memory, pad the row group out underneath it,
        // then let it land at the very end of the sub-file.
        self.sink.begin_stash();
        metadata::write_footer(&mut self.sink, &sub_file)?;
        self.sink.end_stash();
        if pad {
            let written = self.sink.tell() - buffer.base;
            assert!(
                written <= self.layout.rowgroup_size,
                "row group at {} overflowed its {} byte budget: {written} bytes",
                buffer.base,
                self.layout.rowgroup_size
            );
            write_zeros(&mut self.sink, self.layout.rowgroup_size - written)?;
        }
        self.sink.pop_stash()?;

        trace!(base = buffer.base, rows = num_rows, "flushed row group");
        self.flushed.push(FlushedRowGroup {
            base: buffer.base,
            num_rows,
            row_group: sub_file.row_groups()[0].to_thrift(),
        });
        if !self.config.skip_scattering {
            self.sink.end_row_group()?;
        }
        Ok(())
    }
}
