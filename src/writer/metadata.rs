//! Footer assembly.
//!
//! Each flushed row group is a standalone Parquet sub-file with its own
//! footer, and the output as a whole carries one combined footer referencing
//! every row group in outer-stream coordinates. Both footers go through the
//! Parquet standalone metadata writer; the combined one is produced by
//! rewriting the per-sub-file thrift records so that column-chunk offsets
//! are expressed relative to the start of the concatenated stream.

use std::io::Write;

use parquet::file::metadata::{
    ColumnChunkMetaData, FileMetaData, ParquetMetaData, ParquetMetaDataWriter, RowGroupMetaData,
};
use parquet::file::properties::WriterProperties;
use parquet::format::RowGroup;

use crate::error::Result;
use crate::schema::SchemaDescPtr;

pub(crate) const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// One completed row-group sub-file: where it starts in the outer stream
/// and the thrift row-group record its own footer carries.
#[derive(Debug, Clone)]
pub(crate) struct FlushedRowGroup {
    pub base: u64,
    pub num_rows: i64,
    pub row_group: RowGroup,
}

fn file_metadata(
    props: &WriterProperties,
    schema_descr: &SchemaDescPtr,
    num_rows: i64,
) -> FileMetaData {
    FileMetaData::new(
        props.writer_version().as_num(),
        num_rows,
        Some(props.created_by().to_owned()),
        None,
        schema_descr.clone(),
        None,
    )
}

/// Metadata for one row-group sub-file, with sub-file-relative offsets.
pub(crate) fn sub_file_metadata(
    props: &WriterProperties,
    schema_descr: &SchemaDescPtr,
    columns: Vec<ColumnChunkMetaData>,
    num_rows: i64,
) -> Result<ParquetMetaData> {
    let total_byte_size = columns.iter().map(|c| c.uncompressed_size()).sum();
    let row_group = RowGroupMetaData::builder(schema_descr.clone())
        .set_num_rows(num_rows)
        .set_total_byte_size(total_byte_size)
        .set_column_metadata(columns)
        .build()?;
    Ok(ParquetMetaData::new(
        file_metadata(props, schema_descr, num_rows),
        vec![row_group],
    ))
}

/// Combined metadata for the whole stream: every flushed row group in
/// insertion order, column-chunk offsets shifted by the row group's base.
pub(crate) fn combined_metadata(
    props: &WriterProperties,
    schema_descr: &SchemaDescPtr,
    flushed: &[FlushedRowGroup],
) -> Result<ParquetMetaData> {
    let mut row_groups = Vec::with_capacity(flushed.len());
    let mut num_rows = 0i64;
    for (ordinal, log) in flushed.iter().enumerate() {
        let base = log.base as i64;
        let mut row_group = log.row_group.clone();
        row_group.file_offset = Some(base);
        row_group.ordinal = i16::try_from(ordinal).ok();
        for column in &mut row_group.columns {
            column.file_offset += base;
            if let Some(meta) = column.meta_data.as_mut() {
                meta.data_page_offset += base;
            }
        }
        num_rows += log.num_rows;
        row_groups.push(RowGroupMetaData::from_thrift(
            schema_descr.clone(),
            row_group,
        )?);
    }
    Ok(ParquetMetaData::new(
        file_metadata(props, schema_descr, num_rows),
        row_groups,
    ))
}

/// Serialize a footer (thrift metadata, length, magic) to `sink`.
pub(crate) fn write_footer<W: Write>(sink: W, metadata: &ParquetMetaData) -> Result<()> {
    ParquetMetaDataWriter::new(sink, metadata).finish()?;
    Ok(())
}
