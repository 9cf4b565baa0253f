//! Output schema and row-group alignment layout.
//!
//! The writer schema is fixed: `ID` (physically signed 64-bit, annotated
//! unsigned; readers must interpret it as unsigned) followed by the four
//! float fields `x`, `y`, `z`, `ke`. The layout math apportions each
//! row-group sub-file into disk pages: one page for the Parquet header, one
//! reserved for the footer, and the remainder split across column chunks in
//! proportion to their physical value width.

use std::sync::Arc;

use parquet::basic::{Compression, ConvertedType, Encoding, Repetition, Type as PhysicalType};
use parquet::file::properties::{EnabledStatistics, WriterProperties, WriterPropertiesPtr};
use parquet::schema::types::{SchemaDescriptor, Type, TypePtr};

use crate::config::WriterConfig;
use crate::error::{ConvertError, Result};

pub use parquet::schema::types::SchemaDescPtr;

/// Build the particle writer schema.
pub fn particle_schema() -> Result<TypePtr> {
    let id = Type::primitive_type_builder("ID", PhysicalType::INT64)
        .with_repetition(Repetition::REQUIRED)
        .with_converted_type(ConvertedType::UINT_64)
        .build()?;
    let mut fields = vec![Arc::new(id)];
    for name in ["x", "y", "z", "ke"] {
        let field = Type::primitive_type_builder(name, PhysicalType::FLOAT)
            .with_repetition(Repetition::REQUIRED)
            .build()?;
        fields.push(Arc::new(field));
    }
    let root = Type::group_type_builder("particle").with_fields(fields).build()?;
    Ok(Arc::new(root))
}

/// Descriptor for [`particle_schema`].
pub fn particle_schema_descr() -> Result<SchemaDescPtr> {
    Ok(Arc::new(SchemaDescriptor::new(particle_schema()?)))
}

/// Encoder properties shared by every row-group sub-file: plain encoding,
/// no dictionaries, chunk statistics, and a data-page size equal to the
/// row-group size so a column chunk is a single page.
pub fn writer_properties(config: &WriterConfig) -> WriterPropertiesPtr {
    Arc::new(
        WriterProperties::builder()
            .set_encoding(Encoding::PLAIN)
            .set_dictionary_enabled(false)
            .set_statistics_enabled(EnabledStatistics::Chunk)
            .set_compression(Compression::UNCOMPRESSED)
            .set_data_page_size_limit(config.rowgroup_size as usize)
            .set_data_page_row_count_limit(usize::MAX)
            // Kept short: every sub-file footer must fit the one disk page
            // reserved for it.
            .set_created_by("particles2parquet".to_string())
            .build(),
    )
}

/// Byte width of one encoded value of a physical type.
fn physical_size(physical_type: PhysicalType) -> Result<u64> {
    match physical_type {
        PhysicalType::INT32 | PhysicalType::FLOAT => Ok(4),
        PhysicalType::INT64 | PhysicalType::DOUBLE => Ok(8),
        other => Err(ConvertError::invalid_config(format!(
            "unsupported physical type {other} in writer schema"
        ))),
    }
}

/// Alignment layout of one row-group sub-file, derived from the schema and
/// the writer configuration.
#[derive(Debug, Clone)]
pub struct RowGroupLayout {
    pub rowgroup_size: u64,
    pub diskpage_size: u64,
    /// Nominal serialized row width: the sum of all column value widths.
    pub row_size: u64,
    /// Padded byte budget of each column chunk, in schema order.
    pub column_sizes: Vec<u64>,
    /// Rows admitted per row group before an internal flush.
    pub max_rows: u64,
}

impl RowGroupLayout {
    pub fn new(config: &WriterConfig, schema_descr: &SchemaDescriptor) -> Result<Self> {
        config.validate()?;
        let widths = schema_descr
            .columns()
            .iter()
            .map(|column| physical_size(column.physical_type()))
            .collect::<Result<Vec<_>>>()?;
        let row_size: u64 = widths.iter().sum();

        // One disk page for the header, one for the footer; columns share
        // the remaining pages by value width.
        let pages = config.rowgroup_size / config.diskpage_size - 2;
        let mut column_sizes = Vec::with_capacity(widths.len());
        let mut max_rows = u64::MAX;
        for &width in &widths {
            let column_pages = pages * width / row_size;
            if column_pages < 1 {
                return Err(ConvertError::invalid_config(format!(
                    "rowgroup_size {} leaves no room for a {width}-byte column",
                    config.rowgroup_size
                )));
            }
            column_sizes.push(column_pages * config.diskpage_size);
            // The -1 leaves slack for a partially filled final data page
            // plus encoder overhead within the column budget.
            let rows = (column_pages - 1) * config.diskpage_size / width;
            max_rows = max_rows.min(rows);
        }
        if max_rows == 0 {
            return Err(ConvertError::invalid_config(format!(
                "rowgroup_size {} / diskpage_size {} admits zero rows per group",
                config.rowgroup_size, config.diskpage_size
            )));
        }

        Ok(Self {
            rowgroup_size: config.rowgroup_size,
            diskpage_size: config.diskpage_size,
            row_size,
            column_sizes,
            max_rows,
        })
    }
}
