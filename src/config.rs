//! Conversion configuration.
//!
//! Three layers, mirroring the output stack: `WriterConfig` shapes each
//! row-group sub-file, `ScatterConfig` shapes the on-disk fragments, and
//! `ConvertConfig` bundles both with the batch-driver settings.

use crate::error::{ConvertError, Result};

/// Row-group writer settings.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Byte size of each row-group sub-file. Default: 1 MiB.
    pub rowgroup_size: u64,
    /// Filesystem allocation unit (zfs ashift) that column chunks are
    /// aligned to. Default: 512 B.
    pub diskpage_size: u64,
    /// Suppress header, column, and row-group padding. The output is then an
    /// ordinary densely packed Parquet stream.
    pub skip_padding: bool,
    /// Do not signal row-group boundaries to the sink, producing one
    /// monolithic concatenation instead of scattered fragments.
    pub skip_scattering: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            rowgroup_size: 1 << 20,
            diskpage_size: 1 << 9,
            skip_padding: false,
            skip_scattering: false,
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.diskpage_size == 0 || !self.diskpage_size.is_power_of_two() {
            return Err(ConvertError::invalid_config(format!(
                "diskpage_size must be a power of two, got {}",
                self.diskpage_size
            )));
        }
        if self.rowgroup_size == 0 || self.rowgroup_size % self.diskpage_size != 0 {
            return Err(ConvertError::invalid_config(format!(
                "rowgroup_size {} must be a nonzero multiple of diskpage_size {}",
                self.rowgroup_size, self.diskpage_size
            )));
        }
        // One page is reserved for the sub-file header and one for its
        // footer; at least one more must remain for column data.
        if self.rowgroup_size / self.diskpage_size < 3 {
            return Err(ConvertError::invalid_config(format!(
                "rowgroup_size {} holds fewer than three {}-byte pages",
                self.rowgroup_size, self.diskpage_size
            )));
        }
        Ok(())
    }
}

/// Fragment scattering settings.
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    /// Byte size of each fragment file. Default: 4 MiB.
    pub fragment_size: u64,
    /// Leave the final fragment short instead of padding it out. Safe when
    /// every fragment is known to span at least two filesystem records.
    pub skip_padding: bool,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            fragment_size: 4 << 20,
            skip_padding: false,
        }
    }
}

/// Batch conversion settings: one writer plus one scatter layer per input
/// file, fanned out over a bounded worker pool.
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    /// Worker threads for the batch driver. 0 means one per core.
    pub workers: usize,
    pub writer: WriterConfig,
    pub scatter: ScatterConfig,
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<()> {
        self.writer.validate()?;
        if !self.writer.skip_scattering {
            if self.scatter.fragment_size == 0
                || self.scatter.fragment_size % self.writer.rowgroup_size != 0
            {
                return Err(ConvertError::invalid_config(format!(
                    "fragment_size {} must be a nonzero multiple of rowgroup_size {}",
                    self.scatter.fragment_size, self.writer.rowgroup_size
                )));
            }
        }
        Ok(())
    }

    /// Apply the `-S` switch: padding off everywhere, scattering off too.
    pub fn with_padding_and_scattering_skipped(mut self) -> Self {
        self.writer.skip_padding = true;
        self.writer.skip_scattering = true;
        self.scatter.skip_padding = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ConvertConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_power_of_two_diskpage() {
        let config = WriterConfig {
            diskpage_size: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_misaligned_rowgroup() {
        let config = WriterConfig {
            rowgroup_size: (1 << 20) + 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_fragment_not_multiple_of_rowgroup() {
        let mut config = ConvertConfig::default();
        config.scatter.fragment_size = config.writer.rowgroup_size * 3 + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn fragment_alignment_ignored_without_scattering() {
        let mut config = ConvertConfig::default();
        config.writer.skip_scattering = true;
        config.scatter.fragment_size = 1;
        config.validate().unwrap();
    }
}
