//! Fragmented directory output.
//!
//! A [`ScatterStream`] presents one linear byte stream while physically
//! splitting it over an output directory: row-group bytes land in rolling
//! fragment files named `rgb-<offset>` after the virtual offset where they
//! start, and everything written outside a row-group region (the root header
//! and combined footer) lands in a `metadata` file. Consecutive row groups
//! share a fragment until it fills; a full fragment is always exactly
//! `fragment_size` bytes unless padding is disabled.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ScatterConfig;
use crate::sink::{write_zeros, ParquetStream};

pub struct ScatterStream {
    dir: PathBuf,
    metadata: File,
    fragment: Option<File>,
    fragment_len: u64,
    file_offset: u64,
    config: ScatterConfig,
    closed: bool,
}

impl ScatterStream {
    /// Create the output directory and its `metadata` file. Fragment files
    /// are created lazily at row-group boundaries.
    pub fn open(config: ScatterConfig, path: &Path) -> io::Result<Self> {
        fs::create_dir_all(path)?;
        let metadata = File::create(path.join("metadata"))?;
        Ok(Self {
            dir: path.to_path_buf(),
            metadata,
            fragment: None,
            fragment_len: 0,
            file_offset: 0,
            config,
            closed: false,
        })
    }

    /// Close out the current fragment. A fragment that has filled to exactly
    /// `fragment_size` closes as is; a short fragment stays open unless
    /// `force`, in which case it is padded out (or left short when padding
    /// is disabled). Overshooting the fragment size means the writer above
    /// stopped honoring the row-group alignment contract.
    fn flush_fragment(&mut self, force: bool) -> io::Result<()> {
        let Some(mut fragment) = self.fragment.take() else {
            return Ok(());
        };
        assert!(
            self.fragment_len <= self.config.fragment_size,
            "fragment overflowed its {} byte budget: {} bytes written",
            self.config.fragment_size,
            self.fragment_len
        );
        if self.fragment_len == self.config.fragment_size {
            fragment.flush()?;
            return Ok(());
        }
        if !force {
            // Short and not yet full: keep accepting row groups.
            self.fragment = Some(fragment);
            return Ok(());
        }
        if !self.config.skip_padding {
            let pad = self.config.fragment_size - self.fragment_len;
            write_zeros(&mut fragment, pad)?;
            self.file_offset += pad;
        }
        fragment.flush()
    }
}

impl Write for ScatterStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.fragment.as_mut() {
            Some(fragment) => {
                let n = fragment.write(buf)?;
                self.fragment_len += n as u64;
                n
            }
            None => self.metadata.write(buf)?,
        };
        self.file_offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(fragment) = self.fragment.as_mut() {
            fragment.flush()?;
        }
        self.metadata.flush()
    }
}

impl ParquetStream for ScatterStream {
    fn tell(&self) -> u64 {
        self.file_offset
    }

    fn begin_row_group(&mut self) -> io::Result<()> {
        if self.fragment.is_none() {
            let name = format!("rgb-{:010}", self.file_offset);
            debug!(fragment = %name, "opening fragment");
            self.fragment = Some(File::create(self.dir.join(name))?);
            self.fragment_len = 0;
        }
        Ok(())
    }

    fn end_row_group(&mut self) -> io::Result<()> {
        self.flush_fragment(false)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_fragment(true)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.finish()?;
        self.metadata.flush()?;
        self.closed = true;
        Ok(())
    }
}
