//! A pass-through stream with a hold buffer.
//!
//! The Parquet encoder emits a sub-file footer as its final act, but the
//! aligned layout wants that footer at the very end of the padded row group.
//! Seeking is not an option, since the scatter layer is append-only across
//! fragment boundaries, so the footer is caught in memory instead: stash
//! mode buffers incoming writes while `tell` keeps advancing as if they had
//! been emitted, and a later `pop_stash` appends them after the padding.

use std::io::{self, Write};

use crate::sink::ParquetStream;

pub struct StashableStream<S> {
    base: S,
    stash: Vec<u8>,
    stashing: bool,
    /// Bytes handed to the base stream.
    file_offset: u64,
}

impl<S: ParquetStream> StashableStream<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            stash: Vec::new(),
            stashing: false,
            file_offset: 0,
        }
    }

    /// Buffer subsequent writes instead of forwarding them.
    pub fn begin_stash(&mut self) {
        self.stashing = true;
    }

    /// Forward subsequent writes again. Already stashed bytes stay held
    /// until [`pop_stash`](Self::pop_stash).
    pub fn end_stash(&mut self) {
        self.stashing = false;
    }

    /// Apply the held bytes to the base stream.
    pub fn pop_stash(&mut self) -> io::Result<()> {
        if !self.stash.is_empty() {
            let held = std::mem::take(&mut self.stash);
            self.base.write_all(&held)?;
            self.file_offset += held.len() as u64;
        }
        Ok(())
    }

    /// Discard the wrapper. Stashed bytes, if any, are dropped; leaving
    /// them behind is a caller error.
    pub fn into_inner(self) -> S {
        debug_assert!(self.stash.is_empty(), "stash dropped with bytes held");
        self.base
    }
}

impl<S: ParquetStream> Write for StashableStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.stashing {
            self.stash.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            let n = self.base.write(buf)?;
            self.file_offset += n as u64;
            Ok(n)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.base.flush()
    }
}

impl<S: ParquetStream> ParquetStream for StashableStream<S> {
    /// The offset this stream would be at if the stash were flushed.
    fn tell(&self) -> u64 {
        self.file_offset + self.stash.len() as u64
    }

    fn begin_row_group(&mut self) -> io::Result<()> {
        self.base.begin_row_group()
    }

    fn end_row_group(&mut self) -> io::Result<()> {
        self.base.end_row_group()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.base.finish()
    }

    fn close(&mut self) -> io::Result<()> {
        self.base.close()
    }
}
