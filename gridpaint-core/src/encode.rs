use std::io::Write;

use log::debug;

use crate::compress;
use crate::error::FormatError;
use crate::format::GridHeader;

/// Writes .grid snapshots: header followed by the lz4-compressed cell buffer.
pub struct GridWriter<W: Write> {
    writer: W,
}

impl<W: Write> GridWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one snapshot. `cells` must hold exactly the grid the header
    /// describes. Returns the underlying writer, flushed.
    pub fn write(mut self, header: &GridHeader, cells: &[u8]) -> Result<W, FormatError> {
        let expected = header.body_len();
        if cells.len() != expected {
            return Err(FormatError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        let compressed = compress::compress(cells);
        debug!(
            "writing {}x{} snapshot: {} -> {} bytes",
            header.cols,
            header.rows,
            cells.len(),
            compressed.len()
        );

        self.writer.write_all(&header.to_bytes())?;
        self.writer.write_all(&compressed)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
