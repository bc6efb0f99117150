use std::io::Read;

use crate::compress;
use crate::error::FormatError;
use crate::format::*;

/// Reads .grid snapshots.
pub struct GridReader<R: Read> {
    reader: R,
    pub header: GridHeader,
}

impl<R: Read> GridReader<R> {
    /// Open and parse the header.
    pub fn new(mut reader: R) -> Result<Self, FormatError> {
        let mut header_buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_buf)?;
        let header = GridHeader::from_bytes(&header_buf)?;
        Ok(Self { reader, header })
    }

    /// Read and decompress the cell buffer. Its length always equals
    /// `header.body_len()`.
    pub fn read_cells(mut self) -> Result<Vec<u8>, FormatError> {
        let mut compressed = Vec::new();
        self.reader.read_to_end(&mut compressed)?;
        compress::decompress(&compressed, self.header.body_len())
    }
}
