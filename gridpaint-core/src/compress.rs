use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::error::FormatError;

/// An lz4 block never expands its input by more than this factor.
const MAX_EXPANSION: usize = 255;

pub fn compress(data: &[u8]) -> Vec<u8> {
    compress_prepend_size(data)
}

/// Decompress a size-prepended block whose payload must be exactly `expected`
/// bytes. The prefix, and whether the block could possibly expand to it,
/// are checked before anything is allocated.
pub fn decompress(data: &[u8], expected: usize) -> Result<Vec<u8>, FormatError> {
    let prefix: [u8; 4] = data
        .get(0..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| FormatError::Decompress("missing size prefix".to_string()))?;
    let declared = u32::from_le_bytes(prefix) as usize;
    if declared != expected {
        return Err(FormatError::SizeMismatch { expected, actual: declared });
    }
    let limit = data.len().saturating_sub(4).saturating_mul(MAX_EXPANSION);
    if declared > limit {
        return Err(FormatError::Decompress(format!(
            "block of {} bytes cannot hold {declared} bytes",
            data.len()
        )));
    }
    let raw = decompress_size_prepended(data).map_err(|e| FormatError::Decompress(e.to_string()))?;
    if raw.len() != expected {
        return Err(FormatError::SizeMismatch { expected, actual: raw.len() });
    }
    Ok(raw)
}
