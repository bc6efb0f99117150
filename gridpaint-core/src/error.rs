/// Errors raised while painting a cell buffer.
#[derive(Debug, thiserror::Error)]
pub enum PaintError {
    #[error("malformed buffer: expected at least {expected} bytes, got {actual}")]
    MalformedBuffer { expected: usize, actual: usize },

    #[error("invalid grid config: {0}")]
    InvalidConfig(String),
}

/// Errors raised while reading or writing .grid snapshots.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid magic: expected GRID")]
    BadMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("unknown codepoint layout: {0}")]
    UnknownLayout(u8),

    #[error("cell data is {actual} bytes, grid needs {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid color {0:?}: expected #rrggbb")]
    BadColor(String),

    #[error("lz4 decompress failed: {0}")]
    Decompress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
