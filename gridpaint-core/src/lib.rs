pub mod format;
pub mod compress;
pub mod config;
pub mod error;
pub mod surface;
pub mod painter;
pub mod encode;
pub mod decode;

pub use config::GridConfig;
pub use error::{FormatError, PaintError};
pub use format::{Cell, CellBuffer, CodepointLayout, GridHeader, Rgb};
pub use painter::{GridPainter, PaintStats};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
