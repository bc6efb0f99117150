use std::fmt::Write as _;

use log::debug;

use crate::config::GridConfig;
use crate::error::PaintError;
use crate::format::{Cell, Rgb};
use crate::surface::DrawSurface;

/// Counters for one paint pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub cells: usize,
    pub glyphs: usize,
}

/// Decodes a packed cell buffer and draws it onto a surface.
///
/// The painter holds no per-call state. Each `paint` call borrows the
/// surface mutably for the whole pass, so passes against one surface are
/// serialized by the caller.
#[derive(Clone, Debug)]
pub struct GridPainter {
    config: GridConfig,
}

impl GridPainter {
    pub fn new(config: GridConfig) -> Result<Self, PaintError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Paint every cell of `buffer`: a background rectangle, then the glyph
    /// unless it is a space.
    ///
    /// Cells are visited column by column (x outer, y inner); cell `(x, y)`
    /// lives at byte `(cols * y + x) * 12`. A buffer shorter than the grid
    /// is rejected before anything is drawn. Trailing bytes are ignored.
    pub fn paint<S: DrawSurface + ?Sized>(&self, buffer: &[u8], surface: &mut S) -> Result<PaintStats, PaintError> {
        let cfg = &self.config;
        let expected = cfg.buffer_len();
        if buffer.len() < expected {
            return Err(PaintError::MalformedBuffer {
                expected,
                actual: buffer.len(),
            });
        }

        debug!(
            "painting {}x{} grid ({} bytes, {:?} codepoints)",
            cfg.cols,
            cfg.rows,
            buffer.len(),
            cfg.layout
        );

        let fw = f64::from(cfg.font_width);
        let fh = f64::from(cfg.font_height);
        surface.set_font(&cfg.font());

        let mut stats = PaintStats::default();
        let mut style = String::with_capacity(7);
        let mut utf8 = [0u8; 4];

        for x in 0..cfg.cols {
            for y in 0..cfg.rows {
                let n = cfg.cols * y + x;
                let cell = Cell::from_bytes(&buffer[n * Cell::SIZE..(n + 1) * Cell::SIZE], cfg.layout);
                let px = x as f64 * fw;

                set_style(surface, &mut style, cell.bg);
                surface.fill_rect(px, y as f64 * fh, fw, fh);

                if !cell.is_blank() {
                    set_style(surface, &mut style, cell.fg);
                    let glyph = cell.glyph().encode_utf8(&mut utf8);
                    surface.fill_text(glyph, px, (y as f64 + cfg.baseline) * fh);
                    stats.glyphs += 1;
                }
                stats.cells += 1;
            }
        }

        debug!("painted {} cells, {} glyphs", stats.cells, stats.glyphs);
        Ok(stats)
    }
}

fn set_style<S: DrawSurface + ?Sized>(surface: &mut S, buf: &mut String, color: Rgb) {
    buf.clear();
    // Writing into a String cannot fail.
    let _ = write!(buf, "{color}");
    surface.set_fill_style(buf);
}
