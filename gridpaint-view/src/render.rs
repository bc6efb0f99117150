//! Terminal surface: every grid cell becomes one terminal cell.

use gridpaint_core::format::Rgb;
use gridpaint_core::surface::DrawSurface;
use log::{trace, warn};
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TermCell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

const EMPTY: TermCell = TermCell {
    ch: ' ',
    fg: Rgb::WHITE,
    bg: Rgb::BLACK,
};

/// Collects draw calls into a character grid that can be rendered as ANSI.
///
/// Surface units map to cells by dividing by the font metrics, so a
/// `font_width x font_height` rectangle covers exactly one cell.
pub struct TerminalSurface {
    cols: usize,
    rows: usize,
    font_width: f64,
    font_height: f64,
    fill: Rgb,
    cells: Vec<TermCell>,
}

impl TerminalSurface {
    pub fn new(cols: usize, rows: usize, font_width: u32, font_height: u32) -> Self {
        Self {
            cols,
            rows,
            font_width: f64::from(font_width),
            font_height: f64::from(font_height),
            fill: Rgb::BLACK,
            cells: vec![EMPTY; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Character currently at `(col, row)`.
    pub fn glyph_at(&self, col: usize, row: usize) -> char {
        self.cells[row * self.cols + col].ch
    }

    /// Colors currently at `(col, row)`: (foreground, background).
    pub fn colors_at(&self, col: usize, row: usize) -> (Rgb, Rgb) {
        let c = &self.cells[row * self.cols + col];
        (c.fg, c.bg)
    }

    fn col_of(&self, x: f64) -> isize {
        (x / self.font_width).floor() as isize
    }

    fn row_of(&self, y: f64) -> isize {
        (y / self.font_height).floor() as isize
    }

    fn index(&self, col: isize, row: isize) -> Option<usize> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    /// Render the `width x height` window whose top-left cell is
    /// `(left, top)` to an ANSI byte buffer.
    /// Colors are only re-emitted when they change from the previous cell.
    /// A double-width glyph hides the cell to its right; glyphs that would
    /// not occupy whole columns render as U+FFFD.
    pub fn render(&self, left: usize, top: usize, width: usize, height: usize, buf: &mut Vec<u8>) {
        buf.clear();

        // Move cursor to top-left
        buf.extend_from_slice(b"\x1b[H");

        let right = (left + width).min(self.cols);
        let bottom = (top + height).min(self.rows);
        let mut prev: Option<(Rgb, Rgb)> = None;
        let mut utf8 = [0u8; 4];

        for row in top..bottom {
            if row > top {
                buf.extend_from_slice(b"\r\n");
            }
            let mut col = left;
            while col < right {
                let cell = &self.cells[row * self.cols + col];

                if prev.map_or(true, |(_, bg)| bg != cell.bg) {
                    write_bg(buf, cell.bg);
                }
                if prev.map_or(true, |(fg, _)| fg != cell.fg) {
                    write_fg(buf, cell.fg);
                }
                prev = Some((cell.fg, cell.bg));

                let ch = match cell.ch.width() {
                    Some(1) => cell.ch,
                    Some(2) if col + 1 < right => {
                        col += 1;
                        cell.ch
                    }
                    _ => char::REPLACEMENT_CHARACTER,
                };
                buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                col += 1;
            }
            // Clear whatever the previous frame left right of the grid
            buf.extend_from_slice(b"\x1b[0m\x1b[K");
            prev = None;
        }

        // Clear below the grid, then reset colors
        buf.extend_from_slice(b"\x1b[0m\x1b[J");
    }
}

impl DrawSurface for TerminalSurface {
    fn set_fill_style(&mut self, style: &str) {
        match style.parse::<Rgb>() {
            Ok(rgb) => self.fill = rgb,
            Err(e) => warn!("ignoring fill style: {e}"),
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let c0 = self.col_of(x);
        let r0 = self.row_of(y);
        let c1 = ((x + width) / self.font_width).ceil() as isize;
        let r1 = ((y + height) / self.font_height).ceil() as isize;

        for row in r0..r1 {
            for col in c0..c1 {
                if let Some(i) = self.index(col, row) {
                    self.cells[i] = TermCell {
                        ch: ' ',
                        fg: self.cells[i].fg,
                        bg: self.fill,
                    };
                }
            }
        }
    }

    fn set_font(&mut self, font: &str) {
        trace!("terminal surface ignores font {font:?}");
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        // The baseline sits inside the cell, so flooring finds its row.
        let row = self.row_of(y);
        let col = self.col_of(x);
        for (i, ch) in text.chars().enumerate() {
            if let Some(idx) = self.index(col + i as isize, row) {
                // Control characters would reach the terminal as escapes.
                self.cells[idx].ch = if ch.is_control() { char::REPLACEMENT_CHARACTER } else { ch };
                self.cells[idx].fg = self.fill;
            }
        }
    }
}

fn write_bg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[48;2;");
    write_rgb(buf, c);
}

fn write_fg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[38;2;");
    write_rgb(buf, c);
}

fn write_rgb(buf: &mut Vec<u8>, c: Rgb) {
    write_u8(buf, c.r);
    buf.push(b';');
    write_u8(buf, c.g);
    buf.push(b';');
    write_u8(buf, c.b);
    buf.push(b'm');
}

/// Fast integer-to-ASCII for u8 values (0-255), no allocation.
fn write_u8(buf: &mut Vec<u8>, v: u8) {
    if v >= 100 {
        buf.push(b'0' + v / 100);
        buf.push(b'0' + (v / 10) % 10);
        buf.push(b'0' + v % 10);
    } else if v >= 10 {
        buf.push(b'0' + v / 10);
        buf.push(b'0' + v % 10);
    } else {
        buf.push(b'0' + v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpaint_core::config::GridConfig;
    use gridpaint_core::format::{Cell, CellBuffer, CodepointLayout};
    use gridpaint_core::painter::GridPainter;

    #[test]
    fn painted_grid_lands_on_terminal_cells() {
        let mut cells = CellBuffer::filled(3, 2, CodepointLayout::Legacy, Cell::blank(Rgb::new(0, 0, 40)));
        cells.set(1, 1, Cell::new('Q', Rgb::new(250, 5, 0), Rgb::new(1, 2, 3)));

        let mut term = TerminalSurface::new(3, 2, 12, 24);
        GridPainter::new(GridConfig::with_size(3, 2))
            .unwrap()
            .paint(cells.as_bytes(), &mut term)
            .unwrap();

        assert_eq!(term.glyph_at(1, 1), 'Q');
        assert_eq!(term.colors_at(1, 1), (Rgb::new(250, 5, 0), Rgb::new(1, 2, 3)));
        assert_eq!(term.glyph_at(0, 0), ' ');
        assert_eq!(term.colors_at(2, 0).1, Rgb::new(0, 0, 40));
    }

    #[test]
    fn draws_outside_the_grid_are_dropped() {
        let mut term = TerminalSurface::new(2, 2, 10, 10);
        term.set_fill_style("#ff0000");
        term.fill_rect(-10.0, -10.0, 20.0, 20.0);
        term.fill_text("abc", 10.0, 18.0);
        term.fill_rect(100.0, 100.0, 10.0, 10.0);

        assert_eq!(term.colors_at(0, 0).1, Rgb::new(255, 0, 0));
        assert_eq!(term.colors_at(1, 1).1, Rgb::BLACK);
        assert_eq!(term.glyph_at(1, 1), 'a');
    }

    #[test]
    fn rect_over_text_erases_it() {
        let mut term = TerminalSurface::new(1, 1, 12, 24);
        term.fill_text("x", 0.0, 19.2);
        term.fill_rect(0.0, 0.0, 12.0, 24.0);
        assert_eq!(term.glyph_at(0, 0), ' ');
    }

    #[test]
    fn render_skips_repeated_colors() {
        let mut term = TerminalSurface::new(3, 1, 1, 1);
        term.set_fill_style("#050505");
        term.fill_rect(0.0, 0.0, 3.0, 1.0);
        term.fill_text("hi", 1.0, 0.5);

        let mut buf = Vec::new();
        term.render(0, 0, 3, 1, &mut buf);
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "\x1b[H\x1b[48;2;5;5;5m\x1b[38;2;255;255;255m \x1b[38;2;5;5;5mhi\x1b[0m\x1b[K\x1b[0m\x1b[J"
        );
    }

    #[test]
    fn render_window_is_clamped() {
        let mut term = TerminalSurface::new(4, 4, 1, 1);
        term.fill_text("abcd", 0.0, 3.5);
        let mut buf = Vec::new();
        term.render(2, 3, 10, 10, &mut buf);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("cd"));
        assert!(!out.contains('b'));
        assert!(!out.contains("\r\n"));
    }

    fn paint_row(glyphs: &[u32]) -> TerminalSurface {
        let mut raw = Vec::new();
        for &cp in glyphs {
            raw.extend_from_slice(&cp.to_le_bytes());
            raw.extend_from_slice(&[1, 1, 1, 0, 0, 0, 0, 0]);
        }
        let mut term = TerminalSurface::new(glyphs.len(), 1, 12, 24);
        GridPainter::new(GridConfig::with_size(glyphs.len(), 1))
            .unwrap()
            .paint(&raw, &mut term)
            .unwrap();
        term
    }

    #[test]
    fn control_glyphs_never_reach_the_terminal() {
        let term = paint_row(&[0x1b, 'c' as u32, 0x0a, 0x0d, 0x00]);
        assert_eq!(term.glyph_at(0, 0), '\u{fffd}');
        assert_eq!(term.glyph_at(1, 0), 'c');

        let mut buf = Vec::new();
        term.render(0, 0, 5, 1, &mut buf);
        assert!(!buf.windows(2).any(|w| w == b"\x1bc"));
        assert!(!buf.iter().any(|&b| b == b'\n' || b == b'\r' || b == 0));
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches('\u{fffd}').count(), 4);
    }

    #[test]
    fn zeroed_buffer_renders_replacement_glyphs() {
        let raw = vec![0u8; 2 * 2 * 12];
        let mut term = TerminalSurface::new(2, 2, 12, 24);
        GridPainter::new(GridConfig::with_size(2, 2))
            .unwrap()
            .paint(&raw, &mut term)
            .unwrap();
        let mut buf = Vec::new();
        term.render(0, 0, 2, 2, &mut buf);
        assert!(!buf.contains(&0));
    }

    #[test]
    fn wide_glyph_covers_its_neighbour() {
        let term = paint_row(&['日' as u32, 'x' as u32, 'y' as u32]);
        let mut buf = Vec::new();
        term.render(0, 0, 3, 1, &mut buf);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("日y"));
        assert!(!out.contains('x'));

        // No room for the second column at the window edge
        let mut buf = Vec::new();
        term.render(0, 0, 1, 1, &mut buf);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains('\u{fffd}'));
        assert!(!out.contains('日'));
    }

    #[test]
    fn zero_width_glyph_is_replaced() {
        let term = paint_row(&[0x301, 'a' as u32]);
        let mut buf = Vec::new();
        term.render(0, 0, 2, 1, &mut buf);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\u{fffd}a"));
    }
}
