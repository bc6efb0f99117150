use gridpaint_core::format::{Cell, CellBuffer, Rgb};

const TAB_WIDTH: usize = 4;

/// Lay out text onto the grid: one line per row, one char per column.
/// Tabs advance to the next multiple of four; anything past the grid edge
/// is clipped. Backgrounds already in the grid are kept.
///
/// Returns the number of glyphs placed.
pub fn layout_text(text: &str, fg: Rgb, cells: &mut CellBuffer) -> usize {
    let mut placed = 0;

    for (y, line) in text.lines().take(cells.rows()).enumerate() {
        let mut x = 0;
        for ch in line.chars() {
            if x >= cells.cols() {
                break;
            }
            match ch {
                '\t' => x = (x / TAB_WIDTH + 1) * TAB_WIDTH,
                c if c.is_control() => x += 1,
                c => {
                    let bg = cells.get(x, y).bg;
                    cells.set(x, y, Cell::new(c, fg, bg));
                    if c != ' ' {
                        placed += 1;
                    }
                    x += 1;
                }
            }
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpaint_core::format::CodepointLayout;

    fn grid(cols: usize, rows: usize) -> CellBuffer {
        CellBuffer::filled(cols, rows, CodepointLayout::Legacy, Cell::blank(Rgb::new(9, 9, 9)))
    }

    #[test]
    fn clips_to_grid() {
        let mut cells = grid(3, 2);
        let placed = layout_text("abcdef\nxy\nignored", Rgb::WHITE, &mut cells);
        assert_eq!(placed, 5);
        assert_eq!(cells.get(2, 0).glyph(), 'c');
        assert_eq!(cells.get(1, 1).glyph(), 'y');
        assert!(cells.get(2, 1).is_blank());
    }

    #[test]
    fn expands_tabs_and_keeps_background() {
        let mut cells = grid(10, 1);
        layout_text("a\tb", Rgb::WHITE, &mut cells);
        assert_eq!(cells.get(0, 0).glyph(), 'a');
        assert!(cells.get(1, 0).is_blank());
        assert_eq!(cells.get(4, 0).glyph(), 'b');
        assert_eq!(cells.get(4, 0).bg, Rgb::new(9, 9, 9));
        assert_eq!(cells.get(4, 0).fg, Rgb::WHITE);
    }
}
