use alloc::{string::String, vec, vec::Vec};

use super::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Black,
        bg: Color::Black,
    };
}

/// A grid of coloured character cells, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFrame {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl TextFrame {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::BLANK; cols * rows],
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.cols && y < self.rows {
            Some(self.cells[y * self.cols + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows {
            self.cells[y as usize * self.cols + x as usize] = cell;
        }
    }

    /// Writes `text` from `(x, y)` on a black background; anything off the
    /// grid is dropped.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, fg: Color) {
        for (offset, ch) in text.chars().enumerate() {
            self.set(
                x + offset as i32,
                y,
                Cell {
                    ch,
                    fg,
                    bg: Color::Black,
                },
            );
        }
    }

    pub fn row_text(&self, y: usize) -> String {
        self.row(y).iter().map(|cell| cell.ch).collect()
    }

    /// The cells of row `y`, or an empty slice past the last row.
    pub fn row(&self, y: usize) -> &[Cell] {
        if y >= self.rows {
            return &[];
        }
        &self.cells[y * self.cols..(y + 1) * self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_every_edge() {
        let mut frame = TextFrame::new(6, 2);
        frame.put_str(-2, 0, "abcd", Color::White);
        frame.put_str(4, 1, "xyz", Color::White);
        frame.put_str(0, 2, "gone", Color::White);
        frame.put_str(0, -1, "gone", Color::White);

        assert_eq!(frame.row_text(0), "cd    ");
        assert_eq!(frame.row_text(1), "    xy");
    }

    #[test]
    fn rows_are_bounded_slices() {
        let mut frame = TextFrame::new(3, 2);
        frame.put_str(0, 1, "ab", Color::Red);

        let row = frame.row(1);
        assert_eq!(row.len(), 3);
        assert_eq!(row[1].ch, 'b');
        assert_eq!(row[1].fg, Color::Red);
        assert_eq!(row[2], Cell::BLANK);
        assert!(frame.row(2).is_empty());
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut frame = TextFrame::new(3, 3);
        frame.put_str(0, 1, "xyz", Color::Green);
        frame.clear();
        for y in 0..3 {
            assert_eq!(frame.row_text(y), "   ");
        }
        assert_eq!(frame.get(3, 0), None);
    }
}
