use alloc::{vec, vec::Vec};

use super::color::Color;
use super::text::{Cell, TextFrame};

const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Palette-indexed software framebuffer for the pixel layout.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::Black; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Color::Black);
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, color);
            }
        }
    }

    /// Fills every pixel with `dx² + dy² <= r²`, the same test the disc
    /// hitboxes use.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        let r2 = r * r;
        for dy in -r..=r {
            let mut span = 0;
            while (span + 1) * (span + 1) + dy * dy <= r2 {
                span += 1;
            }
            self.hline(cx - span, cx + span, cy + dy, color);
        }
    }

    /// Scanline fill; edges are interpolated from the top vertex.
    pub fn fill_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: Color,
    ) {
        let mut pts = [p0, p1, p2];
        pts.sort_unstable_by_key(|p| p.1);
        let [(x0, y0), (x1, y1), (x2, y2)] = pts;

        if y0 == y2 {
            let lo = x0.min(x1).min(x2);
            let hi = x0.max(x1).max(x2);
            self.hline(lo, hi, y0, color);
            return;
        }

        // Upper part includes the middle scanline only for flat-bottomed
        // triangles; otherwise the lower part starts there.
        let last = if y1 == y2 { y1 } else { y1 - 1 };
        let mut y = y0;
        while y <= last {
            let a = x0 + (x1 - x0) * (y - y0) / (y1 - y0);
            let b = x0 + (x2 - x0) * (y - y0) / (y2 - y0);
            self.hline(a, b, y, color);
            y += 1;
        }
        while y <= y2 {
            let a = x1 + (x2 - x1) * (y - y1) / (y2 - y1);
            let b = x0 + (x2 - x0) * (y - y0) / (y2 - y0);
            self.hline(a, b, y, color);
            y += 1;
        }
    }

    fn hline(&mut self, xa: i32, xb: i32, y: i32, color: Color) {
        let (lo, hi) = if xa <= xb { (xa, xb) } else { (xb, xa) };
        for x in lo..=hi {
            self.set(x, y, color);
        }
    }

    /// Shrinks the framebuffer onto `cols x rows` terminal cells, two
    /// sample rows per cell drawn as an upper half block. Each sample takes
    /// the most common non-black colour of the pixels it covers, so thin
    /// shapes such as the bullet survive the reduction.
    pub fn to_half_blocks(&self, cols: usize, rows: usize) -> TextFrame {
        let mut frame = TextFrame::new(cols, rows);
        if cols == 0 || rows == 0 || self.width == 0 || self.height == 0 {
            return frame;
        }

        let sample_rows = rows * 2;
        for row in 0..rows {
            for col in 0..cols {
                let top = self.sample(col, row * 2, cols, sample_rows);
                let bottom = self.sample(col, row * 2 + 1, cols, sample_rows);
                let cell = if top == bottom {
                    Cell {
                        ch: ' ',
                        fg: top,
                        bg: top,
                    }
                } else {
                    Cell {
                        ch: UPPER_HALF_BLOCK,
                        fg: top,
                        bg: bottom,
                    }
                };
                frame.set(col as i32, row as i32, cell);
            }
        }

        frame
    }

    fn sample(&self, sx: usize, sy: usize, sample_cols: usize, sample_rows: usize) -> Color {
        let x0 = sx * self.width / sample_cols;
        let x1 = ((sx + 1) * self.width / sample_cols).max(x0 + 1).min(self.width);
        let y0 = sy * self.height / sample_rows;
        let y1 = ((sy + 1) * self.height / sample_rows)
            .max(y0 + 1)
            .min(self.height);

        let mut counts = [0u32; 16];
        for y in y0..y1 {
            for x in x0..x1 {
                counts[self.get(x, y).index()] += 1;
            }
        }

        let mut best = Color::Black;
        let mut best_count = 0;
        for color in Color::ALL.iter().skip(1) {
            let count = counts[color.index()];
            if count > best_count {
                best = *color;
                best_count = count;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Hitbox;

    fn count(fb: &Framebuffer, color: Color) -> usize {
        let mut total = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.get(x, y) == color {
                    total += 1;
                }
            }
        }
        total
    }

    #[test]
    fn fill_rect_clips_to_buffer() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_rect(-3, 8, 5, 5, Color::Yellow);
        assert_eq!(count(&fb, Color::Yellow), 4);
        assert_eq!(fb.get(0, 8), Color::Yellow);
        assert_eq!(fb.get(1, 9), Color::Yellow);
        assert_eq!(fb.get(2, 9), Color::Black);
    }

    #[test]
    fn fill_circle_matches_disc_hitbox() {
        let mut fb = Framebuffer::new(64, 64);
        fb.fill_circle(30, 28, 15, Color::LightGray);
        let hitbox = Hitbox::Disc {
            cx: 30,
            cy: 28,
            r: 15,
        };

        for y in 0..64 {
            for x in 0..64 {
                let inside = hitbox.contains(x as i32, y as i32);
                assert_eq!(
                    fb.get(x, y) == Color::LightGray,
                    inside,
                    "pixel ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn fill_triangle_covers_vertices_and_interior() {
        let mut fb = Framebuffer::new(40, 40);
        fb.fill_triangle((0, 30), (20, 25), (30, 2), Color::White);

        assert_eq!(fb.get(0, 30), Color::White);
        assert_eq!(fb.get(20, 25), Color::White);
        assert_eq!(fb.get(30, 2), Color::White);
        assert_eq!(fb.get(20, 20), Color::White);
        assert_eq!(fb.get(2, 5), Color::Black);
        assert_eq!(fb.get(35, 30), Color::Black);
    }

    #[test]
    fn degenerate_triangle_draws_a_line() {
        let mut fb = Framebuffer::new(10, 3);
        fb.fill_triangle((7, 1), (2, 1), (4, 1), Color::Red);
        assert_eq!(count(&fb, Color::Red), 6);
    }

    #[test]
    fn half_blocks_keep_thin_shapes_visible() {
        let mut fb = Framebuffer::new(1024, 768);
        fb.fill_rect(510, 400, 3, 10, Color::Yellow);

        let frame = fb.to_half_blocks(128, 48);
        let visible = (0..48).any(|row| {
            (0..128).any(|col| {
                frame
                    .get(col, row)
                    .map(|cell| cell.fg == Color::Yellow || cell.bg == Color::Yellow)
                    .unwrap_or(false)
            })
        });
        assert!(visible);
    }

    #[test]
    fn half_block_cells_split_top_and_bottom() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_rect(0, 0, 4, 2, Color::White);

        let frame = fb.to_half_blocks(4, 2);
        let cell = frame.get(0, 0).unwrap();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.bg, Color::White);

        let frame = fb.to_half_blocks(4, 1);
        let cell = frame.get(0, 0).unwrap();
        assert_eq!(cell.ch, UPPER_HALF_BLOCK);
        assert_eq!(cell.fg, Color::White);
        assert_eq!(cell.bg, Color::Black);
    }
}
