/// Terminal drawing context: a pixel canvas mapped onto a double-buffered,
/// diff-flushed grid of terminal cells.
///
/// How it works:
///   1. `begin_frame` clears the `front` buffer
///   2. Draw calls map canvas pixels to cells and paint into `front`
///   3. `present` compares each cell with `back` (previous frame) and only
///      emits terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Scale: the canvas is squeezed into `COLS` × `ROWS` cells, so one cell
/// covers roughly 17 × 29 canvas pixels. Text ignores font size and takes
/// one cell per character on the row containing its baseline.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use super::canvas::{DrawContext, Rgb, TextAlign};
use super::resources::{Image, Look, FACE_H, FACE_TOP};

pub const COLS: usize = 48;
pub const ROWS: usize = 24;

/// Highlight behind an enlarged sprite (the player who was just hit).
const HIT_BG: Color = Color::Rgb { r: 200, g: 40, b: 40 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for cells nothing was drawn on. Same RGB
    /// is used for `Clear`, so gaps between rows match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    /// Differs from any real cell, so every position gets diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            Some(&mut self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Put a character, keeping the background already there. Overwriting
    /// either half of a wide glyph blanks the other half.
    fn put_char(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        self.break_wide(x, y);
        if let Some(c) = self.get_mut(x, y) {
            c.ch = ch;
            c.fg = fg;
            c.wide = false;
            c.cont = false;
        }
    }

    fn put_wide(&mut self, x: usize, y: usize, ch: char, fg: Color, bg: Option<Color>) {
        if x + 1 >= self.width || y >= self.height { return; }
        self.break_wide(x, y);
        self.break_wide(x + 1, y);
        if let Some(c) = self.get_mut(x, y) {
            c.ch = ch;
            c.fg = fg;
            c.wide = true;
            c.cont = false;
            if let Some(bg) = bg { c.bg = bg; }
        }
        let left_bg = self.get(x, y).bg;
        if let Some(c) = self.get_mut(x + 1, y) {
            c.ch = ' ';
            c.bg = left_bg;
            c.wide = false;
            c.cont = true;
        }
    }

    fn paint_bg(&mut self, x: usize, y: usize, bg: Color) {
        self.break_wide(x, y);
        if let Some(c) = self.get_mut(x, y) {
            *c = Cell { bg, ..Cell::BLANK };
        }
    }

    fn break_wide(&mut self, x: usize, y: usize) {
        let here = self.get(x, y);
        if here.cont && x > 0 {
            if let Some(c) = self.get_mut(x - 1, y) {
                c.ch = ' ';
                c.wide = false;
            }
        }
        if here.wide {
            if let Some(c) = self.get_mut(x + 1, y) {
                c.cont = false;
                c.ch = ' ';
            }
        }
    }
}

// ── Style ──

#[derive(Clone, Copy)]
struct Style {
    fill: Rgb,
    stroke: Rgb,
    line_width: f32,
    align: TextAlign,
}

fn color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── TerminalCanvas ──

pub struct TerminalCanvas {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    canvas_w: f32,
    canvas_h: f32,
    style: Style,
    /// Top-left of the game area inside the terminal.
    origin: (u16, u16),
}

impl TerminalCanvas {
    pub fn new(canvas_w: f32, canvas_h: f32) -> Self {
        TerminalCanvas {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(COLS, ROWS),
            back: FrameBuffer::new(COLS, ROWS),
            canvas_w,
            canvas_h,
            style: Style {
                fill: Rgb::BLACK,
                stroke: Rgb::BLACK,
                line_width: 1.0,
                align: TextAlign::Left,
            },
            origin: (0, 0),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.origin = Self::centered_origin(terminal::size().unwrap_or((80, 24)));
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn centered_origin((tw, th): (u16, u16)) -> (u16, u16) {
        (
            (tw as usize).saturating_sub(COLS) as u16 / 2,
            (th as usize).saturating_sub(ROWS) as u16 / 2,
        )
    }

    /// Start composing a new frame. Picks up terminal resizes.
    pub fn begin_frame(&mut self) -> io::Result<()> {
        let origin = Self::centered_origin(terminal::size().unwrap_or((80, 24)));
        if origin != self.origin {
            self.origin = origin;
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.front.clear();
        Ok(())
    }

    /// Emit the composed frame.
    pub fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;
        let (ox, oy) = self.origin;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(ox + x as u16, oy + y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Pixel → cell mapping ──

    fn px_per_col(&self) -> f32 {
        self.canvas_w / COLS as f32
    }

    fn px_per_row(&self) -> f32 {
        self.canvas_h / ROWS as f32
    }

    /// Cells whose centers fall inside the pixel span `[a, b)`.
    fn span(a: f32, b: f32, per: f32, max: usize) -> std::ops::Range<usize> {
        let lo = (a / per).round().clamp(0.0, max as f32) as usize;
        let hi = (b / per).round().clamp(0.0, max as f32) as usize;
        lo..hi.max(lo)
    }

    fn col_at(&self, x: f32) -> Option<usize> {
        let c = (x / self.px_per_col()).floor();
        (c >= 0.0 && c < COLS as f32).then_some(c as usize)
    }

    fn row_at(&self, y: f32) -> Option<usize> {
        let r = (y / self.px_per_row()).floor();
        (r >= 0.0 && r < ROWS as f32).then_some(r as usize)
    }

    fn fill_cells(&mut self, x: f32, y: f32, w: f32, h: f32, bg: Color) {
        let cols = Self::span(x, x + w, self.px_per_col(), COLS);
        let rows = Self::span(y, y + h, self.px_per_row(), ROWS);
        for r in rows {
            for c in cols.clone() {
                self.front.paint_bg(c, r, bg);
            }
        }
    }

    /// Cell index of the first character of `len` chars anchored at `x`.
    fn text_start(&self, x: f32, len: usize) -> i32 {
        let anchor = (x / self.px_per_col()).round() as i32;
        match self.style.align {
            TextAlign::Left => anchor,
            TextAlign::Center => anchor - len as i32 / 2,
            TextAlign::Right => anchor - len as i32,
        }
    }

    #[cfg(test)]
    fn cell(&self, x: usize, y: usize) -> Cell {
        self.front.get(x, y)
    }
}

impl DrawContext for TerminalCanvas {
    fn size(&self) -> (f32, f32) {
        (self.canvas_w, self.canvas_h)
    }

    fn draw_image(&mut self, image: &Image, x: f32, y: f32) {
        self.draw_image_scaled(image, x, y, image.width, image.height);
    }

    fn draw_image_scaled(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32) {
        let sy = h / image.height;
        match image.look {
            Look::Swatch(rgb) => {
                self.fill_cells(x, y + FACE_TOP * sy, w, FACE_H * sy, color(rgb));
            }
            Look::Glyph { ch, wide } => {
                // Glyph sits in the middle of the face of the block it stands on.
                let cx = x + w / 2.0;
                let cy = y + (FACE_TOP + SPRITE_FACE_DROP + FACE_H / 2.0) * sy;
                let (Some(mut col), Some(row)) = (self.col_at(cx), self.row_at(cy)) else {
                    return;
                };
                let highlight = (w > image.width).then_some(HIT_BG);
                if wide {
                    col = col.saturating_sub(1);
                    self.front.put_wide(col, row, ch, Color::White, highlight);
                } else {
                    self.front.put_char(col, row, ch, Color::White);
                    if let (Some(bg), Some(c)) = (highlight, self.front.get_mut(col, row)) {
                        c.bg = bg;
                    }
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let bg = color(self.style.fill);
        self.fill_cells(x, y, w, h, bg);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let fg = color(self.style.stroke);
        let cols = Self::span(x, x + w, self.px_per_col(), COLS);
        let rows = Self::span(y, y + h, self.px_per_row(), ROWS);
        if cols.is_empty() || rows.is_empty() { return; }
        let (l, r) = (cols.start, cols.end - 1);
        let (t, b) = (rows.start, rows.end - 1);
        for c in l..=r {
            self.front.put_char(c, t, '─', fg);
            self.front.put_char(c, b, '─', fg);
        }
        for row in t..=b {
            self.front.put_char(l, row, '│', fg);
            self.front.put_char(r, row, '│', fg);
        }
        self.front.put_char(l, t, '┌', fg);
        self.front.put_char(r, t, '┐', fg);
        self.front.put_char(l, b, '└', fg);
        self.front.put_char(r, b, '┘', fg);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        // y is the baseline; the glyphs sit just above it.
        let Some(row) = self.row_at(y - 1.0) else { return };
        let fg = color(self.style.fill);
        let len = text.chars().count();
        let start = self.text_start(x, len);
        for (i, ch) in text.chars().enumerate() {
            let c = start + i as i32;
            if c < 0 { continue; }
            if c as usize >= COLS { break; }
            self.front.put_char(c as usize, row, ch, fg);
        }
    }

    fn stroke_text(&mut self, _text: &str, _x: f32, _y: f32) {
        // Outlines do not exist at cell resolution.
    }

    fn set_fill_style(&mut self, c: &str) {
        if let Some(rgb) = Rgb::parse(c) { self.style.fill = rgb; }
    }

    fn set_stroke_style(&mut self, c: &str) {
        if let Some(rgb) = Rgb::parse(c) { self.style.stroke = rgb; }
    }

    fn set_line_width(&mut self, width: f32) {
        self.style.line_width = width;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.style.align = align;
    }

    fn set_font(&mut self, _font: &str) {}

    fn line_width(&self) -> f32 {
        self.style.line_width
    }
}

/// Sprites are lifted above their row; this brings the glyph back down
/// onto the face of the block underneath.
const SPRITE_FACE_DROP: f32 = 25.0;
