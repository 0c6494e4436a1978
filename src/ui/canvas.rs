/// Drawing-context interface.
///
/// A stateful, canvas-like surface in pixel coordinates (origin top-left).
/// Style setters affect every later draw call until changed again.
/// The scene code only talks to this trait; `TerminalCanvas` is the
/// concrete surface used at runtime.

use super::resources::Image;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse a CSS color: `#rrggbb`, `#rgb` or one of the few named colors
    /// the game uses.
    pub fn parse(s: &str) -> Option<Rgb> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
            return match hex.len() {
                6 => Some(Rgb {
                    r: u8::from_str_radix(&hex[0..2], 16).ok()?,
                    g: u8::from_str_radix(&hex[2..4], 16).ok()?,
                    b: u8::from_str_radix(&hex[4..6], 16).ok()?,
                }),
                3 => Some(Rgb {
                    r: digit(0)? * 17,
                    g: digit(1)? * 17,
                    b: digit(2)? * 17,
                }),
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "white" => Some(Rgb::WHITE),
            "black" => Some(Rgb::BLACK),
            "green" => Some(Rgb { r: 0, g: 128, b: 0 }),
            "red"   => Some(Rgb { r: 255, g: 0, b: 0 }),
            "blue"  => Some(Rgb { r: 0, g: 0, b: 255 }),
            "gray" | "grey" => Some(Rgb { r: 128, g: 128, b: 128 }),
            _ => None,
        }
    }
}

pub trait DrawContext {
    /// Surface size in pixels.
    fn size(&self) -> (f32, f32);

    /// Draw at the image's natural size.
    fn draw_image(&mut self, image: &Image, x: f32, y: f32);
    fn draw_image_scaled(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);

    /// Colors are CSS strings. Unknown colors leave the style unchanged.
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f32);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_font(&mut self, font: &str);

    fn line_width(&self) -> f32;
}

// ── Test double ──
