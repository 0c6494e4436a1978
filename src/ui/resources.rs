/// Resource-provider interface and the built-in sprite sheet.
///
/// The game asks for images by asset id (`"images/enemy-bug.png"`).
/// On the terminal there are no PNGs: `SpriteSheet` "decodes" each id into
/// a glyph or a color swatch with the pixel size of the PNG art, so
/// layout math stays in pixels.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::canvas::Rgb;

/// How an image shows up on a character grid.
#[derive(Clone, Debug, PartialEq)]
pub enum Look {
    /// A single (possibly wide) glyph centered on the image's face.
    Glyph { ch: char, wide: bool },
    /// Solid color over the image's face.
    Swatch(Rgb),
}

/// A decoded image handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub look: Look,
}

/// Block and character art share one frame size.
pub const SPRITE_W: f32 = 101.0;
pub const SPRITE_H: f32 = 171.0;

/// Top of the visible face inside a sprite frame. Everything above is
/// transparent headroom in the PNG art.
pub const FACE_TOP: f32 = 50.0;
/// Height of the visible face of a block.
pub const FACE_H: f32 = 83.0;

pub trait ResourceProvider {
    /// Register assets to make available.
    fn load(&mut self, ids: &[&str]);

    /// Run `callback` once every registered asset is available. Runs it
    /// immediately if that is already the case.
    fn on_ready(&mut self, callback: Box<dyn FnOnce()>);

    /// Look up a loaded image.
    fn get(&self, id: &str) -> &Image;
}

pub struct SpriteSheet {
    images: HashMap<String, Image>,
    pending: Vec<Box<dyn FnOnce()>>,
    /// Set once `load` has decoded its ids.
    loaded: bool,
    missing: Image,
}

impl SpriteSheet {
    pub fn new() -> Self {
        SpriteSheet {
            images: HashMap::new(),
            pending: Vec::new(),
            loaded: false,
            missing: Image {
                id: "missing".into(),
                width: SPRITE_W,
                height: SPRITE_H,
                look: Look::Glyph { ch: '?', wide: false },
            },
        }
    }

    fn decode(id: &str) -> Option<Look> {
        let glyph = |ch: char| Some(Look::Glyph { ch, wide: true });
        let swatch = |r, g, b| Some(Look::Swatch(Rgb { r, g, b }));
        match id {
            "images/enemy-bug.png"  => glyph('🐞'),
            "images/char-boy.png"   => glyph('🧒'),
            "images/Gem Blue.png"   => glyph('💎'),
            "images/Gem Green.png"  => glyph('🟢'),
            "images/Gem Orange.png" => glyph('🔶'),
            "images/Key.png"        => glyph('🔑'),
            "images/Heart.png"      => glyph('❤'),
            "images/grass-block.png"      => swatch(74, 160, 60),
            "images/stone-block.png"      => swatch(150, 150, 150),
            "images/water-block.png"      => swatch(60, 110, 210),
            "images/empty-block.png"      => swatch(40, 40, 40),
            "images/background-block.png" => swatch(22, 22, 35),
            _ => None,
        }
    }

    /// Built-in art decodes synchronously, so everything registered is
    /// available as soon as `load` has run once.
    fn is_ready(&self) -> bool {
        self.loaded
    }

    fn fire_ready(&mut self) {
        if !self.is_ready() { return; }
        for cb in self.pending.drain(..) {
            cb();
        }
    }
}

impl ResourceProvider for SpriteSheet {
    fn load(&mut self, ids: &[&str]) {
        for &id in ids {
            if self.images.contains_key(id) { continue; }
            match Self::decode(id) {
                Some(look) => {
                    self.images.insert(id.to_string(), Image {
                        id: id.to_string(),
                        width: SPRITE_W,
                        height: SPRITE_H,
                        look,
                    });
                }
                None => warn!(id, "no built-in art for asset"),
            }
        }
        debug!(count = self.images.len(), "sprite sheet loaded");
        self.loaded = true;
        self.fire_ready();
    }

    fn on_ready(&mut self, callback: Box<dyn FnOnce()>) {
        self.pending.push(callback);
        self.fire_ready();
    }

    fn get(&self, id: &str) -> &Image {
        self.images.get(id).unwrap_or(&self.missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::ALL_ASSETS;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn every_game_asset_has_art() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&ALL_ASSETS);
        for id in ALL_ASSETS {
            let img = sheet.get(id);
            assert_eq!(img.id, id);
            assert_eq!((img.width, img.height), (SPRITE_W, SPRITE_H));
        }
    }

    #[test]
    fn unknown_id_resolves_to_placeholder() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&["images/dragon.png"]);
        assert_eq!(sheet.get("images/dragon.png").id, "missing");
    }

    fn counter(sheet: &mut SpriteSheet) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        sheet.on_ready(Box::new(move || c.set(c.get() + 1)));
        count
    }

    #[test]
    fn ready_callback_waits_for_load() {
        let mut sheet = SpriteSheet::new();
        let count = counter(&mut sheet);
        assert!(!sheet.is_ready());
        assert_eq!(count.get(), 0);

        sheet.load(&ALL_ASSETS);
        assert!(sheet.is_ready());
        assert_eq!(count.get(), 1);

        sheet.load(&["images/Key.png"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn callback_registered_after_load_runs_immediately() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&ALL_ASSETS);
        let count = counter(&mut sheet);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn blocks_are_swatches_and_actors_are_glyphs() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&ALL_ASSETS);
        assert!(matches!(sheet.get("images/grass-block.png").look, Look::Swatch(_)));
        assert!(matches!(sheet.get("images/enemy-bug.png").look, Look::Glyph { wide: true, .. }));
    }
}
