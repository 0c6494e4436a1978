/// Terrain kinds and sprite identifiers.
/// Asset ids are centralized here so the scene and the resource
/// provider agree on the same strings.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terrain {
    Grass,
    Stone,
}

impl Terrain {
    /// Asset id of the block image drawn for a row of this terrain.
    pub fn block_asset(self) -> &'static str {
        match self {
            Terrain::Grass => "images/grass-block.png",
            Terrain::Stone => "images/stone-block.png",
        }
    }

    /// Row layout every session starts from (top to bottom).
    pub fn initial_rows() -> [Terrain; 6] {
        [
            Terrain::Grass,
            Terrain::Stone,
            Terrain::Stone,
            Terrain::Stone,
            Terrain::Grass,
            Terrain::Grass,
        ]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    EnemyBug,
    CharBoy,
    GemBlue,
    GemGreen,
    GemOrange,
    Key,
    Heart,
}

impl Sprite {
    pub const GEMS: [Sprite; 3] = [Sprite::GemBlue, Sprite::GemGreen, Sprite::GemOrange];

    pub fn asset_id(self) -> &'static str {
        match self {
            Sprite::EnemyBug  => "images/enemy-bug.png",
            Sprite::CharBoy   => "images/char-boy.png",
            Sprite::GemBlue   => "images/Gem Blue.png",
            Sprite::GemGreen  => "images/Gem Green.png",
            Sprite::GemOrange => "images/Gem Orange.png",
            Sprite::Key       => "images/Key.png",
            Sprite::Heart     => "images/Heart.png",
        }
    }
}

/// Asset ids registered with the resource provider before the first tick.
/// `water-block.png` is loaded with the rest but no terrain row uses it.
pub const ALL_ASSETS: [&str; 12] = [
    "images/Gem Blue.png",
    "images/Gem Green.png",
    "images/Gem Orange.png",
    "images/Heart.png",
    "images/background-block.png",
    "images/empty-block.png",
    "images/stone-block.png",
    "images/water-block.png",
    "images/grass-block.png",
    "images/enemy-bug.png",
    "images/char-boy.png",
    "images/Key.png",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sprite_and_block_is_registered() {
        let sprites = [
            Sprite::EnemyBug, Sprite::CharBoy, Sprite::GemBlue,
            Sprite::GemGreen, Sprite::GemOrange, Sprite::Key, Sprite::Heart,
        ];
        for s in sprites {
            assert!(ALL_ASSETS.contains(&s.asset_id()), "{:?} not registered", s);
        }
        for t in [Terrain::Grass, Terrain::Stone] {
            assert!(ALL_ASSETS.contains(&t.block_asset()));
        }
    }

    #[test]
    fn initial_rows_start_and_end_on_grass() {
        let rows = Terrain::initial_rows();
        assert_eq!(rows[0], Terrain::Grass);
        assert_eq!(rows[1..4], [Terrain::Stone; 3]);
        assert_eq!(rows[4..], [Terrain::Grass; 2]);
    }
}
