//! # Block Module
//!
//! This module provides the block-related definitions shared by generation and meshing:
//! block type ids and faces plus the static per-face texture table.

use block_side::BlockSide;
use block_type::BlockType;
use phf::phf_map;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in voxel grids.
pub type BlockTypeSize = u8;

/// Number of tiles along one edge of the terrain texture atlas.
pub const ATLAS_TILES: u32 = 16;

/// A tile position in the terrain texture atlas, in whole tiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureTile {
    pub s: u32,
    pub t: u32,
}

impl TextureTile {
    const fn new(s: u32, t: u32) -> Self {
        TextureTile { s, t }
    }

    /// Normalised atlas coordinates of a tile corner.
    ///
    /// `du` and `dv` select the corner: `0` for the tile's minimum edge, `1` for its
    /// maximum edge.
    pub fn uv(self, du: u32, dv: u32) -> [f32; 2] {
        [
            (self.s + du) as f32 / ATLAS_TILES as f32,
            (self.t + dv) as f32 / ATLAS_TILES as f32,
        ]
    }
}

/// Per-face texture assignment for one block type.
///
/// `all` is used for every face that has no explicit entry.
#[derive(Copy, Clone, Debug)]
pub struct BlockTextures {
    pub all: TextureTile,
    pub top: Option<TextureTile>,
    pub bottom: Option<TextureTile>,
    pub left: Option<TextureTile>,
    pub right: Option<TextureTile>,
    pub front: Option<TextureTile>,
    pub back: Option<TextureTile>,
}

impl BlockTextures {
    const fn uniform(s: u32, t: u32) -> Self {
        BlockTextures {
            all: TextureTile::new(s, t),
            top: None,
            bottom: None,
            left: None,
            right: None,
            front: None,
            back: None,
        }
    }

    const fn capped(all: TextureTile, top: TextureTile, bottom: TextureTile) -> Self {
        BlockTextures {
            all,
            top: Some(top),
            bottom: Some(bottom),
            left: None,
            right: None,
            front: None,
            back: None,
        }
    }

    /// The tile for one face, falling back to `all`.
    pub fn for_side(&self, side: BlockSide) -> TextureTile {
        let explicit = match side {
            BlockSide::TOP => self.top,
            BlockSide::BOTTOM => self.bottom,
            BlockSide::LEFT => self.left,
            BlockSide::RIGHT => self.right,
            BlockSide::FRONT => self.front,
            BlockSide::BACK => self.back,
        };
        explicit.unwrap_or(self.all)
    }
}

/// Maps each drawable block id to its atlas tiles. AIR has no entry.
pub static BLOCK_TEXTURES: phf::Map<u8, BlockTextures> = phf_map! {
    1u8 => BlockTextures::capped(TextureTile::new(3, 0), TextureTile::new(0, 0), TextureTile::new(2, 0)),
    2u8 => BlockTextures::uniform(1, 0),
    3u8 => BlockTextures::uniform(2, 0),
    4u8 => BlockTextures::capped(TextureTile::new(4, 1), TextureTile::new(5, 1), TextureTile::new(5, 1)),
    5u8 => BlockTextures::uniform(4, 3),
    6u8 => BlockTextures::uniform(2, 1),
    7u8 => BlockTextures::uniform(1, 1),
    8u8 => BlockTextures::uniform(0, 9),
};

/// Looks up the atlas tile for a face of a block.
///
/// # Returns
/// `None` for AIR and for ids with no texture entry.
pub fn texture_for(block: BlockType, side: BlockSide) -> Option<TextureTile> {
    BLOCK_TEXTURES
        .get(&block.id())
        .map(|textures| textures.for_side(side))
}
