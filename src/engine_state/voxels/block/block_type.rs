//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and the
//! per-type parameters the rest of the engine consults.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types the terrain generator can produce.
///
/// The discriminants are the on-grid block ids; they are stored one byte per voxel
/// and are stable across runs, which keeps regeneration byte-identical.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Also the sentinel returned for every out-of-range read.
    AIR = 0,
    /// Grass-topped dirt, placed on the surface of moist columns above sea level.
    GRASS = 1,
    /// Bulk rock below the surface layer.
    STONE = 2,
    /// Surface layer of moist columns.
    DIRT = 3,
    /// Tree trunk.
    LOG = 4,
    /// Tree canopy. Does not occlude light or neighbours.
    LEAF = 5,
    /// Beaches and dry lowlands.
    SAND = 6,
    /// Indestructible floor of every column.
    BEDROCK = 7,
    /// Fills empty space up to sea level.
    WATER = 8,
}

impl BlockType {
    /// Looks up a block type from its stored id.
    ///
    /// # Returns
    /// `None` if the id does not correspond to a known block.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The compact id stored in voxel grids.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this is the empty block.
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }
}
