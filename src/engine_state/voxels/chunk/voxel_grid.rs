//! # Voxel Grid
//!
//! Dense one-byte-per-voxel storage for a single chunk.
//!
//! ## Layout
//!
//! Local coordinates are packed into a linear index as `x | z | y` from the most to the
//! least significant bits, each field exactly as wide as its dimension needs:
//!
//! ```text
//! index = (x << (Z_BITS + Y_BITS)) | (z << Y_BITS) | y
//! ```
//!
//! With the 16 x 128 x 16 reference dimensions that is `x << 11 | z << 7 | y`, so a
//! whole column is contiguous in memory, which is the access pattern of both the
//! terrain generator and the surface queries.

use super::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::block::BlockTypeSize;

/// Number of bits needed to index `0..dimension`.
const fn bits_for(dimension: i32) -> u32 {
    let mut bits = 0;
    while (1 << bits) < dimension {
        bits += 1;
    }
    bits
}

const Y_BITS: u32 = bits_for(CHUNK_HEIGHT);
const Z_BITS: u32 = bits_for(CHUNK_DEPTH);
const X_BITS: u32 = bits_for(CHUNK_WIDTH);

/// Number of slots in the backing array.
pub const GRID_LEN: usize = 1 << (X_BITS + Z_BITS + Y_BITS);

/// Block ids for every voxel of one chunk.
///
/// Reads outside the grid return AIR and writes outside it are ignored. Neighbour
/// probing at chunk edges relies on this instead of checking bounds itself.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    blocks: Box<[BlockTypeSize]>,
}

impl VoxelGrid {
    /// Creates a grid filled with AIR.
    pub fn new() -> Self {
        VoxelGrid {
            blocks: vec![BlockType::AIR.id(); GRID_LEN].into_boxed_slice(),
        }
    }

    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if !Self::in_bounds(x, y, z) {
            return None;
        }
        Some(((x << (Z_BITS + Y_BITS)) | (z << Y_BITS) | y) as usize)
    }

    /// Whether local coordinates address a voxel of this grid.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_DEPTH).contains(&z)
    }

    /// The raw block id at local coordinates, or AIR's id when out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        match Self::index(x, y, z) {
            Some(index) => self.blocks[index],
            None => BlockType::AIR.id(),
        }
    }

    /// The block at local coordinates. Ids without a known block read as AIR.
    pub fn block(&self, x: i32, y: i32, z: i32) -> BlockType {
        BlockType::from_id(self.get(x, y, z)).unwrap_or(BlockType::AIR)
    }

    /// Writes a block id at local coordinates.
    ///
    /// # Returns
    /// `true` if the coordinates were in bounds and the stored value changed.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockTypeSize) -> bool {
        match Self::index(x, y, z) {
            Some(index) if self.blocks[index] != block => {
                self.blocks[index] = block;
                true
            }
            _ => false,
        }
    }

    /// Whether every voxel is AIR.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == BlockType::AIR.id())
    }

    /// The raw bytes in storage order.
    pub fn as_bytes(&self) -> &[BlockTypeSize] {
        &self.blocks
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let solid = self
            .blocks
            .iter()
            .filter(|&&b| b != BlockType::AIR.id())
            .count();
        f.debug_struct("VoxelGrid").field("solid", &solid).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_reference_dimensions() {
        assert_eq!((X_BITS, Z_BITS, Y_BITS), (4, 4, 7));
        assert_eq!(GRID_LEN, 16 * 16 * 128);
        assert_eq!(VoxelGrid::index(1, 0, 0), Some(1 << 11));
        assert_eq!(VoxelGrid::index(0, 0, 1), Some(1 << 7));
        assert_eq!(VoxelGrid::index(15, 127, 15), Some(GRID_LEN - 1));
    }

    #[test]
    fn set_then_get_returns_the_block_everywhere_in_bounds() {
        let mut grid = VoxelGrid::new();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                for y in (0..CHUNK_HEIGHT).step_by(7) {
                    let block = ((x + y + z) % 9) as u8;
                    grid.set(x, y, z, block);
                    assert_eq!(grid.get(x, y, z), block);
                }
            }
        }
    }

    #[test]
    fn out_of_bounds_reads_are_air_and_writes_are_ignored() {
        let mut grid = VoxelGrid::new();
        let outside = [
            (-1, 0, 0),
            (0, -1, 0),
            (0, 0, -1),
            (CHUNK_WIDTH, 0, 0),
            (0, CHUNK_HEIGHT, 0),
            (0, 0, CHUNK_DEPTH),
            (i32::MIN, i32::MAX, 3),
        ];
        for (x, y, z) in outside {
            assert!(!grid.set(x, y, z, BlockType::STONE.id()));
            assert_eq!(grid.get(x, y, z), BlockType::AIR.id());
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn set_reports_whether_the_value_changed() {
        let mut grid = VoxelGrid::new();
        assert!(grid.set(2, 3, 4, BlockType::DIRT.id()));
        assert!(!grid.set(2, 3, 4, BlockType::DIRT.id()));
        assert_eq!(grid.block(2, 3, 4), BlockType::DIRT);
    }
}
