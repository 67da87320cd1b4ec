//! Destinations the terrain generator writes into.

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{ChunkCoord, VoxelGrid};

/// A chunk being generated, plus a route for writes that land outside it.
///
/// Trees near a chunk border spill trunks and canopies into the neighbouring chunks.
/// Local writes go straight into the grid; everything else is handed to
/// [`GenerationTarget::spill`] with world coordinates.
pub trait GenerationTarget {
    /// The coordinate of the chunk being generated.
    fn coord(&self) -> ChunkCoord;

    /// The voxels of the chunk being generated.
    fn grid(&self) -> &VoxelGrid;

    /// Mutable access to the voxels of the chunk being generated.
    fn grid_mut(&mut self) -> &mut VoxelGrid;

    /// Writes a block that belongs to some other chunk.
    ///
    /// Implementations drop the write when that chunk does not exist.
    fn spill(&mut self, world_x: i32, world_y: i32, world_z: i32, block: BlockType);

    /// Writes a block in world coordinates, routing it to the local grid or to `spill`.
    fn set_world(&mut self, world_x: i32, world_y: i32, world_z: i32, block: BlockType) {
        let (coord, x, z) = ChunkCoord::split_world(world_x, world_z);
        if coord == self.coord() {
            self.grid_mut().set(x, world_y, z, block.id());
        } else {
            self.spill(world_x, world_y, world_z, block);
        }
    }
}

/// A block written outside the chunk that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpilledBlock {
    pub world_x: i32,
    pub world_y: i32,
    pub world_z: i32,
    pub block: BlockType,
}

/// A free-standing chunk that keeps its spills instead of forwarding them.
///
/// Useful for generating terrain outside a store, and for comparing two runs of the
/// generator byte for byte.
#[derive(Debug, Clone)]
pub struct DetachedChunk {
    coord: ChunkCoord,
    grid: VoxelGrid,
    spilled: Vec<SpilledBlock>,
}

impl DetachedChunk {
    pub fn new(coord: ChunkCoord) -> Self {
        DetachedChunk {
            coord,
            grid: VoxelGrid::new(),
            spilled: Vec::new(),
        }
    }

    /// Blocks that were written into other chunks, in write order.
    pub fn spilled(&self) -> &[SpilledBlock] {
        &self.spilled
    }
}

impl GenerationTarget for DetachedChunk {
    fn coord(&self) -> ChunkCoord {
        self.coord
    }

    fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    fn spill(&mut self, world_x: i32, world_y: i32, world_z: i32, block: BlockType) {
        self.spilled.push(SpilledBlock {
            world_x,
            world_y,
            world_z,
            block,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_world_routes_by_chunk() {
        let mut chunk = DetachedChunk::new(ChunkCoord::new(-1, 0));
        chunk.set_world(-1, 5, 3, BlockType::LOG);
        chunk.set_world(0, 5, 3, BlockType::LEAF);

        assert_eq!(chunk.grid().block(15, 5, 3), BlockType::LOG);
        assert_eq!(
            chunk.spilled(),
            &[SpilledBlock {
                world_x: 0,
                world_y: 5,
                world_z: 3,
                block: BlockType::LEAF
            }]
        );
    }
}
