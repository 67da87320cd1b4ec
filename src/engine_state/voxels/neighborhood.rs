//! Cross-chunk voxel reads for the mesher.
//!
//! A face on the edge of a chunk is visible or hidden depending on the voxel across the
//! border. [`ChunkNeighborhood`] resolves a chunk and its four side neighbours in one
//! pass over the store, so the mesher can read across borders without going back to
//! the store's map for every voxel.

use std::sync::{Arc, RwLockReadGuard};

use super::block::block_type::BlockType;
use super::chunk::{Chunk, ChunkCoord, VoxelGrid};

/// Offsets of the four side neighbours, in the order they are stored.
const SIDES: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A chunk together with whichever of its side neighbours were loaded.
pub struct ChunkNeighborhood {
    center: Arc<Chunk>,
    sides: [Option<Arc<Chunk>>; 4],
}

impl ChunkNeighborhood {
    /// Resolves the side neighbours of `center` with a lookup function.
    pub fn new(center: Arc<Chunk>, resolve: impl Fn(ChunkCoord) -> Option<Arc<Chunk>>) -> Self {
        let coord = center.coord();
        let sides = SIDES.map(|(dx, dz)| resolve(coord.offset(dx, dz)));
        ChunkNeighborhood { center, sides }
    }

    pub fn center(&self) -> &Arc<Chunk> {
        &self.center
    }

    /// Takes shared locks on the center grid and every loaded neighbour grid.
    pub fn lock(&self) -> NeighborhoodView<'_> {
        NeighborhoodView {
            coord: self.center.coord(),
            center: self.center.grid(),
            sides: self.sides.each_ref().map(|side| side.as_ref().map(|c| c.grid())),
        }
    }
}

/// Locked grids of a [`ChunkNeighborhood`].
pub struct NeighborhoodView<'a> {
    coord: ChunkCoord,
    center: RwLockReadGuard<'a, VoxelGrid>,
    sides: [Option<RwLockReadGuard<'a, VoxelGrid>>; 4],
}

impl NeighborhoodView<'_> {
    pub fn center(&self) -> &VoxelGrid {
        &self.center
    }

    /// The block at a world position.
    ///
    /// Positions in the center chunk or a loaded side neighbour read from its grid;
    /// anything else, including diagonal neighbours, reads as AIR.
    pub fn block_world(&self, world_x: i32, world_y: i32, world_z: i32) -> BlockType {
        let (coord, x, z) = ChunkCoord::split_world(world_x, world_z);
        if coord == self.coord {
            return self.center.block(x, world_y, z);
        }

        let delta = (coord.x - self.coord.x, coord.z - self.coord.z);
        SIDES
            .iter()
            .position(|&side| side == delta)
            .and_then(|index| self.sides[index].as_ref())
            .map_or(BlockType::AIR, |grid| grid.block(x, world_y, z))
    }
}
