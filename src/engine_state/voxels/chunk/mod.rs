//! # Chunk Module
//!
//! This module provides the `Chunk` struct, the unit of generation, meshing and eviction.
//! A chunk is a full-height column of `CHUNK_WIDTH x CHUNK_HEIGHT x CHUNK_DEPTH` voxels.
//!
//! ## Lifecycle
//!
//! 1. **Created**: all voxels are AIR, `dirty` and `resident` are false
//! 2. **Generated**: the terrain generator filled the grid, `dirty` is true
//! 3. **Meshed**: the mesher built a pending mesh, `dirty` is false, `resident` is true
//! 4. **Active**: the render consumer promoted the pending mesh and draws it each frame
//! 5. **Evicted**: `resident` is false; the renderer sinks the chunk out of view
//!
//! Any voxel change flips `dirty` back on, sending the chunk around the loop again.
//!
//! ## Thread Safety
//!
//! The voxel grid sits behind its own `MtResource`, so the generator and the mesher can
//! work on different chunks without touching the store's map lock. The two flags are
//! atomics because the schedulers read them for every chunk on every tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::mesh::MeshSlots;

use super::block::block_type::BlockType;

pub mod chunk_coord;
pub mod voxel_grid;

pub use chunk_coord::ChunkCoord;
pub use voxel_grid::VoxelGrid;

/// Width of a chunk in blocks (world X).
pub const CHUNK_WIDTH: i32 = 16;
/// Depth of a chunk in blocks (world Z).
pub const CHUNK_DEPTH: i32 = 16;
/// Height of a chunk in blocks (world Y). Chunks span the whole vertical extent.
pub const CHUNK_HEIGHT: i32 = 128;

/// A column of voxels at a fixed chunk coordinate.
pub struct Chunk {
    coord: ChunkCoord,
    grid: MtResource<VoxelGrid>,
    dirty: AtomicBool,
    resident: AtomicBool,
    /// Mesh double buffer. Only present on chunks that are meant to be drawn.
    render_state: Option<MeshSlots>,
}

impl Chunk {
    /// Creates an empty chunk that can be meshed and drawn.
    ///
    /// # Arguments
    /// * `coord` - The chunk coordinate the chunk will be stored under
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            render_state: Some(MeshSlots::default()),
            ..Self::headless(coord)
        }
    }

    /// Creates an empty chunk with no mesh slots.
    ///
    /// Headless chunks hold voxels only; the mesher skips them and the renderer never
    /// sees them.
    pub fn headless(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            grid: MtResource::new(VoxelGrid::new()),
            dirty: AtomicBool::new(false),
            resident: AtomicBool::new(false),
            render_state: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The mesh slots, if this chunk is renderable.
    pub fn render_state(&self) -> Option<&MeshSlots> {
        self.render_state.as_ref()
    }

    /// Shared access to the voxel grid.
    pub fn grid(&self) -> RwLockReadGuard<'_, VoxelGrid> {
        self.grid.get()
    }

    /// Exclusive access to the voxel grid.
    ///
    /// Writes made through the guard do not touch the dirty flag; callers that change
    /// voxels this way must call [`Chunk::mark_dirty`] themselves.
    pub fn grid_mut(&self) -> RwLockWriteGuard<'_, VoxelGrid> {
        self.grid.get_mut()
    }

    /// The block at local coordinates, AIR when out of bounds.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.grid().block(x, y, z)
    }

    /// Writes a block at local coordinates and marks the chunk dirty if anything changed.
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: BlockType) {
        if self.grid_mut().set(x, y, z, block.id()) {
            self.mark_dirty();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clears the dirty flag, returning whether it was set.
    ///
    /// The mesher clears the flag before it reads the grid, so a write that lands during
    /// the scan is never lost: it re-sets the flag and triggers another build.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn is_resident(&self) -> bool {
        self.resident.load(Ordering::Acquire)
    }

    pub fn set_resident(&self, resident: bool) {
        self.resident.store(resident, Ordering::Release);
    }

    /// Drops the chunk out of the working set.
    ///
    /// The voxels are kept. The chunk is flagged dirty so that it is meshed again, and
    /// becomes resident again, if it comes back into view before it is purged.
    pub fn unload(&self) {
        self.set_resident(false);
        self.mark_dirty();
    }

    /// The height of the highest non-AIR voxel in a column.
    ///
    /// # Returns
    /// `None` if the column is out of bounds or entirely AIR.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        let grid = self.grid();
        (0..CHUNK_HEIGHT)
            .rev()
            .find(|&y| !grid.block(x, y, z).is_air())
    }

    /// The first AIR voxel found scanning a column upward from the bottom.
    ///
    /// Returns `CHUNK_HEIGHT - 1` when the column is full.
    pub fn ground_level(&self, x: i32, z: i32) -> i32 {
        let grid = self.grid();
        (0..CHUNK_HEIGHT)
            .find(|&y| grid.block(x, y, z).is_air())
            .unwrap_or(CHUNK_HEIGHT - 1)
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("dirty", &self.is_dirty())
            .field("resident", &self.is_resident())
            .field("renderable", &self.render_state.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty_clean_and_not_resident() {
        let chunk = Chunk::new(ChunkCoord::new(2, -3));
        assert!(chunk.grid().is_empty());
        assert!(!chunk.is_dirty());
        assert!(!chunk.is_resident());
        assert!(chunk.render_state().is_some());
        assert!(Chunk::headless(ChunkCoord::new(0, 0)).render_state().is_none());
    }

    #[test]
    fn set_block_marks_dirty_only_on_change() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_block(1, 1, 1, BlockType::AIR);
        assert!(!chunk.is_dirty());

        chunk.set_block(1, 1, 1, BlockType::STONE);
        assert!(chunk.take_dirty());
        assert!(!chunk.is_dirty());

        chunk.set_block(-1, 1, 1, BlockType::STONE);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn unload_clears_residency_and_requests_a_rebuild() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_resident(true);
        chunk.unload();
        assert!(!chunk.is_resident());
        assert!(chunk.is_dirty());
    }

    #[test]
    fn surface_queries_scan_the_column() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        assert_eq!(chunk.surface_height(4, 4), None);
        assert_eq!(chunk.ground_level(4, 4), 0);

        for y in 0..10 {
            chunk.set_block(4, y, 4, BlockType::STONE);
        }
        chunk.set_block(4, 20, 4, BlockType::LEAF);

        assert_eq!(chunk.surface_height(4, 4), Some(20));
        assert_eq!(chunk.ground_level(4, 4), 10);
        assert_eq!(chunk.surface_height(CHUNK_WIDTH, 4), None);
    }
}
