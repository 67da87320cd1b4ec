//! # Chunk Store
//!
//! The spatial index of every chunk in the working set. All structural changes (insert,
//! remove) happen under a single map lock; per-chunk voxel access goes through each
//! chunk's own grid lock.
//!
//! ## Lock Order
//!
//! The map lock may be held while taking a chunk's grid lock, never the other way round.
//! Code that needs several grids (the mesher, see [`ChunkStore::neighborhood`]) resolves
//! the chunks and releases the map before locking any grid.

use std::collections::HashMap;
use std::sync::{Arc, RwLockWriteGuard};

use log::{debug, trace};

use super::block::block_type::BlockType;
use super::block::BlockTypeSize;
use super::chunk::{Chunk, ChunkCoord, VoxelGrid};
use super::generation::{GenerationTarget, TerrainGenerator};
use super::neighborhood::ChunkNeighborhood;
use crate::core::MtResource;

/// Owns every loaded chunk, keyed by chunk coordinate.
///
/// Shared between the scheduler threads and the render consumer behind an `Arc`.
pub struct ChunkStore {
    chunks: MtResource<HashMap<ChunkCoord, Arc<Chunk>>>,
    generator: TerrainGenerator,
}

impl ChunkStore {
    /// Creates an empty store that generates terrain with the given generator.
    pub fn new(generator: TerrainGenerator) -> Self {
        ChunkStore {
            chunks: MtResource::new(HashMap::new()),
            generator,
        }
    }

    /// Creates an empty store for a world seed.
    pub fn with_seed(seed: i32) -> Self {
        Self::new(TerrainGenerator::new(seed))
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Looks up a chunk by chunk coordinate.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get().get(&coord).cloned()
    }

    /// Looks up the chunk containing a world column.
    pub fn get_chunk_at(&self, world_x: i32, world_z: i32) -> Option<Arc<Chunk>> {
        self.get_chunk(ChunkCoord::from_world(world_x, world_z))
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.get().contains_key(&coord)
    }

    /// The block id at a world position.
    ///
    /// # Returns
    /// AIR's id when the chunk is not loaded or `world_y` is outside the chunk height.
    pub fn get_block_id(&self, world_x: i32, world_y: i32, world_z: i32) -> BlockTypeSize {
        let (coord, x, z) = ChunkCoord::split_world(world_x, world_z);
        match self.get_chunk(coord) {
            Some(chunk) => chunk.grid().get(x, world_y, z),
            None => BlockType::AIR.id(),
        }
    }

    /// The block at a world position, AIR when unloaded.
    pub fn get_block(&self, world_x: i32, world_y: i32, world_z: i32) -> BlockType {
        BlockType::from_id(self.get_block_id(world_x, world_y, world_z)).unwrap_or(BlockType::AIR)
    }

    /// Writes a block at a world position. Does nothing if the chunk is not loaded.
    pub fn set_block(&self, block: BlockType, world_x: i32, world_y: i32, world_z: i32) {
        let (coord, x, z) = ChunkCoord::split_world(world_x, world_z);
        if let Some(chunk) = self.get_chunk(coord) {
            chunk.set_block(x, world_y, z, block);
        }
    }

    /// Inserts a chunk, optionally generating its terrain.
    ///
    /// If a chunk already occupies the coordinate the call does nothing. Otherwise the
    /// chunk is inserted dirty and generated if requested. Every existing horizontal
    /// neighbour is then marked dirty so it rebuilds the faces along the new border.
    /// Generation runs while the map lock is held, so no other thread can observe a
    /// half-generated chunk.
    ///
    /// # Arguments
    /// * `chunk` - The new chunk; its own coordinate is used as the key
    /// * `generate` - Whether to run the terrain generator on it
    ///
    /// # Returns
    /// `true` if the chunk was inserted.
    pub fn load_chunk(&self, chunk: Chunk, generate: bool) -> bool {
        let coord = chunk.coord();
        let mut chunks = self.chunks.get_mut();
        if chunks.contains_key(&coord) {
            trace!("chunk {coord} already loaded");
            return false;
        }

        let chunk = Arc::new(chunk);
        chunks.insert(coord, chunk.clone());
        chunk.mark_dirty();

        if generate {
            let mut target = StoreTarget {
                coord,
                grid: chunk.grid_mut(),
                chunks: &*chunks,
            };
            self.generator.generate(&mut target);
        }

        for neighbor in coord.neighbors() {
            if let Some(neighbor) = chunks.get(&neighbor) {
                neighbor.mark_dirty();
            }
        }

        debug!("loaded chunk {coord} (generated: {generate})");
        true
    }

    /// Removes a chunk from the store.
    ///
    /// Threads that already hold the chunk keep it alive until they let go.
    pub fn remove_chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get_mut().remove(&coord)
    }

    /// A point-in-time list of every loaded chunk.
    ///
    /// The map lock is held only while the list is copied.
    pub fn snapshot(&self) -> Vec<Arc<Chunk>> {
        self.chunks.get().values().cloned().collect()
    }

    /// Resolves a chunk and its four side neighbours for meshing.
    ///
    /// # Returns
    /// `None` if the chunk itself is not loaded.
    pub fn neighborhood(&self, coord: ChunkCoord) -> Option<ChunkNeighborhood> {
        let chunks = self.chunks.get();
        let center = chunks.get(&coord)?.clone();
        Some(ChunkNeighborhood::new(center, |c| chunks.get(&c).cloned()))
    }

    pub fn len(&self) -> usize {
        self.chunks.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.get().is_empty()
    }
}

/// Generation target for a chunk being inserted into the store.
///
/// Holds the new chunk's grid lock for the whole generation and forwards spills to
/// chunks already in the map, one grid lock at a time.
struct StoreTarget<'a> {
    coord: ChunkCoord,
    grid: RwLockWriteGuard<'a, VoxelGrid>,
    chunks: &'a HashMap<ChunkCoord, Arc<Chunk>>,
}

impl GenerationTarget for StoreTarget<'_> {
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
        let (coord, x, z) = ChunkCoord::split_world(world_x, world_z);
        if coord == self.coord {
            self.grid.set(x, world_y, z, block.id());
        } else if let Some(chunk) = self.chunks.get(&coord) {
            chunk.set_block(x, world_y, z, block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{CHUNK_HEIGHT, CHUNK_WIDTH};
    use crate::engine_state::voxels::generation::DetachedChunk;

    #[test]
    fn loading_twice_keeps_the_first_chunk() {
        let store = ChunkStore::with_seed(3);
        let coord = ChunkCoord::new(1, 1);
        assert!(store.load_chunk(Chunk::new(coord), false));
        store.set_block(BlockType::STONE, 16, 10, 16);

        assert!(!store.load_chunk(Chunk::new(coord), true));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_block(16, 10, 16), BlockType::STONE);
        assert_eq!(store.get_chunk(coord).map(|c| c.coord()), Some(coord));
    }

    #[test]
    fn absent_chunks_read_as_air_and_ignore_writes() {
        let store = ChunkStore::with_seed(3);
        store.set_block(BlockType::STONE, 5, 5, 5);
        assert_eq!(store.get_block_id(5, 5, 5), BlockType::AIR.id());
        assert!(store.get_chunk_at(5, 5).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn world_coordinates_resolve_with_floor_division() {
        let store = ChunkStore::with_seed(3);
        store.load_chunk(Chunk::new(ChunkCoord::new(-1, -1)), false);
        store.set_block(BlockType::DIRT, -1, 3, -16);

        let chunk = store.get_chunk_at(-1, -16).unwrap();
        assert_eq!(chunk.coord(), ChunkCoord::new(-1, -1));
        assert_eq!(chunk.get_block(15, 3, 0), BlockType::DIRT);
        assert_eq!(store.get_block_id(-1, 3, -16), BlockType::DIRT.id());
        assert_eq!(store.get_block_id(-1, 200, -16), BlockType::AIR.id());
    }

    #[test]
    fn loading_marks_the_chunk_and_its_neighbours_dirty() {
        let store = ChunkStore::with_seed(3);
        let center = ChunkCoord::new(0, 0);
        for neighbor in center.neighbors() {
            store.load_chunk(Chunk::new(neighbor), false);
            store.get_chunk(neighbor).unwrap().take_dirty();
        }
        let far = ChunkCoord::new(5, 5);
        store.load_chunk(Chunk::new(far), false);
        store.get_chunk(far).unwrap().take_dirty();

        store.load_chunk(Chunk::new(center), false);

        assert!(store.get_chunk(center).unwrap().is_dirty());
        for neighbor in center.neighbors() {
            assert!(store.get_chunk(neighbor).unwrap().is_dirty());
        }
        assert!(!store.get_chunk(far).unwrap().is_dirty());
    }

    #[test]
    fn generated_chunk_matches_a_detached_run_apart_from_spills() {
        let store = ChunkStore::with_seed(42);
        let coord = ChunkCoord::new(0, 0);
        store.load_chunk(Chunk::new(coord), true);

        let mut detached = DetachedChunk::new(coord);
        store.generator().generate(&mut detached);

        let chunk = store.get_chunk(coord).unwrap();
        assert_eq!(chunk.grid().as_bytes(), detached.grid().as_bytes());
        assert_eq!(chunk.grid().block(0, 0, 0), BlockType::BEDROCK);
    }

    #[test]
    fn trees_on_a_border_write_into_a_loaded_neighbour() {
        let store = ChunkStore::with_seed(11);
        let last_column = CHUNK_WIDTH - 1;
        let (x, base, z) = (-32..32)
            .flat_map(|k| (-256..256).map(move |z| (k * CHUNK_WIDTH + last_column, z)))
            .find_map(|(x, z)| {
                let base = store.generator().tree_at(x, z)?;
                (base + 4 < CHUNK_HEIGHT).then_some((x, base, z))
            })
            .expect("no tree on a chunk border in the sampled area");

        let (coord, _, local_z) = ChunkCoord::split_world(x, z);
        let east = coord.offset(1, 0);
        store.load_chunk(Chunk::new(east), false);
        let neighbour = store.get_chunk(east).unwrap();
        neighbour.take_dirty();

        // Replay the spills a detached run records for the eastern chunk.
        let mut detached = DetachedChunk::new(coord);
        store.generator().generate(&mut detached);
        let mut expected = VoxelGrid::new();
        for spilled in detached.spilled() {
            let (target, sx, sz) = ChunkCoord::split_world(spilled.world_x, spilled.world_z);
            if target == east {
                expected.set(sx, spilled.world_y, sz, spilled.block.id());
            }
        }

        store.load_chunk(Chunk::new(coord), true);

        assert!(neighbour.is_dirty());
        assert!(expected.as_bytes().contains(&BlockType::LEAF.id()));
        assert_eq!(neighbour.grid().as_bytes(), expected.as_bytes());
        assert_ne!(neighbour.get_block(0, base + 3, local_z), BlockType::AIR);
    }

    #[test]
    fn removed_chunks_are_gone_from_snapshots() {
        let store = ChunkStore::with_seed(0);
        store.load_chunk(Chunk::new(ChunkCoord::new(0, 0)), false);
        store.load_chunk(Chunk::new(ChunkCoord::new(0, 1)), false);
        assert_eq!(store.snapshot().len(), 2);

        assert!(store.remove_chunk(ChunkCoord::new(0, 1)).is_some());
        assert!(store.remove_chunk(ChunkCoord::new(0, 1)).is_none());
        let coords: Vec<_> = store.snapshot().iter().map(|c| c.coord()).collect();
        assert_eq!(coords, vec![ChunkCoord::new(0, 0)]);
    }
}
