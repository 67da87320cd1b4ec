//! Surface extraction for chunks.
//!
//! The mesher walks every non-AIR voxel of a chunk and emits a quad for each of its six
//! faces whose neighbour is AIR. Neighbours are looked up in world space, so faces on
//! a chunk border see the voxels of the adjacent chunk when it is loaded and treat the
//! border as open when it is not.
//!
//! # Performance Considerations
//! - Voxels are visited in storage order (x, then z, then y) so column reads stay
//!   in cache
//! - The store's map lock is released before any grid is locked; see
//!   [`ChunkStore::neighborhood`]
//! - A border face may be built against a neighbour that is still changing; the
//!   neighbour's load marks this chunk dirty again, which repairs the seam on the next
//!   build

use std::sync::Arc;

use log::trace;

pub mod mesh;

pub use mesh::{Face, Mesh, MeshSlots};

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::engine_state::voxels::chunk_store::ChunkStore;
use crate::engine_state::voxels::neighborhood::NeighborhoodView;

/// Builds the mesh of the center chunk of a locked neighbourhood.
pub fn build_mesh(view: &NeighborhoodView<'_>, chunk: &Chunk) -> Mesh {
    let coord = chunk.coord();
    let grid = view.center();
    let mut mesh = Mesh::new();

    for x in 0..CHUNK_WIDTH {
        for z in 0..CHUNK_DEPTH {
            for y in 0..CHUNK_HEIGHT {
                let block = grid.block(x, y, z);
                if block.is_air() {
                    continue;
                }

                let world_x = coord.world_x() + x;
                let world_z = coord.world_z() + z;
                for side in BlockSide::all() {
                    let offset = side.offset();
                    let neighbor =
                        view.block_world(world_x + offset.x, y + offset.y, world_z + offset.z);
                    if neighbor.is_air() {
                        mesh.push_face(Face::new(x, y, z, block, side));
                    }
                }
            }
        }
    }

    mesh
}

/// Rebuilds a chunk's mesh into its pending slot.
///
/// The dirty flag is cleared before the grid is read, and the chunk becomes resident
/// once the mesh is queued.
///
/// # Returns
/// `false` without doing anything if the chunk has no mesh slots or is no longer in
/// the store.
pub fn mesh_chunk(store: &ChunkStore, chunk: &Arc<Chunk>) -> bool {
    let Some(slots) = chunk.render_state() else {
        return false;
    };
    let Some(neighborhood) = store.neighborhood(chunk.coord()) else {
        return false;
    };
    if !Arc::ptr_eq(neighborhood.center(), chunk) {
        return false;
    }

    chunk.take_dirty();
    let mesh = {
        let view = neighborhood.lock();
        build_mesh(&view, chunk)
    };
    trace!(
        "meshed chunk {} with {} faces",
        chunk.coord(),
        mesh.face_count()
    );

    slots.queue(mesh);
    chunk.set_resident(true);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::ChunkCoord;

    fn store_with(coords: &[ChunkCoord]) -> ChunkStore {
        let store = ChunkStore::with_seed(0);
        for &coord in coords {
            store.load_chunk(Chunk::new(coord), false);
        }
        store
    }

    fn mesh_of(store: &ChunkStore, coord: ChunkCoord) -> Mesh {
        let chunk = store.get_chunk(coord).unwrap();
        assert!(mesh_chunk(store, &chunk));
        let slots = chunk.render_state().unwrap();
        slots.promote();
        slots.active().map(|m| (*m).clone()).unwrap()
    }

    #[test]
    fn isolated_voxel_has_six_faces() {
        let origin = ChunkCoord::new(0, 0);
        let store = store_with(&[origin]);
        store.set_block(BlockType::STONE, 5, 40, 5);

        let mesh = mesh_of(&store, origin);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertices.len(), 36);
    }

    #[test]
    fn enclosed_voxel_contributes_no_faces() {
        let origin = ChunkCoord::new(0, 0);
        let store = store_with(&[origin]);
        store.set_block(BlockType::STONE, 5, 40, 5);
        for side in BlockSide::all() {
            let o = side.offset();
            store.set_block(BlockType::STONE, 5 + o.x, 40 + o.y, 5 + o.z);
        }

        // Six arms with five open faces each; the center adds nothing.
        let mesh = mesh_of(&store, origin);
        assert_eq!(mesh.face_count(), 6 * 5);
    }

    #[test]
    fn border_faces_depend_on_the_loaded_neighbour() {
        let origin = ChunkCoord::new(0, 0);
        let store = store_with(&[origin]);
        store.set_block(BlockType::STONE, 15, 40, 5);
        assert_eq!(mesh_of(&store, origin).face_count(), 6);

        store.load_chunk(Chunk::new(ChunkCoord::new(1, 0)), false);
        store.set_block(BlockType::STONE, 16, 40, 5);
        let mesh = mesh_of(&store, origin);
        assert_eq!(mesh.face_count(), 5);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.normal != [1.0, 0.0, 0.0]));
    }

    #[test]
    fn meshing_clears_dirty_and_edits_set_it_again() {
        let store = ChunkStore::with_seed(42);
        let origin = ChunkCoord::new(0, 0);
        store.load_chunk(Chunk::new(origin), true);
        let chunk = store.get_chunk(origin).unwrap();
        assert!(chunk.is_dirty());
        assert!(!chunk.is_resident());

        assert!(mesh_chunk(&store, &chunk));
        assert!(!chunk.is_dirty());
        assert!(chunk.is_resident());
        assert!(chunk.render_state().unwrap().has_pending());

        let current = chunk.get_block(3, 100, 3);
        let replacement = if current == BlockType::AIR {
            BlockType::STONE
        } else {
            BlockType::AIR
        };
        chunk.set_block(3, 100, 3, replacement);
        assert!(chunk.is_dirty());
    }

    #[test]
    fn headless_and_removed_chunks_are_skipped() {
        let store = ChunkStore::with_seed(0);
        let coord = ChunkCoord::new(0, 0);
        store.load_chunk(Chunk::headless(coord), false);
        let chunk = store.get_chunk(coord).unwrap();
        assert!(!mesh_chunk(&store, &chunk));

        let detached = Arc::new(Chunk::new(ChunkCoord::new(9, 9)));
        assert!(!mesh_chunk(&store, &detached));
    }
}
