//! # Voxel Storage and Generation
//!
//! The data side of the streaming pipeline: what a chunk holds, where chunks live, and
//! how their voxels are produced.
//!
//! ## Architecture
//!
//! * **Block**: block ids, per-type parameters, faces and the texture table
//! * **Chunk**: a full-height column of voxels with its dirty and resident flags
//! * **ChunkStore**: the coordinate-to-chunk index shared by every thread
//! * **Generation**: the seeded terrain generator
//! * **Tasks**: the acquisition loop that discovers and loads chunks around the observer
//!
//! ## Data Flow
//!
//! 1. The acquisition task finds coordinates near the observer with no chunk
//! 2. `ChunkStore::load_chunk` inserts and generates each one, dirtying its neighbours
//! 3. The meshing task picks up dirty chunks (see `rendering`)

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod generation;
pub mod neighborhood;
pub mod tasks;
