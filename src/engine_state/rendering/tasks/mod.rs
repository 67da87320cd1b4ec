//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: meshes visible dirty chunks and evicts chunks that left
//!   the view

pub mod chunk_mesh_generation_task;
