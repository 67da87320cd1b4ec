//! Rendering side of the streaming pipeline.
//!
//! This module turns voxels into vertex lists and hands them to whatever draws them.
//! It never talks to a graphics API itself: the consumer thread supplies a
//! [`RenderSink`] and the renderer calls it once per drawable chunk per frame.
//!
//! # Architecture
//! - `meshing`: face-culling surface extraction and the per-chunk mesh double buffer
//! - `renderer`: the per-frame consumer with the rise and sink animation
//! - `tasks`: the background meshing and eviction loop

pub mod meshing;
mod renderer;
pub mod tasks;
mod vertex;

pub use renderer::{ChunkRenderer, Material, RenderSink};
pub use vertex::Vertex;
