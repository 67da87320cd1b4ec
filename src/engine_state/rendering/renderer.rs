//! The render consumer.
//!
//! Runs on the thread that owns the graphics context, once per frame. It promotes
//! freshly built meshes, animates chunks rising into place and sinking away after
//! eviction, and hands each drawable chunk to a [`RenderSink`].

use std::collections::{HashMap, HashSet};

use cgmath::{Matrix4, Vector3};
use log::trace;

use super::Vertex;
use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_HEIGHT};
use crate::engine_state::voxels::chunk_store::ChunkStore;

/// Per-frame easing factor toward the resting height of a resident chunk.
const RISE_FACTOR: f32 = 0.99;
/// Per-frame fraction of the remaining distance an evicted chunk sinks.
const SINK_RATE: f32 = 0.001;
/// An evicted chunk below this offset stops drawing.
const HIDE_OFFSET: f32 = -(CHUNK_HEIGHT as f32) * 0.6;

/// Surface parameters passed along with every draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// Tiles along one edge of the texture atlas.
    pub atlas_tiles: u32,
    /// RGBA tint.
    pub color: [f32; 4],
}

impl Material {
    /// The material every terrain chunk is drawn with.
    pub fn terrain() -> Self {
        Material {
            name: "terrain".to_string(),
            atlas_tiles: crate::engine_state::voxels::block::ATLAS_TILES,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::terrain()
    }
}

/// Anything that can upload and draw a vertex list.
///
/// Called once per drawable chunk per frame. `vertices` may be empty.
pub trait RenderSink {
    fn draw(&mut self, vertices: &[Vertex], transform: &Matrix4<f32>, material: &Material);
}

/// Drives chunk drawing from the consumer thread.
pub struct ChunkRenderer {
    material: Material,
    offsets: HashMap<ChunkCoord, f32>,
}

impl ChunkRenderer {
    pub fn new(material: Material) -> Self {
        ChunkRenderer {
            material,
            offsets: HashMap::new(),
        }
    }

    /// The current vertical offset of a chunk, if the renderer has seen it.
    pub fn offset(&self, coord: ChunkCoord) -> Option<f32> {
        self.offsets.get(&coord).copied()
    }

    /// Renders one frame.
    ///
    /// # Arguments
    /// * `store` - The chunk store; only a brief snapshot of its map is taken
    /// * `sink` - Receives one draw per visible chunk
    ///
    /// # Returns
    /// The number of draw calls issued.
    pub fn render_frame(&mut self, store: &ChunkStore, sink: &mut dyn RenderSink) -> usize {
        let chunks = store.snapshot();
        let mut draws = 0;
        let mut seen = HashSet::with_capacity(chunks.len());

        for chunk in &chunks {
            let Some(slots) = chunk.render_state() else {
                continue;
            };
            let coord = chunk.coord();
            seen.insert(coord);
            slots.promote();

            let offset = self
                .offsets
                .entry(coord)
                .or_insert(-(CHUNK_HEIGHT as f32));
            if chunk.is_resident() {
                *offset *= RISE_FACTOR;
            } else {
                *offset += (-(CHUNK_HEIGHT as f32) - *offset) * SINK_RATE;
                if *offset <= HIDE_OFFSET {
                    slots.release();
                    continue;
                }
            }

            let Some(mesh) = slots.active() else {
                continue;
            };
            let transform = Matrix4::from_translation(Vector3::new(
                coord.world_x() as f32,
                *offset,
                coord.world_z() as f32,
            ));
            sink.draw(&mesh.vertices, &transform, &self.material);
            draws += 1;
        }

        // Chunks purged from the store start from the bottom again if they return.
        self.offsets.retain(|coord, _| seen.contains(coord));
        trace!("rendered {draws} of {} chunks", chunks.len());
        draws
    }
}

impl Default for ChunkRenderer {
    fn default() -> Self {
        Self::new(Material::terrain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::mesh_chunk;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::Chunk;

    #[derive(Default)]
    struct RecordingSink {
        draws: Vec<(usize, Matrix4<f32>)>,
    }

    impl RenderSink for RecordingSink {
        fn draw(&mut self, vertices: &[Vertex], transform: &Matrix4<f32>, material: &Material) {
            assert_eq!(material.name, "terrain");
            self.draws.push((vertices.len(), *transform));
        }
    }

    fn meshed_store() -> ChunkStore {
        let store = ChunkStore::with_seed(0);
        let coord = ChunkCoord::new(2, -1);
        store.load_chunk(Chunk::new(coord), false);
        store.set_block(BlockType::STONE, 33, 10, -10);
        let chunk = store.get_chunk(coord).unwrap();
        assert!(mesh_chunk(&store, &chunk));
        store
    }

    #[test]
    fn meshed_chunks_are_drawn_at_their_origin_rising_from_below() {
        let store = meshed_store();
        let mut renderer = ChunkRenderer::default();
        let mut sink = RecordingSink::default();

        assert_eq!(renderer.render_frame(&store, &mut sink), 1);
        let (vertex_count, transform) = sink.draws[0];
        assert_eq!(vertex_count, 36);
        assert_eq!(transform.w.x, 32.0);
        assert_eq!(transform.w.z, -16.0);
        assert!(transform.w.y < 0.0);

        let first = renderer.offset(ChunkCoord::new(2, -1)).unwrap();
        renderer.render_frame(&store, &mut sink);
        let second = renderer.offset(ChunkCoord::new(2, -1)).unwrap();
        assert!(second > first && second < 0.0);
    }

    #[test]
    fn unmeshed_chunks_draw_nothing() {
        let store = ChunkStore::with_seed(0);
        store.load_chunk(Chunk::new(ChunkCoord::new(0, 0)), false);
        let mut sink = RecordingSink::default();
        assert_eq!(ChunkRenderer::default().render_frame(&store, &mut sink), 0);
    }

    #[test]
    fn evicted_chunks_sink_and_then_stop_drawing() {
        let store = meshed_store();
        let coord = ChunkCoord::new(2, -1);
        let chunk = store.get_chunk(coord).unwrap();
        let mut renderer = ChunkRenderer::default();
        let mut sink = RecordingSink::default();

        for _ in 0..2000 {
            renderer.render_frame(&store, &mut sink);
        }
        let risen = renderer.offset(coord).unwrap();
        assert!(risen > -0.01);

        chunk.unload();
        let mut frames = 0;
        while renderer.render_frame(&store, &mut sink) == 1 {
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(renderer.offset(coord).unwrap() <= HIDE_OFFSET);
        assert!(chunk.render_state().unwrap().active().is_none());
    }

    #[test]
    fn purged_chunks_forget_their_offset() {
        let store = meshed_store();
        let mut renderer = ChunkRenderer::default();
        let mut sink = RecordingSink::default();
        renderer.render_frame(&store, &mut sink);

        store.remove_chunk(ChunkCoord::new(2, -1));
        renderer.render_frame(&store, &mut sink);
        assert!(renderer.offset(ChunkCoord::new(2, -1)).is_none());
    }
}
