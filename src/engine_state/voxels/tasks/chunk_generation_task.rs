//! # Chunk Generation Task
//!
//! The acquisition loop. Every tick it looks at the square of chunk coordinates within
//! the view distance of the observer, and generates the missing ones that are in front
//! of the camera, nearest first. Missing chunks behind the camera are left for a later
//! tick, when the observer turns toward them.

use log::debug;

use crate::engine_state::task_management::task::{PeriodicTask, TickContext};
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord};

/// What one acquisition tick did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionPass {
    /// Coordinates in range with no chunk at the start of the tick.
    pub missing: usize,
    /// Chunks inserted and generated.
    pub loaded: usize,
    /// Missing chunks skipped because they were outside the frustum.
    pub deferred: usize,
}

/// Discovers and generates chunks around the observer.
#[derive(Debug, Default)]
pub struct ChunkGenerationTask;

impl ChunkGenerationTask {
    pub fn new() -> Self {
        ChunkGenerationTask
    }

    /// Runs one acquisition pass.
    pub fn acquire(&mut self, ctx: &TickContext<'_>) -> AcquisitionPass {
        let camera = &ctx.camera;
        let center = camera.chunk();
        let radius = ctx.config.view_distance;

        let mut missing: Vec<ChunkCoord> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| center.offset(dx, dz)))
            .filter(|&coord| !ctx.store.contains(coord))
            .collect();
        missing.sort_by(|a, b| camera.distance2_to(*a).total_cmp(&camera.distance2_to(*b)));

        let mut pass = AcquisitionPass {
            missing: missing.len(),
            ..Default::default()
        };
        for coord in missing {
            if !camera.sees_chunk(coord) {
                pass.deferred += 1;
                continue;
            }
            if ctx.store.load_chunk(Chunk::new(coord), true) {
                pass.loaded += 1;
            }
        }

        if pass.loaded > 0 {
            debug!(
                "acquisition around {center}: loaded {}, deferred {}",
                pass.loaded, pass.deferred
            );
        }
        pass
    }
}

impl PeriodicTask for ChunkGenerationTask {
    fn name(&self) -> &str {
        "chunk-acquisition"
    }

    fn tick(&mut self, ctx: &TickContext<'_>) {
        self.acquire(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::CameraSnapshot;
    use crate::engine_state::config::StreamingConfig;
    use crate::engine_state::voxels::chunk_store::ChunkStore;
    use cgmath::{Point3, Vector3};

    #[test]
    fn loads_only_chunks_in_front_and_is_idempotent() {
        let store = ChunkStore::with_seed(5);
        let config = StreamingConfig {
            view_distance: 1,
            ..Default::default()
        };
        let camera = CameraSnapshot::looking_at(
            Point3::new(8.0, 90.0, 8.0),
            Vector3::new(0.0, 0.0, -1.0),
            1.0,
        );
        let ctx = TickContext::new(&store, camera, &config);
        let mut task = ChunkGenerationTask::new();

        let first = task.acquire(&ctx);
        assert_eq!(first.missing, 9);
        assert!(first.loaded > 0);
        assert_eq!(first.loaded + first.deferred, 9);
        assert!(store.contains(ChunkCoord::new(0, -1)));
        assert!(!store.contains(ChunkCoord::new(0, 1)));
        let chunk = store.get_chunk(ChunkCoord::new(0, -1)).unwrap();
        assert!(chunk.is_dirty());
        assert!(!chunk.grid().is_empty());

        let second = task.acquire(&ctx);
        assert_eq!(second.loaded, 0);
        assert_eq!(second.missing, first.deferred);
        assert_eq!(store.len(), first.loaded);
    }
}
