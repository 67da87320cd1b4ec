//! Task for meshing and evicting chunks in a background thread.
//!
//! Each tick visits the loaded chunks nearest first and, per chunk:
//!
//! 1. Decides visibility: in the frustum or within the near radius, and never when the
//!    chunk is beyond the view distance
//! 2. Manages eviction: a visible chunk loses any eviction deadline; a resident chunk
//!    that is out of view gets a deadline on the first pass and is unloaded on a later
//!    pass that still finds it out of view
//! 3. Purges evicted chunks that have drifted past the purge distance
//! 4. Rebuilds the mesh of visible dirty chunks
//!
//! The tick stops early once its time budget is spent; the next tick starts over from a
//! freshly sorted list, so a moving observer always gets the nearest chunks first.

use std::collections::HashMap;

use log::{debug, trace};
use web_time::Instant;

use crate::engine_state::config::EvictionPolicy;
use crate::engine_state::rendering::meshing::mesh_chunk;
use crate::engine_state::task_management::task::{PeriodicTask, TickContext};
use crate::engine_state::voxels::chunk::ChunkCoord;

/// What one meshing tick did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshingPass {
    pub visited: usize,
    pub meshed: usize,
    pub evicted: usize,
    pub purged: usize,
    /// Whether the tick stopped before visiting every chunk.
    pub budget_exhausted: bool,
}

/// Meshes visible dirty chunks and evicts chunks that left the view.
#[derive(Debug, Default)]
pub struct ChunkMeshGenerationTask {
    /// Chunks judged out of view, with the deadline recorded when that happened.
    eviction_deadlines: HashMap<ChunkCoord, Instant>,
}

impl ChunkMeshGenerationTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eviction deadline recorded for a chunk, if it is a candidate for unloading.
    pub fn eviction_deadline(&self, coord: ChunkCoord) -> Option<Instant> {
        self.eviction_deadlines.get(&coord).copied()
    }

    pub fn pending_evictions(&self) -> usize {
        self.eviction_deadlines.len()
    }

    fn deadline_reached(policy: EvictionPolicy, deadline: Instant, now: Instant) -> bool {
        match policy {
            EvictionPolicy::NextPass => true,
            EvictionPolicy::Deadline => now >= deadline,
        }
    }

    /// Runs one meshing and eviction pass.
    pub fn pass(&mut self, ctx: &TickContext<'_>) -> MeshingPass {
        let started = Instant::now();
        let camera = &ctx.camera;
        let config = ctx.config;
        let observer = camera.chunk();

        let mut chunks = ctx.store.snapshot();
        chunks.sort_by(|a, b| {
            camera
                .distance2_to(a.coord())
                .total_cmp(&camera.distance2_to(b.coord()))
        });

        let mut pass = MeshingPass::default();
        for chunk in chunks {
            pass.visited += 1;
            let coord = chunk.coord();
            let visible = (camera.sees_chunk(coord) || camera.is_near(coord, config.near_radius))
                && !camera.is_beyond(coord, config.view_distance);

            if chunk.is_resident() {
                if visible {
                    self.eviction_deadlines.remove(&coord);
                } else {
                    match self.eviction_deadlines.get(&coord) {
                        Some(&deadline) => {
                            if Self::deadline_reached(config.eviction_policy, deadline, ctx.now) {
                                chunk.unload();
                                self.eviction_deadlines.remove(&coord);
                                pass.evicted += 1;
                                trace!("evicted chunk {coord}");
                            }
                        }
                        None => {
                            self.eviction_deadlines
                                .insert(coord, ctx.now + config.eviction_timeout());
                        }
                    }
                }
            } else {
                self.eviction_deadlines.remove(&coord);
                if coord.chebyshev(observer) > config.purge_distance() {
                    ctx.store.remove_chunk(coord);
                    pass.purged += 1;
                    trace!("purged chunk {coord}");
                    continue;
                }
            }

            if visible && chunk.is_dirty() && mesh_chunk(ctx.store, &chunk) {
                pass.meshed += 1;
            }

            if started.elapsed() > config.update_budget() {
                pass.budget_exhausted = true;
                break;
            }
        }

        if pass.meshed + pass.evicted + pass.purged > 0 || pass.budget_exhausted {
            debug!(
                "meshing pass: visited {}, meshed {}, evicted {}, purged {}, budget hit {}",
                pass.visited, pass.meshed, pass.evicted, pass.purged, pass.budget_exhausted
            );
        }
        pass
    }
}

impl PeriodicTask for ChunkMeshGenerationTask {
    fn name(&self) -> &str {
        "chunk-meshing"
    }

    fn tick(&mut self, ctx: &TickContext<'_>) {
        self.pass(ctx);
    }
}
