//! # Periodic Task Traits
//!
//! The scheduler's loops are expressed as [`PeriodicTask`]s: state machines that are
//! ticked at a fixed interval by a worker thread. A tick receives everything it may
//! touch through a [`TickContext`], so the same task can be driven by hand in tests.
//!
//! ## Task Lifecycle
//! 1. A task is handed to `TaskManager::spawn` together with its interval
//! 2. The worker builds a fresh `TickContext` and calls `tick`
//! 3. The worker waits one interval, or until it is told to stop
//! 4. On stop the task is dropped on the worker thread

use web_time::Instant;

use crate::engine_state::camera_state::CameraSnapshot;
use crate::engine_state::config::StreamingConfig;
use crate::engine_state::voxels::chunk_store::ChunkStore;

/// Everything one tick of a scheduling loop may read or act on.
#[derive(Copy, Clone)]
pub struct TickContext<'a> {
    /// The store the tick loads into, meshes from and evicts from.
    pub store: &'a ChunkStore,
    /// The observer pose, sampled once at the start of the tick.
    pub camera: CameraSnapshot,
    pub config: &'a StreamingConfig,
    /// Time the tick started. Eviction deadlines are measured against it.
    pub now: Instant,
}

impl<'a> TickContext<'a> {
    /// A context for a tick starting right now.
    pub fn new(store: &'a ChunkStore, camera: CameraSnapshot, config: &'a StreamingConfig) -> Self {
        TickContext {
            store,
            camera,
            config,
            now: Instant::now(),
        }
    }
}

/// A unit of recurring background work.
///
/// # Implementation Guidelines
/// - A tick should do a bounded amount of work; long loops check a time budget
/// - State that must survive between ticks lives in the task itself
/// - Everything shared with other threads comes in through the context
pub trait PeriodicTask: Send {
    /// Thread name for the worker running this task.
    fn name(&self) -> &str;

    /// Runs one iteration of the loop.
    fn tick(&mut self, ctx: &TickContext<'_>);
}
