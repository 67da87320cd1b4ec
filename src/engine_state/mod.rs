//! # Engine State Module
//!
//! Ties the streaming pipeline together.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the store, the shared camera, the scheduler and the renderer
//! * `ChunkScheduler` - the two background loops (acquisition, meshing and eviction)
//! * `camera_state` - observer snapshots and chunk visibility tests
//! * `config` - tuning and its JSON loader
//! * `rendering` - meshing, mesh slots and the per-frame consumer
//! * `task_management` - periodic worker threads
//! * `voxels` - blocks, chunks, the store and terrain generation
//!
//! ## Threads
//!
//! Three threads touch the store: the acquisition worker inserts and generates chunks,
//! the meshing worker builds meshes and evicts, and the caller's thread renders through
//! [`EngineState::render_frame`]. The store's map lock guards structure; everything
//! per-chunk is either atomic or behind the chunk's own locks.

use std::io;
use std::sync::Arc;

use log::info;

use camera_state::{CameraSnapshot, CameraSource, SharedCamera};
use config::StreamingConfig;
use rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use rendering::{ChunkRenderer, RenderSink};
use task_management::TaskManager;
use voxels::chunk_store::ChunkStore;
use voxels::tasks::chunk_generation_task::ChunkGenerationTask;

pub mod camera_state;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The background half of the pipeline: acquisition plus meshing and eviction.
///
/// Both loops stop when the scheduler is stopped or dropped.
pub struct ChunkScheduler {
    tasks: TaskManager,
}

impl ChunkScheduler {
    /// Spawns both scheduling workers.
    ///
    /// # Arguments
    /// * `store` - The store to populate
    /// * `camera` - Polled at the start of every tick
    /// * `config` - Intervals, budgets and distances
    ///
    /// # Errors
    /// Returns the OS error if a worker thread could not be spawned. Any worker that
    /// did start is stopped again.
    pub fn start(
        store: Arc<ChunkStore>,
        camera: Arc<dyn CameraSource>,
        config: Arc<StreamingConfig>,
    ) -> io::Result<Self> {
        let mut tasks = TaskManager::new(store, camera, config.clone());
        tasks.spawn(
            Box::new(ChunkGenerationTask::new()),
            config.acquisition_interval(),
        )?;
        tasks.spawn(
            Box::new(ChunkMeshGenerationTask::new()),
            config.meshing_interval(),
        )?;
        info!(
            "Chunk scheduler started (seed {}, view distance {})",
            config.seed, config.view_distance
        );
        Ok(ChunkScheduler { tasks })
    }

    /// Whether both workers are still alive.
    pub fn is_running(&self) -> bool {
        let handles = self.tasks.handles();
        !handles.is_empty() && handles.iter().all(|handle| handle.is_running())
    }

    /// Stops and joins both workers. Calling it again does nothing.
    pub fn stop(&mut self) {
        if !self.tasks.handles().is_empty() {
            self.tasks.stop_all();
            info!("Chunk scheduler stopped");
        }
    }
}

/// A running streaming session.
pub struct EngineState {
    config: Arc<StreamingConfig>,
    store: Arc<ChunkStore>,
    camera: SharedCamera,
    scheduler: ChunkScheduler,
    renderer: ChunkRenderer,
}

impl EngineState {
    /// Creates an empty world for the configured seed and starts streaming around
    /// `initial`.
    ///
    /// # Errors
    /// Returns the OS error if the scheduler could not spawn its workers.
    pub fn new(config: StreamingConfig, initial: CameraSnapshot) -> io::Result<Self> {
        let config = Arc::new(config);
        let store = Arc::new(ChunkStore::with_seed(config.seed));
        let camera = SharedCamera::new(initial);
        let scheduler =
            ChunkScheduler::start(store.clone(), Arc::new(camera.clone()), config.clone())?;

        Ok(EngineState {
            config,
            store,
            camera,
            scheduler,
            renderer: ChunkRenderer::default(),
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// The camera the schedulers follow. Publish a new pose every frame.
    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    pub fn scheduler(&self) -> &ChunkScheduler {
        &self.scheduler
    }

    /// Draws one frame on the calling thread.
    ///
    /// # Returns
    /// The number of chunks drawn.
    pub fn render_frame(&mut self, sink: &mut dyn RenderSink) -> usize {
        self.renderer.render_frame(&self.store, sink)
    }

    /// Stops the background workers. The store stays readable.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
    }
}
