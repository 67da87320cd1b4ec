//! # Application State Management
//!
//! A headless streaming session: an observer wanders over the terrain while the
//! scheduler streams chunks around it and a counting sink stands in for the GPU.
//!
//! - `WanderingObserver` steers the camera along a random walk and keeps it above ground
//! - `CountingSink` tallies what would have been drawn
//! - `run_session` wires both to an `EngineState` for a fixed number of frames

use std::io;
use std::thread;

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};
use log::info;
use web_time::{Duration, Instant};

use crate::engine_state::camera_state::CameraSnapshot;
use crate::engine_state::config::StreamingConfig;
use crate::engine_state::rendering::{Material, RenderSink, Vertex};
use crate::engine_state::voxels::chunk::ChunkCoord;
use crate::engine_state::voxels::chunk_store::ChunkStore;
use crate::engine_state::EngineState;

/// Eye height above the first air block of the column below.
const EYE_HEIGHT: f32 = 12.0;

/// A render sink that only counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingSink {
    pub draws: usize,
    pub vertices: usize,
    pub bytes: usize,
}

impl RenderSink for CountingSink {
    fn draw(&mut self, vertices: &[Vertex], _transform: &Matrix4<f32>, _material: &Material) {
        self.draws += 1;
        self.vertices += vertices.len();
        self.bytes += bytemuck::cast_slice::<Vertex, u8>(vertices).len();
    }
}

/// A camera that drifts across the world on a random walk.
pub struct WanderingObserver {
    position: Point3<f32>,
    heading: f32,
    speed: f32,
    rng: fastrand::Rng,
}

impl WanderingObserver {
    /// # Arguments
    /// * `seed` - Seed of the walk, so sessions are repeatable
    /// * `speed` - Horizontal speed in blocks per second
    pub fn new(seed: u64, speed: f32) -> Self {
        WanderingObserver {
            position: Point3::new(8.0, 100.0, 8.0),
            heading: 0.0,
            speed,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Advances the walk and returns the new pose.
    ///
    /// The eye follows the terrain once the chunk underneath has been generated.
    pub fn step(&mut self, store: &ChunkStore, dt: Duration) -> CameraSnapshot {
        self.heading += (self.rng.f32() - 0.5) * 0.2;
        let forward = Vector3::new(self.heading.cos(), 0.0, self.heading.sin());
        self.position += forward * self.speed * dt.as_secs_f32();

        let world_x = self.position.x.floor() as i32;
        let world_z = self.position.z.floor() as i32;
        if let Some(chunk) = store.get_chunk_at(world_x, world_z) {
            let (_, x, z) = ChunkCoord::split_world(world_x, world_z);
            self.position.y = chunk.ground_level(x, z) as f32 + EYE_HEIGHT;
        }

        let look = (forward + Vector3::new(0.0, -0.3, 0.0)).normalize();
        CameraSnapshot::looking_at(self.position, look, 16.0 / 9.0)
    }
}

/// How long and how fast a headless session runs.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub frames: usize,
    pub frame_time: Duration,
    pub walk_seed: u64,
    pub speed: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            frames: 600,
            frame_time: Duration::from_millis(16),
            walk_seed: 7,
            speed: 24.0,
        }
    }
}

/// Totals of a finished session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReport {
    pub frames: usize,
    pub chunks_loaded: usize,
    pub sink: CountingSink,
    pub elapsed: Duration,
}

/// Streams terrain around a wandering observer for a fixed number of frames.
///
/// # Errors
/// Returns the OS error if the scheduler threads could not be spawned.
pub fn run_session(config: StreamingConfig, options: SessionOptions) -> io::Result<SessionReport> {
    let mut observer = WanderingObserver::new(options.walk_seed, options.speed);
    let start_pose = CameraSnapshot::looking_at(observer.position(), Vector3::unit_x(), 16.0 / 9.0);
    let mut engine = EngineState::new(config, start_pose)?;
    let mut sink = CountingSink::default();
    let started = Instant::now();

    for frame in 0..options.frames {
        let frame_start = Instant::now();
        engine
            .camera()
            .set(observer.step(engine.store(), options.frame_time));
        engine.render_frame(&mut sink);

        if frame % 60 == 0 {
            info!(
                "frame {frame}: {} chunks loaded, observer at ({:.0}, {:.0}, {:.0})",
                engine.store().len(),
                observer.position().x,
                observer.position().y,
                observer.position().z
            );
        }
        if let Some(rest) = options.frame_time.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    engine.shutdown();
    Ok(SessionReport {
        frames: options.frames,
        chunks_loaded: engine.store().len(),
        sink,
        elapsed: started.elapsed(),
    })
}
