//! # Task Management System
//!
//! Runs [`PeriodicTask`]s on dedicated worker threads.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the shared state every tick needs and the worker handles
//! - `TaskHandle`: one worker thread and the channel used to stop it
//! - `PeriodicTask`: the work itself (see [`task`])
//!
//! Each worker sleeps between ticks on `Receiver::recv_timeout`, so a stop request is
//! seen within one interval instead of after a full sleep. Dropping the manager stops
//! and joins every worker.

pub mod task;

use std::io;
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use web_time::Duration;

use task::{PeriodicTask, TickContext};

use super::camera_state::CameraSource;
use super::config::StreamingConfig;
use super::voxels::chunk_store::ChunkStore;

/// A running worker thread.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    stop_sender: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Signals the worker to stop and waits for it to exit.
    pub fn stop(&mut self) {
        // A send error means the worker already exited.
        let _ = self.stop_sender.send(());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Worker {} panicked", self.name);
            }
        }
    }
}

/// Owns the scheduling workers and the state they share.
pub struct TaskManager {
    store: Arc<ChunkStore>,
    camera: Arc<dyn CameraSource>,
    config: Arc<StreamingConfig>,
    handles: Vec<TaskHandle>,
}

impl TaskManager {
    /// Creates a manager with no workers.
    ///
    /// # Arguments
    /// * `store` - The chunk store every task works on
    /// * `camera` - Polled once at the start of every tick
    /// * `config` - Handed to every tick
    pub fn new(
        store: Arc<ChunkStore>,
        camera: Arc<dyn CameraSource>,
        config: Arc<StreamingConfig>,
    ) -> Self {
        TaskManager {
            store,
            camera,
            config,
            handles: Vec::new(),
        }
    }

    /// Starts a worker that ticks `task` every `interval`.
    ///
    /// # Errors
    /// Returns the OS error if the thread could not be spawned.
    pub fn spawn(&mut self, mut task: Box<dyn PeriodicTask>, interval: Duration) -> io::Result<()> {
        let (stop_sender, stop_receiver) = channel::<()>();
        let name = task.name().to_string();
        let store = self.store.clone();
        let camera = self.camera.clone();
        let config = self.config.clone();

        let worker = thread::Builder::new().name(name.clone()).spawn(move || {
            loop {
                let ctx = TickContext::new(&store, camera.snapshot(), &config);
                task.tick(&ctx);

                match stop_receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("Worker {} exiting", task.name());
        })?;

        info!("Started worker {name} ticking every {interval:?}");
        self.handles.push(TaskHandle {
            name,
            stop_sender,
            worker: Some(worker),
        });
        Ok(())
    }

    pub fn handles(&self) -> &[TaskHandle] {
        &self.handles
    }

    /// Stops and joins every worker.
    pub fn stop_all(&mut self) {
        for handle in &mut self.handles {
            handle.stop();
        }
        self.handles.clear();
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::CameraSnapshot;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTask {
        ticks: Arc<AtomicUsize>,
    }

    impl PeriodicTask for CountingTask {
        fn name(&self) -> &str {
            "counting"
        }

        fn tick(&mut self, _ctx: &TickContext<'_>) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn workers_tick_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(
            Arc::new(ChunkStore::with_seed(0)),
            Arc::new(CameraSnapshot::default()),
            Arc::new(StreamingConfig::default()),
        );
        manager
            .spawn(
                Box::new(CountingTask {
                    ticks: ticks.clone(),
                }),
                Duration::from_millis(1),
            )
            .unwrap();
        assert_eq!(manager.handles()[0].name(), "counting");

        let deadline = web_time::Instant::now() + Duration::from_secs(5);
        while ticks.load(Ordering::SeqCst) < 3 {
            assert!(web_time::Instant::now() < deadline);
            thread::sleep(Duration::from_millis(1));
        }

        manager.stop_all();
        assert!(manager.handles().is_empty());
        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }
}
