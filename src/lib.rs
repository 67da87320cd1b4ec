#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! Streams an endless procedurally generated voxel terrain around a moving observer.
//!
//! This crate covers the chunk lifecycle: seeded generation, a shared chunk store,
//! face-culling meshing, and a visibility-driven scheduler that loads, meshes and evicts
//! chunks on background threads while a consumer thread draws.
//!
//! ## Key Modules
//!
//! * `application_state` - A headless session that drives the pipeline end to end
//! * `core` - Shared-state primitives used throughout the crate
//! * `engine_state` - The pipeline itself: voxels, rendering, scheduling and config
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_streaming::engine_state::camera_state::CameraSnapshot;
//! use voxel_streaming::engine_state::config::StreamingConfig;
//! use voxel_streaming::engine_state::EngineState;
//! use voxel_streaming::CountingSink;
//!
//! let mut engine = EngineState::new(StreamingConfig::default(), CameraSnapshot::default())?;
//! let mut sink = CountingSink::default();
//! engine.render_frame(&mut sink);
//! engine.shutdown();
//! # Ok::<(), std::io::Error>(())
//! ```

use log::{error, info};
use thiserror::Error;

pub mod application_state;
pub mod core;
pub mod engine_state;

pub use application_state::{run_session, CountingSink, SessionOptions, SessionReport};
pub use engine_state::camera_state::{CameraSnapshot, CameraSource, SharedCamera};
pub use engine_state::config::{ConfigError, EvictionPolicy, StreamingConfig};
pub use engine_state::rendering::{ChunkRenderer, Material, RenderSink, Vertex};
pub use engine_state::voxels::chunk::{Chunk, ChunkCoord};
pub use engine_state::voxels::chunk_store::ChunkStore;
pub use engine_state::{ChunkScheduler, EngineState};

/// Initializes the `env_logger` backend, reading filters from `RUST_LOG`.
pub fn init_logging() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");
}

/// Why a headless session could not run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },
    #[error("failed to start streaming: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs a headless streaming session.
///
/// The first command line argument, if present, is the path of a JSON
/// [`StreamingConfig`].
///
/// # Errors
/// Returns the error after logging it, so the binary can exit with a failure status.
pub fn run() -> Result<SessionReport, RunError> {
    init_logging();
    let result = run_with_args(std::env::args().skip(1));
    if let Err(err) = &result {
        error!("{err}");
    }
    result
}

/// Runs a session configured from command line arguments, without touching the logger.
///
/// # Arguments
/// * `args` - The arguments after the program name
pub fn run_with_args(
    mut args: impl Iterator<Item = String>,
) -> Result<SessionReport, RunError> {
    let config = match args.next() {
        Some(path) => StreamingConfig::from_json_file(&path)
            .map_err(|source| RunError::Config { path, source })?,
        None => {
            info!("Using default streaming config");
            StreamingConfig::default()
        }
    };

    let report = run_session(config, SessionOptions::default())?;
    info!(
        "Session finished: {} frames in {:.1?}, {} chunks loaded, {} draws, {} vertices ({} KiB)",
        report.frames,
        report.elapsed,
        report.chunks_loaded,
        report.sink.draws,
        report.sink.vertices,
        report.sink.bytes / 1024
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_an_error() {
        let path = std::env::temp_dir().join("voxel-streaming-no-such-config.json");
        let result = run_with_args(std::iter::once(path.display().to_string()));
        assert!(matches!(
            result,
            Err(RunError::Config {
                source: ConfigError::Io(_),
                ..
            })
        ));
    }
}
