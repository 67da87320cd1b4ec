//! # Voxel Task System
//!
//! Periodic tasks that populate the chunk store as the observer moves.

pub mod chunk_generation_task;
