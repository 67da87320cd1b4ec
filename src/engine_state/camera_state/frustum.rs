//! Chunk visibility tests against an observer pose.
//!
//! The in-view test is deliberately coarse: a chunk counts as visible when any of five
//! sample points (the four corners at mid-height and the center) lands in front of the
//! camera in clip space. Chunks right under the observer are kept visible by the
//! separate near test.

use cgmath::{MetricSpace, Point3, Vector4};

use super::CameraSnapshot;
use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};

impl CameraSnapshot {
    /// The chunk containing the observer.
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord::from_position(self.position)
    }

    /// Squared distance from the observer to a chunk's minimum corner at ground zero.
    ///
    /// Used to order chunks nearest first.
    pub fn distance2_to(&self, coord: ChunkCoord) -> f32 {
        self.position.distance2(coord.origin())
    }

    /// Whether any sample point of the chunk has positive clip-space depth.
    pub fn sees_chunk(&self, coord: ChunkCoord) -> bool {
        let x = coord.world_x() as f32;
        let z = coord.world_z() as f32;
        let y = (CHUNK_HEIGHT / 2) as f32;
        let w = CHUNK_WIDTH as f32;
        let d = CHUNK_DEPTH as f32;

        [
            Point3::new(x, y, z),
            Point3::new(x + w, y, z),
            Point3::new(x, y, z + d),
            Point3::new(x + w, y, z + d),
            Point3::new(x + w / 2.0, y, z + d / 2.0),
        ]
        .iter()
        .any(|p| (self.view_projection * Vector4::new(p.x, p.y, p.z, 1.0)).z > 0.0)
    }

    /// Whether a chunk is within `radius` chunks of the observer's chunk.
    pub fn is_near(&self, coord: ChunkCoord, radius: f32) -> bool {
        self.chunk().distance2(coord) < radius * radius
    }

    /// Whether a chunk's corner is farther than `view_distance` chunks horizontally.
    pub fn is_beyond(&self, coord: ChunkCoord, view_distance: i32) -> bool {
        let ground = Point3::new(self.position.x, 0.0, self.position.z);
        let limit = (view_distance * CHUNK_WIDTH) as f32;
        ground.distance2(coord.origin()) > limit * limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn facing_north_from(x: f32, z: f32) -> CameraSnapshot {
        CameraSnapshot::looking_at(Point3::new(x, 80.0, z), Vector3::new(0.0, 0.0, -1.0), 1.0)
    }

    #[test]
    fn chunks_ahead_are_seen_and_chunks_behind_are_not() {
        let camera = facing_north_from(8.0, 8.0);
        assert!(camera.sees_chunk(ChunkCoord::new(0, -3)));
        assert!(!camera.sees_chunk(ChunkCoord::new(0, 3)));
    }

    #[test]
    fn near_uses_chunk_distance() {
        let camera = facing_north_from(8.0, 8.0);
        assert!(camera.is_near(ChunkCoord::new(0, 0), 2.5));
        assert!(camera.is_near(ChunkCoord::new(1, 2), 2.5));
        assert!(!camera.is_near(ChunkCoord::new(2, 2), 2.5));
    }

    #[test]
    fn beyond_ignores_observer_height() {
        let camera = facing_north_from(0.0, 0.0);
        assert!(!camera.is_beyond(ChunkCoord::new(2, 0), 2));
        assert!(camera.is_beyond(ChunkCoord::new(3, 0), 2));
        assert_eq!(camera.chunk(), ChunkCoord::new(0, 0));
    }
}
