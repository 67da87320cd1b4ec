//! # Chunk Coordinates
//!
//! Chunks tile the world horizontally; every chunk spans the full vertical extent, so a
//! chunk is addressed by a 2D integer coordinate.

use std::fmt;

use cgmath::Point3;

use super::{CHUNK_DEPTH, CHUNK_WIDTH};

/// Identifies a chunk column in the horizontal chunk grid.
///
/// Chunk space maps to world space by multiplying by the chunk width and depth, so chunk
/// `(1, -2)` covers world `x` in `16..32` and world `z` in `-32..-16`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk containing a world block position.
    ///
    /// Uses floor division, so negative coordinates land in the chunk to their left
    /// (world `x = -1` is in chunk `x = -1`, not chunk `0`).
    pub fn from_world(world_x: i32, world_z: i32) -> Self {
        ChunkCoord {
            x: world_x.div_euclid(CHUNK_WIDTH),
            z: world_z.div_euclid(CHUNK_DEPTH),
        }
    }

    /// The chunk containing a floating point world position.
    pub fn from_position(position: Point3<f32>) -> Self {
        Self::from_world(position.x.floor() as i32, position.z.floor() as i32)
    }

    /// World `x` of the chunk's minimum corner.
    pub fn world_x(self) -> i32 {
        self.x * CHUNK_WIDTH
    }

    /// World `z` of the chunk's minimum corner.
    pub fn world_z(self) -> i32 {
        self.z * CHUNK_DEPTH
    }

    /// The chunk's minimum corner at ground zero, in world space.
    pub fn origin(self) -> Point3<f32> {
        Point3::new(self.world_x() as f32, 0.0, self.world_z() as f32)
    }

    /// Splits a world block position into its chunk and the local column inside it.
    pub fn split_world(world_x: i32, world_z: i32) -> (Self, i32, i32) {
        (
            Self::from_world(world_x, world_z),
            world_x.rem_euclid(CHUNK_WIDTH),
            world_z.rem_euclid(CHUNK_DEPTH),
        )
    }

    /// Offsets this coordinate by a number of chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        ChunkCoord::new(self.x + dx, self.z + dz)
    }

    /// The eight horizontally adjacent chunk coordinates.
    pub fn neighbors(self) -> impl Iterator<Item = ChunkCoord> {
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dz| (dx, dz)))
            .filter(|&(dx, dz)| dx != 0 || dz != 0)
            .map(move |(dx, dz)| self.offset(dx, dz))
    }

    /// Squared distance in chunk units.
    pub fn distance2(self, other: ChunkCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        dx * dx + dz * dz
    }

    /// Chebyshev distance in chunk units, the radius of the square region reaching `other`.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
