//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the geometry the
//! mesher needs for each of them.

use cgmath::Vector3;

/// Represents the six axis-aligned faces of a voxel block.
///
/// The declaration order is the order in which the mesher emits faces for a voxel.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The bottom face (facing negative Y)
    BOTTOM = 0,

    /// The top face (facing positive Y)
    TOP = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    /// Integer offset to the neighbouring voxel across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// Outward unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        let offset = self.offset();
        Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32)
    }

    /// Corners of the face quad relative to the voxel's minimum corner.
    ///
    /// The four corners are wound counter-clockwise when seen from outside the voxel,
    /// so `(0, 1, 2)` and `(2, 3, 0)` form the two front-facing triangles of the quad.
    pub fn corners(self) -> [Vector3<f32>; 4] {
        let v = Vector3::new;
        match self {
            BlockSide::BOTTOM => [
                v(0.0, 0.0, 0.0),
                v(1.0, 0.0, 0.0),
                v(1.0, 0.0, 1.0),
                v(0.0, 0.0, 1.0),
            ],
            BlockSide::TOP => [
                v(1.0, 1.0, 0.0),
                v(0.0, 1.0, 0.0),
                v(0.0, 1.0, 1.0),
                v(1.0, 1.0, 1.0),
            ],
            BlockSide::LEFT => [
                v(0.0, 1.0, 1.0),
                v(0.0, 1.0, 0.0),
                v(0.0, 0.0, 0.0),
                v(0.0, 0.0, 1.0),
            ],
            BlockSide::RIGHT => [
                v(1.0, 1.0, 0.0),
                v(1.0, 1.0, 1.0),
                v(1.0, 0.0, 1.0),
                v(1.0, 0.0, 0.0),
            ],
            BlockSide::FRONT => [
                v(1.0, 1.0, 1.0),
                v(0.0, 1.0, 1.0),
                v(0.0, 0.0, 1.0),
                v(1.0, 0.0, 1.0),
            ],
            BlockSide::BACK => [
                v(0.0, 1.0, 0.0),
                v(1.0, 1.0, 0.0),
                v(1.0, 0.0, 0.0),
                v(0.0, 0.0, 0.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn quad_winding_matches_outward_normal() {
        for side in BlockSide::all() {
            let [a, b, c, _] = side.corners();
            let winding = (b - a).cross(c - a).normalize();
            assert!(
                (winding - side.normal()).magnitude() < 1e-5,
                "{side:?} quad is wound against its normal"
            );
        }
    }

    #[test]
    fn opposite_sides_have_opposite_offsets() {
        assert_eq!(BlockSide::TOP.offset(), -BlockSide::BOTTOM.offset());
        assert_eq!(BlockSide::LEFT.offset(), -BlockSide::RIGHT.offset());
        assert_eq!(BlockSide::FRONT.offset(), -BlockSide::BACK.offset());
    }
}
