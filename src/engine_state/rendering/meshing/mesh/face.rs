use cgmath::{EuclideanSpace, Point3, Vector3};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::block::texture_for;

/// Index of the quad corner used by each of the six emitted vertices.
///
/// Two triangles, `(0, 1, 2)` and `(2, 3, 0)`, wound like [`BlockSide::corners`].
const QUAD_CORNERS: [usize; 6] = [0, 1, 2, 2, 3, 0];

/// Atlas tile offset for each quad corner, in whole tiles.
const CORNER_UV: [(u32, u32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// A single visible face of a voxel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Chunk-local position of the voxel's minimum corner
    pub origin: Point3<i32>,
    /// The block the face belongs to, used for texture lookup
    pub block: BlockType,
    /// Which side of the block this face represents
    pub side: BlockSide,
}

impl Face {
    /// Creates a face of the voxel at local coordinates `(x, y, z)`.
    pub fn new(x: i32, y: i32, z: i32, block: BlockType, side: BlockSide) -> Self {
        Face {
            origin: Point3::new(x, y, z),
            block,
            side,
        }
    }

    /// Appends the face's two triangles to a vertex list.
    ///
    /// Blocks without a texture entry are drawn with the atlas' first tile.
    pub fn emit(&self, out: &mut Vec<Vertex>) {
        let origin = Vector3::new(
            self.origin.x as f32,
            self.origin.y as f32,
            self.origin.z as f32,
        );
        let corners = self.side.corners();
        let normal = self.side.normal();
        let tile = texture_for(self.block, self.side).unwrap_or_default();

        out.extend(QUAD_CORNERS.iter().map(|&corner| {
            let (du, dv) = CORNER_UV[corner];
            Vertex::new(
                Point3::from_vec(origin + corners[corner]),
                normal,
                tile.uv(du, dv),
            )
        }));
    }
}
