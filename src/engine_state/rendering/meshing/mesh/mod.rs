//! Mesh storage for chunk rendering.
//!
//! # Architecture
//! - [`Mesh`]: a finished, immutable triangle list for one chunk
//! - [`MeshSlots`]: the pending/active double buffer each renderable chunk carries
//! - [`Face`]: one visible voxel face and the six vertices it expands to

use std::sync::Arc;

use crate::core::MtResource;
use crate::engine_state::rendering::Vertex;

mod face;

pub use face::Face;

/// Vertices emitted for every visible face.
pub const VERTICES_PER_FACE: usize = 6;

/// A chunk's surface as a flat triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_face(&mut self, face: Face) {
        face.emit(&mut self.vertices);
    }

    /// Number of quads in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertex data as raw bytes, ready to upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Double-buffered mesh storage for one chunk.
///
/// The mesher writes into the pending slot; the render consumer moves the pending mesh
/// into the active slot at the start of a frame and draws from there. Each slot is only
/// locked for the instant of a swap, so neither side waits on the other's work.
#[derive(Default)]
pub struct MeshSlots {
    pending: MtResource<Option<Mesh>>,
    active: MtResource<Option<Arc<Mesh>>>,
}

impl MeshSlots {
    /// Stores a freshly built mesh, replacing any mesh that was never promoted.
    pub fn queue(&self, mesh: Mesh) {
        self.pending.replace(Some(mesh));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Moves the pending mesh into the active slot.
    ///
    /// # Returns
    /// `true` if there was a pending mesh. The previously active mesh is dropped.
    pub fn promote(&self) -> bool {
        match self.pending.replace(None) {
            Some(mesh) => {
                self.active.replace(Some(Arc::new(mesh)));
                true
            }
            None => false,
        }
    }

    /// The mesh currently being drawn.
    pub fn active(&self) -> Option<Arc<Mesh>> {
        self.active.get().clone()
    }

    /// Drops the active mesh.
    pub fn release(&self) {
        self.active.replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use cgmath::InnerSpace;

    #[test]
    fn each_face_is_two_triangles_facing_its_normal() {
        let mut mesh = Mesh::new();
        for side in BlockSide::all() {
            mesh.push_face(Face::new(2, 3, 4, BlockType::STONE, side));
        }
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertices.len(), 36);

        for triangle in mesh.vertices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| triangle[i].position());
            let winding = (b - a).cross(c - a).normalize();
            assert!((winding - triangle[0].normal()).magnitude() < 1e-5);
        }
    }

    #[test]
    fn grass_top_uses_its_own_tile() {
        let mut mesh = Mesh::new();
        mesh.push_face(Face::new(0, 0, 0, BlockType::GRASS, BlockSide::TOP));
        let uvs: Vec<_> = mesh.vertices.iter().map(|v| v.tex_coords).collect();
        assert_eq!(uvs[0], [0.0, 0.0]);
        assert_eq!(uvs[2], [1.0 / 16.0, 1.0 / 16.0]);
        assert_eq!(uvs[5], uvs[0]);
    }

    #[test]
    fn promote_moves_pending_into_active() {
        let slots = MeshSlots::default();
        assert!(!slots.promote());

        let mut mesh = Mesh::new();
        mesh.push_face(Face::new(0, 0, 0, BlockType::DIRT, BlockSide::TOP));
        slots.queue(mesh);
        assert!(slots.has_pending());
        assert!(slots.promote());
        assert!(!slots.has_pending());
        assert_eq!(slots.active().map(|m| m.face_count()), Some(1));

        slots.release();
        assert!(slots.active().is_none());
    }
}
