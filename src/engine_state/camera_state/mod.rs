//! # Observer State
//!
//! The streaming pipeline does not own a camera. It reads a [`CameraSnapshot`] (a
//! position and a view-projection matrix) from a [`CameraSource`] at the start of every
//! scheduling tick and treats it as read-only for the rest of the tick.
//!
//! ## Core Components
//! - `CameraSnapshot`: one observer pose plus the chunk visibility tests built on it
//! - `CameraSource`: anything the schedulers can poll for a snapshot
//! - `SharedCamera`: a source the windowing layer writes into every frame

use cgmath::{perspective, Deg, EuclideanSpace, Matrix4, Point3, SquareMatrix, Vector3};

use crate::core::MtResource;

pub mod frustum;

/// Vertical field of view used by [`CameraSnapshot::looking_at`].
pub const DEFAULT_FOVY: Deg<f32> = Deg(70.0);
/// Near plane used by [`CameraSnapshot::looking_at`].
pub const DEFAULT_ZNEAR: f32 = 0.1;
/// Far plane used by [`CameraSnapshot::looking_at`].
pub const DEFAULT_ZFAR: f32 = 1000.0;

/// The observer's pose at one instant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraSnapshot {
    /// World position of the eye.
    pub position: Point3<f32>,
    /// Projection times view, mapping world space to clip space.
    pub view_projection: Matrix4<f32>,
}

impl CameraSnapshot {
    pub fn new(position: Point3<f32>, view_projection: Matrix4<f32>) -> Self {
        CameraSnapshot {
            position,
            view_projection,
        }
    }

    /// A perspective camera at `position` looking along `direction`.
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `direction` - View direction; need not be normalized, must not be vertical
    /// * `aspect` - Viewport width divided by height
    pub fn looking_at(position: Point3<f32>, direction: Vector3<f32>, aspect: f32) -> Self {
        let view = Matrix4::look_to_rh(position, direction, Vector3::unit_y());
        let projection = perspective(DEFAULT_FOVY, aspect, DEFAULT_ZNEAR, DEFAULT_ZFAR);
        CameraSnapshot::new(position, projection * view)
    }
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        CameraSnapshot::new(Point3::origin(), Matrix4::identity())
    }
}

/// Supplies the observer pose to the scheduling threads.
pub trait CameraSource: Send + Sync {
    fn snapshot(&self) -> CameraSnapshot;
}

/// A fixed pose is its own source.
impl CameraSource for CameraSnapshot {
    fn snapshot(&self) -> CameraSnapshot {
        *self
    }
}

/// A camera pose shared between the thread that moves it and the schedulers.
///
/// Clones share the same pose.
#[derive(Clone, Default)]
pub struct SharedCamera {
    pose: MtResource<CameraSnapshot>,
}

impl SharedCamera {
    pub fn new(initial: CameraSnapshot) -> Self {
        SharedCamera {
            pose: MtResource::new(initial),
        }
    }

    /// Publishes a new pose.
    pub fn set(&self, snapshot: CameraSnapshot) {
        *self.pose.get_mut() = snapshot;
    }
}

impl CameraSource for SharedCamera {
    fn snapshot(&self) -> CameraSnapshot {
        *self.pose.get()
    }
}
