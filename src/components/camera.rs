use nalgebra as na;
use bevy_ecs::prelude::*;
use crate::math::{Mat4, Mat4f};
use crate::components::Transform;


/// Maps GL clip-space depth (-1..1) onto wgpu's (0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Mat4f = Mat4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);


#[derive(Debug,Component)]
pub struct Camera {
    perspective: na::Perspective3<f32>,
}

impl Camera {
    /// `fovy` is in radians.
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            perspective: na::Perspective3::new(width as f32 / height as f32, fovy, znear, zfar)
        }
    }

    pub fn view_matrix(&self, transform: &Transform) -> Mat4f {
        transform.matrix().try_inverse().unwrap_or_else(Mat4f::identity)
    }

    pub fn projection_matrix(&self) -> Mat4f {
        self.perspective.as_matrix().clone()
    }

    pub fn aspect(&self) -> f32 {
        self.perspective.aspect()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.perspective.set_aspect(width as f32 / height as f32);
        }
    }
}
