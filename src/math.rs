#![allow(dead_code)]

use nalgebra as na;

// Type defs for convenience
// Makes it easier to switch the maths library

// Float specializations
pub type Vec3f = na::Vector3<f32>;
pub type Mat4f = na::Matrix4<f32>;
pub type UnitQuatf = na::UnitQuaternion<f32>;

// Generic
pub type Vec3<T> = na::Vector3<T>;
pub type Mat4<T> = na::Matrix4<T>;
pub type UnitQuat<T> = na::UnitQuaternion<T>;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
   pub x: f32,
   pub y: f32,
   pub w: f32,
   pub h: f32
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `width` x `height` buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }
}


// We need to take care here because:
// * WebGL matrices are stored as an array in column-major order
// * nalgebra::Matrix4::new args are in row-major order
// https://developer.mozilla.org/en-US/docs/Web/API/XRRigidTransform/matrix
pub fn to_mat(v: &[f32]) -> Mat4f {
    Mat4::new(
        v[0],  v[4],  v[8],  v[12],
        v[1],  v[5],  v[9],  v[13],
        v[2],  v[6],  v[10], v[14],
        v[3],  v[7],  v[11], v[15],
    )
}


/// Approximate sRGB decode (gamma 2.2) of a 0..1 channel value.
pub fn srgb_to_linear(value: f64) -> f64 {
    value.powf(2.2)
}
