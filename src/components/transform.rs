use nalgebra as na;
use bevy_ecs::prelude::*;
use crate::math::{Mat4f, Vec3, Vec3f, UnitQuat, UnitQuatf};

/// Position, rotation and scale of a scene entity, with the model matrix
/// kept in sync on every change.
#[derive(Component,Debug)]
pub struct Transform {
    pos: Vec3f,
    rot: UnitQuatf,
    scale: Vec3f,
    m: Mat4f,
}

impl Transform {
    pub fn new(pos: Vec3f, rot: UnitQuatf, scale: Vec3f) -> Self {
        Self { pos, rot, scale, m: compose(pos, rot, scale) }
    }

    pub fn from_position(pos: Vec3f) -> Self {
        Self::new(pos, UnitQuat::identity(), Vec3::from_element(1.0))
    }

    pub fn from_position_scale(pos: Vec3f, scale: Vec3f) -> Self {
        Self::new(pos, UnitQuat::identity(), scale)
    }

    pub fn matrix(&self) -> Mat4f {
        self.m
    }

    pub fn position(&self) -> Vec3f {
        self.pos
    }

    pub fn rotation(&self) -> UnitQuatf {
        self.rot
    }

    /// Keeps the scale.
    pub fn set_pose(&mut self, pos: Vec3f, rot: UnitQuatf) {
        self.pos = pos;
        self.rot = rot;
        self.m = compose(pos, rot, self.scale);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::zeros())
    }
}

// translate * rotate * scale
fn compose(pos: Vec3f, rot: UnitQuatf, scale: Vec3f) -> Mat4f {
    na::Isometry3::from_parts(na::Translation3::from(pos), rot)
        .to_homogeneous()
        .prepend_nonuniform_scaling(&scale)
}
