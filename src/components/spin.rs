use bevy_ecs::prelude::*;

use crate::components::Transform;
use crate::math::{UnitQuat, UnitQuatf, Vec3, Vec3f};
use crate::systems::SceneTime;


/// Continuous rotation about X then Y, anchored at a fixed position.
///
/// The pose is recomputed from elapsed time every frame, never accumulated.
#[derive(Component, Debug, Clone)]
pub struct Spin {
    pub anchor: Vec3f,
    pub x_deg_per_sec: f32,
    pub y_deg_per_sec: f32,
}

impl Spin {
    pub fn angles(&self, elapsed_secs: f32) -> (f32, f32) {
        (
            self.x_deg_per_sec.to_radians() * elapsed_secs,
            self.y_deg_per_sec.to_radians() * elapsed_secs,
        )
    }

    pub fn rotation(&self, elapsed_secs: f32) -> UnitQuatf {
        let (rx, ry) = self.angles(elapsed_secs);
        UnitQuat::from_axis_angle(&Vec3::x_axis(), rx) * UnitQuat::from_axis_angle(&Vec3::y_axis(), ry)
    }

    pub fn update(time: Res<SceneTime>, mut spinners: Query<(&Spin, &mut Transform)>) {
        for (spin, mut transform) in spinners.iter_mut() {
            transform.set_pose(spin.anchor, spin.rotation(time.elapsed_secs));
        }
    }
}
