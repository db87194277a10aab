use bevy_ecs::prelude::*;

use crate::components::{Camera, Transform};
use crate::config::ExperienceConfig;

/// The windowed-mode eye. It sits at the origin looking down -Z; immersive
/// frames bring their own per-eye matrices instead.
#[derive(Component)]
pub struct Viewer;

impl Viewer {
    pub fn spawn(mut commands: Commands, config: Res<ExperienceConfig>) {
        let camera = Camera::new(
            config.width,
            config.height,
            config.fovy_deg.to_radians(),
            config.znear,
            config.zfar,
        );
        commands.spawn((Viewer, camera, Transform::default()));
    }
}
