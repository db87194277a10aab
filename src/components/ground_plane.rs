use bevy_ecs::prelude::*;

use crate::components::{ModelSpec, RenderOrder, Transform};
use crate::config::ExperienceConfig;
use crate::mesh::MeshKind;

#[derive(Component)]
pub struct GroundPlane;

impl GroundPlane {
    pub fn spawn(mut commands: Commands, config: Res<ExperienceConfig>) {
        let modelspec = ModelSpec::new(MeshKind::Plane, &config.plane_texture.name);
        let transform = Transform::from_position_scale(config.plane_position, config.plane_scale);

        commands.spawn((GroundPlane, transform, modelspec, RenderOrder(0)));
    }
}
