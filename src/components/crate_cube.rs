use bevy_ecs::prelude::*;

use crate::components::{ModelSpec, RenderOrder, Spin, Transform};
use crate::config::ExperienceConfig;
use crate::mesh::MeshKind;

#[derive(Component)]
pub struct CrateCube;

impl CrateCube {
    pub fn spawn(mut commands: Commands, config: Res<ExperienceConfig>) {
        let modelspec = ModelSpec::new(MeshKind::Cube, &config.cube_texture.name);
        let transform = Transform::from_position(config.cube_position);
        let spin = Spin {
            anchor: config.cube_position,
            x_deg_per_sec: config.spin_x_deg_per_sec,
            y_deg_per_sec: config.spin_y_deg_per_sec,
        };

        commands.spawn((CrateCube, transform, modelspec, spin, RenderOrder(1)));
    }
}
