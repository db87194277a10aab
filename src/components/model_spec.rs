use bevy_ecs::prelude::*;

use crate::mesh::MeshKind;


/// What to draw for an entity: which mesh, wearing which texture.
#[derive(Component, Debug, Clone)]
pub struct ModelSpec {
    pub mesh: MeshKind,
    pub texture: String,
}

impl ModelSpec {
    pub fn new(mesh: MeshKind, texture: &str) -> ModelSpec {
        Self {
            mesh,
            texture: texture.to_string(),
        }
    }
}
