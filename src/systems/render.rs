use bevy_ecs::prelude::*;

use crate::backend::RenderBackend;
use crate::components::{ModelSpec, RenderOrder, Transform};
use crate::math::Mat4f;


/// Draw the scene once with the given camera matrices.
///
/// Projection and view are uploaded once; then every drawable entity gets
/// its model matrix, texture and mesh bound and one indexed draw, in
/// ascending `RenderOrder`.
pub fn draw_scene<B: RenderBackend + ?Sized>(
    world: &mut World,
    backend: &mut B,
    projection: &Mat4f,
    view: &Mat4f,
) {
    backend.upload_camera(projection, view);

    let mut drawables = world.query::<(&ModelSpec, &Transform, &RenderOrder)>();
    let mut nodes: Vec<(&ModelSpec, &Transform, &RenderOrder)> = drawables.iter(world).collect();
    nodes.sort_by_key(|(_, _, order)| **order);

    for (model_spec, transform, _) in nodes {
        backend.upload_model(&transform.matrix());
        backend.bind_texture(&model_spec.texture);
        backend.bind_mesh(model_spec.mesh);
        backend.draw_indexed(model_spec.mesh.index_count());
    }
}
