use bevy_ecs::prelude::*;

/// Draw order, lowest first. Depth testing resolves occlusion, so this only
/// needs to be stable.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderOrder(pub u32);
