mod render;
mod schedules;

use bevy_ecs::prelude::*;

pub use render::draw_scene;
pub use schedules::{new_spawn_scene_schedule, new_update_schedule, SpawnLabel, UpdateLabel};

/// Timestamp (ms) the animation counts from.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneClock {
    pub start_ms: f64,
}

impl SceneClock {
    pub fn elapsed_secs(&self, timestamp_ms: f64) -> f32 {
        ((timestamp_ms - self.start_ms) / 1000.0) as f32
    }
}

/// Seconds since `SceneClock::start_ms` for the frame being built.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SceneTime {
    pub elapsed_secs: f32,
}
