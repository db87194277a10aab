use bevy_ecs::prelude::Resource;

use crate::math::Vec3f;

/// Tunables for the crate-and-grid scene.
#[derive(Resource, Debug, Clone)]
pub struct ExperienceConfig {
    pub title: String,
    /// Canvas size in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Windowed camera, vertical field of view in degrees.
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub clear_color: [f64; 4],
    pub plane_position: Vec3f,
    pub plane_scale: Vec3f,
    pub plane_texture: TextureSource,
    pub cube_position: Vec3f,
    pub cube_texture: TextureSource,
    /// Cube spin rates in degrees per second.
    pub spin_x_deg_per_sec: f32,
    pub spin_y_deg_per_sec: f32,
}

/// Texture name as used by the scene, and the file under `res/` that fills it.
#[derive(Debug, Clone)]
pub struct TextureSource {
    pub name: String,
    pub file: String,
}

impl TextureSource {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
        }
    }
}

impl ExperienceConfig {
    pub fn textures(&self) -> [&TextureSource; 2] {
        [&self.plane_texture, &self.cube_texture]
    }
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            title: "CubeXR".to_string(),
            width: 900,
            height: 600,
            fovy_deg: 60.0,
            znear: 0.1,
            zfar: 100.0,
            clear_color: [0.2, 0.2, 0.2, 1.0],
            plane_position: Vec3f::new(0.0, -1.0, -5.0),
            plane_scale: Vec3f::new(3.0, 1.0, 3.0),
            plane_texture: TextureSource::new("grid", "grid.png"),
            cube_position: Vec3f::new(0.0, 0.5, -5.0),
            cube_texture: TextureSource::new("crate", "crate.png"),
            spin_x_deg_per_sec: 10.0,
            spin_y_deg_per_sec: 15.0,
        }
    }
}
