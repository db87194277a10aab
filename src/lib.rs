mod app;
mod assets;
mod backend;
mod clock;
mod components;
mod config;
mod device;
mod frame;
mod logging;
mod math;
mod mesh;
mod renderers;
mod systems;
mod texture;

#[cfg(target_arch="wasm32")]
mod xr;

#[cfg(target_arch="wasm32")]
use wasm_bindgen::prelude::*;

pub use app::{run_experience, App};
pub use backend::{RenderBackend, RenderTarget};
pub use components::{Camera, ModelSpec, RenderOrder, Spin, Transform};
pub use config::ExperienceConfig;
pub use frame::{
    enter_immersive, EyeView, FrameDriver, FrameScheduler, ImmersiveFrame, ImmersiveSession,
    Mode, NoImmersive, SessionError, SessionLifecycle, SessionToken, ViewerPose,
};
pub use math::{Mat4f, Rect, UnitQuatf, Vec3f};
pub use mesh::MeshKind;
pub use systems::draw_scene;


#[cfg_attr(target_arch="wasm32", wasm_bindgen(start))]
pub async fn run() {
    crate::app::run_experience(ExperienceConfig::default()).await
}
