mod camera;
mod crate_cube;
mod ground_plane;
mod model_spec;
mod render_order;
mod spin;
mod transform;
mod viewer;

pub use camera::{Camera, OPENGL_TO_WGPU_MATRIX};
pub use crate_cube::CrateCube;
pub use ground_plane::GroundPlane;
pub use model_spec::ModelSpec;
pub use render_order::RenderOrder;
pub use spin::Spin;
pub use transform::Transform;
pub use viewer::Viewer;
