use crate::math::{Mat4f, Rect};
use crate::mesh::MeshKind;

/// Where the next batch of draw commands ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The window's default framebuffer.
    Window,
    /// The framebuffer of the immersive session's layer for the current frame.
    SessionLayer,
}

/// Command sink the frame driver and draw step talk to.
///
/// Commands are recorded between `bind_target` and `present`. There are no
/// error returns here; a backend that cannot honour a command logs and drops
/// the frame.
pub trait RenderBackend {
    fn bind_target(&mut self, target: RenderTarget);

    /// Size of the window's drawing buffer in pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);

    fn clear(&mut self);

    fn set_viewport(&mut self, viewport: Rect);

    fn upload_camera(&mut self, projection: &Mat4f, view: &Mat4f);

    fn upload_model(&mut self, model: &Mat4f);

    fn bind_texture(&mut self, name: &str);

    fn bind_mesh(&mut self, mesh: MeshKind);

    fn draw_indexed(&mut self, index_count: u32);

    /// Submit everything recorded since `bind_target`.
    fn present(&mut self);

    /// Called once at the end of every immersive frame callback, drawn or
    /// not. Anything tied to that frame's session layer must be released
    /// here.
    fn end_session_frame(&mut self) {}
}
