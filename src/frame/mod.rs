//! Dual-mode frame scheduling.
//!
//! A `FrameDriver` renders the scene either from the window's animation loop
//! or from an immersive session's own frame loop, never both. The platform
//! pieces (who calls us back next frame, how a session is negotiated, where
//! a head pose comes from) sit behind the traits in this module so the state
//! machine itself is plain Rust.

mod driver;
mod session;

pub use driver::FrameDriver;
pub use session::{enter_immersive, NoImmersive, SessionError, SessionLifecycle, SessionToken};

use crate::math::{Mat4f, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Windowed,
    Immersive,
}

/// Registers a one-shot callback for the next display refresh.
///
/// The callback itself is platform plumbing; whoever owns it routes the
/// refresh back into `FrameDriver::on_window_frame` or
/// `FrameDriver::on_immersive_frame`.
pub trait FrameScheduler {
    fn request_frame(&self);
}

/// A negotiated immersive session.
///
/// The session paces its own frames, which is why it is a `FrameScheduler`.
#[allow(async_fn_in_trait)]
pub trait ImmersiveSession: FrameScheduler {
    type ReferenceSpace;

    async fn request_reference_space(&self) -> Result<Self::ReferenceSpace, SessionError>;

    /// Subscribe to the end of the session. The platform fires this once,
    /// asynchronously, whether the user left through the platform UI or
    /// `end` was called.
    fn on_end(&self, observer: Box<dyn FnOnce()>);

    /// Ask the platform to end the session.
    fn end(&self);
}

/// One eye (or other view) of a viewer pose.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeView {
    pub viewport: Rect,
    pub projection: Mat4f,
    pub view: Mat4f,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerPose {
    pub views: Vec<EyeView>,
}

/// Per-frame data handed to an immersive frame callback.
pub trait ImmersiveFrame<Space> {
    /// Head pose relative to `space`. `None` while tracking is lost; that is
    /// not an error.
    fn viewer_pose(&self, space: &Space) -> Option<ViewerPose>;
}
