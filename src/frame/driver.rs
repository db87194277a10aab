#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::app::App;
use crate::backend::{RenderBackend, RenderTarget};
use crate::math::Rect;

use super::session::SessionToken;
use super::{FrameScheduler, ImmersiveFrame, ImmersiveSession, Mode};


enum DriverState<S: ImmersiveSession> {
    Windowed,
    Immersive {
        token: SessionToken,
        session: S,
        space: S::ReferenceSpace,
    },
}

/// Owns the scene and decides, per display refresh, which loop drives it.
///
/// Only one frame callback is ever outstanding per loop. The window loop is
/// tracked with `window_frame_pending`; the immersive loop re-arms itself from
/// inside its own callback and dies with its session.
pub struct FrameDriver<S: ImmersiveSession> {
    app: App,
    window: Box<dyn FrameScheduler>,
    state: DriverState<S>,
    window_frame_pending: bool,
    next_token: u64,
}

impl<S: ImmersiveSession> FrameDriver<S> {
    pub fn new(app: App, window: Box<dyn FrameScheduler>) -> Self {
        Self {
            app,
            window,
            state: DriverState::Windowed,
            window_frame_pending: false,
            next_token: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.state {
            DriverState::Windowed => Mode::Windowed,
            DriverState::Immersive { .. } => Mode::Immersive,
        }
    }

    /// Kick off the window loop.
    pub fn start(&mut self) {
        self.request_window_frame();
    }

    fn request_window_frame(&mut self) {
        if !self.window_frame_pending {
            self.window_frame_pending = true;
            self.window.request_frame();
        }
    }

    pub fn on_window_frame<B: RenderBackend + ?Sized>(&mut self, timestamp_ms: f64, backend: &mut B) {
        self.window_frame_pending = false;
        if self.mode() != Mode::Windowed {
            // Requested before the session started; let the chain die here
            debug!("Dropping window frame while immersive");
            return;
        }

        // Queue next frame before doing any work
        self.request_window_frame();

        self.app.update_scene(timestamp_ms);
        let Some((projection, view)) = self.app.windowed_camera() else {
            warn!("No viewer in scene, skipping window frame");
            return;
        };

        backend.bind_target(RenderTarget::Window);
        backend.clear();
        let (width, height) = backend.drawing_buffer_size();
        backend.set_viewport(Rect::full(width, height));
        self.app.draw(backend, &projection, &view);
        backend.present();
    }

    pub fn on_immersive_frame<F, B>(&mut self, timestamp_ms: f64, frame: &F, backend: &mut B)
    where
        F: ImmersiveFrame<S::ReferenceSpace> + ?Sized,
        B: RenderBackend + ?Sized,
    {
        self.draw_immersive_frame(timestamp_ms, frame, backend);
        // The layer framebuffer is only valid inside this callback
        backend.end_session_frame();
    }

    fn draw_immersive_frame<F, B>(&mut self, timestamp_ms: f64, frame: &F, backend: &mut B)
    where
        F: ImmersiveFrame<S::ReferenceSpace> + ?Sized,
        B: RenderBackend + ?Sized,
    {
        let DriverState::Immersive { session, space, .. } = &self.state else {
            debug!("Dropping immersive frame while windowed");
            return;
        };

        // Queue next XR frame
        session.request_frame();

        self.app.update_scene(timestamp_ms);

        // Poses drop out while tracking is lost; keep the loop alive and wait
        let Some(pose) = frame.viewer_pose(space) else {
            return;
        };

        backend.bind_target(RenderTarget::SessionLayer);
        backend.clear();
        for view in &pose.views {
            backend.set_viewport(view.viewport);
            self.app.draw(backend, &view.projection, &view.view);
        }
        backend.present();
    }

    /// Token identifying the next session, so a late end notification from an
    /// older session can't tear down a newer one.
    pub fn next_session_token(&mut self) -> SessionToken {
        self.next_token += 1;
        SessionToken(self.next_token)
    }

    /// Windowed -> Immersive. The session's frame loop takes over from here.
    pub fn on_session_started(&mut self, token: SessionToken, session: S, space: S::ReferenceSpace) {
        if self.mode() == Mode::Immersive {
            warn!("Already immersive, ending the extra session");
            session.end();
            return;
        }
        info!("Entering immersive mode");
        session.request_frame();
        self.state = DriverState::Immersive { token, session, space };
    }

    /// Immersive -> Windowed. A no-op unless `token` names the active session.
    pub fn on_session_end(&mut self, token: SessionToken) {
        match &self.state {
            DriverState::Immersive { token: active, .. } if *active == token => {
                info!("Exiting immersive mode");
                self.state = DriverState::Windowed;
                // Restart regular animation loop
                self.request_window_frame();
            }
            _ => debug!("Ignoring end of inactive session {token:?}"),
        }
    }

    /// Ask the active session to end. The transition itself happens when the
    /// session's end notification arrives.
    pub fn exit_immersive(&self) {
        if let DriverState::Immersive { session, .. } = &self.state {
            info!("Manually exiting immersive session");
            session.end();
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.app.resize(width, height);
    }
}
