#[allow(unused_imports)]
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::*;

use crate::frame::{
    EyeView, FrameScheduler, ImmersiveFrame, ImmersiveSession, SessionError, SessionLifecycle,
    ViewerPose,
};
use crate::logging::printlog;
use crate::math::{to_mat, Rect};


pub(crate) type FrameCallback = Closure<dyn FnMut(f64, XrFrame)>;

/// The one XR frame callback, shared by every session it gets scheduled on.
pub(crate) type SharedFrameCallback = Rc<RefCell<Option<FrameCallback>>>;

fn request_animation_frame(session: &XrSession, f: &FrameCallback) -> u32 {
    // This turns the Closure into a js_sys::Function
    // See https://rustwasm.github.io/wasm-bindgen/api/wasm_bindgen/closure/struct.Closure.html#casting-a-closure-to-a-js_sysfunction
    session.request_animation_frame(f.as_ref().unchecked_ref())
}

pub(crate) fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) fn create_webgl_context(xr_mode: bool) -> Result<WebGl2RenderingContext, JsValue> {
    let canvas = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id("canvas"))
        .ok_or_else(|| JsValue::from_str("no #canvas element"))?
        .dyn_into::<HtmlCanvasElement>()?;

    // wgpu already owns a webgl2 context on this canvas, so this hands back
    // the same one
    let context = if xr_mode {
        let gl_attribs = Object::new();
        Reflect::set(
            &gl_attribs,
            &JsValue::from_str("xrCompatible"),
            &JsValue::TRUE,
        )?;
        canvas.get_context_with_context_options("webgl2", &gl_attribs)?
    } else {
        canvas.get_context("webgl2")?
    };

    context
        .ok_or_else(|| JsValue::from_str("webgl2 unavailable"))?
        .dyn_into()
}

/// Requests `immersive-vr` sessions rendering into the canvas's GL context.
pub struct WebXrLifecycle {
    gl: WebGl2RenderingContext,
    on_frame: SharedFrameCallback,
}

impl WebXrLifecycle {
    pub(crate) fn new(gl: WebGl2RenderingContext, on_frame: SharedFrameCallback) -> Self {
        Self { gl, on_frame }
    }

    async fn attach_layer(&self, session: &XrSession) -> Result<(), SessionError> {
        let rejected = |e: JsValue| SessionError::Rejected(js_error(&e));

        JsFuture::from(self.gl.make_xr_compatible()).await.map_err(rejected)?;
        let xr_gl_layer = XrWebGlLayer::new_with_web_gl2_rendering_context(session, &self.gl)
            .map_err(rejected)?;
        let mut render_state_init = XrRenderStateInit::new();
        render_state_init.base_layer(Some(&xr_gl_layer));
        session.update_render_state_with_state(&render_state_init);
        Ok(())
    }
}

impl SessionLifecycle for WebXrLifecycle {
    type Session = WebXrSession;

    async fn request_session(&self) -> Result<WebXrSession, SessionError> {
        printlog("Starting WebXR...");
        let navigator = web_sys::window().ok_or(SessionError::Unsupported)?.navigator();
        let xr_session_promise = navigator.xr().request_session(XrSessionMode::ImmersiveVr);
        let session: XrSession = JsFuture::from(xr_session_promise)
            .await
            .map_err(|e| SessionError::Rejected(js_error(&e)))?
            .into();

        if let Err(e) = self.attach_layer(&session).await {
            let _ = session.end();
            return Err(e);
        }

        Ok(WebXrSession {
            session,
            on_frame: self.on_frame.clone(),
        })
    }
}

pub struct WebXrSession {
    session: XrSession,
    on_frame: SharedFrameCallback,
}

impl FrameScheduler for WebXrSession {
    fn request_frame(&self) {
        match self.on_frame.borrow().as_ref() {
            Some(f) => {
                request_animation_frame(&self.session, f);
            }
            None => error!("XR frame callback missing"),
        }
    }
}

impl ImmersiveSession for WebXrSession {
    type ReferenceSpace = XrReferenceSpace;

    async fn request_reference_space(&self) -> Result<XrReferenceSpace, SessionError> {
        let ref_space_promise = self.session.request_reference_space(XrReferenceSpaceType::Local);
        let ref_space = JsFuture::from(ref_space_promise)
            .await
            .map_err(|e| SessionError::ReferenceSpace(js_error(&e)))?;
        Ok(ref_space.into())
    }

    fn on_end(&self, observer: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move |_event: XrSessionEvent| observer());
        self.session.set_onend(Some(callback.unchecked_ref()));
    }

    fn end(&self) {
        // Resolves after the `end` event has fired; nothing left to do then
        let _ = self.session.end();
    }
}

/// One `XRFrame` together with the layer its views are drawn into.
pub struct WebXrFrame {
    pub frame: XrFrame,
    pub layer: Option<XrWebGlLayer>,
}

impl ImmersiveFrame<XrReferenceSpace> for WebXrFrame {
    fn viewer_pose(&self, space: &XrReferenceSpace) -> Option<ViewerPose> {
        let layer = self.layer.as_ref()?;
        let viewer_pose = self.frame.get_viewer_pose(space)?;

        let views = viewer_pose
            .views()
            .iter()
            .filter_map(|view| {
                let view: XrView = view.into();
                let viewport = layer.get_viewport(&view)?;
                Some(EyeView {
                    viewport: Rect::new(
                        viewport.x() as f32,
                        viewport.y() as f32,
                        viewport.width() as f32,
                        viewport.height() as f32,
                    ),
                    projection: to_mat(&view.projection_matrix()),
                    view: to_mat(&view.transform().inverse().matrix()),
                })
            })
            .collect();

        Some(ViewerPose { views })
    }
}
