#[allow(unused_imports)]
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, XrFrame, XrSessionMode};

use crate::frame::{enter_immersive, FrameDriver, Mode, SessionError};
use crate::renderers::{utils, TexturedPass};

use super::webxr::{create_webgl_context, js_error, SharedFrameCallback};
use super::{WebXrFrame, WebXrLifecycle, WebXrSession};

type Driver = Rc<RefCell<FrameDriver<WebXrSession>>>;


/// Hook the immersive frame loop up to `driver` and offer the "Enter XR"
/// button if the browser can run an `immersive-vr` session.
pub fn install(driver: Driver, backend: Rc<RefCell<TexturedPass>>) {
    let gl = match create_webgl_context(true) {
        Ok(gl) => gl,
        Err(e) => {
            error!("No XR compatible webgl2 context: {}", js_error(&e));
            return;
        }
    };

    let on_frame: SharedFrameCallback = Rc::new(RefCell::new(None));
    {
        let driver = Rc::downgrade(&driver);
        let backend = Rc::downgrade(&backend);
        *on_frame.borrow_mut() = Some(Closure::new(move |time: f64, frame: XrFrame| {
            if let (Some(driver), Some(backend)) = (driver.upgrade(), backend.upgrade()) {
                on_xr_frame(&driver, &backend, time, frame);
            }
        }));
    }

    let lifecycle = Rc::new(WebXrLifecycle::new(gl, on_frame));
    wasm_bindgen_futures::spawn_local(offer_immersive(driver, lifecycle));
}

fn on_xr_frame(
    driver: &RefCell<FrameDriver<WebXrSession>>,
    backend: &RefCell<TexturedPass>,
    time: f64,
    frame: XrFrame,
) {
    let layer = frame.session().render_state().base_layer();
    let mut backend = backend.borrow_mut();
    backend.poll_textures();

    if let Some(layer) = &layer {
        let color_texture = utils::create_view_from_device_framebuffer(
            backend.device(),
            layer.framebuffer(),
            layer,
            backend.color_format(),
            "device framebuffer (colour)");
        backend.set_session_layer(color_texture);
    }

    let frame = WebXrFrame { frame, layer };
    driver.borrow_mut().on_immersive_frame(time, &frame, &mut *backend);
}

async fn immersive_supported() -> Result<bool, SessionError> {
    let navigator = web_sys::window().ok_or(SessionError::Unsupported)?.navigator();
    // navigator.xr is missing outside secure contexts
    if !Reflect::has(&navigator, &JsValue::from_str("xr")).unwrap_or(false) {
        return Ok(false);
    }
    let supported = JsFuture::from(navigator.xr().is_session_supported(XrSessionMode::ImmersiveVr))
        .await
        .map_err(|e| SessionError::Rejected(js_error(&e)))?;
    Ok(supported.as_bool().unwrap_or(false))
}

async fn offer_immersive(driver: Driver, lifecycle: Rc<WebXrLifecycle>) {
    match immersive_supported().await {
        Ok(true) => {
            if let Err(e) = show_enter_button(driver, lifecycle) {
                error!("Couldn't set up #xr-btn: {}", js_error(&e));
            }
        }
        Ok(false) => report_unsupported(&SessionError::Unsupported),
        Err(e) => report_unsupported(&e),
    }
}

fn report_unsupported(e: &SessionError) {
    warn!("{e}");
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message("Warning: WebXR not supported");
    }
}

fn show_enter_button(driver: Driver, lifecycle: Rc<WebXrLifecycle>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|win| win.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let button: HtmlElement = document
        .get_element_by_id("xr-btn")
        .ok_or_else(|| JsValue::from_str("no #xr-btn element"))?
        .dyn_into()?;

    let on_click = {
        let driver = driver.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            let driver = driver.clone();
            let lifecycle = lifecycle.clone();
            // future_to_promise rather than spawn_local, which loses the user
            // activation the session request needs on the Meta Quest browser
            let _ = wasm_bindgen_futures::future_to_promise(async move {
                enter_immersive(&driver, &*lifecycle).await;
                Ok(JsValue::UNDEFINED)
            });
        })
    };
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

    let on_key_down = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if event.key() != "Escape" {
            return;
        }
        let driver = driver.borrow();
        if driver.mode() == Mode::Immersive {
            driver.exit_immersive();
        }
    });
    document.add_event_listener_with_callback("keydown", on_key_down.as_ref().unchecked_ref())?;

    // Both live as long as the page
    on_click.forget();
    on_key_down.forget();

    button.style().set_property("display", "inline")
}
