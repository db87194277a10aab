use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use super::{FrameDriver, FrameScheduler, ImmersiveSession, Mode};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(pub(super) u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The platform has no immersive support at all.
    Unsupported,
    /// The session request was refused (no device, no user gesture, ...).
    Rejected(String),
    /// The session started but its reference space could not be created.
    ReferenceSpace(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Unsupported => write!(f, "immersive sessions are not supported"),
            SessionError::Rejected(reason) => write!(f, "session request rejected: {reason}"),
            SessionError::ReferenceSpace(reason) => {
                write!(f, "reference space request failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Where immersive sessions come from.
#[allow(async_fn_in_trait)]
pub trait SessionLifecycle {
    type Session: ImmersiveSession;

    async fn request_session(&self) -> Result<Self::Session, SessionError>;
}

/// Session type for builds with no immersive platform. It has no values, so
/// a driver parameterised with it can never leave windowed mode.
pub enum NoImmersive {}

impl FrameScheduler for NoImmersive {
    fn request_frame(&self) {
        match *self {}
    }
}

impl ImmersiveSession for NoImmersive {
    type ReferenceSpace = ();

    async fn request_reference_space(&self) -> Result<(), SessionError> {
        match *self {}
    }

    fn on_end(&self, _observer: Box<dyn FnOnce()>) {
        match *self {}
    }

    fn end(&self) {
        match *self {}
    }
}

/// Negotiate an immersive session and hand it to `driver`.
///
/// Every failure is logged and leaves the driver windowed; nothing is
/// returned to the caller except the resulting mode.
pub async fn enter_immersive<L: SessionLifecycle>(
    driver: &Rc<RefCell<FrameDriver<L::Session>>>,
    lifecycle: &L,
) -> Mode
where
    L::Session: 'static,
{
    if driver.borrow().mode() == Mode::Immersive {
        return Mode::Immersive;
    }
    info!("Enter XR");

    let session = match lifecycle.request_session().await {
        Ok(session) => session,
        Err(e) => {
            error!("{e}");
            return driver.borrow().mode();
        }
    };

    let token = driver.borrow_mut().next_session_token();
    let ended = Rc::new(Cell::new(false));
    {
        let driver = Rc::downgrade(driver);
        let ended = ended.clone();
        session.on_end(Box::new(move || {
            ended.set(true);
            if let Some(driver) = driver.upgrade() {
                driver.borrow_mut().on_session_end(token);
            }
        }));
    }

    match session.request_reference_space().await {
        Ok(space) if !ended.get() => driver.borrow_mut().on_session_started(token, session, space),
        Ok(_) => warn!("Session ended before its reference space was ready"),
        Err(e) => {
            error!("{e}");
            session.end();
        }
    }
    driver.borrow().mode()
}
