#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use cubexr::{
    EyeView, FrameScheduler, ImmersiveFrame, ImmersiveSession, Mat4f, MeshKind, Rect,
    RenderBackend, RenderTarget, SessionError, SessionLifecycle, ViewerPose,
};

/// Everything the fakes observe, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    WindowFrameRequested,
    SessionFrameRequested(u32),
    SessionEndRequested(u32),
    BindTarget(RenderTarget),
    Clear,
    Viewport(Rect),
    Camera(Mat4f, Mat4f),
    Model(Mat4f),
    Texture(String),
    Mesh(MeshKind),
    Draw(u32),
    Present,
    SessionFrameEnded,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(journal: &Journal, call: &Call) -> usize {
    journal.borrow().iter().filter(|c| *c == call).count()
}

pub fn draws(journal: &Journal) -> Vec<u32> {
    journal
        .borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Draw(n) => Some(*n),
            _ => None,
        })
        .collect()
}


pub struct FakeWindow(pub Journal);

impl FrameScheduler for FakeWindow {
    fn request_frame(&self) {
        self.0.borrow_mut().push(Call::WindowFrameRequested);
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct FakeSpace(pub u32);

/// Shared with the test so it can play the platform's part, firing the end
/// event when it chooses.
pub struct SessionHandle {
    pub id: u32,
    journal: Journal,
    observers: RefCell<Vec<Box<dyn FnOnce()>>>,
    space: RefCell<Option<Result<FakeSpace, SessionError>>>,
    end_while_resolving_space: Cell<bool>,
}

impl SessionHandle {
    pub fn fire_end(&self) {
        let observers: Vec<_> = self.observers.borrow_mut().drain(..).collect();
        for observer in observers {
            observer();
        }
    }

    pub fn end_while_resolving_space(&self) {
        self.end_while_resolving_space.set(true);
    }

    pub fn fail_space(&self, reason: &str) {
        *self.space.borrow_mut() = Some(Err(SessionError::ReferenceSpace(reason.to_string())));
    }
}

pub struct FakeSession(pub Rc<SessionHandle>);

impl FrameScheduler for FakeSession {
    fn request_frame(&self) {
        self.0.journal.borrow_mut().push(Call::SessionFrameRequested(self.0.id));
    }
}

impl ImmersiveSession for FakeSession {
    type ReferenceSpace = FakeSpace;

    async fn request_reference_space(&self) -> Result<FakeSpace, SessionError> {
        if self.0.end_while_resolving_space.get() {
            self.0.fire_end();
        }
        self.0
            .space
            .borrow_mut()
            .take()
            .unwrap_or(Ok(FakeSpace(self.0.id)))
    }

    fn on_end(&self, observer: Box<dyn FnOnce()>) {
        self.0.observers.borrow_mut().push(observer);
    }

    fn end(&self) {
        // The platform reports the end later; tests call `fire_end`
        self.0.journal.borrow_mut().push(Call::SessionEndRequested(self.0.id));
    }
}


/// Hands out queued sessions, or refuses once the queue is empty.
pub struct FakeLifecycle {
    journal: Journal,
    next_id: Cell<u32>,
    queue: RefCell<VecDeque<Result<Rc<SessionHandle>, SessionError>>>,
    pub requests: Cell<u32>,
}

impl FakeLifecycle {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            next_id: Cell::new(0),
            queue: RefCell::new(VecDeque::new()),
            requests: Cell::new(0),
        }
    }

    /// Queue a session that will be granted; returns its handle.
    pub fn grant(&self) -> Rc<SessionHandle> {
        self.next_id.set(self.next_id.get() + 1);
        let handle = Rc::new(SessionHandle {
            id: self.next_id.get(),
            journal: self.journal.clone(),
            observers: RefCell::new(Vec::new()),
            space: RefCell::new(None),
            end_while_resolving_space: Cell::new(false),
        });
        self.queue.borrow_mut().push_back(Ok(handle.clone()));
        handle
    }

    pub fn refuse(&self, error: SessionError) {
        self.queue.borrow_mut().push_back(Err(error));
    }
}

impl SessionLifecycle for FakeLifecycle {
    type Session = FakeSession;

    async fn request_session(&self) -> Result<FakeSession, SessionError> {
        self.requests.set(self.requests.get() + 1);
        self.queue
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(SessionError::Unsupported))
            .map(FakeSession)
    }
}


pub struct FakeFrame(pub Option<ViewerPose>);

impl ImmersiveFrame<FakeSpace> for FakeFrame {
    fn viewer_pose(&self, _space: &FakeSpace) -> Option<ViewerPose> {
        self.0.clone()
    }
}

pub fn eye(x: f32, offset: f32) -> EyeView {
    EyeView {
        viewport: Rect::new(x, 0.0, 450.0, 600.0),
        projection: Mat4f::identity() * 2.0,
        view: Mat4f::new_translation(&cubexr::Vec3f::new(offset, 0.0, 0.0)),
    }
}

pub fn stereo_pose() -> ViewerPose {
    ViewerPose {
        views: vec![eye(0.0, 0.03), eye(450.0, -0.03)],
    }
}


pub struct RecordingBackend(pub Journal);

impl RenderBackend for RecordingBackend {
    fn bind_target(&mut self, target: RenderTarget) {
        self.0.borrow_mut().push(Call::BindTarget(target));
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (900, 600)
    }

    fn clear(&mut self) {
        self.0.borrow_mut().push(Call::Clear);
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.0.borrow_mut().push(Call::Viewport(viewport));
    }

    fn upload_camera(&mut self, projection: &Mat4f, view: &Mat4f) {
        self.0.borrow_mut().push(Call::Camera(*projection, *view));
    }

    fn upload_model(&mut self, model: &Mat4f) {
        self.0.borrow_mut().push(Call::Model(*model));
    }

    fn bind_texture(&mut self, name: &str) {
        self.0.borrow_mut().push(Call::Texture(name.to_string()));
    }

    fn bind_mesh(&mut self, mesh: MeshKind) {
        self.0.borrow_mut().push(Call::Mesh(mesh));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.0.borrow_mut().push(Call::Draw(index_count));
    }

    fn present(&mut self) {
        self.0.borrow_mut().push(Call::Present);
    }

    fn end_session_frame(&mut self) {
        self.0.borrow_mut().push(Call::SessionFrameEnded);
    }
}
