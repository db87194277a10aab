mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use cubexr::{
    enter_immersive, App, ExperienceConfig, FrameDriver, Mat4f, MeshKind, Mode, Rect,
    RenderTarget, SessionError, Spin, Transform, Vec3f,
};

type Driver = Rc<RefCell<FrameDriver<FakeSession>>>;

fn started_driver(journal: &Journal) -> Driver {
    let app = App::new(ExperienceConfig::default(), 1000.0);
    let mut driver = FrameDriver::new(app, Box::new(FakeWindow(journal.clone())));
    driver.start();
    Rc::new(RefCell::new(driver))
}

fn window_frame(driver: &Driver, journal: &Journal, timestamp_ms: f64) {
    let mut backend = RecordingBackend(journal.clone());
    driver.borrow_mut().on_window_frame(timestamp_ms, &mut backend);
}

fn immersive_frame(driver: &Driver, journal: &Journal, pose: Option<cubexr::ViewerPose>) {
    let mut backend = RecordingBackend(journal.clone());
    driver
        .borrow_mut()
        .on_immersive_frame(2000.0, &FakeFrame(pose), &mut backend);
}

fn enter(driver: &Driver, lifecycle: &FakeLifecycle) -> Mode {
    pollster::block_on(enter_immersive(driver, lifecycle))
}


#[test]
fn start_requests_one_window_frame() {
    let journal = journal();
    let driver = started_driver(&journal);
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    assert_eq!(*journal.borrow(), vec![Call::WindowFrameRequested]);
}

#[test]
fn window_frame_requests_next_frame_before_drawing() {
    let journal = journal();
    let driver = started_driver(&journal);
    journal.borrow_mut().clear();

    window_frame(&driver, &journal, 1000.0);

    let calls = journal.borrow();
    assert_eq!(calls[0], Call::WindowFrameRequested);
    assert_eq!(calls[1], Call::BindTarget(RenderTarget::Window));
    assert_eq!(calls[2], Call::Clear);
    assert_eq!(calls[3], Call::Viewport(Rect::new(0.0, 0.0, 900.0, 600.0)));
    assert!(matches!(calls[4], Call::Camera(_, view) if view == Mat4f::identity()));
    assert_eq!(calls.last(), Some(&Call::Present));
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 1);
}

#[test]
fn window_frame_draws_plane_then_cube() {
    let journal = journal();
    let driver = started_driver(&journal);
    window_frame(&driver, &journal, 1000.0);

    assert_eq!(draws(&journal), vec![6, 36]);
    let textures: Vec<Call> = journal
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Texture(_) | Call::Mesh(_)))
        .cloned()
        .collect();
    assert_eq!(
        textures,
        vec![
            Call::Texture("grid".to_string()),
            Call::Mesh(MeshKind::Plane),
            Call::Texture("crate".to_string()),
            Call::Mesh(MeshKind::Cube),
        ]
    );
}

#[test]
fn cube_pose_follows_elapsed_time() {
    let journal = journal();
    let driver = started_driver(&journal);
    // Two seconds after the start timestamp
    window_frame(&driver, &journal, 3000.0);

    let models: Vec<Mat4f> = journal
        .borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Model(m) => Some(*m),
            _ => None,
        })
        .collect();
    let anchor = Vec3f::new(0.0, 0.5, -5.0);
    let spin = Spin { anchor, x_deg_per_sec: 10.0, y_deg_per_sec: 15.0 };
    let expected = Transform::new(anchor, spin.rotation(2.0), Vec3f::new(1.0, 1.0, 1.0));
    assert!((models[1] - expected.matrix()).abs().max() < 1e-6);

    let plane = Transform::from_position_scale(Vec3f::new(0.0, -1.0, -5.0), Vec3f::new(3.0, 1.0, 3.0));
    assert_eq!(models[0], plane.matrix());
}

#[test]
fn granted_session_switches_to_immersive() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();

    assert_eq!(enter(&driver, &lifecycle), Mode::Immersive);
    assert_eq!(driver.borrow().mode(), Mode::Immersive);
    assert_eq!(count(&journal, &Call::SessionFrameRequested(session.id)), 1);
}

#[test]
fn immersive_frame_draws_each_view_into_session_layer() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    enter(&driver, &lifecycle);
    journal.borrow_mut().clear();

    immersive_frame(&driver, &journal, Some(stereo_pose()));

    let calls = journal.borrow().clone();
    assert_eq!(calls[0], Call::SessionFrameRequested(session.id));
    assert_eq!(calls[1], Call::BindTarget(RenderTarget::SessionLayer));
    assert_eq!(calls[2], Call::Clear);
    assert_eq!(count(&journal, &Call::Clear), 1);
    assert_eq!(count(&journal, &Call::Present), 1);
    assert_eq!(draws(&journal), vec![6, 36, 6, 36]);

    let pose = stereo_pose();
    let per_view: Vec<&Call> = calls
        .iter()
        .filter(|c| matches!(c, Call::Viewport(_) | Call::Camera(..)))
        .collect();
    assert_eq!(
        per_view,
        vec![
            &Call::Viewport(pose.views[0].viewport),
            &Call::Camera(pose.views[0].projection, pose.views[0].view),
            &Call::Viewport(pose.views[1].viewport),
            &Call::Camera(pose.views[1].projection, pose.views[1].view),
        ]
    );
    assert_eq!(&calls[calls.len() - 2..], &[Call::Present, Call::SessionFrameEnded]);
}

#[test]
fn missing_pose_keeps_the_loop_alive_without_drawing() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    enter(&driver, &lifecycle);
    journal.borrow_mut().clear();

    immersive_frame(&driver, &journal, None);

    // The layer is still released although nothing was presented
    assert_eq!(
        *journal.borrow(),
        vec![Call::SessionFrameRequested(session.id), Call::SessionFrameEnded]
    );
    assert_eq!(driver.borrow().mode(), Mode::Immersive);
}

#[test]
fn window_frames_are_dropped_while_immersive() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    lifecycle.grant();
    enter(&driver, &lifecycle);
    journal.borrow_mut().clear();

    // The frame requested before the session started
    window_frame(&driver, &journal, 1500.0);

    assert!(journal.borrow().is_empty());
}

#[test]
fn immersive_frames_are_dropped_while_windowed() {
    let journal = journal();
    let driver = started_driver(&journal);
    journal.borrow_mut().clear();

    immersive_frame(&driver, &journal, Some(stereo_pose()));

    assert_eq!(*journal.borrow(), vec![Call::SessionFrameEnded]);
}

#[test]
fn refused_session_stays_windowed() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    lifecycle.refuse(SessionError::Rejected("no headset".to_string()));

    assert_eq!(enter(&driver, &lifecycle), Mode::Windowed);
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    assert!(journal
        .borrow()
        .iter()
        .all(|c| !matches!(c, Call::SessionFrameRequested(_))));

    // The window loop carries on
    window_frame(&driver, &journal, 1000.0);
    assert_eq!(draws(&journal), vec![6, 36]);
}

#[test]
fn reference_space_failure_ends_the_session() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    session.fail_space("local space unavailable");

    assert_eq!(enter(&driver, &lifecycle), Mode::Windowed);
    assert_eq!(count(&journal, &Call::SessionEndRequested(session.id)), 1);
    assert_eq!(count(&journal, &Call::SessionFrameRequested(session.id)), 0);

    // Its end event lands while windowed and changes nothing
    session.fire_end();
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 1);
}

#[test]
fn session_ending_before_its_space_resolves_never_goes_immersive() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    session.end_while_resolving_space();

    assert_eq!(enter(&driver, &lifecycle), Mode::Windowed);
    assert_eq!(count(&journal, &Call::SessionFrameRequested(session.id)), 0);
}

#[test]
fn exit_asks_the_session_to_end_and_waits_for_the_event() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    enter(&driver, &lifecycle);

    driver.borrow().exit_immersive();
    assert_eq!(count(&journal, &Call::SessionEndRequested(session.id)), 1);
    assert_eq!(driver.borrow().mode(), Mode::Immersive);

    session.fire_end();
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
}

#[test]
fn session_end_resumes_window_loop_with_one_pending_frame() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    enter(&driver, &lifecycle);

    // The stale window frame arrives while immersive and is dropped
    window_frame(&driver, &journal, 1500.0);
    session.fire_end();

    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 2);

    journal.borrow_mut().clear();
    window_frame(&driver, &journal, 3000.0);
    assert_eq!(draws(&journal), vec![6, 36]);
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 1);
}

#[test]
fn session_end_with_window_frame_outstanding_requests_no_extra_frame() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    let session = lifecycle.grant();
    enter(&driver, &lifecycle);

    // The frame requested at start never arrived during the session
    session.fire_end();
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 1);

    // When it does, the window loop is back
    window_frame(&driver, &journal, 3000.0);
    assert_eq!(draws(&journal), vec![6, 36]);
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 2);
}

#[test]
fn late_end_of_an_old_session_leaves_the_new_one_running() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);

    let first = lifecycle.grant();
    first.fail_space("not yet");
    assert_eq!(enter(&driver, &lifecycle), Mode::Windowed);

    let second = lifecycle.grant();
    assert_eq!(enter(&driver, &lifecycle), Mode::Immersive);

    // The first session's end event only now arrives
    first.fire_end();
    assert_eq!(driver.borrow().mode(), Mode::Immersive);

    second.fire_end();
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
}

#[test]
fn session_granted_while_immersive_is_ended() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);

    // Two requests resolving back to back, as with a double click
    let first = lifecycle.grant();
    let second = lifecycle.grant();
    let first_token = driver.borrow_mut().next_session_token();
    let second_token = driver.borrow_mut().next_session_token();
    driver
        .borrow_mut()
        .on_session_started(first_token, FakeSession(first.clone()), FakeSpace(first.id));
    driver
        .borrow_mut()
        .on_session_started(second_token, FakeSession(second.clone()), FakeSpace(second.id));

    assert_eq!(driver.borrow().mode(), Mode::Immersive);
    assert_eq!(count(&journal, &Call::SessionEndRequested(second.id)), 1);
    assert_eq!(count(&journal, &Call::SessionEndRequested(first.id)), 0);
    assert_eq!(count(&journal, &Call::SessionFrameRequested(second.id)), 0);

    // The extra session's end changes nothing
    driver.borrow_mut().on_session_end(second_token);
    assert_eq!(driver.borrow().mode(), Mode::Immersive);

    // Frames still come from the first session
    immersive_frame(&driver, &journal, Some(stereo_pose()));
    assert_eq!(count(&journal, &Call::SessionFrameRequested(first.id)), 2);

    driver.borrow_mut().on_session_end(first_token);
    assert_eq!(driver.borrow().mode(), Mode::Windowed);
    // The start-up window frame is still outstanding, so none is added
    assert_eq!(count(&journal, &Call::WindowFrameRequested), 1);
}

#[test]
fn entering_twice_does_not_request_a_second_session() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);
    lifecycle.grant();

    assert_eq!(enter(&driver, &lifecycle), Mode::Immersive);
    assert_eq!(enter(&driver, &lifecycle), Mode::Immersive);
    assert_eq!(lifecycle.requests.get(), 1);
}

#[test]
fn unsupported_platform_reports_windowed() {
    let journal = journal();
    let driver = started_driver(&journal);
    let lifecycle = FakeLifecycle::new(&journal);

    assert_eq!(enter(&driver, &lifecycle), Mode::Windowed);
    assert_eq!(lifecycle.requests.get(), 1);
}
