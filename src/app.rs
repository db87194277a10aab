use bevy_ecs::prelude::*;
#[allow(unused_imports)]
use log::{debug, error, info, warn};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};

#[cfg(target_arch="wasm32")]
use winit::platform::web::EventLoopExtWebSys;

use crate::backend::RenderBackend;
use crate::clock;
use crate::components::{Camera, Transform, Viewer};
use crate::config::ExperienceConfig;
use crate::device::{Device, SurfaceSize};
use crate::frame::{FrameDriver, FrameScheduler};
use crate::math::Mat4f;
use crate::renderers::TexturedPass;
use crate::systems::*;

use crate::logging::{init_logging, printlog};

use std::cell::RefCell;
use std::rc::Rc;


/// Scene state shared by both frame loops.
pub struct App {
    pub world: World,
}

impl App {
    /// `start_ms` is the timestamp the animation counts from.
    pub fn new(config: ExperienceConfig, start_ms: f64) -> Self {
        let mut world = World::default();
        world.init_resource::<Schedules>();

        world.insert_resource(config);
        world.insert_resource(SceneClock { start_ms });
        world.insert_resource(SceneTime::default());

        // Schedules
        let spawn_scene_schedule = new_spawn_scene_schedule();
        world.add_schedule(spawn_scene_schedule.0, spawn_scene_schedule.1);
        let update_schedule = new_update_schedule();
        world.add_schedule(update_schedule.0, update_schedule.1);

        Self {
            world,
        }
    }

    /// Advance the animation to `timestamp_ms`.
    pub fn update_scene(&mut self, timestamp_ms: f64) {
        let elapsed_secs = self.world.resource::<SceneClock>().elapsed_secs(timestamp_ms);
        self.world.resource_mut::<SceneTime>().elapsed_secs = elapsed_secs;
        self.world.run_schedule(SpawnLabel);
        self.world.run_schedule(UpdateLabel);
    }

    /// Projection and view of the windowed-mode viewer, once it has spawned.
    pub fn windowed_camera(&mut self) -> Option<(Mat4f, Mat4f)> {
        let mut viewers = self.world.query_filtered::<(&Camera, &Transform), With<Viewer>>();
        let (camera, transform) = viewers.get_single(&self.world).ok()?;
        Some((camera.projection_matrix(), camera.view_matrix(transform)))
    }

    pub fn draw<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, projection: &Mat4f, view: &Mat4f) {
        draw_scene(&mut self.world, backend, projection, view);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let mut cameras = self.world.query::<&mut Camera>();
        for mut camera in cameras.iter_mut(&mut self.world) {
            camera.resize(width, height);
        }
    }
}


/// Window redraws as a frame source. On the web winit backs these with
/// `requestAnimationFrame`.
struct WindowFrames(Rc<Window>);

impl FrameScheduler for WindowFrames {
    fn request_frame(&self) {
        self.0.request_redraw();
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "wasm32", web_sys_unstable_apis))] {
        pub(crate) type Session = crate::xr::WebXrSession;
    } else {
        pub(crate) type Session = crate::frame::NoImmersive;
    }
}

/// Everything the event loop keeps alive.
struct Experience {
    window: Rc<Window>,
    driver: Rc<RefCell<FrameDriver<Session>>>,
    backend: Rc<RefCell<TexturedPass>>,
}

impl Experience {
    async fn new(window: Window, config: ExperienceConfig) -> anyhow::Result<Self> {
        let window = Rc::new(window);

        let device = Device::new(&window).await?;
        printlog("running init_app - created device");
        let backend = TexturedPass::new(device, &config)?;

        let app = App::new(config, clock::now_ms());
        let mut driver = FrameDriver::new(app, Box::new(WindowFrames(window.clone())));
        driver.start();

        let driver = Rc::new(RefCell::new(driver));
        let backend = Rc::new(RefCell::new(backend));

        #[cfg(all(target_arch = "wasm32", web_sys_unstable_apis))]
        crate::xr::install(driver.clone(), backend.clone());

        Ok(Self { window, driver, backend })
    }

    fn redraw(&self) {
        let mut backend = self.backend.borrow_mut();
        backend.poll_textures();
        self.driver.borrow_mut().on_window_frame(clock::now_ms(), &mut *backend);
    }

    fn resize(&self, new_size: SurfaceSize) {
        self.backend.borrow_mut().resize(new_size);
        self.driver.borrow_mut().resize(new_size.width, new_size.height);
    }

    /// Escape closes the window. In the browser the page's own key listener
    /// takes it instead and leaves immersive mode.
    fn on_escape(&self, control_flow: &mut ControlFlow) {
        if cfg!(not(target_arch = "wasm32")) {
            *control_flow = ControlFlow::Exit;
        }
    }
}

#[cfg(target_arch="wasm32")]
fn setup_window_canvas(window: &Window, surface_size: SurfaceSize) -> anyhow::Result<()> {

    // Winit prevents sizing with CSS, so we have to set
    // the size manually when on web.
    window.set_inner_size(surface_size);

    use winit::platform::web::WindowExtWebSys;
    web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| {
            let dst = doc.get_element_by_id("cubexr")?;
            let canvas = web_sys::Element::from(window.canvas());
            canvas.set_id("canvas");
            dst.append_child(&canvas).ok()?;
            Some(())
        })
        .ok_or_else(|| anyhow::anyhow!("Couldn't append canvas to #cubexr"))
}

pub async fn run_experience(config: ExperienceConfig) {

    init_logging();
    printlog("running run_app - starting");

    let event_loop = EventLoop::new();
    printlog("running init_app - created event_loop");

    let surface_size = SurfaceSize::new(config.width, config.height);

    let window = match WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(surface_size)
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(e) => {
            error!("Couldn't create window: {e}");
            return;
        }
    };

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = setup_window_canvas(&window, surface_size) {
            error!("{e:#}");
            return;
        }
    }
    printlog("running init_app - created window");

    let experience = match Experience::new(window, config).await {
        Ok(experience) => experience,
        Err(e) => {
            error!("Couldn't start: {e:#}");
            return;
        }
    };
    printlog("running init_app - created experience");

    let event_handler = move |event: Event<()> , _: &EventLoopWindowTarget<()>,
                             control_flow: &mut ControlFlow| {

        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == experience.window.id() => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => experience.on_escape(control_flow),

                WindowEvent::Resized(new_size) => experience.resize(*new_size),

                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    experience.resize(**new_inner_size)
                }

                _ => (),
            },

            Event::RedrawRequested(window_id) if window_id == experience.window.id() => {
                experience.redraw();
            },

            _ => {}
        }
    };


    #[cfg(target_arch = "wasm32")]
    {
        event_loop.spawn(event_handler);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run(event_handler);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3f;

    #[test]
    fn scene_spawns_on_first_update() {
        let mut app = App::new(ExperienceConfig::default(), 0.0);
        assert!(app.windowed_camera().is_none());

        app.update_scene(0.0);
        let (projection, view) = app.windowed_camera().unwrap();
        assert_eq!(view, Mat4f::identity());
        // Perspective3 puts -1 in the w row for a right-handed projection
        assert_eq!(projection[(3, 2)], -1.0);
    }

    #[test]
    fn update_scene_counts_from_start_timestamp() {
        let mut app = App::new(ExperienceConfig::default(), 1000.0);
        app.update_scene(3000.0);
        assert_eq!(app.world.resource::<SceneTime>().elapsed_secs, 2.0);

        let mut cubes = app.world.query_filtered::<&Transform, With<crate::components::CrateCube>>();
        let cube = cubes.single(&app.world);
        assert_eq!(cube.position(), Vec3f::new(0.0, 0.5, -5.0));
    }

    #[test]
    fn resize_updates_viewer_aspect() {
        let mut app = App::new(ExperienceConfig::default(), 0.0);
        app.update_scene(0.0);
        app.resize(400, 400);

        let mut cameras = app.world.query::<&Camera>();
        assert!((cameras.single(&app.world).aspect() - 1.0).abs() < 1e-6);
    }
}
