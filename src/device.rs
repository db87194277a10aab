use std::ops::Deref;

use anyhow::{anyhow, Context};

use crate::texture::Texture;

pub type SurfaceSize = winit::dpi::PhysicalSize<u32>;


/// The window's surface plus the device and queue that draw into it.
///
/// Derefs to `wgpu::Device`. The immersive path shares this device, since
/// on the web the session layer lives on the same GL context as the canvas.
pub struct Device {
    surface: wgpu::Surface,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth_tex: Texture,
}

fn required_limits() -> wgpu::Limits {
    // WebGL2 can't meet wgpu's defaults
    if cfg!(target_arch = "wasm32") {
        wgpu::Limits::downlevel_webgl2_defaults()
    } else {
        wgpu::Limits::default()
    }
}

fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    size: SurfaceSize,
) -> anyhow::Result<wgpu::SurfaceConfiguration> {
    // Textures are sRGB, so prefer an sRGB surface to match
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| anyhow!("surface reports no formats"))?;
    let present_mode = *caps.present_modes.first().context("surface reports no present modes")?;
    let alpha_mode = *caps.alpha_modes.first().context("surface reports no alpha modes")?;

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
    })
}

impl Device {
    pub async fn new(window: &winit::window::Window) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
        });

        // # Safety
        //
        // The window outlives the surface: both are owned by the running
        // experience until the event loop exits.
        let surface = unsafe { instance.create_surface(window) }
            .context("creating surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no compatible graphics adapter"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("cubexr device"),
                    features: wgpu::Features::empty(),
                    limits: required_limits(),
                },
                None,
            )
            .await
            .context("requesting device")?;

        let surface_config = surface_config(&surface.get_capabilities(&adapter), window.inner_size())?;
        surface.configure(&device, &surface_config);
        let depth_tex = Texture::create_depth_texture(
            &device, surface_config.width, surface_config.height, "depth_texture");

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            depth_tex,
        })
    }

    /// Reconfigure the surface and window depth buffer. Zero sizes are
    /// ignored; the old configuration stays until the window is restored.
    pub fn resize(&mut self, new_size: SurfaceSize) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.reconfigure();
    }

    /// Re-apply the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_tex = Texture::create_depth_texture(
            &self.device, self.surface_config.width, self.surface_config.height, "depth_texture");
    }

    pub fn surface_texture_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface(&self) -> &wgpu::Surface {
        &self.surface
    }

    pub fn depth_tex(&self) -> &Texture {
        &self.depth_tex
    }
}

impl Deref for Device {
    type Target = wgpu::Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}
