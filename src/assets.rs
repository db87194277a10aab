use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

#[allow(unused_imports)]
use anyhow::{anyhow, Context};
use cfg_if::cfg_if;
#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::texture::Texture;
use crate::logging::printlog;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("no origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/res/", origin,))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let url = format_url(file_name)?;
            printlog(url.as_str());
            let data = reqwest::get(url)
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec();
        } else {
            let path = std::path::Path::new(env!("OUT_DIR"))
                .join("res")
                .join(file_name);
            let data = std::fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
        }
    }

    Ok(data)
}

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<image::DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}


struct TextureUpload {
    name: String,
    file: String,
    image: anyhow::Result<image::DynamicImage>,
}

struct TextureEntry {
    // Owned here so the bind group's view stays valid
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Textures by name.
///
/// Every handle starts out as a 1x1 placeholder and is swapped for the
/// decoded image once its load completes. Handles are never removed.
pub struct TextureStore {
    layout: wgpu::BindGroupLayout,
    entries: HashMap<String, TextureEntry>,
    uploads_tx: Sender<TextureUpload>,
    uploads_rx: Receiver<TextureUpload>,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("[Textured] Locals"),
            entries: &[
                // Diffuse texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler for diffuse texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let (uploads_tx, uploads_rx) = channel();
        Self {
            layout,
            entries: HashMap::new(),
            uploads_tx,
            uploads_rx,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Register `name` with a placeholder and start loading `file` from `res/`.
    pub fn request(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, name: &str, file: &str) {
        let texture = Texture::placeholder(device, queue, name);
        self.insert(device, name, texture);
        spawn_load(name.to_string(), file.to_string(), self.uploads_tx.clone());
    }

    /// Swap in every image that finished loading since the last call.
    /// Returns how many handles were replaced.
    pub fn poll_uploads(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> usize {
        let mut replaced = 0;
        while let Ok(upload) = self.uploads_rx.try_recv() {
            match upload.image {
                Ok(image) => {
                    let texture = Texture::from_image(device, queue, &image, Some(&upload.name));
                    self.insert(device, &upload.name, texture);
                    printlog(&format!("Loaded texture {} from {}", upload.name, upload.file));
                    replaced += 1;
                }
                // Keep the placeholder
                Err(e) => error!("Failed to load texture {} from {}: {e:#}", upload.name, upload.file),
            }
        }
        replaced
    }

    pub fn bind_group(&self, name: &str) -> Option<&wgpu::BindGroup> {
        self.entries.get(name).map(|entry| &entry.bind_group)
    }

    fn insert(&mut self, device: &wgpu::Device, name: &str, texture: Texture) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        self.entries.insert(
            name.to_string(),
            TextureEntry {
                _texture: texture,
                bind_group,
            },
        );
    }
}

fn spawn_load(name: String, file: String, uploads: Sender<TextureUpload>) {
    let load = async move {
        let image = load_binary(&file)
            .await
            .and_then(|bytes| decode_image(&bytes));
        // The store may be gone if the app shut down mid-load
        let _ = uploads.send(TextureUpload { name, file, image });
    };
    cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            wasm_bindgen_futures::spawn_local(load);
        } else {
            std::thread::spawn(move || pollster::block_on(load));
        }
    }
}
