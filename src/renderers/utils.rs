// Wrapping an externally owned GL framebuffer follows
// https://github.com/MeetKai/superconductor/blob/3ed64c119e5e7419752e5602fe5d8868d5e503cf/renderer-core/src/lib.rs

/// Colour texture over the session layer's framebuffer for this frame.
/// `framebuffer` is `None` when the layer renders straight to the default
/// framebuffer.
pub fn create_view_from_device_framebuffer(
    device: &wgpu::Device,
    framebuffer: Option<web_sys::WebGlFramebuffer>,
    base_layer: &web_sys::XrWebGlLayer,
    format: wgpu::TextureFormat,
    label: &'static str,
) -> wgpu::Texture {
    let width = base_layer.framebuffer_width();
    let height = base_layer.framebuffer_height();
    let inner = match framebuffer {
        Some(inner) => wgpu_hal::gles::TextureInner::ExternalFramebuffer { inner },
        None => wgpu_hal::gles::TextureInner::DefaultRenderbuffer,
    };

    // # Safety
    //
    // The framebuffer belongs to the XR compositor and is only valid during
    // the current XR frame callback. The caller hands the texture to
    // `TexturedPass::set_session_layer`, which drops it at `present` or at
    // `end_session_frame`. `FrameDriver::on_immersive_frame` calls the latter
    // on every path before the callback returns.
    unsafe {
        device.create_texture_from_hal::<wgpu_hal::gles::Api>(
            wgpu_hal::gles::Texture {
                inner,
                mip_level_count: 1,
                array_layer_count: 1,
                format,
                format_desc: wgpu_hal::gles::TextureFormatDesc {
                    internal: glow::RGBA,
                    external: glow::RGBA,
                    data_type: glow::UNSIGNED_BYTE,
                },
                copy_size: wgpu_hal::CopyExtent {
                    width,
                    height,
                    depth: 1,
                },
                is_cubemap: false,
                drop_guard: None,
            },
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                view_formats: &[format],
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            },
        )
    }
}
