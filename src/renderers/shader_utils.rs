use naga_oil::compose::{Composer, NagaModuleDescriptor, ShaderDefValue};


/// Compose a WGSL file from `renderers/shaders/` into a naga module.
macro_rules! load_shader {
    ($library:expr, $path:literal, $webxr:expr) => {{
        $library.compose(
            concat!("shaders/", $path),
            include_str!(concat!("shaders/", $path)),
            $webxr)
    }};
}

pub(crate) use load_shader;

/// naga_oil front end for the crate's shaders.
///
/// Every shader is compiled in two flavours: plain for the window surface,
/// and with `WEBXR` defined for the session layer framebuffer.
pub struct ShaderLibrary {
    composer: Composer,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self { composer: Composer::default() }
    }

    pub fn compose(
        &mut self,
        file_path: &str,
        source: &str,
        webxr: bool,
    ) -> anyhow::Result<naga::Module> {
        let shader_defs = if webxr {
            [("WEBXR".to_string(), ShaderDefValue::Bool(true))].into()
        } else {
            Default::default()
        };
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_defs,
                ..Default::default()
            })
            .map_err(|e| anyhow::anyhow!("composing {file_path}: {e:?}"))
    }
}
