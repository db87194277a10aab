mod shader_utils;
mod textured;

#[cfg(all(target_arch="wasm32", web_sys_unstable_apis))]
pub mod utils;

pub use textured::TexturedPass;
