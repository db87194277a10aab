#![cfg(web_sys_unstable_apis)]

//! Immersive mode on the web, through WebXR.

mod page;
mod webxr;

pub use page::install;
pub use webxr::{WebXrFrame, WebXrLifecycle, WebXrSession};
