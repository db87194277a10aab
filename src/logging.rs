#[allow(unused_imports)]
use log::warn;


pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            if let Err(e) = console_log::init_with_level(log::Level::Warn) {
                web_sys::console::error_1(&format!("Couldn't initialize logger: {e}").into());
            }
        } else {
            // Tests and embedders may have installed a logger already
            let _ = env_logger::try_init();
        }
    }
}


pub fn printlog(log_str: &str) {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            warn!("{}",log_str);
        } else {
            log::info!("{}",log_str);
        }
    }
}
