//! Frame timestamps in milliseconds.
//!
//! On the web this is `performance.now()`, the same clock WebXR stamps its
//! frames with, so windowed and immersive timestamps can be mixed freely.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn now_ms() -> f64 {
            web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or_default()
        }
    } else {
        use std::sync::OnceLock;
        use instant::Instant;

        static EPOCH: OnceLock<Instant> = OnceLock::new();

        pub fn now_ms() -> f64 {
            let epoch = EPOCH.get_or_init(Instant::now);
            epoch.elapsed().as_secs_f64() * 1000.0
        }
    }
}
