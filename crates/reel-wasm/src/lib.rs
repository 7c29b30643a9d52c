//! Reel WASM - HLS Player Component for the Browser
//!
//! Wraps hls.js behind the engine traits of `reel-core`:
//! - `<video>` element with static subtitle tracks
//! - Quality selector fed by the parsed manifest
//! - Buffering banner driven by buffer-append events
//!
//! ## Usage
//!
//! ```javascript
//! import init, { ReelPlayer } from '@reel/wasm';
//!
//! await init();
//! const player = new ReelPlayer(container, { src: 'https://example.com/master.m3u8' });
//! ```

use wasm_bindgen::prelude::*;

pub mod dom;
pub mod hls;
pub mod media;
mod player;
pub mod schedule;

pub use dom::DomSurface;
pub use hls::{HlsJsEngine, HlsJsFactory};
pub use media::VideoMedia;
pub use player::ReelPlayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    reel_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Whether this browser can run the adaptive engine
#[wasm_bindgen(js_name = isSupported)]
pub fn is_supported() -> bool {
    hls::is_supported()
}
