//! hls.js engine binding
//!
//! Expects the `Hls` class on the global object:
//!
//! ```html
//! <script src="https://cdn.jsdelivr.net/npm/hls.js@1"></script>
//! ```

use crate::media::VideoMedia;
use reel_core::{
    EngineConfig, EngineErrorInfo, EngineErrorKind, EngineFactory, EngineSignal, Error,
    LevelSelection, Rendition, Result, SignalSink, SourceDescriptor, StreamingEngine,
};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `Hls.Events.MANIFEST_PARSED`
pub const MANIFEST_PARSED: &str = "hlsManifestParsed";
/// `Hls.Events.BUFFER_APPENDING`
pub const BUFFER_APPENDING: &str = "hlsBufferAppending";
/// `Hls.Events.BUFFER_APPENDED`
pub const BUFFER_APPENDED: &str = "hlsBufferAppended";
/// `Hls.Events.ERROR`
pub const ERROR: &str = "hlsError";

const SUBSCRIBED_EVENTS: [&str; 4] = [MANIFEST_PARSED, BUFFER_APPENDING, BUFFER_APPENDED, ERROR];

#[wasm_bindgen]
extern "C" {
    /// The hls.js player class
    #[wasm_bindgen(js_name = Hls)]
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported_js() -> std::result::Result<bool, JsValue>;

    #[wasm_bindgen(constructor, catch)]
    fn new(config: &JsValue) -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(method, js_name = loadSource, catch)]
    fn load_source(this: &Hls, url: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = attachMedia, catch)]
    fn attach_media(
        this: &Hls,
        media: &web_sys::HtmlMediaElement,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);

    #[wasm_bindgen(method, getter, js_name = currentLevel)]
    fn current_level(this: &Hls) -> i32;

    #[wasm_bindgen(method, setter, js_name = currentLevel)]
    fn set_current_level(this: &Hls, level: i32);

    #[wasm_bindgen(method, getter)]
    fn levels(this: &Hls) -> JsValue;

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn off(this: &Hls, event: &str, listener: &js_sys::Function);
}

/// Whether hls.js is loaded and Media Source Extensions are available
pub fn is_supported() -> bool {
    let loaded =
        js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false);
    loaded && Hls::is_supported_js().unwrap_or(false)
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn get(target: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn get_u32(target: &JsValue, key: &str) -> Option<u32> {
    get(target, key)
        .as_f64()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u32)
}

/// Convert an hls.js `Level` object
fn rendition_from_js(level: &JsValue) -> Rendition {
    Rendition {
        width: get_u32(level, "width"),
        height: get_u32(level, "height"),
        bitrate: get(level, "bitrate").as_f64().unwrap_or(0.0).max(0.0) as u64,
        name: get(level, "name").as_string(),
    }
}

/// Convert `hls.levels` or `data.levels`; anything but an array is empty
pub fn renditions_from_js(levels: &JsValue) -> Vec<Rendition> {
    if !js_sys::Array::is_array(levels) {
        return Vec::new();
    }
    js_sys::Array::from(levels).iter().map(|level| rendition_from_js(&level)).collect()
}

/// Map an hls.js event and its payload to a signal, `None` for events
/// the player does not listen to
pub fn signal_from_js(event: &str, data: &JsValue) -> Option<EngineSignal> {
    match event {
        MANIFEST_PARSED => Some(EngineSignal::ManifestParsed {
            renditions: renditions_from_js(&get(data, "levels")),
        }),
        BUFFER_APPENDING => Some(EngineSignal::BufferAppending),
        BUFFER_APPENDED => Some(EngineSignal::BufferAppended),
        ERROR => Some(EngineSignal::Error(EngineErrorInfo {
            kind: EngineErrorKind::from_engine_type(
                &get(data, "type").as_string().unwrap_or_default(),
            ),
            details: get(data, "details").as_string().unwrap_or_default(),
            fatal: get(data, "fatal").as_bool().unwrap_or(false),
        })),
        _ => None,
    }
}

type Handler = Closure<dyn FnMut(JsValue, JsValue)>;

/// One `Hls` instance
pub struct HlsJsEngine {
    hls: Hls,
    handlers: Vec<(&'static str, Handler)>,
    wake: Rc<dyn Fn()>,
    destroyed: bool,
}

impl StreamingEngine for HlsJsEngine {
    type Media = VideoMedia;

    fn subscribe(&mut self, sink: SignalSink) {
        for event in SUBSCRIBED_EVENTS {
            let sink = sink.clone();
            let wake = Rc::clone(&self.wake);
            let handler = Handler::new(move |_name: JsValue, data: JsValue| {
                let Some(signal) = signal_from_js(event, &data) else {
                    return;
                };
                if sink.emit(signal) {
                    wake();
                } else {
                    debug!(event, "Signal from released instance dropped");
                }
            });
            self.hls.on(event, handler.as_ref().unchecked_ref());
            self.handlers.push((event, handler));
        }
    }

    fn attach_media(&mut self, media: &VideoMedia) -> Result<()> {
        self.hls
            .attach_media(media.element())
            .map_err(|err| Error::AttachMedia(js_message(&err)))
    }

    fn load_source(&mut self, source: &SourceDescriptor) -> Result<()> {
        self.hls.load_source(source.as_str()).map_err(|err| Error::LoadSource {
            url: source.to_string(),
            reason: js_message(&err),
        })
    }

    fn set_current_level(&mut self, level: LevelSelection) {
        self.hls.set_current_level(level.to_engine_index());
    }

    fn current_level(&self) -> LevelSelection {
        LevelSelection::from_engine_index(self.hls.current_level())
    }

    fn levels(&self) -> Vec<Rendition> {
        renditions_from_js(&self.hls.levels())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for (event, handler) in self.handlers.drain(..) {
            self.hls.off(event, handler.as_ref().unchecked_ref());
        }
        self.hls.destroy();
        self.destroyed = true;
    }
}

impl Drop for HlsJsEngine {
    fn drop(&mut self) {
        // JS must not hold a handler once its closure is freed
        self.destroy();
    }
}

/// Creates `Hls` instances.
///
/// `wake` runs after every signal an instance queues; the player uses it
/// to schedule a state flush.
pub struct HlsJsFactory {
    wake: Rc<dyn Fn()>,
}

impl HlsJsFactory {
    pub fn new(wake: Rc<dyn Fn()>) -> Self {
        Self { wake }
    }
}

impl EngineFactory for HlsJsFactory {
    type Media = VideoMedia;
    type Engine = HlsJsEngine;

    fn is_supported(&self) -> bool {
        is_supported()
    }

    fn create(&mut self, config: &EngineConfig) -> Result<HlsJsEngine> {
        let config = serde_wasm_bindgen::to_value(config)
            .map_err(|err| Error::engine(err.to_string()))?;
        let hls = Hls::new(&config).map_err(|err| {
            warn!(error = %js_message(&err), "Hls constructor threw");
            Error::engine(js_message(&err))
        })?;

        Ok(HlsJsEngine {
            hls,
            handlers: Vec::new(),
            wake: Rc::clone(&self.wake),
            destroyed: false,
        })
    }
}
