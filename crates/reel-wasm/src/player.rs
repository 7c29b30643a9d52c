//! JS-facing player component
//!
//! ```javascript
//! import init, { ReelPlayer } from '@reel/wasm';
//!
//! await init();
//! const player = new ReelPlayer(document.getElementById('player'), {
//!   src: '/streams/master.m3u8',
//!   width: 1280,
//!   height: 720,
//!   subtitles: [{ src: '/subs/en.vtt', lang: 'en', label: 'English' }],
//! });
//!
//! player.setSource('/streams/other.m3u8');
//! player.selectQuality(2);   // -1 for automatic
//! player.unmount();
//! ```

use crate::dom::DomSurface;
use crate::hls::HlsJsFactory;
use crate::media::VideoMedia;
use crate::schedule;
use reel_core::config::dimension;
use reel_core::{
    EngineConfig, Error, LevelSelection, PlayerController, PlayerProps, SourceDescriptor,
    SubtitleTrack, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{error, info, warn};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Engine failures degrade the player instead of throwing into JS
fn report_attach_failure(err: &Error) {
    if err.is_recoverable() {
        warn!(code = err.error_code(), error = %err, "Engine attach failed");
    } else {
        error!(code = err.error_code(), error = %err, "Engine attach failed");
    }
}

/// Props as passed from JS; `src` may be relative to the document
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsProps {
    src: String,
    #[serde(default, deserialize_with = "dimension::deserialize_option")]
    width: Option<u32>,
    #[serde(default, deserialize_with = "dimension::deserialize_option")]
    height: Option<u32>,
    #[serde(default)]
    subtitles: Vec<SubtitleTrack>,
    #[serde(default)]
    engine: EngineConfig,
}

fn document_base() -> Option<Url> {
    let document = web_sys::window()?.document()?;
    let base = document.base_uri().ok().flatten()?;
    Url::parse(&base).ok()
}

fn resolve_source(src: &str) -> Result<SourceDescriptor, JsValue> {
    SourceDescriptor::parse_with_base(src, document_base().as_ref()).map_err(js_error)
}

struct Inner {
    controller: PlayerController<HlsJsFactory>,
    dom: DomSurface,
}

impl Inner {
    fn render(&mut self) {
        let surface = self.controller.surface();
        if let Err(err) = self.dom.apply(&surface) {
            error!(error = ?err, "Render failed");
        }
    }

    /// Pull queued engine signals into state and re-render
    fn flush(&mut self) {
        if self.controller.pump() > 0 {
            self.render();
        }
    }
}

/// HLS video player component
#[wasm_bindgen]
pub struct ReelPlayer {
    inner: Rc<RefCell<Inner>>,
    on_quality_change: Closure<dyn FnMut(web_sys::Event)>,
}

#[wasm_bindgen]
impl ReelPlayer {
    /// Render into `container` and start loading `props.src`
    #[wasm_bindgen(constructor)]
    pub fn new(container: &web_sys::Element, props: JsValue) -> Result<ReelPlayer, JsValue> {
        let js_props: JsProps = serde_wasm_bindgen::from_value(props)?;
        let props = PlayerProps::new(resolve_source(&js_props.src)?)
            .with_size(
                js_props.width.unwrap_or(DEFAULT_WIDTH),
                js_props.height.unwrap_or(DEFAULT_HEIGHT),
            )
            .with_subtitles(js_props.subtitles)
            .with_engine(js_props.engine);
        props.validate().map_err(js_error)?;

        let document = container
            .owner_document()
            .ok_or_else(|| js_error("container is not attached to a document"))?;
        let dom = DomSurface::new(&document, container)?;
        let media = VideoMedia::new(dom.video().clone());

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            let factory = HlsJsFactory::new(schedule::coalesced(weak.clone(), Inner::flush));
            RefCell::new(Inner {
                controller: PlayerController::new(factory, props),
                dom,
            })
        });

        let on_quality_change = {
            let weak = Rc::downgrade(&inner);
            Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
                else {
                    return;
                };
                let Ok(index) = select.value().parse::<i32>() else {
                    return;
                };
                let mut inner = inner.borrow_mut();
                let level = LevelSelection::from_engine_index(index);
                if let Err(err) = inner.controller.select_quality(level) {
                    warn!(error = %err, "Quality change rejected");
                }
                inner.render();
            })
        };

        {
            let mut guard = inner.borrow_mut();
            guard.dom.select().add_event_listener_with_callback(
                "change",
                on_quality_change.as_ref().unchecked_ref(),
            )?;

            if let Err(err) = guard.controller.mount(media) {
                report_attach_failure(&err);
            }
            guard.render();
        }

        info!("ReelPlayer mounted");
        Ok(ReelPlayer {
            inner,
            on_quality_change,
        })
    }

    /// Switch to another manifest; same locator is a no-op
    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, src: &str) -> Result<(), JsValue> {
        let source = resolve_source(src)?;
        let mut inner = self.inner.borrow_mut();
        if let Err(err) = inner.controller.set_source(source) {
            report_attach_failure(&err);
        }
        inner.render();
        Ok(())
    }

    /// Replace the subtitle list
    #[wasm_bindgen(js_name = setSubtitles)]
    pub fn set_subtitles(&self, subtitles: JsValue) -> Result<(), JsValue> {
        let subtitles: Vec<SubtitleTrack> = serde_wasm_bindgen::from_value(subtitles)?;
        let mut inner = self.inner.borrow_mut();
        inner.controller.set_subtitles(subtitles);
        inner.render();
        Ok(())
    }

    /// Pin a level index, or `-1` for automatic. Returns whether it was applied.
    #[wasm_bindgen(js_name = selectQuality)]
    pub fn select_quality(&self, level: i32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let selection = LevelSelection::from_engine_index(level);
        let applied = match inner.controller.select_quality(selection) {
            Ok(()) => true,
            Err(err) => {
                warn!(level, error = %err, "Quality change rejected");
                false
            }
        };
        inner.render();
        applied
    }

    /// Current render model as a plain JS object
    pub fn surface(&self) -> Result<JsValue, JsValue> {
        let surface = self.inner.borrow().controller.surface();
        Ok(serde_wasm_bindgen::to_value(&surface)?)
    }

    /// "detached", "adaptive", "native" or "unsupported"
    pub fn mode(&self) -> String {
        self.inner.borrow().controller.mode().to_string()
    }

    /// Engine errors seen so far
    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        let diagnostics = self.inner.borrow().controller.diagnostics().clone();
        Ok(serde_wasm_bindgen::to_value(&diagnostics)?)
    }

    /// Release the engine and remove the player from the page
    pub fn unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.controller.unmount().is_some() {
            let _ = inner.dom.select().remove_event_listener_with_callback(
                "change",
                self.on_quality_change.as_ref().unchecked_ref(),
            );
            inner.dom.remove();
            info!("ReelPlayer unmounted");
        }
    }
}

impl Drop for ReelPlayer {
    fn drop(&mut self) {
        self.unmount();
    }
}
