//! DOM renderer for the render surface
//!
//! Builds the element tree once and reconciles it with each new
//! [`Surface`]. The renderer never talks to the engine.

use reel_core::{QualitySelector, Surface, TextTrackElement, CROSS_ORIGIN};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlOptionElement, HtmlSelectElement, HtmlTrackElement,
    HtmlVideoElement,
};

/// CSS class of the component root
pub const ROOT_CLASS: &str = "reel-player";
/// CSS class of the quality `<select>`
pub const QUALITY_CLASS: &str = "reel-quality";
/// CSS class of the buffering banner
pub const BUFFERING_CLASS: &str = "reel-buffering";

pub struct DomSurface {
    document: Document,
    root: HtmlElement,
    video: HtmlVideoElement,
    tracks: Vec<HtmlTrackElement>,
    select: HtmlSelectElement,
    banner: HtmlElement,
    rendered: Option<Surface>,
}

impl DomSurface {
    /// Create the element tree inside `container`
    pub fn new(document: &Document, container: &Element) -> Result<Self, JsValue> {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_class_name(ROOT_CLASS);

        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_controls(true);
        // Before any source or track is set: CORS mode only applies to new fetches
        video.set_cross_origin(Some(CROSS_ORIGIN));

        let select: HtmlSelectElement = document.create_element("select")?.dyn_into()?;
        select.set_class_name(QUALITY_CLASS);
        select.set_hidden(true);

        let banner: HtmlElement = document.create_element("div")?.dyn_into()?;
        banner.set_class_name(BUFFERING_CLASS);
        banner.set_hidden(true);

        root.append_child(&video)?;
        root.append_child(&select)?;
        root.append_child(&banner)?;
        container.append_child(&root)?;

        Ok(Self {
            document: document.clone(),
            root,
            video,
            tracks: Vec::new(),
            select,
            banner,
            rendered: None,
        })
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    pub fn select(&self) -> &HtmlSelectElement {
        &self.select
    }

    pub fn banner(&self) -> &HtmlElement {
        &self.banner
    }

    /// Bring the DOM in line with `surface`
    pub fn apply(&mut self, surface: &Surface) -> Result<(), JsValue> {
        let previous = self.rendered.take();
        if previous.as_ref() == Some(surface) {
            self.rendered = previous;
            return Ok(());
        }

        self.video.set_width(surface.video.width);
        self.video.set_height(surface.video.height);
        self.video.set_controls(surface.video.controls);
        if self.video.cross_origin().as_deref() != Some(surface.video.cross_origin.as_str()) {
            self.video.set_cross_origin(Some(&surface.video.cross_origin));
        }

        let tracks_changed = previous
            .as_ref()
            .map_or(true, |prev| prev.video.tracks != surface.video.tracks);
        if tracks_changed {
            self.render_tracks(&surface.video.tracks)?;
        }

        match &surface.quality_selector {
            Some(selector) => {
                let options_changed = previous
                    .as_ref()
                    .and_then(|prev| prev.quality_selector.as_ref())
                    .map_or(true, |prev| prev.options != selector.options);
                if options_changed {
                    self.render_options(selector)?;
                }
                self.select.set_value(&i32::from(selector.selected).to_string());
                self.select.set_hidden(false);
            }
            None => {
                self.select.set_inner_html("");
                self.select.set_hidden(true);
            }
        }

        match &surface.buffering_banner {
            Some(banner) => {
                self.banner.set_text_content(Some(&banner.message));
                self.banner.set_hidden(false);
            }
            None => {
                self.banner.set_text_content(None);
                self.banner.set_hidden(true);
            }
        }

        self.rendered = Some(surface.clone());
        Ok(())
    }

    /// Detach the whole tree from the document
    pub fn remove(&self) {
        self.root.remove();
    }

    fn render_tracks(&mut self, tracks: &[TextTrackElement]) -> Result<(), JsValue> {
        for track in self.tracks.drain(..) {
            track.remove();
        }
        for spec in tracks {
            let track: HtmlTrackElement = self.document.create_element("track")?.dyn_into()?;
            track.set_kind(&spec.kind);
            track.set_src(&spec.src);
            track.set_srclang(&spec.src_lang);
            track.set_label(&spec.label);
            self.video.append_child(&track)?;
            self.tracks.push(track);
        }
        Ok(())
    }

    fn render_options(&self, selector: &QualitySelector) -> Result<(), JsValue> {
        self.select.set_inner_html("");
        for option in &selector.options {
            let value = i32::from(option.level).to_string();
            let element = HtmlOptionElement::new_with_text_and_value(&option.label, &value)?;
            self.select.append_child(&element)?;
        }
        Ok(())
    }
}
