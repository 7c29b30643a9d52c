//! `<video>` element as engine media target

use reel_core::MediaTarget;
use url::Url;
use web_sys::HtmlVideoElement;

#[derive(Clone)]
pub struct VideoMedia {
    element: HtmlVideoElement,
}

impl VideoMedia {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

impl MediaTarget for VideoMedia {
    fn can_play_type(&self, mime: &str) -> bool {
        // "", "maybe" or "probably"
        !self.element.can_play_type(mime).is_empty()
    }

    fn set_direct_source(&self, url: Option<&Url>) {
        match url {
            Some(url) => self.element.set_src(url.as_str()),
            None => {
                let _ = self.element.remove_attribute("src");
                self.element.load();
            }
        }
    }
}
