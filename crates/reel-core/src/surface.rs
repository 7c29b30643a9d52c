//! Render surface model
//!
//! A pure description of what the component shows for a given state.
//! Renderers (the DOM binding, tests) consume it; nothing here touches
//! the engine.

use crate::{LevelSelection, PlayerProps, QualityOption, SubtitleTrack, ViewState};
use serde::{Deserialize, Serialize};

/// Text of the buffering banner
pub const BUFFERING_MESSAGE: &str = "Buffering...";

/// CORS mode of the media element, so cross-origin subtitle files load
pub const CROSS_ORIGIN: &str = "anonymous";

/// Everything the component renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    pub video: VideoElement,
    pub quality_selector: Option<QualitySelector>,
    pub buffering_banner: Option<BufferingBanner>,
}

/// The always-present media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoElement {
    pub width: u32,
    pub height: u32,
    pub controls: bool,
    pub cross_origin: String,
    pub tracks: Vec<TextTrackElement>,
}

/// `<track>` child of the media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTrackElement {
    pub kind: String,
    pub src: String,
    pub src_lang: String,
    pub label: String,
}

impl From<&SubtitleTrack> for TextTrackElement {
    fn from(track: &SubtitleTrack) -> Self {
        Self {
            kind: "subtitles".to_string(),
            src: track.src.clone(),
            src_lang: track.src_lang.clone(),
            label: track.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySelector {
    pub options: Vec<QualityOption>,
    pub selected: LevelSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferingBanner {
    pub message: String,
}

/// Build the surface for the given props and view state
pub fn render(props: &PlayerProps, view: &ViewState) -> Surface {
    let video = VideoElement {
        width: props.width,
        height: props.height,
        controls: true,
        cross_origin: CROSS_ORIGIN.to_string(),
        tracks: props.subtitles.iter().map(TextTrackElement::from).collect(),
    };

    let quality_selector = (!view.qualities.is_empty()).then(|| QualitySelector {
        options: view.qualities.clone(),
        selected: view.selected,
    });

    let buffering_banner = view.buffering.then(|| BufferingBanner {
        message: BUFFERING_MESSAGE.to_string(),
    });

    Surface {
        video,
        quality_selector,
        buffering_banner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rendition, SourceDescriptor};

    fn props() -> PlayerProps {
        PlayerProps::new(SourceDescriptor::parse("https://example.com/master.m3u8").unwrap())
    }

    #[test]
    fn test_initial_surface() {
        let surface = render(&props(), &ViewState::default());

        assert_eq!(surface.video.width, 640);
        assert_eq!(surface.video.height, 360);
        assert!(surface.video.controls);
        assert_eq!(surface.video.cross_origin, "anonymous");
        assert!(surface.video.tracks.is_empty());
        assert!(surface.quality_selector.is_none());
        assert!(surface.buffering_banner.is_none());
    }

    #[test]
    fn test_tracks_follow_subtitles_verbatim() {
        let props = props().with_subtitles(vec![
            SubtitleTrack::new("/subs/en.vtt", "en", "English"),
            SubtitleTrack::new("/subs/fr.vtt", "fr", "Français"),
        ]);
        let surface = render(&props, &ViewState::default());

        assert_eq!(surface.video.tracks.len(), 2);
        assert_eq!(surface.video.tracks[1].kind, "subtitles");
        assert_eq!(surface.video.tracks[1].src, "/subs/fr.vtt");
        assert_eq!(surface.video.tracks[1].src_lang, "fr");
        assert_eq!(surface.video.tracks[1].label, "Français");
    }

    #[test]
    fn test_overlays_follow_state() {
        let view = ViewState {
            qualities: QualityOption::from_renditions(&[Rendition::with_height(720)]),
            selected: LevelSelection::Level(0),
            buffering: true,
        };
        let surface = render(&props(), &view);

        let selector = surface.quality_selector.unwrap();
        assert_eq!(selector.options.len(), 2);
        assert_eq!(selector.selected, LevelSelection::Level(0));
        assert_eq!(surface.buffering_banner.unwrap().message, BUFFERING_MESSAGE);
    }

    #[test]
    fn test_surface_json_shape() {
        let view = ViewState {
            qualities: QualityOption::from_renditions(&[Rendition::with_height(480)]),
            ..Default::default()
        };
        let json = serde_json::to_value(render(&props(), &view)).unwrap();

        assert_eq!(json["video"]["crossOrigin"], "anonymous");
        assert_eq!(json["qualitySelector"]["selected"], -1);
        assert_eq!(json["qualitySelector"]["options"][1]["label"], "480p");
        assert!(json["bufferingBanner"].is_null());
    }
}
