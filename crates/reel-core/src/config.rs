//! Component configuration

use crate::{Error, LevelSelection, Result, SourceDescriptor, SubtitleTrack};
use serde::{Deserialize, Serialize};

/// Default render width in pixels
pub const DEFAULT_WIDTH: u32 = 640;
/// Default render height in pixels
pub const DEFAULT_HEIGHT: u32 = 360;

/// Inputs of the player component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProps {
    /// Manifest locator
    pub src: SourceDescriptor,
    /// Render width in pixels, also accepted as a CSS pixel string
    #[serde(default = "default_width", deserialize_with = "dimension::deserialize")]
    pub width: u32,
    #[serde(default = "default_height", deserialize_with = "dimension::deserialize")]
    pub height: u32,
    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,
    /// Options forwarded to the streaming engine
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

/// Render sizes given either as pixel counts (`640`) or as CSS pixel
/// strings (`"640px"`). Other CSS units are rejected.
pub mod dimension {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Pixels(u32),
        Css(String),
    }

    impl Raw {
        fn into_pixels<E: de::Error>(self) -> Result<u32, E> {
            match self {
                Raw::Pixels(px) => Ok(px),
                Raw::Css(css) => parse(&css).ok_or_else(|| {
                    E::custom(format!("unsupported size {css:?}, expected pixels"))
                }),
            }
        }
    }

    /// Parse `"640"` or `"640px"`
    pub fn parse(value: &str) -> Option<u32> {
        let value = value.trim();
        value.strip_suffix("px").unwrap_or(value).trim_end().parse().ok()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Raw::deserialize(deserializer)?.into_pixels()
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        Option::<Raw>::deserialize(deserializer)?
            .map(Raw::into_pixels)
            .transpose()
    }
}

impl PlayerProps {
    pub fn new(src: SourceDescriptor) -> Self {
        Self {
            src,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            subtitles: Vec::new(),
            engine: EngineConfig::default(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_subtitles(mut self, subtitles: Vec<SubtitleTrack>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Parse and validate props from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let props: Self = serde_json::from_str(json)?;
        props.validate()?;
        Ok(props)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "render size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        self.engine.validate()
    }
}

/// Engine options, passed verbatim to the engine constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Verbose engine logging
    pub debug: bool,
    /// Demux in a web worker
    pub enable_worker: bool,
    /// Low-latency live playback
    pub low_latency_mode: bool,
    /// Forward buffer target in seconds
    pub max_buffer_length: f64,
    /// Level to start from, `-1` lets the engine decide
    pub start_level: LevelSelection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            enable_worker: true,
            low_latency_mode: false,
            max_buffer_length: 30.0,
            start_level: LevelSelection::Auto,
        }
    }
}

impl EngineConfig {
    /// Config for low-latency live streams
    pub fn low_latency() -> Self {
        Self {
            low_latency_mode: true,
            max_buffer_length: 6.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_buffer_length.is_finite() || self.max_buffer_length <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "maxBufferLength must be positive, got {}",
                self.max_buffer_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_defaults() {
        let props =
            PlayerProps::from_json(r#"{"src": "https://example.com/master.m3u8"}"#).unwrap();
        assert_eq!(props.width, 640);
        assert_eq!(props.height, 360);
        assert!(props.subtitles.is_empty());
        assert_eq!(props.engine, EngineConfig::default());
    }

    #[test]
    fn test_props_full() {
        let json = r#"{
            "src": "https://example.com/master.m3u8",
            "width": 1280,
            "height": 720,
            "subtitles": [{"src": "/subs/en.vtt", "srcLang": "en", "label": "English"}],
            "engine": {"lowLatencyMode": true, "startLevel": 2}
        }"#;
        let props = PlayerProps::from_json(json).unwrap();

        assert_eq!(props.width, 1280);
        assert_eq!(props.subtitles[0], SubtitleTrack::new("/subs/en.vtt", "en", "English"));
        assert!(props.engine.low_latency_mode);
        assert!(props.engine.enable_worker);
        assert_eq!(props.engine.start_level, LevelSelection::Level(2));
    }

    #[test]
    fn test_props_rejects_zero_size() {
        let err = PlayerProps::from_json(
            r#"{"src": "https://example.com/master.m3u8", "width": 0}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_props_accept_css_pixel_sizes() {
        let props = PlayerProps::from_json(
            r#"{"src": "https://example.com/master.m3u8", "width": "854px", "height": "480"}"#,
        )
        .unwrap();
        assert_eq!((props.width, props.height), (854, 480));

        let err = PlayerProps::from_json(
            r#"{"src": "https://example.com/master.m3u8", "width": "100%"}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "JSON");
    }

    #[test]
    fn test_props_accept_lang_subtitle_shape() {
        let json = r#"{
            "src": "https://cdn.example/m.m3u8",
            "subtitles": [{"src": "/en.vtt", "lang": "en", "label": "English"}]
        }"#;
        let props = PlayerProps::from_json(json).unwrap();
        assert_eq!(props.subtitles, vec![SubtitleTrack::new("/en.vtt", "en", "English")]);
    }

    #[test]
    fn test_props_rejects_bad_locator() {
        let err = PlayerProps::from_json(r#"{"src": "not a url"}"#).unwrap_err();
        assert_eq!(err.error_code(), "JSON");
    }

    #[test]
    fn test_engine_config_camel_case() {
        let json = serde_json::to_value(EngineConfig::low_latency()).unwrap();
        assert_eq!(json["lowLatencyMode"], true);
        assert_eq!(json["maxBufferLength"], 6.0);
        assert_eq!(json["startLevel"], -1);
    }
}
