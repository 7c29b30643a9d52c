//! Core types for Reel

use serde::{Deserialize, Serialize};
use url::Url;

/// MIME type browsers report for native HLS playback
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Locator of the adaptive manifest.
///
/// Equality is the identity used to decide whether the engine must be
/// re-attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDescriptor(Url);

impl SourceDescriptor {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    /// Parse an absolute locator
    pub fn parse(input: &str) -> crate::Result<Self> {
        Ok(Self(Url::parse(input.trim())?))
    }

    /// Parse a locator, resolving relative input against `base`
    pub fn parse_with_base(input: &str, base: Option<&Url>) -> crate::Result<Self> {
        let input = input.trim();
        match base {
            Some(base) => Ok(Self(base.join(input)?)),
            None => Self::parse(input),
        }
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static subtitle track rendered as a passive `<track>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    /// Locator of the subtitle file, passed through verbatim
    pub src: String,
    /// BCP 47 language code, `srcLang` or `lang` on input
    #[serde(alias = "lang")]
    pub src_lang: String,
    /// Display label
    pub label: String,
}

impl SubtitleTrack {
    pub fn new(
        src: impl Into<String>,
        src_lang: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            src_lang: src_lang.into(),
            label: label.into(),
        }
    }
}

/// One quality variant of a parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Bandwidth in bits per second
    #[serde(default)]
    pub bitrate: u64,
    pub name: Option<String>,
}

impl Rendition {
    pub fn with_height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }

    /// Display label, by vertical resolution when known
    pub fn label(&self) -> String {
        match (self.height, self.name.as_deref()) {
            (Some(height), _) if height > 0 => format!("{height}p"),
            (_, Some(name)) if !name.is_empty() => name.to_string(),
            _ => format!("{} kbps", self.bitrate / 1000),
        }
    }
}

/// Requested quality level.
///
/// Serialized the way the engine encodes it: `-1` for automatic, otherwise
/// the engine-relative level index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum LevelSelection {
    /// Let the engine choose
    #[default]
    Auto,
    /// Pin an engine-relative level index
    Level(usize),
}

impl LevelSelection {
    /// Engine sentinel for automatic selection
    pub const AUTO_INDEX: i32 = -1;

    pub fn is_auto(&self) -> bool {
        matches!(self, LevelSelection::Auto)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            LevelSelection::Auto => None,
            LevelSelection::Level(index) => Some(*index),
        }
    }

    pub fn to_engine_index(self) -> i32 {
        match self {
            LevelSelection::Auto => Self::AUTO_INDEX,
            LevelSelection::Level(index) => i32::try_from(index).unwrap_or(i32::MAX),
        }
    }

    /// Any negative index means automatic
    pub fn from_engine_index(index: i32) -> Self {
        usize::try_from(index).map_or(LevelSelection::Auto, LevelSelection::Level)
    }
}

impl From<LevelSelection> for i32 {
    fn from(selection: LevelSelection) -> Self {
        selection.to_engine_index()
    }
}

impl From<i32> for LevelSelection {
    fn from(index: i32) -> Self {
        LevelSelection::from_engine_index(index)
    }
}

impl std::fmt::Display for LevelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelSelection::Auto => write!(f, "auto"),
            LevelSelection::Level(index) => write!(f, "level {index}"),
        }
    }
}

/// Entry of the quality selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    pub label: String,
    pub level: LevelSelection,
}

impl QualityOption {
    /// The automatic sentinel, always listed first
    pub fn auto() -> Self {
        Self {
            label: "Auto".to_string(),
            level: LevelSelection::Auto,
        }
    }

    /// Options for a parsed manifest, automatic first, then manifest order
    pub fn from_renditions(renditions: &[Rendition]) -> Vec<Self> {
        std::iter::once(Self::auto())
            .chain(renditions.iter().enumerate().map(|(index, rendition)| Self {
                label: rendition.label(),
                level: LevelSelection::Level(index),
            }))
            .collect()
    }
}

/// Identifier of one engine instance created by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// How the media element is currently fed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Not mounted, or torn down
    #[default]
    Detached,
    /// A live engine instance drives the media element
    Adaptive,
    /// Engine unsupported; the element plays the locator natively
    Native,
    /// Engine unsupported and the element cannot play the locator
    Unsupported,
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Detached => write!(f, "detached"),
            PlaybackMode::Adaptive => write!(f, "adaptive"),
            PlaybackMode::Native => write!(f, "native"),
            PlaybackMode::Unsupported => write!(f, "unsupported"),
        }
    }
}
