//! Streaming engine collaborator boundary
//!
//! The engine does all of the actual streaming work (manifest parsing,
//! segment fetching, ABR, buffering). The component only needs the
//! surface described by these traits.

use crate::{EngineConfig, LevelSelection, Rendition, Result, SourceDescriptor};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

/// Render target the engine feeds
pub trait MediaTarget {
    /// Whether the target can play `mime` without the engine
    fn can_play_type(&self, mime: &str) -> bool;

    /// Point the target directly at a locator, or clear it with `None`
    fn set_direct_source(&self, url: Option<&Url>);
}

/// One live session of the external streaming engine
pub trait StreamingEngine {
    type Media: MediaTarget;

    /// Route this instance's signals into `sink`
    fn subscribe(&mut self, sink: SignalSink);

    fn attach_media(&mut self, media: &Self::Media) -> Result<()>;

    fn load_source(&mut self, source: &SourceDescriptor) -> Result<()>;

    fn set_current_level(&mut self, level: LevelSelection);

    fn current_level(&self) -> LevelSelection;

    /// Renditions of the parsed manifest, in manifest order
    fn levels(&self) -> Vec<Rendition>;

    /// Release the instance and detach every signal handler
    fn destroy(&mut self);
}

/// Creates engine instances
pub trait EngineFactory {
    type Media: MediaTarget;
    type Engine: StreamingEngine<Media = Self::Media>;

    /// Capability check: can this environment play adaptive streams
    fn is_supported(&self) -> bool;

    fn create(&mut self, config: &EngineConfig) -> Result<Self::Engine>;
}

/// Error category reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineErrorKind {
    Network,
    Media,
    KeySystem,
    Mux,
    Other,
}

impl EngineErrorKind {
    /// Map an hls.js `ErrorTypes` value
    pub fn from_engine_type(kind: &str) -> Self {
        match kind {
            "networkError" => EngineErrorKind::Network,
            "mediaError" => EngineErrorKind::Media,
            "keySystemError" => EngineErrorKind::KeySystem,
            "muxError" => EngineErrorKind::Mux,
            _ => EngineErrorKind::Other,
        }
    }
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineErrorKind::Network => write!(f, "network"),
            EngineErrorKind::Media => write!(f, "media"),
            EngineErrorKind::KeySystem => write!(f, "key-system"),
            EngineErrorKind::Mux => write!(f, "mux"),
            EngineErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Error reported by the engine during playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineErrorInfo {
    pub kind: EngineErrorKind,
    pub details: String,
    pub fatal: bool,
}

/// Signals the component listens to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    /// Manifest parsed, renditions in manifest order
    ManifestParsed { renditions: Vec<Rendition> },
    /// Buffer append started
    BufferAppending,
    /// Buffer append completed
    BufferAppended,
    /// Fatal or non-fatal engine error
    Error(EngineErrorInfo),
}

impl EngineSignal {
    pub fn name(&self) -> &'static str {
        match self {
            EngineSignal::ManifestParsed { .. } => "manifest_parsed",
            EngineSignal::BufferAppending => "buffer_appending",
            EngineSignal::BufferAppended => "buffer_appended",
            EngineSignal::Error(_) => "error",
        }
    }
}

/// Sending half handed to one engine instance.
///
/// Once the matching receiver is closed every emit is a no-op, so an
/// instance that keeps firing after release cannot reach component state.
#[derive(Debug, Clone)]
pub struct SignalSink {
    tx: mpsc::UnboundedSender<EngineSignal>,
}

impl SignalSink {
    /// Returns false if the instance has been released
    pub fn emit(&self, signal: EngineSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half owned by the component
#[derive(Debug)]
pub struct SignalReceiver {
    rx: mpsc::UnboundedReceiver<EngineSignal>,
}

impl SignalReceiver {
    /// Next queued signal, without waiting
    pub fn try_next(&mut self) -> Option<EngineSignal> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting signals; queued ones are discarded
    pub fn close(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create the signal channel for a new engine instance
pub fn signal_channel() -> (SignalSink, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSink { tx }, SignalReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_channel_delivers_in_order() {
        let (sink, mut rx) = signal_channel();
        assert!(sink.emit(EngineSignal::BufferAppending));
        assert!(sink.emit(EngineSignal::BufferAppended));

        assert_eq!(rx.try_next(), Some(EngineSignal::BufferAppending));
        assert_eq!(rx.try_next(), Some(EngineSignal::BufferAppended));
        assert_eq!(rx.try_next(), None);
    }

    #[test]
    fn test_closed_receiver_drops_signals() {
        let (sink, mut rx) = signal_channel();
        sink.emit(EngineSignal::BufferAppending);
        rx.close();

        assert!(sink.is_closed());
        assert!(!sink.emit(EngineSignal::BufferAppended));
        assert_eq!(rx.try_next(), None);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(EngineErrorKind::from_engine_type("networkError"), EngineErrorKind::Network);
        assert_eq!(EngineErrorKind::from_engine_type("mediaError"), EngineErrorKind::Media);
        assert_eq!(EngineErrorKind::from_engine_type("otherError"), EngineErrorKind::Other);
    }
}
