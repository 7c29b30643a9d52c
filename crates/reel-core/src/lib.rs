//! Reel Core - HLS Player Component Logic
//!
//! This crate provides the platform-neutral half of the Reel player
//! component:
//! - Engine lifecycle (create on mount / source change, release on teardown)
//! - Projection of engine signals into UI state
//! - Quality overrides routed to the live engine instance
//! - A pure render model for the media element and its overlays
//!
//! The streaming itself (manifest parsing, segment fetching, ABR,
//! buffering) is done by the external engine behind [`StreamingEngine`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Reel Core                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  signals   ┌──────────────┐                   │
//! │  │  Attachment  │───────────▶│  Projector   │                   │
//! │  │ engine + rx  │            │  ViewState   │                   │
//! │  └──────▲───────┘            └──────┬───────┘                   │
//! │         │ owns                      │ render()                  │
//! │  ┌──────┴───────┐            ┌──────▼───────┐                   │
//! │  │  Controller  │◀───────────│   Surface    │                   │
//! │  └──────────────┘  quality   └──────────────┘                   │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod engine;
pub mod attachment;
pub mod projector;
pub mod controller;
pub mod surface;
pub mod mock;

pub use error::{Error, Result};
pub use types::*;
pub use config::{EngineConfig, PlayerProps, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use engine::{
    signal_channel, EngineErrorInfo, EngineErrorKind, EngineFactory, EngineSignal, MediaTarget,
    SignalReceiver, SignalSink, StreamingEngine,
};
pub use attachment::Attachment;
pub use projector::{Diagnostics, Projector, ViewState};
pub use controller::PlayerController;
pub use surface::{
    render, BufferingBanner, QualitySelector, Surface, TextTrackElement, VideoElement,
    CROSS_ORIGIN,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the component library
pub fn init() {
    tracing::info!(version = VERSION, "Reel Core initialized");
}
