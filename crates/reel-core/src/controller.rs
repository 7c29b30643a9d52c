//! Mount/attach controller
//!
//! Owns the lifecycle of the engine instance:
//! - creates it on mount and whenever the source changes
//! - releases the previous instance before the next one exists
//! - routes user quality overrides to the live instance
//! - degrades to native playback when the engine is unsupported

use crate::{
    attachment::Attachment,
    engine::{signal_channel, EngineFactory, MediaTarget, StreamingEngine},
    projector::{Diagnostics, Projector, ViewState},
    surface::{render, Surface},
    Error, InstanceId, LevelSelection, PlaybackMode, PlayerProps, Result, SourceDescriptor,
    SubtitleTrack, HLS_MIME_TYPE,
};
use tracing::{debug, info, instrument, warn};

/// Player component controller
pub struct PlayerController<F: EngineFactory> {
    factory: F,
    props: PlayerProps,
    media: Option<F::Media>,
    attachment: Option<Attachment<F::Engine>>,
    projector: Projector,
    mode: PlaybackMode,
    next_instance: u64,
}

impl<F: EngineFactory> PlayerController<F> {
    pub fn new(factory: F, props: PlayerProps) -> Self {
        Self {
            factory,
            props,
            media: None,
            attachment: None,
            projector: Projector::new(),
            mode: PlaybackMode::Detached,
            next_instance: 1,
        }
    }

    pub fn props(&self) -> &PlayerProps {
        &self.props
    }

    pub fn view(&self) -> &ViewState {
        self.projector.view()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.projector.diagnostics()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_mounted(&self) -> bool {
        self.media.is_some()
    }

    /// Id of the live engine instance, if any
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.attachment.as_ref().map(Attachment::id)
    }

    /// Engine of the live instance, if any
    pub fn engine(&self) -> Option<&F::Engine> {
        self.attachment.as_ref().map(Attachment::engine)
    }

    pub fn media(&self) -> Option<&F::Media> {
        self.media.as_ref()
    }

    /// Current render model
    pub fn surface(&self) -> Surface {
        render(&self.props, self.projector.view())
    }

    /// Bind to a render target and start playback of the current source
    #[instrument(skip(self, media))]
    pub fn mount(&mut self, media: F::Media) -> Result<()> {
        if self.media.is_some() {
            return Err(Error::AlreadyMounted);
        }
        self.media = Some(media);
        self.attach()
    }

    /// Replace all props; re-attaches only if the source changed
    pub fn set_props(&mut self, props: PlayerProps) -> Result<()> {
        let source_changed = props.src != self.props.src;
        let engine_changed = props.engine != self.props.engine;
        self.props = props;

        if source_changed || engine_changed {
            self.reattach()
        } else {
            Ok(())
        }
    }

    /// Switch to another source. No-op for the same locator
    pub fn set_source(&mut self, source: SourceDescriptor) -> Result<()> {
        if source == self.props.src {
            return Ok(());
        }
        self.props.src = source;
        self.reattach()
    }

    pub fn set_subtitles(&mut self, subtitles: Vec<SubtitleTrack>) {
        self.props.subtitles = subtitles;
    }

    /// Tear down and hand the render target back
    #[instrument(skip(self))]
    pub fn unmount(&mut self) -> Option<F::Media> {
        self.teardown();
        let media = self.media.take();
        if media.is_some() {
            info!("Player unmounted");
        }
        media
    }

    /// Apply a user quality override to the live instance
    pub fn select_quality(&mut self, selection: LevelSelection) -> Result<()> {
        let attachment = self.attachment.as_mut().ok_or(Error::NotAttached)?;

        if let LevelSelection::Level(index) = selection {
            let available = self.projector.view().level_count();
            if index >= available {
                return Err(Error::InvalidLevel { index, available });
            }
        }

        attachment.engine_mut().set_current_level(selection);
        if self.projector.select(selection) {
            info!(instance = %attachment.id(), %selection, "Quality selected");
        }
        Ok(())
    }

    /// Drain signals queued by the live instance into the view state.
    /// Returns the number of signals that changed the view.
    pub fn pump(&mut self) -> usize {
        let Some(attachment) = self.attachment.as_mut() else {
            return 0;
        };

        let mut changed = 0;
        while let Some(signal) = attachment.next_signal() {
            if self.projector.apply(signal) {
                changed += 1;
            }
        }
        changed
    }

    fn reattach(&mut self) -> Result<()> {
        if self.media.is_none() {
            return Ok(());
        }
        self.teardown();
        self.attach()
    }

    fn attach(&mut self) -> Result<()> {
        let Some(media) = self.media.as_ref() else {
            return Ok(());
        };
        debug_assert!(self.attachment.is_none());

        if !self.factory.is_supported() {
            self.mode = if media.can_play_type(HLS_MIME_TYPE) {
                media.set_direct_source(Some(self.props.src.url()));
                PlaybackMode::Native
            } else {
                PlaybackMode::Unsupported
            };
            warn!(mode = %self.mode, src = %self.props.src, "Adaptive streaming unsupported");
            return Ok(());
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;

        let mut engine = self.factory.create(&self.props.engine)?;
        let (sink, signals) = signal_channel();
        engine.subscribe(sink);

        // Any early return from here drops the attachment, which destroys the engine
        let mut attachment = Attachment::new(id, engine, signals);
        attachment.engine_mut().attach_media(media)?;
        attachment.engine_mut().load_source(&self.props.src)?;

        info!(instance = %id, src = %self.props.src, "Engine attached");
        self.attachment = Some(attachment);
        self.mode = PlaybackMode::Adaptive;
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            info!(instance = %attachment.id(), "Releasing engine");
            drop(attachment);
        }
        if self.mode == PlaybackMode::Native {
            if let Some(media) = self.media.as_ref() {
                media.set_direct_source(None);
            }
        }
        self.projector.reset();
        self.mode = PlaybackMode::Detached;
        debug!("Teardown complete");
    }
}

impl<F: EngineFactory> Drop for PlayerController<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
