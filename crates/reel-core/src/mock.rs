//! In-memory streaming engine for tests and headless embedders
//!
//! `FakeFactory` records every instance it creates so callers can check
//! instance counts and fire signals at any instance, including ones that
//! were already destroyed.

use crate::engine::{EngineFactory, MediaTarget, SignalSink, StreamingEngine};
use crate::{EngineConfig, EngineSignal, Error, LevelSelection, Rendition, Result, SourceDescriptor};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

#[derive(Debug, Default)]
struct Registry {
    engines: Vec<Rc<RefCell<EngineRecord>>>,
    live: usize,
    max_live: usize,
}

#[derive(Debug)]
struct EngineRecord {
    config: EngineConfig,
    // Kept after destroy so a misbehaving instance can still fire
    sink: Option<SignalSink>,
    level: LevelSelection,
    level_history: Vec<LevelSelection>,
    levels: Vec<Rendition>,
    attached: bool,
    source: Option<SourceDescriptor>,
    destroyed: bool,
}

/// Factory producing [`FakeEngine`]s
#[derive(Debug, Clone)]
pub struct FakeFactory {
    registry: Rc<RefCell<Registry>>,
    supported: bool,
    fail_create: bool,
    fail_load: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
            supported: true,
            fail_create: false,
            fail_load: false,
        }
    }

    /// Environment without adaptive streaming support
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Every instance creation fails
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    /// Every created instance rejects `load_source`
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new()
        }
    }

    /// Number of instances created so far
    pub fn created_count(&self) -> usize {
        self.registry.borrow().engines.len()
    }

    /// Number of instances not yet destroyed
    pub fn live_count(&self) -> usize {
        self.registry.borrow().live
    }

    /// Highest number of simultaneously live instances observed
    pub fn max_live(&self) -> usize {
        self.registry.borrow().max_live
    }

    pub fn engine(&self, index: usize) -> Option<FakeEngineHandle> {
        self.registry
            .borrow()
            .engines
            .get(index)
            .map(|record| FakeEngineHandle { record: Rc::clone(record) })
    }

    pub fn last_engine(&self) -> Option<FakeEngineHandle> {
        let count = self.created_count();
        count.checked_sub(1).and_then(|index| self.engine(index))
    }
}

impl Default for FakeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for FakeFactory {
    type Media = FakeMedia;
    type Engine = FakeEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&mut self, config: &EngineConfig) -> Result<FakeEngine> {
        if self.fail_create {
            return Err(Error::engine("fake engine refused to start"));
        }

        let record = Rc::new(RefCell::new(EngineRecord {
            config: config.clone(),
            sink: None,
            level: config.start_level,
            level_history: Vec::new(),
            levels: Vec::new(),
            attached: false,
            source: None,
            destroyed: false,
        }));

        let mut registry = self.registry.borrow_mut();
        registry.engines.push(Rc::clone(&record));
        registry.live += 1;
        registry.max_live = registry.max_live.max(registry.live);

        Ok(FakeEngine {
            record,
            registry: Rc::clone(&self.registry),
            fail_load: self.fail_load,
        })
    }
}

/// Engine instance that only records what it is asked to do
#[derive(Debug)]
pub struct FakeEngine {
    record: Rc<RefCell<EngineRecord>>,
    registry: Rc<RefCell<Registry>>,
    fail_load: bool,
}

impl StreamingEngine for FakeEngine {
    type Media = FakeMedia;

    fn subscribe(&mut self, sink: SignalSink) {
        self.record.borrow_mut().sink = Some(sink);
    }

    fn attach_media(&mut self, _media: &FakeMedia) -> Result<()> {
        self.record.borrow_mut().attached = true;
        Ok(())
    }

    fn load_source(&mut self, source: &SourceDescriptor) -> Result<()> {
        if self.fail_load {
            return Err(Error::LoadSource {
                url: source.to_string(),
                reason: "fake engine refused the source".to_string(),
            });
        }
        self.record.borrow_mut().source = Some(source.clone());
        Ok(())
    }

    fn set_current_level(&mut self, level: LevelSelection) {
        let mut record = self.record.borrow_mut();
        record.level = level;
        record.level_history.push(level);
    }

    fn current_level(&self) -> LevelSelection {
        self.record.borrow().level
    }

    fn levels(&self) -> Vec<Rendition> {
        self.record.borrow().levels.clone()
    }

    fn destroy(&mut self) {
        let mut record = self.record.borrow_mut();
        if record.destroyed {
            return;
        }
        record.destroyed = true;
        record.attached = false;
        self.registry.borrow_mut().live -= 1;
    }
}

/// Test-side view of one fake instance
#[derive(Debug, Clone)]
pub struct FakeEngineHandle {
    record: Rc<RefCell<EngineRecord>>,
}

impl FakeEngineHandle {
    /// Fire a signal from this instance, even after it was destroyed.
    /// Returns whether anyone was still listening.
    pub fn emit(&self, signal: EngineSignal) -> bool {
        self.record
            .borrow()
            .sink
            .as_ref()
            .is_some_and(|sink| sink.emit(signal))
    }

    /// Parse a manifest with one rendition per height and announce it
    pub fn parse_manifest(&self, heights: &[u32]) -> bool {
        let renditions: Vec<Rendition> =
            heights.iter().map(|h| Rendition::with_height(*h)).collect();
        self.record.borrow_mut().levels = renditions.clone();
        self.emit(EngineSignal::ManifestParsed { renditions })
    }

    pub fn is_destroyed(&self) -> bool {
        self.record.borrow().destroyed
    }

    pub fn is_attached(&self) -> bool {
        self.record.borrow().attached
    }

    pub fn source(&self) -> Option<SourceDescriptor> {
        self.record.borrow().source.clone()
    }

    pub fn config(&self) -> EngineConfig {
        self.record.borrow().config.clone()
    }

    pub fn current_level(&self) -> LevelSelection {
        self.record.borrow().level
    }

    /// Every level set on this instance, oldest first
    pub fn level_history(&self) -> Vec<LevelSelection> {
        self.record.borrow().level_history.clone()
    }
}

/// Media target recording its direct source
#[derive(Debug, Clone, Default)]
pub struct FakeMedia {
    native_hls: bool,
    src: Rc<RefCell<Option<Url>>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target that plays HLS natively, like Safari
    pub fn with_native_hls() -> Self {
        Self {
            native_hls: true,
            ..Self::default()
        }
    }

    pub fn direct_source(&self) -> Option<Url> {
        self.src.borrow().clone()
    }
}

impl MediaTarget for FakeMedia {
    fn can_play_type(&self, mime: &str) -> bool {
        self.native_hls && mime == crate::HLS_MIME_TYPE
    }

    fn set_direct_source(&self, url: Option<&Url>) {
        *self.src.borrow_mut() = url.cloned();
    }
}
