//! Scoped ownership of one engine instance and its subscription

use crate::engine::{EngineSignal, SignalReceiver, StreamingEngine};
use crate::InstanceId;
use tracing::debug;

/// A live engine instance bound to its signal receiver.
///
/// Dropping the attachment closes the receiver and then destroys the
/// engine. Both halves are always released together.
pub struct Attachment<E: StreamingEngine> {
    id: InstanceId,
    engine: E,
    signals: SignalReceiver,
}

impl<E: StreamingEngine> Attachment<E> {
    pub fn new(id: InstanceId, engine: E, signals: SignalReceiver) -> Self {
        Self { id, engine, signals }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Next signal delivered by this instance
    pub fn next_signal(&mut self) -> Option<EngineSignal> {
        self.signals.try_next()
    }
}

impl<E: StreamingEngine> Drop for Attachment<E> {
    fn drop(&mut self) {
        self.signals.close();
        self.engine.destroy();
        debug!(instance = %self.id, "Engine instance released");
    }
}

impl<E: StreamingEngine> std::fmt::Debug for Attachment<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signal_channel;
    use crate::mock::FakeFactory;
    use crate::{EngineConfig, EngineFactory, EngineSignal};

    #[test]
    fn test_drop_releases_engine_and_subscription() {
        let mut factory = FakeFactory::new();
        let mut engine = factory.create(&EngineConfig::default()).unwrap();
        let (sink, signals) = signal_channel();
        engine.subscribe(sink);

        let attachment = Attachment::new(InstanceId(1), engine, signals);
        assert_eq!(factory.live_count(), 1);

        let handle = factory.last_engine().unwrap();
        drop(attachment);

        assert_eq!(factory.live_count(), 0);
        assert!(handle.is_destroyed());
        assert!(!handle.emit(EngineSignal::BufferAppending));
    }
}
