//! Event-to-state projection
//!
//! Maps engine signals onto the UI state the render surface reads. The
//! projector never picks quality levels on its own; automatic switching
//! belongs to the engine and the selection only changes on user request.

use crate::{EngineErrorInfo, EngineSignal, LevelSelection, QualityOption};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// UI state derived from engine signals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Empty until a manifest is parsed, then `Auto` followed by one
    /// option per rendition
    pub qualities: Vec<QualityOption>,
    /// Current user selection
    pub selected: LevelSelection,
    pub buffering: bool,
}

impl ViewState {
    /// Number of explicit (non-automatic) levels on offer
    pub fn level_count(&self) -> usize {
        self.qualities.iter().filter(|q| !q.level.is_auto()).count()
    }
}

/// Engine errors seen so far, kept for inspection only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: u32,
    pub fatal_errors: u32,
    pub last_error: Option<EngineErrorInfo>,
}

#[derive(Debug, Default)]
pub struct Projector {
    view: ViewState,
    diagnostics: Diagnostics,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Apply one signal; returns whether the view state changed
    pub fn apply(&mut self, signal: EngineSignal) -> bool {
        debug!(signal = signal.name(), "Engine signal");

        match signal {
            EngineSignal::ManifestParsed { renditions } => {
                let qualities = QualityOption::from_renditions(&renditions);
                let mut changed = qualities != self.view.qualities;
                self.view.qualities = qualities;

                if let LevelSelection::Level(index) = self.view.selected {
                    if index >= renditions.len() {
                        debug!(
                            index,
                            levels = renditions.len(),
                            "Selected level gone, back to auto"
                        );
                        self.view.selected = LevelSelection::Auto;
                        changed = true;
                    }
                }
                changed
            }
            EngineSignal::BufferAppending => {
                let changed = !self.view.buffering;
                self.view.buffering = true;
                changed
            }
            EngineSignal::BufferAppended => {
                let changed = self.view.buffering;
                self.view.buffering = false;
                changed
            }
            EngineSignal::Error(info) => {
                if info.fatal {
                    error!(kind = %info.kind, details = %info.details, "Fatal engine error");
                    self.diagnostics.fatal_errors += 1;
                } else {
                    warn!(kind = %info.kind, details = %info.details, "Engine error");
                }
                self.diagnostics.errors += 1;
                self.diagnostics.last_error = Some(info);
                false
            }
        }
    }

    /// Record a user selection
    pub fn select(&mut self, selection: LevelSelection) -> bool {
        let changed = self.view.selected != selection;
        self.view.selected = selection;
        changed
    }

    /// Clear all derived view state; diagnostics are kept
    pub fn reset(&mut self) {
        self.view = ViewState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineErrorKind, Rendition};

    fn manifest(heights: &[u32]) -> EngineSignal {
        EngineSignal::ManifestParsed {
            renditions: heights.iter().map(|h| Rendition::with_height(*h)).collect(),
        }
    }

    #[test]
    fn test_manifest_replaces_options() {
        let mut projector = Projector::new();
        assert!(projector.apply(manifest(&[360, 720, 1080])));

        let labels: Vec<_> = projector.view().qualities.iter().map(|q| q.label.as_str()).collect();
        assert_eq!(labels, ["Auto", "360p", "720p", "1080p"]);
        assert_eq!(projector.view().level_count(), 3);

        assert!(projector.apply(manifest(&[480])));
        assert_eq!(projector.view().qualities.len(), 2);
        assert!(!projector.apply(manifest(&[480])));
    }

    #[test]
    fn test_buffering_toggles() {
        let mut projector = Projector::new();
        assert!(!projector.view().buffering);

        assert!(projector.apply(EngineSignal::BufferAppending));
        assert!(projector.view().buffering);
        assert!(!projector.apply(EngineSignal::BufferAppending));

        assert!(projector.apply(EngineSignal::BufferAppended));
        assert!(!projector.view().buffering);
    }

    #[test]
    fn test_errors_do_not_touch_view() {
        let mut projector = Projector::new();
        projector.apply(manifest(&[720]));
        projector.apply(EngineSignal::BufferAppending);
        let before = projector.view().clone();

        let changed = projector.apply(EngineSignal::Error(EngineErrorInfo {
            kind: EngineErrorKind::Network,
            details: "fragLoadError".to_string(),
            fatal: true,
        }));

        assert!(!changed);
        assert_eq!(projector.view(), &before);
        assert_eq!(projector.diagnostics().errors, 1);
        assert_eq!(projector.diagnostics().fatal_errors, 1);
        assert_eq!(
            projector.diagnostics().last_error.as_ref().map(|e| e.details.as_str()),
            Some("fragLoadError")
        );
    }

    #[test]
    fn test_reparse_drops_vanished_selection() {
        let mut projector = Projector::new();
        projector.apply(manifest(&[360, 720, 1080]));
        projector.select(LevelSelection::Level(2));

        projector.apply(manifest(&[360, 720, 1080]));
        assert_eq!(projector.view().selected, LevelSelection::Level(2));

        projector.apply(manifest(&[360]));
        assert_eq!(projector.view().selected, LevelSelection::Auto);
    }

    #[test]
    fn test_reset_clears_view_keeps_diagnostics() {
        let mut projector = Projector::new();
        projector.apply(manifest(&[720]));
        projector.select(LevelSelection::Level(0));
        projector.apply(EngineSignal::BufferAppending);
        projector.apply(EngineSignal::Error(EngineErrorInfo {
            kind: EngineErrorKind::Media,
            details: "bufferStalledError".to_string(),
            fatal: false,
        }));

        projector.reset();

        assert_eq!(projector.view(), &ViewState::default());
        assert_eq!(projector.diagnostics().errors, 1);
        assert_eq!(projector.diagnostics().fatal_errors, 0);
    }
}
