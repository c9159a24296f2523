pub mod classify;
pub mod clock;
pub mod debounce;
pub mod extraction;
pub mod gate;
pub mod models;
pub mod overlay;
pub mod pipeline;
pub mod sensing;
pub mod settings;
pub mod utils;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

pub use classify::{classify, Blocklist};
pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{CooldownState, DebounceDecision};
pub use extraction::{normalize_domain, CandidateExtractor};
pub use gate::{GateStore, InMemoryGateStore, UnlockGate};
pub use models::{
    ClassificationResult, EventKind, NavigationEvent, SnapshotSource, UiNode, UiSnapshotNode,
    UrlCandidate, WindowSnapshot,
};
pub use overlay::{
    OpenOutcome, OverlayCall, OverlaySession, OverlaySink, RecordingOverlaySink,
    SessionSnapshot, SessionStatus,
};
pub use pipeline::{DetectionSession, DetectorConfig, PassOutcome, RecheckTicket};
pub use sensing::{DetectionController, DetectionHandle};
pub use settings::SettingsStore;
pub use utils::logging::init_logging;

/// Wire a detection session to the persisted settings under `app_data_dir`.
///
/// Returns the session together with a gate handle for the reward flow and
/// countdown display; both share the same store.
pub fn bootstrap(
    app_data_dir: &Path,
    config: DetectorConfig,
    sink: Box<dyn OverlaySink>,
) -> Result<(DetectionSession, UnlockGate)> {
    std::fs::create_dir_all(app_data_dir)
        .with_context(|| format!("Failed to create {}", app_data_dir.display()))?;

    let settings_path = app_data_dir.join("settings.json");
    let settings = SettingsStore::new(settings_path)?;
    let gate = UnlockGate::new(Arc::new(settings), config.unlock_duration());

    log::info!(
        "NavGuard starting up: {} monitored app(s), {} blocklist entries",
        config.monitored_apps.len(),
        config.blocklist.len()
    );

    let session = DetectionSession::new(config, gate.clone(), sink, Arc::new(SystemClock))?;
    Ok((session, gate))
}
