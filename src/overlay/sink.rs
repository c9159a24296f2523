use anyhow::{bail, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Requests to the subsystem that renders the blocking overlay.
pub trait OverlaySink: Send {
    /// May fail, e.g. when the host lacks permission to draw over other apps.
    fn open_overlay(&mut self, domain: &str, source_app_id: &str) -> Result<()>;

    fn close_overlay(&mut self) -> Result<()>;

    /// Bring `source_app_id` back to the foreground and end the overlay.
    /// Fails when the application can no longer be resolved.
    fn return_to_source(&mut self, source_app_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "call")]
pub enum OverlayCall {
    Open { domain: String, source_app_id: String },
    Close,
    ReturnToSource { source_app_id: String },
}

/// Sink that only records requests. Used for dry runs and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingOverlaySink {
    calls: Arc<Mutex<Vec<OverlayCall>>>,
    reject_opens: bool,
    unresolvable_source: bool,
}

impl RecordingOverlaySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every open request fails, as when display permission is missing.
    pub fn rejecting_opens(mut self) -> Self {
        self.reject_opens = true;
        self
    }

    /// Every return-to-source request fails.
    pub fn with_unresolvable_source(mut self) -> Self {
        self.unresolvable_source = true;
        self
    }

    pub fn calls(&self) -> Vec<OverlayCall> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn open_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, OverlayCall::Open { .. }))
            .count()
    }

    fn record(&self, call: OverlayCall) {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

impl OverlaySink for RecordingOverlaySink {
    fn open_overlay(&mut self, domain: &str, source_app_id: &str) -> Result<()> {
        self.record(OverlayCall::Open {
            domain: domain.to_string(),
            source_app_id: source_app_id.to_string(),
        });
        if self.reject_opens {
            bail!("overlay permission not granted");
        }
        Ok(())
    }

    fn close_overlay(&mut self) -> Result<()> {
        self.record(OverlayCall::Close);
        Ok(())
    }

    fn return_to_source(&mut self, source_app_id: &str) -> Result<()> {
        self.record(OverlayCall::ReturnToSource {
            source_app_id: source_app_id.to_string(),
        });
        if self.unresolvable_source {
            bail!("no launch intent for {source_app_id}");
        }
        Ok(())
    }
}
