use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{NavigationEvent, SnapshotSource};
use crate::overlay::SessionSnapshot;
use crate::pipeline::DetectionSession;

use super::loop_worker::{detection_loop, LoopMessage};

/// Cheap, cloneable entry point for hosts feeding the detection actor.
pub struct DetectionHandle<N> {
    tx: mpsc::Sender<LoopMessage<N>>,
    status_rx: watch::Receiver<SessionSnapshot>,
}

impl<N> Clone for DetectionHandle<N> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            status_rx: self.status_rx.clone(),
        }
    }
}

impl<N> DetectionHandle<N> {
    /// Queue an accessibility event without waiting. Returns false when the
    /// event was dropped because the queue is full or the loop has stopped.
    pub fn submit(&self, event: NavigationEvent<N>) -> bool {
        match self.tx.try_send(LoopMessage::Event(event)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("detection queue full; dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// The user dismissed the overlay.
    pub fn dismiss(&self) -> Result<()> {
        self.tx
            .try_send(LoopMessage::Dismiss)
            .map_err(|err| anyhow!("failed to deliver dismissal: {err}"))
    }

    pub fn status(&self) -> SessionSnapshot {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.status_rx.clone()
    }
}

pub struct DetectionController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl DetectionController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the detection actor on the current tokio runtime.
    pub fn start<S: SnapshotSource>(
        &mut self,
        session: DetectionSession,
        source: S,
    ) -> Result<DetectionHandle<S::Node>> {
        if self.handle.is_some() {
            bail!("detection already active");
        }

        let capacity = session.config().event_queue_capacity;
        let (tx, rx) = mpsc::channel(capacity);
        let (status_tx, status_rx) = watch::channel(session.snapshot());

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(detection_loop(
            session,
            source,
            rx,
            tx.downgrade(),
            status_tx,
            token_clone,
        ));

        info!("Detection started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);

        Ok(DetectionHandle { tx, status_rx })
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("detection loop task failed to join")
                .map(|_| info!("Detection stopped"))
        } else {
            Ok(())
        }
    }
}

impl Default for DetectionController {
    fn default() -> Self {
        Self::new()
    }
}
