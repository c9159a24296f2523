use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::models::{NavigationEvent, SnapshotSource};
use crate::overlay::SessionSnapshot;
use crate::pipeline::{DetectionSession, PassOutcome, RecheckTicket};

use super::recheck_timers::RecheckTimers;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Input to the detection actor.
#[derive(Debug)]
pub enum LoopMessage<N> {
    Event(NavigationEvent<N>),
    Dismiss,
    Recheck(RecheckTicket),
}

/// Single actor that serializes every pipeline invocation: accessibility
/// events, poll ticks, deferred rechecks and user dismissals.
pub async fn detection_loop<S: SnapshotSource>(
    mut session: DetectionSession,
    source: S,
    mut rx: mpsc::Receiver<LoopMessage<S::Node>>,
    recheck_tx: mpsc::WeakSender<LoopMessage<S::Node>>,
    status_tx: watch::Sender<SessionSnapshot>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(session.config().poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut timers = RecheckTimers::new();

    log_info!(
        "detection loop started (poll every {}ms)",
        session.config().poll_interval_ms
    );

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("detection loop shutting down");
                break;
            }
            message = rx.recv() => match message {
                Some(LoopMessage::Event(event)) => Some(session.handle_event(event)),
                Some(LoopMessage::Recheck(ticket)) => {
                    timers.finished(&ticket);
                    Some(session.run_recheck(&ticket, source.capture()))
                }
                Some(LoopMessage::Dismiss) => {
                    if session.dismiss().is_none() {
                        log_debug!("dismiss requested with no open overlay");
                    }
                    None
                }
                None => {
                    log_info!("all detection handles dropped; stopping loop");
                    break;
                }
            },
            _ = ticker.tick() => Some(session.tick(source.capture())),
        };

        if let Some(PassOutcome::RecheckScheduled(ticket)) = outcome {
            log_debug!(
                "recheck #{} for {} in {}ms",
                ticket.id,
                ticket.domain,
                ticket.delay.as_millis()
            );
            timers.schedule(ticket, recheck_tx.clone());
        }
        timers.retain_pending(&session);

        publish_status(&status_tx, session.snapshot());
    }

    if !timers.is_empty() {
        log_warn!("dropping {} pending recheck(s) on shutdown", timers.len());
    }
    timers.abort_all();
}

fn publish_status(status_tx: &watch::Sender<SessionSnapshot>, snapshot: SessionSnapshot) {
    status_tx.send_if_modified(|current| {
        if *current == snapshot {
            return false;
        }
        *current = snapshot;
        true
    });
}
