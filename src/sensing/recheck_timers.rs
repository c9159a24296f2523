use std::collections::HashMap;

use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;

use crate::pipeline::{DetectionSession, RecheckTicket};

use super::loop_worker::LoopMessage;

/// One sleeping task per domain. Scheduling a newer ticket aborts the older
/// sleeper, so a superseded check never reaches the pipeline.
pub(crate) struct RecheckTimers {
    timers: HashMap<String, (u64, JoinHandle<()>)>,
}

impl RecheckTimers {
    pub(crate) fn new() -> Self {
        Self {
            timers: HashMap::new(),
        }
    }

    pub(crate) fn schedule<N: Send + 'static>(
        &mut self,
        ticket: RecheckTicket,
        tx: WeakSender<LoopMessage<N>>,
    ) {
        let domain = ticket.domain.clone();
        let id = ticket.id;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(ticket.delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(LoopMessage::Recheck(ticket)).await;
            }
        });

        if let Some((_, previous)) = self.timers.insert(domain, (id, handle)) {
            previous.abort();
        }
    }

    pub(crate) fn finished(&mut self, ticket: &RecheckTicket) {
        if self
            .timers
            .get(&ticket.domain)
            .is_some_and(|(id, _)| *id == ticket.id)
        {
            self.timers.remove(&ticket.domain);
        }
    }

    /// Abort sleepers whose domain the pipeline no longer waits on.
    pub(crate) fn retain_pending(&mut self, session: &DetectionSession) {
        self.timers.retain(|domain, (_, handle)| {
            let keep = session.has_pending_recheck(domain);
            if !keep {
                handle.abort();
            }
            keep
        });
    }

    pub(crate) fn abort_all(&mut self) {
        for (_, (_, handle)) in self.timers.drain() {
            handle.abort();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
