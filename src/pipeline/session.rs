use anyhow::Result;
use std::sync::Arc;

use crate::classify::Blocklist;
use crate::clock::Clock;
use crate::debounce::{CooldownState, DebounceController, DebounceDecision};
use crate::extraction::CandidateExtractor;
use crate::gate::UnlockGate;
use crate::models::{EventKind, NavigationEvent, UiNode, WindowSnapshot};
use crate::overlay::{OpenOutcome, OverlaySession, OverlaySink, SessionController, SessionSnapshot};

use super::config::DetectorConfig;
use super::recheck::{PendingRechecks, RecheckTicket};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// What one pipeline invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// No tree was available.
    Skipped,
    /// Event or window from an application that is not monitored.
    Ignored,
    TypingRecorded,
    NoCandidate,
    SafePage,
    Suppressed { domain: String, decision: DebounceDecision },
    RecheckScheduled(RecheckTicket),
    StaleRecheck,
    NotBlocked { domain: String },
    Unlocked { domain: String },
    Session { domain: String, outcome: OpenOutcome },
}

impl PassOutcome {
    pub fn opened_overlay(&self) -> bool {
        matches!(
            self,
            PassOutcome::Session {
                outcome: OpenOutcome::Opened | OpenOutcome::Replaced { .. },
                ..
            }
        )
    }
}

/// The serialized detection pipeline.
///
/// One value owns all mutable detection state: cooldown timestamps, the
/// overlay session and pending rechecks. Callers must drive it from a
/// single task or wrap it in a mutex.
pub struct DetectionSession {
    config: Arc<DetectorConfig>,
    extractor: CandidateExtractor,
    debounce: DebounceController,
    blocklist: Blocklist,
    cooldown: CooldownState,
    sessions: SessionController,
    rechecks: PendingRechecks,
    gate: UnlockGate,
    sink: Box<dyn OverlaySink>,
    clock: Arc<dyn Clock>,
}

impl DetectionSession {
    pub fn new(
        config: DetectorConfig,
        gate: UnlockGate,
        sink: Box<dyn OverlaySink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            extractor: CandidateExtractor::new(&config),
            debounce: DebounceController::new(&config),
            blocklist: Blocklist::new(&config.blocklist),
            config: Arc::new(config),
            cooldown: CooldownState::new(),
            sessions: SessionController::new(),
            rechecks: PendingRechecks::new(),
            gate,
            sink,
            clock,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &CooldownState {
        &self.cooldown
    }

    pub fn gate(&self) -> &UnlockGate {
        &self.gate
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.sessions.snapshot()
    }

    pub fn has_pending_recheck(&self, domain: &str) -> bool {
        self.rechecks.is_pending(domain)
    }

    /// Event ingest. Text edits only arm the typing cooldown; a window change
    /// clears it because a real navigation supersedes the edit.
    pub fn handle_event<N: UiNode>(&mut self, event: NavigationEvent<N>) -> PassOutcome {
        if !self.config.is_monitored(&event.source_app_id) {
            return PassOutcome::Ignored;
        }

        let outcome = match event.kind {
            EventKind::TextChanged => {
                self.cooldown.record_typing(self.clock.now());
                PassOutcome::TypingRecorded
            }
            EventKind::WindowChanged => {
                self.cooldown.clear_typing();
                self.evaluate(&event.source_app_id, event.tree_snapshot.as_ref())
            }
            EventKind::ContentChanged | EventKind::Scrolled => {
                self.evaluate(&event.source_app_id, event.tree_snapshot.as_ref())
            }
        };

        self.report(event.kind.as_str(), &outcome);
        outcome
    }

    /// Poll pass over whatever window is in front.
    pub fn tick<N: UiNode>(&mut self, snapshot: Option<WindowSnapshot<N>>) -> PassOutcome {
        let outcome = self.evaluate_snapshot(snapshot.as_ref());
        self.report("tick", &outcome);
        outcome
    }

    /// Deferred re-evaluation after the transition delay. Superseded or
    /// cancelled tickets do nothing.
    pub fn run_recheck<N: UiNode>(
        &mut self,
        ticket: &RecheckTicket,
        snapshot: Option<WindowSnapshot<N>>,
    ) -> PassOutcome {
        if !self.rechecks.take(ticket) {
            log_debug!("discarding stale recheck #{} for {}", ticket.id, ticket.domain);
            return PassOutcome::StaleRecheck;
        }

        let outcome = self.evaluate_snapshot(snapshot.as_ref());
        self.report("recheck", &outcome);
        outcome
    }

    /// The user dismissed the overlay.
    pub fn dismiss(&mut self) -> Option<OverlaySession> {
        self.sessions.dismiss(self.sink.as_mut())
    }

    fn evaluate_snapshot<N: UiNode>(&mut self, snapshot: Option<&WindowSnapshot<N>>) -> PassOutcome {
        let Some(snapshot) = snapshot else {
            return PassOutcome::Skipped;
        };
        if !self.config.is_monitored(&snapshot.app_id) {
            return PassOutcome::Ignored;
        }
        self.evaluate(&snapshot.app_id, Some(&snapshot.root))
    }

    fn evaluate<N: UiNode>(&mut self, app_id: &str, root: Option<&N>) -> PassOutcome {
        let Some(root) = root else {
            return PassOutcome::Skipped;
        };

        let Some(candidate) = self.extractor.extract(root) else {
            return PassOutcome::NoCandidate;
        };

        let now = self.clock.now();
        let is_blocked = self.blocklist.is_blocked(&candidate.domain);
        let decision = self
            .debounce
            .evaluate(&candidate, is_blocked, &mut self.cooldown, now);
        let domain = candidate.domain;

        match decision {
            DebounceDecision::SafePage => {
                self.rechecks.cancel_all();
                self.sessions.clear_rejection();
                return PassOutcome::SafePage;
            }
            DebounceDecision::SuppressTransition { recheck_in } => {
                let ticket = self.rechecks.schedule(&domain, recheck_in);
                return PassOutcome::RecheckScheduled(ticket);
            }
            DebounceDecision::SuppressTyping | DebounceDecision::SuppressDuplicate => {
                return PassOutcome::Suppressed { domain, decision };
            }
            DebounceDecision::Accept => {}
        }

        if !is_blocked {
            return PassOutcome::NotBlocked { domain };
        }

        self.cooldown.mark_blocked_domain(&domain);
        self.rechecks.cancel(&domain);

        let wall_now = self.clock.wall_now();
        if self.gate.is_active(wall_now) {
            log_info!(
                "{} is blocked but unlock is active ({}s left)",
                domain,
                self.gate.remaining_secs(wall_now)
            );
            return PassOutcome::Unlocked { domain };
        }

        let outcome = self
            .sessions
            .open(&domain, app_id, self.sink.as_mut(), wall_now);
        if outcome.requested_open() {
            self.cooldown.record_trigger(&domain, now);
        }

        PassOutcome::Session { domain, outcome }
    }

    fn report(&self, trigger: &str, outcome: &PassOutcome) {
        if self.config.verbose {
            log::info!("[pass] {trigger}: {outcome:?}");
        } else {
            log_debug!("[pass] {trigger}: {outcome:?}");
        }
    }
}
