use chrono::{DateTime, Utc};
use log::{error, info, warn};
use uuid::Uuid;

use super::sink::OverlaySink;
use super::state::{OverlaySession, SessionSnapshot, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// An overlay for this domain is already showing.
    AlreadyOpen,
    Replaced { previous: String },
    /// The sink refused the open; the session stays closed.
    Rejected,
    /// The sink refused this domain earlier and no retry is made.
    SkippedAfterRejection,
}

impl OpenOutcome {
    pub fn requested_open(&self) -> bool {
        matches!(
            self,
            OpenOutcome::Opened | OpenOutcome::Replaced { .. } | OpenOutcome::Rejected
        )
    }
}

/// Owns the single blocking session. At most one overlay is open at a time.
#[derive(Debug, Default)]
pub struct SessionController {
    active: Option<OverlaySession>,
    rejected_domain: Option<String>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        if self.active.is_some() {
            SessionStatus::Open
        } else {
            SessionStatus::Closed
        }
    }

    pub fn active(&self) -> Option<&OverlaySession> {
        self.active.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.active
            .as_ref()
            .map(SessionSnapshot::from_session)
            .unwrap_or_else(SessionSnapshot::closed)
    }

    pub fn open(
        &mut self,
        domain: &str,
        source_app_id: &str,
        sink: &mut dyn OverlaySink,
        now: DateTime<Utc>,
    ) -> OpenOutcome {
        let previous = match self.active.take() {
            Some(session) if session.blocked_domain == domain => {
                self.active = Some(session);
                return OpenOutcome::AlreadyOpen;
            }
            Some(session) => {
                if let Err(err) = sink.close_overlay() {
                    warn!(
                        "Failed to close overlay for {} before replacing it: {err:#}",
                        session.blocked_domain
                    );
                }
                Some(session.blocked_domain)
            }
            None => None,
        };

        if self.rejected_domain.as_deref() == Some(domain) {
            return OpenOutcome::SkippedAfterRejection;
        }

        if let Err(err) = sink.open_overlay(domain, source_app_id) {
            error!("Overlay open rejected for {domain}: {err:#}");
            self.rejected_domain = Some(domain.to_string());
            return OpenOutcome::Rejected;
        }

        let session = OverlaySession {
            id: Uuid::new_v4().to_string(),
            blocked_domain: domain.to_string(),
            source_app_id: source_app_id.to_string(),
            opened_at: now,
        };
        info!(
            "Overlay session {} opened for {} from {}",
            session.id, session.blocked_domain, session.source_app_id
        );
        self.active = Some(session);
        self.rejected_domain = None;

        match previous {
            Some(previous) => OpenOutcome::Replaced { previous },
            None => OpenOutcome::Opened,
        }
    }

    /// User dismissed the overlay. Returns the closed session, if any.
    pub fn dismiss(&mut self, sink: &mut dyn OverlaySink) -> Option<OverlaySession> {
        let session = self.active.take()?;
        self.rejected_domain = None;

        if let Err(err) = sink.return_to_source(&session.source_app_id) {
            warn!(
                "Could not return to {} after dismissal, closing overlay instead: {err:#}",
                session.source_app_id
            );
            if let Err(err) = sink.close_overlay() {
                error!("Failed to close overlay {}: {err:#}", session.id);
            }
        }

        info!(
            "Overlay session {} for {} dismissed",
            session.id, session.blocked_domain
        );
        Some(session)
    }

    /// Forget an earlier open rejection so the next open is attempted.
    pub fn clear_rejection(&mut self) {
        self.rejected_domain = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::sink::{OverlayCall, RecordingOverlaySink};

    const CHROME: &str = "com.android.chrome";

    #[test]
    fn opening_same_domain_twice_is_a_no_op() {
        let mut sink = RecordingOverlaySink::new();
        let mut controller = SessionController::new();

        assert_eq!(controller.open("a.com", CHROME, &mut sink, Utc::now()), OpenOutcome::Opened);
        assert_eq!(
            controller.open("a.com", CHROME, &mut sink, Utc::now()),
            OpenOutcome::AlreadyOpen
        );
        assert_eq!(sink.open_count(), 1);
        assert_eq!(controller.status(), SessionStatus::Open);
    }

    #[test]
    fn different_domain_closes_then_opens() {
        let mut sink = RecordingOverlaySink::new();
        let mut controller = SessionController::new();

        controller.open("a.com", CHROME, &mut sink, Utc::now());
        let outcome = controller.open("b.com", CHROME, &mut sink, Utc::now());

        assert_eq!(
            outcome,
            OpenOutcome::Replaced {
                previous: "a.com".into()
            }
        );
        assert_eq!(
            sink.calls(),
            vec![
                OverlayCall::Open {
                    domain: "a.com".into(),
                    source_app_id: CHROME.into()
                },
                OverlayCall::Close,
                OverlayCall::Open {
                    domain: "b.com".into(),
                    source_app_id: CHROME.into()
                },
            ]
        );
        assert_eq!(controller.snapshot().blocked_domain.as_deref(), Some("b.com"));
    }

    #[test]
    fn rejected_open_leaves_session_closed_without_retry() {
        let mut sink = RecordingOverlaySink::new().rejecting_opens();
        let mut controller = SessionController::new();

        assert_eq!(controller.open("a.com", CHROME, &mut sink, Utc::now()), OpenOutcome::Rejected);
        assert_eq!(controller.status(), SessionStatus::Closed);
        assert_eq!(
            controller.open("a.com", CHROME, &mut sink, Utc::now()),
            OpenOutcome::SkippedAfterRejection
        );
        assert_eq!(sink.open_count(), 1);

        controller.clear_rejection();
        assert_eq!(controller.open("a.com", CHROME, &mut sink, Utc::now()), OpenOutcome::Rejected);
        assert_eq!(sink.open_count(), 2);
    }

    #[test]
    fn dismissal_returns_to_source_app() {
        let mut sink = RecordingOverlaySink::new();
        let mut controller = SessionController::new();
        controller.open("a.com", CHROME, &mut sink, Utc::now());

        let closed = controller.dismiss(&mut sink).expect("closed session");

        assert_eq!(closed.source_app_id, CHROME);
        assert_eq!(controller.status(), SessionStatus::Closed);
        assert_eq!(
            sink.calls().last(),
            Some(&OverlayCall::ReturnToSource {
                source_app_id: CHROME.into()
            })
        );
        assert!(controller.dismiss(&mut sink).is_none());
    }

    #[test]
    fn dismissal_falls_back_to_plain_close_when_source_is_gone() {
        let mut sink = RecordingOverlaySink::new().with_unresolvable_source();
        let mut controller = SessionController::new();
        controller.open("a.com", CHROME, &mut sink, Utc::now());

        controller.dismiss(&mut sink);

        assert_eq!(sink.calls().last(), Some(&OverlayCall::Close));
        assert_eq!(controller.status(), SessionStatus::Closed);
    }
}
