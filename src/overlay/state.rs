use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Closed,
    Open,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Closed
    }
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Closed => "Closed",
            SessionStatus::Open => "Open",
        }
    }
}

/// The one blocking overlay currently on screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySession {
    pub id: String,
    pub blocked_domain: String,
    pub source_app_id: String,
    pub opened_at: DateTime<Utc>,
}

/// Observable view of the session controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub blocked_domain: Option<String>,
    pub source_app_id: Option<String>,
    pub opened_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn from_session(session: &OverlaySession) -> Self {
        Self {
            status: SessionStatus::Open,
            session_id: Some(session.id.clone()),
            blocked_domain: Some(session.blocked_domain.clone()),
            source_app_id: Some(session.source_app_id.clone()),
            opened_at: Some(session.opened_at),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}
