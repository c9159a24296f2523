use std::time::{Duration, Instant};

/// Timestamps the debounce rules compare against. Owned by the pipeline actor.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    pub last_text_change_at: Option<Instant>,
    /// Last time the search engine was observed in the address bar.
    pub last_non_blocked_page_at: Option<Instant>,
    pub last_trigger_at: Option<Instant>,
    pub last_trigger_domain: Option<String>,
    /// Blocked domain the user currently appears to be on, if any.
    pub current_blocked_domain: Option<String>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_typing(&mut self, now: Instant) {
        self.last_text_change_at = Some(now);
    }

    pub fn clear_typing(&mut self) {
        self.last_text_change_at = None;
    }

    pub fn mark_safe_page(&mut self, now: Instant) {
        self.last_non_blocked_page_at = Some(now);
        self.current_blocked_domain = None;
    }

    pub fn mark_blocked_domain(&mut self, domain: &str) {
        if self.current_blocked_domain.as_deref() != Some(domain) {
            self.current_blocked_domain = Some(domain.to_string());
        }
    }

    pub fn record_trigger(&mut self, domain: &str, now: Instant) {
        self.last_trigger_at = Some(now);
        self.last_trigger_domain = Some(domain.to_string());
    }

    pub fn since_typing(&self, now: Instant) -> Option<Duration> {
        elapsed_since(self.last_text_change_at, now)
    }

    pub fn since_safe_page(&self, now: Instant) -> Option<Duration> {
        elapsed_since(self.last_non_blocked_page_at, now)
    }

    /// Time since the last trigger, only if it was for `domain`.
    pub fn since_trigger_of(&self, domain: &str, now: Instant) -> Option<Duration> {
        if self.last_trigger_domain.as_deref() != Some(domain) {
            return None;
        }
        elapsed_since(self.last_trigger_at, now)
    }
}

fn elapsed_since(at: Option<Instant>, now: Instant) -> Option<Duration> {
    at.map(|at| now.saturating_duration_since(at))
}
