use std::collections::HashMap;
use std::time::Duration;

/// A deferred re-evaluation for one domain. Only the newest ticket per
/// domain is honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecheckTicket {
    pub id: u64,
    pub domain: String,
    pub delay: Duration,
}

#[derive(Debug, Default)]
pub struct PendingRechecks {
    latest: HashMap<String, u64>,
    next_id: u64,
}

impl PendingRechecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes any earlier ticket for `domain`.
    pub fn schedule(&mut self, domain: &str, delay: Duration) -> RecheckTicket {
        self.next_id = self.next_id.wrapping_add(1);
        self.latest.insert(domain.to_string(), self.next_id);
        RecheckTicket {
            id: self.next_id,
            domain: domain.to_string(),
            delay,
        }
    }

    pub fn is_current(&self, ticket: &RecheckTicket) -> bool {
        self.latest.get(&ticket.domain) == Some(&ticket.id)
    }

    /// Consume `ticket`. Returns false when it was stale or cancelled.
    pub fn take(&mut self, ticket: &RecheckTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.latest.remove(&ticket.domain);
        true
    }

    pub fn cancel(&mut self, domain: &str) {
        self.latest.remove(domain);
    }

    pub fn cancel_all(&mut self) {
        self.latest.clear();
    }

    pub fn is_pending(&self, domain: &str) -> bool {
        self.latest.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}
