use std::time::{Duration, Instant};

use crate::extraction::normalize_domain;
use crate::models::UrlCandidate;
use crate::pipeline::DetectorConfig;

use super::cooldown::CooldownState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    Accept,
    /// The search engine itself; transition tracking was reset.
    SafePage,
    SuppressTyping,
    /// Hover previews may still be showing. Re-evaluate after `recheck_in`.
    SuppressTransition { recheck_in: Duration },
    SuppressDuplicate,
}

impl DebounceDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebounceDecision::Accept => "accept",
            DebounceDecision::SafePage => "safe_page",
            DebounceDecision::SuppressTyping => "suppress_typing",
            DebounceDecision::SuppressTransition { .. } => "suppress_transition",
            DebounceDecision::SuppressDuplicate => "suppress_duplicate",
        }
    }
}

/// Time-window rules that hold back otherwise valid candidates.
#[derive(Debug, Clone)]
pub struct DebounceController {
    search_engine_domain: String,
    typing_cooldown: Duration,
    transition_delay: Duration,
    retrigger_suppress: Duration,
}

impl DebounceController {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            search_engine_domain: normalize_domain(&config.search_engine_domain),
            typing_cooldown: config.typing_cooldown(),
            transition_delay: config.transition_delay(),
            retrigger_suppress: config.retrigger_suppress(),
        }
    }

    /// Rules run in order and the first match decides. Only the safe-page rule
    /// mutates `state`; trigger bookkeeping belongs to the caller.
    pub fn evaluate(
        &self,
        candidate: &UrlCandidate,
        is_blocked: bool,
        state: &mut CooldownState,
        now: Instant,
    ) -> DebounceDecision {
        if candidate.domain == self.search_engine_domain {
            state.mark_safe_page(now);
            return DebounceDecision::SafePage;
        }

        if state
            .since_typing(now)
            .is_some_and(|elapsed| elapsed < self.typing_cooldown)
        {
            return DebounceDecision::SuppressTyping;
        }

        if is_blocked {
            if let Some(elapsed) = state.since_safe_page(now) {
                if elapsed < self.transition_delay {
                    return DebounceDecision::SuppressTransition {
                        recheck_in: self.transition_delay - elapsed,
                    };
                }
            }
        }

        if state
            .since_trigger_of(&candidate.domain, now)
            .is_some_and(|elapsed| elapsed < self.retrigger_suppress)
        {
            return DebounceDecision::SuppressDuplicate;
        }

        DebounceDecision::Accept
    }
}
