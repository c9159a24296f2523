use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Persistence for the single `grantedAtEpochMillis` value.
pub trait GateStore: Send + Sync {
    fn load_granted_at(&self) -> Result<Option<i64>>;
    fn save_granted_at(&self, epoch_millis: i64) -> Result<()>;
}

/// Non-persistent store for hosts that do not keep the grant across restarts.
#[derive(Debug, Default)]
pub struct InMemoryGateStore {
    granted_at: Mutex<Option<i64>>,
}

impl GateStore for InMemoryGateStore {
    fn load_granted_at(&self) -> Result<Option<i64>> {
        let guard = self
            .granted_at
            .lock()
            .map_err(|_| anyhow!("gate store lock poisoned"))?;
        Ok(*guard)
    }

    fn save_granted_at(&self, epoch_millis: i64) -> Result<()> {
        let mut guard = self
            .granted_at
            .lock()
            .map_err(|_| anyhow!("gate store lock poisoned"))?;
        *guard = Some(epoch_millis);
        Ok(())
    }
}

/// Time-boxed override that suspends blocking after a reward is earned.
///
/// Any storage failure reads as inactive so blocking stays enforced.
#[derive(Clone)]
pub struct UnlockGate {
    store: Arc<dyn GateStore>,
    duration: Duration,
}

impl UnlockGate {
    pub fn new(store: Arc<dyn GateStore>, duration: Duration) -> Self {
        Self { store, duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Overwrites any earlier grant.
    pub fn grant(&self, now: DateTime<Utc>) -> Result<()> {
        self.store.save_granted_at(now.timestamp_millis())?;
        info!(
            "Unlock granted for {}s starting {}",
            self.duration.as_secs(),
            now.to_rfc3339()
        );
        Ok(())
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_some()
    }

    /// Whole seconds left, rounded up. Zero when expired or never granted.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.remaining(now)
            .map(|left| {
                let millis = left.as_millis() as u64;
                millis.div_ceil(1_000)
            })
            .unwrap_or(0)
    }

    fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let granted_at = match self.store.load_granted_at() {
            Ok(value) => value?,
            Err(err) => {
                warn!("Unlock gate unreadable, treating as inactive: {err:#}");
                return None;
            }
        };

        let elapsed_ms = now.timestamp_millis().checked_sub(granted_at)?;
        // A grant stamped in the future means the wall clock moved backwards.
        if elapsed_ms < 0 {
            return None;
        }

        let window_ms = self.duration.as_millis() as i64;
        (elapsed_ms < window_ms).then(|| Duration::from_millis((window_ms - elapsed_ms) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FailingStore;

    impl GateStore for FailingStore {
        fn load_granted_at(&self) -> Result<Option<i64>> {
            Err(anyhow!("disk gone"))
        }

        fn save_granted_at(&self, _epoch_millis: i64) -> Result<()> {
            Err(anyhow!("disk gone"))
        }
    }

    fn gate() -> UnlockGate {
        UnlockGate::new(Arc::new(InMemoryGateStore::default()), Duration::from_secs(30))
    }

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn active_window_is_thirty_seconds_from_grant() {
        let gate = gate();
        gate.grant(at_ms(0)).expect("grant");

        assert!(gate.is_active(at_ms(0)));
        assert!(gate.is_active(at_ms(29_999)));
        assert!(!gate.is_active(at_ms(30_000)));
        assert!(!gate.is_active(at_ms(30_001)));
        assert_eq!(gate.remaining_secs(at_ms(10_000)), 20);
        assert_eq!(gate.remaining_secs(at_ms(29_999)), 1);
        assert_eq!(gate.remaining_secs(at_ms(30_001)), 0);
    }

    #[test]
    fn never_granted_is_inactive() {
        let gate = gate();
        assert!(!gate.is_active(at_ms(0)));
        assert_eq!(gate.remaining_secs(at_ms(0)), 0);
    }

    #[test]
    fn regrant_overwrites_previous_window() {
        let gate = gate();
        gate.grant(at_ms(0)).expect("grant");
        gate.grant(at_ms(25_000)).expect("regrant");

        assert!(gate.is_active(at_ms(40_000)));
        assert_eq!(gate.remaining_secs(at_ms(40_000)), 15);
    }

    #[test]
    fn storage_failure_fails_closed() {
        let gate = UnlockGate::new(Arc::new(FailingStore), Duration::from_secs(30));
        assert!(gate.grant(at_ms(0)).is_err());
        assert!(!gate.is_active(at_ms(1)));
        assert_eq!(gate.remaining_secs(at_ms(1)), 0);
    }

    #[test]
    fn grant_from_the_future_is_ignored() {
        let gate = gate();
        gate.grant(at_ms(10_000)).expect("grant");
        assert!(!gate.is_active(at_ms(0)));
    }
}
