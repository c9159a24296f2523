use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::gate::GateStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    granted_at_epoch_millis: Option<i64>,
}

/// JSON-file settings shared between the detection core and UI readers.
///
/// Reads are served from memory. Writes replace the file atomically so a
/// concurrent reader in another process never sees a torn document.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// An unreadable or corrupt file reads as "never granted", which keeps
    /// blocking on.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            read_settings(&path).unwrap_or_else(|err| {
                warn!("Ignoring settings at {}: {err:#}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn granted_at_epoch_millis(&self) -> Result<Option<i64>> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(guard.granted_at_epoch_millis)
    }

    pub fn set_granted_at_epoch_millis(&self, epoch_millis: i64) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        let mut next = guard.clone();
        next.granted_at_epoch_millis = Some(epoch_millis);
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    /// Pick up changes written by another process. On failure the grant is
    /// forgotten so a stale unlock cannot outlive a broken file.
    pub fn reload(&self) -> Result<()> {
        let loaded = read_settings(&self.path);
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        match loaded {
            Ok(data) => {
                *guard = data;
                Ok(())
            }
            Err(err) => {
                guard.granted_at_epoch_millis = None;
                Err(err)
            }
        }
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .with_context(|| format!("Failed to write settings to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace settings at {}", self.path.display()))
    }
}

fn read_settings(path: &Path) -> Result<UserSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings at {}", path.display()))
}

impl GateStore for SettingsStore {
    fn load_granted_at(&self) -> Result<Option<i64>> {
        self.granted_at_epoch_millis()
    }

    fn save_granted_at(&self, epoch_millis: i64) -> Result<()> {
        self.set_granted_at_epoch_millis(epoch_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::RecordingOverlaySink;
    use crate::pipeline::DetectorConfig;
    use chrono::Utc;

    #[test]
    fn grant_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).expect("store");
        assert_eq!(store.granted_at_epoch_millis().expect("read"), None);

        store
            .set_granted_at_epoch_millis(1_700_000_000_000)
            .expect("write");

        let raw = fs::read_to_string(&path).expect("settings file");
        assert!(raw.contains("\"grantedAtEpochMillis\": 1700000000000"));
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = SettingsStore::new(path).expect("reopen");
        assert_eq!(
            reopened.granted_at_epoch_millis().expect("read"),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn corrupt_file_reads_as_never_granted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write corrupt file");

        let store = SettingsStore::new(path).expect("store");
        assert_eq!(store.granted_at_epoch_millis().expect("read"), None);
    }

    #[test]
    fn reload_sees_writes_from_another_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let reader = SettingsStore::new(path.clone()).expect("reader");
        let writer = SettingsStore::new(path).expect("writer");
        writer.set_granted_at_epoch_millis(42).expect("write");

        assert_eq!(reader.granted_at_epoch_millis().expect("read"), None);
        reader.reload().expect("reload");
        assert_eq!(reader.granted_at_epoch_millis().expect("read"), Some(42));
    }

    #[test]
    fn unreadable_settings_still_bootstrap_with_gate_inactive() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("settings.json")).expect("settings dir");

        let (session, gate) = crate::bootstrap(
            dir.path(),
            DetectorConfig::default(),
            Box::new(RecordingOverlaySink::new()),
        )
        .expect("bootstrap");

        assert!(!gate.is_active(Utc::now()));
        assert!(!session.gate().is_active(Utc::now()));
    }

    #[test]
    fn failed_reload_forgets_the_grant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).expect("store");
        store.set_granted_at_epoch_millis(42).expect("write");

        fs::write(&path, "{ not json").expect("corrupt file");
        assert!(store.reload().is_err());
        assert_eq!(store.granted_at_epoch_millis().expect("read"), None);

        fs::remove_file(&path).expect("remove");
        store.set_granted_at_epoch_millis(7).expect("rewrite");
        fs::remove_file(&path).expect("remove again");
        assert!(store.reload().is_err());
        assert_eq!(store.granted_at_epoch_millis().expect("read"), None);
    }
}
