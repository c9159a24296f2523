use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Tunable constants for the detection pipeline.
///
/// Everything the pipeline compares against lives here so tests can shrink the
/// cooldowns and hosts can ship their own lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Package identifiers of the browsers whose events are evaluated.
    pub monitored_apps: Vec<String>,

    /// Case-insensitive substrings; a domain containing any entry is blocked.
    pub blocklist: Vec<String>,

    /// The search engine whose result pages reset transition tracking.
    pub search_engine_domain: String,

    /// Markers for the browser's own pages (new tab, settings, ...).
    pub internal_page_markers: Vec<String>,

    /// Substrings of role, resource id or label that identify the address bar.
    pub address_bar_markers: Vec<String>,

    /// Roles whose subtree is rendered page content and never inspected.
    pub page_content_roles: Vec<String>,

    pub typing_cooldown_ms: u64,
    /// Hover previews linger this long after leaving the search engine.
    pub transition_delay_ms: u64,
    pub retrigger_suppress_ms: u64,
    pub unlock_duration_ms: u64,
    pub poll_interval_ms: u64,

    /// Upper bound for text accepted as a bare domain.
    pub max_bare_domain_len: usize,

    pub event_queue_capacity: usize,

    /// Log a one-line report for every pipeline pass.
    pub verbose: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            monitored_apps: to_strings(&[
                "com.android.chrome",
                "com.chrome.beta",
                "org.mozilla.firefox",
                "com.brave.browser",
                "com.microsoft.emmx",
                "com.opera.browser",
                "com.sec.android.app.sbrowser",
            ]),
            blocklist: to_strings(&[
                "pornhub",
                "xvideos",
                "xnxx",
                "xhamster",
                "redtube",
                "youporn",
                "spankbang",
                "onlyfans",
                "chaturbate",
            ]),
            search_engine_domain: "google.com".into(),
            internal_page_markers: to_strings(&[
                "chrome://",
                "chrome-native://",
                "about:",
                "edge://",
                "newtab",
            ]),
            address_bar_markers: to_strings(&[
                "url_bar",
                "url_field",
                "location_bar",
                "omnibox",
                "address",
                "search",
                "url",
            ]),
            page_content_roles: to_strings(&["webview", "web_content"]),
            typing_cooldown_ms: 300,
            transition_delay_ms: 1_000,
            retrigger_suppress_ms: 5_000,
            unlock_duration_ms: 30_000,
            poll_interval_ms: 500,
            max_bare_domain_len: 253,
            event_queue_capacity: 64,
            verbose: false,
        }
    }
}

impl DetectorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid detector config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector config from {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    /// Apply `NAVGUARD_DEBUG` and `NAVGUARD_POLL_MS` on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("NAVGUARD_DEBUG") {
            self.verbose = value == "1" || value.eq_ignore_ascii_case("true");
        }

        if let Some(poll_ms) = std::env::var("NAVGUARD_POLL_MS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            self.poll_interval_ms = poll_ms;
        }

        self
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("pollIntervalMs must be greater than zero");
        }
        if self.monitored_apps.iter().all(|app| app.trim().is_empty()) {
            bail!("monitoredApps must name at least one application");
        }
        if self.search_engine_domain.trim().is_empty() {
            bail!("searchEngineDomain must not be blank");
        }
        if self.event_queue_capacity == 0 {
            bail!("eventQueueCapacity must be greater than zero");
        }
        Ok(())
    }

    pub fn is_monitored(&self, app_id: &str) -> bool {
        self.monitored_apps.iter().any(|app| app == app_id)
    }

    pub fn typing_cooldown(&self) -> Duration {
        Duration::from_millis(self.typing_cooldown_ms)
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn retrigger_suppress(&self) -> Duration {
        Duration::from_millis(self.retrigger_suppress_ms)
    }

    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_duration_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
