//! Configuration management for wm-console
//!
//! Config lives in the key/value store under `wm_dev_console_cfg`. An older
//! layout under `wm_console_cfg` is still read, field by field, when the
//! current one lacks a value.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use wm_domain::repository::KeyValueStore;
use wm_types::Result;

pub const CONFIG_KEY: &str = "wm_dev_console_cfg";
pub const LEGACY_CONFIG_KEY: &str = "wm_console_cfg";
pub const WTN_AUTO_OPEN_KEY: &str = "wtn:autoOpen";

/// Fallback base URL when none is stored
pub const BASE_URL_ENV: &str = "WM_API_BASE";

/// Resolved console configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub driver_key: Option<String>,
    pub admin_key: Option<String>,
    /// Driver name or id used by "my tasks"
    pub driver_ref: Option<String>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub base_url: Option<String>,
    pub driver_key: Option<String>,
    pub admin_key: Option<String>,
    pub driver_ref: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<Config> for ConfigUpdate {
    fn from(c: Config) -> Self {
        Self {
            base_url: Some(c.base_url),
            driver_key: c.driver_key,
            admin_key: c.admin_key,
            driver_ref: c.driver_ref,
        }
    }
}

impl Config {
    /// Apply an update in memory without touching storage
    pub fn merged(&self, update: &ConfigUpdate) -> Config {
        let pick = |new: &Option<String>, old: &Option<String>| {
            new.clone().or_else(|| old.clone()).and_then(non_empty)
        };
        Config {
            base_url: normalize_base_url(update.base_url.as_deref().unwrap_or(&self.base_url)),
            driver_key: pick(&update.driver_key, &self.driver_key),
            admin_key: pick(&update.admin_key, &self.admin_key),
            driver_ref: pick(&update.driver_ref, &self.driver_ref),
        }
    }

    /// Config as logged or printed: keys reduced to whether they are set
    pub fn redacted(&self) -> Value {
        json!({
            "baseUrl": self.base_url,
            "driverKey": self.driver_key.as_ref().map(|_| "(set)"),
            "adminKey": self.admin_key.as_ref().map(|_| "(set)"),
            "driverName": self.driver_ref,
        })
    }
}

/// Current storage layout
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    driver_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    driver_name: Option<String>,
    #[serde(default, skip_serializing)]
    driver_id: Option<String>,
}

/// Older layout, read only
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    admin_key: Option<String>,
    #[serde(default)]
    driver_name: Option<String>,
    #[serde(default)]
    driver_id: Option<String>,
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Trim whitespace and every trailing `/`
pub fn normalize_base_url(raw: &str) -> String {
    let mut s = raw.trim();
    loop {
        let next = s.trim_end_matches('/').trim_end();
        if next == s {
            break;
        }
        s = next;
    }
    s.to_string()
}

/// Loads and saves [`Config`] through a [`KeyValueStore`]
pub struct ConfigStore<S> {
    store: S,
    default_base: Option<String>,
}

impl<S: KeyValueStore> ConfigStore<S> {
    /// Uses `$WM_API_BASE` as the fallback base URL
    pub fn new(store: S) -> Self {
        let default_base = std::env::var(BASE_URL_ENV).ok().and_then(non_empty);
        Self {
            store,
            default_base,
        }
    }

    /// Explicit fallback base URL instead of the environment
    pub fn with_default_base(store: S, default_base: Option<String>) -> Self {
        Self {
            store,
            default_base: default_base.and_then(non_empty),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_blob<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("could not read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring malformed {}: {}", key, e);
                None
            }
        }
    }

    /// Current values, falling back to the legacy layout per field.
    ///
    /// Never fails: unreadable or malformed entries count as absent.
    pub fn load(&self) -> Config {
        let cur: StoredConfig = self.read_blob(CONFIG_KEY).unwrap_or_default();
        let legacy: LegacyConfig = self.read_blob(LEGACY_CONFIG_KEY).unwrap_or_default();

        let base_url = cur
            .base_url
            .and_then(non_empty)
            .or_else(|| legacy.base.and_then(non_empty))
            .or_else(|| self.default_base.clone())
            .unwrap_or_default();

        Config {
            base_url: normalize_base_url(&base_url),
            driver_key: cur.driver_key.and_then(non_empty).or(legacy.api_key.and_then(non_empty)),
            admin_key: cur.admin_key.and_then(non_empty).or(legacy.admin_key.and_then(non_empty)),
            driver_ref: cur
                .driver_name
                .and_then(non_empty)
                .or(legacy.driver_name.and_then(non_empty))
                .or(cur.driver_id.and_then(non_empty))
                .or(legacy.driver_id.and_then(non_empty)),
        }
    }

    /// Merge `update` over the loaded config and write the current layout
    pub fn save(&self, update: &ConfigUpdate) -> Result<Config> {
        let merged = self.load().merged(update);
        let stored = StoredConfig {
            base_url: Some(merged.base_url.clone()),
            driver_key: merged.driver_key.clone(),
            admin_key: merged.admin_key.clone(),
            driver_name: merged.driver_ref.clone(),
            driver_id: None,
        };
        self.store.set(CONFIG_KEY, &serde_json::to_string(&stored)?)?;
        Ok(merged)
    }

    /// Forget the current layout; the legacy entry is left in place
    pub fn reset(&self) -> Result<()> {
        self.store.remove(CONFIG_KEY)?;
        Ok(())
    }

    /// Open generated WTN PDFs automatically; on unless set to anything but "1"
    pub fn wtn_auto_open(&self) -> bool {
        match self.store.get(WTN_AUTO_OPEN_KEY) {
            Ok(Some(v)) => v == "1",
            Ok(None) => true,
            Err(e) => {
                warn!("could not read {}: {}", WTN_AUTO_OPEN_KEY, e);
                true
            }
        }
    }

    pub fn set_wtn_auto_open(&self, enabled: bool) -> Result<()> {
        self.store
            .set(WTN_AUTO_OPEN_KEY, if enabled { "1" } else { "0" })?;
        Ok(())
    }
}

fn mask(key: &Option<String>) -> String {
    match key.as_deref() {
        None => "(not set)".to_string(),
        Some(k) if k.chars().count() <= 4 => "****".to_string(),
        Some(k) => {
            let tail: String = k.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "WM Console Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Base URL:    {}",
            if self.base_url.is_empty() { "(not set)" } else { &self.base_url }
        )?;
        writeln!(f, "Driver key:  {}", mask(&self.driver_key))?;
        writeln!(f, "Admin key:   {}", mask(&self.admin_key))?;
        writeln!(
            f,
            "Driver:      {}",
            self.driver_ref.as_deref().unwrap_or("(not set)")
        )?;
        Ok(())
    }
}
