use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

pub const APP_NAME: &str = "weekday-reminders";

/// Keys the app keeps its own state under, beside the reminder list.
pub const AUTHORIZATION_KEY: &str = "authorization";
pub const SCHEDULED_KEY: &str = "scheduled";
const RESERVED_KEYS: [&str; 2] = [AUTHORIZATION_KEY, SCHEDULED_KEY];

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the active configuration (loaded once on first call).
pub fn current() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
    /// Key the reminder list is stored under.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key: "reminders".to_string(),
        }
    }
}

impl StorageConfig {
    /// The list key must not collide with the app's own keys.
    fn key_is_usable(&self) -> bool {
        let key = self.key.trim();
        !key.is_empty() && !RESERVED_KEYS.contains(&key)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
    }
}

/// How delivered reminders are presented. Applies process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Re-run a sync with the saved list at startup.
    pub resync_on_startup: bool,
    pub delivery_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_on_startup: false,
            delivery_interval_secs: 15,
        }
    }
}

impl Config {
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&path).ok()?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Option<Self> {
        let config: Self = toml::from_str(content).ok()?;
        if !config.storage.key_is_usable() {
            return None;
        }
        Some(config)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
}
