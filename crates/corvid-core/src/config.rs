//! Browser configuration
//!
//! [`Config`] holds runtime paths and flags fixed at startup. [`Settings`] is
//! the user-editable part kept in `config.json` and served through a
//! [`ConfigProvider`].

use async_trait::async_trait;
use corvid_navigation::DEFAULT_SEARCH_TEMPLATE;
use corvid_session::DEFAULT_COOKIE_TIMEOUT;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::gesture::KeyGesture;
use crate::Result;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_HOME_URL: &str = "https://www.google.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the database, session and settings files
    pub data_dir: PathBuf,
    /// Persist nothing: no session, history or bookmarks on disk
    pub anonymous: bool,
    /// How long a save waits for the engine to enumerate cookies
    pub cookie_timeout: Duration,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            anonymous: false,
            cookie_timeout: DEFAULT_COOKIE_TIMEOUT,
        }
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("corvid.db")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Corvid"))
            .unwrap_or_else(|| PathBuf::from(".corvid"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_search_engine")]
    pub search_engine: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            search_engine: default_search_engine(),
        }
    }
}

fn default_home_url() -> String {
    DEFAULT_HOME_URL.to_string()
}

fn default_search_engine() -> String {
    DEFAULT_SEARCH_TEMPLATE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    /// Action name to gesture text
    #[serde(default)]
    pub key_bindings: BTreeMap<String, String>,
}

impl Settings {
    pub fn default_key_bindings() -> BTreeMap<String, String> {
        [
            ("NavigateUp", "Ctrl+Up"),
            ("NavigateDown", "Ctrl+Down"),
            ("AddBookmark", "Ctrl+B"),
            ("OpenHistory", "Ctrl+H"),
            ("Go", "Ctrl+G"),
            ("Back", "Ctrl+Left"),
            ("Forward", "Ctrl+Right"),
            ("Reload", "Ctrl+R"),
        ]
        .into_iter()
        .map(|(action, gesture)| (action.to_string(), gesture.to_string()))
        .collect()
    }

    /// Bind `action` to `gesture`, replacing an existing entry for the same
    /// action regardless of its spelling.
    pub fn set_key_binding(&mut self, action: &str, gesture: &KeyGesture) {
        let key = self
            .key_bindings
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(action))
            .cloned()
            .unwrap_or_else(|| action.to_string());

        self.key_bindings.insert(key, gesture.to_string());
    }

    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            key_bindings: Self::default_key_bindings(),
        }
    }
}

/// Read access to user settings plus the two settings the browser writes.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn settings(&self) -> Settings;

    async fn key_bindings(&self) -> BTreeMap<String, String> {
        self.settings().await.key_bindings
    }

    async fn home_url(&self) -> String {
        self.settings().await.general.home_url
    }

    async fn set_key_binding(&self, action: &str, gesture: &KeyGesture) -> Result<()>;

    async fn set_home_url(&self, url: &str) -> Result<()>;

    /// Re-read settings from the backing source. On failure the previous
    /// settings stay in effect.
    async fn refresh(&self) -> Result<()>;
}

/// Settings backed by a JSON file.
pub struct FileConfigProvider {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl FileConfigProvider {
    /// Load settings from `path`. A missing file means defaults; an unreadable
    /// one is logged and also means defaults.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match Self::read(&path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Settings::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                Settings::default()
            }
        };

        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(path: &Path) -> Result<Option<Settings>> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => Settings::from_json(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(settings)?).await?;
        Ok(())
    }

    async fn update(&self, change: impl FnOnce(&mut Settings) + Send) -> Result<()> {
        let updated = {
            let mut settings = self.settings.write();
            change(&mut settings);
            settings.clone()
        };
        self.save(&updated).await
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    async fn set_key_binding(&self, action: &str, gesture: &KeyGesture) -> Result<()> {
        self.update(|settings| settings.set_key_binding(action, gesture))
            .await?;
        tracing::info!(action = %action, gesture = %gesture, "Key binding saved");
        Ok(())
    }

    async fn set_home_url(&self, url: &str) -> Result<()> {
        self.update(|settings| settings.general.home_url = url.to_string())
            .await?;
        tracing::info!(url = %url, "Home URL saved");
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        let settings = Self::read(&self.path).await?.unwrap_or_default();
        *self.settings.write() = settings;
        tracing::info!(path = %self.path.display(), "Settings refreshed");
        Ok(())
    }
}

/// Settings held in memory only.
#[derive(Default)]
pub struct MemoryConfigProvider {
    settings: RwLock<Settings>,
}

impl MemoryConfigProvider {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Swap in new settings, as an external edit would.
    pub fn replace(&self, settings: Settings) {
        *self.settings.write() = settings;
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    async fn set_key_binding(&self, action: &str, gesture: &KeyGesture) -> Result<()> {
        self.settings.write().set_key_binding(action, gesture);
        Ok(())
    }

    async fn set_home_url(&self, url: &str) -> Result<()> {
        self.settings.write().general.home_url = url.to_string();
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.home_url, "https://www.google.com");
        assert_eq!(
            settings.general.search_engine,
            "https://www.google.com/search?q=%s"
        );
        assert_eq!(settings.key_bindings.len(), 8);
        assert_eq!(settings.key_bindings["Reload"], "Ctrl+R");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings =
            Settings::from_json(r#"{"general":{"homeUrl":"https://start.test/"}}"#).unwrap();
        assert_eq!(settings.general.home_url, "https://start.test/");
        assert_eq!(settings.general.search_engine, DEFAULT_SEARCH_TEMPLATE);
        assert!(settings.key_bindings.is_empty());
    }

    #[test]
    fn test_set_key_binding_matches_existing_case() {
        let mut settings = Settings::default();
        let gesture: KeyGesture = "F5".parse().unwrap();
        settings.set_key_binding("reload", &gesture);

        assert_eq!(settings.key_bindings["Reload"], "F5");
        assert!(!settings.key_bindings.contains_key("reload"));
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileConfigProvider::load(dir.path().join(CONFIG_FILE)).await;

        assert_eq!(provider.settings().await, Settings::default());
        assert_eq!(provider.home_url().await, DEFAULT_HOME_URL);
    }

    #[tokio::test]
    async fn test_setters_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let provider = FileConfigProvider::load(&path).await;
        provider.set_home_url("https://home.test/").await.unwrap();
        provider
            .set_key_binding("AddBookmark", &"Ctrl+D".parse().unwrap())
            .await
            .unwrap();

        let reloaded = FileConfigProvider::load(&path).await;
        assert_eq!(reloaded.home_url().await, "https://home.test/");
        assert_eq!(reloaded.key_bindings().await["AddBookmark"], "Ctrl+D");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"homeUrl\""));
        assert!(raw.contains("\"keyBindings\""));
    }

    #[tokio::test]
    async fn test_malformed_refresh_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"general":{"homeUrl":"https://one.test/"}}"#).unwrap();

        let provider = FileConfigProvider::load(&path).await;
        std::fs::write(&path, "{ broken").unwrap();

        assert!(matches!(provider.refresh().await, Err(CoreError::Config(_))));
        assert_eq!(provider.home_url().await, "https://one.test/");

        std::fs::write(&path, r#"{"general":{"homeUrl":"https://two.test/"}}"#).unwrap();
        provider.refresh().await.unwrap();
        assert_eq!(provider.home_url().await, "https://two.test/");
    }
}
