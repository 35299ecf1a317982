//! Session stores
//!
//! [`FileSessionStore`] keeps `session.json` and `cookies.json` in the data
//! directory. [`AnonymousSessionStore`] accepts the same calls and persists
//! nothing.

use async_trait::async_trait;
use corvid_engine::CookieStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::collector::{collect_cookies, DEFAULT_COOKIE_TIMEOUT};
use crate::cookie::CookieRecord;
use crate::session::SessionSnapshot;
use crate::Result;

pub const SESSION_FILE: &str = "session.json";
pub const COOKIES_FILE: &str = "cookies.json";

/// Outcome of a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub tabs: usize,
    pub cookies: usize,
    /// Cookies whose expiry could not be converted
    pub skipped_cookies: usize,
}

/// Outcome of a cookie restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the tab list, then every cookie in the engine's jar.
    async fn save_session(&self, snapshot: &SessionSnapshot) -> Result<SaveReport>;

    /// Read the saved tab list and put saved cookies back into the engine.
    /// A missing or unreadable session yields an empty snapshot.
    async fn load_session(&self) -> SessionSnapshot;

    async fn restore_cookies(&self) -> Result<RestoreReport>;

    /// False for stores that never touch disk.
    fn is_persistent(&self) -> bool;
}

pub struct FileSessionStore {
    dir: PathBuf,
    cookie_store: Arc<dyn CookieStore>,
    cookie_timeout: Duration,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>, cookie_store: Arc<dyn CookieStore>) -> Self {
        Self {
            dir: dir.into(),
            cookie_store,
            cookie_timeout: DEFAULT_COOKIE_TIMEOUT,
        }
    }

    pub fn with_cookie_timeout(mut self, timeout: Duration) -> Self {
        self.cookie_timeout = timeout;
        self
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn cookies_path(&self) -> PathBuf {
        self.dir.join(COOKIES_FILE)
    }

    async fn read_session(&self) -> Result<SessionSnapshot> {
        let path = self.session_path();
        let Some(json) = read_optional(&path).await? else {
            tracing::debug!(path = %path.display(), "No saved session");
            return Ok(SessionSnapshot::default());
        };

        Ok(serde_json::from_str(&json)?)
    }

    async fn save_cookies(&self) -> Result<(usize, usize)> {
        let cookies = collect_cookies(self.cookie_store.as_ref(), self.cookie_timeout).await?;

        let mut skipped = 0;
        let records: Vec<CookieRecord> = cookies
            .iter()
            .filter_map(|cookie| match CookieRecord::from_engine(cookie) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(cookie = %cookie.name, domain = %cookie.domain, error = %e, "Skipping cookie");
                    skipped += 1;
                    None
                }
            })
            .collect();

        write_atomic(&self.cookies_path(), &serde_json::to_vec_pretty(&records)?).await?;
        Ok((records.len(), skipped))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save_session(&self, snapshot: &SessionSnapshot) -> Result<SaveReport> {
        write_atomic(&self.session_path(), &serde_json::to_vec_pretty(snapshot)?).await?;
        let (cookies, skipped_cookies) = self.save_cookies().await?;

        let report = SaveReport {
            tabs: snapshot.len(),
            cookies,
            skipped_cookies,
        };

        tracing::info!(
            tabs = report.tabs,
            cookies = report.cookies,
            skipped = report.skipped_cookies,
            "Saved session"
        );

        Ok(report)
    }

    async fn load_session(&self) -> SessionSnapshot {
        let snapshot = match self.read_session().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(path = %self.session_path().display(), error = %e, "Discarding unreadable session");
                SessionSnapshot::default()
            }
        };

        if let Err(e) = self.restore_cookies().await {
            tracing::warn!(error = %e, "Failed to restore cookies");
        }

        tracing::info!(tabs = snapshot.len(), "Loaded session");
        snapshot
    }

    async fn restore_cookies(&self) -> Result<RestoreReport> {
        let path = self.cookies_path();
        let Some(json) = read_optional(&path).await? else {
            return Ok(RestoreReport::default());
        };

        let records: Vec<CookieRecord> = serde_json::from_str(&json)?;
        let mut report = RestoreReport::default();

        for record in &records {
            let cookie = match record.to_engine() {
                Ok(cookie) => cookie,
                Err(e) => {
                    tracing::warn!(cookie = %record.name, error = %e, "Skipping cookie with bad expiry");
                    report.skipped += 1;
                    continue;
                }
            };

            if self.cookie_store.set_cookie(&record.url, cookie) {
                report.restored += 1;
            } else {
                tracing::warn!(cookie = %record.name, url = %record.url, "Engine rejected cookie");
                report.skipped += 1;
            }
        }

        tracing::debug!(restored = report.restored, skipped = report.skipped, "Restored cookies");
        Ok(report)
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

/// Store for anonymous mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSessionStore;

#[async_trait]
impl SessionStore for AnonymousSessionStore {
    async fn save_session(&self, snapshot: &SessionSnapshot) -> Result<SaveReport> {
        tracing::debug!(tabs = snapshot.len(), "Anonymous mode, session not saved");
        Ok(SaveReport::default())
    }

    async fn load_session(&self) -> SessionSnapshot {
        SessionSnapshot::default()
    }

    async fn restore_cookies(&self) -> Result<RestoreReport> {
        Ok(RestoreReport::default())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a sibling temp file so a crash never leaves a torn file.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
