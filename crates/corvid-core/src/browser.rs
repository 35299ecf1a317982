//! Main browser state container
//!
//! The [`Browser`] is owned by the UI task. Every method that changes what the
//! user sees takes `&mut self`, and every transition that moves the selection
//! also resyncs the editable address and rebuilds the bound commands before
//! returning.

use std::sync::Arc;

use corvid_engine::{CookieStore, EngineFactory, EngineMessage, EventReceiver};
use corvid_navigation::{AnonymousHistory, HistoryEntry, HistoryManager, HistoryStore, UrlResolver};
use corvid_session::{
    AnonymousSessionStore, FileSessionStore, SaveReport, SessionSnapshot, SessionStore,
};
use corvid_storage::Database;
use corvid_tabs::{CloseOutcome, Tab, TabId, TabRegistry, TabUpdate};

use crate::bookmarks::{Bookmark, BookmarkStore, MemoryBookmarks, SettingsBookmarks};
use crate::commands::{Action, BindingDiagnostic, BoundCommand, CommandRouter};
use crate::config::{Config, ConfigProvider, Settings, DEFAULT_HOME_URL};
use crate::error::CoreError;
use crate::gesture::KeyGesture;
use crate::Result;

/// Entries returned by the history command.
pub const HISTORY_LIMIT: usize = 50;

/// Result of running a bound command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    /// Nothing happened: no target, or the engine cannot go that way
    Ignored,
    Bookmarked(Bookmark),
    History(Vec<HistoryEntry>),
    SettingsRefreshed(Vec<BindingDiagnostic>),
}

impl From<bool> for CommandOutcome {
    fn from(done: bool) -> Self {
        if done {
            CommandOutcome::Done
        } else {
            CommandOutcome::Ignored
        }
    }
}

/// Main browser instance
pub struct Browser {
    config: Config,
    settings: Arc<dyn ConfigProvider>,
    sessions: Arc<dyn SessionStore>,
    history: Arc<dyn HistoryStore>,
    bookmarks: Arc<dyn BookmarkStore>,
    registry: TabRegistry,
    /// Engine events, drained on the UI task
    events: EventReceiver,
    router: CommandRouter,
    resolver: UrlResolver,
    /// Address bar text
    editable_url: String,
    home_url: String,
    diagnostics: Vec<BindingDiagnostic>,
}

impl Browser {
    /// Build a browser with stores chosen by `config`: files and the database
    /// under the data directory, or in-memory stand-ins in anonymous mode.
    pub fn new(
        config: Config,
        engines: Arc<dyn EngineFactory>,
        cookies: Arc<dyn CookieStore>,
        settings: Arc<dyn ConfigProvider>,
    ) -> Result<Self> {
        if config.anonymous {
            tracing::info!("Anonymous mode: session, history and bookmarks stay in memory");
            return Ok(Self::with_stores(
                config,
                engines,
                settings,
                Arc::new(AnonymousSessionStore),
                Arc::new(AnonymousHistory),
                Arc::new(MemoryBookmarks::new()),
            ));
        }

        std::fs::create_dir_all(&config.data_dir)?;
        let db = Database::open(config.database_path())?;
        let sessions = FileSessionStore::new(&config.data_dir, cookies)
            .with_cookie_timeout(config.cookie_timeout);

        Ok(Self::with_stores(
            config,
            engines,
            settings,
            Arc::new(sessions),
            Arc::new(HistoryManager::new(db.clone())),
            Arc::new(SettingsBookmarks::new(db)),
        ))
    }

    pub fn with_stores(
        config: Config,
        engines: Arc<dyn EngineFactory>,
        settings: Arc<dyn ConfigProvider>,
        sessions: Arc<dyn SessionStore>,
        history: Arc<dyn HistoryStore>,
        bookmarks: Arc<dyn BookmarkStore>,
    ) -> Self {
        let (sink, events) = corvid_engine::event_channel();

        Self {
            config,
            settings,
            sessions,
            history,
            bookmarks,
            registry: TabRegistry::new(engines, sink).with_default_url(DEFAULT_HOME_URL),
            events,
            router: CommandRouter::new(),
            resolver: UrlResolver::new(),
            editable_url: String::new(),
            home_url: DEFAULT_HOME_URL.to_string(),
            diagnostics: Vec::new(),
        }
    }

    /// Apply settings, restore the saved session (or open the home page) and
    /// bind commands to the selected tab.
    pub async fn initialize(&mut self) -> Result<()> {
        let settings = self.settings.settings().await;
        self.apply_settings(&settings);

        let snapshot = self.sessions.load_session().await;
        for entry in snapshot {
            let url = if entry.url.trim().is_empty() {
                self.home_url.clone()
            } else {
                entry.url
            };
            self.registry.restore_tab(&url, &entry.title);
        }

        if self.registry.is_empty() {
            self.registry.add_tab(&self.home_url);
        }

        self.on_selection_changed();
        self.pump_events();

        tracing::info!(
            tabs = self.registry.len(),
            anonymous = self.config.anonymous,
            invalid_bindings = self.diagnostics.len(),
            "Browser initialized"
        );

        Ok(())
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.resolver
            .set_search_engine(&settings.general.search_engine);

        self.home_url = if settings.general.home_url.trim().is_empty() {
            DEFAULT_HOME_URL.to_string()
        } else {
            self.resolver.resolve(&settings.general.home_url)
        };
        self.registry.set_default_url(self.home_url.clone());

        self.diagnostics = self.router.bind(&settings.key_bindings);
    }

    /// Resync everything that follows the selected tab.
    fn on_selection_changed(&mut self) {
        self.editable_url = self
            .registry
            .selected()
            .map(Tab::current_url)
            .unwrap_or_default();
        self.router.rebuild(self.registry.selected_id());
    }

    // === Tab operations ===

    /// Open a tab at `input` (resolved like address bar text), or at the home
    /// page.
    pub fn add_tab(&mut self, input: Option<&str>) -> TabId {
        let url = match input {
            Some(input) => self.resolver.resolve(input),
            None => self.home_url.clone(),
        };

        let id = self.registry.add_tab(&url);
        self.on_selection_changed();
        id
    }

    pub fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome> {
        let outcome = self.registry.close_tab(id)?;
        if outcome.selection_changed {
            self.on_selection_changed();
        }
        Ok(outcome)
    }

    pub fn select_tab(&mut self, id: TabId) -> Result<bool> {
        let changed = self.registry.select(id)?;
        if changed {
            self.on_selection_changed();
        }
        Ok(changed)
    }

    /// Move the selection along the strip, wrapping at the ends.
    pub fn select_relative(&mut self, offset: isize) -> Option<TabId> {
        let selected = self.registry.select_relative(offset)?;
        self.on_selection_changed();
        Some(selected)
    }

    pub fn tabs(&self) -> &[Tab] {
        self.registry.tabs()
    }

    pub fn selected(&self) -> Option<&Tab> {
        self.registry.selected()
    }

    pub fn selected_id(&self) -> Option<TabId> {
        self.registry.selected_id()
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    // === Navigation ===

    /// Resolve address bar text and load it in the selected tab.
    pub fn navigate(&mut self, input: &str) -> bool {
        let url = self.resolver.resolve(input);
        let Some(tab) = self.registry.selected_mut() else {
            return false;
        };

        let started = tab.navigate(&url);
        if started {
            self.editable_url = url;
        }
        started
    }

    pub fn editable_url(&self) -> &str {
        &self.editable_url
    }

    /// Address bar edit. Nothing loads until the `go` command runs.
    pub fn set_editable_url(&mut self, text: impl Into<String>) {
        self.editable_url = text.into();
    }

    pub fn resolve(&self, input: &str) -> String {
        self.resolver.resolve(input)
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    // === Commands ===

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Bindings from the last settings pass that could not be applied.
    pub fn diagnostics(&self) -> &[BindingDiagnostic] {
        &self.diagnostics
    }

    /// Run a bound command. Commands bound before the latest selection change
    /// or settings refresh are rejected.
    pub async fn execute(&mut self, command: &BoundCommand) -> Result<CommandOutcome> {
        if !self.router.is_current(command) {
            tracing::warn!(
                action = %command.action,
                issued = command.generation,
                current = self.router.generation(),
                "Rejecting stale command"
            );
            return Err(CoreError::StaleCommand {
                issued: command.generation,
                current: self.router.generation(),
            });
        }

        tracing::debug!(action = %command.action, target = ?command.target, "Executing command");

        let outcome = match command.action {
            Action::Go => {
                if self.editable_url.trim().is_empty() {
                    CommandOutcome::Ignored
                } else {
                    let url = self.resolver.resolve(&self.editable_url);
                    self.with_target(command, |tab| tab.navigate(&url))
                }
            }
            Action::Back => self.with_target(command, Tab::go_back),
            Action::Forward => self.with_target(command, Tab::go_forward),
            Action::Reload => self.with_target(command, |tab| {
                tab.reload();
                true
            }),
            Action::OpenDevTools => self.with_target(command, |tab| {
                tab.open_dev_tools();
                true
            }),
            Action::AddBookmark => match command.target {
                Some(id) => self
                    .add_bookmark(id)?
                    .map_or(CommandOutcome::Ignored, CommandOutcome::Bookmarked),
                None => CommandOutcome::Ignored,
            },
            Action::OpenHistory => CommandOutcome::History(self.open_history(HISTORY_LIMIT)?),
            Action::NavigatePreviousTab => self.select_relative(-1).is_some().into(),
            Action::NavigateNextTab => self.select_relative(1).is_some().into(),
            Action::RefreshSettings => {
                CommandOutcome::SettingsRefreshed(self.refresh_settings().await?)
            }
            Action::NewTab => {
                self.add_tab(None);
                CommandOutcome::Done
            }
            Action::CloseTab => match command.target {
                Some(id) => {
                    self.close_tab(id)?;
                    CommandOutcome::Done
                }
                None => CommandOutcome::Ignored,
            },
        };

        Ok(outcome)
    }

    fn with_target(
        &mut self,
        command: &BoundCommand,
        f: impl FnOnce(&mut Tab) -> bool,
    ) -> CommandOutcome {
        command
            .target
            .and_then(|id| self.registry.get_mut(id))
            .map_or(false, f)
            .into()
    }

    /// Run whatever is bound to `gesture`. `None` if nothing is.
    pub async fn handle_gesture(&mut self, gesture: &KeyGesture) -> Result<Option<CommandOutcome>> {
        let Some(command) = self.router.resolve(gesture) else {
            tracing::debug!(gesture = %gesture, "Unbound gesture");
            return Ok(None);
        };

        self.execute(&command).await.map(Some)
    }

    // === Settings ===

    /// Re-read settings and rebind. If the settings cannot be read, the
    /// current ones stay in effect and the error is returned.
    pub async fn refresh_settings(&mut self) -> Result<Vec<BindingDiagnostic>> {
        self.settings.refresh().await?;

        let settings = self.settings.settings().await;
        self.apply_settings(&settings);
        self.router.rebuild(self.registry.selected_id());

        Ok(self.diagnostics.clone())
    }

    pub async fn set_key_binding(&mut self, action: &str, gesture: &str) -> Result<()> {
        if Action::from_name(action).is_none() {
            return Err(CoreError::UnknownAction(action.to_string()));
        }
        let gesture: KeyGesture = gesture.parse()?;

        self.settings.set_key_binding(action, &gesture).await?;
        let bindings = self.settings.key_bindings().await;
        self.diagnostics = self.router.bind(&bindings);
        Ok(())
    }

    pub async fn set_home_url(&mut self, input: &str) -> Result<()> {
        let url = self.resolver.resolve(input);
        self.settings.set_home_url(&url).await?;

        self.registry.set_default_url(url.clone());
        self.home_url = url;
        Ok(())
    }

    // === Engine events ===

    /// Apply every engine event already queued. Returns how many changed a tab.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.events.try_recv() {
            if self.handle_message(message).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next engine event that changes a tab, and apply it.
    pub async fn next_event(&mut self) -> Option<(TabId, TabUpdate)> {
        loop {
            let message = self.events.recv().await?;
            if let Some(update) = self.handle_message(message) {
                return Some(update);
            }
        }
    }

    fn handle_message(&mut self, message: EngineMessage) -> Option<(TabId, TabUpdate)> {
        let (id, update) = self.registry.dispatch(message)?;

        match &update {
            TabUpdate::AddressChanged(url) => {
                if self.registry.selected_id() == Some(id) {
                    self.editable_url = url.clone();
                }
                if is_recordable(url) {
                    if let Err(e) = self.history.record_visit(url, "") {
                        tracing::warn!(tab_id = %id, error = %e, "Failed to record history");
                    }
                }
            }
            TabUpdate::TitleChanged(title) => {
                let url = self
                    .registry
                    .get(id)
                    .map(Tab::current_url)
                    .unwrap_or_default();
                if is_recordable(&url) {
                    if let Err(e) = self.history.update_title(&url, title) {
                        tracing::warn!(tab_id = %id, error = %e, "Failed to update history title");
                    }
                }
            }
            TabUpdate::LoadingChanged(_) | TabUpdate::NavigationFailed(_) => {}
        }

        Some((id, update))
    }

    // === Bookmarks & history ===

    /// Bookmark a tab's current page. `None` if the tab has no real page.
    pub fn add_bookmark(&self, id: TabId) -> Result<Option<Bookmark>> {
        let Some(tab) = self.registry.get(id) else {
            return Ok(None);
        };

        let url = tab.current_url();
        if !is_recordable(&url) {
            return Ok(None);
        }

        let bookmark = Bookmark::new(tab.header(), url);
        self.bookmarks.add(bookmark.clone())?;
        tracing::info!(tab_id = %id, url = %bookmark.url, "Bookmark added");
        Ok(Some(bookmark))
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.bookmarks.list()
    }

    pub fn remove_bookmark(&self, url: &str) -> Result<bool> {
        let removed = self.bookmarks.remove(url)?;
        if removed {
            tracing::info!(url = %url, "Bookmark removed");
        }
        Ok(removed)
    }

    /// Load a bookmarked page in the selected tab. The address bar shows the
    /// bookmark even when the tab is already there.
    pub fn open_bookmark(&mut self, url: &str) -> bool {
        let url = self.resolver.resolve(url);
        let Some(tab) = self.registry.selected_mut() else {
            return false;
        };

        let started = tab.navigate(&url);
        self.editable_url = url;
        started
    }

    pub fn open_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self.history.recent(limit)?)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.history.clear()?;
        tracing::info!("History cleared");
        Ok(())
    }

    // === Shutdown ===

    /// Save the tab strip and the engine's cookies.
    pub async fn shutdown(&mut self) -> Result<SaveReport> {
        self.pump_events();

        let snapshot = SessionSnapshot::capture(self.registry.tabs());
        let report = self.sessions.save_session(&snapshot).await?;

        tracing::info!(
            tabs = report.tabs,
            cookies = report.cookies,
            persistent = self.sessions.is_persistent(),
            "Browser shut down"
        );
        Ok(report)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Pages worth keeping in history and bookmarks.
fn is_recordable(url: &str) -> bool {
    !url.trim().is_empty() && !url.starts_with("about:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;
    use crate::gesture::{Key, Modifiers};
    use corvid_engine::headless::{EngineCall, HeadlessCookieStore, HeadlessEngineFactory};
    use corvid_session::SESSION_FILE;

    struct Harness {
        browser: Browser,
        engines: HeadlessEngineFactory,
        settings: Arc<MemoryConfigProvider>,
    }

    fn build(config: Config, cookies: HeadlessCookieStore) -> Harness {
        let engines = HeadlessEngineFactory::new();
        let settings = Arc::new(MemoryConfigProvider::default());
        let browser = Browser::new(
            config,
            Arc::new(engines.clone()),
            Arc::new(cookies),
            settings.clone(),
        )
        .unwrap();

        Harness {
            browser,
            engines,
            settings,
        }
    }

    async fn anonymous() -> Harness {
        let mut harness = build(
            Config::new(std::env::temp_dir().join("corvid-unused")).anonymous(true),
            HeadlessCookieStore::new(),
        );
        harness.browser.initialize().await.unwrap();
        harness
    }

    fn ctrl(key: Key) -> KeyGesture {
        KeyGesture::new(key, Modifiers::CTRL)
    }

    fn urls(browser: &Browser) -> Vec<String> {
        browser.tabs().iter().map(Tab::current_url).collect()
    }

    #[tokio::test]
    async fn test_initialize_opens_home() {
        let harness = anonymous().await;
        let browser = &harness.browser;

        assert_eq!(browser.tabs().len(), 1);
        assert_eq!(urls(browser), vec![DEFAULT_HOME_URL]);
        assert_eq!(browser.editable_url(), DEFAULT_HOME_URL);
        assert!(browser.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_navigate_resolves_input() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;

        assert!(browser.navigate("example.com"));
        browser.pump_events();

        assert_eq!(browser.selected().unwrap().current_url(), "https://example.com");
        assert_eq!(browser.editable_url(), "https://example.com");
    }

    #[tokio::test]
    async fn test_commands_follow_selection() {
        let mut harness = anonymous().await;
        let first = harness.browser.selected_id().unwrap();
        let second = harness.browser.add_tab(Some("b.test"));

        let reload = harness.browser.router().command(Action::Reload).unwrap();
        assert_eq!(reload.target, Some(second));

        harness.browser.select_tab(first).unwrap();
        let reload = harness.browser.router().command(Action::Reload).unwrap();
        assert_eq!(reload.target, Some(first));

        harness.browser.execute(&reload).await.unwrap();
        assert!(harness.engines.calls_for(first).contains(&EngineCall::Reload));
        assert!(!harness.engines.calls_for(second).contains(&EngineCall::Reload));
    }

    #[tokio::test]
    async fn test_stale_command_is_rejected() {
        let mut harness = anonymous().await;
        let first = harness.browser.selected_id().unwrap();
        let stale = harness.browser.router().command(Action::Reload).unwrap();

        harness.browser.add_tab(None);

        let err = harness.browser.execute(&stale).await.unwrap_err();
        assert!(matches!(err, CoreError::StaleCommand { .. }));
        assert!(!harness.engines.calls_for(first).contains(&EngineCall::Reload));
    }

    #[tokio::test]
    async fn test_gestures_switch_tabs() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;
        let first = browser.selected_id().unwrap();
        let second = browser.add_tab(Some("b.test"));

        let outcome = browser.handle_gesture(&ctrl(Key::Up)).await.unwrap();
        assert_eq!(outcome, Some(CommandOutcome::Done));
        assert_eq!(browser.selected_id(), Some(first));
        assert_eq!(browser.editable_url(), DEFAULT_HOME_URL);

        browser.handle_gesture(&ctrl(Key::Down)).await.unwrap();
        assert_eq!(browser.selected_id(), Some(second));

        assert_eq!(browser.handle_gesture(&ctrl(Key::Char('Q'))).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_go_navigates_editable_url() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;

        browser.set_editable_url("rust-lang.org");
        browser.handle_gesture(&ctrl(Key::Char('G'))).await.unwrap();
        browser.pump_events();

        assert_eq!(browser.selected().unwrap().current_url(), "https://rust-lang.org");

        browser.handle_gesture(&ctrl(Key::Left)).await.unwrap();
        browser.pump_events();
        assert_eq!(browser.editable_url(), DEFAULT_HOME_URL);
    }

    #[tokio::test]
    async fn test_closing_last_tab_opens_home() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;
        let only = browser.selected_id().unwrap();

        let outcome = browser.close_tab(only).unwrap();
        let replacement = outcome.replacement.unwrap();
        browser.pump_events();

        assert_eq!(browser.selected_id(), Some(replacement));
        assert_eq!(browser.editable_url(), DEFAULT_HOME_URL);
        assert_eq!(
            browser.router().command(Action::Reload).unwrap().target,
            Some(replacement)
        );
    }

    #[tokio::test]
    async fn test_bookmark_and_history_commands() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;
        browser.navigate("docs.rs");
        browser.pump_events();

        let outcome = browser
            .handle_gesture(&ctrl(Key::Char('B')))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Bookmarked(Bookmark::new("docs.rs", "https://docs.rs"))
        );
        assert_eq!(browser.bookmarks().unwrap().len(), 1);

        // Anonymous history keeps nothing
        let outcome = browser
            .handle_gesture(&ctrl(Key::Char('H')))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, CommandOutcome::History(Vec::new()));
    }

    #[tokio::test]
    async fn test_open_and_remove_bookmark() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;
        let second = browser.add_tab(Some("docs.rs"));
        browser.pump_events();
        browser.add_bookmark(second).unwrap();

        let first = browser.tabs()[0].id();
        browser.select_tab(first).unwrap();
        assert!(browser.open_bookmark("https://docs.rs"));
        browser.pump_events();

        assert_eq!(browser.selected_id(), Some(first));
        assert_eq!(browser.selected().unwrap().current_url(), "https://docs.rs");
        assert_eq!(browser.editable_url(), "https://docs.rs");

        // Already there: nothing loads, the address bar still follows
        browser.set_editable_url("draft");
        assert!(!browser.open_bookmark("https://docs.rs"));
        assert_eq!(browser.editable_url(), "https://docs.rs");

        assert!(browser.remove_bookmark("https://docs.rs").unwrap());
        assert!(!browser.remove_bookmark("https://docs.rs").unwrap());
        assert!(browser.bookmarks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut harness = build(Config::new(dir.path().to_path_buf()), HeadlessCookieStore::new());
        harness.browser.initialize().await.unwrap();
        harness.browser.navigate("a.test");
        harness.browser.pump_events();
        assert!(!harness.browser.open_history(10).unwrap().is_empty());

        harness.browser.clear_history().unwrap();
        assert!(harness.browser.open_history(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_settings_rebinds() {
        let mut harness = anonymous().await;
        let stale = harness.browser.router().command(Action::Reload).unwrap();

        let mut settings = Settings::default();
        settings
            .key_bindings
            .insert("Reload".to_string(), "F5".to_string());
        settings
            .key_bindings
            .insert("OpenDevTools".to_string(), "Ctrl+Banana".to_string());
        harness.settings.replace(settings);

        let diagnostics = harness.browser.refresh_settings().await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].action, "OpenDevTools");

        let f5 = KeyGesture::new(Key::F(5), Modifiers::empty());
        let fresh = harness.browser.router().resolve(&f5).unwrap();
        assert_eq!(fresh.action, Action::Reload);
        assert!(harness.browser.router().resolve(&ctrl(Key::Char('R'))).is_none());
        assert!(harness.browser.execute(&stale).await.is_err());
    }

    #[tokio::test]
    async fn test_set_key_binding_validates() {
        let mut harness = anonymous().await;
        let browser = &mut harness.browser;

        assert!(matches!(
            browser.set_key_binding("Teleport", "Ctrl+T").await,
            Err(CoreError::UnknownAction(_))
        ));
        assert!(matches!(
            browser.set_key_binding("NewTab", "Hyper+T").await,
            Err(CoreError::Gesture(_))
        ));

        browser.set_key_binding("NewTab", "Ctrl+T").await.unwrap();
        browser.handle_gesture(&ctrl(Key::Char('T'))).await.unwrap();
        assert_eq!(browser.tabs().len(), 2);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut harness = build(Config::new(dir.path().to_path_buf()), HeadlessCookieStore::new());
            harness.browser.initialize().await.unwrap();
            harness.browser.add_tab(Some("a.test"));
            harness.browser.add_tab(Some("https://b.test/page"));

            let report = harness.browser.shutdown().await.unwrap();
            assert_eq!(report.tabs, 3);

            let history = harness.browser.open_history(10).unwrap();
            assert!(history.iter().any(|e| e.url == "https://a.test" && e.title == "a.test"));
        }

        let mut harness = build(Config::new(dir.path().to_path_buf()), HeadlessCookieStore::new());
        harness.browser.initialize().await.unwrap();

        assert_eq!(
            urls(&harness.browser),
            vec![DEFAULT_HOME_URL, "https://a.test", "https://b.test/page"]
        );
        // The first restored tab is selected
        assert_eq!(
            harness.browser.selected_id(),
            Some(harness.browser.tabs()[0].id())
        );
    }

    #[tokio::test]
    async fn test_corrupt_session_yields_one_default_tab() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "[{\"url\": ").unwrap();

        let mut harness = build(Config::new(dir.path().to_path_buf()), HeadlessCookieStore::new());
        harness.browser.initialize().await.unwrap();

        assert_eq!(urls(&harness.browser), vec![DEFAULT_HOME_URL]);
    }

    #[tokio::test]
    async fn test_anonymous_mode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("profile");

        let mut harness = build(
            Config::new(data_dir.clone()).anonymous(true),
            HeadlessCookieStore::new(),
        );
        harness.browser.initialize().await.unwrap();
        harness.browser.add_tab(Some("a.test"));

        let report = harness.browser.shutdown().await.unwrap();
        assert_eq!(report, SaveReport::default());
        assert!(!data_dir.exists());
    }
}
