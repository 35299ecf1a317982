//! Keyboard command routing
//!
//! Each [`Action`] is bound to the tab that was selected when the router was
//! last rebuilt. Every rebuild bumps the generation; a [`BoundCommand`] from an
//! older generation is stale and must not run.

use corvid_tabs::TabId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::gesture::{GestureError, KeyGesture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Go,
    Back,
    Forward,
    Reload,
    OpenDevTools,
    AddBookmark,
    OpenHistory,
    NavigatePreviousTab,
    NavigateNextTab,
    RefreshSettings,
    NewTab,
    CloseTab,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::Go,
        Action::Back,
        Action::Forward,
        Action::Reload,
        Action::OpenDevTools,
        Action::AddBookmark,
        Action::OpenHistory,
        Action::NavigatePreviousTab,
        Action::NavigateNextTab,
        Action::RefreshSettings,
        Action::NewTab,
        Action::CloseTab,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Go => "go",
            Action::Back => "back",
            Action::Forward => "forward",
            Action::Reload => "reload",
            Action::OpenDevTools => "openDevTools",
            Action::AddBookmark => "addBookmark",
            Action::OpenHistory => "openHistory",
            Action::NavigatePreviousTab => "navigatePreviousTab",
            Action::NavigateNextTab => "navigateNextTab",
            Action::RefreshSettings => "refreshSettings",
            Action::NewTab => "newTab",
            Action::CloseTab => "closeTab",
        }
    }

    /// Look up an action by its configuration name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "navigateup" => return Some(Action::NavigatePreviousTab),
            "navigatedown" => return Some(Action::NavigateNextTab),
            _ => {}
        }

        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// Whether the action operates on the captured tab.
    pub fn targets_tab(&self) -> bool {
        matches!(
            self,
            Action::Go
                | Action::Back
                | Action::Forward
                | Action::Reload
                | Action::OpenDevTools
                | Action::AddBookmark
                | Action::CloseTab
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action captured against a selection at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundCommand {
    pub action: Action,
    pub target: Option<TabId>,
    pub generation: u64,
}

/// A configured binding that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDiagnostic {
    pub action: String,
    pub gesture: String,
    pub error: GestureError,
}

impl fmt::Display for BindingDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}: {}", self.action, self.gesture, self.error)
    }
}

#[derive(Debug, Default)]
pub struct CommandRouter {
    generation: u64,
    commands: HashMap<Action, BoundCommand>,
    bindings: HashMap<KeyGesture, Action>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recreate every command against `selected`. Commands handed out before
    /// this call become stale.
    pub fn rebuild(&mut self, selected: Option<TabId>) {
        self.generation += 1;
        let generation = self.generation;

        self.commands = Action::ALL
            .into_iter()
            .map(|action| {
                let target = if action.targets_tab() { selected } else { None };
                (
                    action,
                    BoundCommand {
                        action,
                        target,
                        generation,
                    },
                )
            })
            .collect();

        tracing::debug!(generation, selected = ?selected, "Rebuilt commands");
    }

    /// Replace all gesture bindings. Entries with unknown action names are
    /// skipped; entries whose gesture does not parse are skipped and reported.
    pub fn bind(&mut self, bindings: &BTreeMap<String, String>) -> Vec<BindingDiagnostic> {
        let mut diagnostics = Vec::new();
        self.bindings.clear();

        for (name, gesture_text) in bindings {
            let Some(action) = Action::from_name(name) else {
                tracing::debug!(action = %name, "Ignoring binding for unknown action");
                continue;
            };

            match gesture_text.parse::<KeyGesture>() {
                Ok(gesture) => {
                    if let Some(previous) = self.bindings.insert(gesture, action) {
                        tracing::debug!(gesture = %gesture, from = %previous, to = %action, "Gesture rebound");
                    }
                }
                Err(error) => {
                    tracing::warn!(action = %name, gesture = %gesture_text, error = %error, "Invalid key binding");
                    diagnostics.push(BindingDiagnostic {
                        action: name.clone(),
                        gesture: gesture_text.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(bound = self.bindings.len(), invalid = diagnostics.len(), "Key bindings applied");
        diagnostics
    }

    pub fn command(&self, action: Action) -> Option<BoundCommand> {
        self.commands.get(&action).copied()
    }

    pub fn resolve(&self, gesture: &KeyGesture) -> Option<BoundCommand> {
        self.bindings
            .get(gesture)
            .and_then(|action| self.command(*action))
    }

    pub fn is_current(&self, command: &BoundCommand) -> bool {
        command.generation == self.generation
    }

    /// Current bindings, ordered by action.
    pub fn bindings(&self) -> Vec<(KeyGesture, Action)> {
        let mut bindings: Vec<_> = self.bindings.iter().map(|(g, a)| (*g, *a)).collect();
        bindings.sort_by_key(|(gesture, action)| (*action, gesture.to_string()));
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Key, Modifiers};

    fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(a, g)| (a.to_string(), g.to_string()))
            .collect()
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::from_name("Reload"), Some(Action::Reload));
        assert_eq!(Action::from_name("OPENDEVTOOLS"), Some(Action::OpenDevTools));
        assert_eq!(Action::from_name("NavigateUp"), Some(Action::NavigatePreviousTab));
        assert_eq!(Action::from_name("navigateDown"), Some(Action::NavigateNextTab));
        assert_eq!(Action::from_name("launchRocket"), None);

        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
    }

    #[test]
    fn test_rebuild_captures_selection() {
        let tab = TabId::new();
        let mut router = CommandRouter::new();
        router.rebuild(Some(tab));

        let reload = router.command(Action::Reload).unwrap();
        assert_eq!(reload.target, Some(tab));
        assert_eq!(reload.generation, 1);

        // Tab-strip navigation does not capture a tab
        assert_eq!(router.command(Action::NavigateNextTab).unwrap().target, None);
    }

    #[test]
    fn test_rebuild_makes_old_commands_stale() {
        let mut router = CommandRouter::new();
        router.rebuild(Some(TabId::new()));
        let old = router.command(Action::Back).unwrap();

        router.rebuild(Some(TabId::new()));
        assert!(!router.is_current(&old));
        assert!(router.is_current(&router.command(Action::Back).unwrap()));
    }

    #[test]
    fn test_bind_and_resolve() {
        let mut router = CommandRouter::new();
        router.rebuild(None);
        let diagnostics = router.bind(&bindings(&[("Reload", "Ctrl+R"), ("Go", "ctrl+g")]));
        assert!(diagnostics.is_empty());

        let gesture = KeyGesture::new(Key::Char('G'), Modifiers::CTRL);
        assert_eq!(router.resolve(&gesture).unwrap().action, Action::Go);

        let unbound = KeyGesture::new(Key::Char('Q'), Modifiers::CTRL);
        assert!(router.resolve(&unbound).is_none());
    }

    #[test]
    fn test_bad_entries_do_not_abort() {
        let mut router = CommandRouter::new();
        router.rebuild(None);
        let diagnostics = router.bind(&bindings(&[
            ("AddBookmark", "Hyper+B"),
            ("Back", "Ctrl+Left"),
            ("Forward", "Ctrl+Nowhere"),
            ("Teleport", "Ctrl+T"),
        ]));

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].action, "AddBookmark");
        assert_eq!(
            diagnostics[0].error,
            GestureError::UnknownModifier("Hyper".into())
        );
        assert_eq!(router.bindings().len(), 1);
        assert_eq!(router.bindings()[0].1, Action::Back);
    }

    #[test]
    fn test_bind_replaces_previous_bindings() {
        let mut router = CommandRouter::new();
        router.rebuild(None);
        router.bind(&bindings(&[("Reload", "Ctrl+R")]));
        router.bind(&bindings(&[("Reload", "F5")]));

        let bindings = router.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].0.to_string(), "F5");
    }
}
