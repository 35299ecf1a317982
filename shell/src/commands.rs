//! Line commands
//!
//! Lines starting with `:` are commands; anything else is address bar input
//! and is navigated in the selected tab.

use anyhow::{anyhow, bail, Result};
use corvid_core::{Action, Browser, CommandOutcome, KeyGesture};
use std::str::FromStr;

pub const HELP: &str = "\
:new [url]          open a tab (home page without url)
:close              close the selected tab
:next / :prev       select the next / previous tab
:select N           select tab N (1-based)
:back / :forward    history navigation
:reload             reload the selected tab
:devtools           open developer tools
:edit TEXT          set the address bar without loading
:go                 load the address bar text
:key GESTURE        press a key gesture, e.g. :key Ctrl+B
:bind ACTION GESTURE
:home URL           set the home page
:refresh            reload settings
:bookmark           bookmark the selected tab
:bookmarks          list bookmarks
:open-bookmark N|URL  open a bookmark in the selected tab
:unbookmark N|URL   remove a bookmark
:history            list recent history
:clear-history      delete all history
:tabs               list tabs
:quit               save the session and exit
anything else       navigate the selected tab";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Navigate(String),
    NewTab(Option<String>),
    Select(usize),
    Edit(String),
    Run(Action),
    Key(KeyGesture),
    Bind { action: String, gesture: String },
    Home(String),
    Bookmarks,
    OpenBookmark(String),
    Unbookmark(String),
    ClearHistory,
    Tabs,
    Help,
    Quit,
}

impl FromStr for LineCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(LineCommand::Navigate(line.to_string()));
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((command, ""));

        let parsed = match name.to_ascii_lowercase().as_str() {
            "new" => LineCommand::NewTab((!rest.is_empty()).then(|| rest.to_string())),
            "close" => LineCommand::Run(Action::CloseTab),
            "next" => LineCommand::Run(Action::NavigateNextTab),
            "prev" => LineCommand::Run(Action::NavigatePreviousTab),
            "back" => LineCommand::Run(Action::Back),
            "forward" => LineCommand::Run(Action::Forward),
            "reload" => LineCommand::Run(Action::Reload),
            "devtools" => LineCommand::Run(Action::OpenDevTools),
            "go" => LineCommand::Run(Action::Go),
            "bookmark" => LineCommand::Run(Action::AddBookmark),
            "history" => LineCommand::Run(Action::OpenHistory),
            "refresh" => LineCommand::Run(Action::RefreshSettings),
            "select" => LineCommand::Select(
                rest.parse()
                    .map_err(|_| anyhow!("expected a tab number, got {:?}", rest))?,
            ),
            "edit" => LineCommand::Edit(rest.to_string()),
            "key" => LineCommand::Key(rest.parse()?),
            "bind" => {
                let (action, gesture) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: :bind ACTION GESTURE"))?;
                LineCommand::Bind {
                    action: action.to_string(),
                    gesture: gesture.trim().to_string(),
                }
            }
            "home" if !rest.is_empty() => LineCommand::Home(rest.to_string()),
            "bookmarks" => LineCommand::Bookmarks,
            "open-bookmark" if !rest.is_empty() => LineCommand::OpenBookmark(rest.to_string()),
            "unbookmark" if !rest.is_empty() => LineCommand::Unbookmark(rest.to_string()),
            "clear-history" => LineCommand::ClearHistory,
            "tabs" => LineCommand::Tabs,
            "help" | "?" => LineCommand::Help,
            "quit" | "q" | "exit" => LineCommand::Quit,
            _ => bail!("unknown command :{} (try :help)", name),
        };

        Ok(parsed)
    }
}

/// Apply one command. Returns false when the shell should exit.
pub async fn apply(browser: &mut Browser, command: LineCommand) -> Result<bool> {
    match command {
        LineCommand::Navigate(input) => {
            if !input.is_empty() && !browser.navigate(&input) {
                println!("already at {}", browser.resolve(&input));
            }
        }
        LineCommand::NewTab(input) => {
            browser.add_tab(input.as_deref());
        }
        LineCommand::Select(number) => {
            let id = number
                .checked_sub(1)
                .and_then(|index| browser.tabs().get(index))
                .map(|tab| tab.id())
                .ok_or_else(|| anyhow!("no tab {}", number))?;
            browser.select_tab(id)?;
        }
        LineCommand::Edit(text) => browser.set_editable_url(text),
        LineCommand::Run(action) => {
            let command = browser
                .router()
                .command(action)
                .ok_or_else(|| anyhow!("{} is not bound", action))?;
            report(browser.execute(&command).await?);
        }
        LineCommand::Key(gesture) => match browser.handle_gesture(&gesture).await? {
            Some(outcome) => report(outcome),
            None => println!("{} is not bound", gesture),
        },
        LineCommand::Bind { action, gesture } => {
            browser.set_key_binding(&action, &gesture).await?;
            println!("{} = {}", action, gesture);
        }
        LineCommand::Home(url) => {
            browser.set_home_url(&url).await?;
            println!("home: {}", browser.home_url());
        }
        LineCommand::Bookmarks => {
            for (index, bookmark) in browser.bookmarks()?.iter().enumerate() {
                println!("  {}. {}  {}", index + 1, bookmark.title, bookmark.url);
            }
        }
        LineCommand::OpenBookmark(which) => {
            let url = bookmark_url(browser, &which)?;
            if !browser.open_bookmark(&url) {
                println!("already at {}", url);
            }
        }
        LineCommand::Unbookmark(which) => {
            let url = bookmark_url(browser, &which)?;
            if browser.remove_bookmark(&url)? {
                println!("removed {}", url);
            } else {
                println!("no bookmark for {}", url);
            }
        }
        LineCommand::ClearHistory => {
            browser.clear_history()?;
            println!("history cleared");
        }
        LineCommand::Tabs => {}
        LineCommand::Help => println!("{}", HELP),
        LineCommand::Quit => return Ok(false),
    }

    Ok(true)
}

/// A 1-based position in the bookmark list, or a URL taken as is.
fn bookmark_url(browser: &Browser, which: &str) -> Result<String> {
    let Ok(number) = which.parse::<usize>() else {
        return Ok(which.to_string());
    };

    number
        .checked_sub(1)
        .and_then(|index| browser.bookmarks().ok()?.into_iter().nth(index))
        .map(|bookmark| bookmark.url)
        .ok_or_else(|| anyhow!("no bookmark {}", number))
}

fn report(outcome: CommandOutcome) {
    match outcome {
        CommandOutcome::Done => {}
        CommandOutcome::Ignored => println!("nothing to do"),
        CommandOutcome::Bookmarked(bookmark) => println!("bookmarked {}", bookmark.url),
        CommandOutcome::History(entries) => {
            for entry in entries {
                println!(
                    "  {}  {}  ({} visits)",
                    entry.visited_at.format("%Y-%m-%d %H:%M"),
                    entry.url,
                    entry.visit_count
                );
            }
        }
        CommandOutcome::SettingsRefreshed(diagnostics) => {
            for diagnostic in diagnostics {
                println!("invalid key binding {}", diagnostic);
            }
        }
    }
}

/// Print the tab strip with the address bar underneath.
pub fn print_tabs(browser: &Browser) {
    for (index, tab) in browser.tabs().iter().enumerate() {
        let marker = if tab.is_selected() { '*' } else { ' ' };
        let loading = if tab.is_loading() { " (loading)" } else { "" };
        println!("{} {}. {}{}  {}", marker, index + 1, tab.header(), loading, tab.current_url());
        if let Some(error) = tab.last_error() {
            println!("      failed: {} ({})", error.url, error.message);
        }
    }
    println!("  [{}]", browser.editable_url());
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::{Key, Modifiers};

    #[test]
    fn test_plain_text_navigates() {
        assert_eq!(
            "  hello world ".parse::<LineCommand>().unwrap(),
            LineCommand::Navigate("hello world".into())
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(":new".parse::<LineCommand>().unwrap(), LineCommand::NewTab(None));
        assert_eq!(
            ":new docs.rs".parse::<LineCommand>().unwrap(),
            LineCommand::NewTab(Some("docs.rs".into()))
        );
        assert_eq!(
            ":CLOSE".parse::<LineCommand>().unwrap(),
            LineCommand::Run(Action::CloseTab)
        );
        assert_eq!(":select 2".parse::<LineCommand>().unwrap(), LineCommand::Select(2));
        assert_eq!(
            ":key ctrl+b".parse::<LineCommand>().unwrap(),
            LineCommand::Key(KeyGesture::new(Key::Char('B'), Modifiers::CTRL))
        );
        assert_eq!(
            ":bind Reload  F5".parse::<LineCommand>().unwrap(),
            LineCommand::Bind {
                action: "Reload".into(),
                gesture: "F5".into()
            }
        );
        assert_eq!(
            ":open-bookmark 2".parse::<LineCommand>().unwrap(),
            LineCommand::OpenBookmark("2".into())
        );
        assert_eq!(
            ":unbookmark https://docs.rs".parse::<LineCommand>().unwrap(),
            LineCommand::Unbookmark("https://docs.rs".into())
        );
        assert_eq!(
            ":clear-history".parse::<LineCommand>().unwrap(),
            LineCommand::ClearHistory
        );
        assert_eq!(":q".parse::<LineCommand>().unwrap(), LineCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(":select two".parse::<LineCommand>().is_err());
        assert!(":key Hyper+X".parse::<LineCommand>().is_err());
        assert!(":bind Reload".parse::<LineCommand>().is_err());
        assert!(":home".parse::<LineCommand>().is_err());
        assert!(":open-bookmark".parse::<LineCommand>().is_err());
        assert!(":launch".parse::<LineCommand>().is_err());
    }
}
