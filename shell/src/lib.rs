//! Corvid Browser - command-line shell
//!
//! Runs the browser core over the headless engine and drives it with line
//! commands read from stdin. The session is saved on `:quit` or end of input.

mod commands;

use anyhow::Context;
use clap::Parser;
use corvid_core::{Browser, Config, FileConfigProvider};
use corvid_engine::headless::{HeadlessCookieStore, HeadlessEngineFactory};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::LineCommand;

#[derive(Debug, Parser)]
#[command(name = "corvid", version, about = "Corvid browser shell")]
pub struct Args {
    /// Keep session, history and bookmarks in memory only
    #[arg(long)]
    pub anonymous: bool,

    /// Profile directory (defaults to the platform data directory)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `corvid_tabs=trace`
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Seconds to wait for the cookie jar on save
    #[arg(long, value_name = "SECS")]
    pub cookie_timeout: Option<u64>,
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    corvid_core::init_logging(args.log_level.as_deref());

    let mut config = Config::new(args.data_dir.unwrap_or_else(Config::data_dir))
        .anonymous(args.anonymous);
    if let Some(secs) = args.cookie_timeout {
        config.cookie_timeout = Duration::from_secs(secs);
    }

    let settings = Arc::new(FileConfigProvider::load(config.settings_path()).await);
    let data_dir = config.data_dir.clone();

    let mut browser = Browser::new(
        config,
        Arc::new(HeadlessEngineFactory::new()),
        Arc::new(HeadlessCookieStore::new()),
        settings,
    )
    .with_context(|| format!("failed to open profile at {}", data_dir.display()))?;

    browser.initialize().await?;
    for diagnostic in browser.diagnostics() {
        println!("invalid key binding {}", diagnostic);
    }

    tracing::info!(data_dir = %data_dir.display(), anonymous = args.anonymous, "Corvid started");
    commands::print_tabs(&browser);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let keep_going = match line.parse::<LineCommand>() {
            Ok(command) => {
                let show_tabs = !matches!(command, LineCommand::Help | LineCommand::Bookmarks);
                match commands::apply(&mut browser, command).await {
                    Ok(keep_going) => {
                        browser.pump_events();
                        if keep_going && show_tabs {
                            commands::print_tabs(&browser);
                        }
                        keep_going
                    }
                    Err(e) => {
                        println!("error: {:#}", e);
                        true
                    }
                }
            }
            Err(e) => {
                println!("error: {:#}", e);
                true
            }
        };

        if !keep_going {
            break;
        }
    }

    match browser.shutdown().await {
        Ok(report) => {
            println!("saved {} tabs, {} cookies", report.tabs, report.cookies);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save session");
            Err(e).context("failed to save session")
        }
    }
}
