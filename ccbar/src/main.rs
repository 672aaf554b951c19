//! ccbar: a conventional-comment toolbar host in the terminal.
//!
//! Entry point for the `ccbar` binary. Wires together the terminal lifecycle
//! (`tui`), unified event bus (`event`), the hosted review pages (`pages`),
//! the form UI (`ui`), and `ccbar-core`, which owns the toolbars, the prefix
//! codec, the preference store, and the rescan scheduler.
//!
//! # Startup sequence
//!
//! 1. Load config and start file logging. Both happen before terminal init;
//!    logs never go to the terminal because it belongs to the UI.
//! 2. Open the preference database. A failure is logged and the session runs
//!    with an in-memory preference.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Create the event channel and `spawn_event_task()`.
//! 5. Spawn the rescan scheduler and the poll timer, and request the first scan.
//!
//! # Safety
//!
//! `restore_tui()` is called after the event loop exits (quit, SIGTERM, or
//! channel close). A draw error breaks out of the loop with the error, which
//! is returned only after the terminal is restored. The panic hook covers
//! unexpected panics.

mod app;
mod config;
mod event;
mod pages;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::time::Duration;

use ccbar_core::host::integrator::IdAllocator;
use ccbar_core::prefs::{self, PreferenceStore};
use ccbar_core::rescan::{self, RescanTrigger};
use tracing::{info, warn};

use crate::config::Config;
use crate::event::AppEvent;
use crate::ui::keybindings::{self, KeyAction};

/// Routes `tracing` output to `path`, appending. Filter from `CCBAR_LOG`,
/// `info` by default.
fn init_file_logging(path: &std::path::Path) -> std::io::Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CCBAR_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Step 0: config and logging, read-only and safe before terminal init.
    let (config, config_error) = match Config::load(&config::config_path()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    init_file_logging(&config.log_path())?;
    if let Some(e) = config_error {
        warn!(error = %e, "config unusable, using defaults");
    }
    let theme = theme::Theme::from_name(&config.theme);

    // Step 1: the preference store, before the first frame.
    let mut store = match prefs::open_db(&config.db_path.to_string_lossy()).await {
        Ok(conn) => PreferenceStore::load(conn).await,
        Err(e) => {
            warn!(error = %e, path = %config.db_path.display(), "preference database unavailable");
            PreferenceStore::detached()
        }
    };

    // Step 2: panic hook, SIGTERM flag, terminal.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm();
    let mut terminal = tui::init_tui()?;

    // Step 3: event channel and the background input task.
    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    // Step 4: scans are decided by the scheduler and executed on this loop.
    let rescan_config = config.rescan();
    let poll_interval = rescan_config.poll_interval;
    let event_tx = handler.tx.clone();
    let (triggers, _scheduler) = rescan::spawn_scheduler(rescan_config, move |trigger| {
        event_tx.send(AppEvent::Rescan(trigger)).is_ok()
    });
    let _timer = rescan::spawn_timer(poll_interval, triggers.clone());

    let mut state = app::AppState::new(store.get(), IdAllocator::new(), triggers.clone());
    triggers.send(RescanTrigger::Initial);
    info!(prettify = store.get(), "ccbar started");

    // Event loop: exits only via `break`, so `restore_tui()` is always reached.
    let result: std::io::Result<()> = 'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when the
            // channel is quiet.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop Ok(());
                }
            }
            maybe_event = rx.recv() => {
                let action = match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            break 'event_loop Err(e);
                        }
                        KeyAction::Continue
                    }
                    Some(AppEvent::Key(key)) => keybindings::handle_key(key, &mut state),
                    Some(AppEvent::Mouse(mouse)) => keybindings::handle_mouse(mouse, &mut state),
                    Some(AppEvent::FocusGained) => {
                        triggers.send(RescanTrigger::Visibility);
                        KeyAction::Continue
                    }
                    Some(AppEvent::Rescan(trigger)) => {
                        state.scan(trigger);
                        triggers.scan_done();
                        KeyAction::Continue
                    }
                    // The next Render picks the new size up through frame.area().
                    Some(AppEvent::Resize) => KeyAction::Continue,
                    None => break 'event_loop Ok(()),
                };

                match action {
                    KeyAction::Quit => break 'event_loop Ok(()),
                    KeyAction::SetPrettify(enabled) => {
                        store.set(enabled).await;
                        state.apply_prettify(enabled);
                    }
                    KeyAction::Continue => {}
                }
                if state.observe_mutations() {
                    triggers.send(RescanTrigger::DomMutation);
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop Ok(());
                }
            }
        }
    };

    tui::restore_tui()?;
    result?;

    let drafts = state.drafts();
    info!(drafts = drafts.len(), "ccbar exiting");
    for (heading, body) in drafts {
        println!("## {heading}\n\n{body}\n");
    }
    Ok(())
}
