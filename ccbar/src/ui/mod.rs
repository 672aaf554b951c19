//! UI rendering module for ccbar.
//!
//! This is the module root for `ui/`. It exposes `render()` as the single
//! entry point called by the event loop's `terminal.draw()` closure.
//!
//! Layout arithmetic and the one-row strips live in `layout.rs`; the form list
//! lives in `forms.rs` and draws toolbars through `toolbar.rs`. Modals
//! (settings, help, quit) are drawn last so they sit on top.

mod forms;
mod layout;
mod settings;
mod toolbar;
pub mod help;
pub mod keybindings;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar, render_tabs};

/// Renders one complete frame and rebuilds `state.hitboxes` from it.
///
/// Called exactly once per `AppEvent::Render` inside `terminal.draw()`. Mouse
/// clicks that arrive before the next frame are resolved against the boxes
/// recorded here.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    state.hitboxes.clear();
    let [tabs, body, status_bar] = compute_layout(frame);

    render_tabs(frame, tabs, state, theme);
    forms::render_forms(frame, body, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::Settings {
        settings::render_settings(frame, state, theme);
    }
    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmQuit => help::render_confirm_quit(frame, theme, state.drafts().len()),
        _ => {}
    }
}
