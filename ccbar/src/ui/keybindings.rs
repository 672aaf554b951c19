//! Keybinding dispatcher for ccbar.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what to do next. The dispatcher branches
//! first on `state.mode` so that HelpOverlay, ConfirmQuit, Settings, Insert, and
//! Normal all have isolated handler functions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{AppState, Edit, HitTarget, Mode};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
    /// The user asked to switch the prefix format. The event loop persists the
    /// value first, then applies it with [`AppState::apply_prettify`].
    SetPrettify(bool),
}

impl From<Option<bool>> for KeyAction {
    fn from(prettify: Option<bool>) -> Self {
        prettify.map_or(KeyAction::Continue, KeyAction::SetPrettify)
    }
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`  : the raw crossterm key event (code + modifiers)
/// * `state`: mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Settings => handle_settings(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

/// Handles a key event while in Normal mode.
///
/// Digits click toolbar controls of the focused form; everything else moves
/// focus, manages forms, or navigates between pages.
fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        // Toolbar
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            state.click_control(index).into()
        }
        KeyCode::Char('s') => state.toggle_settings().into(),
        KeyCode::Char('p') => KeyAction::SetPrettify(!state.integrator.prettify()),

        // Form focus
        KeyCode::Tab => {
            state.focus_next();
            KeyAction::Continue
        }
        KeyCode::BackTab => {
            state.focus_prev();
            KeyAction::Continue
        }
        KeyCode::Char('i') | KeyCode::Enter => {
            if state.focus.is_some() {
                state.mode = Mode::Insert;
            }
            KeyAction::Continue
        }
        KeyCode::Char('n') => {
            state.open_reply();
            KeyAction::Continue
        }
        KeyCode::Char('x') => {
            state.discard_focused();
            KeyAction::Continue
        }

        // Pages
        KeyCode::Char(']') => {
            state.navigate(state.page.next());
            KeyAction::Continue
        }
        KeyCode::Char('[') => {
            state.navigate(state.page.prev());
            KeyAction::Continue
        }
        KeyCode::Char('-') => {
            state.back();
            KeyAction::Continue
        }

        // Help overlay
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        // Quit / confirm-quit
        KeyCode::Char('q') => {
            if state.has_drafts() {
                state.mode = Mode::ConfirmQuit;
                KeyAction::Continue
            } else {
                KeyAction::Quit
            }
        }

        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Settings mode
// ---------------------------------------------------------------------------

/// Handles a key event while the settings dropdown is open.
///
/// `Enter`, `Space`, and `p` press the prettify toggle; `s` and `Esc` close the
/// dropdown.
fn handle_settings(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('p') => {
            state.click_prettify_toggle().into()
        }
        KeyCode::Char('s') | KeyCode::Esc => {
            state.integrator.close_settings(&mut state.doc);
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Handles a key event while the help overlay is visible.
///
/// Any of `?`, `Esc`, or `q` dismisses the overlay and returns to Normal mode.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => {
            state.help_scroll = state.help_scroll.saturating_add(1);
            KeyAction::Continue
        }
        KeyCode::Char('k') => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
            KeyAction::Continue
        }
        KeyCode::Char('g') => {
            state.help_scroll = 0;
            KeyAction::Continue
        }
        KeyCode::Char('G') => {
            state.help_scroll = u16::MAX;
            KeyAction::Continue
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// ConfirmQuit mode
// ---------------------------------------------------------------------------

/// Handles a key event while the quit-confirmation dialog is active.
///
/// `y` / `Y` confirms the quit. `n` / `N` / `Esc` cancels and returns to
/// Normal mode. All other keys are ignored.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Handles a key event while editing the focused comment body.
///
/// Printable characters are inserted at the cursor; `Esc` returns to Normal
/// mode. Control chords are ignored so they never land in the text.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let edit = match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            return KeyAction::Continue;
        }
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Continue;
        }
        KeyCode::Char(c) => Edit::Insert(c),
        KeyCode::Enter => Edit::Insert('\n'),
        KeyCode::Backspace => Edit::Backspace,
        KeyCode::Delete => Edit::Delete,
        KeyCode::Left => Edit::Left,
        KeyCode::Right => Edit::Right,
        KeyCode::Home => Edit::Home,
        KeyCode::End => Edit::End,
        _ => return KeyAction::Continue,
    };
    state.edit(edit);
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: clicks on rendered targets and the scroll wheel.
///
/// Left clicks are resolved against the hit boxes cached by the last frame.
/// The wheel scrolls the help overlay when it is open and moves form focus
/// otherwise.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_mouse_click(mouse.column, mouse.row, state)
        }
        MouseEventKind::ScrollUp => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_sub(3);
            } else {
                state.focus_prev();
            }
            KeyAction::Continue
        }
        MouseEventKind::ScrollDown => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_add(3);
            } else {
                state.focus_next();
            }
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

/// Dispatches a left click to whatever was drawn at (`col`, `row`).
///
/// The help overlay and the quit dialog ignore the mouse entirely. While the
/// settings dropdown is open, a click on its body does nothing, a click on a
/// settings control goes through, and any other click closes the dropdown
/// before it is handled as usual.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) -> KeyAction {
    if matches!(state.mode, Mode::HelpOverlay | Mode::ConfirmQuit) {
        return KeyAction::Continue;
    }
    let target = state.hit(col, row);
    if state.mode == Mode::Settings {
        let inside = match target {
            Some(HitTarget::Dropdown) => true,
            Some(HitTarget::Control(node)) => state.integrator.is_settings_control(node),
            _ => false,
        };
        if !inside {
            state.integrator.close_settings(&mut state.doc);
            state.mode = Mode::Normal;
        }
    }
    match target {
        Some(HitTarget::Control(node)) => state.click_node(node).into(),
        Some(HitTarget::Form(input)) => {
            state.focus_form(input);
            KeyAction::Continue
        }
        Some(HitTarget::Tab(page)) => {
            state.navigate(page);
            KeyAction::Continue
        }
        Some(HitTarget::Dropdown) | None => KeyAction::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::Page;
    use ccbar_core::host::integrator::IdAllocator;
    use ccbar_core::host::HostPage;
    use ccbar_core::rescan::{spawn_scheduler, RescanConfig, RescanTrigger};
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;

    use crate::app::Hitbox;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn state() -> AppState {
        let (triggers, _task) = spawn_scheduler(RescanConfig::default(), |_| true);
        let mut state = AppState::new(false, IdAllocator::new(), triggers);
        state.scan(RescanTrigger::Initial);
        state
    }

    #[tokio::test]
    async fn typing_after_a_toolbar_click_extends_the_subject() {
        let mut state = state().await;
        handle_key(press(KeyCode::Tab), &mut state);
        let input = state.focus.unwrap();

        assert_eq!(handle_key(press(KeyCode::Char('4')), &mut state), KeyAction::Continue);
        handle_key(press(KeyCode::Char('i')), &mut state);
        assert_eq!(state.mode, Mode::Insert);
        for c in "fix".chars() {
            handle_key(press(KeyCode::Char(c)), &mut state);
        }
        assert_eq!(state.doc.value(input), "issue: fix");

        handle_key(press(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn p_requests_the_opposite_format_without_applying_it() {
        let mut state = state().await;
        assert_eq!(handle_key(press(KeyCode::Char('p')), &mut state), KeyAction::SetPrettify(true));
        assert!(!state.integrator.prettify());
    }

    #[tokio::test]
    async fn settings_mode_toggles_and_closes() {
        let mut state = state().await;
        handle_key(press(KeyCode::Char('s')), &mut state);
        assert_eq!(state.mode, Mode::Settings);
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            KeyAction::SetPrettify(true)
        );
        handle_key(press(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.integrator.open_dropdown(), None);
    }

    #[tokio::test]
    async fn clicking_outside_the_dropdown_closes_it() {
        let mut state = state().await;
        let input = state.focus.unwrap();
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        handle_key(press(KeyCode::Char('s')), &mut state);
        assert_eq!(state.mode, Mode::Settings);
        handle_mouse(click(70, 40), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.integrator.open_dropdown(), None);

        handle_key(press(KeyCode::Char('s')), &mut state);
        state.hitboxes.push(Hitbox {
            area: Rect::new(0, 5, 40, 3),
            target: HitTarget::Form(input),
        });
        state.hitboxes.push(Hitbox {
            area: Rect::new(10, 0, 20, 3),
            target: HitTarget::Dropdown,
        });
        handle_mouse(click(12, 1), &mut state);
        assert_eq!(state.mode, Mode::Settings);
        assert!(state.integrator.open_dropdown().is_some());

        handle_mouse(click(2, 6), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.integrator.open_dropdown(), None);
        assert_eq!(state.focus, Some(input));
    }

    #[tokio::test]
    async fn quit_asks_for_confirmation_while_drafts_exist() {
        let mut state = state().await;
        assert!(state.has_drafts());
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::ConfirmQuit);
        assert_eq!(handle_key(press(KeyCode::Char('n')), &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::Normal);
        handle_key(press(KeyCode::Char('q')), &mut state);
        assert_eq!(handle_key(press(KeyCode::Char('y')), &mut state), KeyAction::Quit);
    }

    #[tokio::test]
    async fn page_keys_walk_the_tabs() {
        let mut state = state().await;
        handle_key(press(KeyCode::Char(']')), &mut state);
        assert_eq!(state.page, Page::Files);
        handle_key(press(KeyCode::Char('-')), &mut state);
        assert_eq!(state.page, Page::Conversation);
    }

    #[tokio::test]
    async fn clicks_resolve_against_cached_hitboxes() {
        let mut state = state().await;
        state.hitboxes.push(Hitbox {
            area: Rect::new(0, 0, 10, 1),
            target: HitTarget::Tab(Page::Commit),
        });
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(click, &mut state);
        assert_eq!(state.page, Page::Commit);

        state.mode = Mode::HelpOverlay;
        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            ..click
        };
        handle_mouse(scroll, &mut state);
        assert_eq!(state.help_scroll, 3);
    }
}
