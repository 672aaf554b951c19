//! Central application state for ccbar.
//!
//! `AppState` owns the hosted page (an in-memory [`Document`]), the
//! [`Integrator`] that keeps toolbars attached to its comment inputs, the
//! session [`History`], and the purely visual state: mode, focused form,
//! scroll, and the hit boxes cached by the last render. Rendering reads it;
//! the keybinding dispatcher and the main loop mutate it.

use ccbar_core::host::dom::{Document, MutationRecord};
use ccbar_core::host::history::History;
use ccbar_core::host::integrator::{
    insertions_need_scan, ClickOutcome, IdAllocator, Integrator, ScanReport,
};
use ccbar_core::host::{HostPage, NodeId};
use ccbar_core::rescan::{RescanTrigger, TriggerSender};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::pages::{self, Page};

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and toolbar clicks (default).
    #[default]
    Normal,
    /// Typing into the focused comment body.
    Insert,
    /// Full-screen help overlay is shown above everything.
    HelpOverlay,
    /// Quit-confirmation dialog shown when drafts exist.
    ConfirmQuit,
    /// The settings dropdown of the focused form is open.
    Settings,
}

/// Something on screen that reacts to a mouse click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A node rendered by the integrator (toolbar control, settings button,
    /// prettify toggle).
    Control(NodeId),
    /// The body of a comment form; clicking focuses it.
    Form(NodeId),
    /// A page tab.
    Tab(Page),
    /// The body of the open settings dropdown. Swallows clicks.
    Dropdown,
}

/// One cached clickable region from the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox {
    pub area: Rect,
    pub target: HitTarget,
}

/// A cursor movement or edit applied to the focused comment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// All mutable state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub page: Page,
    pub doc: Document,
    pub integrator: Integrator,
    pub history: History,
    /// The bound input that keyboard actions apply to.
    pub focus: Option<NodeId>,
    /// Index of the first form drawn; kept so the focused form stays visible.
    pub form_scroll: usize,
    pub help_scroll: u16,
    /// Number of reply forms opened so far, used for their headings.
    pub replies: usize,
    /// One-line message for the status bar.
    pub status: Option<String>,
    pub last_scan: Option<RescanTrigger>,
    /// Clickable regions from the last frame, front-most last.
    pub hitboxes: Vec<Hitbox>,
}

impl AppState {
    /// Builds the first page. `prettify` is the stored preference; navigation
    /// on the page is reported to `triggers`.
    pub fn new(prettify: bool, ids: IdAllocator, triggers: TriggerSender) -> Self {
        let page = Page::Conversation;
        let mut doc = Document::new();
        pages::build(&mut doc, page);
        Self {
            mode: Mode::default(),
            page,
            doc,
            integrator: Integrator::new(ids, prettify),
            history: History::new(page.path()).with_hook(triggers),
            focus: None,
            form_scroll: 0,
            help_scroll: 0,
            replies: 0,
            status: None,
            last_scan: None,
            hitboxes: Vec::new(),
        }
    }

    /// Runs one integrator scan and repairs focus afterwards.
    pub fn scan(&mut self, trigger: RescanTrigger) -> ScanReport {
        let report = self.integrator.scan(&mut self.doc);
        self.last_scan = Some(trigger);
        if !report.is_empty() {
            debug!(?trigger, attached = report.attached.len(), "page rescanned");
        }
        self.ensure_focus();
        report
    }

    /// Drains the page's mutation records; `true` when they call for a scan.
    pub fn observe_mutations(&mut self) -> bool {
        let inserted: Vec<NodeId> = self
            .doc
            .take_mutations()
            .into_iter()
            .filter_map(|record| match record {
                MutationRecord::Inserted(node) => Some(node),
                MutationRecord::Removed(_) => None,
            })
            .collect();
        insertions_need_scan(&self.doc, inserted)
    }

    /// Forms with a toolbar, in page order.
    pub fn forms(&self) -> Vec<NodeId> {
        self.integrator.bound_inputs(&self.doc)
    }

    fn ensure_focus(&mut self) {
        let forms = self.forms();
        if self.focus.is_some_and(|f| forms.contains(&f)) {
            return;
        }
        self.focus = forms.first().copied();
        if self.focus.is_none() && self.mode == Mode::Insert {
            self.mode = Mode::Normal;
        }
    }

    pub fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.cycle_focus(-1);
    }

    fn cycle_focus(&mut self, step: isize) {
        let forms = self.forms();
        if forms.is_empty() {
            return;
        }
        let len = forms.len() as isize;
        let current = self
            .focus
            .and_then(|f| forms.iter().position(|&n| n == f))
            .map_or(0, |i| i as isize);
        let next = (current + step).rem_euclid(len) as usize;
        self.focus = Some(forms[next]);
        self.doc.focus(forms[next]);
    }

    pub fn focus_form(&mut self, input: NodeId) {
        if self.integrator.binding(input).is_some() {
            self.focus = Some(input);
            self.doc.focus(input);
        }
    }

    /// Clicks the `index`-th (0-based) control of the focused toolbar.
    /// Returns the new prettify value when the click asks for a format switch.
    pub fn click_control(&mut self, index: usize) -> Option<bool> {
        let input = self.focus?;
        let node = *self
            .integrator
            .toolbar_controls(&self.doc, input)
            .get(index)?;
        self.click_node(node)
    }

    /// Routes a click on an integrator-rendered node.
    pub fn click_node(&mut self, node: NodeId) -> Option<bool> {
        match self.integrator.click_node(&mut self.doc, node) {
            ClickOutcome::Toolbar { input, .. } => {
                self.focus = Some(input);
                None
            }
            ClickOutcome::SettingsOpened(_) => {
                self.mode = Mode::Settings;
                None
            }
            ClickOutcome::SettingsClosed(_) => {
                self.mode = Mode::Normal;
                None
            }
            ClickOutcome::PrettifyRequested(enabled) => Some(enabled),
            ClickOutcome::Unhandled => None,
        }
    }

    /// Opens (or closes) the settings dropdown of the focused form.
    pub fn toggle_settings(&mut self) -> Option<bool> {
        let button = self
            .focus
            .and_then(|input| self.integrator.settings_button_for(&self.doc, input));
        match button {
            Some(button) => self.click_node(button),
            None => {
                self.status = Some("this form has no settings button".to_owned());
                None
            }
        }
    }

    /// Clicks the prettify toggle in the open dropdown.
    pub fn click_prettify_toggle(&mut self) -> Option<bool> {
        let dropdown = self.integrator.open_dropdown()?;
        let toggle = self
            .doc
            .find(dropdown, |doc, n| doc.has_class(n, "cc-prettify-toggle"))?;
        self.click_node(toggle)
    }

    /// Applies a format switch that has already been persisted.
    pub fn apply_prettify(&mut self, enabled: bool) {
        let rewritten = self.integrator.set_prettify(&mut self.doc, enabled);
        info!(enabled, rewritten = rewritten.len(), "prettify switched");
        self.status = Some(format!("prettify {}", if enabled { "on" } else { "off" }));
    }

    /// Navigates to `page` through the history, like a client-side route change.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        self.show(page);
        self.history.push_state(page.path());
    }

    /// Goes one history entry back.
    pub fn back(&mut self) {
        let Some(page) = self.history.back().and_then(Page::from_path) else {
            self.status = Some("no earlier page".to_owned());
            return;
        };
        self.show(page);
    }

    fn show(&mut self, page: Page) {
        pages::build(&mut self.doc, page);
        self.page = page;
        self.focus = None;
        self.form_scroll = 0;
        if self.mode != Mode::HelpOverlay {
            self.mode = Mode::Normal;
        }
    }

    /// Opens a reply form at the bottom of the page. It gets its toolbar on
    /// the next scan, like any late-rendered form.
    pub fn open_reply(&mut self) {
        self.replies += 1;
        pages::add_reply(&mut self.doc, self.replies);
    }

    /// Removes the focused form from the page.
    pub fn discard_focused(&mut self) {
        let Some(input) = self.focus else {
            return;
        };
        let root = pages::form_root(&self.doc, input);
        self.doc.remove(root);
        self.focus = None;
        self.ensure_focus();
    }

    /// Applies an edit to the focused comment body.
    pub fn edit(&mut self, edit: Edit) {
        let Some(input) = self.focus else {
            return;
        };
        let mut text = self.doc.value(input).to_owned();
        let mut cursor = self.doc.cursor(input);
        match edit {
            Edit::Insert(c) => {
                text.insert(cursor, c);
                cursor += c.len_utf8();
            }
            Edit::Backspace => {
                if let Some(c) = text[..cursor].chars().next_back() {
                    cursor -= c.len_utf8();
                    text.remove(cursor);
                }
            }
            Edit::Delete => {
                if cursor < text.len() {
                    text.remove(cursor);
                }
            }
            Edit::Left => {
                cursor -= text[..cursor].chars().next_back().map_or(0, char::len_utf8);
            }
            Edit::Right => {
                cursor += text[cursor..].chars().next().map_or(0, char::len_utf8);
            }
            Edit::Home => {
                cursor = text[..cursor].rfind('\n').map_or(0, |i| i + 1);
            }
            Edit::End => {
                cursor = text[cursor..].find('\n').map_or(text.len(), |i| cursor + i);
            }
        }
        self.doc.set_value(input, text, cursor);
    }

    /// Every form with a non-empty body, as (heading, body).
    pub fn drafts(&self) -> Vec<(String, String)> {
        self.forms()
            .into_iter()
            .map(|n| (pages::describe(&self.doc, n), self.doc.value(n).to_owned()))
            .filter(|(_, body)| !body.trim().is_empty())
            .collect()
    }

    pub fn has_drafts(&self) -> bool {
        !self.drafts().is_empty()
    }

    /// Topmost hit target under a screen position.
    pub fn hit(&self, x: u16, y: u16) -> Option<HitTarget> {
        let pos = ratatui::layout::Position { x, y };
        self.hitboxes
            .iter()
            .rev()
            .find(|h| h.area.contains(pos))
            .map(|h| h.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccbar_core::labels::CommentType;
    use ccbar_core::rescan::{spawn_scheduler, RescanConfig};
    use pretty_assertions::assert_eq;

    async fn state() -> (AppState, tokio::sync::mpsc::UnboundedReceiver<RescanTrigger>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (triggers, _task) =
            spawn_scheduler(RescanConfig::default(), move |t| tx.send(t).is_ok());
        let mut state = AppState::new(false, IdAllocator::new(), triggers);
        state.scan(RescanTrigger::Initial);
        (state, rx)
    }

    #[tokio::test]
    async fn first_scan_focuses_the_first_form() {
        let (state, _rx) = state().await;
        assert_eq!(state.forms().len(), 2);
        assert_eq!(state.focus, state.forms().first().copied());
    }

    #[tokio::test]
    async fn number_keys_click_toolbar_controls() {
        let (mut state, _rx) = state().await;
        state.focus_next();
        let input = state.focus.unwrap();
        assert_eq!(state.doc.value(input), "");

        // Third type button: suggestion.
        assert_eq!(state.click_control(2), None);
        assert_eq!(
            state.doc.value(input),
            format!("{}: ", CommentType::Suggestion.label())
        );
    }

    #[tokio::test]
    async fn editing_respects_char_boundaries() {
        let (mut state, _rx) = state().await;
        state.focus_next();
        let input = state.focus.unwrap();
        for c in "héé".chars() {
            state.edit(Edit::Insert(c));
        }
        state.edit(Edit::Left);
        state.edit(Edit::Backspace);
        assert_eq!(state.doc.value(input), "hé");
        state.edit(Edit::Home);
        state.edit(Edit::Delete);
        assert_eq!(state.doc.value(input), "é");
        state.edit(Edit::End);
        state.edit(Edit::Insert('\n'));
        state.edit(Edit::Insert('x'));
        assert_eq!(state.doc.value(input), "é\nx");
        assert_eq!(state.doc.cursor(input), "é\nx".len());
    }

    #[tokio::test]
    async fn settings_toggle_requests_the_opposite_format() {
        let (mut state, _rx) = state().await;
        assert_eq!(state.toggle_settings(), None);
        assert_eq!(state.mode, Mode::Settings);
        assert_eq!(state.click_prettify_toggle(), Some(true));

        state.apply_prettify(true);
        assert!(state.integrator.prettify());
        assert_eq!(state.toggle_settings(), None);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn navigation_rebuilds_the_page_and_notifies_the_scheduler() {
        let (mut state, mut rx) = state().await;
        state.navigate(Page::Files);
        assert_eq!(rx.recv().await, Some(RescanTrigger::Navigation));
        assert_eq!(state.focus, None);
        state.scan(RescanTrigger::Navigation);
        assert_eq!(state.forms().len(), 2);

        state.back();
        assert_eq!(state.page, Page::Conversation);
        assert_eq!(state.history.current(), Page::Conversation.path());
    }

    #[tokio::test]
    async fn replies_need_a_scan_and_drafts_skip_empty_bodies() {
        let (mut state, _rx) = state().await;
        state.doc.take_mutations();
        state.open_reply();
        assert!(state.observe_mutations());
        state.scan(RescanTrigger::DomMutation);
        assert!(!state.observe_mutations());
        assert_eq!(state.forms().len(), 3);

        let drafts = state.drafts();
        assert_eq!(drafts.len(), 1, "only the prefilled edit box has text");
        assert!(state.has_drafts());

        state.focus = state.forms().last().copied();
        state.discard_focused();
        state.scan(RescanTrigger::Timer);
        assert_eq!(state.forms().len(), 2);
    }
}
