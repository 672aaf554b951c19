//! Screen layout for ccbar.
//!
//! This module is pure layout arithmetic plus the two single-row strips (page
//! tabs and status bar). It is called inside `terminal.draw()` on every render
//! so every frame gets a fresh layout that reflects the current terminal size.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, HitTarget, Hitbox, Mode};
use crate::pages::Page;
use crate::theme::Theme;

/// Returns `[tabs, forms, status_bar]` for the current frame.
///
/// The returned rects are valid only for the current draw closure; never store
/// them across frames.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    frame.area().layout(&Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]))
}

/// Returns the inner `Rect` of a bordered block.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds the bordered `Block` around one comment form.
///
/// Applies `BorderType::Thick` when the form has keyboard focus and
/// `BorderType::Plain` otherwise.
pub fn form_block<'a>(title: String, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
}

/// Renders the page tabs on the top row and records one hit box per tab.
pub fn render_tabs(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let mut spans = Vec::with_capacity(Page::ALL.len() * 2);
    let mut x = area.x;
    for page in Page::ALL {
        let label = format!(" {} ", page.title());
        let width = label.chars().count() as u16;
        let style = if page == state.page {
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.tab_inactive)
        };
        if x + width <= area.right() {
            state.hitboxes.push(Hitbox {
                area: Rect::new(x, area.y, width, 1),
                target: HitTarget::Tab(page),
            });
        }
        x = x.saturating_add(width + 1);
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        state.history.current().to_owned(),
        Style::default().fg(theme.tab_inactive),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Always shows a mode indicator. `HelpOverlay` and `ConfirmQuit` display
/// `NORMAL` because they are transient layers over normal mode. Then come the
/// output format, the number of forms carrying a toolbar, what triggered the
/// last scan, and the latest status message.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Settings => (" SETTINGS ", theme.status_mode_normal),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let prettify = state.integrator.prettify();
    let mut spans = vec![
        Span::styled(
            mode_text,
            Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            if prettify { "badges" } else { "plain" },
            Style::default().fg(if prettify { theme.toggle_on } else { theme.toggle_off }),
        ),
        Span::raw(format!("  {} forms", state.forms().len())),
    ];
    if let Some(trigger) = state.last_scan {
        spans.push(Span::raw(format!("  scan: {trigger:?}")));
    }
    if let Some(status) = &state.status {
        spans.push(Span::raw(format!("  {status}")));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
