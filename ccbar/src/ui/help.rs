//! Help overlay and quit dialog renderers for ccbar.
//!
//! Both are modals drawn over the form list using ratatui's `Clear` widget to
//! erase the background first, inside the same `terminal.draw()` closure as
//! everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal.
///
/// The paragraph scrolls vertically by `help_scroll` rows, so the full key
/// list stays reachable on short terminals. Skipped below 60 columns to avoid
/// a zero-height `Rect`.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  · j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Toolbar"),
        Line::from("  1-9           Click the numbered toolbar control"),
        Line::from("  s             Open / close the settings dropdown"),
        Line::from("  p             Switch between badge and plain prefixes"),
        Line::from(""),
        Line::from("Forms"),
        Line::from("  Tab / S-Tab   Focus next / previous form"),
        Line::from("  i / Enter     Edit the focused comment"),
        Line::from("  Esc           Leave insert mode"),
        Line::from("  n             Open a new reply form"),
        Line::from("  x             Discard the focused form"),
        Line::from(""),
        Line::from("Pages"),
        Line::from("  [ / ]         Previous / next page"),
        Line::from("  -             Go back in history"),
        Line::from(""),
        Line::from("Mouse"),
        Line::from("  Click         Toolbar buttons, settings, tabs, forms"),
        Line::from("  Wheel         Move form focus"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q             Quit (drafts are printed to stdout)"),
    ])
}

/// Renders the quit confirmation shown while drafts exist.
pub fn render_confirm_quit(frame: &mut Frame, theme: &Theme, drafts: usize) {
    let area = frame
        .area()
        .centered(Constraint::Length(44), Constraint::Length(5));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Quit? ")
        .border_style(Style::default().fg(theme.border_active));
    let noun = if drafts == 1 { "draft" } else { "drafts" };
    let body = Text::from(vec![
        Line::from(format!("{drafts} {noun} will be printed on exit.")).centered(),
        Line::from(""),
        Line::from("y quit · n stay").centered(),
    ]);
    frame.render_widget(Paragraph::new(body).block(block), area);
}
