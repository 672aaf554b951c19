//! Settings dropdown renderer.
//!
//! The dropdown lives in the page as children of the settings item the
//! integrator injected; this draws whatever label and toggle nodes it holds as
//! a small modal and records hit boxes for its body and the toggle.

use ccbar_core::host::HostPage;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

use crate::app::{AppState, HitTarget, Hitbox};
use crate::theme::Theme;

/// Draws the open settings dropdown, if any, centred over the forms.
pub fn render_settings(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let Some(dropdown) = state.integrator.open_dropdown() else {
        return;
    };
    if !state.doc.is_connected(dropdown) {
        return;
    }

    let area = frame
        .area()
        .centered(Constraint::Length(36), Constraint::Length(5));
    frame.render_widget(Clear, area);

    let mut spans = Vec::new();
    let mut toggle = None;
    let mut col = area.x + 1;
    for node in state.doc.children(dropdown) {
        let text = state.doc.text(node).to_owned();
        let span = if state.doc.has_class(node, "cc-prettify-toggle") {
            let on = state.doc.attribute(node, "aria-pressed") == Some("true");
            let color = if on { theme.toggle_on } else { theme.toggle_off };
            let label = format!("[ {text} ]");
            toggle = Some((node, col, label.chars().count() as u16));
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(format!("{text}  "))
        };
        col += span.width() as u16;
        spans.push(span);
    }

    let block = Block::bordered()
        .title(" Settings ")
        .title_bottom(Line::from(" Enter toggle · Esc close ").centered())
        .border_style(Style::default().fg(theme.border_active));
    let body = vec![Line::raw(""), Line::from(spans)];
    frame.render_widget(Paragraph::new(body).block(block), area);

    // Covers the toolbar buttons drawn underneath; the toggle box wins on top.
    state.hitboxes.push(Hitbox {
        area,
        target: HitTarget::Dropdown,
    });
    if let Some((node, x, width)) = toggle {
        let row = area.y + 2;
        if row < area.bottom() {
            state.hitboxes.push(Hitbox {
                area: Rect::new(x, row, width, 1).intersection(area),
                target: HitTarget::Control(node),
            });
        }
    }
}
