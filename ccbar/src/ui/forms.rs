//! Comment form list renderer.
//!
//! Every input that carries a toolbar is drawn as a bordered block: the
//! toolbar strip on top, then the comment body. The focused form gets a thick
//! border and, in insert mode, the terminal cursor. Forms that do not fit are
//! scrolled away so the focused one always stays visible.

use ccbar_core::host::{HostPage, NodeId};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use crate::app::{AppState, HitTarget, Hitbox, Mode};
use crate::pages;
use crate::theme::Theme;
use crate::ui::layout::{form_block, inner_rect};
use crate::ui::toolbar::{layout_toolbar, ToolbarLines};

/// Body rows shown per form before the text is clipped.
const MAX_BODY_ROWS: u16 = 8;
const SETTINGS_LABEL: &str = "[⚙]";

struct FormView {
    input: NodeId,
    toolbar: ToolbarLines,
    body_rows: u16,
}

impl FormView {
    fn height(&self) -> u16 {
        self.toolbar.height() + self.body_rows + 2
    }
}

/// Renders every bound form into `area`, recording hit boxes for toolbar
/// controls, settings buttons, and form bodies.
pub fn render_forms(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let forms = state.forms();
    if forms.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "No comment forms on this page. Press n to open a reply.",
            Style::default().fg(theme.body_placeholder),
        )));
        frame.render_widget(hint, area);
        return;
    }

    let inner_width = inner_rect(Rect::new(0, 0, area.width, 3)).width;
    let views: Vec<FormView> = forms
        .iter()
        .map(|&input| {
            let lines = state.doc.value(input).split('\n').count() as u16;
            FormView {
                input,
                toolbar: layout_toolbar(&state.doc, &state.integrator, input, inner_width, theme),
                body_rows: lines.clamp(1, MAX_BODY_ROWS),
            }
        })
        .collect();

    let focused = state
        .focus
        .and_then(|f| views.iter().position(|v| v.input == f))
        .unwrap_or(0);
    state.form_scroll = scroll_to_show(&views, state.form_scroll, focused, area.height);

    let mut y = area.y;
    for (index, view) in views.iter().enumerate().skip(state.form_scroll) {
        if y >= area.bottom() {
            break;
        }
        let height = view.height().min(area.bottom() - y);
        let rect = Rect::new(area.x, y, area.width, height);
        render_form(frame, rect, view, index == focused, state, theme);
        y += height;
    }
}

/// First form index to draw so that `focused` is fully on screen.
fn scroll_to_show(views: &[FormView], scroll: usize, focused: usize, height: u16) -> usize {
    let mut scroll = scroll.min(focused);
    while scroll < focused {
        let used: u16 = views[scroll..=focused].iter().map(FormView::height).sum();
        if used <= height {
            break;
        }
        scroll += 1;
    }
    scroll
}

fn render_form(
    frame: &mut Frame,
    area: Rect,
    view: &FormView,
    is_focused: bool,
    state: &mut AppState,
    theme: &Theme,
) {
    let input = view.input;
    state.hitboxes.push(Hitbox {
        area,
        target: HitTarget::Form(input),
    });
    let title = format!(" {} ", pages::describe(&state.doc, input));
    let mut block = form_block(title, is_focused, theme);

    let settings = state.integrator.settings_button_for(&state.doc, input);
    if let Some(button) = settings {
        let open = state.mode == Mode::Settings
            && state
                .integrator
                .open_dropdown()
                .and_then(|d| state.doc.parent(d))
                .is_some_and(|item| state.doc.children(item).contains(&button));
        let style = Style::default().fg(theme.settings_button);
        block = block.title_top(
            Line::from(Span::styled(
                SETTINGS_LABEL,
                if open { style.add_modifier(Modifier::REVERSED) } else { style },
            ))
            .right_aligned(),
        );
        let width = SETTINGS_LABEL.chars().count() as u16;
        if area.width > width + 2 {
            state.hitboxes.push(Hitbox {
                area: Rect::new(area.right() - width - 1, area.y, width, 1),
                target: HitTarget::Control(button),
            });
        }
    }

    let inner = inner_rect(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let toolbar_area = Rect {
        height: view.toolbar.height().min(inner.height),
        ..inner
    };
    frame.render_widget(Paragraph::new(view.toolbar.lines.clone()), toolbar_area);
    for (rect, node) in view.toolbar.hit_rects(toolbar_area) {
        state.hitboxes.push(Hitbox {
            area: rect,
            target: HitTarget::Control(node),
        });
    }

    let body_area = Rect {
        y: toolbar_area.bottom(),
        height: inner.height - toolbar_area.height,
        ..inner
    };
    if body_area.height == 0 {
        return;
    }

    let value = state.doc.value(input);
    let (text, row_offset) = if value.is_empty() {
        let placeholder = state.doc.attribute(input, "placeholder").unwrap_or("");
        (
            Text::from(Span::styled(
                placeholder.to_owned(),
                Style::default().fg(theme.body_placeholder),
            )),
            0,
        )
    } else {
        let (row, _) = cursor_position(value, state.doc.cursor(input));
        let offset = (row + 1).saturating_sub(body_area.height);
        (
            Text::styled(value.to_owned(), Style::default().fg(theme.body_text)),
            offset,
        )
    };
    frame.render_widget(Paragraph::new(text).scroll((row_offset, 0)), body_area);

    if is_focused && state.mode == Mode::Insert {
        let (row, col) = cursor_position(value, state.doc.cursor(input));
        let x = body_area.x.saturating_add(col).min(body_area.right().saturating_sub(1));
        let y = body_area.y + row - row_offset;
        frame.set_cursor_position(Position { x, y });
    }
}

/// `(row, column)` of a byte cursor inside `text`, counted in lines and chars.
fn cursor_position(text: &str, cursor: usize) -> (u16, u16) {
    let before = &text[..cursor.min(text.len())];
    let row = before.matches('\n').count() as u16;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = before[line_start..].chars().count() as u16;
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_position_counts_chars_not_bytes() {
        assert_eq!(cursor_position("", 0), (0, 0));
        assert_eq!(cursor_position("héllo", "hé".len()), (0, 2));
        assert_eq!(cursor_position("a\nbc\nd", 4), (1, 2));
    }

    #[test]
    fn scrolling_keeps_the_focused_form_visible() {
        let view = |rows| FormView {
            input: NodeId(0),
            toolbar: ToolbarLines::default(),
            body_rows: rows,
        };
        // Heights: 5, 5, 5, 10.
        let views = vec![view(3), view(3), view(3), view(8)];
        assert_eq!(scroll_to_show(&views, 0, 1, 12), 0);
        assert_eq!(scroll_to_show(&views, 0, 3, 12), 3);
        assert_eq!(scroll_to_show(&views, 0, 2, 12), 1);
        assert_eq!(scroll_to_show(&views, 3, 0, 12), 0);
    }
}
