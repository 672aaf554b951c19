//! Toolbar strip renderer.
//!
//! Draws the children of a toolbar element exactly as the integrator left
//! them in the page: button text comes from the node text, highlight state from
//! the `cc-*-highlight` classes. Each clickable control gets a number key
//! (`1`..`9`) and a hit box.

use ccbar_core::host::dom::Document;
use ccbar_core::host::integrator::Integrator;
use ccbar_core::host::{HostPage, NodeId};
use ccbar_core::labels::{CommentType, Decoration};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::theme::{hex_color, Theme};

/// A toolbar laid out for a given width, wrapped onto as many rows as needed.
#[derive(Debug, Default)]
pub struct ToolbarLines {
    pub lines: Vec<Line<'static>>,
    /// `(row, column, width, node)` relative to the strip's top-left corner.
    pub hits: Vec<(u16, u16, u16, NodeId)>,
}

impl ToolbarLines {
    pub fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    /// Hit rectangles translated to absolute screen space, clipped to `area`.
    pub fn hit_rects(&self, area: Rect) -> impl Iterator<Item = (Rect, NodeId)> + '_ {
        self.hits.iter().filter_map(move |&(row, col, width, node)| {
            (row < area.height).then(|| {
                let rect = Rect::new(area.x + col, area.y + row, width, 1).intersection(area);
                (rect, node)
            })
        })
    }
}

/// Lays out the toolbar of `input` for a strip `width` cells wide.
pub fn layout_toolbar(
    doc: &Document,
    integrator: &Integrator,
    input: NodeId,
    width: u16,
    theme: &Theme,
) -> ToolbarLines {
    let mut out = ToolbarLines::default();
    let Some(binding) = integrator.binding(input) else {
        return out;
    };
    let controls = integrator.toolbar_controls(doc, input);

    let mut row: Vec<Span<'static>> = Vec::new();
    let mut col: u16 = 0;
    for node in doc.children(binding.element) {
        let mut spans = Vec::with_capacity(2);
        if let Some(index) = controls.iter().position(|&c| c == node) {
            if index < 9 {
                spans.push(Span::styled(
                    format!("{}", index + 1),
                    Style::default()
                        .fg(theme.toolbar_separator)
                        .add_modifier(Modifier::DIM),
                ));
            }
        }
        spans.push(control_span(doc, node, theme));
        let item_width: u16 = spans.iter().map(|s| s.width() as u16).sum();

        if col > 0 && col + item_width > width {
            out.lines.push(Line::from(std::mem::take(&mut row)));
            col = 0;
        }
        if controls.contains(&node) {
            out.hits
                .push((out.lines.len() as u16, col, item_width, node));
        }
        row.extend(spans);
        row.push(Span::raw(" "));
        col += item_width + 1;
    }
    if !row.is_empty() {
        out.lines.push(Line::from(row));
    }
    out
}

/// Styles one toolbar node from its classes and label color.
fn control_span(doc: &Document, node: NodeId, theme: &Theme) -> Span<'static> {
    let text = doc.text(node);
    if doc.has_class(node, "cc-separator") {
        return Span::styled(text.to_owned(), Style::default().fg(theme.toolbar_separator));
    }

    let color = label_color(text);
    let highlighted = doc.has_class(node, "cc-type-selected-highlight")
        || doc.has_class(node, "cc-decoration-selected-highlight")
        || doc.has_class(node, "cc-selected-type-label");
    let style = if highlighted {
        Style::default()
            .bg(color)
            .fg(theme.toolbar_highlight_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    Span::styled(format!(" {text} "), style)
}

fn label_color(text: &str) -> Color {
    text.parse::<CommentType>()
        .map(CommentType::color)
        .or_else(|_| text.parse::<Decoration>().map(Decoration::color))
        .map_or(Color::Reset, hex_color)
}
