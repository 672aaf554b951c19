//! Per-text-area toolbar state machine.
//!
//! A [`Toolbar`] owns the selection for exactly one bound comment buffer and
//! drives [`crate::codec::apply`] whenever the selection changes. The buffer is
//! reached through the [`CommentBuffer`] trait so the same machine runs against
//! the in-memory document, a terminal text area, or a plain string in tests.
//!
//! ```text
//!   Initial --type T--> TypeSelected --label--> ChoosingType
//!      ^                  |    ^                     |
//!      |                  | decoration D            | type T (T != active)
//!      |                  +----+                     |
//!      +--------------- type T (T == active) --------+
//! ```

use tracing::debug;

use crate::codec;
use crate::labels::{CommentType, Decoration};

/// Edit surface a toolbar is bound to.
pub trait CommentBuffer {
    /// Current contents of the buffer.
    fn contents(&self) -> &str;
    /// Replaces the whole buffer and moves the cursor (byte offset) and selection there.
    fn replace(&mut self, text: String, cursor: usize);
    /// Tells whoever listens on the buffer that its contents changed.
    fn notify_changed(&mut self);
}

/// Which set of controls the toolbar shows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No type chosen; every type button is shown.
    #[default]
    Initial,
    /// A type is active; shows the type label and the decoration buttons.
    TypeSelected,
    /// Type picker re-opened while a type is active.
    ChoosingType,
}

/// Selection owned by one bound text area.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarState {
    pub phase: Phase,
    pub comment_type: Option<CommentType>,
    pub decoration: Option<Decoration>,
}

/// One rendered toolbar control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarItem {
    TypeButton {
        comment_type: CommentType,
        highlighted: bool,
    },
    /// The active type, clicked to re-open the type picker.
    TypeLabel(CommentType),
    Separator,
    DecorationButton {
        decoration: Decoration,
        highlighted: bool,
    },
}

impl ToolbarItem {
    /// Separators are decoration only; everything else reacts to clicks.
    pub fn is_clickable(self) -> bool {
        !matches!(self, ToolbarItem::Separator)
    }

    /// Text shown on the control.
    pub fn text(self) -> &'static str {
        match self {
            ToolbarItem::TypeButton { comment_type, .. } | ToolbarItem::TypeLabel(comment_type) => {
                comment_type.label()
            }
            ToolbarItem::Separator => ">",
            ToolbarItem::DecorationButton { decoration, .. } => decoration.label(),
        }
    }

    /// Tooltip text; empty for the separator.
    pub fn title(self) -> &'static str {
        match self {
            ToolbarItem::TypeButton { comment_type, .. } => comment_type.description(),
            ToolbarItem::TypeLabel(_) => "Click to change type",
            ToolbarItem::Separator => "",
            ToolbarItem::DecorationButton { decoration, .. } => decoration.description(),
        }
    }
}

/// What a toolbar event did, so the host knows how much to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event does not apply in the current phase.
    Ignored,
    /// Only the toolbar controls changed.
    ViewChanged,
    /// The bound buffer was rewritten and a change notification dispatched.
    BufferRewritten,
}

/// Toolbar controller for a single comment buffer.
#[derive(Debug, Clone)]
pub struct Toolbar {
    state: ToolbarState,
    prettify: bool,
}

impl Toolbar {
    /// Creates the toolbar for a buffer holding `contents`, seeding the
    /// selection from any prefix it already carries.
    ///
    /// A recognized prefix starts the toolbar in `TypeSelected` and keeps the
    /// format that prefix was written in; otherwise the toolbar starts in
    /// `Initial` with `default_prettify` (the preference store's current value).
    pub fn attach(contents: &str, default_prettify: bool) -> Self {
        match codec::detect(contents) {
            Some(found) => Self {
                state: ToolbarState {
                    phase: Phase::TypeSelected,
                    comment_type: Some(found.comment_type),
                    decoration: found.decoration,
                },
                prettify: found.prettified,
            },
            None => Self {
                state: ToolbarState::default(),
                prettify: default_prettify,
            },
        }
    }

    pub fn state(&self) -> ToolbarState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn comment_type(&self) -> Option<CommentType> {
        self.state.comment_type
    }

    pub fn decoration(&self) -> Option<Decoration> {
        self.state.decoration
    }

    /// Format used the next time the buffer is rewritten.
    pub fn prettify(&self) -> bool {
        self.prettify
    }

    /// Handles a click on a type button.
    ///
    /// Clicking the active type (only reachable from `ChoosingType`) removes the
    /// prefix and resets to `Initial`; any other type becomes active with no
    /// decoration.
    pub fn click_type(
        &mut self,
        comment_type: CommentType,
        buffer: &mut impl CommentBuffer,
    ) -> Transition {
        if self.state.phase == Phase::TypeSelected {
            return Transition::Ignored;
        }
        self.state = if self.state.comment_type == Some(comment_type) {
            ToolbarState::default()
        } else {
            ToolbarState {
                phase: Phase::TypeSelected,
                comment_type: Some(comment_type),
                decoration: None,
            }
        };
        self.rewrite(buffer)
    }

    /// Handles a click on the active-type label: re-opens the type picker.
    pub fn click_label(&mut self) -> Transition {
        if self.state.phase != Phase::TypeSelected {
            return Transition::Ignored;
        }
        self.state.phase = Phase::ChoosingType;
        Transition::ViewChanged
    }

    /// Handles a click on a decoration button; clicking the active one clears it.
    pub fn click_decoration(
        &mut self,
        decoration: Decoration,
        buffer: &mut impl CommentBuffer,
    ) -> Transition {
        if self.state.phase != Phase::TypeSelected {
            return Transition::Ignored;
        }
        self.state.decoration = if self.state.decoration == Some(decoration) {
            None
        } else {
            Some(decoration)
        };
        self.rewrite(buffer)
    }

    /// Switches between plain and badge format.
    ///
    /// Re-renders the prefix in place when a type is active; leaves the buffer
    /// alone otherwise.
    pub fn set_prettify(&mut self, enabled: bool, buffer: &mut impl CommentBuffer) -> Transition {
        self.prettify = enabled;
        if self.state.comment_type.is_some() {
            self.rewrite(buffer)
        } else {
            Transition::ViewChanged
        }
    }

    /// Dispatches a click on any rendered item.
    pub fn click(&mut self, item: ToolbarItem, buffer: &mut impl CommentBuffer) -> Transition {
        match item {
            ToolbarItem::TypeButton { comment_type, .. } => self.click_type(comment_type, buffer),
            ToolbarItem::TypeLabel(_) => self.click_label(),
            ToolbarItem::Separator => Transition::Ignored,
            ToolbarItem::DecorationButton { decoration, .. } => {
                self.click_decoration(decoration, buffer)
            }
        }
    }

    /// Controls to show for the current phase, in display order.
    pub fn view(&self) -> Vec<ToolbarItem> {
        match (self.state.phase, self.state.comment_type) {
            (Phase::TypeSelected, Some(active)) => {
                let mut items = vec![ToolbarItem::TypeLabel(active), ToolbarItem::Separator];
                items.extend(Decoration::ALL.into_iter().map(|decoration| {
                    ToolbarItem::DecorationButton {
                        decoration,
                        highlighted: self.state.decoration == Some(decoration),
                    }
                }));
                items
            }
            (phase, active) => CommentType::ALL
                .into_iter()
                .map(|comment_type| ToolbarItem::TypeButton {
                    comment_type,
                    highlighted: phase == Phase::ChoosingType && active == Some(comment_type),
                })
                .collect(),
        }
    }

    fn rewrite(&self, buffer: &mut impl CommentBuffer) -> Transition {
        let applied = codec::apply(
            buffer.contents(),
            self.state.comment_type,
            self.state.decoration,
            self.prettify,
        );
        debug!(
            comment_type = ?self.state.comment_type,
            decoration = ?self.state.decoration,
            prettify = self.prettify,
            "rewriting comment prefix"
        );
        buffer.replace(applied.text, applied.cursor);
        buffer.notify_changed();
        Transition::BufferRewritten
    }
}
