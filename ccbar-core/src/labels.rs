//! Registry of conventional-comment types and decorations.
//!
//! Both sets are closed: the codec only ever recognizes words drawn from these
//! tables, so free-form text like `note: ...` is never mistaken for a prefix.
//! Colors are hex strings without the leading `#`, ready to drop into a badge URL.

use std::fmt;
use std::str::FromStr;

/// The kind of a review comment, rendered as the leading label of the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentType {
    Praise,
    Nitpick,
    Suggestion,
    Issue,
    Question,
    Thought,
    Chore,
}

impl CommentType {
    /// All comment types in toolbar order.
    pub const ALL: [CommentType; 7] = [
        CommentType::Praise,
        CommentType::Nitpick,
        CommentType::Suggestion,
        CommentType::Issue,
        CommentType::Question,
        CommentType::Thought,
        CommentType::Chore,
    ];

    /// The lowercase word written into the comment body.
    pub fn label(self) -> &'static str {
        match self {
            CommentType::Praise => "praise",
            CommentType::Nitpick => "nitpick",
            CommentType::Suggestion => "suggestion",
            CommentType::Issue => "issue",
            CommentType::Question => "question",
            CommentType::Thought => "thought",
            CommentType::Chore => "chore",
        }
    }

    /// One-line tooltip text shown next to the toolbar button.
    pub fn description(self) -> &'static str {
        match self {
            CommentType::Praise => "Highlight something positive.",
            CommentType::Nitpick => "Minor, non-blocking issues (style, naming...).",
            CommentType::Suggestion => "Suggest specific improvements.",
            CommentType::Issue => "Point out a blocking problem.",
            CommentType::Question => "Ask for clarification.",
            CommentType::Thought => "Share a reflection or idea.",
            CommentType::Chore => "Request a minor, non-code task.",
        }
    }

    /// Badge color as six hex digits, no `#`.
    pub fn color(self) -> &'static str {
        match self {
            CommentType::Praise => "28A745",
            CommentType::Nitpick => "F59E0B",
            CommentType::Suggestion => "3B82F6",
            CommentType::Issue => "EF4444",
            CommentType::Question => "8B5CF6",
            CommentType::Thought => "6B7280",
            CommentType::Chore => "F97316",
        }
    }
}

/// A qualifier attached to a comment type, e.g. `issue(blocking)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoration {
    NonBlocking,
    Blocking,
    IfMinor,
}

impl Decoration {
    /// All decorations in toolbar order.
    pub const ALL: [Decoration; 3] = [
        Decoration::NonBlocking,
        Decoration::Blocking,
        Decoration::IfMinor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Decoration::NonBlocking => "non-blocking",
            Decoration::Blocking => "blocking",
            Decoration::IfMinor => "if-minor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Decoration::NonBlocking => "Optional change, doesn't block merge.",
            Decoration::Blocking => "Must be addressed before merge.",
            Decoration::IfMinor => "Address if the effort is small.",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Decoration::NonBlocking => "9CA3AF",
            Decoration::Blocking => "374151",
            Decoration::IfMinor => "14B8A6",
        }
    }
}

/// Returned when a word is not part of the closed label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown conventional-comment label '{}'", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for CommentType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommentType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_owned()))
    }
}

impl FromStr for Decoration {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decoration::ALL
            .into_iter()
            .find(|d| d.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_owned()))
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
