//! Structural and attribute matchers used to find things on the host page.
//!
//! A tiny subset of CSS selectors is enough: tag, class, id, and attribute
//! equality / prefix / substring, combined with [`Selector::Any`].

use super::{HostPage, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Tag(&'static str),
    Class(&'static str),
    Id(&'static str),
    IdPrefix(&'static str),
    AttrEquals(&'static str, &'static str),
    AttrContains(&'static str, &'static str),
    /// Matches when any of the inner selectors matches.
    Any(&'static [Selector]),
}

impl Selector {
    pub fn matches(&self, host: &impl HostPage, node: NodeId) -> bool {
        match *self {
            Selector::Tag(tag) => host.tag(node) == Some(tag),
            Selector::Class(class) => host.has_class(node, class),
            Selector::Id(id) => host.attribute(node, "id") == Some(id),
            Selector::IdPrefix(prefix) => host
                .attribute(node, "id")
                .is_some_and(|id| id.starts_with(prefix)),
            Selector::AttrEquals(name, value) => host.attribute(node, name) == Some(value),
            Selector::AttrContains(name, needle) => host
                .attribute(node, name)
                .is_some_and(|v| v.contains(needle)),
            Selector::Any(inner) => inner.iter().any(|s| s.matches(host, node)),
        }
    }
}

/// Attribute patterns that make a `textarea` a review comment input.
pub const COMMENT_INPUT: Selector = Selector::Any(&[
    Selector::AttrContains("aria-label", "comment"),
    Selector::AttrEquals("name", "comment[body]"),
    Selector::AttrEquals("name", "pull_request_review[body]"),
    Selector::Id("new_commit_comment_field"),
    Selector::IdPrefix("pull_request_review_body_"),
    Selector::Id("commit-description-textarea"),
]);

/// The host page's own markdown/action toolbar.
pub const HOST_TOOLBAR: Selector = Selector::Any(&[
    Selector::Tag("markdown-toolbar"),
    Selector::Class("ActionBar"),
]);

pub const TEXTAREA_WRAPPER: Selector = Selector::Class("comment-form-textarea-wrapper");

pub const COMMENT_CONTAINER: Selector = Selector::Any(&[
    Selector::Class("js-comment-container"),
    Selector::Class("timeline-comment"),
]);

pub const COMMENT_HEADER: Selector = Selector::Class("timeline-comment-header");

pub const ACTION_BAR: Selector = Selector::Class("ActionBar");

/// Where the settings button goes inside a host toolbar, newest layout first.
pub const CONTROLS_CONTAINERS: [Selector; 2] = [
    Selector::Class("ActionBar-item-container"),
    Selector::Class("md-header-controls"),
];

pub const COMMENT_BOX_CONTAINER: Selector = Selector::Class("CommentBox-container");

pub const COMMENT_BOX_PLACEHOLDER: Selector = Selector::Class("CommentBox-placeholder");

/// `true` for a `textarea` matching [`COMMENT_INPUT`].
pub fn is_comment_input(host: &impl HostPage, node: NodeId) -> bool {
    Selector::Tag("textarea").matches(host, node) && COMMENT_INPUT.matches(host, node)
}

/// Nearest ancestor of `node` (inclusive) matching `selector`.
pub fn closest(host: &impl HostPage, node: NodeId, selector: Selector) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if selector.matches(host, n) {
            return Some(n);
        }
        current = host.parent(n);
    }
    None
}

/// First descendant of `root` (exclusive) matching `selector`, in document order.
pub fn query(host: &impl HostPage, root: NodeId, selector: Selector) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = host.children(root).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if selector.matches(host, node) {
            return Some(node);
        }
        stack.extend(host.children(node).into_iter().rev());
    }
    None
}

/// `true` when `root` is, or contains, a comment input not yet marked with `marker`.
pub fn contains_unbound_input(host: &impl HostPage, root: NodeId, marker: &str) -> bool {
    let eligible = |n: NodeId| is_comment_input(host, n) && !host.has_class(n, marker);
    eligible(root) || {
        let mut stack = host.children(root);
        let mut found = false;
        while let Some(node) = stack.pop() {
            if eligible(node) {
                found = true;
                break;
            }
            stack.extend(host.children(node));
        }
        found
    }
}

/// Finds the host page's own action toolbar belonging to `input`.
///
/// Tried in order: a toolbar inside the enclosing `form`, the element just
/// before the enclosing textarea wrapper, then the header action bar of the
/// enclosing timeline comment.
pub fn host_toolbar_for(host: &impl HostPage, input: NodeId) -> Option<NodeId> {
    if let Some(bar) =
        closest(host, input, Selector::Tag("form")).and_then(|form| query(host, form, HOST_TOOLBAR))
    {
        return Some(bar);
    }
    if let Some(prev) =
        closest(host, input, TEXTAREA_WRAPPER).and_then(|wrapper| host.previous_sibling(wrapper))
    {
        return Some(prev);
    }
    let container = closest(host, input, COMMENT_CONTAINER)?;
    let header = query(host, container, COMMENT_HEADER)?;
    query(host, header, ACTION_BAR)
}

/// Element inside a host toolbar that extra controls are appended to.
pub fn controls_container(host: &impl HostPage, toolbar: NodeId) -> NodeId {
    CONTROLS_CONTAINERS
        .iter()
        .find_map(|selector| query(host, toolbar, *selector))
        .unwrap_or(toolbar)
}
