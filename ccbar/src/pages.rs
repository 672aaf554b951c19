//! Review pages hosted by the terminal front end.
//!
//! Each page is an in-memory [`Document`] laid out like the corresponding
//! pull-request screen: the same containers, toolbars, and textarea attributes
//! that the integrator looks for. Navigating rebuilds the page body in place,
//! the way a single-page app swaps its content without a reload.

use ccbar_core::host::dom::Document;
use ccbar_core::host::matchers::{self, Selector};
use ccbar_core::host::{HostPage, NodeId};

/// The screens the front end can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Conversation,
    Files,
    Commit,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Conversation, Page::Files, Page::Commit];

    pub fn path(self) -> &'static str {
        match self {
            Page::Conversation => "/pull/1",
            Page::Files => "/pull/1/files",
            Page::Commit => "/commit/9f3c2e1",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Conversation => "Conversation",
            Page::Files => "Files changed",
            Page::Commit => "Commit",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }

    pub fn next(self) -> Self {
        match self {
            Page::Conversation => Page::Files,
            Page::Files => Page::Commit,
            Page::Commit => Page::Conversation,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Page::Conversation => Page::Commit,
            Page::Files => Page::Conversation,
            Page::Commit => Page::Files,
        }
    }
}

/// Replaces the document body with `page`'s content.
pub fn build(doc: &mut Document, page: Page) {
    let body = doc.body();
    doc.clear_children(body);
    match page {
        Page::Conversation => build_conversation(doc, body),
        Page::Files => build_files(doc, body),
        Page::Commit => build_commit(doc, body),
    }
}

fn build_conversation(doc: &mut Document, body: NodeId) {
    let discussion = doc.build(body, "div").class("js-discussion").finish();

    let comment = doc
        .build(discussion, "div")
        .class("timeline-comment")
        .attr("title", "Edit: octocat commented")
        .finish();
    let header = doc
        .build(comment, "div")
        .class("timeline-comment-header")
        .finish();
    doc.build(header, "div").class("ActionBar").finish();
    doc.build(comment, "textarea")
        .attr("aria-label", "Edit comment body")
        .value("question: should this retry on timeout?")
        .finish();

    let form = doc
        .build(body, "form")
        .id("new_comment_form")
        .attr("title", "Add a comment")
        .finish();
    let toolbar = doc.build(form, "markdown-toolbar").finish();
    doc.build(toolbar, "div").class("md-header-controls").finish();
    let container = doc.build(form, "div").class("CommentBox-container").finish();
    doc.build(container, "div")
        .class("CommentBox-placeholder")
        .text("Use Markdown to format your comment")
        .finish();
    doc.build(container, "textarea")
        .attr("name", "comment[body]")
        .attr("placeholder", "Leave a comment")
        .finish();
}

fn build_files(doc: &mut Document, body: NodeId) {
    let review = doc
        .build(body, "form")
        .class("pull-request-review-menu")
        .attr("title", "Finish your review")
        .finish();
    let bar = doc.build(review, "div").class("ActionBar").finish();
    doc.build(bar, "div").class("ActionBar-item-container").finish();
    doc.build(review, "textarea")
        .id("pull_request_review_body_1")
        .attr("name", "pull_request_review[body]")
        .finish();

    let thread = doc
        .build(body, "div")
        .class("review-thread")
        .attr("title", "src/scheduler.rs line 42")
        .finish();
    doc.build(thread, "div").class("md-header").finish();
    let wrapper = doc
        .build(thread, "div")
        .class("comment-form-textarea-wrapper")
        .finish();
    doc.build(wrapper, "textarea")
        .attr("aria-label", "Reply to this comment thread")
        .value("nitpick(non-blocking): prefer `Duration::from_secs` here")
        .finish();
}

fn build_commit(doc: &mut Document, body: NodeId) {
    let form = doc
        .build(body, "form")
        .class("commit-comment-form")
        .attr("title", "Comment on this commit")
        .finish();
    doc.build(form, "markdown-toolbar").finish();
    doc.build(form, "textarea").id("new_commit_comment_field").finish();

    let description = doc
        .build(body, "div")
        .class("commit-desc")
        .attr("title", "Commit description")
        .finish();
    doc.build(description, "textarea")
        .id("commit-description-textarea")
        .finish();
}

/// Appends a reply form the way the page does when "Reply" is clicked.
pub fn add_reply(doc: &mut Document, number: usize) -> NodeId {
    let body = doc.body();
    let reply = doc
        .build(body, "div")
        .class("review-thread-reply")
        .finish();
    let form = doc
        .build(reply, "form")
        .attr("title", &format!("Reply #{number}"))
        .finish();
    let bar = doc.build(form, "markdown-toolbar").finish();
    doc.build(bar, "div").class("md-header-controls").finish();
    doc.build(form, "textarea")
        .attr("name", "comment[body]")
        .finish()
}

/// Element removed when the form around `input` is discarded.
pub fn form_root(doc: &Document, input: NodeId) -> NodeId {
    matchers::closest(doc, input, Selector::Class("review-thread-reply"))
        .or_else(|| matchers::closest(doc, input, Selector::Tag("form")))
        .or_else(|| doc.parent(input))
        .unwrap_or(input)
}

/// Human-readable heading for the form holding `input`.
pub fn describe(doc: &Document, input: NodeId) -> String {
    let mut current = Some(input);
    while let Some(node) = current {
        if let Some(title) = doc.attribute(node, "title") {
            return title.to_owned();
        }
        current = doc.parent(node);
    }
    doc.attribute(input, "aria-label")
        .or_else(|| doc.attribute(input, "id"))
        .or_else(|| doc.attribute(input, "name"))
        .unwrap_or("comment")
        .to_owned()
}
