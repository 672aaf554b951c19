//! Host integration layer.
//!
//! The review page is an external collaborator: everything here talks to it
//! through [`HostPage`], a handful of DOM-like primitives. [`dom::Document`]
//! is the in-memory implementation used by the terminal front end and the
//! tests; [`integrator::Integrator`] does the discovery and attachment work on
//! top of any implementation.

pub mod dom;
pub mod history;
pub mod integrator;
pub mod matchers;

/// Identity of an element on the host page.
///
/// Ids are never reused within one page, so a removed element's id stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Notifications dispatched on a bound input after it is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    Input,
    Change,
}

/// Minimal element-tree surface the integrator needs from the host page.
///
/// Reads on a node that no longer exists return empty values rather than
/// failing; the integrator treats such nodes as gone.
pub trait HostPage {
    /// Every `textarea` currently attached to the page, in document order.
    fn text_inputs(&self) -> Vec<NodeId>;

    fn tag(&self, node: NodeId) -> Option<&str>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;
    /// `true` while the node is reachable from the page root.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;
    /// Inserts `node` as the sibling immediately before `reference`.
    fn insert_before(&mut self, reference: NodeId, node: NodeId);
    fn append_child(&mut self, parent: NodeId, node: NodeId);
    /// Removes `node` and its subtree from the page.
    fn remove(&mut self, node: NodeId);
    fn clear_children(&mut self, node: NodeId);
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Editable value of an input; empty for anything else.
    fn value(&self, node: NodeId) -> &str;
    /// Replaces an input's value and collapses its selection to `cursor`.
    fn set_value(&mut self, node: NodeId, value: String, cursor: usize);
    fn dispatch(&mut self, node: NodeId, event: DomEventKind);
    fn focus(&mut self, node: NodeId);
}
