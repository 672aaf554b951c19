//! In-memory element tree implementing [`HostPage`].
//!
//! Models just enough of a browser document for the integrator: tags,
//! attributes, classes, text, input values with a cursor, focus, dispatched
//! events, and mutation records for subtree insertions and removals. Removing
//! an element drops its whole subtree, so stale ids simply stop resolving.

use std::collections::{BTreeMap, HashMap};

use super::{DomEventKind, HostPage, NodeId};

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
    value: String,
    cursor: usize,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            text: String::new(),
            value: String::new(),
            cursor: 0,
        }
    }
}

/// A subtree change observed on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// `node` (with its subtree) was attached under a connected parent.
    Inserted(NodeId),
    /// `node` was detached; its id no longer resolves.
    Removed(NodeId),
}

/// An event dispatched on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub target: NodeId,
    pub kind: DomEventKind,
}

/// The page: a tree rooted at `body`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Element>,
    body: NodeId,
    next_id: u64,
    mutations: Vec<MutationRecord>,
    events: Vec<DomEvent>,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty page with only a `body` element.
    pub fn new() -> Self {
        let body = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Element::new("body"));
        Self {
            nodes,
            body,
            next_id: 1,
            mutations: Vec::new(),
            events: Vec::new(),
            focused: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Starts building a new element appended under `parent`.
    pub fn build(&mut self, parent: NodeId, tag: &str) -> ElementBuilder<'_> {
        let node = self.create_element(tag);
        ElementBuilder {
            doc: self,
            parent,
            node,
        }
    }

    /// Drains the mutation records collected since the last call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Drains the events dispatched since the last call.
    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Cursor (byte offset) of an input, 0 for unknown nodes.
    pub fn cursor(&self, node: NodeId) -> usize {
        self.nodes.get(&node).map_or(0, |e| e.cursor)
    }

    /// Moves an input's cursor, clamped to a char boundary inside the value.
    pub fn set_cursor(&mut self, node: NodeId, cursor: usize) {
        if let Some(e) = self.nodes.get_mut(&node) {
            let mut cursor = cursor.min(e.value.len());
            while !e.value.is_char_boundary(cursor) {
                cursor -= 1;
            }
            e.cursor = cursor;
        }
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(&node).map_or("", |e| e.text.as_str())
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(&node)
            .map(|e| e.classes.as_slice())
            .unwrap_or(&[])
    }

    /// First connected descendant of `root` (inclusive) satisfying `pred`, depth first.
    pub fn find(&self, root: NodeId, pred: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if pred(self, node) {
                return Some(node);
            }
            if let Some(e) = self.nodes.get(&node) {
                stack.extend(e.children.iter().rev().copied());
            }
        }
        None
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(e) = self.nodes.get(&node) {
                stack.extend(e.children.iter().rev().copied());
            }
        }
        out
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|e| e.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != node);
        }
    }

    fn record_insert(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.mutations.push(MutationRecord::Inserted(node));
        }
    }
}

impl HostPage for Document {
    fn text_inputs(&self) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|n| self.tag(*n) == Some("textarea"))
            .collect()
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.nodes.get_mut(&node) {
            e.attrs.insert(name.to_owned(), value.to_owned());
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.nodes.get_mut(&node) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_owned());
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|e| e.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = &self.nodes.get(&self.parent(node)?)?.children;
        let index = siblings.iter().position(|&c| c == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.body {
                return true;
            }
            current = self.nodes.get(&n).and_then(|e| e.parent);
        }
        false
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node, Element::new(tag));
        node
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(node);
        let Some(p) = self.nodes.get_mut(&parent) else {
            return;
        };
        let index = p
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(p.children.len());
        p.children.insert(index, node);
        if let Some(e) = self.nodes.get_mut(&node) {
            e.parent = Some(parent);
        }
        self.record_insert(node);
    }

    fn append_child(&mut self, parent: NodeId, node: NodeId) {
        if !self.nodes.contains_key(&parent) {
            return;
        }
        self.detach(node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(node);
        }
        if let Some(e) = self.nodes.get_mut(&node) {
            e.parent = Some(parent);
        }
        self.record_insert(node);
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body || !self.nodes.contains_key(&node) {
            return;
        }
        let was_connected = self.is_connected(node);
        self.detach(node);
        for n in self.descendants(node) {
            self.nodes.remove(&n);
            if self.focused == Some(n) {
                self.focused = None;
            }
        }
        if was_connected {
            self.mutations.push(MutationRecord::Removed(node));
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(e) = self.nodes.get_mut(&node) {
            e.text = text.to_owned();
        }
    }

    fn value(&self, node: NodeId) -> &str {
        self.nodes.get(&node).map_or("", |e| e.value.as_str())
    }

    fn set_value(&mut self, node: NodeId, value: String, cursor: usize) {
        if let Some(e) = self.nodes.get_mut(&node) {
            e.value = value;
        }
        self.set_cursor(node, cursor);
    }

    fn dispatch(&mut self, node: NodeId, kind: DomEventKind) {
        self.events.push(DomEvent { target: node, kind });
    }

    fn focus(&mut self, node: NodeId) {
        if self.nodes.contains_key(&node) {
            self.focused = Some(node);
        }
    }
}

/// Fluent construction of one element; [`ElementBuilder::finish`] attaches it.
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    parent: NodeId,
    node: NodeId,
}

impl ElementBuilder<'_> {
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.doc.set_attribute(self.node, name, value);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.doc.add_class(self.node, class);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.doc.set_text(self.node, text);
        self
    }

    pub fn value(self, value: &str) -> Self {
        self.doc.set_value(self.node, value.to_owned(), value.len());
        self
    }

    /// Appends the element under its parent and returns its id.
    pub fn finish(self) -> NodeId {
        self.doc.append_child(self.parent, self.node);
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertions_under_body_are_recorded() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.build(body, "form").finish();
        let detached = doc.create_element("div");
        let textarea = doc.build(form, "textarea").finish();

        assert_eq!(
            doc.take_mutations(),
            vec![MutationRecord::Inserted(form), MutationRecord::Inserted(textarea)]
        );
        assert!(!doc.is_connected(detached));
        assert_eq!(doc.text_inputs(), vec![textarea]);
    }

    #[test]
    fn insert_before_places_node_as_previous_sibling() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.build(body, "textarea").finish();
        let bar = doc.create_element("div");
        doc.insert_before(input, bar);

        assert_eq!(doc.previous_sibling(input), Some(bar));
        assert_eq!(doc.children(body), vec![bar, input]);
    }

    #[test]
    fn removal_drops_the_subtree_and_focus() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.build(body, "form").finish();
        let input = doc.build(form, "textarea").value("draft").finish();
        doc.focus(input);
        doc.take_mutations();

        doc.remove(form);
        assert!(!doc.is_connected(input));
        assert_eq!(doc.value(input), "");
        assert_eq!(doc.focused(), None);
        assert_eq!(doc.take_mutations(), vec![MutationRecord::Removed(form)]);
    }

    #[test]
    fn cursor_is_clamped_to_char_boundaries() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.build(body, "textarea").finish();
        doc.set_value(input, "héllo".to_owned(), 2);
        assert_eq!(doc.cursor(input), 1);
        doc.set_cursor(input, 99);
        assert_eq!(doc.cursor(input), "héllo".len());
    }
}
