//! Discovery, attachment and event routing for toolbars on a host page.
//!
//! The integrator owns one [`Binding`] per attached input, keyed by the
//! input's [`NodeId`]. Nothing is stored on the page except the rendered
//! controls and the two marker classes that guard against double work.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::matchers::{self, COMMENT_BOX_CONTAINER, COMMENT_BOX_PLACEHOLDER};
use super::{DomEventKind, HostPage, NodeId};
use crate::toolbar::{CommentBuffer, Toolbar, ToolbarItem, Transition};

/// Marks an input that already has a toolbar.
pub const TOOLBAR_MARKER_CLASS: &str = "cc-toolbar-added";
/// Marks a host toolbar that already carries the settings button.
pub const SETTINGS_MARKER_CLASS: &str = "cc-settings-injected";
pub const TOOLBAR_ID_PREFIX: &str = "conventional-comments-toolbar-";
pub const SETTINGS_BUTTON_ID_PREFIX: &str = "cc-settings-button-";
pub const INPUT_PLACEHOLDER: &str = "Add your comment here...";

/// Hands out unique, increasing element ids.
///
/// Clones share the counter, so one allocator can be passed to every
/// integrator in the process.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator(Arc<AtomicU64>);

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// State owned by one attached input.
#[derive(Debug, Clone)]
pub struct Binding {
    pub toolbar: Toolbar,
    /// The `div.cc-toolbar` element rendered before the input.
    pub element: NodeId,
    pub dom_id: String,
}

#[derive(Debug, Clone)]
struct SettingsAffordance {
    item: NodeId,
    button: NodeId,
    dropdown: Option<NodeId>,
}

/// What a rendered control does when clicked.
#[derive(Debug, Clone, Copy)]
enum Control {
    Item { input: NodeId, item: ToolbarItem },
    Settings { host_toolbar: NodeId },
    PrettifyToggle,
}

/// Result of routing a click through [`Integrator::click_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The node is not one of ours.
    Unhandled,
    Toolbar {
        input: NodeId,
        transition: Transition,
    },
    SettingsOpened(NodeId),
    SettingsClosed(NodeId),
    /// The prettify toggle was clicked; the caller persists the new value and
    /// then calls [`Integrator::set_prettify`].
    PrettifyRequested(bool),
}

/// What one [`Integrator::scan`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub attached: Vec<NodeId>,
    pub settings_injected: Vec<NodeId>,
    pub detached: Vec<NodeId>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.settings_injected.is_empty() && self.detached.is_empty()
    }
}

/// Binds toolbars to the eligible inputs of one host page.
#[derive(Debug)]
pub struct Integrator {
    bindings: HashMap<NodeId, Binding>,
    settings: HashMap<NodeId, SettingsAffordance>,
    controls: HashMap<NodeId, Control>,
    ids: IdAllocator,
    prettify: bool,
}

impl Integrator {
    /// `prettify` is the preference store's value at startup.
    pub fn new(ids: IdAllocator, prettify: bool) -> Self {
        Self {
            bindings: HashMap::new(),
            settings: HashMap::new(),
            controls: HashMap::new(),
            ids,
            prettify,
        }
    }

    pub fn prettify(&self) -> bool {
        self.prettify
    }

    pub fn binding(&self, input: NodeId) -> Option<&Binding> {
        self.bindings.get(&input)
    }

    /// Attached inputs in document order.
    pub fn bound_inputs(&self, host: &impl HostPage) -> Vec<NodeId> {
        host.text_inputs()
            .into_iter()
            .filter(|n| self.bindings.contains_key(n))
            .collect()
    }

    /// Clickable controls of `input`'s toolbar, in display order.
    pub fn toolbar_controls(&self, host: &impl HostPage, input: NodeId) -> Vec<NodeId> {
        let Some(binding) = self.bindings.get(&input) else {
            return Vec::new();
        };
        host.children(binding.element)
            .into_iter()
            .filter(|n| self.controls.contains_key(n))
            .collect()
    }

    /// The settings button injected into `input`'s host toolbar, if any.
    pub fn settings_button_for(&self, host: &impl HostPage, input: NodeId) -> Option<NodeId> {
        let bar = matchers::host_toolbar_for(host, input)?;
        self.settings.get(&bar).map(|s| s.button)
    }

    /// Whether `node` is an injected settings button or the prettify toggle.
    pub fn is_settings_control(&self, node: NodeId) -> bool {
        matches!(
            self.controls.get(&node),
            Some(Control::Settings { .. } | Control::PrettifyToggle)
        )
    }

    /// The open settings dropdown, if any.
    pub fn open_dropdown(&self) -> Option<NodeId> {
        self.settings.values().find_map(|s| s.dropdown)
    }

    /// Brings the page in line with the bindings: drops bindings whose input
    /// left the page, attaches toolbars to new eligible inputs, and injects the
    /// settings button into host toolbars that lack one.
    pub fn scan(&mut self, host: &mut impl HostPage) -> ScanReport {
        let mut report = ScanReport::default();
        self.prune(host, &mut report);

        for input in host.text_inputs() {
            if !matchers::is_comment_input(&*host, input)
                || host.has_class(input, TOOLBAR_MARKER_CLASS)
                || self.bindings.contains_key(&input)
            {
                continue;
            }
            self.attach(host, input);
            report.attached.push(input);
        }

        for input in self.bound_inputs(&*host) {
            let Some(bar) = matchers::host_toolbar_for(&*host, input) else {
                trace!(input = input.0, "no host toolbar for input");
                continue;
            };
            if host.has_class(bar, SETTINGS_MARKER_CLASS) {
                continue;
            }
            self.inject_settings(host, bar);
            report.settings_injected.push(bar);
        }

        if !report.is_empty() {
            debug!(
                attached = report.attached.len(),
                settings = report.settings_injected.len(),
                detached = report.detached.len(),
                "scan finished"
            );
        }
        report
    }

    /// Clicks toolbar `item` of `input`'s toolbar.
    pub fn click(
        &mut self,
        host: &mut impl HostPage,
        input: NodeId,
        item: ToolbarItem,
    ) -> Transition {
        let Some(binding) = self.bindings.get_mut(&input) else {
            return Transition::Ignored;
        };
        let transition = binding.toolbar.click(
            item,
            &mut BoundInput {
                host: &mut *host,
                node: input,
            },
        );
        if transition != Transition::Ignored {
            self.render(host, input);
        }
        transition
    }

    /// Routes a click on any element the integrator rendered.
    pub fn click_node(&mut self, host: &mut impl HostPage, node: NodeId) -> ClickOutcome {
        match self.controls.get(&node).copied() {
            None => ClickOutcome::Unhandled,
            Some(Control::Item { input, item }) => ClickOutcome::Toolbar {
                input,
                transition: self.click(host, input, item),
            },
            Some(Control::Settings { host_toolbar }) => self.toggle_dropdown(host, host_toolbar),
            Some(Control::PrettifyToggle) => ClickOutcome::PrettifyRequested(!self.prettify),
        }
    }

    /// Closes any open settings dropdown.
    pub fn close_settings(&mut self, host: &mut impl HostPage) {
        let bars: Vec<NodeId> = self.settings.keys().copied().collect();
        for bar in bars {
            self.close_dropdown(host, bar);
        }
    }

    /// Switches every toolbar's format; inputs with an active type are
    /// re-rendered. Returns the rewritten inputs.
    pub fn set_prettify(&mut self, host: &mut impl HostPage, enabled: bool) -> Vec<NodeId> {
        self.prettify = enabled;
        let mut rewritten = Vec::new();
        for input in self.bound_inputs(&*host) {
            let Some(binding) = self.bindings.get_mut(&input) else {
                continue;
            };
            let transition = binding
                .toolbar
                .set_prettify(
                    enabled,
                    &mut BoundInput {
                        host: &mut *host,
                        node: input,
                    },
                );
            if transition == Transition::BufferRewritten {
                rewritten.push(input);
            }
        }
        let dropdowns: Vec<NodeId> = self.settings.values().filter_map(|s| s.dropdown).collect();
        for dropdown in dropdowns {
            self.fill_dropdown(host, dropdown);
        }
        rewritten
    }

    fn prune(&mut self, host: &mut impl HostPage, report: &mut ScanReport) {
        let gone: Vec<NodeId> = self
            .bindings
            .keys()
            .copied()
            .filter(|&input| !host.is_connected(input))
            .collect();
        for input in gone {
            if let Some(binding) = self.bindings.remove(&input) {
                if host.is_connected(binding.element) {
                    host.remove(binding.element);
                }
                debug!(input = input.0, toolbar = %binding.dom_id, "input left the page");
            }
            report.detached.push(input);
        }
        self.settings.retain(|&bar, _| host.is_connected(bar));
        self.controls.retain(|&node, _| host.is_connected(node));
    }

    fn attach(&mut self, host: &mut impl HostPage, input: NodeId) {
        let dom_id = format!("{TOOLBAR_ID_PREFIX}{}", self.ids.next());
        let element = host.create_element("div");
        host.add_class(element, "cc-toolbar");
        host.set_attribute(element, "id", &dom_id);
        host.insert_before(input, element);

        clean_placeholder(host, input);
        host.add_class(input, TOOLBAR_MARKER_CLASS);

        let toolbar = Toolbar::attach(host.value(input), self.prettify);
        debug!(input = input.0, toolbar = %dom_id, phase = ?toolbar.phase(), "attached toolbar");
        self.bindings.insert(
            input,
            Binding {
                toolbar,
                element,
                dom_id,
            },
        );
        self.render(host, input);
    }

    /// Rebuilds the toolbar element's children from the state machine's view.
    fn render(&mut self, host: &mut impl HostPage, input: NodeId) {
        let Some(binding) = self.bindings.get(&input) else {
            return;
        };
        let element = binding.element;
        let view = binding.toolbar.view();

        self.controls
            .retain(|_, c| !matches!(c, Control::Item { input: i, .. } if *i == input));
        host.clear_children(element);

        for item in view {
            let node = match item {
                ToolbarItem::TypeButton {
                    comment_type,
                    highlighted,
                } => {
                    let node = host.create_element("button");
                    host.add_class(node, "cc-button");
                    host.add_class(node, &format!("cc-button-{}", comment_type.label()));
                    if highlighted {
                        host.add_class(node, "cc-type-selected-highlight");
                    }
                    node
                }
                ToolbarItem::TypeLabel(_) => {
                    let node = host.create_element("span");
                    host.add_class(node, "cc-selected-type-label");
                    node
                }
                ToolbarItem::Separator => {
                    let node = host.create_element("span");
                    host.add_class(node, "cc-separator");
                    node
                }
                ToolbarItem::DecorationButton {
                    decoration,
                    highlighted,
                } => {
                    let node = host.create_element("button");
                    host.add_class(node, "cc-button");
                    host.add_class(node, &format!("cc-button-dec-{}", decoration.label()));
                    if highlighted {
                        host.add_class(node, "cc-decoration-selected-highlight");
                    }
                    node
                }
            };
            if item.is_clickable() {
                host.set_attribute(node, "type", "button");
                host.set_attribute(node, "title", item.title());
                self.controls.insert(node, Control::Item { input, item });
            }
            let text = match item {
                ToolbarItem::Separator => " > ",
                other => other.text(),
            };
            host.set_text(node, text);
            host.append_child(element, node);
        }
    }

    fn inject_settings(&mut self, host: &mut impl HostPage, bar: NodeId) {
        let container = matchers::controls_container(&*host, bar);
        let item = host.create_element("div");
        host.add_class(item, "ActionBar-item");
        host.add_class(item, "cc-settings-item");

        let button = host.create_element("button");
        host.add_class(button, "cc-settings-button");
        host.set_attribute(
            button,
            "id",
            &format!("{SETTINGS_BUTTON_ID_PREFIX}{}", self.ids.next()),
        );
        host.set_attribute(button, "type", "button");
        host.set_attribute(button, "title", "Conventional Comments settings");
        host.set_text(button, "⚙");
        host.append_child(item, button);
        host.append_child(container, item);
        host.add_class(bar, SETTINGS_MARKER_CLASS);

        self.controls
            .insert(button, Control::Settings { host_toolbar: bar });
        self.settings.insert(
            bar,
            SettingsAffordance {
                item,
                button,
                dropdown: None,
            },
        );
        debug!(host_toolbar = bar.0, "injected settings button");
    }

    fn toggle_dropdown(&mut self, host: &mut impl HostPage, bar: NodeId) -> ClickOutcome {
        let Some(open) = self.settings.get(&bar).map(|s| s.dropdown.is_some()) else {
            return ClickOutcome::Unhandled;
        };
        self.close_settings(host);
        if open {
            return ClickOutcome::SettingsClosed(bar);
        }

        let Some(item) = self.settings.get(&bar).map(|s| s.item) else {
            return ClickOutcome::Unhandled;
        };
        let dropdown = host.create_element("div");
        host.add_class(dropdown, "cc-settings-dropdown");
        host.append_child(item, dropdown);
        self.fill_dropdown(host, dropdown);
        if let Some(settings) = self.settings.get_mut(&bar) {
            settings.dropdown = Some(dropdown);
        }
        ClickOutcome::SettingsOpened(bar)
    }

    fn close_dropdown(&mut self, host: &mut impl HostPage, bar: NodeId) {
        if let Some(dropdown) = self.settings.get_mut(&bar).and_then(|s| s.dropdown.take()) {
            host.remove(dropdown);
            self.controls.retain(|&node, _| host.is_connected(node));
        }
    }

    /// Renders the dropdown body: a label and the prettify toggle.
    fn fill_dropdown(&mut self, host: &mut impl HostPage, dropdown: NodeId) {
        self.controls
            .retain(|_, c| !matches!(c, Control::PrettifyToggle));
        host.clear_children(dropdown);

        let label = host.create_element("span");
        host.add_class(label, "cc-settings-label");
        host.set_text(label, "Prettify comments");
        host.append_child(dropdown, label);

        let toggle = host.create_element("button");
        host.add_class(toggle, "cc-prettify-toggle");
        host.set_attribute(toggle, "type", "button");
        host.set_attribute(toggle, "aria-pressed", if self.prettify { "true" } else { "false" });
        host.set_text(toggle, if self.prettify { "on" } else { "off" });
        host.append_child(dropdown, toggle);
        self.controls.insert(toggle, Control::PrettifyToggle);
    }
}

/// `true` when any of the inserted subtrees holds an input still waiting for
/// a toolbar. Insertions made by the integrator itself never qualify.
pub fn insertions_need_scan(
    host: &impl HostPage,
    inserted: impl IntoIterator<Item = NodeId>,
) -> bool {
    inserted.into_iter().any(|node| {
        host.is_connected(node)
            && matchers::contains_unbound_input(host, node, TOOLBAR_MARKER_CLASS)
    })
}

fn clean_placeholder(host: &mut impl HostPage, input: NodeId) {
    host.set_attribute(input, "placeholder", INPUT_PLACEHOLDER);
    let placeholder = matchers::closest(&*host, input, COMMENT_BOX_CONTAINER)
        .and_then(|container| matchers::query(&*host, container, COMMENT_BOX_PLACEHOLDER));
    if let Some(placeholder) = placeholder {
        host.remove(placeholder);
    }
}

/// A bound input seen as a [`CommentBuffer`].
struct BoundInput<'a, H: HostPage> {
    host: &'a mut H,
    node: NodeId,
}

impl<H: HostPage> CommentBuffer for BoundInput<'_, H> {
    fn contents(&self) -> &str {
        self.host.value(self.node)
    }

    fn replace(&mut self, text: String, cursor: usize) {
        self.host.set_value(self.node, text, cursor);
        self.host.focus(self.node);
    }

    fn notify_changed(&mut self) {
        self.host.dispatch(self.node, DomEventKind::Input);
        self.host.dispatch(self.node, DomEventKind::Change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::host::dom::{DomEvent, Document};
    use crate::labels::{CommentType, Decoration};
    use pretty_assertions::assert_eq;

    fn review_form(doc: &mut Document, value: &str) -> (NodeId, NodeId) {
        let body = doc.body();
        let form = doc.build(body, "form").finish();
        let bar = doc.build(form, "markdown-toolbar").finish();
        doc.build(bar, "div").class("md-header-controls").finish();
        let input = doc
            .build(form, "textarea")
            .attr("name", "comment[body]")
            .value(value)
            .finish();
        (bar, input)
    }

    fn count_with_class(doc: &Document, class: &str) -> usize {
        let mut stack = vec![doc.body()];
        let mut count = 0;
        while let Some(node) = stack.pop() {
            count += usize::from(doc.has_class(node, class));
            stack.extend(doc.children(node));
        }
        count
    }

    fn item_nodes(doc: &Document, integrator: &Integrator, input: NodeId) -> Vec<NodeId> {
        let element = integrator.binding(input).map(|b| b.element).unwrap();
        doc.children(element)
    }

    #[test]
    fn allocator_is_shared_and_monotonic() {
        let ids = IdAllocator::new();
        let other = ids.clone();
        assert_eq!(ids.next(), 1);
        assert_eq!(other.next(), 2);
        assert_eq!(ids.next(), 3);
    }

    #[test]
    fn scan_attaches_once_and_inserts_toolbar_before_input() {
        let mut doc = Document::new();
        let (bar, input) = review_form(&mut doc, "");
        let mut integrator = Integrator::new(IdAllocator::new(), true);

        let report = integrator.scan(&mut doc);
        assert_eq!(report.attached, vec![input]);
        assert_eq!(report.settings_injected, vec![bar]);

        let toolbar = doc.previous_sibling(input).unwrap();
        assert!(doc.has_class(toolbar, "cc-toolbar"));
        assert_eq!(doc.attribute(toolbar, "id"), Some("conventional-comments-toolbar-1"));
        assert!(doc.has_class(input, TOOLBAR_MARKER_CLASS));
        assert!(doc.has_class(bar, SETTINGS_MARKER_CLASS));
        assert_eq!(doc.attribute(input, "placeholder"), Some(INPUT_PLACEHOLDER));
        assert_eq!(doc.children(toolbar).len(), CommentType::ALL.len());

        let again = integrator.scan(&mut doc);
        assert!(again.is_empty());
        assert_eq!(count_with_class(&doc, "cc-settings-button"), 1);
        assert_eq!(count_with_class(&doc, "cc-toolbar"), 1);
    }

    #[test]
    fn ineligible_inputs_are_left_alone() {
        let mut doc = Document::new();
        let body = doc.body();
        let search = doc.build(body, "textarea").attr("name", "q").finish();
        let mut integrator = Integrator::new(IdAllocator::new(), true);

        assert!(integrator.scan(&mut doc).is_empty());
        assert!(!doc.has_class(search, TOOLBAR_MARKER_CLASS));
        assert!(integrator.binding(search).is_none());
    }

    #[test]
    fn existing_prefix_seeds_the_toolbar() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "issue(blocking): fix this");
        let mut integrator = Integrator::new(IdAllocator::new(), true);
        integrator.scan(&mut doc);

        let toolbar = &integrator.binding(input).unwrap().toolbar;
        assert_eq!(toolbar.comment_type(), Some(CommentType::Issue));
        assert_eq!(toolbar.decoration(), Some(Decoration::Blocking));
        assert!(!toolbar.prettify());

        let texts: Vec<&str> = item_nodes(&doc, &integrator, input)
            .into_iter()
            .map(|n| doc.text(n))
            .collect();
        assert_eq!(texts, vec!["issue", " > ", "non-blocking", "blocking", "if-minor"]);
        // The separator is not a control.
        assert_eq!(integrator.toolbar_controls(&doc, input).len(), 4);
    }

    #[test]
    fn clicking_a_type_button_rewrites_focuses_and_notifies() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "");
        let mut integrator = Integrator::new(IdAllocator::new(), false);
        integrator.scan(&mut doc);
        doc.take_events();

        let suggestion = item_nodes(&doc, &integrator, input)
            .into_iter()
            .find(|&n| doc.has_class(n, "cc-button-suggestion"))
            .unwrap();
        let outcome = integrator.click_node(&mut doc, suggestion);

        assert_eq!(
            outcome,
            ClickOutcome::Toolbar {
                input,
                transition: Transition::BufferRewritten
            }
        );
        assert_eq!(doc.value(input), "suggestion: ");
        assert_eq!(doc.cursor(input), "suggestion: ".len());
        assert_eq!(doc.focused(), Some(input));
        assert_eq!(
            doc.take_events(),
            vec![
                DomEvent { target: input, kind: DomEventKind::Input },
                DomEvent { target: input, kind: DomEventKind::Change },
            ]
        );
        // The old button is gone; the view now shows the label and decorations.
        assert!(!doc.is_connected(suggestion));
        assert_eq!(item_nodes(&doc, &integrator, input).len(), 2 + Decoration::ALL.len());
    }

    #[test]
    fn highlight_classes_follow_the_selection() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "question(if-minor): why?");
        let mut integrator = Integrator::new(IdAllocator::new(), false);
        integrator.scan(&mut doc);

        let nodes = item_nodes(&doc, &integrator, input);
        let highlighted: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&n| doc.has_class(n, "cc-decoration-selected-highlight"))
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert!(doc.has_class(highlighted[0], "cc-button-dec-if-minor"));

        integrator.click_node(&mut doc, nodes[0]);
        let picker = item_nodes(&doc, &integrator, input);
        assert_eq!(picker.len(), CommentType::ALL.len());
        assert!(picker
            .iter()
            .any(|&n| doc.has_class(n, "cc-button-question")
                && doc.has_class(n, "cc-type-selected-highlight")));
        assert_eq!(doc.value(input), "question(if-minor): why?");
    }

    #[test]
    fn removed_inputs_are_pruned_and_their_toolbar_removed() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "");
        let mut integrator = Integrator::new(IdAllocator::new(), true);
        integrator.scan(&mut doc);
        let element = integrator.binding(input).unwrap().element;

        doc.remove(input);
        let report = integrator.scan(&mut doc);
        assert_eq!(report.detached, vec![input]);
        assert!(!doc.is_connected(element));
        assert!(integrator.binding(input).is_none());
    }

    #[test]
    fn settings_dropdown_toggles_prettify_across_toolbars() {
        let mut doc = Document::new();
        let (bar, first) = review_form(&mut doc, "issue: broken");
        let (_, second) = review_form(&mut doc, "");
        let mut integrator = Integrator::new(IdAllocator::new(), true);
        integrator.scan(&mut doc);

        let button = integrator.settings_button_for(&doc, first).unwrap();
        assert_eq!(integrator.click_node(&mut doc, button), ClickOutcome::SettingsOpened(bar));
        let dropdown = integrator.open_dropdown().unwrap();
        let toggle = doc
            .find(dropdown, |d, n| d.has_class(n, "cc-prettify-toggle"))
            .unwrap();
        assert_eq!(doc.text(toggle), "on");

        let outcome = integrator.click_node(&mut doc, toggle);
        assert_eq!(outcome, ClickOutcome::PrettifyRequested(false));
        integrator.set_prettify(&mut doc, false);
        assert!(!integrator.binding(first).unwrap().toolbar.prettify());

        let outcome = integrator.click_node(&mut doc, toggle);
        assert_eq!(outcome, ClickOutcome::Unhandled, "toggle was re-rendered");
        let toggle = doc
            .find(dropdown, |d, n| d.has_class(n, "cc-prettify-toggle"))
            .unwrap();
        assert_eq!(doc.text(toggle), "off");

        let rewritten = integrator.set_prettify(&mut doc, true);
        assert_eq!(rewritten, vec![first]);
        assert_eq!(
            doc.value(first),
            format!("{}broken", codec::render(CommentType::Issue, None, true))
        );
        assert_eq!(doc.value(second), "");

        assert_eq!(integrator.click_node(&mut doc, button), ClickOutcome::SettingsClosed(bar));
        assert_eq!(integrator.open_dropdown(), None);
        assert!(!doc.is_connected(dropdown));

        integrator.click_node(&mut doc, button);
        integrator.close_settings(&mut doc);
        assert_eq!(integrator.open_dropdown(), None);
    }

    #[test]
    fn settings_controls_are_told_apart_from_toolbar_items() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "");
        let mut integrator = Integrator::new(IdAllocator::new(), true);
        integrator.scan(&mut doc);

        let button = integrator.settings_button_for(&doc, input).unwrap();
        assert!(integrator.is_settings_control(button));
        integrator.click_node(&mut doc, button);
        let toggle = doc
            .find(integrator.open_dropdown().unwrap(), |d, n| {
                d.has_class(n, "cc-prettify-toggle")
            })
            .unwrap();
        assert!(integrator.is_settings_control(toggle));

        let item = item_nodes(&doc, &integrator, input)[0];
        assert!(!integrator.is_settings_control(item));
        assert!(!integrator.is_settings_control(input));
    }

    #[test]
    fn comment_box_placeholder_is_removed_on_attach() {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.build(body, "div").class("CommentBox-container").finish();
        let placeholder = doc.build(container, "div").class("CommentBox-placeholder").finish();
        let input = doc
            .build(container, "textarea")
            .id("new_commit_comment_field")
            .finish();

        let mut integrator = Integrator::new(IdAllocator::new(), true);
        let report = integrator.scan(&mut doc);
        assert_eq!(report.attached, vec![input]);
        assert!(report.settings_injected.is_empty());
        assert!(!doc.is_connected(placeholder));
    }

    #[test]
    fn only_insertions_with_unbound_inputs_need_a_scan() {
        let mut doc = Document::new();
        let (_, input) = review_form(&mut doc, "");
        let form = doc.parent(input).unwrap();
        assert!(insertions_need_scan(&doc, [form]));

        let mut integrator = Integrator::new(IdAllocator::new(), true);
        doc.take_mutations();
        integrator.scan(&mut doc);
        let own: Vec<NodeId> = doc
            .take_mutations()
            .into_iter()
            .filter_map(|m| match m {
                crate::host::dom::MutationRecord::Inserted(n) => Some(n),
                crate::host::dom::MutationRecord::Removed(_) => None,
            })
            .collect();
        assert!(!own.is_empty());
        assert!(!insertions_need_scan(&doc, own));
        assert!(!insertions_need_scan(&doc, [form]));
    }
}
