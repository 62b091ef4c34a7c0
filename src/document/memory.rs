//! In-memory document host.
//!
//! A small arena-backed document tree implementing [`DocumentHost`]:
//! documents own a window and a body, nodes form per-document trees,
//! frames nest a child document one level down. Structural mutations
//! (append, remove, move) notify registered observers; key events dispatch
//! per window. The test suite runs tours against this host, and embedders
//! without a real document model can drive it directly.
//!
//! Handles (`MemNode`, `MemDocument`, `MemWindow`) are arena indices:
//! cheap to copy, stable for the lifetime of the host, comparable by
//! identity.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Cleanup, DocumentHost, ObserveFlags, VIRTUAL_ANCHOR_CLASS};
use crate::state::keyboard::KeyboardEvent;
use crate::types::Rect;

// =============================================================================
// Handles
// =============================================================================

/// Element handle into a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemNode(usize);

/// Document handle into a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemDocument(usize);

/// Window handle into a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemWindow(usize);

// =============================================================================
// Arena state
// =============================================================================

struct NodeData {
    selector: Option<String>,
    class_name: Option<String>,
    doc: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    positioned: bool,
    rect: Rect,
    frame_doc: Option<usize>,
    detached: bool,
}

struct DocData {
    window: usize,
    body: usize,
    overflow: String,
}

struct ObserverEntry {
    id: usize,
    doc: usize,
    flags: ObserveFlags,
    callback: Rc<dyn Fn()>,
}

struct KeyListenerEntry {
    id: usize,
    window: usize,
    callback: Rc<dyn Fn(&KeyboardEvent)>,
}

#[derive(Default)]
struct DomState {
    nodes: Vec<NodeData>,
    documents: Vec<DocData>,
    window_count: usize,
    observers: Vec<ObserverEntry>,
    key_listeners: Vec<KeyListenerEntry>,
    next_subscription_id: usize,
    virtual_anchor: Option<usize>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            selector: None,
            class_name: None,
            doc: 0,
            parent: None,
            children: Vec::new(),
            positioned: false,
            rect: Rect::ZERO,
            frame_doc: None,
            detached: false,
        }
    }
}

impl DomState {
    /// Create a document with its own window and body node.
    fn create_document(&mut self) -> usize {
        let window = self.window_count;
        self.window_count += 1;

        let body = self.nodes.len();
        let doc = self.documents.len();
        self.nodes.push(NodeData {
            doc,
            ..NodeData::default()
        });
        self.documents.push(DocData {
            window,
            body,
            overflow: String::new(),
        });
        doc
    }

    fn append_node(&mut self, parent: usize, data: NodeData) -> usize {
        let index = self.nodes.len();
        self.nodes.push(NodeData {
            parent: Some(parent),
            ..data
        });
        self.nodes[parent].children.push(index);
        index
    }

    fn detach_subtree(&mut self, index: usize) {
        if let Some(parent) = self.nodes[index].parent {
            self.nodes[parent].children.retain(|&c| c != index);
        }
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            self.nodes[current].detached = true;
            pending.extend(self.nodes[current].children.iter().copied());
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        id
    }

    /// Observers to notify for a structural change under `parent` in `doc`.
    fn observers_for(&self, doc: usize, parent: usize) -> Vec<Rc<dyn Fn()>> {
        let body = self.documents[doc].body;
        self.observers
            .iter()
            .filter(|o| o.doc == doc)
            .filter(|o| o.flags.contains(ObserveFlags::SUBTREE) || parent == body)
            .map(|o| o.callback.clone())
            .collect()
    }
}

// =============================================================================
// Host
// =============================================================================

/// Shared handle to an in-memory document tree.
#[derive(Clone)]
pub struct MemoryHost {
    state: Rc<RefCell<DomState>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Create a host with an empty root document.
    pub fn new() -> Self {
        let mut state = DomState::default();
        state.create_document();
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// The root document, same as [`DocumentHost::root_document`].
    pub fn root(&self) -> MemDocument {
        MemDocument(0)
    }

    /// Append an element under `parent` (the document body when `None`).
    pub fn add_node(
        &self,
        doc: MemDocument,
        parent: Option<MemNode>,
        selector: impl Into<String>,
    ) -> MemNode {
        let (index, callbacks) = {
            let mut state = self.state.borrow_mut();
            let parent = parent.map_or(state.documents[doc.0].body, |p| p.0);
            let index = state.append_node(
                parent,
                NodeData {
                    selector: Some(selector.into()),
                    doc: doc.0,
                    ..NodeData::default()
                },
            );
            (index, state.observers_for(doc.0, parent))
        };
        for callback in callbacks {
            callback();
        }
        MemNode(index)
    }

    /// Append a frame element hosting a fresh nested document.
    pub fn add_frame(
        &self,
        doc: MemDocument,
        parent: Option<MemNode>,
        selector: impl Into<String>,
    ) -> (MemNode, MemDocument) {
        let (index, inner, callbacks) = {
            let mut state = self.state.borrow_mut();
            let inner = state.create_document();
            let parent = parent.map_or(state.documents[doc.0].body, |p| p.0);
            let index = state.append_node(
                parent,
                NodeData {
                    selector: Some(selector.into()),
                    doc: doc.0,
                    frame_doc: Some(inner),
                    ..NodeData::default()
                },
            );
            (index, inner, state.observers_for(doc.0, parent))
        };
        for callback in callbacks {
            callback();
        }
        (MemNode(index), MemDocument(inner))
    }

    /// Detach a node and its subtree from the tree.
    pub fn remove_node(&self, node: MemNode) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let doc = state.nodes[node.0].doc;
            let parent = state.nodes[node.0].parent.unwrap_or(state.documents[doc].body);
            state.detach_subtree(node.0);
            state.observers_for(doc, parent)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Reparent a node within its document.
    pub fn move_node(&self, node: MemNode, new_parent: MemNode) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let doc = state.nodes[node.0].doc;
            debug_assert_eq!(doc, state.nodes[new_parent.0].doc, "cross-document move");
            if let Some(parent) = state.nodes[node.0].parent {
                state.nodes[parent].children.retain(|&c| c != node.0);
            }
            state.nodes[new_parent.0].children.push(node.0);
            state.nodes[node.0].parent = Some(new_parent.0);
            state.observers_for(doc, new_parent.0)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Mark a node as establishing a positioning context. Attribute-level
    /// change: observers are not notified.
    pub fn set_positioned(&self, node: MemNode, positioned: bool) {
        self.state.borrow_mut().nodes[node.0].positioned = positioned;
    }

    /// Set a node's rect. Attribute-level change: observers are not
    /// notified.
    pub fn set_rect(&self, node: MemNode, rect: Rect) {
        self.state.borrow_mut().nodes[node.0].rect = rect;
    }

    /// Dispatch a key event to every listener of `window`.
    pub fn press_key(&self, window: MemWindow, event: KeyboardEvent) {
        let callbacks: Vec<_> = {
            let state = self.state.borrow();
            state
                .key_listeners
                .iter()
                .filter(|l| l.window == window.0)
                .map(|l| l.callback.clone())
                .collect()
        };
        for callback in callbacks {
            callback(&event);
        }
    }

    /// The current virtual anchor, if one is injected.
    pub fn virtual_anchor(&self) -> Option<MemNode> {
        self.state.borrow().virtual_anchor.map(MemNode)
    }

    /// Whether `node` is still attached to its tree.
    pub fn contains(&self, node: MemNode) -> bool {
        !self.state.borrow().nodes[node.0].detached
    }

    /// Rect of a node, as set by [`set_rect`](Self::set_rect) or
    /// [`insert_virtual_anchor`](DocumentHost::insert_virtual_anchor).
    pub fn rect_of(&self, node: MemNode) -> Rect {
        self.state.borrow().nodes[node.0].rect
    }

    /// Number of live mutation observers, across all documents.
    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Number of live key listeners, across all windows.
    pub fn key_listener_count(&self) -> usize {
        self.state.borrow().key_listeners.len()
    }
}

impl DocumentHost for MemoryHost {
    type Node = MemNode;
    type Document = MemDocument;
    type Window = MemWindow;

    fn root_document(&self) -> MemDocument {
        MemDocument(0)
    }

    fn query_selector(&self, doc: &MemDocument, selector: &str) -> Option<MemNode> {
        let state = self.state.borrow();
        state
            .nodes
            .iter()
            .position(|n| {
                n.doc == doc.0 && !n.detached && n.selector.as_deref() == Some(selector)
            })
            .map(MemNode)
    }

    fn frame_document(&self, node: &MemNode) -> Option<MemDocument> {
        self.state.borrow().nodes[node.0].frame_doc.map(MemDocument)
    }

    fn owner_document(&self, node: &MemNode) -> MemDocument {
        MemDocument(self.state.borrow().nodes[node.0].doc)
    }

    fn owner_window(&self, doc: &MemDocument) -> MemWindow {
        MemWindow(self.state.borrow().documents[doc.0].window)
    }

    fn document_body(&self, doc: &MemDocument) -> MemNode {
        MemNode(self.state.borrow().documents[doc.0].body)
    }

    fn offset_parent(&self, node: &MemNode) -> MemNode {
        let state = self.state.borrow();
        let mut current = state.nodes[node.0].parent;
        while let Some(index) = current {
            if state.nodes[index].positioned {
                return MemNode(index);
            }
            current = state.nodes[index].parent;
        }
        MemNode(state.documents[state.nodes[node.0].doc].body)
    }

    fn insert_virtual_anchor(&self, rect: Rect) -> MemNode {
        let (index, callbacks) = {
            let mut state = self.state.borrow_mut();
            if let Some(existing) = state.virtual_anchor {
                // Reposition only; not a structural change.
                state.nodes[existing].rect = rect;
                return MemNode(existing);
            }
            let body = state.documents[0].body;
            let index = state.append_node(
                body,
                NodeData {
                    class_name: Some(VIRTUAL_ANCHOR_CLASS.to_string()),
                    rect,
                    ..NodeData::default()
                },
            );
            state.virtual_anchor = Some(index);
            (index, state.observers_for(0, body))
        };
        for callback in callbacks {
            callback();
        }
        MemNode(index)
    }

    fn remove_virtual_anchor(&self) -> bool {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.virtual_anchor.take() else {
                return false;
            };
            let doc = state.nodes[index].doc;
            let parent = state.nodes[index].parent.unwrap_or(state.documents[doc].body);
            state.detach_subtree(index);
            state.observers_for(doc, parent)
        };
        for callback in callbacks {
            callback();
        }
        true
    }

    fn overflow(&self, doc: &MemDocument) -> String {
        self.state.borrow().documents[doc.0].overflow.clone()
    }

    fn set_overflow(&self, doc: &MemDocument, value: &str) {
        self.state.borrow_mut().documents[doc.0].overflow = value.to_string();
    }

    fn observe_mutations(
        &self,
        doc: &MemDocument,
        flags: ObserveFlags,
        callback: Rc<dyn Fn()>,
    ) -> Cleanup {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            state.observers.push(ObserverEntry {
                id,
                doc: doc.0,
                flags,
                callback,
            });
            id
        };

        let state = self.state.clone();
        Box::new(move || {
            state.borrow_mut().observers.retain(|o| o.id != id);
        })
    }

    fn listen_keys(&self, window: &MemWindow, callback: Rc<dyn Fn(&KeyboardEvent)>) -> Cleanup {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            state.key_listeners.push(KeyListenerEntry {
                id,
                window: window.0,
                callback,
            });
            id
        };

        let state = self.state.clone();
        Box::new(move || {
            state.borrow_mut().key_listeners.retain(|l| l.id != id);
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn query_finds_attached_nodes_only() {
        let host = MemoryHost::new();
        let root = host.root();
        let node = host.add_node(root, None, "#save");

        assert_eq!(host.query_selector(&root, "#save"), Some(node));

        host.remove_node(node);
        assert_eq!(host.query_selector(&root, "#save"), None);
    }

    #[test]
    fn removing_a_node_detaches_its_subtree() {
        let host = MemoryHost::new();
        let root = host.root();
        let wrap = host.add_node(root, None, "#wrap");
        let child = host.add_node(root, Some(wrap), "#child");

        host.remove_node(wrap);
        assert!(!host.contains(child));
        assert_eq!(host.query_selector(&root, "#child"), None);
    }

    #[test]
    fn offset_parent_walks_to_nearest_positioned_ancestor() {
        let host = MemoryHost::new();
        let root = host.root();
        let outer = host.add_node(root, None, "#outer");
        let inner = host.add_node(root, Some(outer), "#inner");
        let leaf = host.add_node(root, Some(inner), "#leaf");

        // Nothing positioned: falls back to the body.
        assert_eq!(host.offset_parent(&leaf), host.document_body(&root));

        host.set_positioned(outer, true);
        assert_eq!(host.offset_parent(&leaf), outer);

        host.set_positioned(inner, true);
        assert_eq!(host.offset_parent(&leaf), inner);
    }

    #[test]
    fn frames_nest_their_own_document_and_window() {
        let host = MemoryHost::new();
        let root = host.root();
        let (frame, inner_doc) = host.add_frame(root, None, "#embed");
        let target = host.add_node(inner_doc, None, "#target");

        assert_eq!(host.frame_document(&frame), Some(inner_doc));
        assert_eq!(host.owner_document(&target), inner_doc);
        assert_ne!(host.owner_window(&inner_doc), host.owner_window(&root));
        // Inner nodes are invisible from the outer document.
        assert_eq!(host.query_selector(&root, "#target"), None);
    }

    #[test]
    fn structural_mutations_notify_observers() {
        let host = MemoryHost::new();
        let root = host.root();
        let hits = Rc::new(Cell::new(0));

        let hits_in = hits.clone();
        let cleanup = host.observe_mutations(
            &root,
            ObserveFlags::STRUCTURAL,
            Rc::new(move || hits_in.set(hits_in.get() + 1)),
        );

        let node = host.add_node(root, None, "#a");
        assert_eq!(hits.get(), 1);

        // Attribute changes are not structural.
        host.set_positioned(node, true);
        host.set_rect(node, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(hits.get(), 1);

        host.remove_node(node);
        assert_eq!(hits.get(), 2);

        cleanup();
        host.add_node(root, None, "#b");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn mutations_in_a_frame_do_not_notify_outer_observers() {
        let host = MemoryHost::new();
        let root = host.root();
        let (_, inner_doc) = host.add_frame(root, None, "#embed");
        let hits = Rc::new(Cell::new(0));

        let hits_in = hits.clone();
        let _cleanup = host.observe_mutations(
            &root,
            ObserveFlags::STRUCTURAL,
            Rc::new(move || hits_in.set(hits_in.get() + 1)),
        );

        host.add_node(inner_doc, None, "#inner");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn key_events_dispatch_per_window() {
        let host = MemoryHost::new();
        let root = host.root();
        let (_, inner_doc) = host.add_frame(root, None, "#embed");
        let outer_win = host.owner_window(&root);
        let inner_win = host.owner_window(&inner_doc);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        let cleanup = host.listen_keys(
            &inner_win,
            Rc::new(move |event: &KeyboardEvent| seen_in.borrow_mut().push(event.key.clone())),
        );

        host.press_key(outer_win, KeyboardEvent::new("Escape"));
        assert!(seen.borrow().is_empty());

        host.press_key(inner_win, KeyboardEvent::new("Escape"));
        assert_eq!(seen.borrow().as_slice(), ["Escape"]);

        cleanup();
        host.press_key(inner_win, KeyboardEvent::new("Escape"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn virtual_anchor_is_created_once_and_repositioned() {
        let host = MemoryHost::new();
        let first = host.insert_virtual_anchor(Rect::new(1.0, 1.0, 10.0, 10.0));
        let second = host.insert_virtual_anchor(Rect::new(5.0, 5.0, 20.0, 20.0));

        assert_eq!(first, second);
        assert_eq!(host.rect_of(first), Rect::new(5.0, 5.0, 20.0, 20.0));

        assert!(host.remove_virtual_anchor());
        assert_eq!(host.virtual_anchor(), None);
        assert!(!host.remove_virtual_anchor());
    }
}
