//! Host document seam.
//!
//! The engine is headless: it never touches a real DOM, terminal grid or
//! scene graph directly. Everything it needs from the host document is
//! behind [`DocumentHost`]:
//!
//! - selector lookup and frame descent for anchor resolution
//! - ownership chain (node → document → window) for frame-correct geometry
//! - the single well-known virtual-anchor node for coordinate targets
//! - the document overflow style (scroll lock)
//! - structural mutation observation and key listening
//!
//! Implementations are handle-like: cloning a host clones a reference to
//! the same document tree, and the `Node`/`Document`/`Window` associated
//! types are cheap comparable handles, not owned subtrees.

use std::rc::Rc;

use crate::state::keyboard::KeyboardEvent;
use crate::types::Rect;

pub mod memory;

// =============================================================================
// Subscriptions
// =============================================================================

/// Teardown function returned by a subscription.
///
/// Calling it undoes exactly what the subscription set up. The engine calls
/// every cleanup it holds before installing a replacement and on every exit
/// path; dropping one un-called leaks the underlying listener.
pub type Cleanup = Box<dyn FnOnce()>;

bitflags::bitflags! {
    /// Granularity of a mutation observation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObserveFlags: u8 {
        /// Child-list changes of the observed root.
        const CHILD_LIST = 1 << 0;
        /// Extend observation to the whole subtree.
        const SUBTREE = 1 << 1;
    }
}

impl ObserveFlags {
    /// Whole-document structural observation, the granularity the resync
    /// loop runs at.
    pub const STRUCTURAL: Self = Self::CHILD_LIST.union(Self::SUBTREE);
}

// =============================================================================
// Virtual anchor
// =============================================================================

/// Class name of the single injected virtual-anchor node.
///
/// Hosts tag the node they create in
/// [`DocumentHost::insert_virtual_anchor`] with this class so external
/// renderers (and cleanup paths) can recognize it.
pub const VIRTUAL_ANCHOR_CLASS: &str = "guidepost-virtual-anchor";

// =============================================================================
// Host trait
// =============================================================================

/// The document model a tour runs against.
///
/// All lookups are non-throwing: a selector that matches nothing, or a node
/// that is not a frame, returns `None` and the engine treats the step as
/// not yet ready.
pub trait DocumentHost: Clone {
    /// Handle to an element in some document of this host.
    type Node: Clone + PartialEq + std::fmt::Debug;
    /// Handle to a document (the root one, or one nested in a frame).
    type Document: Clone + PartialEq + std::fmt::Debug;
    /// Handle to the window owning a document.
    type Window: Clone + PartialEq + std::fmt::Debug;

    /// The top-level document. Selector resolution and the mutation
    /// observer both start here.
    fn root_document(&self) -> Self::Document;

    /// Look up a single selector segment within one document.
    fn query_selector(&self, doc: &Self::Document, selector: &str) -> Option<Self::Node>;

    /// The nested document of a frame node, `None` if `node` is no frame.
    fn frame_document(&self, node: &Self::Node) -> Option<Self::Document>;

    /// The document owning `node`.
    fn owner_document(&self, node: &Self::Node) -> Self::Document;

    /// The window owning `doc`.
    fn owner_window(&self, doc: &Self::Document) -> Self::Window;

    /// The body element of `doc`.
    fn document_body(&self, doc: &Self::Document) -> Self::Node;

    /// The nearest positioned ancestor of `node`, falling back to the
    /// owning document's body.
    fn offset_parent(&self, node: &Self::Node) -> Self::Node;

    /// Create the virtual anchor at `rect` under the root document's body,
    /// or reposition the existing one. At most one such node exists per
    /// host; it carries [`VIRTUAL_ANCHOR_CLASS`].
    fn insert_virtual_anchor(&self, rect: Rect) -> Self::Node;

    /// Remove the virtual anchor if present. Returns whether one existed.
    fn remove_virtual_anchor(&self) -> bool;

    /// Current overflow style value of `doc`. Empty string when unset.
    fn overflow(&self, doc: &Self::Document) -> String;

    /// Set the overflow style value of `doc`.
    fn set_overflow(&self, doc: &Self::Document, value: &str);

    /// Observe structural mutations of `doc`. The callback fires once per
    /// mutation batch; attribute-only changes are not structural.
    fn observe_mutations(
        &self,
        doc: &Self::Document,
        flags: ObserveFlags,
        callback: Rc<dyn Fn()>,
    ) -> Cleanup;

    /// Listen for key events on `window`.
    fn listen_keys(&self, window: &Self::Window, callback: Rc<dyn Fn(&KeyboardEvent)>) -> Cleanup;
}
