//! Positioning context derivation.
//!
//! Once a step resolved to an anchor, overlay elements need a frame of
//! reference: the document and window owning the anchor (not the host
//! page's: overlay math must run in the anchor's native coordinate
//! space), and the element to position against.

use crate::document::DocumentHost;
use crate::types::{StepDescriptor, StepParent};

/// Frame of reference for overlay placement, derived from a resolved
/// anchor.
pub struct PositioningContext<H: DocumentHost> {
    /// Element the overlay is positioned against.
    pub parent: H::Node,
    /// Window owning the anchor.
    pub window: H::Window,
    /// Document owning the anchor.
    pub document: H::Document,
}

impl<H: DocumentHost> Clone for PositioningContext<H> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            window: self.window.clone(),
            document: self.document.clone(),
        }
    }
}

impl<H: DocumentHost> PartialEq for PositioningContext<H> {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent
            && self.window == other.window
            && self.document == other.document
    }
}

impl<H: DocumentHost> std::fmt::Debug for PositioningContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositioningContext")
            .field("parent", &self.parent)
            .field("window", &self.window)
            .field("document", &self.document)
            .finish()
    }
}

/// Derive the positioning context of an anchor.
///
/// The parent is the owning document's body when the step requests
/// root-level positioning or a mask is enabled (the mask always needs
/// full-viewport placement); otherwise the anchor's offset parent, so the
/// overlay can be placed with simple relative offsets.
pub(crate) fn derive_context<H: DocumentHost>(
    host: &H,
    step: &StepDescriptor,
    anchor: &H::Node,
    mask: bool,
) -> PositioningContext<H> {
    let document = host.owner_document(anchor);
    let window = host.owner_window(&document);
    let parent = if step.parent == Some(StepParent::Body) || mask {
        host.document_body(&document)
    } else {
        host.offset_parent(anchor)
    };

    PositioningContext {
        parent,
        window,
        document,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::MemoryHost;
    use crate::types::StepDescriptor;

    #[test]
    fn masked_steps_position_against_the_body() {
        let host = MemoryHost::new();
        let root = host.root();
        let wrap = host.add_node(root, None, "#wrap");
        host.set_positioned(wrap, true);
        let anchor = host.add_node(root, Some(wrap), "#target");

        let step = StepDescriptor::at_selector("#target");
        let context = derive_context(&host, &step, &anchor, true);
        assert_eq!(context.parent, host.document_body(&root));
    }

    #[test]
    fn unmasked_steps_position_against_the_offset_parent() {
        let host = MemoryHost::new();
        let root = host.root();
        let wrap = host.add_node(root, None, "#wrap");
        host.set_positioned(wrap, true);
        let anchor = host.add_node(root, Some(wrap), "#target");

        let step = StepDescriptor::at_selector("#target");
        let context = derive_context(&host, &step, &anchor, false);
        assert_eq!(context.parent, wrap);
    }

    #[test]
    fn explicit_body_parent_overrides_the_offset_parent() {
        let host = MemoryHost::new();
        let root = host.root();
        let wrap = host.add_node(root, None, "#wrap");
        host.set_positioned(wrap, true);
        let anchor = host.add_node(root, Some(wrap), "#target");

        let step = StepDescriptor::at_selector("#target").parent_body();
        let context = derive_context(&host, &step, &anchor, false);
        assert_eq!(context.parent, host.document_body(&root));
    }

    #[test]
    fn frame_anchors_keep_their_own_document_and_window() {
        let host = MemoryHost::new();
        let (_, inner) = host.add_frame(host.root(), None, "#embed");
        let anchor = host.add_node(inner, None, "#target");

        let step = StepDescriptor::at_selector("#embed >>> #target");
        let context = derive_context(&host, &step, &anchor, true);

        assert_eq!(context.document, inner);
        assert_eq!(context.window, host.owner_window(&inner));
        assert_eq!(context.parent, host.document_body(&inner));
    }
}
