//! Anchor resolution.
//!
//! Converts the current step into the node its overlay is positioned
//! against: a selector lookup (possibly descending through embedded
//! frames), or a synthesized virtual anchor for coordinate targets.
//! Resolution is non-throwing: a selector that matches nothing leaves the
//! step "not yet ready" and the resync loop retries after the next
//! document mutation.

use crate::document::DocumentHost;
use crate::types::StepDescriptor;

mod context;

pub use context::PositioningContext;
pub(crate) use context::derive_context;

/// Combinator separating frame-descent segments in a step selector.
///
/// `"#embed >>> #save"` resolves `#embed` in the root document, expects it
/// to be a frame, and resolves `#save` in that frame's own document.
pub const FRAME_COMBINATOR: &str = ">>>";

/// Resolved anchor plus its positioning context. Both are derived together
/// under one invalidation key and are never cached past it.
pub struct ResolvedTarget<H: DocumentHost> {
    pub anchor: H::Node,
    pub context: PositioningContext<H>,
}

impl<H: DocumentHost> Clone for ResolvedTarget<H> {
    fn clone(&self) -> Self {
        Self {
            anchor: self.anchor.clone(),
            context: self.context.clone(),
        }
    }
}

impl<H: DocumentHost> PartialEq for ResolvedTarget<H> {
    fn eq(&self, other: &Self) -> bool {
        self.anchor == other.anchor && self.context == other.context
    }
}

impl<H: DocumentHost> std::fmt::Debug for ResolvedTarget<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTarget")
            .field("anchor", &self.anchor)
            .field("context", &self.context)
            .finish()
    }
}

/// Resolve a step to its anchor node.
///
/// `selector` takes precedence over `target_pos`; a step with neither has
/// no anchor.
pub(crate) fn resolve_anchor<H: DocumentHost>(host: &H, step: &StepDescriptor) -> Option<H::Node> {
    if let Some(selector) = step.selector.as_deref() {
        return resolve_selector(host, selector);
    }
    if let Some(rect) = step.target_pos {
        return Some(host.insert_virtual_anchor(rect));
    }
    None
}

/// Resolve a selector, descending through frames segment by segment.
fn resolve_selector<H: DocumentHost>(host: &H, selector: &str) -> Option<H::Node> {
    let mut doc = host.root_document();
    let mut segments = selector.split(FRAME_COMBINATOR).map(str::trim).peekable();

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return None;
        }
        let node = host.query_selector(&doc, segment)?;
        if segments.peek().is_none() {
            return Some(node);
        }
        // Every non-final segment must address a frame to descend into.
        doc = host.frame_document(&node)?;
    }
    None
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::MemoryHost;
    use crate::types::Rect;

    #[test]
    fn resolves_plain_selectors_in_the_root_document() {
        let host = MemoryHost::new();
        let node = host.add_node(host.root(), None, "#save");

        let step = StepDescriptor::at_selector("#save");
        assert_eq!(resolve_anchor(&host, &step), Some(node));
    }

    #[test]
    fn missing_selectors_resolve_to_none() {
        let host = MemoryHost::new();
        let step = StepDescriptor::at_selector("#missing");
        assert_eq!(resolve_anchor(&host, &step), None);
    }

    #[test]
    fn descends_through_frames() {
        let host = MemoryHost::new();
        let (_, inner) = host.add_frame(host.root(), None, "#embed");
        let target = host.add_node(inner, None, "#save");

        let step = StepDescriptor::at_selector("#embed >>> #save");
        assert_eq!(resolve_anchor(&host, &step), Some(target));
    }

    #[test]
    fn descent_through_a_non_frame_fails() {
        let host = MemoryHost::new();
        host.add_node(host.root(), None, "#embed");

        let step = StepDescriptor::at_selector("#embed >>> #save");
        assert_eq!(resolve_anchor(&host, &step), None);
    }

    #[test]
    fn selector_wins_over_target_pos() {
        let host = MemoryHost::new();
        let node = host.add_node(host.root(), None, "#save");

        let step = StepDescriptor {
            target_pos: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            ..StepDescriptor::at_selector("#save")
        };
        assert_eq!(resolve_anchor(&host, &step), Some(node));
        assert_eq!(host.virtual_anchor(), None);
    }

    #[test]
    fn coordinate_steps_synthesize_a_virtual_anchor() {
        let host = MemoryHost::new();
        let rect = Rect::new(4.0, 8.0, 100.0, 50.0);

        let step = StepDescriptor::at_rect(rect);
        let anchor = resolve_anchor(&host, &step).expect("virtual anchor");

        assert_eq!(host.virtual_anchor(), Some(anchor));
        assert_eq!(host.rect_of(anchor), rect);
    }

    #[test]
    fn a_step_without_target_has_no_anchor() {
        let host = MemoryHost::new();
        assert_eq!(resolve_anchor(&host, &StepDescriptor::default()), None);
    }
}
