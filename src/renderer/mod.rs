//! Overlay renderer interface.
//!
//! Rendering is out of the engine's scope: the mask and modal are pure
//! presentation, fed with computed geometry. After every sync the
//! controller pushes one [`OverlayFrame`] (or `None` when nothing should
//! render) into the registered [`OverlayRenderer`]. Renderers re-enter the
//! engine through a [`TourLink`](crate::pipeline::TourLink) for their
//! next/previous/close buttons.

use crate::document::DocumentHost;
use crate::i18n::Labels;
use crate::types::StepDescriptor;

// =============================================================================
// Frame data
// =============================================================================

/// Mask renderer input. The mask recomputes its own cut-out geometry
/// whenever the anchor identity changes.
pub struct MaskProps<H: DocumentHost> {
    pub anchor: H::Node,
    pub window: H::Window,
    pub class_name: String,
}

/// Everything the modal renderer is a pure function of.
pub struct OverlayFrame<H: DocumentHost> {
    /// Node the overlay highlights.
    pub anchor: H::Node,
    /// Element the overlay is positioned against.
    pub parent: H::Node,
    /// Window owning the anchor.
    pub window: H::Window,
    /// The step being shown.
    pub step: StepDescriptor,
    /// Zero-based index of the step being shown.
    pub step_index: usize,
    /// Total number of steps.
    pub step_total: usize,
    /// Resolved button labels.
    pub labels: Labels,
    pub arrow: bool,
    pub hotspot: bool,
    pub closable: bool,
    pub show_previous: bool,
    pub show_skip: bool,
    pub modal_class_name: String,
    /// Renderer-defined markup for a custom close element.
    pub close_ele: Option<String>,
    /// Mask input; `None` when the mask is disabled.
    pub mask: Option<MaskProps<H>>,
}

impl<H: DocumentHost> Clone for MaskProps<H> {
    fn clone(&self) -> Self {
        Self {
            anchor: self.anchor.clone(),
            window: self.window.clone(),
            class_name: self.class_name.clone(),
        }
    }
}

impl<H: DocumentHost> Clone for OverlayFrame<H> {
    fn clone(&self) -> Self {
        Self {
            anchor: self.anchor.clone(),
            parent: self.parent.clone(),
            window: self.window.clone(),
            step: self.step.clone(),
            step_index: self.step_index,
            step_total: self.step_total,
            labels: self.labels.clone(),
            arrow: self.arrow,
            hotspot: self.hotspot,
            closable: self.closable,
            show_previous: self.show_previous,
            show_skip: self.show_skip,
            modal_class_name: self.modal_class_name.clone(),
            close_ele: self.close_ele.clone(),
            mask: self.mask.clone(),
        }
    }
}

// Debug keeps to the fields useful in assertion failures.
impl<H: DocumentHost> std::fmt::Debug for OverlayFrame<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayFrame")
            .field("anchor", &self.anchor)
            .field("parent", &self.parent)
            .field("window", &self.window)
            .field("step_index", &self.step_index)
            .field("step_total", &self.step_total)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Renderer trait
// =============================================================================

/// Consumer of computed overlay frames.
pub trait OverlayRenderer<H: DocumentHost> {
    /// Apply the current frame. `None` clears the overlay.
    fn apply(&mut self, frame: Option<&OverlayFrame<H>>);
}

/// Renderer that draws nothing. Useful for headless runs and tests that
/// only observe engine state.
pub struct NullRenderer;

impl<H: DocumentHost> OverlayRenderer<H> for NullRenderer {
    fn apply(&mut self, _frame: Option<&OverlayFrame<H>>) {}
}
