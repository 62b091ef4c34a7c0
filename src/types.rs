//! Core types for guidepost.
//!
//! These types define the step sequence the caller supplies. They are plain
//! data: the engine never mutates a step, it only derives anchors and
//! positioning contexts from them.

use serde::{Deserialize, Serialize};

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned region in the host document's coordinate space.
///
/// Used for coordinate-based step targets (`target_pos`) where no real node
/// backs the highlighted region, e.g. a dynamically drawn canvas area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The zero-sized rect at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

// =============================================================================
// Step descriptor
// =============================================================================

/// Explicit positioning parent for a step's overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepParent {
    /// Position the overlay against the owning document's body instead of
    /// the anchor's offset parent.
    Body,
}

/// One step of a tour.
///
/// Exactly one of `selector` / `target_pos` is expected. `selector` takes
/// precedence when both are present; a step with neither resolves to no
/// anchor and renders nothing.
///
/// A `selector` may descend into embedded frames with the
/// [`FRAME_COMBINATOR`](crate::anchor::FRAME_COMBINATOR): every segment
/// before the last must match a frame node, the final segment is looked up
/// in the innermost frame's document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepDescriptor {
    /// Selector-based target, resolved against the live document.
    pub selector: Option<String>,
    /// Coordinate-based target, materialized as a virtual anchor node.
    pub target_pos: Option<Rect>,
    /// Overrides the derived positioning parent.
    pub parent: Option<StepParent>,
    /// Renderer-facing heading.
    pub title: String,
    /// Renderer-facing body text.
    pub content: String,
}

impl StepDescriptor {
    /// Step targeting a selector.
    pub fn at_selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    /// Step targeting a coordinate region.
    pub fn at_rect(rect: Rect) -> Self {
        Self {
            target_pos: Some(rect),
            ..Self::default()
        }
    }

    /// Set the renderer-facing title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the renderer-facing content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Force root-level positioning for this step.
    pub fn parent_body(mut self) -> Self {
        self.parent = Some(StepParent::Body);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let step = StepDescriptor::at_selector("#save")
            .title("Save")
            .content("Saves the document")
            .parent_body();

        assert_eq!(step.selector.as_deref(), Some("#save"));
        assert_eq!(step.parent, Some(StepParent::Body));
        assert!(step.target_pos.is_none());
    }

    #[test]
    fn deserializes_camel_case_config() {
        let step: StepDescriptor = serde_json::from_str(
            r#"{"targetPos": {"x": 10.0, "y": 20.0, "width": 100.0, "height": 40.0}, "title": "Canvas"}"#,
        )
        .expect("valid step json");

        assert_eq!(step.target_pos, Some(Rect::new(10.0, 20.0, 100.0, 40.0)));
        assert_eq!(step.title, "Canvas");
        assert!(step.selector.is_none());
    }
}
