//! # guidepost
//!
//! Headless guided-tour engine.
//!
//! A tour is a sequence of steps, each highlighting a target region of a
//! host document and anchoring explanatory content to it. The hard part is
//! not drawing a tooltip - it is keeping derived overlay geometry in sync
//! with a live, externally-mutating document across step transitions,
//! frame boundaries and user navigation, while persisting "already seen"
//! state across sessions. That synchronization core is what this crate
//! owns; rendering and durable storage stay behind interfaces.
//!
//! ## Architecture
//!
//! The engine is a pipeline of explicit derivations instead of a reactive
//! framework:
//!
//! ```text
//! visibility -> step index -> anchor -> positioning context -> OverlayFrame
//!                  ^                                               |
//!                  |            mutation observer tick  <----------+
//!                  +---- user input (escape, next/prev/close)
//! ```
//!
//! - [`types`] - Steps and target regions
//! - [`config`] - The caller-facing configuration surface
//! - [`document`] - The [`DocumentHost`] seam plus the in-memory host
//! - [`anchor`] - Anchor resolution and positioning-context derivation
//! - [`state`] - Navigation state machine, eligibility, scroll lock, keys
//! - [`pipeline`] - The [`Tour`] controller and its sync loop
//! - [`renderer`] - The overlay renderer interface
//! - [`storage`] - Completion-flag persistence
//!
//! ## Example
//!
//! ```
//! use guidepost::{MemoryHost, NullRenderer, StepDescriptor, Tour, TourConfig};
//!
//! let host = MemoryHost::new();
//! host.add_node(host.root(), None, "#save-button");
//!
//! let config = TourConfig::with_steps(vec![
//!     StepDescriptor::at_selector("#save-button").title("Save"),
//! ]);
//! let tour = Tour::mount(host, config, None, NullRenderer).unwrap();
//! assert_eq!(tour.step_index(), 0);
//!
//! tour.next(); // past the last step: closes
//! assert_eq!(tour.step_index(), -1);
//! ```

pub mod anchor;
pub mod config;
pub mod document;
pub mod error;
pub mod i18n;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use anchor::{FRAME_COMBINATOR, PositioningContext, ResolvedTarget};
pub use config::{CloseHook, StepHook, StepTextFn, TourConfig};
pub use document::memory::{MemDocument, MemNode, MemWindow, MemoryHost};
pub use document::{Cleanup, DocumentHost, ObserveFlags, VIRTUAL_ANCHOR_CLASS};
pub use error::TourError;
pub use i18n::{Labels, Lang};
pub use pipeline::{Tour, TourLink};
pub use renderer::{MaskProps, NullRenderer, OverlayFrame, OverlayRenderer};
pub use state::{ESCAPE, KeyState, KeyboardEvent, Modifiers};
pub use storage::{CompletionStore, MemoryStore, SharedStore};
pub use types::{Rect, StepDescriptor, StepParent};
