//! Caller-facing tour configuration.
//!
//! A props struct in the spirit of the primitives' `*Props` types: every
//! field public, `Default` fills in the conventional values (mask on,
//! arrow on, closable, Chinese labels), construction reads as a struct
//! update over it. The configuration is read-only to the engine for the
//! lifetime of the tour.

use std::rc::Rc;

use crate::error::TourError;
use crate::i18n::{self, Labels, Lang};
use crate::types::StepDescriptor;

// =============================================================================
// Hook aliases
// =============================================================================

/// Lifecycle hook receiving a step index and the step itself.
pub type StepHook = Rc<dyn Fn(usize, &StepDescriptor)>;

/// Hook fired when the tour closes.
pub type CloseHook = Rc<dyn Fn()>;

/// Formatter for the step counter text: `(current, total) -> text`, with
/// `current` one-based.
pub type StepTextFn = Rc<dyn Fn(usize, usize) -> String>;

// =============================================================================
// Config
// =============================================================================

/// Tour configuration.
///
/// `steps` is the only required field. `visible` is deliberately an
/// `Option`: absent means "visible, engine-managed"; present hands the
/// caller control over the visibility flag via
/// [`Tour::set_visible`](crate::pipeline::Tour::set_visible).
pub struct TourConfig {
    /// Ordered step sequence.
    pub steps: Vec<StepDescriptor>,
    /// Storage key for the completion flag. `None` disables persistence.
    pub local_key: Option<String>,
    /// Last eligible day, `YYYY-MM-DD`. Unparsable or absent: no expiry.
    pub expire_date: Option<String>,
    /// Step index the tour starts at.
    pub start_step: usize,
    /// Dim the page behind the overlay and lock scrolling.
    pub mask: bool,
    /// Renderer hint: draw the anchor arrow.
    pub arrow: bool,
    /// Renderer hint: draw the pulsing hotspot.
    pub hotspot: bool,
    /// Whether the tour can be dismissed before its last step.
    pub closable: bool,
    /// Extra class name handed to the modal renderer.
    pub modal_class_name: String,
    /// Extra class name handed to the mask renderer.
    pub mask_class_name: String,
    /// Initial visibility. See the type-level docs.
    pub visible: Option<bool>,
    /// Language of the built-in button labels.
    pub lang: Lang,
    /// Renderer hint: show the previous button.
    pub show_previous_btn: bool,
    /// Renderer hint: show the skip button.
    pub show_skip_btn: bool,
    /// Renderer-defined markup for a custom close element.
    pub close_ele: Option<String>,
    /// Step counter formatter, overriding the built-in `current/total`.
    pub step_text: Option<StepTextFn>,
    pub prev_text: Option<String>,
    pub next_text: Option<String>,
    pub skip_text: Option<String>,
    pub ok_text: Option<String>,
    /// Fired for the outgoing step, strictly before the index commits.
    pub before_step_change: Option<StepHook>,
    /// Fired after a committed step has been pushed downstream.
    pub after_step_change: Option<StepHook>,
    /// Fired when the tour closes (not on hard resets).
    pub on_close: Option<CloseHook>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            local_key: None,
            expire_date: None,
            start_step: 0,
            mask: true,
            arrow: true,
            hotspot: false,
            closable: true,
            modal_class_name: String::new(),
            mask_class_name: String::new(),
            visible: None,
            lang: Lang::default(),
            show_previous_btn: false,
            show_skip_btn: false,
            close_ele: None,
            step_text: None,
            prev_text: None,
            next_text: None,
            skip_text: None,
            ok_text: None,
            before_step_change: None,
            after_step_change: None,
            on_close: None,
        }
    }
}

impl TourConfig {
    /// Config with the given steps and default everything else.
    pub fn with_steps(steps: Vec<StepDescriptor>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Validate the parts the engine cannot degrade around.
    pub(crate) fn validate(&self) -> Result<(), TourError> {
        if self.steps.is_empty() {
            return Err(TourError::EmptySteps);
        }
        if self.start_step >= self.steps.len() {
            return Err(TourError::StartStepOutOfRange {
                start: self.start_step,
                len: self.steps.len(),
            });
        }
        Ok(())
    }

    /// Resolve the button labels for one rendered frame.
    pub(crate) fn labels(&self, current: usize, total: usize) -> Labels {
        let defaults = i18n::defaults(self.lang);
        Labels {
            step: match &self.step_text {
                Some(format) => format(current, total),
                None => i18n::format_step(current, total),
            },
            prev: self
                .prev_text
                .clone()
                .unwrap_or_else(|| defaults.prev.to_string()),
            next: self
                .next_text
                .clone()
                .unwrap_or_else(|| defaults.next.to_string()),
            skip: self
                .skip_text
                .clone()
                .unwrap_or_else(|| defaults.skip.to_string()),
            ok: self
                .ok_text
                .clone()
                .unwrap_or_else(|| defaults.ok.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepDescriptor;

    fn steps(n: usize) -> Vec<StepDescriptor> {
        (0..n)
            .map(|i| StepDescriptor::at_selector(format!("#step-{i}")))
            .collect()
    }

    #[test]
    fn defaults_match_the_configuration_surface() {
        let config = TourConfig::default();
        assert!(config.mask);
        assert!(config.arrow);
        assert!(config.closable);
        assert!(!config.hotspot);
        assert!(!config.show_previous_btn);
        assert!(!config.show_skip_btn);
        assert_eq!(config.lang, Lang::Zh);
        assert_eq!(config.start_step, 0);
        assert!(config.visible.is_none());
    }

    #[test]
    fn empty_steps_are_rejected() {
        assert_eq!(
            TourConfig::default().validate(),
            Err(TourError::EmptySteps)
        );
    }

    #[test]
    fn out_of_range_start_step_is_rejected() {
        let config = TourConfig {
            start_step: 2,
            ..TourConfig::with_steps(steps(2))
        };
        assert_eq!(
            config.validate(),
            Err(TourError::StartStepOutOfRange { start: 2, len: 2 })
        );
    }

    #[test]
    fn labels_resolve_defaults_and_overrides() {
        let config = TourConfig {
            lang: Lang::En,
            next_text: Some("Onwards".to_string()),
            ..TourConfig::with_steps(steps(2))
        };
        let labels = config.labels(1, 2);
        assert_eq!(labels.step, "1/2");
        assert_eq!(labels.prev, "Previous");
        assert_eq!(labels.next, "Onwards");
        assert_eq!(labels.ok, "Got it");
    }

    #[test]
    fn custom_step_text_formatter_wins() {
        let config = TourConfig {
            step_text: Some(Rc::new(|current, total| {
                format!("step {current} of {total}")
            })),
            ..TourConfig::with_steps(steps(3))
        };
        assert_eq!(config.labels(2, 3).step, "step 2 of 3");
    }
}
