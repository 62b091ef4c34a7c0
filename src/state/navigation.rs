//! Step-index state machine.
//!
//! The single mutable piece of tour state: `step_index`, with `-1` for an
//! inactive tour and `0..len` for the active step. `len` itself is a
//! transient value that immediately collapses into a close; downstream
//! consumers never observe it.
//!
//! Transitions are planned here as pure data; the controller executes them
//! so lifecycle hooks fire in the required order (outgoing hook strictly
//! before the commit).

/// Sentinel index for an inactive tour.
const INACTIVE: i32 = -1;

/// Planned outcome of an `advance` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The clamped target equals the current index.
    None,
    /// Move to an active step, firing the outgoing hook for `from` first.
    Step { from: Option<usize>, to: usize },
    /// The target is one past the last step: close instead of committing.
    Close,
}

/// Navigation state. Single writer: the tour controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NavState {
    step_index: i32,
}

impl NavState {
    pub fn new() -> Self {
        Self {
            step_index: INACTIVE,
        }
    }

    pub fn step_index(&self) -> i32 {
        self.step_index
    }

    pub fn is_active(&self) -> bool {
        self.step_index >= 0
    }

    /// The active step as an index into the step sequence.
    pub fn active_index(&self, len: usize) -> Option<usize> {
        (self.step_index >= 0 && (self.step_index as usize) < len)
            .then_some(self.step_index as usize)
    }

    /// Plan a relative move, clamped to `[0, len]`.
    pub fn plan_advance(&self, direction: i32, len: usize) -> Transition {
        let next = (self.step_index.saturating_add(direction)).clamp(0, len as i32);
        if next == self.step_index {
            Transition::None
        } else if next == len as i32 {
            Transition::Close
        } else {
            Transition::Step {
                from: (self.step_index >= 0).then_some(self.step_index as usize),
                to: next as usize,
            }
        }
    }

    /// Commit a planned step transition.
    pub fn commit(&mut self, to: usize) {
        self.step_index = to as i32;
    }

    /// Enter the tour at `start`.
    pub fn activate(&mut self, start: usize) {
        self.step_index = start as i32;
    }

    /// Leave the tour.
    pub fn deactivate(&mut self) {
        self.step_index = INACTIVE;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_traversal_visits_every_step_then_closes() {
        let len = 3;
        let mut nav = NavState::new();
        let mut seen = Vec::new();

        loop {
            match nav.plan_advance(1, len) {
                Transition::Step { to, .. } => {
                    nav.commit(to);
                    seen.push(nav.step_index());
                }
                Transition::Close => {
                    nav.deactivate();
                    break;
                }
                Transition::None => unreachable!("forward advance always moves"),
            }
        }

        assert_eq!(seen, [0, 1, 2]);
        assert_eq!(nav.step_index(), -1);
    }

    #[test]
    fn backward_at_first_step_is_a_no_op() {
        let mut nav = NavState::new();
        nav.activate(0);
        assert_eq!(nav.plan_advance(-1, 3), Transition::None);
    }

    #[test]
    fn outgoing_step_is_reported_for_active_transitions_only() {
        let mut nav = NavState::new();
        // Activation through advance has no outgoing step.
        assert_eq!(
            nav.plan_advance(1, 3),
            Transition::Step { from: None, to: 0 }
        );

        nav.activate(1);
        assert_eq!(
            nav.plan_advance(1, 3),
            Transition::Step {
                from: Some(1),
                to: 2
            }
        );
    }

    #[test]
    fn advancing_past_the_end_plans_a_close() {
        let mut nav = NavState::new();
        nav.activate(2);
        assert_eq!(nav.plan_advance(1, 3), Transition::Close);
        // The transient index is never committed.
        assert_eq!(nav.step_index(), 2);
    }

    #[test]
    fn active_index_is_none_while_inactive() {
        let nav = NavState::new();
        assert_eq!(nav.active_index(3), None);

        let mut nav = NavState::new();
        nav.activate(2);
        assert_eq!(nav.active_index(3), Some(2));
    }
}
