//! Keyboard event types and the escape policy.
//!
//! The engine does not own an input source. Hosts deliver [`KeyboardEvent`]s
//! to the listeners the engine registers via
//! [`DocumentHost::listen_keys`](crate::document::DocumentHost::listen_keys);
//! the only key the engine itself acts on is Escape.

// =============================================================================
// TYPES
// =============================================================================

/// Key name of the escape key, as hosts are expected to report it.
pub const ESCAPE: &str = "Escape";

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl.
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Create modifiers with shift.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Key event state (press, repeat, release).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event delivered by a host window.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "Escape").
    pub key: String,
    /// Modifier keys state.
    pub modifiers: Modifiers,
    /// Press/repeat/release state.
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers.
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Check if this is a press event.
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// Check if this is an escape press.
    pub fn is_escape(&self) -> bool {
        self.is_press() && self.key == ESCAPE
    }
}

// =============================================================================
// ESCAPE POLICY
// =============================================================================

/// Whether an escape press closes the tour.
///
/// Closable tours close from any step. Non-closable tours still close from
/// the final step: escaping the last step is always allowed.
pub(crate) fn escape_closes(closable: bool, step_index: i32, len: usize) -> bool {
    if step_index < 0 {
        return false;
    }
    closable || step_index as usize == len.saturating_sub(1)
}

// =============================================================================
// TESTS
// =============================================================================
