//! Document scroll lock.
//!
//! While a mask is up, the owning document's overflow style is forced to
//! `"hidden"` so the page behind the mask cannot scroll. The pre-tour value
//! is captured once per active session and restored verbatim on release,
//! to the document it was captured from, even if later steps resolve into a
//! different frame. An empty pre-tour value snapshots as `"hidden"`.

use tracing::trace;

use crate::document::DocumentHost;

/// Locked overflow style value.
const LOCKED: &str = "hidden";

/// Scoped overflow lock on one document.
///
/// Held by the controller for the lifetime of an active masked session;
/// consumed exactly once by [`release`](Self::release). The controller
/// stores it in an `Option`, which makes release idempotent.
#[derive(Debug)]
pub(crate) struct OverflowGuard<H: DocumentHost> {
    doc: H::Document,
    restore: String,
}

impl<H: DocumentHost> OverflowGuard<H> {
    /// Snapshot the current overflow value of `doc` and lock scrolling.
    pub fn acquire(host: &H, doc: H::Document) -> Self {
        let current = host.overflow(&doc);
        let restore = if current.is_empty() {
            LOCKED.to_string()
        } else {
            current
        };
        host.set_overflow(&doc, LOCKED);
        trace!(snapshot = %restore, "overflow locked");
        Self { doc, restore }
    }

    /// Restore the captured overflow value.
    pub fn release(self, host: &H) {
        trace!(snapshot = %self.restore, "overflow restored");
        host.set_overflow(&self.doc, &self.restore);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::MemoryHost;

    #[test]
    fn restores_the_pre_lock_value() {
        let host = MemoryHost::new();
        let doc = host.root();
        host.set_overflow(&doc, "scroll");

        let guard = OverflowGuard::acquire(&host, doc);
        assert_eq!(host.overflow(&doc), "hidden");

        guard.release(&host);
        assert_eq!(host.overflow(&doc), "scroll");
    }

    #[test]
    fn empty_value_snapshots_as_hidden() {
        let host = MemoryHost::new();
        let doc = host.root();

        let guard = OverflowGuard::acquire(&host, doc);
        guard.release(&host);
        assert_eq!(host.overflow(&doc), "hidden");
    }
}
