//! Tour controller - lifecycle, sync loop, subscriptions.
//!
//! This is the entry point for running a tour. [`Tour::mount`] validates
//! the configuration, evaluates start eligibility, and returns the handle
//! that owns all tour state. From then on everything is driven by the sync
//! loop:
//!
//! ```text
//! step index / tick change -> derive (anchor, context) -> reconcile
//! subscriptions & overflow lock -> push OverlayFrame -> after hook
//! ```
//!
//! Re-entrancy discipline: user hooks and the renderer may call straight
//! back into the controller (next/previous buttons, close on a hook), so
//! the controller never invokes them while its own cell is borrowed, and a
//! sync requested while one is running coalesces into another pass of the
//! same loop instead of recursing.
//!
//! Resource discipline: the escape listener, the mutation observer, the
//! document overflow lock and the injected virtual anchor are released on
//! every exit path - close, hard reset, unmount and drop.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Local;
use tracing::{debug, trace};

use super::derived::DerivedCell;
use crate::anchor::{self, ResolvedTarget};
use crate::config::TourConfig;
use crate::document::{Cleanup, DocumentHost, ObserveFlags};
use crate::error::TourError;
use crate::renderer::{MaskProps, OverlayFrame, OverlayRenderer};
use crate::state::keyboard::{self, KeyboardEvent};
use crate::state::navigation::{NavState, Transition};
use crate::state::overflow::OverflowGuard;
use crate::state::visibility;
use crate::storage::{self, SharedStore};
use crate::types::StepDescriptor;

type Inner<H> = Rc<RefCell<TourInner<H>>>;

// =============================================================================
// Controller state
// =============================================================================

struct TourInner<H: DocumentHost> {
    host: H,
    config: TourConfig,
    steps: Rc<[StepDescriptor]>,
    store: Option<SharedStore>,
    renderer: Rc<RefCell<dyn OverlayRenderer<H>>>,

    nav: NavState,
    /// Monotonic resync generation, bumped per mutation batch.
    tick: u64,
    visible: bool,

    /// Anchor + context, keyed by `(step_index, tick)`.
    derived: DerivedCell<(i32, u64), Option<ResolvedTarget<H>>>,

    /// Scroll lock, held from first masked render until close/reset.
    overflow: Option<OverflowGuard<H>>,
    /// Structural observer over the root document, held while active.
    observer_sub: Option<Cleanup>,
    /// Escape listener on the current context window.
    key_sub: Option<Cleanup>,
    key_sub_window: Option<H::Window>,

    /// Step index the after hook last fired for.
    last_announced: i32,
    syncing: bool,
    dirty: bool,
}

// =============================================================================
// Handles
// =============================================================================

/// Handle owning a mounted tour.
///
/// Dropping it tears down every subscription and restores shared document
/// state (overflow, virtual anchor).
pub struct Tour<H: DocumentHost + 'static> {
    inner: Inner<H>,
}

/// Weak navigation handle for renderers and embedders.
///
/// A link never keeps the tour alive; calls on a dropped tour are no-ops.
pub struct TourLink<H: DocumentHost + 'static> {
    inner: Weak<RefCell<TourInner<H>>>,
}

impl<H: DocumentHost + 'static> Clone for TourLink<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: DocumentHost + 'static> Tour<H> {
    /// Mount a tour.
    ///
    /// Validates the configuration, then - unless `visible` is configured
    /// off - evaluates start eligibility (completion flag via `local_key`,
    /// expiry date) and activates at `start_step` when eligible.
    ///
    /// `store` backs completion persistence; pass `None` when `local_key`
    /// is unset or persistence is handled elsewhere.
    pub fn mount(
        host: H,
        config: TourConfig,
        store: Option<SharedStore>,
        renderer: impl OverlayRenderer<H> + 'static,
    ) -> Result<Self, TourError> {
        config.validate()?;
        let steps: Rc<[StepDescriptor]> = config.steps.clone().into();
        let initially_visible = config.visible.unwrap_or(true);

        let inner = Rc::new(RefCell::new(TourInner {
            host,
            steps,
            store,
            renderer: Rc::new(RefCell::new(renderer)),
            config,
            nav: NavState::new(),
            tick: 0,
            visible: false,
            derived: DerivedCell::new(),
            overflow: None,
            observer_sub: None,
            key_sub: None,
            key_sub_window: None,
            last_announced: -1,
            syncing: false,
            dirty: false,
        }));

        let tour = Self { inner };
        if initially_visible {
            set_visible_tour(&tour.inner, true);
        }
        Ok(tour)
    }

    /// Current step index: `-1` while inactive, `0..len` while active.
    pub fn step_index(&self) -> i32 {
        self.inner.borrow().nav.step_index()
    }

    /// Whether a step is currently active.
    pub fn is_active(&self) -> bool {
        self.inner.borrow().nav.is_active()
    }

    /// Monotonic resync generation. Bumps once per structural mutation
    /// batch observed while active.
    pub fn tick(&self) -> u64 {
        self.inner.borrow().tick
    }

    /// Move by `direction` steps (typically `1` or `-1`), clamped to the
    /// sequence. Advancing past the last step closes the tour.
    pub fn advance(&self, direction: i32) {
        advance_tour(&self.inner, direction);
    }

    /// Advance to the next step.
    pub fn next(&self) {
        self.advance(1);
    }

    /// Return to the previous step.
    pub fn prev(&self) {
        self.advance(-1);
    }

    /// Close the tour: restore shared document state, fire `on_close`,
    /// persist completion. Closing an inactive tour only releases stray
    /// resources.
    pub fn close(&self) {
        close_tour(&self.inner);
    }

    /// Flip the external visibility flag. A true-transition re-evaluates
    /// start eligibility; a false-transition is a hard reset - state goes
    /// inactive without hooks or persistence, shared resources are still
    /// released.
    pub fn set_visible(&self, visible: bool) {
        set_visible_tour(&self.inner, visible);
    }

    /// Navigation handle for renderers.
    pub fn link(&self) -> TourLink<H> {
        TourLink {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Tear the tour down and clear the overlay.
    pub fn unmount(self) {
        teardown(&self.inner);
        let renderer = self.inner.borrow().renderer.clone();
        renderer.borrow_mut().apply(None);
    }
}

impl<H: DocumentHost + 'static> Drop for Tour<H> {
    fn drop(&mut self) {
        teardown(&self.inner);
    }
}

impl<H: DocumentHost + 'static> std::fmt::Debug for Tour<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Tour")
            .field("step_index", &inner.nav.step_index())
            .field("tick", &inner.tick)
            .field("visible", &inner.visible)
            .finish_non_exhaustive()
    }
}

impl<H: DocumentHost + 'static> TourLink<H> {
    /// See [`Tour::advance`].
    pub fn advance(&self, direction: i32) {
        if let Some(inner) = self.inner.upgrade() {
            advance_tour(&inner, direction);
        }
    }

    /// See [`Tour::close`].
    pub fn close(&self) {
        if let Some(inner) = self.inner.upgrade() {
            close_tour(&inner);
        }
    }

    /// See [`Tour::step_index`]. Returns `-1` for a dropped tour.
    pub fn step_index(&self) -> i32 {
        self.inner
            .upgrade()
            .map_or(-1, |inner| inner.borrow().nav.step_index())
    }
}

// =============================================================================
// Navigation
// =============================================================================

fn advance_tour<H: DocumentHost + 'static>(inner: &Inner<H>, direction: i32) {
    let plan = {
        let guard = inner.borrow();
        if guard.visible {
            guard.nav.plan_advance(direction, guard.steps.len())
        } else {
            // Navigation is inert while the tour is hidden.
            Transition::None
        }
    };

    match plan {
        Transition::None => {}
        Transition::Close => close_tour(inner),
        Transition::Step { from, to } => {
            // Outgoing hook runs strictly before the commit is observable.
            // It cannot veto the transition.
            if let Some(from) = from {
                let hook = {
                    let guard = inner.borrow();
                    guard
                        .config
                        .before_step_change
                        .clone()
                        .map(|hook| (hook, guard.steps.clone()))
                };
                if let Some((hook, steps)) = hook {
                    hook(from, &steps[from]);
                }
            }
            debug!(from = ?from, to, "step transition");
            inner.borrow_mut().nav.commit(to);
            run_sync(inner);
        }
    }
}

fn close_tour<H: DocumentHost + 'static>(inner: &Inner<H>) {
    // Deactivate before touching the document: removing the virtual anchor
    // fires the mutation observer, and that resync must already see the
    // tour as inactive.
    let (host, guard, fired) = {
        let mut g = inner.borrow_mut();
        let fired = if g.nav.is_active() {
            g.nav.deactivate();
            g.last_announced = -1;
            Some((
                g.config.on_close.clone(),
                g.config.local_key.clone().zip(g.store.clone()),
            ))
        } else {
            None
        };
        (g.host.clone(), g.overflow.take(), fired)
    };

    if let Some(guard) = guard {
        guard.release(&host);
    }
    host.remove_virtual_anchor();

    if let Some((on_close, persist)) = fired {
        debug!("tour closed");
        if let Some(hook) = on_close {
            hook();
        }
        if let Some((key, store)) = persist {
            store.borrow_mut().set(&key, storage::COMPLETED);
        }
    }

    run_sync(inner);
}

fn set_visible_tour<H: DocumentHost + 'static>(inner: &Inner<H>, visible: bool) {
    let was_visible = {
        let mut guard = inner.borrow_mut();
        let previous = guard.visible;
        guard.visible = visible;
        previous
    };

    if visible && !was_visible {
        let start = {
            let guard = inner.borrow();
            let seen = guard.config.local_key.as_deref().and_then(|key| {
                guard
                    .store
                    .as_ref()
                    .and_then(|store| store.borrow().get(key))
            });
            let eligible = visibility::evaluate(
                seen.as_deref(),
                guard.config.expire_date.as_deref(),
                Local::now().naive_local(),
            );
            eligible.then_some(guard.config.start_step)
        };

        if let Some(start) = start {
            debug!(start, "tour activated");
            inner.borrow_mut().nav.activate(start);
        }
        run_sync(inner);
    } else if !visible && was_visible {
        hard_reset(inner);
    }
}

/// Force the tour inactive without hooks or persistence. Shared resources
/// are still released - cleanup runs on every exit path.
fn hard_reset<H: DocumentHost + 'static>(inner: &Inner<H>) {
    let (host, guard, was_active) = {
        let mut g = inner.borrow_mut();
        let was_active = g.nav.is_active();
        g.nav.deactivate();
        g.last_announced = -1;
        (g.host.clone(), g.overflow.take(), was_active)
    };

    if let Some(guard) = guard {
        guard.release(&host);
    }
    host.remove_virtual_anchor();
    if was_active {
        debug!("tour hard reset");
    }

    run_sync(inner);
}

/// Release everything without another sync. Used by `unmount` and `Drop`;
/// idempotent because every resource lives in an `Option`.
fn teardown<H: DocumentHost + 'static>(inner: &Inner<H>) {
    let (host, guard, key_sub, observer_sub) = {
        let mut g = inner.borrow_mut();
        g.nav.deactivate();
        g.last_announced = -1;
        g.key_sub_window = None;
        (
            g.host.clone(),
            g.overflow.take(),
            g.key_sub.take(),
            g.observer_sub.take(),
        )
    };

    // Subscriptions first: the anchor removal below must not re-enter the
    // sync loop through a still-registered observer.
    if let Some(cleanup) = key_sub {
        cleanup();
    }
    if let Some(cleanup) = observer_sub {
        cleanup();
    }
    if let Some(guard) = guard {
        guard.release(&host);
    }
    host.remove_virtual_anchor();
}

fn handle_key<H: DocumentHost + 'static>(inner: &Inner<H>, event: &KeyboardEvent) {
    if !event.is_escape() {
        return;
    }
    let close_now = {
        let guard = inner.borrow();
        keyboard::escape_closes(
            guard.config.closable,
            guard.nav.step_index(),
            guard.steps.len(),
        )
    };
    if close_now {
        debug!("escape pressed, closing");
        close_tour(inner);
    }
}

// =============================================================================
// Sync loop
// =============================================================================

/// Run the sync loop until the state settles. Re-entrant requests (from
/// observer callbacks, hooks or the renderer) mark the state dirty and
/// coalesce into another pass of the already-running loop.
fn run_sync<H: DocumentHost + 'static>(inner: &Inner<H>) {
    {
        let mut guard = inner.borrow_mut();
        guard.dirty = true;
        if guard.syncing {
            return;
        }
        guard.syncing = true;
    }

    loop {
        let dirty = {
            let mut guard = inner.borrow_mut();
            std::mem::take(&mut guard.dirty)
        };
        if !dirty {
            break;
        }
        sync_pass(inner);
    }

    inner.borrow_mut().syncing = false;
}

/// One pass: derive, reconcile resources, push the frame, announce.
fn sync_pass<H: DocumentHost + 'static>(inner: &Inner<H>) {
    let (host, steps, step_index, tick, mask_enabled) = {
        let guard = inner.borrow();
        (
            guard.host.clone(),
            guard.steps.clone(),
            guard.nav.step_index(),
            guard.tick,
            guard.config.mask,
        )
    };
    let key = (step_index, tick);

    // Anchor + context re-derive exactly when the key tuple changed.
    // Resolution runs without the cell borrowed: synthesizing a virtual
    // anchor mutates the document, which re-enters through the observer.
    if inner.borrow().derived.is_stale(&key) {
        let target = resolve_target(&host, &steps, step_index, mask_enabled);
        inner.borrow_mut().derived.store(key, target);
    }
    let target = {
        let guard = inner.borrow();
        guard.derived.current().cloned().flatten()
    };

    let active = step_index >= 0;

    reconcile_observer(inner, &host, active);
    reconcile_overflow(inner, &host, active && mask_enabled, target.as_ref());
    reconcile_key_listener(inner, &host, active, target.as_ref());

    // Push the frame, then announce: the after hook is guaranteed to run
    // only once the commit has been observed downstream.
    let frame = {
        let guard = inner.borrow();
        build_frame(&guard, target.as_ref())
    };
    let renderer = inner.borrow().renderer.clone();
    renderer.borrow_mut().apply(frame.as_ref());

    let announce = {
        let mut guard = inner.borrow_mut();
        let current = guard.nav.step_index();
        if current < 0 {
            guard.last_announced = -1;
            None
        } else if current == step_index && guard.last_announced != current {
            guard.last_announced = current;
            guard
                .config
                .after_step_change
                .clone()
                .map(|hook| (hook, current as usize, guard.steps.clone()))
        } else {
            // The renderer re-entered and moved the tour; the next pass
            // announces the step it actually landed on.
            None
        }
    };
    if let Some((hook, index, steps)) = announce {
        hook(index, &steps[index]);
    }
}

fn resolve_target<H: DocumentHost>(
    host: &H,
    steps: &[StepDescriptor],
    step_index: i32,
    mask: bool,
) -> Option<ResolvedTarget<H>> {
    if step_index < 0 {
        return None;
    }
    let step = steps.get(step_index as usize)?;
    let anchor = anchor::resolve_anchor(host, step)?;
    let context = anchor::derive_context(host, step, &anchor, mask);
    Some(ResolvedTarget { anchor, context })
}

// =============================================================================
// Resource reconciliation
// =============================================================================

/// One structural observer over the root document while active, none while
/// inactive.
fn reconcile_observer<H: DocumentHost + 'static>(inner: &Inner<H>, host: &H, want: bool) {
    let have = inner.borrow().observer_sub.is_some();
    if want == have {
        return;
    }

    if want {
        let weak = Rc::downgrade(inner);
        let callback: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                {
                    let mut guard = inner.borrow_mut();
                    guard.tick += 1;
                    trace!(tick = guard.tick, "document mutated");
                }
                run_sync(&inner);
            }
        });
        let doc = host.root_document();
        let cleanup = host.observe_mutations(&doc, ObserveFlags::STRUCTURAL, callback);
        inner.borrow_mut().observer_sub = Some(cleanup);
    } else if let Some(cleanup) = inner.borrow_mut().observer_sub.take() {
        cleanup();
    }
}

/// Acquire the scroll lock the first time a masked step has a resolved
/// context. The lock survives step transitions; only close paths release
/// it.
fn reconcile_overflow<H: DocumentHost + 'static>(
    inner: &Inner<H>,
    host: &H,
    want: bool,
    target: Option<&ResolvedTarget<H>>,
) {
    if !want {
        return;
    }
    let Some(target) = target else {
        return;
    };
    if inner.borrow().overflow.is_some() {
        return;
    }

    let guard = OverflowGuard::acquire(host, target.context.document.clone());
    inner.borrow_mut().overflow = Some(guard);
}

/// Keep the escape listener on the current context window, tearing the old
/// one down before installing a replacement.
fn reconcile_key_listener<H: DocumentHost + 'static>(
    inner: &Inner<H>,
    host: &H,
    active: bool,
    target: Option<&ResolvedTarget<H>>,
) {
    let desired = if active {
        target.map(|t| t.context.window.clone())
    } else {
        None
    };

    let current = inner.borrow().key_sub_window.clone();
    if desired == current {
        return;
    }

    let old = {
        let mut guard = inner.borrow_mut();
        guard.key_sub_window = None;
        guard.key_sub.take()
    };
    if let Some(cleanup) = old {
        cleanup();
    }

    if let Some(window) = desired {
        let weak = Rc::downgrade(inner);
        let callback: Rc<dyn Fn(&KeyboardEvent)> = Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                handle_key(&inner, event);
            }
        });
        let cleanup = host.listen_keys(&window, callback);
        let mut guard = inner.borrow_mut();
        guard.key_sub = Some(cleanup);
        guard.key_sub_window = Some(window);
    }
}

// =============================================================================
// Frame assembly
// =============================================================================

/// Assemble the renderer input for the current state. `None` when nothing
/// should render: inactive, unresolved anchor, or a masked tour whose
/// scroll lock has not been captured.
fn build_frame<H: DocumentHost>(
    state: &TourInner<H>,
    target: Option<&ResolvedTarget<H>>,
) -> Option<OverlayFrame<H>> {
    let index = state.nav.active_index(state.steps.len())?;
    let target = target?;
    if state.config.mask && state.overflow.is_none() {
        return None;
    }

    let step = state.steps[index].clone();
    let total = state.steps.len();
    let labels = state.config.labels(index + 1, total);
    let mask = state.config.mask.then(|| MaskProps {
        anchor: target.anchor.clone(),
        window: target.context.window.clone(),
        class_name: state.config.mask_class_name.clone(),
    });

    Some(OverlayFrame {
        anchor: target.anchor.clone(),
        parent: target.context.parent.clone(),
        window: target.context.window.clone(),
        step,
        step_index: index,
        step_total: total,
        labels,
        arrow: state.config.arrow,
        hotspot: state.config.hotspot,
        closable: state.config.closable,
        show_previous: state.config.show_previous_btn,
        show_skip: state.config.show_skip_btn,
        modal_class_name: state.config.modal_class_name.clone(),
        close_ele: state.config.close_ele.clone(),
        mask,
    })
}
