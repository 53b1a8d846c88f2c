//! The tooltip widget: visibility state and the single transition path.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use log::{debug, error, trace};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::adapter::PresentationAdapter;
use crate::config::TooltipConfig;
use crate::error::{TooltipError, extract_panic_message};
use crate::events::{ListenerId, TooltipEvent, TooltipEventKind};
use crate::notifier::Notifier;
use crate::transition::TransitionToken;
use crate::visibility::{Direction, Visibility};

/// Unique identifier for a Tooltip instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TooltipId(usize);

impl TooltipId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for TooltipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__tooltip_{}", self.0)
    }
}

/// How an awaited transition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The requested state was reached and its "after" event fired (or the
    /// tooltip was already resting in that state).
    Settled,
    /// A request for the opposite state replaced this one before it settled.
    Superseded,
    /// The tooltip is disabled and refused to open.
    Disabled,
}

#[derive(Debug)]
struct TooltipInner {
    /// Visibility intent, updated eagerly on every accepted request
    open: bool,
    phase: Visibility,
    disabled: bool,
    /// Last value written to the adapter's slot
    hidden: bool,
    content: String,
    /// The transition waiting for settlement, if any
    pending: Option<TransitionToken>,
    /// Generation of the most recently started transition
    generation: u64,
}

struct TooltipShared {
    id: TooltipId,
    state: RwLock<TooltipInner>,
    notifier: Notifier,
    adapter: Arc<dyn PresentationAdapter>,
    handle: Handle,
    dirty: AtomicBool,
}

impl TooltipShared {
    fn read_state(&self) -> RwLockReadGuard<'_, TooltipInner> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TooltipInner> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self, inner: &mut TooltipInner, hidden: bool) {
        inner.hidden = hidden;
        self.adapter.set_hidden(hidden);
        self.dirty.store(true, Ordering::SeqCst);
    }
}

impl Drop for TooltipShared {
    fn drop(&mut self) {
        let inner = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = inner.pending.take() {
            pending.supersede();
        }
    }
}

/// A tooltip's visibility core.
///
/// `Tooltip` owns the `open` flag, funnels every change of it through one
/// transition path and emits `show`/`after-show` or `hide`/`after-hide`
/// around each transition. Rendering is delegated to a
/// [`PresentationAdapter`], which receives the `hidden` flag and reports when
/// a transition's visual effect has settled.
///
/// Cloning is cheap; clones refer to the same tooltip. Dropping the last clone
/// cancels a pending transition.
///
/// # Example
///
/// ```ignore
/// let adapter = AnimatedAdapter::new();
/// let tooltip = Tooltip::with_config(TooltipConfig::new("Copy to clipboard"), adapter)?;
///
/// tooltip.add_listener(TooltipEventKind::AfterShow, |_, event| {
///     log::info!("{} is fully visible", event.tooltip_id);
/// });
///
/// // Hover started
/// tooltip.show();
/// // ...or, equivalently
/// tooltip.set_open(true);
/// ```
#[derive(Clone)]
pub struct Tooltip {
    shared: Arc<TooltipShared>,
}

impl std::fmt::Debug for Tooltip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.read_state();
        f.debug_struct("Tooltip")
            .field("id", &self.shared.id)
            .field("phase", &inner.phase)
            .field("hidden", &inner.hidden)
            .field("disabled", &inner.disabled)
            .finish()
    }
}

impl Tooltip {
    /// Create a closed tooltip on the current tokio runtime.
    pub fn new(adapter: impl PresentationAdapter + 'static) -> Result<Self, TooltipError> {
        Self::with_config(TooltipConfig::default(), adapter)
    }

    /// Create a tooltip on the current tokio runtime.
    pub fn with_config(
        config: TooltipConfig,
        adapter: impl PresentationAdapter + 'static,
    ) -> Result<Self, TooltipError> {
        let handle = Handle::try_current().map_err(|_| TooltipError::NoRuntime)?;
        Ok(Self::with_handle(config, adapter, handle))
    }

    /// Create a tooltip whose settle tasks run on `handle`.
    ///
    /// The initial state is rendered straight away and emits no events.
    pub fn with_handle(
        config: TooltipConfig,
        adapter: impl PresentationAdapter + 'static,
        handle: Handle,
    ) -> Self {
        let open = config.initially_open();
        let adapter: Arc<dyn PresentationAdapter> = Arc::new(adapter);
        adapter.set_hidden(!open);

        let id = TooltipId::new();
        debug!("{}: created {}", id, if open { "open" } else { "hidden" });

        Self {
            shared: Arc::new(TooltipShared {
                id,
                state: RwLock::new(TooltipInner {
                    open,
                    phase: Visibility::from_open(open),
                    disabled: config.disabled,
                    hidden: !open,
                    content: config.content,
                    pending: None,
                    generation: 0,
                }),
                notifier: Notifier::new(config.event_capacity),
                adapter,
                handle,
                dirty: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> TooltipId {
        self.shared.id
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    /// Request the tooltip to open. Returns without waiting for settlement.
    pub fn show(&self) {
        self.request(true);
    }

    /// Request the tooltip to close. Returns without waiting for settlement.
    pub fn hide(&self) {
        self.request(false);
    }

    /// Flip the current intent.
    pub fn toggle(&self) {
        let open = self.is_open();
        self.request(!open);
    }

    /// Current visibility intent.
    pub fn is_open(&self) -> bool {
        self.shared.read_state().open
    }

    /// Property-style access; behaves exactly like `show()`/`hide()`.
    pub fn set_open(&self, open: bool) {
        self.request(open);
    }

    pub fn visibility(&self) -> Visibility {
        self.shared.read_state().phase
    }

    /// The `hidden` value last written to the presentation node.
    pub fn is_hidden(&self) -> bool {
        self.shared.read_state().hidden
    }

    /// Whether a transition is waiting for the adapter to settle.
    pub fn is_transitioning(&self) -> bool {
        self.shared.read_state().pending.is_some()
    }

    /// Token of the transition waiting for settlement, if any.
    pub fn pending_transition(&self) -> Option<TransitionToken> {
        self.shared.read_state().pending.clone()
    }

    /// Open and wait until the opening transition settles.
    pub async fn show_settled(&self) -> Result<Settlement, TooltipError> {
        self.request_settled(true).await
    }

    /// Close and wait until the closing transition settles.
    pub async fn hide_settled(&self) -> Result<Settlement, TooltipError> {
        self.request_settled(false).await
    }

    /// The one transition path behind `show()`, `hide()` and `set_open()`.
    fn request(&self, open: bool) {
        let shared = &self.shared;
        let token = {
            let mut inner = shared.write_state();

            if open && inner.disabled {
                debug!("{}: show ignored, tooltip is disabled", shared.id);
                return;
            }

            let Some(next) = inner.phase.request(open) else {
                trace!(
                    "{}: {} ignored while {:?}",
                    shared.id,
                    if open { "show" } else { "hide" },
                    inner.phase
                );
                return;
            };

            if let Some(previous) = inner.pending.take() {
                debug!(
                    "{}: transition {} superseded",
                    shared.id,
                    previous.generation()
                );
                previous.supersede();
            }

            inner.generation += 1;
            let direction = Direction::from_open(open);
            let token = TransitionToken::new(inner.generation, direction);
            debug!(
                "{}: {:?} -> {:?} (transition {})",
                shared.id, inner.phase, next, inner.generation
            );

            inner.open = open;
            inner.phase = next;
            inner.pending = Some(token.clone());

            // Unhide up front so the opening effect has something to show.
            // Closing keeps the node visible until the effect settles.
            if open {
                shared.write_slot(&mut inner, false);
            }

            shared.notifier.enqueue(TooltipEvent::new(
                direction.start_kind(),
                shared.id,
                token.generation(),
            ));
            token
        };

        shared.notifier.drain(self);
        self.spawn_settle(token);
    }

    /// Finish `token`'s transition, unless a newer one replaced it.
    fn complete(&self, token: &TransitionToken) {
        let shared = &self.shared;
        {
            let mut inner = shared.write_state();
            let current = inner.pending.as_ref().is_some_and(|p| p.is_same(token));
            if !current || token.is_superseded() {
                debug!(
                    "{}: discarding stale settlement of transition {}",
                    shared.id,
                    token.generation()
                );
                return;
            }

            inner.pending = None;
            inner.phase = inner.phase.settle();
            let hidden = !inner.open;
            shared.write_slot(&mut inner, hidden);
            debug!(
                "{}: transition {} settled as {:?}",
                shared.id,
                token.generation(),
                inner.phase
            );
            shared.notifier.enqueue(TooltipEvent::new(
                token.direction().after_kind(),
                shared.id,
                token.generation(),
            ));
        }
        shared.notifier.drain(self);
    }

    fn spawn_settle(&self, token: TransitionToken) {
        let shared = Arc::downgrade(&self.shared);
        let adapter = Arc::clone(&self.shared.adapter);
        let id = self.shared.id;

        self.shared.handle.spawn(async move {
            let direction = token.direction();
            let settled = tokio::select! {
                biased;
                _ = token.superseded() => false,
                result = AssertUnwindSafe(adapter.settle(direction)).catch_unwind() => {
                    match result {
                        Ok(()) => true,
                        Err(panic) => {
                            error!(
                                "{}: adapter panicked while settling {:?}: {}",
                                id,
                                direction,
                                extract_panic_message(&panic)
                            );
                            false
                        }
                    }
                }
            };

            if !settled {
                trace!("{}: settle task for transition {} ended", id, token.generation());
                return;
            }
            if let Some(shared) = shared.upgrade() {
                Tooltip { shared }.complete(&token);
            }
        });
    }

    async fn request_settled(&self, open: bool) -> Result<Settlement, TooltipError> {
        let mut events = self.subscribe();
        self.request(open);

        let generation = {
            let inner = self.shared.read_state();
            if open && inner.disabled && !inner.open {
                return Ok(Settlement::Disabled);
            }
            if inner.open != open {
                // A listener flipped it back while the start event was delivered.
                return Ok(Settlement::Superseded);
            }
            if inner.pending.is_none() {
                return Ok(Settlement::Settled);
            }
            inner.generation
        };

        let direction = Direction::from_open(open);
        let opposite = Direction::from_open(!open);
        loop {
            match events.recv().await {
                // Buffered from transitions older than the one being awaited
                Ok(event) if event.transition < generation => continue,
                Ok(event) if event.kind == direction.after_kind() => {
                    return Ok(Settlement::Settled);
                }
                // Only if nothing has already flipped it back again.
                Ok(event) if event.kind == opposite.start_kind() && self.is_open() != open => {
                    return Ok(Settlement::Superseded);
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    return Err(TooltipError::EventsLagged(skipped));
                }
                Err(RecvError::Closed) => return Err(TooltipError::EventStreamClosed),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Disabled / content
    // -------------------------------------------------------------------------

    pub fn is_disabled(&self) -> bool {
        self.shared.read_state().disabled
    }

    /// Disabling an open tooltip hides it.
    pub fn set_disabled(&self, disabled: bool) {
        let open = {
            let mut inner = self.shared.write_state();
            inner.disabled = disabled;
            inner.open
        };
        if disabled && open {
            self.hide();
        }
    }

    pub fn content(&self) -> String {
        self.shared.read_state().content.clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.shared.write_state().content = content.into();
        self.shared.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Call `listener` for every event of `kind`.
    ///
    /// The listener is handed this tooltip; use that instead of capturing a
    /// clone, which would keep the tooltip alive forever.
    pub fn add_listener<F>(&self, kind: TooltipEventKind, listener: F) -> ListenerId
    where
        F: Fn(&Tooltip, &TooltipEvent) + Send + Sync + 'static,
    {
        self.shared.notifier.listen(Some(kind), Arc::new(listener))
    }

    /// Call `listener` for every event.
    pub fn add_listener_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Tooltip, &TooltipEvent) + Send + Sync + 'static,
    {
        self.shared.notifier.listen(None, Arc::new(listener))
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.notifier.unlisten(id)
    }

    /// Stream of all events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TooltipEvent> {
        self.shared.notifier.subscribe()
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the rendered output needs refreshing
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.shared.dirty.store(false, Ordering::SeqCst);
    }
}
