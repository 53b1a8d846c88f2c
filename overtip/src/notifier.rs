//! Ordered delivery of tooltip events.
//!
//! Events are pushed onto a queue while the tooltip's state lock is held and
//! then drained by one dispatching thread at a time. A listener that re-enters
//! `show()`/`hide()` only enqueues; its events are delivered after the event
//! currently being dispatched, so every observer sees the same order in which
//! the state actually changed.
//!
//! A caller on another thread waits for the running dispatch to finish, so
//! its own events have been delivered by the time `drain` returns.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use log::{error, trace};
use tokio::sync::broadcast;

use crate::error::extract_panic_message;
use crate::events::{Listener, ListenerId, TooltipEvent, TooltipEventKind};
use crate::tooltip::Tooltip;

struct ListenerEntry {
    id: ListenerId,
    /// `None` listens to every kind
    kind: Option<TooltipEventKind>,
    listener: Listener,
}

struct NotifierInner {
    listeners: RwLock<Vec<ListenerEntry>>,
    queue: Mutex<VecDeque<TooltipEvent>>,
    /// Held for the whole of a dispatch
    gate: Mutex<()>,
    /// Thread currently holding `gate`
    dispatcher: Mutex<Option<ThreadId>>,
    next_listener: AtomicU64,
    tx: broadcast::Sender<TooltipEvent>,
}

/// Event queue plus its two delivery surfaces: listeners and a broadcast stream.
#[derive(Clone)]
pub(crate) struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(NotifierInner {
                listeners: RwLock::new(Vec::new()),
                queue: Mutex::new(VecDeque::new()),
                gate: Mutex::new(()),
                dispatcher: Mutex::new(None),
                next_listener: AtomicU64::new(0),
                tx,
            }),
        }
    }

    pub(crate) fn listen(
        &self,
        kind: Option<TooltipEventKind>,
        listener: Listener,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::SeqCst));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ListenerEntry { id, kind, listener });
        id
    }

    pub(crate) fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<TooltipEvent> {
        self.inner.tx.subscribe()
    }

    /// Queue an event without delivering it.
    pub(crate) fn enqueue(&self, event: TooltipEvent) {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }

    /// Deliver queued events to listeners, passing them `source`.
    ///
    /// Called from inside a listener this only returns; the outer dispatch
    /// picks the new events up. Called from any other thread while a
    /// dispatch is running, this blocks until that dispatch is done.
    pub(crate) fn drain(&self, source: &Tooltip) {
        let current = thread::current().id();
        if *self.dispatcher() == Some(current) {
            return;
        }

        let _gate = self.inner.gate.lock().unwrap_or_else(PoisonError::into_inner);
        *self.dispatcher() = Some(current);
        while let Some(event) = self.pop() {
            self.deliver(source, &event);
        }
        *self.dispatcher() = None;
    }

    fn dispatcher(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.inner
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pop(&self) -> Option<TooltipEvent> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn deliver(&self, source: &Tooltip, event: &TooltipEvent) {
        trace!(
            "{}: delivering '{}' (transition {})",
            event.tooltip_id, event.kind, event.transition
        );

        // No subscribers is fine.
        let _ = self.inner.tx.send(*event);

        // Snapshot so listeners can (un)register while being called.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.kind.is_none_or(|kind| kind == event.kind))
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        for listener in listeners {
            let call = AssertUnwindSafe(|| listener(source, event));
            if let Err(panic) = std::panic::catch_unwind(call) {
                error!(
                    "{}: '{}' listener panicked: {}",
                    event.tooltip_id,
                    event.kind,
                    extract_panic_message(&panic)
                );
            }
        }
    }
}
