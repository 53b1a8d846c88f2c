//! Presentation adapters.
//!
//! The tooltip core never renders anything itself. It writes the `hidden`
//! flag of a presentation node and waits on the adapter to report when the
//! visual effect of a transition (fade, reposition, a plain repaint) is done.
//!
//! Three adapters ship with the crate:
//! - [`InstantAdapter`] settles immediately
//! - [`AnimatedAdapter`] settles after a fade of configurable length
//! - [`SignalAdapter`] settles whenever the host says so, for hosts that drive
//!   their own render loop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, oneshot};

use crate::visibility::Direction;

/// Rendering collaborator of a tooltip.
///
/// `set_hidden` is called while the tooltip's state is locked and must not
/// call back into the tooltip.
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Write the visibility slot of the rendered node.
    fn set_hidden(&self, hidden: bool);

    /// Resolve once the visual effect for `direction` has completed.
    ///
    /// Called once per transition. The future is dropped if the transition is
    /// superseded before it resolves. A future that never resolves means the
    /// "after" event never fires.
    async fn settle(&self, direction: Direction);
}

/// The rendered root node's `hidden` flag.
///
/// Cheap to clone; clones share the flag.
#[derive(Debug, Clone)]
pub struct RenderedBase {
    hidden: Arc<AtomicBool>,
}

impl RenderedBase {
    /// A node that starts out hidden.
    pub fn new() -> Self {
        Self {
            hidden: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
    }
}

impl Default for RenderedBase {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// InstantAdapter
// =============================================================================

/// Adapter without visual effects: every transition settles at once.
#[derive(Debug, Clone, Default)]
pub struct InstantAdapter {
    base: RenderedBase,
}

impl InstantAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &RenderedBase {
        &self.base
    }
}

#[async_trait]
impl PresentationAdapter for InstantAdapter {
    fn set_hidden(&self, hidden: bool) {
        self.base.set_hidden(hidden);
    }

    async fn settle(&self, _direction: Direction) {}
}

// =============================================================================
// AnimatedAdapter
// =============================================================================

/// Default fade-in length.
pub const DEFAULT_SHOW_DURATION: Duration = Duration::from_millis(150);

/// Default fade-out length.
pub const DEFAULT_HIDE_DURATION: Duration = Duration::from_millis(150);

/// Adapter that fades the tooltip in and out.
///
/// Settlement happens once the fade for the transition's direction has run
/// its course. With `reduce_motion` enabled there is no fade and transitions
/// settle immediately.
#[derive(Debug, Clone)]
pub struct AnimatedAdapter {
    base: RenderedBase,
    show_duration: Duration,
    hide_duration: Duration,
    reduce_motion: bool,
}

impl Default for AnimatedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimatedAdapter {
    pub fn new() -> Self {
        Self {
            base: RenderedBase::new(),
            show_duration: DEFAULT_SHOW_DURATION,
            hide_duration: DEFAULT_HIDE_DURATION,
            reduce_motion: false,
        }
    }

    /// Set the fade-in length.
    pub fn show_duration(mut self, duration: Duration) -> Self {
        self.show_duration = duration;
        self
    }

    /// Set the fade-out length.
    pub fn hide_duration(mut self, duration: Duration) -> Self {
        self.hide_duration = duration;
        self
    }

    /// Skip fades entirely.
    pub fn reduce_motion(mut self, reduce_motion: bool) -> Self {
        self.reduce_motion = reduce_motion;
        self
    }

    pub fn base(&self) -> &RenderedBase {
        &self.base
    }

    /// How long a transition in `direction` takes to settle.
    pub fn duration(&self, direction: Direction) -> Duration {
        if self.reduce_motion {
            return Duration::ZERO;
        }
        match direction {
            Direction::Show => self.show_duration,
            Direction::Hide => self.hide_duration,
        }
    }
}

#[async_trait]
impl PresentationAdapter for AnimatedAdapter {
    fn set_hidden(&self, hidden: bool) {
        self.base.set_hidden(hidden);
    }

    async fn settle(&self, direction: Direction) {
        let duration = self.duration(direction);
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

// =============================================================================
// SignalAdapter
// =============================================================================

struct Waiter {
    direction: Direction,
    tx: oneshot::Sender<()>,
}

#[derive(Default)]
struct SignalInner {
    waiters: Mutex<VecDeque<Waiter>>,
    arrived: Notify,
}

/// Adapter whose transitions settle when the host signals completion.
///
/// Every transition parks a waiter; [`complete`](Self::complete) releases the
/// oldest one. Waiters belonging to superseded transitions are dropped by the
/// tooltip and skipped here.
#[derive(Clone, Default)]
pub struct SignalAdapter {
    base: RenderedBase,
    inner: Arc<SignalInner>,
}

impl std::fmt::Debug for SignalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalAdapter")
            .field("base", &self.base)
            .field("pending", &self.pending())
            .finish()
    }
}

impl SignalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &RenderedBase {
        &self.base
    }

    /// Number of transitions waiting for a completion signal.
    pub fn pending(&self) -> usize {
        self.lock_live().len()
    }

    /// Settle the oldest waiting transition.
    ///
    /// Returns its direction, or `None` if nothing was waiting.
    pub fn complete(&self) -> Option<Direction> {
        let mut waiters = self.lock_live();
        while let Some(waiter) = waiters.pop_front() {
            if waiter.tx.send(()).is_ok() {
                return Some(waiter.direction);
            }
        }
        None
    }

    /// Settle every waiting transition. Returns how many were released.
    pub fn complete_all(&self) -> usize {
        let mut released = 0;
        while self.complete().is_some() {
            released += 1;
        }
        released
    }

    /// Wait until a transition asks for settlement and return its direction.
    ///
    /// The waiter stays parked; call [`complete`](Self::complete) to release it.
    pub async fn next_request(&self) -> Direction {
        loop {
            if let Some(direction) = self.lock_live().front().map(|w| w.direction) {
                return direction;
            }
            self.inner.arrived.notified().await;
        }
    }

    /// Lock the waiter queue after dropping waiters nobody listens to anymore.
    fn lock_live(&self) -> std::sync::MutexGuard<'_, VecDeque<Waiter>> {
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        waiters.retain(|w| !w.tx.is_closed());
        waiters
    }
}

#[async_trait]
impl PresentationAdapter for SignalAdapter {
    fn set_hidden(&self, hidden: bool) {
        self.base.set_hidden(hidden);
    }

    async fn settle(&self, direction: Direction) {
        let (tx, rx) = oneshot::channel();
        self.lock_live().push_back(Waiter { direction, tx });
        self.inner.arrived.notify_one();
        // Sender dropped without a signal only happens if the adapter itself
        // is torn down; treat it as settled.
        let _ = rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_base_starts_hidden() {
        let base = RenderedBase::new();
        assert!(base.is_hidden());
        let shared = base.clone();
        shared.set_hidden(false);
        assert!(!base.is_hidden());
    }

    #[test]
    fn test_reduce_motion_zeroes_durations() {
        let adapter = AnimatedAdapter::new()
            .show_duration(Duration::from_millis(300))
            .reduce_motion(true);
        assert_eq!(adapter.duration(Direction::Show), Duration::ZERO);
        assert_eq!(adapter.duration(Direction::Hide), Duration::ZERO);
    }

    #[test]
    fn test_animated_durations_per_direction() {
        let adapter = AnimatedAdapter::new()
            .show_duration(Duration::from_millis(300))
            .hide_duration(Duration::from_millis(100));
        assert_eq!(adapter.duration(Direction::Show), Duration::from_millis(300));
        assert_eq!(adapter.duration(Direction::Hide), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_signal_adapter_releases_in_order() {
        let adapter = SignalAdapter::new();
        let first = tokio::spawn({
            let adapter = adapter.clone();
            async move { adapter.settle(Direction::Show).await }
        });

        assert_eq!(adapter.next_request().await, Direction::Show);
        assert_eq!(adapter.pending(), 1);
        assert_eq!(adapter.complete(), Some(Direction::Show));
        first.await.unwrap();

        assert_eq!(adapter.pending(), 0);
        assert_eq!(adapter.complete(), None);
    }

    #[tokio::test]
    async fn test_signal_adapter_skips_dropped_waiters() {
        let adapter = SignalAdapter::new();
        let abandoned = tokio::spawn({
            let adapter = adapter.clone();
            async move { adapter.settle(Direction::Show).await }
        });
        adapter.next_request().await;
        abandoned.abort();
        let _ = abandoned.await;

        assert_eq!(adapter.pending(), 0);
        assert_eq!(adapter.complete(), None);
    }
}
