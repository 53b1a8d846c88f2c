//! Pending-transition tokens.

use tokio_util::sync::CancellationToken;

use crate::visibility::Direction;

/// Identity of one in-flight transition.
///
/// Each accepted `show()`/`hide()` request mints a token with a fresh
/// generation. A newer request supersedes the pending token, which both wakes
/// the settle task (so it stops waiting on the adapter) and marks the token
/// stale for the completion check.
#[derive(Debug, Clone)]
pub struct TransitionToken {
    generation: u64,
    direction: Direction,
    cancel: CancellationToken,
}

impl TransitionToken {
    pub(crate) fn new(generation: u64, direction: Direction) -> Self {
        Self {
            generation,
            direction,
            cancel: CancellationToken::new(),
        }
    }

    /// Generation number, shared by the transition's start and "after" events.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a newer request replaced this transition.
    pub fn is_superseded(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn supersede(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the transition is superseded.
    pub(crate) async fn superseded(&self) {
        self.cancel.cancelled().await;
    }

    /// Whether `other` refers to the same transition.
    pub(crate) fn is_same(&self, other: &TransitionToken) -> bool {
        self.generation == other.generation
    }
}
