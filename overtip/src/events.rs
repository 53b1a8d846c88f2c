//! Tooltip notifications.

use std::fmt;
use std::sync::Arc;

use crate::tooltip::{Tooltip, TooltipId};

/// Which notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TooltipEventKind {
    /// `open` became `true`.
    Show,
    /// The opening transition settled.
    AfterShow,
    /// `open` became `false`.
    Hide,
    /// The closing transition settled.
    AfterHide,
}

impl TooltipEventKind {
    /// Event name as seen by hosts (`show`, `after-show`, `hide`, `after-hide`).
    pub fn name(&self) -> &'static str {
        match self {
            TooltipEventKind::Show => "show",
            TooltipEventKind::AfterShow => "after-show",
            TooltipEventKind::Hide => "hide",
            TooltipEventKind::AfterHide => "after-hide",
        }
    }

    /// Whether this event marks the start of a transition.
    pub fn is_start(&self) -> bool {
        matches!(self, TooltipEventKind::Show | TooltipEventKind::Hide)
    }
}

impl fmt::Display for TooltipEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification emitted by a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipEvent {
    /// Which kind of event
    pub kind: TooltipEventKind,
    /// Tooltip that emitted the event
    pub tooltip_id: TooltipId,
    /// Generation of the transition that produced the event.
    ///
    /// A start event and its "after" event always share the same generation.
    pub transition: u64,
}

impl TooltipEvent {
    pub fn new(kind: TooltipEventKind, tooltip_id: TooltipId, transition: u64) -> Self {
        Self {
            kind,
            tooltip_id,
            transition,
        }
    }
}

/// Synchronous event listener.
///
/// Receives the emitting tooltip by reference, so a listener that needs to
/// call back into it does not have to hold a handle of its own. A `Tooltip`
/// captured by one of its own listeners is never dropped.
pub type Listener = Arc<dyn Fn(&Tooltip, &TooltipEvent) + Send + Sync>;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
