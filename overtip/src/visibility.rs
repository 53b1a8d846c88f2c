//! The four-phase visibility state machine.
//!
//! A tooltip is always in one of two terminal phases (`Hidden`, `Shown`) or one
//! of two transient phases (`Showing`, `Hiding`) while the presentation adapter
//! settles the visual effect of a transition.

use crate::events::TooltipEventKind;

/// Visibility phase of a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Not visible. Initial phase.
    #[default]
    Hidden,
    /// Opening, waiting for the adapter to settle.
    Showing,
    /// Visible.
    Shown,
    /// Closing, waiting for the adapter to settle.
    Hiding,
}

impl Visibility {
    /// Terminal phase for a stable `open` value.
    pub fn from_open(open: bool) -> Self {
        if open {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }

    /// The `open` value this phase is heading towards (or resting at).
    pub fn is_open(&self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Shown)
    }

    /// Whether a transition is waiting for settlement.
    pub fn is_transient(&self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Hiding)
    }

    /// Phase entered when `open` is requested.
    ///
    /// Returns `None` when the request targets the state the tooltip is
    /// already in or heading towards. Such requests emit nothing.
    pub fn request(self, open: bool) -> Option<Visibility> {
        match (self, open) {
            (Visibility::Hidden | Visibility::Hiding, true) => Some(Visibility::Showing),
            (Visibility::Shown | Visibility::Showing, false) => Some(Visibility::Hiding),
            _ => None,
        }
    }

    /// Phase reached once the pending transition settles.
    pub fn settle(self) -> Visibility {
        match self {
            Visibility::Showing => Visibility::Shown,
            Visibility::Hiding => Visibility::Hidden,
            terminal => terminal,
        }
    }
}

/// Direction of a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Hidden to shown.
    Show,
    /// Shown to hidden.
    Hide,
}

impl Direction {
    pub fn from_open(open: bool) -> Self {
        if open { Direction::Show } else { Direction::Hide }
    }

    /// Value of `open` once this transition has been requested.
    pub fn target_open(&self) -> bool {
        matches!(self, Direction::Show)
    }

    /// Event fired when the transition starts.
    pub fn start_kind(&self) -> TooltipEventKind {
        match self {
            Direction::Show => TooltipEventKind::Show,
            Direction::Hide => TooltipEventKind::Hide,
        }
    }

    /// Event fired once the transition settles.
    pub fn after_kind(&self) -> TooltipEventKind {
        match self {
            Direction::Show => TooltipEventKind::AfterShow,
            Direction::Hide => TooltipEventKind::AfterHide,
        }
    }
}
