//! Visibility core for tooltip overlays.
//!
//! A [`Tooltip`] holds a single `open` flag and guarantees an ordered pair of
//! events around every change of it: `show` then `after-show` when opening,
//! `hide` then `after-hide` when closing. The "after" event fires only once
//! the [`PresentationAdapter`] reports that the visual effect has settled, at
//! which point the rendered node's `hidden` flag equals `!open`.
//!
//! Requests that arrive mid-transition supersede the pending one: its
//! settlement is discarded and its "after" event never fires.
//!
//! Placement, styling and trigger wiring (hover, focus) are left to the host.

pub mod adapter;
pub mod config;
pub mod error;
pub mod events;
pub mod transition;
pub mod visibility;

mod notifier;
mod tooltip;

pub use adapter::{
    AnimatedAdapter, InstantAdapter, PresentationAdapter, RenderedBase, SignalAdapter,
};
pub use config::TooltipConfig;
pub use error::TooltipError;
pub use events::{ListenerId, TooltipEvent, TooltipEventKind};
pub use tooltip::{Settlement, Tooltip, TooltipId};
pub use transition::TransitionToken;
pub use visibility::{Direction, Visibility};

pub mod prelude {
    pub use crate::adapter::{
        AnimatedAdapter, InstantAdapter, PresentationAdapter, RenderedBase, SignalAdapter,
    };
    pub use crate::config::TooltipConfig;
    pub use crate::error::TooltipError;
    pub use crate::events::{TooltipEvent, TooltipEventKind};
    pub use crate::tooltip::{Settlement, Tooltip};
    pub use crate::visibility::{Direction, Visibility};
}
