//! Tooltip configuration.

/// Default buffer size of the event broadcast stream.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Construction-time settings for a tooltip.
#[derive(Debug, Clone)]
pub struct TooltipConfig {
    /// Render the tooltip open from the start (no events are emitted for it).
    pub open: bool,

    /// A disabled tooltip refuses to open.
    pub disabled: bool,

    /// Text shown inside the tooltip.
    pub content: String,

    /// How many events a slow `subscribe()` receiver may fall behind before
    /// it observes a lag error.
    pub event_capacity: usize,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            open: false,
            disabled: false,
            content: String::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl TooltipConfig {
    /// Create a config with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Start out open.
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Start out disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the broadcast buffer size (minimum 1).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// `open` as actually applied: a disabled tooltip never starts open.
    pub(crate) fn initially_open(&self) -> bool {
        self.open && !self.disabled
    }
}
