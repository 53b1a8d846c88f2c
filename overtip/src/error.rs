//! Error types.
//!
//! Transition requests are total and never fail. Errors only arise when a
//! tooltip is created outside an async runtime or when an awaited event
//! stream breaks down.

use std::any::Any;

/// Errors surfaced by the tooltip API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TooltipError {
    /// No tokio runtime is active on the calling thread.
    #[error("Tooltip must be created inside a tokio runtime (or given a runtime handle)")]
    NoRuntime,

    /// The subscriber fell behind and missed events.
    #[error("Tooltip event stream lagged, {0} events skipped")]
    EventsLagged(u64),

    /// The tooltip's event stream was closed.
    #[error("Tooltip event stream closed")]
    EventStreamClosed,
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. Anything else
/// falls back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
