//! Delivery of captured events to the embedding program.

use keyhook_core::{HookError, KeyEvent};

/// Why capture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Capture was shut down on request.
    Stopped,
    /// Installing or removing the OS hook failed; the hook thread has exited.
    HookFailed(HookError),
    /// The hook thread ended without reporting why (it panicked).
    ThreadLost,
}

/// Receives captured events on the dispatcher task.
///
/// Events arrive one at a time, in capture order.  After the last event,
/// [`on_capture_stopped`](Self::on_capture_stopped) is called exactly once.
///
/// Any `FnMut(KeyEvent) + Send + 'static` closure is a consumer that ignores
/// the stop notification.
pub trait KeyEventConsumer: Send + 'static {
    fn on_key_event(&mut self, event: KeyEvent);

    fn on_capture_stopped(&mut self, _reason: &StopReason) {}
}

impl<F> KeyEventConsumer for F
where
    F: FnMut(KeyEvent) + Send + 'static,
{
    fn on_key_event(&mut self, event: KeyEvent) {
        self(event)
    }
}
