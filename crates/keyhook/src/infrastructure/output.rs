//! Printing captured events for the command-line binary.

use std::io::Write;
use std::time::Duration;

use keyhook_core::KeyEvent;
use tokio::sync::oneshot;
use tokio::time::{Instant, Interval};
use tracing::{debug, info, warn};

use crate::application::consumer::{KeyEventConsumer, StopReason};
use crate::infrastructure::storage::config::OutputFormat;

/// Writes one line per event to `out`.
///
/// Text lines look like `keydown Home [shift] chord=Home+`; JSON lines carry
/// the consumer field names (`event`, `keyName`, `shiftKey`, ...).
pub struct EventPrinter<W> {
    out: W,
    format: OutputFormat,
    on_stop: Option<oneshot::Sender<StopReason>>,
}

impl<W: Write + Send + 'static> EventPrinter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            on_stop: None,
        }
    }

    /// Forwards the stop reason to `tx` once capture ends.
    pub fn with_stop_notifier(mut self, tx: oneshot::Sender<StopReason>) -> Self {
        self.on_stop = Some(tx);
        self
    }

    pub fn format_event(&self, event: &KeyEvent) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Text => Ok(event.to_string()),
            OutputFormat::Json => serde_json::to_string(event),
        }
    }
}

impl<W: Write + Send + 'static> KeyEventConsumer for EventPrinter<W> {
    fn on_key_event(&mut self, event: KeyEvent) {
        let line = match self.format_event(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!("could not format event: {e}");
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("could not write event: {e}");
        }
    }

    fn on_capture_stopped(&mut self, reason: &StopReason) {
        match reason {
            StopReason::Stopped => info!("capture stopped"),
            reason => debug!(?reason, "capture ended"),
        }
        if let Some(tx) = self.on_stop.take() {
            let _ = tx.send(reason.clone());
        }
    }
}

/// Ticks every `period`, starting one period from now.
pub fn heartbeat_timer(period: Duration) -> Interval {
    tokio::time::interval_at(Instant::now() + period, period)
}
