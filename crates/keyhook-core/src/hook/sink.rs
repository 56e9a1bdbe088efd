//! Pipeline plus channel: everything the hook callback needs.

use tracing::trace;

use crate::channel::{ChannelStats, EventSender, SubmitOutcome};
use crate::keymap::KeyNameLookup;
use crate::modifiers::KeyStateSource;

use super::pipeline::HookPipeline;
use super::raw::RawKeyInput;

/// The callback context owned by the hook thread.
///
/// The platform binding installs it where its hook procedure can reach it and
/// calls [`handle`](Self::handle) once per invocation.  Dropping the sink
/// releases the producer half of the event channel.
#[derive(Debug)]
pub struct KeyEventSink {
    pipeline: HookPipeline,
    sender: EventSender,
}

impl KeyEventSink {
    pub fn new(pipeline: HookPipeline, sender: EventSender) -> Self {
        Self { pipeline, sender }
    }

    /// Processes one hook invocation.
    ///
    /// Returns `None` when no event was produced, otherwise what happened to
    /// the produced event.  Never blocks.
    pub fn handle<K, N>(&mut self, raw: &RawKeyInput, keys: &K, names: &N) -> Option<SubmitOutcome>
    where
        K: KeyStateSource + ?Sized,
        N: KeyNameLookup + ?Sized,
    {
        let event = self.pipeline.process(raw, keys, names)?;
        trace!(%event, "captured");
        Some(self.sender.submit(event))
    }

    pub fn stats(&self) -> std::sync::Arc<ChannelStats> {
        self.sender.stats()
    }
}
