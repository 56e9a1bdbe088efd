//! The hook callback as a pure function of (raw input, pipeline state).
//!
//! [`HookPipeline::process`] performs every step of the callback except
//! forwarding to the next hook in the OS chain, which the platform binding
//! does unconditionally after calling it.  Keeping it free of OS calls means
//! the full callback logic is testable without installing a hook.
//!
//! Order of operations:
//!
//! 1. non-action hook codes are ignored
//! 2. optional filters (injected events, modifier keys)
//! 3. resolve the key name; unresolvable keys are ignored
//! 4. classify the message; other messages are ignored
//! 5. sample modifiers
//! 6. update the chord and take its snapshot
//! 7. build the event
//!
//! The chord is only touched once steps 3 and 4 both succeeded.

use crate::chord::ChordTracker;
use crate::event::{KeyEvent, KeyEventKind};
use crate::keymap::{resolve_key_name, vk, KeyNameLookup};
use crate::modifiers::{sample_modifiers, KeyStateSource};

use super::raw::RawKeyInput;

/// Optional filters.  Both are off by default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Ignore events synthesised by `SendInput` and friends.
    pub ignore_injected: bool,
    /// Ignore Shift/Ctrl/Alt key presses themselves.
    pub skip_modifier_keys: bool,
}

#[derive(Debug, Default, Clone)]
pub struct HookPipeline {
    options: PipelineOptions,
    chord: ChordTracker,
}

impl HookPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            chord: ChordTracker::new(),
        }
    }

    pub fn chord(&self) -> &str {
        self.chord.current()
    }

    /// Runs one callback invocation.  Returns the event to enqueue, if any.
    pub fn process<K, N>(&mut self, raw: &RawKeyInput, keys: &K, names: &N) -> Option<KeyEvent>
    where
        K: KeyStateSource + ?Sized,
        N: KeyNameLookup + ?Sized,
    {
        if !raw.is_action() {
            return None;
        }
        if self.options.ignore_injected && raw.is_injected() {
            return None;
        }
        if self.options.skip_modifier_keys && vk::is_modifier(raw.vk_code) {
            return None;
        }

        let key_name = resolve_key_name(raw.vk_code, raw.scan_code, names)?;
        let kind = raw.kind()?;

        let modifiers = sample_modifiers(keys);
        let chord = match kind {
            KeyEventKind::KeyDown => self.chord.on_key_down(&key_name),
            KeyEventKind::KeyUp => self.chord.on_key_up(),
        };

        KeyEvent::new(kind, key_name, modifiers, chord)
    }
}
