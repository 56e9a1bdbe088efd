//! Integration tests for the keyhook-core capture path.
//!
//! These drive raw hook input through [`KeyEventSink`] into the bounded
//! channel and read it back on the consumer side, exactly as the hook thread
//! and the dispatcher do, but with a simulated keyboard instead of the OS.

use std::collections::{HashMap, HashSet};

use keyhook_core::{
    bounded,
    keymap::vk::{VK_HOME, VK_LCONTROL, VK_LSHIFT},
    HookPipeline, KeyEvent, KeyEventKind, KeyEventSink, KeyNameLookup, KeyStateSource,
    PipelineOptions, RawKeyInput, SubmitOutcome,
};

// ── Simulated keyboard ────────────────────────────────────────────────────────

/// Tracks which keys are physically down and what the OS would call them.
#[derive(Default)]
struct SimKeyboard {
    held: HashSet<u32>,
    names: HashMap<u32, String>,
}

impl SimKeyboard {
    fn with_letters() -> Self {
        let mut kb = Self::default();
        for (scan, name) in [(0x1E, "A"), (0x30, "B"), (0x2E, "C"), (0x20, "D")] {
            kb.names.insert(scan, name.to_string());
        }
        kb
    }

    /// Presses a key: it is held from now on, and the hook sees a key-down.
    fn press(&mut self, sink: &mut KeyEventSink, vk: u32, scan: u32) -> Option<SubmitOutcome> {
        self.held.insert(vk);
        sink.handle(&RawKeyInput::key_down(vk, scan), &*self, &*self)
    }

    fn release(&mut self, sink: &mut KeyEventSink, vk: u32, scan: u32) -> Option<SubmitOutcome> {
        self.held.remove(&vk);
        sink.handle(&RawKeyInput::key_up(vk, scan), &*self, &*self)
    }
}

impl KeyStateSource for SimKeyboard {
    fn is_key_down(&self, vk: u32) -> bool {
        self.held.contains(&vk)
    }
}

impl KeyNameLookup for SimKeyboard {
    fn key_name_text(&self, scan_code: u32) -> Option<String> {
        self.names.get(&scan_code).cloned()
    }
}

fn summary(event: &KeyEvent) -> (KeyEventKind, String, String) {
    (
        event.kind(),
        event.key_name().to_string(),
        event.chord().to_string(),
    )
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn test_a_then_control_press_and_release_sequence() {
    // Arrange
    let (tx, mut rx) = bounded(16);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    // Act
    kb.press(&mut sink, 0x41, 0x1E);
    kb.press(&mut sink, VK_LCONTROL, 0x1D);
    kb.release(&mut sink, VK_LCONTROL, 0x1D);
    kb.release(&mut sink, 0x41, 0x1E);
    let events = rx.drain();

    // Assert
    let got: Vec<_> = events.iter().map(summary).collect();
    assert_eq!(
        got,
        vec![
            (KeyEventKind::KeyDown, "A".into(), "A+".into()),
            (KeyEventKind::KeyDown, "Control".into(), "A+Control+".into()),
            (KeyEventKind::KeyUp, "Control".into(), "".into()),
            (KeyEventKind::KeyUp, "A".into(), "".into()),
        ]
    );
    assert!(events[1].ctrl_held());
    assert!(!events[2].ctrl_held());
}

#[test]
fn test_n_consecutive_key_downs_concatenate_in_arrival_order() {
    let (tx, mut rx) = bounded(16);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    for (vk, scan) in [(0x44, 0x20), (0x42, 0x30), (0x41, 0x1E), (0x43, 0x2E)] {
        kb.press(&mut sink, vk, scan);
    }
    let events = rx.drain();

    let chords: Vec<_> = events.iter().map(|e| e.chord().to_string()).collect();
    assert_eq!(chords, vec!["D+", "D+B+", "D+B+A+", "D+B+A+C+"]);
}

#[test]
fn test_any_key_up_resets_chord_for_next_key_down() {
    let (tx, mut rx) = bounded(16);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    kb.press(&mut sink, 0x41, 0x1E);
    kb.press(&mut sink, 0x42, 0x30);
    // B is still held; releasing A alone resets anyway
    kb.release(&mut sink, 0x41, 0x1E);
    kb.press(&mut sink, 0x43, 0x2E);
    let last = rx.drain().pop().expect("events");

    assert_eq!(last.key_name(), "C");
    assert_eq!(last.chord(), "C+");
}

#[test]
fn test_unresolvable_keys_never_reach_the_consumer() {
    // Arrange: 0xE8 has neither a table entry nor OS text
    let (tx, mut rx) = bounded(16);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    // Act
    kb.press(&mut sink, 0x41, 0x1E);
    let outcome = kb.press(&mut sink, 0xE8, 0x00);
    kb.press(&mut sink, 0x42, 0x30);
    let events = rx.drain();

    // Assert
    assert_eq!(outcome, None);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| !e.key_name().is_empty()));
    assert_eq!(events[1].chord(), "A+B+", "unresolvable key must not enter the chord");
}

#[test]
fn test_modifiers_are_sampled_per_event() {
    let (tx, mut rx) = bounded(16);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    kb.press(&mut sink, VK_LSHIFT, 0x2A);
    kb.press(&mut sink, VK_HOME, 0x47);
    kb.release(&mut sink, VK_LSHIFT, 0x2A);
    kb.release(&mut sink, VK_HOME, 0x47);
    let events = rx.drain();

    let shift: Vec<_> = events.iter().map(KeyEvent::shift_held).collect();
    let names: Vec<_> = events.iter().map(KeyEvent::key_name).collect();
    assert_eq!(shift, vec![true, true, false, false]);
    assert_eq!(names, vec!["Shift", "Home", "Shift", "Home"]);
    assert_eq!(events[1].chord(), "Shift+Home+");
}

#[test]
fn test_skip_modifier_keys_keeps_chord_to_real_keys() {
    let (tx, mut rx) = bounded(16);
    let options = PipelineOptions {
        skip_modifier_keys: true,
        ..PipelineOptions::default()
    };
    let mut sink = KeyEventSink::new(HookPipeline::new(options), tx);
    let mut kb = SimKeyboard::with_letters();

    kb.press(&mut sink, VK_LCONTROL, 0x1D);
    kb.press(&mut sink, 0x41, 0x1E);
    let events = rx.drain();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].chord(), "A+");
    assert!(events[0].ctrl_held());
}

#[test]
fn test_saturated_channel_drops_excess_and_keeps_order() {
    // Arrange
    let (tx, mut rx) = bounded(4);
    let stats = tx.stats();
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    // Act: 4 down/up pairs = 8 events into a queue of 4
    for (vk, scan) in [(0x41, 0x1E), (0x42, 0x30), (0x43, 0x2E), (0x44, 0x20)] {
        kb.press(&mut sink, vk, scan);
        kb.release(&mut sink, vk, scan);
    }
    let events = rx.drain();

    // Assert
    let names: Vec<_> = events.iter().map(|e| e.key_name().to_string()).collect();
    assert_eq!(names, vec!["A", "A", "B", "B"]);
    assert_eq!(stats.queued(), 4);
    assert_eq!(stats.dropped(), 4);
}

#[test]
fn test_event_serializes_with_consumer_field_names() {
    let (tx, mut rx) = bounded(4);
    let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
    let mut kb = SimKeyboard::with_letters();

    kb.press(&mut sink, 0x41, 0x1E);
    let event = rx.try_recv().expect("event");
    let json = serde_json::to_value(&event).expect("serialize");

    assert_eq!(
        json,
        serde_json::json!({
            "event": "keydown",
            "keyName": "A",
            "shiftKey": false,
            "ctrlKey": false,
            "altKey": false,
            "metaKey": false,
            "chord": "A+",
        })
    );
}
