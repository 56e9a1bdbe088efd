//! The "currently held combination" accumulator.
//!
//! Every key-down appends `name + "+"`; any key-up clears the whole string,
//! whichever key was released.  Releasing one key of a three-key combination
//! therefore forgets the other two even though they are still held.  The
//! result reads as "keys typed since the last release", which is what
//! combination detection downstream expects.
//!
//! The tracker is owned by the keyboard hook pipeline and is mutated only from
//! the hook callback, so it needs no locking.  It outlives pause/resume cycles.

/// Separator appended after every key name.
pub const CHORD_SEPARATOR: &str = "+";

#[derive(Debug, Default, Clone)]
pub struct ChordTracker {
    buffer: String,
}

impl ChordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key_name` and the separator, returning the chord after the append.
    pub fn on_key_down(&mut self, key_name: &str) -> String {
        self.buffer.push_str(key_name);
        self.buffer.push_str(CHORD_SEPARATOR);
        self.buffer.clone()
    }

    /// Clears the chord unconditionally and returns the (empty) snapshot.
    pub fn on_key_up(&mut self) -> String {
        self.buffer.clear();
        String::new()
    }

    pub fn current(&self) -> &str {
        &self.buffer
    }
}
