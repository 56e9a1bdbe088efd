//! The immutable key event record delivered to consumers.
//!
//! A [`KeyEvent`] is built inside the hook callback, moved into the delivery
//! channel, and handed to the consumer exactly once.  Its fields mirror the
//! payload the consumer sees, in this order:
//!
//! | # | Field        | Meaning                                         |
//! |---|--------------|-------------------------------------------------|
//! | 1 | `event`      | `"keydown"` or `"keyup"`                        |
//! | 2 | `keyName`    | display name of the key (`"Home"`, `"A"`, ...)  |
//! | 3 | `shiftKey`   | a Shift key was held when the event arrived     |
//! | 4 | `ctrlKey`    | a Ctrl key was held                             |
//! | 5 | `altKey`     | an Alt key was held                             |
//! | 6 | `metaKey`    | a Windows/Meta key was held                     |
//! | 7 | `chord`      | keys pressed since the last release, `+`-joined |
//!
//! The serialized form (JSON via `serde`) uses exactly these names.

use std::fmt;

use serde::Serialize;

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
}

impl KeyEventKind {
    /// Returns the event name consumers match on: `"keydown"` or `"keyup"`.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyEventKind::KeyDown => "keydown",
            KeyEventKind::KeyUp => "keyup",
        }
    }
}

impl fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier keys held at the instant the event arrived.
///
/// Each flag is `true` when either the left or the right physical key of that
/// modifier is down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Modifiers {
    #[serde(rename = "shiftKey")]
    pub shift: bool,
    #[serde(rename = "ctrlKey")]
    pub ctrl: bool,
    #[serde(rename = "altKey")]
    pub alt: bool,
    #[serde(rename = "metaKey")]
    pub meta: bool,
}

impl Modifiers {
    /// Returns `true` if no modifier is held.
    pub fn is_empty(self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// A captured keyboard event.
///
/// Construct with [`KeyEvent::new`], which refuses an empty key name, so every
/// value of this type carries a resolvable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    #[serde(rename = "event")]
    kind: KeyEventKind,
    #[serde(rename = "keyName")]
    key_name: String,
    #[serde(flatten)]
    modifiers: Modifiers,
    chord: String,
}

impl KeyEvent {
    /// Builds an event, or returns `None` when `key_name` is empty.
    pub fn new(
        kind: KeyEventKind,
        key_name: impl Into<String>,
        modifiers: Modifiers,
        chord: impl Into<String>,
    ) -> Option<Self> {
        let key_name = key_name.into();
        if key_name.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            key_name,
            modifiers,
            chord: chord.into(),
        })
    }

    pub fn kind(&self) -> KeyEventKind {
        self.kind
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn shift_held(&self) -> bool {
        self.modifiers.shift
    }

    pub fn ctrl_held(&self) -> bool {
        self.modifiers.ctrl
    }

    pub fn alt_held(&self) -> bool {
        self.modifiers.alt
    }

    pub fn meta_held(&self) -> bool {
        self.modifiers.meta
    }

    /// The chord accumulated when this event was produced.
    ///
    /// Always empty for [`KeyEventKind::KeyUp`].
    pub fn chord(&self) -> &str {
        &self.chord
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key_name)?;
        let held: Vec<&str> = [
            (self.modifiers.shift, "shift"),
            (self.modifiers.ctrl, "ctrl"),
            (self.modifiers.alt, "alt"),
            (self.modifiers.meta, "meta"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
        if !held.is_empty() {
            write!(f, " [{}]", held.join(" "))?;
        }
        if !self.chord.is_empty() {
            write!(f, " chord={}", self.chord)?;
        }
        Ok(())
    }
}
