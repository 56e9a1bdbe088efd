//! Display names for keys whose scan-code text is missing or misleading.
//!
//! The OS text lookup works from the physical scan code alone.  Without the
//! extended-key bit, the navigation cluster shares scan codes with the numeric
//! keypad ("Home" comes back as "Num 7"), and several lock and modifier keys
//! have no stable text at all.  Those keys are named here instead.
//!
//! The table is built on first use and never mutated afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::vk::*;

static NAMED_KEYS: OnceLock<HashMap<u32, &'static str>> = OnceLock::new();

/// Returns the fixed display name for `vk`, if it has one.
pub fn named_key(vk: u32) -> Option<&'static str> {
    NAMED_KEYS.get_or_init(build_table).get(&vk).copied()
}

fn build_table() -> HashMap<u32, &'static str> {
    HashMap::from([
        // Navigation cluster
        (VK_HOME, "Home"),
        (VK_PRIOR, "PageUp"),
        (VK_NEXT, "PageDown"),
        (VK_END, "End"),
        (VK_INSERT, "Insert"),
        (VK_DELETE, "Delete"),
        (VK_RIGHT, "Right"),
        (VK_LEFT, "Left"),
        (VK_UP, "Up"),
        (VK_DOWN, "Down"),
        // Lock and system keys
        (VK_SNAPSHOT, "PrintScreen"),
        (VK_SCROLL, "ScrollLock"),
        (VK_NUMLOCK, "NumLock"),
        (VK_PAUSE, "Pause"),
        (VK_APPS, "ContextMenu"),
        // Modifiers, reported without their side
        (VK_SHIFT, "Shift"),
        (VK_LSHIFT, "Shift"),
        (VK_RSHIFT, "Shift"),
        (VK_CONTROL, "Control"),
        (VK_LCONTROL, "Control"),
        (VK_RCONTROL, "Control"),
        (VK_MENU, "Alt"),
        (VK_LMENU, "Alt"),
        (VK_RMENU, "Alt"),
        (VK_LWIN, "Meta"),
        (VK_RWIN, "Meta"),
    ])
}
