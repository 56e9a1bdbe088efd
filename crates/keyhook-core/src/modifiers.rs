//! Live modifier state sampling.
//!
//! The hook callback samples the hardware key state at the moment an event
//! arrives.  By the time the consumer sees the event, the user may already
//! have released the modifier, so the sample must be taken inside the callback
//! and stored in the event.

use crate::event::Modifiers;
use crate::keymap::vk::{
    VK_LCONTROL, VK_LMENU, VK_LSHIFT, VK_LWIN, VK_RCONTROL, VK_RMENU, VK_RSHIFT, VK_RWIN,
};

/// Real-time physical key state.
///
/// On Windows this is `GetAsyncKeyState`, which reflects the hardware, not the
/// thread's queued message state.
pub trait KeyStateSource {
    /// Returns `true` if the key with virtual-key code `vk` is currently down.
    fn is_key_down(&self, vk: u32) -> bool;
}

/// Samples Shift, Ctrl, Alt and Meta.  Each is held if either side is down.
pub fn sample_modifiers<K>(keys: &K) -> Modifiers
where
    K: KeyStateSource + ?Sized,
{
    let either = |left: u32, right: u32| keys.is_key_down(left) || keys.is_key_down(right);
    Modifiers {
        shift: either(VK_LSHIFT, VK_RSHIFT),
        ctrl: either(VK_LCONTROL, VK_RCONTROL),
        alt: either(VK_LMENU, VK_RMENU),
        meta: either(VK_LWIN, VK_RWIN),
    }
}
