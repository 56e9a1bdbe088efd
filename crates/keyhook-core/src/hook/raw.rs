//! Raw low-level keyboard hook parameters, decoupled from the OS bindings.

use crate::event::KeyEventKind;

/// `nCode` value meaning the hook should process the event.
pub const HC_ACTION: i32 = 0;

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

/// `KBDLLHOOKSTRUCT::flags` bit set when the event was synthesised (`SendInput`).
pub const LLKHF_INJECTED: u32 = 0x10;

/// One invocation of the low-level keyboard hook procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyInput {
    /// The hook code (`nCode`).
    pub code: i32,
    /// The message identifier carried in `wParam`.
    pub message: u32,
    /// `KBDLLHOOKSTRUCT::vkCode`.
    pub vk_code: u32,
    /// `KBDLLHOOKSTRUCT::scanCode`.
    pub scan_code: u32,
    /// `KBDLLHOOKSTRUCT::flags`.
    pub flags: u32,
}

impl RawKeyInput {
    /// A plain hardware key-down, as the hook would report it.
    pub fn key_down(vk_code: u32, scan_code: u32) -> Self {
        Self {
            code: HC_ACTION,
            message: WM_KEYDOWN,
            vk_code,
            scan_code,
            flags: 0,
        }
    }

    /// A plain hardware key-up.
    pub fn key_up(vk_code: u32, scan_code: u32) -> Self {
        Self {
            message: WM_KEYUP,
            ..Self::key_down(vk_code, scan_code)
        }
    }

    pub fn is_action(&self) -> bool {
        self.code == HC_ACTION
    }

    pub fn is_injected(&self) -> bool {
        self.flags & LLKHF_INJECTED != 0
    }

    /// Classifies the message.  Any message other than the four key messages
    /// yields `None`.
    pub fn kind(&self) -> Option<KeyEventKind> {
        classify(self.message)
    }
}

/// Maps a keyboard message identifier to an event kind.
pub fn classify(message: u32) -> Option<KeyEventKind> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyEventKind::KeyDown),
        WM_KEYUP | WM_SYSKEYUP => Some(KeyEventKind::KeyUp),
        _ => None,
    }
}
