//! Keycodes stored in layout tables.
//!
//! Standard keys map 1:1 to USB HID keyboard usages. On top of those there
//! are a few families the runtime knows how to handle (shifted keys,
//! mod-taps, media, mouse and firmware keys) plus a board defined set of
//! custom keycodes, which are handed to the keymap callback.

use bitflags::bitflags;

pub use usbd_hid::descriptor::KeyboardUsage;

/// First keycode value available to board defined keycodes. Everything
/// below is reserved for the runtime.
pub const SAFE_RANGE: u16 = 0x7E00;

const SHIFTED_BASE: u16 = 0x0200;
const MOD_TAP_BASE: u16 = 0x2000;
const CONSUMER_BASE: u16 = 0x7C00;
const MOUSE_BASE: u16 = 0x7C40;
const FIRMWARE_BASE: u16 = 0x7C80;

bitflags! {
    /// Modifier bits, in the same order as the modifier byte of a HID
    /// keyboard report.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct Mods: u8 {
        const LCTRL = 0b0000_0001;
        const LSHIFT = 0b0000_0010;
        const LALT = 0b0000_0100;
        const LGUI = 0b0000_1000;
        const RCTRL = 0b0001_0000;
        const RSHIFT = 0b0010_0000;
        const RALT = 0b0100_0000;
        const RGUI = 0b1000_0000;
    }
}

impl Mods {
    /// The modifier bit a keyboard usage stands for, if it is one of the
    /// eight modifier usages.
    pub fn from_usage(usage: KeyboardUsage) -> Option<Mods> {
        let code = usage as u8;
        if (KeyboardUsage::KeyboardLeftControl as u8..=KeyboardUsage::KeyboardRightGUI as u8)
            .contains(&code)
        {
            Mods::from_bits(1 << (code - KeyboardUsage::KeyboardLeftControl as u8))
        } else {
            None
        }
    }

    /// Compact 5-bit encoding used inside 16-bit keycodes: bit 4 selects
    /// the right hand modifiers, bits 0..4 select ctrl/shift/alt/gui.
    pub const fn to_compact(self) -> u16 {
        let bits = self.bits();
        if bits & 0xF0 != 0 {
            0x10 | ((bits >> 4) as u16 & 0x0F)
        } else {
            bits as u16 & 0x0F
        }
    }
}

/// Media keys, reported through the consumer page.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConsumerKey {
    PlayPause,
    Rewind,
    FastForward,
    NextTrack,
    PrevTrack,
    Stop,
    Mute,
    VolumeUp,
    VolumeDown,
}

impl ConsumerKey {
    /// HID consumer page usage id.
    pub const fn usage(self) -> u16 {
        match self {
            ConsumerKey::PlayPause => 0x00CD,
            ConsumerKey::Rewind => 0x00B4,
            ConsumerKey::FastForward => 0x00B3,
            ConsumerKey::NextTrack => 0x00B5,
            ConsumerKey::PrevTrack => 0x00B6,
            ConsumerKey::Stop => 0x00B7,
            ConsumerKey::Mute => 0x00E2,
            ConsumerKey::VolumeUp => 0x00E9,
            ConsumerKey::VolumeDown => 0x00EA,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MouseKey {
    Button1,
    Button2,
    Button3,
    Up,
    Down,
    Left,
    Right,
    WheelUp,
    WheelDown,
}

/// Keys implemented by the runtime itself rather than sent to the host.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FirmwareKey {
    /// Jump to the bootloader.
    Reset,
    AudioOn,
    AudioOff,
    MusicOn,
    MusicOff,
    /// Cycle through the music mode note mappings.
    MusicMode,
    MidiOn,
    MidiOff,
    VoiceIncrease,
    VoiceDecrease,
    /// Undo a Ctrl/Caps Lock swap.
    CtrlCapsNormal,
    CtrlCapsSwap,
    /// Undo an Alt/GUI swap.
    AltGuiNormal,
    AltGuiSwap,
}

/// Board defined keycodes. Each board enumerates its own set and gets them
/// allocated from [`SAFE_RANGE`] upwards.
pub trait CustomKeycode: Copy {
    fn index(self) -> u16;
    fn from_index(index: u16) -> Option<Self>;
}

/// A single cell of a layout layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Keycode<C> {
    /// Does nothing, and stops the layer lookup.
    NoOp,
    /// Looks the key up in the next active layer below.
    Transparent,
    Basic(KeyboardUsage),
    /// Sent together with Left Shift.
    Shifted(KeyboardUsage),
    /// Acts as the modifier while held, and as the key when tapped.
    ModTap(Mods, KeyboardUsage),
    Consumer(ConsumerKey),
    Mouse(MouseKey),
    Firmware(FirmwareKey),
    Custom(C),
}

impl<C> Keycode<C> {
    pub const fn is_transparent(&self) -> bool {
        matches!(self, Keycode::Transparent)
    }
}

impl<C: CustomKeycode> Keycode<C> {
    /// The 16-bit value of this keycode.
    pub fn code(&self) -> u16 {
        match self {
            Keycode::NoOp => 0x0000,
            Keycode::Transparent => 0x0001,
            Keycode::Basic(usage) => *usage as u16,
            Keycode::Shifted(usage) => SHIFTED_BASE | *usage as u16,
            Keycode::ModTap(mods, usage) => {
                MOD_TAP_BASE | (mods.to_compact() << 8) | *usage as u16
            }
            Keycode::Consumer(key) => CONSUMER_BASE + *key as u16,
            Keycode::Mouse(key) => MOUSE_BASE + *key as u16,
            Keycode::Firmware(key) => FIRMWARE_BASE + *key as u16,
            Keycode::Custom(custom) => SAFE_RANGE + custom.index(),
        }
    }

    /// Decodes a board defined keycode from its 16-bit value.
    pub fn custom_from_code(code: u16) -> Option<C> {
        code.checked_sub(SAFE_RANGE).and_then(C::from_index)
    }

    pub fn as_custom(&self) -> Option<C> {
        match self {
            Keycode::Custom(custom) => Some(*custom),
            _ => None,
        }
    }
}

impl<C> From<KeyboardUsage> for Keycode<C> {
    fn from(value: KeyboardUsage) -> Self {
        Keycode::Basic(value)
    }
}
