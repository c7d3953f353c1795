use thkb_core::{
    audio::Song,
    keyboard::{Keyboard, KeyboardSettings},
    keycode::CustomKeycode,
    layout::Layout,
};

use crate::keymap::PlanckKeymap;

pub const MATRIX_ROWS: usize = 4;
pub const MATRIX_COLS: usize = 12;
pub const LAYERS: usize = 8;

/// Layers of the layout, in the order they are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Layer {
    Qwerty = 0,
    Colemak,
    Dvorak,
    Lower,
    Raise,
    Function,
    Plover,
    Adjust,
}

impl Layer {
    pub const fn index(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CustomKey {
    Qwerty = 0,
    Colemak,
    Dvorak,
    Plover,
    Lower,
    Raise,
    Function,
    /// Right Shift while held, and one backlight step on press.
    Backlit,
    /// Leaves the Plover layer.
    ExtPlv,
}

impl CustomKey {
    pub const ALL: [CustomKey; 9] = [
        CustomKey::Qwerty,
        CustomKey::Colemak,
        CustomKey::Dvorak,
        CustomKey::Plover,
        CustomKey::Lower,
        CustomKey::Raise,
        CustomKey::Function,
        CustomKey::Backlit,
        CustomKey::ExtPlv,
    ];
}

impl CustomKeycode for CustomKey {
    fn index(self) -> u16 {
        self as u16
    }

    fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

#[cfg(feature = "audio")]
const DEFAULT_LAYER_SONGS: &[Option<&Song>] = &[
    Some(thkb_core::audio::songs::QWERTY),
    Some(thkb_core::audio::songs::COLEMAK),
    Some(thkb_core::audio::songs::DVORAK),
];

#[cfg(not(feature = "audio"))]
const DEFAULT_LAYER_SONGS: &[Option<&Song>] = &[];

pub fn settings() -> KeyboardSettings {
    KeyboardSettings {
        default_layer_songs: DEFAULT_LAYER_SONGS,
        ..KeyboardSettings::default()
    }
}

pub type TLayout = Layout<CustomKey, LAYERS, MATRIX_ROWS, MATRIX_COLS>;
pub type TKeyboard<E> = Keyboard<PlanckKeymap, E, LAYERS, MATRIX_ROWS, MATRIX_COLS>;

/// Resolves the `u:` aliases of the Planck layout. Anything else goes to
/// [`thkb_core::default_key_from_alias`].
#[macro_export]
macro_rules! planck_key_from_alias {
    // Escape and grave are crossed on this board's tables.
    (u:ThEsc) => {
        ::thkb_core::keycode::Keycode::Basic(::thkb_core::keycode::KeyboardUsage::KeyboardBacktickTilde)
    };
    (u:ThGrv) => {
        ::thkb_core::keycode::Keycode::Basic(::thkb_core::keycode::KeyboardUsage::KeyboardEscape)
    };
    (u:SftEnt) => {
        ::thkb_core::keycode::Keycode::ModTap(
            ::thkb_core::keycode::Mods::LSHIFT,
            ::thkb_core::keycode::KeyboardUsage::KeyboardEnter,
        )
    };
    (u:ScNuhs) => {
        ::thkb_core::keycode::Keycode::Shifted(::thkb_core::keycode::KeyboardUsage::KeyboardNonUSHash)
    };
    (u:ScNubs) => {
        ::thkb_core::keycode::Keycode::Shifted(::thkb_core::keycode::KeyboardUsage::KeyboardNonUSSlash)
    };

    (u:Qwerty) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Qwerty) };
    (u:Colemak) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Colemak) };
    (u:Dvorak) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Dvorak) };
    (u:Plover) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Plover) };
    (u:Lower) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Lower) };
    (u:Raise) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Raise) };
    (u:Function) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Function) };
    (u:Backlit) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::Backlit) };
    (u:ExtPlv) => { ::thkb_core::keycode::Keycode::Custom($crate::CustomKey::ExtPlv) };

    ($($other:tt)*) => {
        ::thkb_core::default_key_from_alias!($($other)*)
    };
}
