#![no_std]

mod config;
mod keymap;
mod layout;

pub use config::{CustomKey, LAYERS, Layer, MATRIX_COLS, MATRIX_ROWS, TKeyboard, TLayout, settings};
pub use keymap::PreonicKeymap;
pub use layout::LAYOUT;

use thkb_core::{eeconfig::Eeprom, keyboard::Keyboard};

/// A Preonic running this keymap, with its persistent config stored in
/// `eeprom`.
pub fn keyboard<E: Eeprom>(eeprom: E) -> TKeyboard<E> {
    Keyboard::new(&LAYOUT, PreonicKeymap::new(), eeprom, settings())
}
