#![no_std]

mod config;
mod keymap;
mod layout;

pub use config::{CustomKey, LAYERS, Layer, MATRIX_COLS, MATRIX_ROWS, TKeyboard, TLayout, settings};
pub use keymap::PlanckKeymap;
pub use layout::LAYOUT;

use thkb_core::{eeconfig::Eeprom, keyboard::Keyboard};

/// A Planck running this keymap, with its persistent config stored in
/// `eeprom`.
pub fn keyboard<E: Eeprom>(eeprom: E) -> TKeyboard<E> {
    Keyboard::new(&LAYOUT, PlanckKeymap::new(), eeprom, settings())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::keymap::tests::MockOps;
    use std::vec::Vec;
    use thkb_common::time::Instant;
    use thkb_core::{
        KeyState,
        eeconfig::{KeymapConfig, MemoryEeprom},
        keyboard::{KeyEvent, KeyRecord, KeyboardOps, ProcessRecord},
        keycode::{CustomKeycode, FirmwareKey, KeyboardUsage, Keycode, Mods},
    };

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(thkb_common::DEV_LOG_LEVEL)
            .try_init();
    }

    fn at(millis: u16) -> Instant {
        Instant::from_millis(millis)
    }

    // Matrix positions
    const LOWER: (u8, u8) = (3, 4);
    const RAISE: (u8, u8) = (3, 7);
    const FUNCTION: (u8, u8) = (3, 0);

    fn press<E: Eeprom>(kb: &mut TKeyboard<E>, (row, col): (u8, u8), time: u16) {
        assert!(kb.process_event(KeyEvent::press(row, col, at(time))));
    }

    fn release<E: Eeprom>(kb: &mut TKeyboard<E>, (row, col): (u8, u8), time: u16) {
        assert!(kb.process_event(KeyEvent::release(row, col, at(time))));
    }

    fn tap<E: Eeprom>(kb: &mut TKeyboard<E>, pos: (u8, u8), time: u16) {
        press(kb, pos, time);
        release(kb, pos, time + 10);
    }

    #[test]
    fn test_layout_dimensions() {
        assert_eq!(LAYOUT.layers(), 8);
        assert_eq!(LAYOUT.rows(), 4);
        assert_eq!(LAYOUT.cols(), 12);
        assert_eq!(LAYOUT.iter_keys().count(), 8 * 4 * 12);
    }

    #[test]
    fn test_layers_in_declaration_order() {
        let key = |layer: Layer, row, col| LAYOUT.key(layer.index(), row, col);

        assert_eq!(key(Layer::Qwerty, 0, 1), Some(Keycode::Basic(KeyboardUsage::KeyboardQq)));
        assert_eq!(key(Layer::Colemak, 0, 3), Some(Keycode::Basic(KeyboardUsage::KeyboardFf)));
        assert_eq!(
            key(Layer::Dvorak, 0, 2),
            Some(Keycode::Basic(KeyboardUsage::KeyboardCommaLess))
        );
        assert_eq!(
            key(Layer::Lower, 0, 8),
            Some(Keycode::Shifted(KeyboardUsage::Keyboard9OpenParens))
        );
        assert_eq!(key(Layer::Raise, 1, 7), Some(Keycode::Basic(KeyboardUsage::KeypadEnter)));
        assert_eq!(key(Layer::Function, 2, 0), Some(Keycode::Basic(KeyboardUsage::KeyboardCapsLock)));
        assert_eq!(key(Layer::Plover, 0, 0), Some(Keycode::Custom(CustomKey::ExtPlv)));
        assert_eq!(key(Layer::Adjust, 0, 1), Some(Keycode::Firmware(FirmwareKey::Reset)));
    }

    #[test]
    fn test_board_aliases() {
        // Escape and grave swap places
        assert_eq!(
            LAYOUT.key(0, 0, 0),
            Some(Keycode::Basic(KeyboardUsage::KeyboardBacktickTilde))
        );
        assert_eq!(
            LAYOUT.key(0, 1, 11),
            Some(Keycode::Basic(KeyboardUsage::KeyboardEscape))
        );
        assert_eq!(
            LAYOUT.key(0, 2, 11),
            Some(Keycode::ModTap(Mods::LSHIFT, KeyboardUsage::KeyboardEnter))
        );
    }

    #[test]
    fn test_every_custom_key_is_handled() {
        let mut used = Vec::new();
        for (_, row, col, keycode) in LAYOUT.iter_keys() {
            let Some(key) = keycode.as_custom() else {
                continue;
            };
            if !used.contains(&key) {
                used.push(key);
            }

            let mut ops = MockOps::default();
            let mut keymap = PlanckKeymap::new();
            for state in [KeyState::Pressed, KeyState::Released] {
                let record = KeyRecord {
                    event: KeyEvent { row, col, state, time: at(0) },
                };
                assert!(!keymap.process_record_user(keycode, &record, &mut ops));
            }
        }

        assert_eq!(used.len(), CustomKey::ALL.len());
    }

    #[test]
    fn test_custom_keycodes_above_safe_range() {
        for (i, key) in CustomKey::ALL.into_iter().enumerate() {
            let code = Keycode::Custom(key).code();
            assert_eq!(code, thkb_core::keycode::SAFE_RANGE + i as u16);
            assert_eq!(Keycode::<CustomKey>::custom_from_code(code), Some(key));
        }
        assert_eq!(CustomKey::from_index(CustomKey::ALL.len() as u16), None);
    }

    #[test]
    fn test_tri_layer_through_matrix() {
        init_logger();
        let mut kb = keyboard(MemoryEeprom::<64>::new());

        press(&mut kb, LOWER, 0);
        assert!(kb.host().is_layer_on(Layer::Lower.index()));
        press(&mut kb, RAISE, 10);
        assert!(kb.host().is_layer_on(Layer::Adjust.index()));

        // Reset lives on Adjust
        tap(&mut kb, (0, 1), 20);
        assert!(kb.host_mut().take_reset_request());

        release(&mut kb, LOWER, 40);
        assert!(!kb.host().is_layer_on(Layer::Adjust.index()));
        assert!(kb.host().is_layer_on(Layer::Raise.index()));
        release(&mut kb, RAISE, 50);
        assert_eq!(kb.host().layer_state().mask(), 0);
    }

    #[test]
    fn test_function_layer_keys() {
        init_logger();
        let mut kb = keyboard(MemoryEeprom::<64>::new());

        press(&mut kb, FUNCTION, 0);
        press(&mut kb, (1, 1), 10);
        assert!(kb.host().report().is_pressed(KeyboardUsage::KeyboardF1));
        release(&mut kb, FUNCTION, 20);
        // Released on the layer it was pressed on
        release(&mut kb, (1, 1), 30);
        assert!(!kb.host().report().is_pressed(KeyboardUsage::KeyboardF1));
        assert!(!kb.host().report().is_pressed(KeyboardUsage::KeyboardAa));
    }

    #[test]
    fn test_default_layer_is_persisted() {
        init_logger();
        let mut eeprom = MemoryEeprom::<64>::new();
        {
            let mut kb = keyboard(&mut eeprom);
            press(&mut kb, LOWER, 0);
            press(&mut kb, RAISE, 10);
            tap(&mut kb, (0, 8), 20);
            release(&mut kb, RAISE, 40);
            release(&mut kb, LOWER, 50);

            assert_eq!(kb.host().layer_state().default_layer(), Layer::Colemak.index());
            if cfg!(feature = "audio") {
                assert_eq!(
                    kb.host().audio().current_song(),
                    Some(thkb_core::audio::songs::COLEMAK)
                );
            }

            press(&mut kb, (0, 3), 60);
            assert!(kb.host().report().is_pressed(KeyboardUsage::KeyboardFf));
            release(&mut kb, (0, 3), 70);
        }

        let kb = keyboard(&mut eeprom);
        assert_eq!(kb.host().layer_state().default_layer(), Layer::Colemak.index());
    }

    #[test]
    fn test_backlit_key() {
        init_logger();
        let mut kb = keyboard(MemoryEeprom::<64>::new());
        press(&mut kb, LOWER, 0);
        press(&mut kb, RAISE, 10);

        press(&mut kb, (1, 0), 20);
        assert!(kb.host().report().mods().contains(Mods::RSHIFT));
        let level = if cfg!(feature = "backlight") { 1 } else { 0 };
        assert_eq!(kb.host().backlight().level(), level);

        release(&mut kb, (1, 0), 30);
        assert!(!kb.host().report().mods().contains(Mods::RSHIFT));
    }

    #[test]
    fn test_plover_round_trip() {
        init_logger();
        let mut kb = keyboard(MemoryEeprom::<64>::new());
        press(&mut kb, LOWER, 0);
        press(&mut kb, RAISE, 10);
        tap(&mut kb, (0, 10), 20);

        assert_eq!(kb.host().layer_state().mask(), 1 << Layer::Plover.index());
        assert!(kb.host().nkro());
        assert!(kb.host().eeconfig_read_keymap().unwrap().contains(KeymapConfig::NKRO));
        if cfg!(feature = "audio") {
            assert_eq!(
                kb.host().audio().current_song(),
                Some(thkb_core::audio::songs::PLOVER)
            );
        }

        release(&mut kb, RAISE, 40);
        release(&mut kb, LOWER, 50);
        assert_eq!(kb.host().layer_state().mask(), 1 << Layer::Plover.index());

        // Steno keys
        press(&mut kb, (1, 1), 60);
        press(&mut kb, (2, 1), 60);
        assert!(kb.host().report().is_pressed(KeyboardUsage::KeyboardQq));
        assert!(kb.host().report().is_pressed(KeyboardUsage::KeyboardAa));
        release(&mut kb, (1, 1), 70);
        release(&mut kb, (2, 1), 70);

        tap(&mut kb, (0, 0), 80);
        assert_eq!(kb.host().layer_state().mask(), 0);
        if cfg!(feature = "audio") {
            assert_eq!(
                kb.host().audio().current_song(),
                Some(thkb_core::audio::songs::PLOVER_GOODBYE)
            );
        }
    }

    #[test]
    fn test_shift_enter_mod_tap() {
        init_logger();
        let mut kb = keyboard(MemoryEeprom::<64>::new());

        // Tapped
        tap(&mut kb, (2, 11), 0);
        assert!(kb.host().report().is_pressed(KeyboardUsage::KeyboardEnter));
        kb.tick(at(20));
        assert!(!kb.host().report().is_pressed(KeyboardUsage::KeyboardEnter));

        // Held
        press(&mut kb, (2, 11), 100);
        kb.tick(at(400));
        assert!(kb.host().report().mods().contains(Mods::LSHIFT));
        release(&mut kb, (2, 11), 450);
        assert!(!kb.host().report().mods().contains(Mods::LSHIFT));
        assert!(!kb.host().report().is_pressed(KeyboardUsage::KeyboardEnter));
    }
}
