//! Default processing of keycodes, run after the keymap callback lets an
//! event through.

use thkb_common::{KeyState, dev_debug, dev_info, dev_warn};

use crate::{
    eeconfig::{Eeprom, KeymapConfig},
    hid::KeyChangeError,
    keycode::{FirmwareKey, KeyboardUsage, Keycode, Mods},
    keyboard::{KeyRecord, KeyboardHost, PendingModTap},
};

macro_rules! do_on_state {
    ($st:expr, $on_pressed:block, $on_released:block) => {
        match $st {
            KeyState::Released => $on_released,
            KeyState::Pressed => $on_pressed,
        }
    };
}

/// Applies the keymap config swaps to a usage. [`None`] means the key must
/// be ignored.
pub fn apply_keymap_config(config: KeymapConfig, key: KeyboardUsage) -> Option<KeyboardUsage> {
    let swap_ctrl_caps = config.contains(KeymapConfig::SWAP_CONTROL_CAPSLOCK);
    let swap_lalt_lgui = config.contains(KeymapConfig::SWAP_LALT_LGUI);
    let swap_ralt_rgui = config.contains(KeymapConfig::SWAP_RALT_RGUI);
    let no_gui = config.contains(KeymapConfig::NO_GUI);
    let swap_grave_esc = config.contains(KeymapConfig::SWAP_GRAVE_ESC);
    let swap_bslash_bspace = config.contains(KeymapConfig::SWAP_BACKSLASH_BACKSPACE);

    let gui = |gui: KeyboardUsage| if no_gui { None } else { Some(gui) };

    match key {
        KeyboardUsage::KeyboardCapsLock
            if swap_ctrl_caps || config.contains(KeymapConfig::CAPSLOCK_TO_CONTROL) =>
        {
            Some(KeyboardUsage::KeyboardLeftControl)
        }
        KeyboardUsage::KeyboardLeftControl if swap_ctrl_caps => Some(KeyboardUsage::KeyboardCapsLock),
        KeyboardUsage::KeyboardLeftAlt if swap_lalt_lgui => gui(KeyboardUsage::KeyboardLeftGUI),
        KeyboardUsage::KeyboardLeftGUI if swap_lalt_lgui => Some(KeyboardUsage::KeyboardLeftAlt),
        KeyboardUsage::KeyboardLeftGUI => gui(key),
        KeyboardUsage::KeyboardRightAlt if swap_ralt_rgui => gui(KeyboardUsage::KeyboardRightGUI),
        KeyboardUsage::KeyboardRightGUI if swap_ralt_rgui => Some(KeyboardUsage::KeyboardRightAlt),
        KeyboardUsage::KeyboardRightGUI => gui(key),
        KeyboardUsage::KeyboardBacktickTilde if swap_grave_esc => Some(KeyboardUsage::KeyboardEscape),
        KeyboardUsage::KeyboardEscape if swap_grave_esc => Some(KeyboardUsage::KeyboardBacktickTilde),
        KeyboardUsage::KeyboardBackslashBar if swap_bslash_bspace => {
            Some(KeyboardUsage::KeyboardBackspace)
        }
        KeyboardUsage::KeyboardBackspace if swap_bslash_bspace => {
            Some(KeyboardUsage::KeyboardBackslashBar)
        }
        _ => Some(key),
    }
}

fn log_key_change(result: Result<(), KeyChangeError>, key: KeyboardUsage) {
    match result {
        Ok(()) => {}
        Err(KeyChangeError::InvalidState) => {
            dev_debug!("Key {:?} already in the requested state", key);
        }
        Err(e) => {
            dev_warn!("Couldn't change state of key {:?}: {}", key, e);
        }
    }
}

impl<E: Eeprom> KeyboardHost<E> {
    fn standard_key_handle(&mut self, key: KeyboardUsage, key_state: KeyState) {
        let Some(key) = apply_keymap_config(self.keymap_config, key) else {
            return;
        };

        do_on_state!(key_state, { log_key_change(self.report.register_code(key), key) }, {
            log_key_change(self.report.unregister_code(key), key)
        });
    }

    fn mod_tap_handle(&mut self, mods: Mods, key: KeyboardUsage, record: &KeyRecord) {
        let event = &record.event;
        do_on_state!(
            event.state,
            {
                self.pending_mod_tap = Some(PendingModTap {
                    row: event.row,
                    col: event.col,
                    mods,
                    since: event.time,
                });
            },
            {
                match self.pending_mod_tap {
                    Some(p) if (p.row, p.col) == (event.row, event.col) => {
                        self.pending_mod_tap = None;
                        if event.time.duration_since(p.since) < self.settings.tapping_term_ms {
                            if let Some(key) = apply_keymap_config(self.keymap_config, key) {
                                log_key_change(self.report.register_code(key), key);
                                self.tap_release = Some(key);
                            }
                        }
                    }
                    _ => self.report.del_mods(mods),
                }
            }
        );
    }

    fn firmware_key_handle(&mut self, key: FirmwareKey, key_state: KeyState) {
        if key_state == KeyState::Released {
            return;
        }

        match key {
            FirmwareKey::Reset => {
                dev_info!("Reset requested");
                self.reset_requested = true;
            }
            FirmwareKey::AudioOn => self.set_audio_enabled(true),
            FirmwareKey::AudioOff => self.set_audio_enabled(false),
            FirmwareKey::MusicOn => self.audio.set_music(true),
            FirmwareKey::MusicOff => self.audio.set_music(false),
            FirmwareKey::MusicMode => {
                let map = self.audio.next_music_map();
                dev_info!("Music mode: {:?}", map);
            }
            FirmwareKey::MidiOn => self.audio.set_midi(true),
            FirmwareKey::MidiOff => self.audio.set_midi(false),
            FirmwareKey::VoiceIncrease => {
                self.audio.voice_increase();
            }
            FirmwareKey::VoiceDecrease => {
                self.audio.voice_decrease();
            }
            FirmwareKey::CtrlCapsNormal => {
                self.keymap_config.remove(KeymapConfig::SWAP_CONTROL_CAPSLOCK);
                self.persist_keymap_config();
            }
            FirmwareKey::CtrlCapsSwap => {
                self.keymap_config.insert(KeymapConfig::SWAP_CONTROL_CAPSLOCK);
                self.persist_keymap_config();
            }
            FirmwareKey::AltGuiNormal => {
                self.keymap_config
                    .remove(KeymapConfig::SWAP_LALT_LGUI | KeymapConfig::SWAP_RALT_RGUI);
                self.persist_keymap_config();
            }
            FirmwareKey::AltGuiSwap => {
                self.keymap_config
                    .insert(KeymapConfig::SWAP_LALT_LGUI | KeymapConfig::SWAP_RALT_RGUI);
                self.persist_keymap_config();
            }
        }
    }

    pub(crate) fn process_action<C>(&mut self, keycode: Keycode<C>, record: &KeyRecord) {
        let key_state = record.event.state;
        match keycode {
            Keycode::NoOp | Keycode::Transparent => {}
            Keycode::Basic(key) => self.standard_key_handle(key, key_state),
            Keycode::Shifted(key) => {
                do_on_state!(key_state, { self.report.add_weak_mods(Mods::LSHIFT) }, {});
                self.standard_key_handle(key, key_state);
                do_on_state!(key_state, {}, { self.report.del_weak_mods(Mods::LSHIFT) });
            }
            Keycode::ModTap(mods, key) => self.mod_tap_handle(mods, key, record),
            Keycode::Consumer(key) => {
                do_on_state!(key_state, { self.report.press_consumer(key) }, {
                    self.report.release_consumer(key)
                });
            }
            Keycode::Mouse(key) => self.report.mouse_key(key, key_state.is_pressed()),
            Keycode::Firmware(key) => self.firmware_key_handle(key, key_state),
            Keycode::Custom(_) => {
                dev_debug!("Custom keycode not handled by the keymap");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_config_keeps_keys() {
        let config = KeymapConfig::empty();
        for key in [
            KeyboardUsage::KeyboardCapsLock,
            KeyboardUsage::KeyboardLeftGUI,
            KeyboardUsage::KeyboardEscape,
            KeyboardUsage::KeyboardAa,
        ] {
            assert_eq!(apply_keymap_config(config, key), Some(key));
        }
    }

    #[test]
    fn test_ctrl_caps() {
        let config = KeymapConfig::SWAP_CONTROL_CAPSLOCK;
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardCapsLock),
            Some(KeyboardUsage::KeyboardLeftControl)
        );
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardLeftControl),
            Some(KeyboardUsage::KeyboardCapsLock)
        );

        let config = KeymapConfig::CAPSLOCK_TO_CONTROL;
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardCapsLock),
            Some(KeyboardUsage::KeyboardLeftControl)
        );
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardLeftControl),
            Some(KeyboardUsage::KeyboardLeftControl)
        );
    }

    #[test]
    fn test_alt_gui() {
        let config = KeymapConfig::SWAP_LALT_LGUI | KeymapConfig::SWAP_RALT_RGUI;
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardLeftAlt),
            Some(KeyboardUsage::KeyboardLeftGUI)
        );
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardRightGUI),
            Some(KeyboardUsage::KeyboardRightAlt)
        );

        let config = config | KeymapConfig::NO_GUI;
        assert_eq!(apply_keymap_config(config, KeyboardUsage::KeyboardLeftAlt), None);
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardLeftGUI),
            Some(KeyboardUsage::KeyboardLeftAlt)
        );
        assert_eq!(
            apply_keymap_config(KeymapConfig::NO_GUI, KeyboardUsage::KeyboardRightGUI),
            None
        );
    }

    #[test]
    fn test_grave_esc_and_backslash_backspace() {
        let config = KeymapConfig::SWAP_GRAVE_ESC | KeymapConfig::SWAP_BACKSLASH_BACKSPACE;
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardEscape),
            Some(KeyboardUsage::KeyboardBacktickTilde)
        );
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardBacktickTilde),
            Some(KeyboardUsage::KeyboardEscape)
        );
        assert_eq!(
            apply_keymap_config(config, KeyboardUsage::KeyboardBackspace),
            Some(KeyboardUsage::KeyboardBackslashBar)
        );
    }
}
