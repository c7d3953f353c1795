use core::fmt::Display;

use heapless::Vec;
use thkb_common::dev_trace;
use usbd_hid::descriptor::{KeyboardReport, KeyboardUsage};

use crate::keycode::{ConsumerKey, Mods, MouseKey};

/// Maximum number of non-modifier keys tracked at the same time.
pub const MAX_PRESSED_KEYS: usize = 32;

/// Key slots in a boot protocol keyboard report.
const BOOT_REPORT_KEYS: usize = 6;

const MOUSE_MOVE_DELTA: i8 = 8;
const MOUSE_WHEEL_DELTA: i8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChangeError {
    /// The usage can't be sent in a keyboard report.
    Unsupported,
    /// The key was already pressed, or already released.
    InvalidState,
    /// Too many keys pressed at the same time.
    RollOver,
}

impl Display for KeyChangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyChangeError::Unsupported => write!(f, "Unsupported key usage"),
            KeyChangeError::InvalidState => write!(f, "Key already in the requested state"),
            KeyChangeError::RollOver => write!(f, "Too many keys pressed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
}

/// State of everything the keyboard reports to the host. The transport
/// takes snapshots of it, either as a boot keyboard report or as the full
/// list of pressed keys when NKRO is in use.
#[derive(Debug, Default)]
pub struct HidReport {
    mods: Mods,
    weak_mods: Mods,
    keys: Vec<u8, MAX_PRESSED_KEYS>,
    consumer: Option<ConsumerKey>,
    mouse: MouseState,
    /// Mouse keys currently down, one bit per [`MouseKey`].
    mouse_keys: u16,
    dirty: bool,
}

impl HidReport {
    pub const fn new() -> Self {
        Self {
            mods: Mods::empty(),
            weak_mods: Mods::empty(),
            keys: Vec::new(),
            consumer: None,
            mouse: MouseState {
                buttons: 0,
                x: 0,
                y: 0,
                wheel: 0,
            },
            mouse_keys: 0,
            dirty: false,
        }
    }

    fn ensure_keyboard_usage_within_bounds(key: KeyboardUsage) -> Result<(), KeyChangeError> {
        if (key as u8) < (KeyboardUsage::KeyboardAa as u8) {
            Err(KeyChangeError::Unsupported)
        } else {
            Ok(())
        }
    }

    pub fn register_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError> {
        Self::ensure_keyboard_usage_within_bounds(key)?;

        if let Some(m) = Mods::from_usage(key) {
            if self.mods.contains(m) {
                return Err(KeyChangeError::InvalidState);
            }
            self.mods.insert(m);
        } else {
            if self.keys.contains(&(key as u8)) {
                return Err(KeyChangeError::InvalidState);
            }
            self.keys
                .push(key as u8)
                .map_err(|_| KeyChangeError::RollOver)?;
        }

        dev_trace!("Key down: {:?}", key);
        self.dirty = true;
        Ok(())
    }

    pub fn unregister_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError> {
        Self::ensure_keyboard_usage_within_bounds(key)?;

        if let Some(m) = Mods::from_usage(key) {
            if !self.mods.contains(m) {
                return Err(KeyChangeError::InvalidState);
            }
            self.mods.remove(m);
        } else {
            let Some(pos) = self.keys.iter().position(|k| *k == key as u8) else {
                return Err(KeyChangeError::InvalidState);
            };
            self.keys.remove(pos);
        }

        dev_trace!("Key up: {:?}", key);
        self.dirty = true;
        Ok(())
    }

    pub fn is_pressed(&self, key: KeyboardUsage) -> bool {
        match Mods::from_usage(key) {
            Some(m) => self.mods.contains(m),
            None => self.keys.contains(&(key as u8)),
        }
    }

    pub fn add_mods(&mut self, mods: Mods) {
        self.mods.insert(mods);
        self.dirty = true;
    }

    pub fn del_mods(&mut self, mods: Mods) {
        self.mods.remove(mods);
        self.dirty = true;
    }

    /// Weak modifiers are sent alongside the keys that need them (e.g. the
    /// shift of a shifted symbol) without being a key on their own.
    pub fn add_weak_mods(&mut self, mods: Mods) {
        self.weak_mods.insert(mods);
        self.dirty = true;
    }

    pub fn del_weak_mods(&mut self, mods: Mods) {
        self.weak_mods.remove(mods);
        self.dirty = true;
    }

    pub fn mods(&self) -> Mods {
        self.mods | self.weak_mods
    }

    pub fn press_consumer(&mut self, key: ConsumerKey) {
        self.consumer = Some(key);
        self.dirty = true;
    }

    pub fn release_consumer(&mut self, key: ConsumerKey) {
        if self.consumer == Some(key) {
            self.consumer = None;
            self.dirty = true;
        }
    }

    /// Usage currently reported on the consumer page, or 0.
    pub fn consumer_usage(&self) -> u16 {
        self.consumer.map(|c| c.usage()).unwrap_or(0)
    }

    pub fn mouse_key(&mut self, key: MouseKey, pressed: bool) {
        let bit = 1u16 << key as u8;
        if pressed {
            self.mouse_keys |= bit;
        } else {
            self.mouse_keys &= !bit;
        }

        // An axis keeps moving while any of its keys is still held.
        let keys = self.mouse_keys;
        let held = |k: MouseKey| keys & (1 << k as u8) != 0;
        let axis = |neg: MouseKey, pos: MouseKey, delta: i8| match (held(neg), held(pos)) {
            (true, false) => -delta,
            (false, true) => delta,
            _ => 0,
        };

        self.mouse = MouseState {
            buttons: (self.mouse_keys & 0b111) as u8,
            x: axis(MouseKey::Left, MouseKey::Right, MOUSE_MOVE_DELTA),
            y: axis(MouseKey::Up, MouseKey::Down, MOUSE_MOVE_DELTA),
            wheel: axis(MouseKey::WheelDown, MouseKey::WheelUp, MOUSE_WHEEL_DELTA),
        };
        self.dirty = true;
    }

    pub fn mouse(&self) -> MouseState {
        self.mouse
    }

    /// Boot protocol report. When more keys than it fits are down, every
    /// key slot carries the roll over error usage.
    pub fn keyboard_report(&self) -> KeyboardReport {
        let mut keycodes = [0u8; BOOT_REPORT_KEYS];
        if self.keys.len() > BOOT_REPORT_KEYS {
            keycodes = [KeyboardUsage::KeyboardErrorRollOver as u8; BOOT_REPORT_KEYS];
        } else {
            keycodes[0..self.keys.len()].copy_from_slice(&self.keys);
        }

        KeyboardReport {
            modifier: self.mods().bits(),
            reserved: 0,
            leds: 0,
            keycodes,
        }
    }

    /// Every non-modifier key currently pressed, in press order.
    pub fn nkro_keys(&self) -> &[u8] {
        &self.keys
    }

    /// Returns whether the report changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let mut report = HidReport::new();
        report.register_code(KeyboardUsage::KeyboardAa).unwrap();
        report.register_code(KeyboardUsage::KeyboardLeftShift).unwrap();

        let r = report.keyboard_report();
        assert_eq!(r.modifier, Mods::LSHIFT.bits());
        assert_eq!(r.keycodes, [0x04, 0, 0, 0, 0, 0]);
        assert!(report.take_dirty());
        assert!(!report.take_dirty());

        report.unregister_code(KeyboardUsage::KeyboardAa).unwrap();
        report.unregister_code(KeyboardUsage::KeyboardLeftShift).unwrap();
        let r = report.keyboard_report();
        assert_eq!(r.modifier, 0);
        assert_eq!(r.keycodes, [0; 6]);
    }

    #[test]
    fn test_invalid_state() {
        let mut report = HidReport::new();
        report.register_code(KeyboardUsage::KeyboardBb).unwrap();
        assert_eq!(
            report.register_code(KeyboardUsage::KeyboardBb),
            Err(KeyChangeError::InvalidState)
        );
        assert_eq!(
            report.unregister_code(KeyboardUsage::KeyboardCc),
            Err(KeyChangeError::InvalidState)
        );
        assert_eq!(
            report.unregister_code(KeyboardUsage::KeyboardRightShift),
            Err(KeyChangeError::InvalidState)
        );
    }

    #[test]
    fn test_unsupported_usage() {
        let mut report = HidReport::new();
        assert_eq!(
            report.register_code(KeyboardUsage::KeyboardErrorRollOver),
            Err(KeyChangeError::Unsupported)
        );
    }

    #[test]
    fn test_six_key_roll_over() {
        let mut report = HidReport::new();
        let keys = [
            KeyboardUsage::KeyboardAa,
            KeyboardUsage::KeyboardBb,
            KeyboardUsage::KeyboardCc,
            KeyboardUsage::KeyboardDd,
            KeyboardUsage::KeyboardEe,
            KeyboardUsage::KeyboardFf,
        ];
        for k in keys {
            report.register_code(k).unwrap();
        }
        assert_eq!(report.keyboard_report().keycodes, [4, 5, 6, 7, 8, 9]);

        report.register_code(KeyboardUsage::KeyboardGg).unwrap();
        assert_eq!(report.keyboard_report().keycodes, [0x01; 6]);
        assert_eq!(report.nkro_keys(), &[4, 5, 6, 7, 8, 9, 10]);

        report.unregister_code(KeyboardUsage::KeyboardAa).unwrap();
        assert_eq!(report.keyboard_report().keycodes, [5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_weak_mods() {
        let mut report = HidReport::new();
        report.add_weak_mods(Mods::LSHIFT);
        report.register_code(KeyboardUsage::Keyboard9OpenParens).unwrap();
        assert_eq!(report.keyboard_report().modifier, Mods::LSHIFT.bits());
        report.del_weak_mods(Mods::LSHIFT);
        assert_eq!(report.keyboard_report().modifier, 0);
    }

    #[test]
    fn test_consumer_and_mouse() {
        let mut report = HidReport::new();
        report.press_consumer(ConsumerKey::VolumeUp);
        assert_eq!(report.consumer_usage(), 0xE9);
        report.release_consumer(ConsumerKey::VolumeUp);
        assert_eq!(report.consumer_usage(), 0);

        report.mouse_key(MouseKey::Button2, true);
        report.mouse_key(MouseKey::Left, true);
        assert_eq!(report.mouse(), MouseState { buttons: 0b10, x: -8, y: 0, wheel: 0 });
        report.mouse_key(MouseKey::Button2, false);
        report.mouse_key(MouseKey::Left, false);
        assert_eq!(report.mouse(), MouseState::default());
    }

    #[test]
    fn test_mouse_axis_follows_held_keys() {
        let mut report = HidReport::new();
        report.mouse_key(MouseKey::Down, true);
        report.mouse_key(MouseKey::Up, true);
        assert_eq!(report.mouse().y, 0);

        // Down is still held
        report.mouse_key(MouseKey::Up, false);
        assert_eq!(report.mouse().y, 8);

        report.mouse_key(MouseKey::WheelUp, true);
        report.mouse_key(MouseKey::Right, true);
        assert_eq!(report.mouse(), MouseState { buttons: 0, x: 8, y: 8, wheel: 1 });

        report.mouse_key(MouseKey::Down, false);
        report.mouse_key(MouseKey::Right, false);
        report.mouse_key(MouseKey::WheelUp, false);
        assert_eq!(report.mouse(), MouseState::default());
    }
}
