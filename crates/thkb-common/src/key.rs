/// Physical state of a key switch.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Released = 0,
    Pressed = 1,
}

impl KeyState {
    pub const fn is_pressed(self) -> bool {
        matches!(self, KeyState::Pressed)
    }
}

impl From<bool> for KeyState {
    fn from(pressed: bool) -> Self {
        if pressed {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KeyState;

    #[test]
    fn test_from_bool() {
        assert_eq!(KeyState::from(true), KeyState::Pressed);
        assert!(!KeyState::from(false).is_pressed());
        assert_eq!(KeyState::default(), KeyState::Released);
    }
}
