use thkb_common::dev_info;

use crate::eeconfig::BacklightConfig;

pub const DEFAULT_BACKLIGHT_LEVELS: u8 = 3;

/// Backlight brightness, from 0 (off) to `levels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backlight {
    levels: u8,
    level: u8,
}

impl Backlight {
    pub const fn new(levels: u8) -> Self {
        Self { levels, level: 0 }
    }

    pub fn from_config(levels: u8, config: BacklightConfig) -> Self {
        let level = if config.enable { config.level.min(levels) } else { 0 };
        Self { levels, level }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn is_enabled(&self) -> bool {
        self.level != 0
    }

    /// Goes one level up, wrapping to off past the brightest one.
    pub fn step(&mut self) -> u8 {
        self.level = if self.level >= self.levels {
            0
        } else {
            self.level + 1
        };
        dev_info!("Backlight level {}", self.level);
        self.level
    }

    pub fn config(&self) -> BacklightConfig {
        BacklightConfig {
            enable: self.is_enabled(),
            level: self.level,
        }
    }
}

impl Default for Backlight {
    fn default() -> Self {
        Self::new(DEFAULT_BACKLIGHT_LEVELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_wraps_to_off() {
        let mut bl = Backlight::new(3);
        assert!(!bl.is_enabled());
        assert_eq!(bl.step(), 1);
        assert!(bl.is_enabled());
        assert_eq!(bl.step(), 2);
        assert_eq!(bl.step(), 3);
        assert_eq!(bl.step(), 0);
        assert!(!bl.is_enabled());
    }

    #[test]
    fn test_from_config() {
        let bl = Backlight::from_config(3, BacklightConfig { enable: true, level: 7 });
        assert_eq!(bl.level(), 3);
        let bl = Backlight::from_config(3, BacklightConfig { enable: false, level: 2 });
        assert_eq!(bl.level(), 0);
        assert_eq!(bl.config(), BacklightConfig { enable: false, level: 0 });
    }
}
