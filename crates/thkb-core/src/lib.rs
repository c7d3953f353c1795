#![no_std]

pub mod action;
pub mod audio;
pub mod backlight;
pub mod eeconfig;
pub mod hid;
pub mod keyboard;
pub mod keycode;
pub mod layer;
pub mod layout;

mod aliases;

pub use thkb_common::KeyState;
