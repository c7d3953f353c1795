#![no_std]

pub mod time;
mod devlog;
pub use devlog::DEV_LOG_LEVEL;
pub mod util;
mod key;
pub use key::*;

pub use log as __log;
